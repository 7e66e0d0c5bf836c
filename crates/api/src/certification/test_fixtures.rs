use certwatch_domain::{Achievement, CertificationReminder, Course, Customer, ExpiryPolicy, Tenant, ID};
use certwatch_infra::{
    CertwatchContext, InMemoryMailer, LockCondition, ReminderLock, StaticTimeSys,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 2, 7, 0, 0).unwrap()
}

pub struct Fixture {
    pub ctx: CertwatchContext,
    pub mailer: Arc<InMemoryMailer>,
    pub tenant: Tenant,
    pub customer: Customer,
    pub course: Course,
}

impl Fixture {
    pub async fn new() -> Self {
        let mut ctx = CertwatchContext::create_inmemory();
        let mailer = Arc::new(InMemoryMailer::new());
        ctx.mailer = mailer.clone();
        ctx.sys = Arc::new(StaticTimeSys::at(now()));
        ctx.config.expiry_policy = ExpiryPolicy::never_expiring();
        ctx.config.reminder_lock_secs = 300;

        let (tenant, customer, course) = Self::seed_tenant(&ctx, "North Gas Training").await;
        Self {
            ctx,
            mailer,
            tenant,
            customer,
            course,
        }
    }

    pub async fn seed_tenant(ctx: &CertwatchContext, name: &str) -> (Tenant, Customer, Course) {
        let tenant = Tenant::new(name);
        ctx.repos.tenants.insert(&tenant).await.unwrap();
        let customer = Customer::new(
            tenant.id.clone(),
            "Sam Fitter",
            format!("sam@{}.example.com", tenant.id),
        );
        ctx.repos.customers.insert(&customer).await.unwrap();
        let course = Course::new(tenant.id.clone(), "Domestic Gas Safety", "Gas");
        ctx.repos.courses.insert(&course).await.unwrap();
        (tenant, customer, course)
    }

    pub async fn add(&self, expiry: Option<DateTime<Utc>>) -> Achievement {
        self.add_for(&self.customer, &self.course, expiry).await
    }

    pub async fn add_for(
        &self,
        customer: &Customer,
        course: &Course,
        expiry: Option<DateTime<Utc>>,
    ) -> Achievement {
        let achievement = Achievement::new(
            customer.tenant_id.clone(),
            customer.id.clone(),
            course.id.clone(),
            now() - Duration::days(700),
            expiry,
        );
        self.ctx.repos.achievements.insert(&achievement).await.unwrap();
        achievement
    }

    pub async fn reminders(&self, achievement_id: &ID) -> Vec<CertificationReminder> {
        self.ctx
            .repos
            .reminders
            .find_by_achievement(achievement_id)
            .await
            .unwrap()
    }

    /// Claims the achievement like a concurrently running reminder run
    pub async fn hold_lock(&self, achievement_id: &ID) {
        let lock = ReminderLock {
            achievement_id: achievement_id.clone(),
            now: now(),
            until: now() + Duration::minutes(5),
            condition: LockCondition::Any,
        };
        assert!(self
            .ctx
            .repos
            .achievements
            .lock_for_reminder(&lock)
            .await
            .unwrap()
            .is_some());
    }
}
