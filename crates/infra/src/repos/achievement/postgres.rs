use super::IAchievementRepo;
use crate::repos::shared::query_structs::{
    CertificationFilter, DueQuery, LockCondition, ReminderLock,
};
use certwatch_domain::{
    Achievement, AttachedFile, Certification, CertificationState, Course, Customer, ExpiryPolicy,
    EXPIRING_WINDOW_DAYS, ID,
};
use chrono::{DateTime, Duration, Utc};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool, Postgres, QueryBuilder,
};
use tracing::error;

pub struct PostgresAchievementRepo {
    pool: PgPool,
}

impl PostgresAchievementRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CERTIFICATION_SELECT: &str = r#"
    SELECT a.*,
        c.name AS customer_name,
        c.email AS customer_email,
        co.title AS course_title,
        co.category AS course_category
    FROM achievements AS a
    INNER JOIN customers AS c
        ON c.customer_uid = a.customer_uid
    INNER JOIN courses AS co
        ON co.course_uid = a.course_uid
    "#;

#[derive(Debug, FromRow)]
struct AchievementRaw {
    achievement_uid: Uuid,
    tenant_uid: Uuid,
    customer_uid: Uuid,
    course_uid: Uuid,
    certification_date: DateTime<Utc>,
    expiry_date: Option<DateTime<Utc>>,
    is_expired: bool,
    reminders_sent: i64,
    next_reminder_date: Option<DateTime<Utc>>,
    certificate_number: Option<String>,
    attached_file: Option<Json<AttachedFile>>,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CertificationRaw {
    #[sqlx(flatten)]
    achievement: AchievementRaw,
    customer_name: String,
    customer_email: String,
    course_title: String,
    course_category: String,
}

impl From<AchievementRaw> for Achievement {
    fn from(e: AchievementRaw) -> Self {
        Self {
            id: e.achievement_uid.into(),
            tenant_id: e.tenant_uid.into(),
            customer_id: e.customer_uid.into(),
            course_id: e.course_uid.into(),
            certification_date: e.certification_date,
            expiry_date: e.expiry_date,
            is_expired: e.is_expired,
            reminders_sent: e.reminders_sent,
            next_reminder_date: e.next_reminder_date,
            certificate_number: e.certificate_number,
            attached_file: e.attached_file.map(|file| file.0),
            created: e.created,
            updated: e.updated,
        }
    }
}

impl From<CertificationRaw> for Certification {
    fn from(e: CertificationRaw) -> Self {
        let achievement: Achievement = e.achievement.into();
        let customer = Customer {
            id: achievement.customer_id.clone(),
            tenant_id: achievement.tenant_id.clone(),
            name: e.customer_name,
            email: e.customer_email,
        };
        let course = Course {
            id: achievement.course_id.clone(),
            tenant_id: achievement.tenant_id.clone(),
            title: e.course_title,
            category: e.course_category,
        };
        Self {
            achievement,
            customer,
            course,
        }
    }
}

/// The expiry date the `ExpiryPolicy` assigns to a row
fn push_effective_expiry(qb: &mut QueryBuilder<'_, Postgres>, policy: &ExpiryPolicy) {
    match policy.default_validity_years {
        Some(years) => {
            qb.push("COALESCE(a.expiry_date, a.certification_date + make_interval(years => ");
            qb.push_bind(years as i32);
            qb.push("))");
        }
        None => {
            qb.push("a.expiry_date");
        }
    }
}

fn push_due_condition(qb: &mut QueryBuilder<'_, Postgres>, query: &DueQuery) {
    qb.push("((a.next_reminder_date <= ");
    qb.push_bind(query.now);
    qb.push(") OR (NOT a.is_expired AND ");
    push_effective_expiry(qb, &query.policy);
    qb.push(" < ");
    qb.push_bind(query.now);
    qb.push("))");
    if let Some(tenant_id) = &query.tenant_id {
        qb.push(" AND a.tenant_uid = ");
        qb.push_bind(*tenant_id.inner_ref());
    }
}

fn push_status_condition(
    qb: &mut QueryBuilder<'_, Postgres>,
    status: CertificationState,
    filter: &CertificationFilter,
) {
    let window_end = filter.now + Duration::days(EXPIRING_WINDOW_DAYS);
    match status {
        CertificationState::Expired => {
            qb.push("(a.is_expired OR ");
            push_effective_expiry(qb, &filter.policy);
            qb.push(" < ");
            qb.push_bind(filter.now);
            qb.push(")");
        }
        CertificationState::Expiring => {
            qb.push("(NOT a.is_expired AND ");
            push_effective_expiry(qb, &filter.policy);
            qb.push(" >= ");
            qb.push_bind(filter.now);
            qb.push(" AND ");
            push_effective_expiry(qb, &filter.policy);
            qb.push(" <= ");
            qb.push_bind(window_end);
            qb.push(")");
        }
        CertificationState::Active => {
            qb.push("(NOT a.is_expired AND (");
            push_effective_expiry(qb, &filter.policy);
            qb.push(" IS NULL OR ");
            push_effective_expiry(qb, &filter.policy);
            qb.push(" > ");
            qb.push_bind(window_end);
            qb.push("))");
        }
    }
}

#[async_trait::async_trait]
impl IAchievementRepo for PostgresAchievementRepo {
    async fn insert(&self, achievement: &Achievement) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO achievements(
                achievement_uid, tenant_uid, customer_uid, course_uid,
                certification_date, expiry_date, is_expired, reminders_sent,
                next_reminder_date, certificate_number, attached_file, created, updated
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(achievement.id.inner_ref())
        .bind(achievement.tenant_id.inner_ref())
        .bind(achievement.customer_id.inner_ref())
        .bind(achievement.course_id.inner_ref())
        .bind(achievement.certification_date)
        .bind(achievement.expiry_date)
        .bind(achievement.is_expired)
        .bind(achievement.reminders_sent)
        .bind(achievement.next_reminder_date)
        .bind(&achievement.certificate_number)
        .bind(achievement.attached_file.as_ref().map(Json))
        .bind(achievement.created)
        .bind(achievement.updated)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert achievement: {:?}. DB returned error: {:?}",
                achievement, e
            );
            e
        })?;
        Ok(())
    }

    async fn save(&self, achievement: &Achievement) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE achievements
            SET is_expired = $2,
            reminders_sent = GREATEST(reminders_sent, $3),
            next_reminder_date = $4,
            certificate_number = $5,
            attached_file = $6,
            updated = $7,
            reminder_lock_until = NULL
            WHERE achievement_uid = $1
            "#,
        )
        .bind(achievement.id.inner_ref())
        .bind(achievement.is_expired)
        .bind(achievement.reminders_sent)
        .bind(achievement.next_reminder_date)
        .bind(&achievement.certificate_number)
        .bind(achievement.attached_file.as_ref().map(Json))
        .bind(achievement.updated)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to save achievement: {:?}. DB returned error: {:?}",
                achievement, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, achievement_id: &ID) -> Option<Achievement> {
        let res: Option<AchievementRaw> = sqlx::query_as(
            r#"
            SELECT * FROM achievements
            WHERE achievement_uid = $1
            "#,
        )
        .bind(achievement_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find achievement with id: {:?} failed. DB returned error: {:?}",
                achievement_id, e
            );
            e
        })
        .ok()?;
        res.map(|achievement| achievement.into())
    }

    async fn find_certification(&self, achievement_id: &ID) -> Option<Certification> {
        let mut qb = QueryBuilder::<Postgres>::new(CERTIFICATION_SELECT);
        qb.push(" WHERE a.achievement_uid = ");
        qb.push_bind(*achievement_id.inner_ref());
        let res: Option<CertificationRaw> = qb
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(
                    "Find certification with achievement id: {:?} failed. DB returned error: {:?}",
                    achievement_id, e
                );
                e
            })
            .ok()?;
        res.map(|certification| certification.into())
    }

    async fn find_due(&self, query: &DueQuery) -> anyhow::Result<Vec<Certification>> {
        let mut qb = QueryBuilder::<Postgres>::new(CERTIFICATION_SELECT);
        qb.push(" WHERE ");
        push_due_condition(&mut qb, query);
        qb.push(" ORDER BY a.expiry_date ASC, a.achievement_uid ASC");

        let certifications: Vec<CertificationRaw> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(
                    "Find due certifications with query: {:?} failed. DB returned error: {:?}",
                    query, e
                );
                e
            })?;
        Ok(certifications.into_iter().map(|c| c.into()).collect())
    }

    async fn find_by_filter(
        &self,
        filter: &CertificationFilter,
    ) -> anyhow::Result<Vec<Certification>> {
        let mut qb = QueryBuilder::<Postgres>::new(CERTIFICATION_SELECT);
        qb.push(" WHERE a.tenant_uid = ");
        qb.push_bind(*filter.tenant_id.inner_ref());
        if let Some(category) = &filter.category {
            qb.push(" AND co.category = ");
            qb.push_bind(category.clone());
        }
        if let Some(status) = filter.status {
            qb.push(" AND ");
            push_status_condition(&mut qb, status, filter);
        }
        qb.push(" ORDER BY a.is_expired ASC, a.expiry_date ASC");

        let certifications: Vec<CertificationRaw> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(
                    "Find certifications with filter: {:?} failed. DB returned error: {:?}",
                    filter, e
                );
                e
            })?;
        Ok(certifications.into_iter().map(|c| c.into()).collect())
    }

    async fn lock_for_reminder(&self, lock: &ReminderLock) -> anyhow::Result<Option<Achievement>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "UPDATE achievements AS a SET reminder_lock_until = ",
        );
        qb.push_bind(lock.until);
        qb.push(" WHERE a.achievement_uid = ");
        qb.push_bind(*lock.achievement_id.inner_ref());
        qb.push(" AND (a.reminder_lock_until IS NULL OR a.reminder_lock_until <= ");
        qb.push_bind(lock.now);
        qb.push(")");
        if let LockCondition::Due(query) = &lock.condition {
            qb.push(" AND ");
            push_due_condition(&mut qb, query);
        }
        qb.push(" RETURNING a.*");

        let res: Option<AchievementRaw> = qb
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(
                    "Locking achievement with id: {:?} failed. DB returned error: {:?}",
                    lock.achievement_id, e
                );
                e
            })?;
        Ok(res.map(|achievement| achievement.into()))
    }

    async fn unlock(&self, achievement_id: &ID) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE achievements
            SET reminder_lock_until = NULL
            WHERE achievement_uid = $1
            "#,
        )
        .bind(achievement_id.inner_ref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unlocking achievement with id: {:?} failed. DB returned error: {:?}",
                achievement_id, e
            );
            e
        })?;
        Ok(())
    }
}
