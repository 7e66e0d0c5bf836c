use super::IAchievementRepo;
use crate::repos::{
    course::ICourseRepo,
    customer::ICustomerRepo,
    shared::{
        inmemory_repo::*,
        query_structs::{CertificationFilter, DueQuery, LockCondition, ReminderLock},
    },
};
use certwatch_domain::{Achievement, Certification, Entity, ID};
use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc};

#[derive(Debug, Clone)]
struct StoredAchievement {
    achievement: Achievement,
    locked_until: Option<DateTime<Utc>>,
}

impl Entity<ID> for StoredAchievement {
    fn id(&self) -> ID {
        self.achievement.id.clone()
    }
}

pub struct InMemoryAchievementRepo {
    achievements: std::sync::Mutex<Vec<StoredAchievement>>,
    customers: Arc<dyn ICustomerRepo>,
    courses: Arc<dyn ICourseRepo>,
}

impl InMemoryAchievementRepo {
    pub fn new(customers: Arc<dyn ICustomerRepo>, courses: Arc<dyn ICourseRepo>) -> Self {
        Self {
            achievements: std::sync::Mutex::new(Vec::new()),
            customers,
            courses,
        }
    }

    /// Joins achievements with their customers and courses, dropping
    /// achievements whose customer or course is missing like an inner join would
    async fn with_details(
        &self,
        achievements: Vec<Achievement>,
    ) -> anyhow::Result<Vec<Certification>> {
        let customer_ids = achievements
            .iter()
            .map(|a| a.customer_id.clone())
            .collect::<Vec<_>>();
        let course_ids = achievements
            .iter()
            .map(|a| a.course_id.clone())
            .collect::<Vec<_>>();
        let customers = self
            .customers
            .find_many(&customer_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect::<HashMap<_, _>>();
        let courses = self
            .courses
            .find_many(&course_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect::<HashMap<_, _>>();

        Ok(achievements
            .into_iter()
            .filter_map(|achievement| {
                let customer = customers.get(&achievement.customer_id)?.clone();
                let course = courses.get(&achievement.course_id)?.clone();
                Some(Certification {
                    achievement,
                    customer,
                    course,
                })
            })
            .collect())
    }

    fn all(&self) -> Vec<Achievement> {
        find_by(&self.achievements, |_| true)
            .into_iter()
            .map(|stored| stored.achievement)
            .collect()
    }
}

#[async_trait::async_trait]
impl IAchievementRepo for InMemoryAchievementRepo {
    async fn insert(&self, achievement: &Achievement) -> anyhow::Result<()> {
        let stored = StoredAchievement {
            achievement: achievement.clone(),
            locked_until: None,
        };
        insert(&stored, &self.achievements);
        Ok(())
    }

    async fn save(&self, achievement: &Achievement) -> anyhow::Result<()> {
        find_and_update(&achievement.id, &self.achievements, |stored| {
            let reminders_sent = std::cmp::max(
                stored.achievement.reminders_sent,
                achievement.reminders_sent,
            );
            stored.achievement = achievement.clone();
            stored.achievement.reminders_sent = reminders_sent;
            stored.locked_until = None;
            true
        });
        Ok(())
    }

    async fn find(&self, achievement_id: &ID) -> Option<Achievement> {
        find(achievement_id, &self.achievements).map(|stored| stored.achievement)
    }

    async fn find_certification(&self, achievement_id: &ID) -> Option<Certification> {
        let achievement = self.find(achievement_id).await?;
        self.with_details(vec![achievement])
            .await
            .ok()?
            .into_iter()
            .next()
    }

    async fn find_due(&self, query: &DueQuery) -> anyhow::Result<Vec<Certification>> {
        let mut due = self
            .all()
            .into_iter()
            .filter(|a| query.matches(a))
            .collect::<Vec<_>>();
        due.sort_by(|a1, a2| {
            sort_key(a1.expiry_date)
                .cmp(&sort_key(a2.expiry_date))
                .then_with(|| a1.id.cmp(&a2.id))
        });
        self.with_details(due).await
    }

    async fn find_by_filter(
        &self,
        filter: &CertificationFilter,
    ) -> anyhow::Result<Vec<Certification>> {
        let tenant_achievements = self
            .all()
            .into_iter()
            .filter(|a| a.tenant_id == filter.tenant_id)
            .collect();
        let mut certifications = self
            .with_details(tenant_achievements)
            .await?
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect::<Vec<_>>();
        certifications.sort_by(|c1, c2| {
            let (a1, a2) = (&c1.achievement, &c2.achievement);
            a1.is_expired
                .cmp(&a2.is_expired)
                .then_with(|| sort_key(a1.expiry_date).cmp(&sort_key(a2.expiry_date)))
        });
        Ok(certifications)
    }

    async fn lock_for_reminder(&self, lock: &ReminderLock) -> anyhow::Result<Option<Achievement>> {
        let locked = find_and_update(&lock.achievement_id, &self.achievements, |stored| {
            if matches!(stored.locked_until, Some(until) if until > lock.now) {
                return false;
            }
            if let LockCondition::Due(query) = &lock.condition {
                if !query.matches(&stored.achievement) {
                    return false;
                }
            }
            stored.locked_until = Some(lock.until);
            true
        });
        Ok(locked.map(|stored| stored.achievement))
    }

    async fn unlock(&self, achievement_id: &ID) -> anyhow::Result<()> {
        find_and_update(achievement_id, &self.achievements, |stored| {
            stored.locked_until = None;
            true
        });
        Ok(())
    }
}

/// Ascending with `None` last, as postgres orders nulls
fn sort_key(date: Option<DateTime<Utc>>) -> (bool, Option<DateTime<Utc>>) {
    (date.is_none(), date)
}
