mod inmemory;
mod postgres;

pub use inmemory::InMemoryCourseRepo;
pub use postgres::PostgresCourseRepo;

use certwatch_domain::{Course, ID};

#[async_trait::async_trait]
pub trait ICourseRepo: Send + Sync {
    async fn insert(&self, course: &Course) -> anyhow::Result<()>;
    async fn find(&self, course_id: &ID) -> Option<Course>;
    async fn find_many(&self, course_ids: &[ID]) -> anyhow::Result<Vec<Course>>;
}
