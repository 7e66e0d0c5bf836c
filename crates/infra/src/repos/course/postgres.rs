use super::ICourseRepo;
use certwatch_domain::{Course, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresCourseRepo {
    pool: PgPool,
}

impl PostgresCourseRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CourseRaw {
    course_uid: Uuid,
    tenant_uid: Uuid,
    title: String,
    category: String,
}

impl From<CourseRaw> for Course {
    fn from(e: CourseRaw) -> Self {
        Self {
            id: e.course_uid.into(),
            tenant_id: e.tenant_uid.into(),
            title: e.title,
            category: e.category,
        }
    }
}

#[async_trait::async_trait]
impl ICourseRepo for PostgresCourseRepo {
    async fn insert(&self, course: &Course) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO courses(course_uid, tenant_uid, title, category)
            VALUES($1, $2, $3, $4)
            "#,
        )
        .bind(course.id.inner_ref())
        .bind(course.tenant_id.inner_ref())
        .bind(&course.title)
        .bind(&course.category)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert course: {:?}. DB returned error: {:?}",
                course, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, course_id: &ID) -> Option<Course> {
        let res: Option<CourseRaw> = sqlx::query_as(
            r#"
            SELECT * FROM courses
            WHERE course_uid = $1
            "#,
        )
        .bind(course_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find course with id: {:?} failed. DB returned error: {:?}",
                course_id, e
            );
            e
        })
        .ok()?;
        res.map(|course| course.into())
    }

    async fn find_many(&self, course_ids: &[ID]) -> anyhow::Result<Vec<Course>> {
        let ids = course_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        let courses: Vec<CourseRaw> = sqlx::query_as(
            r#"
            SELECT * FROM courses
            WHERE course_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find courses with ids: {:?} failed. DB returned error: {:?}",
                course_ids, e
            );
            e
        })?;
        Ok(courses.into_iter().map(|c| c.into()).collect())
    }
}
