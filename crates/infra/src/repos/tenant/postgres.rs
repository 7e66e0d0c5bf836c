use super::ITenantRepo;
use certwatch_domain::{Tenant, Tz, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::{error, warn};

pub struct PostgresTenantRepo {
    pool: PgPool,
}

impl PostgresTenantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TenantRaw {
    tenant_uid: Uuid,
    name: String,
    timezone: String,
}

impl From<TenantRaw> for Tenant {
    fn from(e: TenantRaw) -> Self {
        let timezone = e.timezone.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "Tenant {} has an unknown timezone: {}, using UTC",
                e.tenant_uid, e.timezone
            );
            Tz::UTC
        });
        Self {
            id: e.tenant_uid.into(),
            name: e.name,
            timezone,
        }
    }
}

#[async_trait::async_trait]
impl ITenantRepo for PostgresTenantRepo {
    async fn insert(&self, tenant: &Tenant) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tenants(tenant_uid, name, timezone)
            VALUES($1, $2, $3)
            "#,
        )
        .bind(tenant.id.inner_ref())
        .bind(&tenant.name)
        .bind(tenant.timezone.name())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert tenant: {:?}. DB returned error: {:?}",
                tenant, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, tenant_id: &ID) -> Option<Tenant> {
        let res: Option<TenantRaw> = sqlx::query_as(
            r#"
            SELECT * FROM tenants
            WHERE tenant_uid = $1
            "#,
        )
        .bind(tenant_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find tenant with id: {:?} failed. DB returned error: {:?}",
                tenant_id, e
            );
            e
        })
        .ok()?;
        res.map(|tenant| tenant.into())
    }

    async fn find_many(&self, tenant_ids: &[ID]) -> anyhow::Result<Vec<Tenant>> {
        let ids = tenant_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        let tenants: Vec<TenantRaw> = sqlx::query_as(
            r#"
            SELECT * FROM tenants
            WHERE tenant_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find tenants with ids: {:?} failed. DB returned error: {:?}",
                tenant_ids, e
            );
            e
        })?;
        Ok(tenants.into_iter().map(|t| t.into()).collect())
    }
}
