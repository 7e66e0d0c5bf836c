use super::ICustomerRepo;
use certwatch_domain::{Customer, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresCustomerRepo {
    pool: PgPool,
}

impl PostgresCustomerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CustomerRaw {
    customer_uid: Uuid,
    tenant_uid: Uuid,
    name: String,
    email: String,
}

impl From<CustomerRaw> for Customer {
    fn from(e: CustomerRaw) -> Self {
        Self {
            id: e.customer_uid.into(),
            tenant_id: e.tenant_uid.into(),
            name: e.name,
            email: e.email,
        }
    }
}

#[async_trait::async_trait]
impl ICustomerRepo for PostgresCustomerRepo {
    async fn insert(&self, customer: &Customer) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customers(customer_uid, tenant_uid, name, email)
            VALUES($1, $2, $3, $4)
            "#,
        )
        .bind(customer.id.inner_ref())
        .bind(customer.tenant_id.inner_ref())
        .bind(&customer.name)
        .bind(&customer.email)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert customer: {:?}. DB returned error: {:?}",
                customer, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, customer_id: &ID) -> Option<Customer> {
        let res: Option<CustomerRaw> = sqlx::query_as(
            r#"
            SELECT * FROM customers
            WHERE customer_uid = $1
            "#,
        )
        .bind(customer_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find customer with id: {:?} failed. DB returned error: {:?}",
                customer_id, e
            );
            e
        })
        .ok()?;
        res.map(|customer| customer.into())
    }

    async fn find_many(&self, customer_ids: &[ID]) -> anyhow::Result<Vec<Customer>> {
        let ids = customer_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        let customers: Vec<CustomerRaw> = sqlx::query_as(
            r#"
            SELECT * FROM customers
            WHERE customer_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find customers with ids: {:?} failed. DB returned error: {:?}",
                customer_ids, e
            );
            e
        })?;
        Ok(customers.into_iter().map(|c| c.into()).collect())
    }
}
