use crate::shared::entity::{Entity, TenantScoped, ID};

/// A course offered by a `Tenant`. Completing it grants an `Achievement`.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: ID,
    pub tenant_id: ID,
    pub title: String,
    /// Free form grouping such as "Gas Safety" or "Heat Pumps"
    pub category: String,
}

impl Course {
    pub fn new(tenant_id: ID, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Default::default(),
            tenant_id,
            title: title.into(),
            category: category.into(),
        }
    }
}

impl Entity<ID> for Course {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

impl TenantScoped for Course {
    fn tenant_id(&self) -> &ID {
        &self.tenant_id
    }
}
