use crate::shared::entity::{Entity, TenantScoped, ID};

/// A person who has taken one or more courses with a `Tenant`
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: ID,
    pub tenant_id: ID,
    pub name: String,
    pub email: String,
}

impl Customer {
    pub fn new(tenant_id: ID, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Default::default(),
            tenant_id,
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Entity<ID> for Customer {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

impl TenantScoped for Customer {
    fn tenant_id(&self) -> &ID {
        &self.tenant_id
    }
}
