use crate::shared::entity::{Entity, ID};
use chrono_tz::Tz;

/// A `Tenant` is a training provider. It acts as a namespace for all
/// customers, courses and achievements so that providers sharing this
/// instance never see each others data.
#[derive(Debug, Clone, PartialEq)]
pub struct Tenant {
    pub id: ID,
    pub name: String,
    /// Timezone used when presenting dates to the tenants customers
    pub timezone: Tz,
}

impl Tenant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Default::default(),
            name: name.into(),
            timezone: Tz::UTC,
        }
    }
}

impl Entity<ID> for Tenant {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
