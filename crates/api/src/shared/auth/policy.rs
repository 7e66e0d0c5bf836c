use certwatch_domain::AdminRole;

/// A `Policy` decides which actions a caller can take.
///
/// Every `UseCase` lists the `Permission`s it requires. Admins get their
/// `Policy` from their `AdminRole`, the cron caller can only trigger the
/// reminder sweep.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Policy {
    allow: Vec<Permission>,
}

impl Policy {
    pub fn for_role(role: AdminRole) -> Self {
        let allow = match role {
            AdminRole::SuperAdmin | AdminRole::Manager => vec![
                Permission::SendReminders,
                Permission::ViewCertifications,
                Permission::ViewReminderHistory,
                Permission::AttachCertificates,
            ],
            AdminRole::Instructor => vec![
                Permission::ViewCertifications,
                Permission::ViewReminderHistory,
            ],
        };
        Self { allow }
    }

    pub fn cron() -> Self {
        Self {
            allow: vec![Permission::SendReminders],
        }
    }

    /// Checks if this `Policy` grants all of the `Permission`s
    pub fn authorize(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.allow.contains(p))
    }
}

/// `Permission`s are the different kinds of actions that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    SendReminders,
    ViewCertifications,
    ViewReminderHistory,
    AttachCertificates,
}
