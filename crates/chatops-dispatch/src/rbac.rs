//! Role registry placeholder. Roles are neither populated nor enforced yet.

use std::collections::BTreeMap;

use chatops_domain::CommandType;

use crate::error::{DispatchError, DispatchResult};

/// Permission label a command would require once enforcement exists.
pub fn required_permission(command_type: CommandType) -> &'static str {
    match command_type {
        CommandType::ManageRepository => "command:manage",
        CommandType::VerifyRepository => "command:verify",
    }
}

/// In-memory mapping of role name to granted permissions.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    roles: BTreeMap<String, Vec<String>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_role(&mut self, role: &str, permissions: Vec<String>) -> DispatchResult<()> {
        if self.roles.contains_key(role) {
            return Err(DispatchError::validation(format!(
                "role {role} already exists"
            )));
        }
        self.roles.insert(role.to_string(), permissions);
        Ok(())
    }

    pub fn has_permission(&self, role: &str, permission: &str) -> bool {
        self.roles
            .get(role)
            .is_some_and(|granted| granted.iter().any(|item| item == permission))
    }
}
