use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// The already-authenticated principal a request runs on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewAllOrders,
    ManageOrders,
    ViewOrderStats,
}

/// Decide whether `caller` holds `capability`.
pub fn authorize(caller: &Caller, capability: Capability) -> Result<(), DomainError> {
    let allowed = match capability {
        Capability::ViewAllOrders | Capability::ManageOrders | Capability::ViewOrderStats => {
            caller.is_admin()
        }
    };
    if allowed {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// Owners see their own orders; admins see every order.
pub fn can_view_order(caller: &Caller, owner_id: i32) -> bool {
    caller.is_admin() || caller.user_id == owner_id
}
