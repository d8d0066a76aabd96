//! User identity type for core messages.

use memory::UserId;
use serde::{Deserialize, Serialize};

/// User identity (id, username, names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// Memory partition key for this user.
    pub fn user_id(&self) -> UserId {
        UserId::from(self.id)
    }

    /// Name the model should address the user by: first name, else username.
    pub fn display_name(&self) -> Option<&str> {
        self.first_name
            .as_deref()
            .or(self.username.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}
