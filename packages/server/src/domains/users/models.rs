use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission tier of a user. Stored as a small integer; every identity has
/// exactly one role row, defaulting to `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
pub enum UserRole {
    User = 0,
    Admin = 1,
}

impl UserRole {
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::User => "User",
            UserRole::Admin => "Admin",
        }
    }
}

impl TryFrom<i32> for UserRole {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UserRole::User),
            1 => Ok(UserRole::Admin),
            other => Err(other),
        }
    }
}

/// Shadow row mapping a provider identity to its permission tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub role: UserRole,
}

/// Wire representation of a user row: numeric role plus its display label.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: Uuid,
    pub role: i32,
    pub role_label: String,
}

impl From<UserRecord> for UserData {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            role: record.role as i32,
            role_label: record.role.label().to_string(),
        }
    }
}
