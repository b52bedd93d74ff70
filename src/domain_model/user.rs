use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(UserId)
    }
}

/// Account state as stored in the `users.status` column (`1` = active).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Disabled,
}

impl AccountStatus {
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            AccountStatus::Active
        } else {
            AccountStatus::Disabled
        }
    }

    pub fn code(self) -> i64 {
        match self {
            AccountStatus::Active => 1,
            AccountStatus::Disabled => 0,
        }
    }

    pub fn is_active(self) -> bool {
        self == AccountStatus::Active
    }
}

pub const DEFAULT_ROLE: &str = "sales";
