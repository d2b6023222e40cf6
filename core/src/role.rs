//! Employee roles.
//!
//! RULE: roles are a closed vocabulary. Every consumer matches
//! exhaustively — an unknown role string cannot silently no-op.

use crate::error::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Coordinator,
    Mechanic,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Coordinator => "coordinator",
            Self::Mechanic => "mechanic",
        }
    }

    /// Roles allowed to file and soft-delete complaints.
    pub fn manages_complaints(&self) -> bool {
        match self {
            Self::Admin | Self::Coordinator => true,
            Self::Mechanic => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "coordinator" => Ok(Self::Coordinator),
            "mechanic" => Ok(Self::Mechanic),
            other => Err(ParseEnumError {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}
