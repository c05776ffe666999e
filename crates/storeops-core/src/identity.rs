//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers used across StoreOps. You cannot
//! pass a `TaskId` where an `EmployeeId` is expected.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Unique identifier for an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub Uuid);

/// Unique identifier for a scheduled task log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

/// Unique identifier for a carton ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

macro_rules! uuid_newtype {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }

        impl FromStr for $name {
            type Err = StoreError;

            /// Parse either a bare UUID or the prefixed `Display` form.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($prefix, ":")).unwrap_or(s);
                Uuid::parse_str(raw.trim()).map(Self).map_err(|e| {
                    StoreError::InvalidInput(format!(
                        concat!("invalid ", $prefix, " id {:?}: {}"),
                        s, e
                    ))
                })
            }
        }
    };
}

uuid_newtype!(EmployeeId, "employee");
uuid_newtype!(TaskId, "task");
uuid_newtype!(EntryId, "entry");
