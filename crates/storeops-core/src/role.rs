//! # Role Hierarchy
//!
//! Defines the four employee roles and the ordinal access check used by
//! every guarded operation.
//!
//! | Level | Role         |
//! |-------|--------------|
//! | 4     | `manager`    |
//! | 3     | `admin`      |
//! | 2     | `shift_lead` |
//! | 1     | `employee`   |
//! | 0     | unknown      |
//!
//! A holder passes when their level is at least the required level. The
//! manager always passes, independent of the numeric comparison.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::StoreError;

/// Employee roles, ordered by privilege level.
///
/// The `Ord` derivation follows declaration order:
/// `Employee < ShiftLead < Admin < Manager`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Front-line staff. Can log cartons and work their own tasks.
    Employee,
    /// Runs a shift. Can recount cartons, undo entries and assign tasks.
    ShiftLead,
    /// Store administration. Can manage the employee directory.
    Admin,
    /// Store manager. Passes every access check.
    Manager,
}

impl Role {
    /// Returns all roles in ascending privilege order.
    pub fn all() -> &'static [Role] {
        &[Self::Employee, Self::ShiftLead, Self::Admin, Self::Manager]
    }

    /// Ordinal privilege level, 1 through 4.
    pub fn level(&self) -> u8 {
        match self {
            Self::Employee => 1,
            Self::ShiftLead => 2,
            Self::Admin => 3,
            Self::Manager => 4,
        }
    }

    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::ShiftLead => "shift_lead",
            Self::Admin => "admin",
            Self::Manager => "manager",
        }
    }

    /// Whether this role satisfies `required`. See [`has_access`].
    pub fn satisfies(&self, required: Role) -> bool {
        has_access(*self, required)
    }
}

impl Default for Role {
    /// The implicit requirement when a route names none.
    fn default() -> Self {
        Self::Employee
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StoreError;

    /// Parse a role from its snake_case identifier. Case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Self::Employee),
            "shift_lead" => Ok(Self::ShiftLead),
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            other => Err(StoreError::InvalidInput(format!("unknown role: {other:?}"))),
        }
    }
}

/// Level of a textual role name. Unknown names rank 0.
pub fn level_of(name: &str) -> u8 {
    name.parse::<Role>().map(|r| r.level()).unwrap_or(0)
}

/// Whether `held` satisfies `required`.
///
/// True when `held` is [`Role::Manager`], or when `held.level() >=
/// required.level()`.
pub fn has_access(held: Role, required: Role) -> bool {
    held == Role::Manager || held.level() >= required.level()
}

/// Total variant of [`has_access`] over raw role names.
///
/// `required` defaults to `employee`. Names that do not parse rank 0, so an
/// unknown holder only passes an equally unknown requirement.
pub fn has_access_by_name(held: &str, required: Option<&str>) -> bool {
    if held == Role::Manager.as_str() {
        return true;
    }
    let required_level = required.map(level_of).unwrap_or(Role::Employee.level());
    level_of(held) >= required_level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(Role::Employee.level(), 1);
        assert_eq!(Role::ShiftLead.level(), 2);
        assert_eq!(Role::Admin.level(), 3);
        assert_eq!(Role::Manager.level(), 4);
        assert_eq!(level_of("cashier"), 0);
    }

    #[test]
    fn test_manager_always_passes() {
        for required in Role::all() {
            assert!(has_access(Role::Manager, *required));
        }
        assert!(has_access_by_name("manager", Some("owner")));
    }

    #[test]
    fn test_employee_cannot_reach_manager() {
        assert!(!has_access(Role::Employee, Role::Manager));
        assert!(!has_access(Role::Employee, Role::ShiftLead));
    }

    #[test]
    fn test_equal_level_passes() {
        assert!(has_access(Role::ShiftLead, Role::ShiftLead));
        assert!(Role::Admin.satisfies(Role::Admin));
    }

    #[test]
    fn test_required_defaults_to_employee() {
        assert!(has_access_by_name("employee", None));
        assert_eq!(Role::default(), Role::Employee);
    }

    #[test]
    fn test_unknown_holder_degrades_to_zero() {
        assert!(!has_access_by_name("cashier", None));
        assert!(!has_access_by_name("cashier", Some("employee")));
        assert!(has_access_by_name("cashier", Some("owner")));
        assert!(has_access_by_name("employee", Some("owner")));
    }

    #[test]
    fn test_ord_matches_level() {
        let roles = Role::all();
        for pair in roles.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].level() < pair[1].level());
        }
    }

    #[test]
    fn test_from_str_roundtrip() {
        for role in Role::all() {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("Manager".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        assert!(matches!(
            "owner".parse::<Role>(),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_serde_format_matches_as_str() {
        for role in Role::all() {
            let json = serde_json::to_string(role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }
}
