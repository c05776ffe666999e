//! # Authentication & Authorization
//!
//! PIN login against the employee directory, and role-based access checks.
//!
//! ## PIN Storage
//!
//! PINs are 4 to 8 ASCII digits. Only `SHA-256(employee_uuid || pin)` is
//! kept, hex-encoded. Login is by PIN alone, so every active employee's
//! digest is compared (in constant time) and no two active employees may
//! share a PIN.
//!
//! ## CallerIdentity
//!
//! A successful login yields a [`CallerIdentity`]. Every guarded
//! [`StoreService`](crate::StoreService) operation takes one and checks it
//! with [`require_role`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use storeops_core::{has_access, EmployeeId, Role, StoreError};

use crate::error::ServiceError;

const PIN_MIN_LEN: usize = 4;
const PIN_MAX_LEN: usize = 8;

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of an authenticated employee.
///
/// Only [`EmployeeDirectory::login`] hands these out. The service treats it
/// as a reference to a directory record: role and name are re-read from the
/// directory on every guarded call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerIdentity {
    employee_id: EmployeeId,
    name: String,
    role: Role,
}

impl CallerIdentity {
    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the caller meets `minimum`.
    pub fn has_role(&self, minimum: Role) -> bool {
        has_access(self.role, minimum)
    }

    /// Same id, different claims. Lets tests hand the service a doctored
    /// identity.
    #[cfg(test)]
    pub(crate) fn with_claims(&self, name: &str, role: Role) -> Self {
        Self {
            employee_id: self.employee_id,
            name: name.to_string(),
            role,
        }
    }
}

/// Check that the caller has at least the required role.
pub fn require_role(caller: &CallerIdentity, minimum: Role) -> Result<(), ServiceError> {
    if caller.has_role(minimum) {
        Ok(())
    } else {
        tracing::warn!(
            employee = %caller.employee_id,
            held = %caller.role,
            required = %minimum,
            "access denied"
        );
        Err(ServiceError::Forbidden {
            required: minimum,
            held: caller.role,
        })
    }
}

// ── Employees ───────────────────────────────────────────────────────────────

/// A directory record, including the PIN digest.
///
/// Custom `Debug` redacts the digest.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: Role,
    pin_digest: String,
    pub active: bool,
}

impl std::fmt::Debug for Employee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Employee")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("pin_digest", &"[REDACTED]")
            .field("active", &self.active)
            .finish()
    }
}

impl Employee {
    fn new(name: String, role: Role, pin: &str) -> Self {
        let id = EmployeeId::new();
        Self {
            id,
            name,
            role,
            pin_digest: pin_digest(&id, pin),
            active: true,
        }
    }

    fn verify_pin(&self, pin: &str) -> bool {
        let candidate = pin_digest(&self.id, pin);
        candidate.as_bytes().ct_eq(self.pin_digest.as_bytes()).into()
    }

    /// Public view without the credential.
    pub fn profile(&self) -> EmployeeProfile {
        EmployeeProfile {
            id: self.id,
            name: self.name.clone(),
            role: self.role,
            active: self.active,
        }
    }

    pub(crate) fn identity(&self) -> CallerIdentity {
        CallerIdentity {
            employee_id: self.id,
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Directory record as shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: EmployeeId,
    pub name: String,
    pub role: Role,
    pub active: bool,
}

fn pin_digest(id: &EmployeeId, pin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_uuid().as_bytes());
    hasher.update(pin.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn validate_pin(pin: &str) -> Result<(), StoreError> {
    let len_ok = (PIN_MIN_LEN..=PIN_MAX_LEN).contains(&pin.len());
    if !len_ok || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoreError::InvalidInput(format!(
            "PIN must be {PIN_MIN_LEN} to {PIN_MAX_LEN} digits"
        )));
    }
    Ok(())
}

// ── Directory ───────────────────────────────────────────────────────────────

/// The store's employees.
#[derive(Debug, Clone, Default)]
pub struct EmployeeDirectory {
    employees: Vec<Employee>,
}

impl EmployeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored records.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` if two records share an id, a name is blank, or
    /// a PIN digest is not 64 lowercase hex characters.
    pub fn from_employees(employees: Vec<Employee>) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        for employee in &employees {
            if !seen.insert(employee.id) {
                return Err(StoreError::InvariantViolation(format!(
                    "employee {} appears more than once",
                    employee.id
                )));
            }
            if employee.name.trim().is_empty() {
                return Err(StoreError::InvariantViolation(format!(
                    "employee {} has an empty name",
                    employee.id
                )));
            }
            let digest_ok = employee.pin_digest.len() == 64
                && employee
                    .pin_digest
                    .bytes()
                    .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
            if !digest_ok {
                return Err(StoreError::InvariantViolation(format!(
                    "employee {} has a malformed PIN digest",
                    employee.id
                )));
            }
        }
        Ok(Self { employees })
    }

    /// Add an active employee.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a blank name, a malformed PIN, or a PIN already
    /// held by another active employee.
    pub fn register(&mut self, name: &str, role: Role, pin: &str) -> Result<Employee, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("employee name must not be empty".into()));
        }
        validate_pin(pin)?;
        if !self.matching_pin(pin).is_empty() {
            return Err(StoreError::InvalidInput("PIN is already in use".into()));
        }
        let employee = Employee::new(name.to_string(), role, pin);
        self.employees.push(employee.clone());
        Ok(employee)
    }

    /// Resolve a PIN to a caller identity.
    ///
    /// Digests are salted per employee, so two active records sharing a PIN
    /// cannot be spotted when a snapshot is loaded. Such a PIN is refused
    /// here instead of picking one of the records.
    pub fn login(&self, pin: &str) -> Result<CallerIdentity, ServiceError> {
        match self.matching_pin(pin).as_slice() {
            [employee] => Ok(employee.identity()),
            [] => {
                tracing::warn!("PIN login rejected");
                Err(ServiceError::Unauthorized("invalid PIN".into()))
            }
            several => {
                let ids: Vec<String> = several.iter().map(|e| e.id.to_string()).collect();
                tracing::error!(employees = ?ids, "PIN matches more than one active employee");
                Err(StoreError::InvariantViolation(
                    "PIN matches more than one active employee".into(),
                )
                .into())
            }
        }
    }

    pub fn get(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| &e.id == id)
    }

    /// Look up an active employee by exact name.
    pub fn find_by_name(&self, name: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.active && e.name == name)
    }

    /// Deactivate an employee. Returns `false` for an unknown id.
    pub fn deactivate(&mut self, id: &EmployeeId) -> bool {
        match self.employees.iter_mut().find(|e| &e.id == id) {
            Some(employee) => {
                employee.active = false;
                true
            }
            None => false,
        }
    }

    /// All employees, active or not, in registration order.
    pub fn list(&self) -> Vec<EmployeeProfile> {
        self.employees.iter().map(Employee::profile).collect()
    }

    /// Raw records, for snapshots.
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn active_count(&self) -> usize {
        self.employees.iter().filter(|e| e.active).count()
    }

    /// Every active record is checked so the scan length does not depend on
    /// where the match is.
    fn matching_pin(&self, pin: &str) -> Vec<&Employee> {
        self.employees
            .iter()
            .filter(|e| e.active)
            .filter(|e| e.verify_pin(pin))
            .collect()
    }
}
