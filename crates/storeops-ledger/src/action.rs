//! # Carton Actions
//!
//! The four ways a carton count can change, and the validated request type
//! that carries one into [`CartonLedger::append`](crate::CartonLedger::append).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::LedgerError;

/// A carton ledger action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartonAction {
    /// Cartons received: total grows by the amount.
    Add,
    /// Cartons sold or written off: total shrinks by the amount, floored at 0.
    Remove,
    /// Physical recount: total becomes the amount.
    Set,
    /// Clear the count: total becomes 0. Takes no amount.
    Reset,
}

impl CartonAction {
    /// Returns all actions.
    pub fn all() -> &'static [CartonAction] {
        &[Self::Add, Self::Remove, Self::Set, Self::Reset]
    }

    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Set => "set",
            Self::Reset => "reset",
        }
    }

    /// Whether the action needs an amount.
    pub fn takes_amount(&self) -> bool {
        !matches!(self, Self::Reset)
    }
}

impl std::fmt::Display for CartonAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CartonAction {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "set" => Ok(Self::Set),
            "reset" => Ok(Self::Reset),
            other => Err(LedgerError::UnknownAction(other.to_string())),
        }
    }
}

/// A validated request to change the carton count.
///
/// `amount` is always `Some` for add, remove and set, and always `None`
/// for reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartonChange {
    action: CartonAction,
    amount: Option<u32>,
    employee_name: String,
    note: String,
}

impl CartonChange {
    /// Build a change from typed parts.
    ///
    /// A reset discards any supplied amount.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingAmount`] if add, remove or set has no amount.
    pub fn new(
        action: CartonAction,
        amount: Option<u32>,
        employee_name: impl Into<String>,
        note: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        let amount = if action.takes_amount() {
            Some(amount.ok_or(LedgerError::MissingAmount { action })?)
        } else {
            None
        };
        Ok(Self {
            action,
            amount,
            employee_name: employee_name.into(),
            note: note.into(),
        })
    }

    /// Build a change from untyped input, as received from a form or CLI.
    ///
    /// Rejects unknown action names and negative or out-of-range amounts
    /// instead of defaulting them.
    pub fn parse(
        action: &str,
        amount: Option<i64>,
        employee_name: impl Into<String>,
        note: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        let action: CartonAction = action.parse()?;
        let amount = match amount {
            Some(n) if n < 0 => return Err(LedgerError::NegativeAmount(n)),
            Some(n) => Some(u32::try_from(n).map_err(|_| LedgerError::AmountTooLarge(n))?),
            None => None,
        };
        Self::new(action, amount, employee_name, note)
    }

    /// Receive `amount` cartons.
    pub fn add(amount: u32, employee_name: impl Into<String>) -> Self {
        Self::with_amount(CartonAction::Add, amount, employee_name)
    }

    /// Take `amount` cartons out.
    pub fn remove(amount: u32, employee_name: impl Into<String>) -> Self {
        Self::with_amount(CartonAction::Remove, amount, employee_name)
    }

    /// Recount to exactly `amount` cartons.
    pub fn set(amount: u32, employee_name: impl Into<String>) -> Self {
        Self::with_amount(CartonAction::Set, amount, employee_name)
    }

    /// Zero the count.
    pub fn reset(employee_name: impl Into<String>) -> Self {
        Self {
            action: CartonAction::Reset,
            amount: None,
            employee_name: employee_name.into(),
            note: String::new(),
        }
    }

    /// Attach a free-text note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn action(&self) -> CartonAction {
        self.action
    }

    pub fn amount(&self) -> Option<u32> {
        self.amount
    }

    pub fn employee_name(&self) -> &str {
        &self.employee_name
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    fn with_amount(action: CartonAction, amount: u32, employee_name: impl Into<String>) -> Self {
        Self {
            action,
            amount: Some(amount),
            employee_name: employee_name.into(),
            note: String::new(),
        }
    }
}
