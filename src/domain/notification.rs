use crate::domain::work::{Amount, OriginRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome signal delivered to the originator of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    /// Reaction attached to the originator's message.
    pub fn reaction(&self) -> &'static str {
        match self {
            Outcome::Success => "✅",
            Outcome::Failure => "❌",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Failure => f.write_str("failure"),
        }
    }
}

/// A delivered outcome, as recorded by sinks that keep or print them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub origin: OriginRef,
    pub outcome: Outcome,
    pub message: String,
}

impl Notification {
    pub fn new(origin: impl Into<OriginRef>, outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            outcome,
            message: message.into(),
        }
    }
}

/// Describes how base-unit amounts are presented to originators.
///
/// Amounts travel through the system in the `base` unit; replies show them
/// in the `display` unit, which is `10^exponent` base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Denomination {
    pub base: String,
    pub display: String,
    pub exponent: u32,
}

impl Default for Denomination {
    fn default() -> Self {
        Self {
            base: "uttnt".to_string(),
            display: "ttnt".to_string(),
            exponent: 6,
        }
    }
}

impl Denomination {
    /// Converts a base amount to whole display units, truncating any remainder.
    pub fn to_display(&self, amount: Amount) -> u64 {
        match 10u64.checked_pow(self.exponent) {
            Some(scale) => amount.value() / scale,
            None => 0,
        }
    }

    pub fn dispensed_message(&self, amount: Amount) -> String {
        format!(
            "Dispensed 💸 `{}` {}",
            self.to_display(amount),
            self.display
        )
    }

    pub fn failure_message(&self, amount: Amount, reason: &str) -> String {
        format!(
            "Failed to dispense `{}` {}: {}",
            self.to_display(amount),
            self.display,
            reason
        )
    }
}
