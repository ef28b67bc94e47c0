use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a payout destination (one ledger/network).
///
/// Destinations are keyed by the human-readable address prefix of the
/// network they pay out on, e.g. `titan` for `titan1...` addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(String);

impl DestinationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DestinationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DestinationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A recipient address on a destination ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipient(String);

impl Recipient {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the human-readable prefix of a bech32-style address.
    ///
    /// The prefix is everything before the last `1` separator. Addresses
    /// without a separator, or with nothing before it, have no prefix.
    pub fn prefix(&self) -> Option<&str> {
        match self.0.rfind('1') {
            Some(0) | None => None,
            Some(idx) => Some(&self.0[..idx]),
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Recipient {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for Recipient {
    fn from(address: String) -> Self {
        Self(address)
    }
}

/// A non-negative quantity expressed in the destination's base denomination.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle routing a reply back to whoever submitted a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginRef(String);

impl OriginRef {
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OriginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OriginRef {
    fn from(origin: &str) -> Self {
        Self::new(origin)
    }
}

impl From<String> for OriginRef {
    fn from(origin: String) -> Self {
        Self(origin)
    }
}

/// One (recipient, amount) leg of a batched transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub recipient: Recipient,
    pub amount: Amount,
}

impl Payout {
    pub fn new(recipient: impl Into<Recipient>, amount: u64) -> Self {
        Self {
            recipient: recipient.into(),
            amount: Amount(amount),
        }
    }
}

/// A single payout request waiting to be batched.
///
/// Immutable once created; the batch worker consumes it after one drain
/// attempt whatever the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    destination: DestinationId,
    payout: Payout,
    origin: OriginRef,
}

impl WorkItem {
    pub fn new(
        destination: impl Into<DestinationId>,
        recipient: impl Into<Recipient>,
        amount: u64,
        origin: impl Into<OriginRef>,
    ) -> Self {
        Self {
            destination: destination.into(),
            payout: Payout::new(recipient, amount),
            origin: origin.into(),
        }
    }

    pub fn destination(&self) -> &DestinationId {
        &self.destination
    }

    pub fn recipient(&self) -> &Recipient {
        &self.payout.recipient
    }

    pub fn amount(&self) -> Amount {
        self.payout.amount
    }

    pub fn origin(&self) -> &OriginRef {
        &self.origin
    }

    pub fn payout(&self) -> &Payout {
        &self.payout
    }
}
