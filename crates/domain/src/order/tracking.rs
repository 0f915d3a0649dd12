//! Carrier tracking numbers issued at the ship transition.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fixed prefix of every tracking number.
pub const TRACKING_PREFIX: &str = "TRK";

const TRACKING_DIGITS: usize = 10;

/// Opaque shipment identifier: [`TRACKING_PREFIX`] followed by ten digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingNumber(String);

impl TrackingNumber {
    /// Issues a new random tracking number.
    pub fn generate() -> Self {
        let digits: u64 = rand::rng().random_range(0..10_000_000_000);
        Self(format!("{TRACKING_PREFIX}{digits:0width$}", width = TRACKING_DIGITS))
    }

    /// Accepts an existing tracking number if it has the expected shape.
    pub fn parse(value: &str) -> Option<Self> {
        Self::is_well_formed(value).then(|| Self(value.to_string()))
    }

    /// Returns true for the prefix followed by exactly ten ASCII digits.
    pub fn is_well_formed(value: &str) -> bool {
        value.strip_prefix(TRACKING_PREFIX).is_some_and(|digits| {
            digits.len() == TRACKING_DIGITS && digits.bytes().all(|b| b.is_ascii_digit())
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
