//! Millisecond-epoch fields as both storefronts send them.
//!
//! Apple and Google encode millisecond timestamps as JSON strings
//! (`"1735689600000"`), though numbers appear in some fixtures. A missing,
//! null, or unparseable value deserializes to `None`; it must never be
//! treated as "far future".

use serde::{Deserialize, Deserializer};

/// Deserializes an optional millisecond field from a string or number.
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::Num(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse::<u64>().ok(),
        None => None,
    })
}

/// Treats a missing or zero millisecond value as absent.
pub fn nonzero(value: Option<u64>) -> Option<u64> {
    value.filter(|ms| *ms > 0)
}
