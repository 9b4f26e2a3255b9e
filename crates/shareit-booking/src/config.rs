use std::{fmt, str::FromStr};

use chrono::Duration;
use thiserror::Error;

/// Whether `create` refuses windows that collide with an active booking of
/// the same item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    Strict,
    #[default]
    Permissive,
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapPolicy::Strict => f.write_str("strict"),
            OverlapPolicy::Permissive => f.write_str("permissive"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown overlap policy '{0}', expected 'strict' or 'permissive'")]
pub struct UnknownOverlapPolicy(pub String);

impl FromStr for OverlapPolicy {
    type Err = UnknownOverlapPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(OverlapPolicy::Strict),
            "permissive" => Ok(OverlapPolicy::Permissive),
            _ => Err(UnknownOverlapPolicy(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub overlap_policy: OverlapPolicy,
    /// Subtracted from "now" when looking up an item's last booking.
    pub last_booking_skew: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overlap_policy: OverlapPolicy::default(),
            last_booking_skew: Duration::zero(),
        }
    }
}

impl EngineConfig {
    pub fn strict() -> Self {
        Self {
            overlap_policy: OverlapPolicy::Strict,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_policy_parses_case_insensitively() {
        assert_eq!(" Strict ".parse::<OverlapPolicy>(), Ok(OverlapPolicy::Strict));
        assert_eq!("PERMISSIVE".parse::<OverlapPolicy>(), Ok(OverlapPolicy::Permissive));
        assert!("lenient".parse::<OverlapPolicy>().is_err());
    }
}
