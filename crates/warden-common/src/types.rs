//! Core domain types shared across the warden crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical name of a supervised target - the unique key under which the
/// supervisor tracks state for one external program.
///
/// # Example
/// ```
/// use warden_common::TargetName;
///
/// let name = TargetName::from("billing-exporter");
/// assert_eq!(name.as_str(), "billing-exporter");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetName(String);

impl TargetName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for TargetName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TargetName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_name() {
        let name = TargetName::from("cash-register");
        assert_eq!(name.as_str(), "cash-register");
        assert_eq!(name.to_string(), "cash-register");
        assert!(!name.is_empty());
        assert!(TargetName::from("").is_empty());
    }
}
