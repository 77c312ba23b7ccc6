// Monitoring status (Nagios/Icinga plugin return codes)

use serde::{Deserialize, Serialize};

/// Status reported to the monitoring system
///
/// The discriminants are the process exit codes the monitoring system expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    /// Last success is within the grace period
    Ok = 0,
    /// Reserved: part of the plugin contract, never produced by the recency check
    Warning = 1,
    /// The monitored process is unhealthy
    Critical = 2,
    /// The checker itself could not reach a determination
    Unknown = 3,
}

impl CheckStatus {
    pub fn exit_code(self) -> u8 {
        self as u8
    }

    pub fn from_exit_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CheckStatus::Ok),
            1 => Some(CheckStatus::Warning),
            2 => Some(CheckStatus::Critical),
            3 => Some(CheckStatus::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Ok => write!(f, "OK"),
            CheckStatus::Warning => write!(f, "WARNING"),
            CheckStatus::Critical => write!(f, "CRITICAL"),
            CheckStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_match_plugin_contract() {
        assert_eq!(CheckStatus::Ok.exit_code(), 0);
        assert_eq!(CheckStatus::Warning.exit_code(), 1);
        assert_eq!(CheckStatus::Critical.exit_code(), 2);
        assert_eq!(CheckStatus::Unknown.exit_code(), 3);
    }

    #[test]
    fn test_from_exit_code() {
        for status in [
            CheckStatus::Ok,
            CheckStatus::Warning,
            CheckStatus::Critical,
            CheckStatus::Unknown,
        ] {
            assert_eq!(CheckStatus::from_exit_code(status.exit_code()), Some(status));
        }
        assert_eq!(CheckStatus::from_exit_code(4), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CheckStatus::Critical.to_string(), "CRITICAL");
        assert_eq!(CheckStatus::Ok.to_string(), "OK");
    }
}
