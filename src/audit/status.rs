//! Integrity status summary derived from a verification run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::verify::VerificationResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityStatus {
    #[serde(flatten)]
    pub verification: VerificationResult,
    pub integrity_percentage: u32,
    pub last_verified: DateTime<Utc>,
}

impl IntegrityStatus {
    pub fn from_verification(verification: VerificationResult, verified_at: DateTime<Utc>) -> Self {
        let integrity_percentage =
            integrity_percentage(verification.verified_logs, verification.total_logs);

        Self {
            verification,
            integrity_percentage,
            last_verified: verified_at,
        }
    }
}

/// Share of verified entries, rounded half up. An empty chain is 100%.
pub fn integrity_percentage(verified_logs: usize, total_logs: usize) -> u32 {
    if total_logs == 0 {
        return 100;
    }
    ((verified_logs as f64 / total_logs as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(integrity_percentage(0, 0), 100);
        assert_eq!(integrity_percentage(10, 10), 100);
        assert_eq!(integrity_percentage(0, 4), 0);
        assert_eq!(integrity_percentage(1, 3), 33);
        assert_eq!(integrity_percentage(2, 3), 67);
        assert_eq!(integrity_percentage(1, 8), 13);
    }

    #[test]
    fn test_status_serializes_flat() {
        let verification = VerificationResult {
            valid: false,
            total_logs: 4,
            verified_logs: 3,
            errors: vec!["Entry #2 (row 2): hash mismatch".to_string()],
        };
        let status = IntegrityStatus::from_verification(verification, Utc::now());
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["valid"], false);
        assert_eq!(json["totalLogs"], 4);
        assert_eq!(json["verifiedLogs"], 3);
        assert_eq!(json["integrityPercentage"], 75);
        assert_eq!(json["errors"].as_array().unwrap().len(), 1);
        assert!(json["lastVerified"].is_string());
    }
}
