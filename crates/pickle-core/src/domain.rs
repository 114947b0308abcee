use serde::{Deserialize, Serialize};

/// Lifecycle state of a subscription row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
}

impl SubscriptionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery state of a digest row.
///
/// A digest is written as `ReadyToSend` by the generator and transitioned
/// exactly once by dispatch, to either `Sent` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestStatus {
    ReadyToSend,
    Sent,
    Failed,
}

impl DigestStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DigestStatus::ReadyToSend => "ready_to_send",
            DigestStatus::Sent => "sent",
            DigestStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DigestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_status_round_trips_through_serde() {
        let json = serde_json::to_string(&DigestStatus::ReadyToSend).unwrap();
        assert_eq!(json, "\"ready_to_send\"");
        let back: DigestStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DigestStatus::ReadyToSend);
    }

    #[test]
    fn status_strings_match_stored_values() {
        assert_eq!(SubscriptionStatus::Active.as_str(), "active");
        assert_eq!(SubscriptionStatus::Expired.as_str(), "expired");
        assert_eq!(DigestStatus::Sent.as_str(), "sent");
        assert_eq!(DigestStatus::Failed.as_str(), "failed");
    }
}
