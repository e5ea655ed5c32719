use chrono::Duration;

/// Fixed issuance parameters shared by every token a service signs.
///
/// Issuer and audience are written into each token and checked again on
/// validation; the time-to-live sets `exp` relative to `iat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPolicy {
    pub issuer: String,
    pub audience: String,
    pub time_to_live: Duration,
}

impl TokenPolicy {
    pub const DEFAULT_EXPIRATION_DAYS: i64 = 10;

    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        time_to_live: Duration,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            time_to_live,
        }
    }

    /// Policy whose tokens expire after `days` days.
    pub fn with_expiration_days(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        days: i64,
    ) -> Self {
        Self::new(issuer, audience, Duration::days(days))
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self::with_expiration_days("user-api", "user-api", Self::DEFAULT_EXPIRATION_DAYS)
    }
}
