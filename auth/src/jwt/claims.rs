use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::policy::TokenPolicy;

/// Claims carried by an access token.
///
/// `sub` and `role` identify the caller; the registered claims `iss`, `aud`,
/// `iat` and `exp` come from the issuing [`TokenPolicy`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Authorization tag of the subject
    pub role: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for a user issued now.
    pub fn for_user(user_id: impl ToString, role: impl ToString, policy: &TokenPolicy) -> Self {
        Self::issued_at(user_id, role, policy, Utc::now())
    }

    /// Claims for a user issued at a given instant.
    pub fn issued_at(
        user_id: impl ToString,
        role: impl ToString,
        policy: &TokenPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        let expiration = now + policy.time_to_live;

        Self {
            sub: user_id.to_string(),
            role: role.to_string(),
            iss: policy.issuer.clone(),
            aud: policy.audience.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_for_user_uses_policy() {
        let policy = TokenPolicy::with_expiration_days("issuer", "audience", 10);
        let claims = Claims::for_user("user123", "admin", &policy);

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.iss, "issuer");
        assert_eq!(claims.aud, "audience");
        assert_eq!(claims.exp - claims.iat, 10 * 24 * 60 * 60);
    }

    #[test]
    fn test_issued_at_fixed_instant() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = Claims::issued_at("user123", "user", &TokenPolicy::default(), now);

        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(
            claims.exp,
            Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap().timestamp()
        );
    }
}
