//! Authentication types for JWT claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::MemberId;

/// Kind of token a set of claims was issued as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token accepted on API requests.
    Access,
    /// Long-lived token only accepted for renewal.
    Refresh,
}

/// JWT claims carried by staff tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (internal member ID).
    pub sub: MemberId,
    /// Login account name.
    pub account: String,
    /// Member's role.
    pub role: String,
    /// Whether this is an access or refresh token.
    pub token_type: TokenType,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a member.
    #[must_use]
    pub fn new(
        member_id: MemberId,
        account: &str,
        role: &str,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: member_id,
            account: account.to_string(),
            role: role.to_string(),
            token_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the member ID from claims.
    #[must_use]
    pub const fn member_id(&self) -> MemberId {
        self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_correct_fields() {
        let expires_at = Utc::now() + Duration::hours(1);
        let claims = Claims::new(MemberId(5), "alice", "admin", TokenType::Access, expires_at);

        assert_eq!(claims.member_id(), MemberId(5));
        assert_eq!(claims.account, "alice");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_token_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TokenType::Refresh).unwrap(),
            "\"refresh\""
        );
    }
}
