//! Cached authentication state for one authority session.

use chrono::{DateTime, Duration, Utc};

/// Issued tokens are valid for about six hours.
const TOKEN_VALIDITY_HOURS: i64 = 6;
/// Re-authenticate this long before the token actually lapses.
const EXPIRY_MARGIN_MINUTES: i64 = 5;

/// Access token plus symmetric session key, replaced wholesale on every
/// re-authentication; never partially mutated.
#[derive(Debug, Clone)]
pub struct EwbSession {
    pub token: String,
    pub session_key: Vec<u8>,
    pub expires_at: DateTime<Utc>,
}

impl EwbSession {
    pub fn new(token: String, session_key: Vec<u8>) -> Self {
        Self {
            token,
            session_key,
            expires_at: Utc::now() + Duration::hours(TOKEN_VALIDITY_HOURS),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::minutes(EXPIRY_MARGIN_MINUTES) >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_not_expired() {
        let session = EwbSession::new("token".into(), vec![0; 32]);
        assert!(!session.is_expired());
    }

    #[test]
    fn session_expires_within_margin() {
        let mut session = EwbSession::new("token".into(), vec![0; 32]);
        session.expires_at = Utc::now() + Duration::minutes(2);
        assert!(session.is_expired());

        session.expires_at = Utc::now() - Duration::hours(1);
        assert!(session.is_expired());
    }
}
