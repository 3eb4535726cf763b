use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bearer credential issued on login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn session_expires_at_the_boundary() {
        let issued = Utc::now();
        let session = Session {
            token: "t".into(),
            user_id: Uuid::new_v4(),
            email: "a@b.c".into(),
            issued_at: issued,
            expires_at: issued + Duration::hours(1),
        };
        assert!(!session.is_expired(issued));
        assert!(session.is_expired(issued + Duration::hours(1)));
    }
}
