use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::policy::normalize;

/// Lifetime of an issued code.
pub const CODE_TTL_SECS: i64 = 120;

/// A code waiting to be verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Pending one-time codes keyed by email, plus addresses that recently verified.
///
/// At most one pending code per address: issuing again overwrites it. Expiry is
/// checked lazily on verification; `evict_expired()` reclaims memory.
#[derive(Clone)]
pub struct VerificationRegistry {
    pending: Arc<DashMap<String, PendingCode>>,
    verified: Arc<DashMap<String, DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
    verified_ttl: Duration,
}

impl VerificationRegistry {
    pub fn new(clock: Arc<dyn Clock>, verified_ttl: Duration) -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            verified: Arc::new(DashMap::new()),
            clock,
            verified_ttl,
        }
    }

    /// Generate a fresh code for `email`, replacing any previous one.
    pub fn issue(&self, email: &str) -> PendingCode {
        let entry = PendingCode {
            code: generate_code(),
            expires_at: self.clock.now() + Duration::seconds(CODE_TTL_SECS),
        };
        self.pending.insert(normalize(email), entry.clone());
        entry
    }

    /// Remove `issued` for `email`, but only if it has not been replaced since.
    pub fn retract(&self, email: &str, issued: &PendingCode) -> bool {
        self.pending
            .remove_if(&normalize(email), |_, current| current == issued)
            .is_some()
    }

    /// Check `code` against the pending entry for `email`.
    ///
    /// A wrong code leaves the entry in place. An expired entry is removed.
    /// A match consumes the entry, so each issued code verifies at most once.
    pub fn verify(&self, email: &str, code: &str) -> Result<(), AppError> {
        let key = normalize(email);
        let now = self.clock.now();

        let entry = match self.pending.get(&key) {
            Some(e) => e.clone(),
            None => return Err(AppError::CodeNotFound),
        };

        if now > entry.expires_at {
            self.pending.remove_if(&key, |_, current| *current == entry);
            return Err(AppError::CodeExpired);
        }

        if code.trim() != entry.code {
            return Err(AppError::CodeMismatch);
        }

        // Lost a race with another verification or a fresh issue.
        if self.pending.remove_if(&key, |_, current| *current == entry).is_none() {
            return Err(AppError::CodeNotFound);
        }

        self.verified.insert(key, now + self.verified_ttl);
        Ok(())
    }

    /// True if `email` verified within the verified TTL.
    pub fn is_verified(&self, email: &str) -> bool {
        let now = self.clock.now();
        self.verified
            .get(&normalize(email))
            .map(|until| now <= *until)
            .unwrap_or(false)
    }

    /// The live pending code for `email`, if any.
    pub fn pending(&self, email: &str) -> Option<PendingCode> {
        let now = self.clock.now();
        self.pending
            .get(&normalize(email))
            .filter(|e| now <= e.expires_at)
            .map(|e| e.clone())
    }

    /// Drop expired codes and verification marks. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.pending.len() + self.verified.len();
        self.pending.retain(|_, e| e.expires_at >= now);
        self.verified.retain(|_, until| *until >= now);
        before.saturating_sub(self.pending.len() + self.verified.len())
    }

    /// Entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Six-digit numeric code, never with a leading zero.
fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000u32).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn registry() -> (VerificationRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let reg = VerificationRegistry::new(clock.clone(), Duration::minutes(30));
        (reg, clock)
    }

    #[test]
    fn test_generated_codes_are_six_digits() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_issue_sets_two_minute_expiry() {
        let (reg, clock) = registry();
        let issued = reg.issue("a@co.com");
        assert_eq!(issued.expires_at, clock.now() + Duration::seconds(120));
        assert_eq!(reg.pending("a@co.com"), Some(issued));
    }

    #[test]
    fn test_correct_code_verifies_once() {
        let (reg, _) = registry();
        let issued = reg.issue("a@co.com");

        assert!(reg.verify("a@co.com", &issued.code).is_ok());
        assert!(reg.is_verified("a@co.com"));
        assert!(matches!(
            reg.verify("a@co.com", &issued.code),
            Err(AppError::CodeNotFound)
        ));
    }

    #[test]
    fn test_never_requested_is_not_found() {
        let (reg, _) = registry();
        assert!(matches!(reg.verify("x@co.com", "123456"), Err(AppError::CodeNotFound)));
    }

    #[test]
    fn test_wrong_code_does_not_consume() {
        let (reg, _) = registry();
        let issued = reg.issue("a@co.com");
        let wrong = if issued.code == "999999" { "100000" } else { "999999" };

        assert!(matches!(reg.verify("a@co.com", wrong), Err(AppError::CodeMismatch)));
        assert!(!reg.is_verified("a@co.com"));
        assert!(reg.verify("a@co.com", &issued.code).is_ok());
    }

    #[test]
    fn test_expired_code_is_rejected_and_removed() {
        let (reg, clock) = registry();
        let issued = reg.issue("a@co.com");

        clock.advance(Duration::seconds(121));
        assert!(matches!(
            reg.verify("a@co.com", &issued.code),
            Err(AppError::CodeExpired)
        ));
        assert!(reg.is_empty());
        assert!(matches!(
            reg.verify("a@co.com", &issued.code),
            Err(AppError::CodeNotFound)
        ));
    }

    #[test]
    fn test_code_valid_at_exact_expiry_instant() {
        let (reg, clock) = registry();
        let issued = reg.issue("a@co.com");
        clock.advance(Duration::seconds(CODE_TTL_SECS));
        assert!(reg.verify("a@co.com", &issued.code).is_ok());
    }

    #[test]
    fn test_reissue_replaces_previous_code() {
        let (reg, _) = registry();
        let first = reg.issue("a@co.com");
        let mut second = reg.issue("a@co.com");
        while second.code == first.code {
            second = reg.issue("a@co.com");
        }

        assert_eq!(reg.len(), 1);
        assert!(matches!(
            reg.verify("a@co.com", &first.code),
            Err(AppError::CodeMismatch)
        ));
        assert!(reg.verify("a@co.com", &second.code).is_ok());
    }

    #[test]
    fn test_addresses_are_normalized() {
        let (reg, _) = registry();
        let issued = reg.issue("  Ana@Co.com ");
        assert!(reg.verify("ana@co.com", &issued.code).is_ok());
        assert!(reg.is_verified("ANA@co.com"));
    }

    #[test]
    fn test_retract_only_removes_own_entry() {
        let (reg, _) = registry();
        let first = reg.issue("a@co.com");
        let second = reg.issue("a@co.com");

        if first != second {
            assert!(!reg.retract("a@co.com", &first));
            assert_eq!(reg.pending("a@co.com"), Some(second.clone()));
        }
        assert!(reg.retract("a@co.com", &second));
        assert!(reg.pending("a@co.com").is_none());
    }

    #[test]
    fn test_verified_mark_expires() {
        let (reg, clock) = registry();
        let issued = reg.issue("a@co.com");
        reg.verify("a@co.com", &issued.code).unwrap();

        clock.advance(Duration::minutes(31));
        assert!(!reg.is_verified("a@co.com"));
    }

    #[test]
    fn test_evict_expired() {
        let (reg, clock) = registry();
        reg.issue("a@co.com");
        clock.advance(Duration::seconds(60));
        reg.issue("b@co.com");
        clock.advance(Duration::seconds(90));

        assert_eq!(reg.evict_expired(), 1);
        assert!(reg.pending("a@co.com").is_none());
        assert!(reg.pending("b@co.com").is_some());
    }

    #[test]
    fn test_different_emails_do_not_interfere() {
        let (reg, _) = registry();
        let a = reg.issue("a@co.com");
        let b = reg.issue("b@co.com");

        assert!(reg.verify("a@co.com", &a.code).is_ok());
        assert_eq!(reg.pending("b@co.com"), Some(b));
    }
}
