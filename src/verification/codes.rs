//! One-time numeric codes keyed by email address.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::Serialize;

use crate::config::VerificationConfig;
use crate::error::{Result, VitrinaError};

const MIN_CODE_LENGTH: usize = 4;
const MAX_CODE_LENGTH: usize = 10;

/// A code waiting to be confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCode {
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
}

impl PendingCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Result of checking a submitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum VerifyOutcome {
    Verified,
    /// Wrong code; `remaining` guesses are left.
    Mismatch { remaining: u32 },
    Expired,
    TooManyAttempts,
    /// No code was issued for the address, or it was already consumed.
    NotFound,
}

/// Lower-case and validate an email address.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(VitrinaError::verification(format!(
            "invalid email address: {:?}",
            email
        )))
    }
}

/// Transient store of issued codes.
///
/// Nothing here is persisted. Every operation takes the current time so
/// expiry is deterministic under test.
#[derive(Debug, Clone)]
pub struct CodeStore {
    config: VerificationConfig,
    pending: HashMap<String, PendingCode>,
}

impl CodeStore {
    pub fn new(config: VerificationConfig) -> Self {
        Self {
            config,
            pending: HashMap::new(),
        }
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Issue a fresh code for `email`, replacing any earlier one.
    pub fn issue(&mut self, email: &str, now: DateTime<Utc>) -> Result<String> {
        self.issue_with_rng(email, now, &mut rand::rng())
    }

    /// Like [`issue`](Self::issue), drawing digits from `rng`.
    pub fn issue_with_rng<R: Rng + ?Sized>(
        &mut self,
        email: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<String> {
        let email = normalize_email(email)?;
        let length = self.config.code_length.clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH);
        let code: String = (0..length)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect();

        let ttl = i64::try_from(self.config.ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        let expires_at = now
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        if self
            .pending
            .insert(
                email.clone(),
                PendingCode {
                    code: code.clone(),
                    issued_at: now,
                    expires_at,
                    attempts: 0,
                },
            )
            .is_some()
        {
            tracing::debug!(email = %email, "replaced pending verification code");
        }

        Ok(code)
    }

    /// Check `code` for `email`.
    ///
    /// A verified, expired or exhausted code is removed; a mismatch counts
    /// against the attempt budget.
    pub fn verify(&mut self, email: &str, code: &str, now: DateTime<Utc>) -> VerifyOutcome {
        let Ok(email) = normalize_email(email) else {
            return VerifyOutcome::NotFound;
        };
        let Some(pending) = self.pending.get_mut(&email) else {
            return VerifyOutcome::NotFound;
        };

        if pending.is_expired(now) {
            self.pending.remove(&email);
            return VerifyOutcome::Expired;
        }

        if pending.code == code.trim() {
            self.pending.remove(&email);
            return VerifyOutcome::Verified;
        }

        pending.attempts += 1;
        let max_attempts = self.config.max_attempts.max(1);
        if pending.attempts >= max_attempts {
            self.pending.remove(&email);
            tracing::info!(email = %email, "verification code withdrawn after too many attempts");
            VerifyOutcome::TooManyAttempts
        } else {
            VerifyOutcome::Mismatch {
                remaining: max_attempts - pending.attempts,
            }
        }
    }

    /// Drop the pending code for `email`, if any.
    pub fn withdraw(&mut self, email: &str) -> Option<PendingCode> {
        let email = normalize_email(email).ok()?;
        self.pending.remove(&email)
    }

    pub fn pending(&self, email: &str) -> Option<&PendingCode> {
        let email = normalize_email(email).ok()?;
        self.pending.get(&email)
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, pending| !pending.is_expired(now));
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for CodeStore {
    fn default() -> Self {
        Self::new(VerificationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Tienda.GT ").unwrap(), "ana@tienda.gt");
        assert!(normalize_email("ana").is_err());
        assert!(normalize_email("@tienda.gt").is_err());
        assert!(normalize_email("ana@tienda").is_err());
        assert!(normalize_email("ana@@tienda.gt").is_err());
        assert!(normalize_email("ana maria@tienda.gt").is_err());
    }

    #[test]
    fn test_issue_generates_digits() {
        let mut store = CodeStore::default();
        let code = store.issue("ana@tienda.gt", now()).unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_issue_is_deterministic_with_seeded_rng() {
        let mut a = CodeStore::default();
        let mut b = CodeStore::default();
        let code_a = a
            .issue_with_rng("ana@tienda.gt", now(), &mut StdRng::seed_from_u64(7))
            .unwrap();
        let code_b = b
            .issue_with_rng("ana@tienda.gt", now(), &mut StdRng::seed_from_u64(7))
            .unwrap();
        assert_eq!(code_a, code_b);
    }

    #[test]
    fn test_code_length_is_clamped() {
        let mut store = CodeStore::new(VerificationConfig {
            code_length: 1,
            ..Default::default()
        });
        assert_eq!(store.issue("ana@tienda.gt", now()).unwrap().len(), 4);
    }

    #[test]
    fn test_verify_success_consumes_code() {
        let mut store = CodeStore::default();
        let code = store.issue("ana@tienda.gt", now()).unwrap();

        assert_eq!(
            store.verify("ANA@tienda.gt", &code, now()),
            VerifyOutcome::Verified
        );
        assert_eq!(
            store.verify("ana@tienda.gt", &code, now()),
            VerifyOutcome::NotFound
        );
    }

    #[test]
    fn test_verify_mismatch_counts_attempts() {
        let mut store = CodeStore::default();
        let code = store.issue("ana@tienda.gt", now()).unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        assert_eq!(
            store.verify("ana@tienda.gt", wrong, now()),
            VerifyOutcome::Mismatch { remaining: 2 }
        );
        assert_eq!(
            store.verify("ana@tienda.gt", wrong, now()),
            VerifyOutcome::Mismatch { remaining: 1 }
        );
        assert_eq!(
            store.verify("ana@tienda.gt", wrong, now()),
            VerifyOutcome::TooManyAttempts
        );
        // The right code no longer works once withdrawn
        assert_eq!(
            store.verify("ana@tienda.gt", &code, now()),
            VerifyOutcome::NotFound
        );
    }

    #[test]
    fn test_verify_expired() {
        let mut store = CodeStore::default();
        let code = store.issue("ana@tienda.gt", now()).unwrap();
        let later = now() + TimeDelta::seconds(600);

        assert_eq!(
            store.verify("ana@tienda.gt", &code, later),
            VerifyOutcome::Expired
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_reissue_replaces_previous_code() {
        let mut store = CodeStore::default();
        let mut rng = StdRng::seed_from_u64(1);
        let first = store
            .issue_with_rng("ana@tienda.gt", now(), &mut rng)
            .unwrap();
        let second = store
            .issue_with_rng("ana@tienda.gt", now(), &mut rng)
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.pending("ana@tienda.gt").unwrap().code, second);
        if first != second {
            assert!(matches!(
                store.verify("ana@tienda.gt", &first, now()),
                VerifyOutcome::Mismatch { .. }
            ));
        }
    }

    #[test]
    fn test_purge_expired() {
        let mut store = CodeStore::default();
        store.issue("ana@tienda.gt", now()).unwrap();
        store
            .issue("luis@tienda.gt", now() + TimeDelta::seconds(300))
            .unwrap();

        let purged = store.purge_expired(now() + TimeDelta::seconds(700));
        assert_eq!(purged, 1);
        assert!(store.pending("ana@tienda.gt").is_none());
        assert!(store.pending("luis@tienda.gt").is_some());
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        let mut store = CodeStore::default();
        let err = store.issue("no-es-correo", now()).unwrap_err();
        assert!(matches!(err, VitrinaError::Verification { .. }));
        assert_eq!(
            store.verify("no-es-correo", "123456", now()),
            VerifyOutcome::NotFound
        );
    }
}
