//! Delivery of verification codes.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::config::VerificationConfig;
use crate::error::{Result, VitrinaError};
use crate::verification::codes::{normalize_email, CodeStore, VerifyOutcome};

/// An outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// External collaborator that delivers messages.
pub trait MessageSender: Send + Sync {
    fn send(&self, message: &Message) -> Result<()>;
}

impl<T: MessageSender + ?Sized> MessageSender for Arc<T> {
    fn send(&self, message: &Message) -> Result<()> {
        (**self).send(message)
    }
}

/// Sender that keeps messages in memory, for development and tests.
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    sent: Mutex<Vec<Message>>,
    reject: bool,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// An outbox whose every delivery fails.
    pub fn rejecting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_to(&self, to: &str) -> Option<Message> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.to == to)
            .cloned()
    }
}

impl MessageSender for MemoryOutbox {
    fn send(&self, message: &Message) -> Result<()> {
        if self.reject {
            return Err(VitrinaError::delivery(format!(
                "outbox rejected message to {}",
                message.to
            )));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Issues registration codes and sends them out.
#[derive(Debug)]
pub struct RegistrationVerifier<S: MessageSender> {
    codes: CodeStore,
    sender: S,
}

impl<S: MessageSender> RegistrationVerifier<S> {
    pub fn new(config: VerificationConfig, sender: S) -> Self {
        Self {
            codes: CodeStore::new(config),
            sender,
        }
    }

    pub fn codes(&self) -> &CodeStore {
        &self.codes
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Issue a code for `email` and deliver it.
    ///
    /// # Errors
    ///
    /// Returns a verification error for a malformed address and a delivery
    /// error when the sender fails. After a failed delivery no code is
    /// pending for the address.
    pub fn start(&mut self, email: &str, now: DateTime<Utc>) -> Result<()> {
        let email = normalize_email(email)?;
        let code = self.codes.issue(&email, now)?;
        let minutes = self.codes.config().ttl_seconds.div_ceil(60);

        let message = Message {
            to: email.clone(),
            subject: "Tu código de verificación".to_string(),
            body: format!(
                "Tu código de verificación es {}. Vence en {} minutos.",
                code, minutes
            ),
        };

        if let Err(err) = self.sender.send(&message) {
            self.codes.withdraw(&email);
            tracing::warn!(email = %email, error = %err, "verification code delivery failed");
            return Err(match err {
                VitrinaError::Delivery { .. } => err,
                other => VitrinaError::delivery(other.to_string()),
            });
        }

        tracing::info!(email = %email, "verification code sent");
        Ok(())
    }

    /// Check a code submitted for `email`.
    pub fn confirm(&mut self, email: &str, code: &str, now: DateTime<Utc>) -> VerifyOutcome {
        self.codes.verify(email, code, now)
    }

    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        self.codes.purge_expired(now)
    }
}
