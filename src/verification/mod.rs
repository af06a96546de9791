//! Email-code verification for account registration.
//!
//! A short numeric code is issued per address, delivered through a
//! [`MessageSender`], and confirmed within a time and attempt budget.

pub mod codes;
pub mod sender;

pub use codes::{normalize_email, CodeStore, PendingCode, VerifyOutcome};
pub use sender::{MemoryOutbox, Message, MessageSender, RegistrationVerifier};
