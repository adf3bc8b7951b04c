//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `Session`: Token-based session management with expiry from the provider
//! - `CredentialStore`: Secure OS-level credential storage via keyring
//!
//! Sign-in itself is delegated to the backend's identity endpoint; this
//! module only holds what it hands back.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
