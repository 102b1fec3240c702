//! Account records and credential verification.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use docuvault_session_store::UserId;

/// A registered account.
///
/// The password hash stays private to this module; callers only ever see
/// verification outcomes.
#[derive(Clone, Debug)]
pub struct Account {
    /// Stable account identifier.
    pub id: UserId,
    /// Login email, unique across the directory.
    pub email: String,
    password_hash: String,
}

/// Account directory errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DirectoryError {
    /// Registration with an email that already has an account.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// Unknown email or wrong password. Deliberately not distinguished.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Hashing or backend failure.
    #[error("account directory failure: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl DirectoryError {
    #[must_use]
    fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

/// Where accounts live and how credentials are checked.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Creates an account with a hashed password.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::EmailTaken`] if the email is already registered.
    async fn register(&self, email: &str, password: &str) -> Result<Account, DirectoryError>;

    /// Verifies an email/password pair.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::InvalidCredentials`] for an unknown email or a
    /// wrong password, without revealing which.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Account, DirectoryError>;
}

/// In-memory account directory keyed by email.
pub struct MemoryAccountDirectory {
    accounts: RwLock<HashMap<String, Account>>,
    next_id: AtomicI64,
    bcrypt_cost: u32,
}

impl MemoryAccountDirectory {
    /// Creates an empty directory with the default bcrypt cost.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bcrypt_cost(bcrypt::DEFAULT_COST)
    }

    /// Creates an empty directory with an explicit bcrypt cost. Tests use
    /// a low cost to keep hashing fast.
    #[must_use]
    pub fn with_bcrypt_cost(bcrypt_cost: u32) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            bcrypt_cost,
        }
    }
}

impl Default for MemoryAccountDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountDirectory for MemoryAccountDirectory {
    #[tracing::instrument(skip(self, password))]
    async fn register(&self, email: &str, password: &str) -> Result<Account, DirectoryError> {
        let password_hash = bcrypt::hash(password, self.bcrypt_cost)
            .map_err(|e| DirectoryError::internal(e.to_string()))?;

        let mut accounts = self.accounts.write();
        if accounts.contains_key(email) {
            return Err(DirectoryError::EmailTaken);
        }

        let account = Account {
            id: UserId::from(self.next_id.fetch_add(1, Ordering::SeqCst)),
            email: email.to_owned(),
            password_hash,
        };
        accounts.insert(email.to_owned(), account.clone());

        tracing::debug!(%email, user_id = %account.id, "account registered");
        Ok(account)
    }

    #[tracing::instrument(skip(self, password))]
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Account, DirectoryError> {
        let account = {
            let accounts = self.accounts.read();
            accounts.get(email).cloned().ok_or(DirectoryError::InvalidCredentials)?
        };

        let matches = bcrypt::verify(password, &account.password_hash)
            .map_err(|e| DirectoryError::internal(e.to_string()))?;
        if !matches {
            return Err(DirectoryError::InvalidCredentials);
        }

        Ok(account)
    }
}
