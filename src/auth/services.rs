use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::{
    dto::{RegisterRequest, UserProfile},
    jwt::JwtKeys,
    password::{hash_password, verify_dummy, verify_password},
};
use crate::users::{Phone, StoreError, User, UserStore};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("email {0} is already registered")]
    DuplicateEmail(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail(email) => AuthError::DuplicateEmail(email),
            StoreError::Database(e) => AuthError::Internal(e.into()),
        }
    }
}

/// Registration, login and profile lookup on top of a [`UserStore`].
/// Holds no mutable state of its own; clones share the store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    /// Create an account and issue its first token. Input is expected to
    /// be validated and the email normalized.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> Result<UserProfile, AuthError> {
        // Fast path only; the store's unique constraint is what guarantees it.
        if self.store.exists_by_email(&req.email).await? {
            warn!("email already registered");
            return Err(AuthError::DuplicateEmail(req.email));
        }

        let hash = hash_password(&req.password)?;
        let phones = req.phones.into_iter().map(Phone::from).collect();
        let user = User::new(req.name, req.email, hash, phones);

        let mut user = self.store.save(user).await.map_err(|e| {
            if let StoreError::DuplicateEmail(_) = e {
                warn!("email registered concurrently");
            }
            AuthError::from(e)
        })?;

        user.token = Some(self.keys.sign(&user.email)?);
        let user = self.store.save(user).await?;

        info!(user_id = %user.id, "user registered");
        Ok(UserProfile::from(&user))
    }

    /// Verify credentials and rotate the user's token. Unknown email,
    /// wrong password and unreadable stored hash all surface as
    /// [`AuthError::InvalidCredentials`]. Paths without a stored hash still
    /// pay for one argon2 verification.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let mut user = match self.store.find_by_email(email).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                verify_dummy(password);
                warn!("login unknown email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                verify_dummy(password);
                error!(error = %e, "find_by_email failed during login");
                return Err(AuthError::InvalidCredentials);
            }
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = %user.id, "login invalid password");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, user_id = %user.id, "verify_password failed");
                return Err(AuthError::InvalidCredentials);
            }
        }

        let token = self.keys.sign(&user.email)?;
        user.record_login(token);
        let user = self.store.save(user).await?;

        info!(user_id = %user.id, "user logged in");
        Ok(UserProfile::from(&user))
    }

    /// Profile of an already authenticated email.
    #[instrument(skip(self))]
    pub async fn get_profile(&self, email: &str) -> Result<UserProfile, AuthError> {
        match self.store.find_by_email(email).await? {
            Some(user) => Ok(UserProfile::from(&user)),
            None => {
                error!("authenticated email has no user");
                Err(AuthError::NotFound(email.to_string()))
            }
        }
    }
}
