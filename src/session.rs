use crate::config::ClientConfig;
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Mutex, PoisonError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Read side of the account session. Token storage and the login UI belong to the host;
/// the core only reads these values and asks for a login prompt.
pub trait SessionGate: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn user(&self) -> Option<User>;
    fn credit(&self) -> u64;
    fn token(&self) -> Option<String>;
    fn prompt_login(&self);

    /// Called after a generation reports the remaining balance.
    fn update_credit(&self, _credit: u64) {}
}

/// In-memory session used by the CLI host and in tests.
#[derive(Debug, Default)]
pub struct StaticSession {
    token: Mutex<Option<String>>,
    user: Mutex<Option<User>>,
    credit: AtomicU64,
    login_prompts: AtomicUsize,
    login_requested: AtomicBool,
}

impl StaticSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: impl Into<String>, credit: u64) -> Self {
        let session = Self::default();
        session.sign_in(token, None);
        session.credit.store(credit, Ordering::SeqCst);
        session
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        match &config.token {
            Some(token) => Self::authenticated(token.clone(), config.credit.unwrap_or(0)),
            None => Self::anonymous(),
        }
    }

    pub fn with_user(self, user: User) -> Self {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user);
        self
    }

    pub fn sign_in(&self, token: impl Into<String>, user: Option<User>) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
        if user.is_some() {
            *self.user.lock().unwrap_or_else(PoisonError::into_inner) = user;
        }
        self.login_requested.store(false, Ordering::SeqCst);
    }

    pub fn sign_out(&self) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.credit.store(0, Ordering::SeqCst);
    }

    /// How many times the core asked for the login prompt.
    pub fn login_prompts(&self) -> usize {
        self.login_prompts.load(Ordering::SeqCst)
    }

    pub fn login_requested(&self) -> bool {
        self.login_requested.load(Ordering::SeqCst)
    }
}

impl SessionGate for StaticSession {
    fn is_authenticated(&self) -> bool {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn user(&self) -> Option<User> {
        self.user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn credit(&self) -> u64 {
        self.credit.load(Ordering::SeqCst)
    }

    fn token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn prompt_login(&self) {
        log::info!("Login prompt requested");
        self.login_prompts.fetch_add(1, Ordering::SeqCst);
        self.login_requested.store(true, Ordering::SeqCst);
    }

    fn update_credit(&self, credit: u64) {
        log::debug!("Credit balance updated to {}", credit);
        self.credit.store(credit, Ordering::SeqCst);
    }
}
