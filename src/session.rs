use std::sync::{Arc, RwLock};

use jsonwebtoken::{DecodingKey, Validation};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::storage::{MemoryStorage, TokenStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

impl SessionState {
    fn of(token: &Option<String>) -> Self {
        if token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct Claims {
    sub: Option<String>,
}

/// Holds the bearer token for the process.
///
/// The durable value is read once when the store is opened; from then on the
/// in-memory copy is authoritative since every write goes through this store.
/// Storage failures are logged and otherwise treated as "no session".
///
/// `login` and `logout` are serialized: each holds the transition lock across
/// its storage call, so memory and storage always end on the same token.
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
    transition: Mutex<()>,
    token: RwLock<Option<String>>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub async fn open(storage: Arc<dyn TokenStorage>) -> Self {
        let token = match storage.read().await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                warn!("Failed to read persisted session, starting anonymous: {err}");
                None
            }
        };
        let state = SessionState::of(&token);
        info!(?state, "Session restored");

        let (sender, _) = watch::channel(state);
        Self {
            storage,
            transition: Mutex::new(()),
            token: RwLock::new(token),
            state: sender,
        }
    }

    pub async fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new())).await
    }

    pub fn get_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// An empty token is not a session; it signs out instead.
    pub async fn login(&self, token: &str) {
        if token.is_empty() {
            warn!("Ignoring empty session token");
            return self.logout().await;
        }

        let _transition = self.transition.lock().await;
        if let Err(err) = self.storage.write(token).await {
            warn!("Failed to persist session token: {err}");
        }
        self.replace(Some(token.to_string()));
        debug!("Session authenticated");
    }

    pub async fn logout(&self) {
        let _transition = self.transition.lock().await;
        if let Err(err) = self.storage.remove().await {
            warn!("Failed to clear persisted session token: {err}");
        }
        self.replace(None);
        debug!("Session cleared");
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Receives every state transition; the current state is visible immediately.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The `sub` claim of the current token, when it is a JWT.
    ///
    /// The signature is not checked. Use for display only.
    pub fn subject(&self) -> Option<String> {
        let token = self.get_token()?;
        let header = jsonwebtoken::decode_header(&token).ok()?;

        let mut validation = Validation::new(header.alg);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<Claims>(&token, &DecodingKey::from_secret(&[]), &validation)
            .ok()?
            .claims
            .sub
    }

    fn replace(&self, token: Option<String>) {
        let state = SessionState::of(&token);
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
        self.state.send_replace(state);
    }
}
