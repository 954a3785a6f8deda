//! Stand-in authentication: one fixed account checked in memory.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub avatar: String,
}

/// The only credential pair the gate accepts.
#[derive(Clone, Serialize, Deserialize)]
pub struct FakeAccount {
    pub user: User,
    pub password: String,
}

impl Default for FakeAccount {
    fn default() -> Self {
        Self {
            user: User {
                name: "Jack".into(),
                email: "jack@example.com".into(),
                avatar: "https://i.pravatar.cc/100?u=zz".into(),
            },
            password: "qwerty".into(),
        }
    }
}

// Keeps the password out of logs.
impl std::fmt::Debug for FakeAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeAccount")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub error_message: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    LoggedIn(User),
    LoginFailed,
    LoggedOut,
}

pub fn reduce(state: &AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::LoggedIn(user) => AuthState {
            user: Some(user),
            error_message: None,
        },
        AuthAction::LoginFailed => AuthState {
            error_message: Some(INVALID_CREDENTIALS.to_string()),
            ..state.clone()
        },
        AuthAction::LoggedOut => AuthState::default(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("you must be logged in to view this page")]
    NotAuthenticated,
}

pub struct AuthGate {
    account: FakeAccount,
    state: watch::Sender<AuthState>,
}

impl AuthGate {
    pub fn new(account: FakeAccount) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { account, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    fn dispatch(&self, action: AuthAction) {
        self.state.send_modify(|state| *state = reduce(state, action));
    }

    /// Returns whether the credentials matched.
    pub fn login(&self, email: &str, password: &str) -> bool {
        if email == self.account.user.email && password == self.account.password {
            info!(email, "logged in");
            self.dispatch(AuthAction::LoggedIn(self.account.user.clone()));
            true
        } else {
            warn!(email, "rejected login");
            self.dispatch(AuthAction::LoginFailed);
            false
        }
    }

    pub fn logout(&self) {
        self.dispatch(AuthAction::LoggedOut);
    }

    /// Guard for pages that need a logged-in user.
    pub fn require_user(&self) -> Result<User, AuthError> {
        self.state
            .borrow()
            .user
            .clone()
            .ok_or(AuthError::NotAuthenticated)
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new(FakeAccount::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_credentials_set_user_and_clear_message() {
        let gate = AuthGate::default();
        assert!(!gate.login("jack@example.com", "wrong"));
        assert_eq!(
            gate.snapshot().error_message.as_deref(),
            Some(INVALID_CREDENTIALS)
        );

        assert!(gate.login("jack@example.com", "qwerty"));
        let state = gate.snapshot();
        assert!(state.is_authenticated());
        assert_eq!(state.user.map(|user| user.name), Some("Jack".to_string()));
        assert_eq!(state.error_message, None);
    }

    #[test]
    fn invalid_credentials_leave_user_unset() {
        let gate = AuthGate::default();
        assert!(!gate.login("someone@example.com", "qwerty"));
        assert!(!gate.is_authenticated());
        assert_eq!(gate.require_user(), Err(AuthError::NotAuthenticated));
    }

    #[test]
    fn logout_returns_to_initial_state() {
        let gate = AuthGate::default();
        gate.login("jack@example.com", "qwerty");
        assert_eq!(gate.require_user().map(|user| user.email).as_deref(), Ok("jack@example.com"));

        gate.logout();
        assert_eq!(gate.snapshot(), AuthState::default());
        assert_eq!(gate.require_user(), Err(AuthError::NotAuthenticated));
    }

    #[test]
    fn custom_account_replaces_default_credentials() {
        let account = FakeAccount {
            user: User {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                avatar: String::new(),
            },
            password: "s3cret".into(),
        };
        assert!(!format!("{account:?}").contains("s3cret"));

        let gate = AuthGate::new(account);
        assert!(!gate.login("jack@example.com", "qwerty"));
        assert!(gate.login("ana@example.com", "s3cret"));
    }

    #[tokio::test]
    async fn subscribers_observe_login() {
        let gate = AuthGate::default();
        let mut rx = gate.subscribe();
        gate.login("jack@example.com", "qwerty");
        rx.changed().await.expect("changed");
        assert!(rx.borrow().is_authenticated());
    }
}
