//! Explicitly passed provider handles for consumers.

use std::sync::Arc;

use thiserror::Error;

use crate::{auth::AuthGate, manager::CitiesManager};

/// Accessing a provider that was never installed is a wiring bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("cities state must be used within a CitiesProvider scope")]
    CitiesOutsideProvider,
    #[error("auth state must be used within an AuthProvider scope")]
    AuthOutsideProvider,
}

#[derive(Clone, Default)]
pub struct ProviderScope {
    cities: Option<Arc<CitiesManager>>,
    auth: Option<Arc<AuthGate>>,
}

impl ProviderScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cities(mut self, manager: Arc<CitiesManager>) -> Self {
        self.cities = Some(manager);
        self
    }

    pub fn with_auth(mut self, gate: Arc<AuthGate>) -> Self {
        self.auth = Some(gate);
        self
    }

    pub fn cities(&self) -> Result<Arc<CitiesManager>, ScopeError> {
        self.cities.clone().ok_or(ScopeError::CitiesOutsideProvider)
    }

    pub fn auth(&self) -> Result<Arc<AuthGate>, ScopeError> {
        self.auth.clone().ok_or(ScopeError::AuthOutsideProvider)
    }
}
