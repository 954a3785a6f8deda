//! Client-side state for the travel log: the city collection manager, the
//! remote store it talks to, and the stand-in login gate.

pub mod auth;
pub mod manager;
pub mod scope;
pub mod state;
pub mod store;

pub use auth::{AuthError, AuthGate, AuthState, FakeAccount, User};
pub use manager::CitiesManager;
pub use scope::{ProviderScope, ScopeError};
pub use state::{CitiesState, CityAction, DeletePolicy};
pub use store::{CityStore, HttpCityStore, StoreError};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
