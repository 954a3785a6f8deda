//! The single owner of the client-side city cache and selection.
//!
//! Every read and write against the remote store goes through
//! [`CitiesManager`]. Consumers watch [`CitiesState`] snapshots and never talk
//! to the store themselves.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::domain::{unique_countries, City, CityId, CountrySummary, NewCity};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    state::{reduce, CitiesState, CityAction, DeletePolicy},
    store::CityStore,
};

pub const LOAD_CITIES_FAILED: &str = "There was an error loading cities...";
pub const LOAD_CITY_FAILED: &str = "There was an error loading the city...";
pub const CREATE_CITY_FAILED: &str = "There was an error creating the city...";
pub const DELETE_CITY_FAILED: &str = "There was an error deleting the city...";

/// Monotonic ticket counter for one kind of read request.
#[derive(Default)]
struct RequestSequence(AtomicU64);

impl RequestSequence {
    fn issue(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }
}

pub struct CitiesManager {
    store: Arc<dyn CityStore>,
    delete_policy: DeletePolicy,
    state: watch::Sender<CitiesState>,
    load_requests: RequestSequence,
    select_requests: RequestSequence,
}

impl CitiesManager {
    pub fn new(store: Arc<dyn CityStore>, delete_policy: DeletePolicy) -> Arc<Self> {
        let (state, _) = watch::channel(CitiesState::default());
        Arc::new(Self {
            store,
            delete_policy,
            state,
            load_requests: RequestSequence::default(),
            select_requests: RequestSequence::default(),
        })
    }

    /// Builds a manager and runs the once-per-session initial load.
    pub async fn mount(store: Arc<dyn CityStore>, delete_policy: DeletePolicy) -> Arc<Self> {
        let manager = Self::new(store, delete_policy);
        manager.load_all().await;
        manager
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    pub fn subscribe(&self) -> watch::Receiver<CitiesState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> CitiesState {
        self.state.borrow().clone()
    }

    pub fn cities(&self) -> Vec<City> {
        self.state.borrow().cities.clone()
    }

    pub fn current_city(&self) -> Option<City> {
        self.state.borrow().current_city.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn countries(&self) -> Vec<CountrySummary> {
        unique_countries(&self.state.borrow().cities)
    }

    fn dispatch(&self, action: CityAction) {
        let policy = self.delete_policy;
        self.state
            .send_modify(|state| *state = reduce(state, action, policy));
    }

    /// Applies `action` only if `ticket` is still the newest request in
    /// `sequence`. The staleness check runs under the state lock.
    fn dispatch_latest(&self, sequence: &RequestSequence, ticket: u64, action: CityAction) {
        let policy = self.delete_policy;
        self.state.send_modify(|state| {
            let action = if sequence.is_latest(ticket) {
                action
            } else {
                debug!(ticket, "discarding superseded city store response");
                CityAction::Superseded
            };
            *state = reduce(state, action, policy);
        });
    }

    pub async fn load_all(&self) {
        let ticket = self.load_requests.issue();
        self.dispatch(CityAction::Loading);

        let action = match self.store.list().await {
            Ok(cities) => {
                info!(count = cities.len(), "cities loaded");
                CityAction::CitiesLoaded(cities)
            }
            Err(error) => {
                warn!(%error, "failed to load cities");
                CityAction::Rejected(LOAD_CITIES_FAILED.to_string())
            }
        };
        self.dispatch_latest(&self.load_requests, ticket, action);
    }

    /// Selects a city by id. Asking for the already selected city skips the
    /// fetch but still supersedes any selection still in flight.
    pub async fn get(&self, id: CityId) {
        let ticket = self.select_requests.issue();
        let selected = self.state.borrow().current_city_id();
        if selected == Some(id) {
            debug!(city_id = %id, "city already selected");
            return;
        }

        self.dispatch(CityAction::Loading);

        let action = match self.store.get(id).await {
            Ok(city) => CityAction::CityLoaded(city),
            Err(error) => {
                warn!(city_id = %id, %error, "failed to load city");
                CityAction::Rejected(LOAD_CITY_FAILED.to_string())
            }
        };
        self.dispatch_latest(&self.select_requests, ticket, action);
    }

    /// Appends the store-assigned city and selects it. A committed create
    /// supersedes any list response still in flight.
    pub async fn create(&self, new_city: NewCity) {
        self.dispatch(CityAction::Loading);

        let action = match self.store.create(&new_city).await {
            Ok(city) => {
                info!(city_id = %city.id, city_name = %city.city_name, "city created");
                self.load_requests.issue();
                CityAction::CityCreated(city)
            }
            Err(error) => {
                warn!(city_name = %new_city.city_name, %error, "failed to create city");
                CityAction::Rejected(CREATE_CITY_FAILED.to_string())
            }
        };
        self.dispatch(action);
    }

    /// Like `create`, a committed delete supersedes in-flight list responses.
    pub async fn delete(&self, id: CityId) {
        self.dispatch(CityAction::Loading);

        let action = match self.store.delete(id).await {
            Ok(()) => {
                info!(city_id = %id, "city deleted");
                self.load_requests.issue();
                CityAction::CityDeleted(id)
            }
            Err(error) => {
                warn!(city_id = %id, %error, "failed to delete city");
                CityAction::Rejected(DELETE_CITY_FAILED.to_string())
            }
        };
        self.dispatch(action);
    }
}

#[cfg(test)]
#[path = "tests/manager_tests.rs"]
mod tests;
