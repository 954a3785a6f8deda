//! City collection state and the reducer that moves it between snapshots.

use serde::{Deserialize, Serialize};
use shared::domain::{City, CityId};

/// What a successful delete does to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Any successful delete empties the selection, even of another city.
    #[default]
    AlwaysClear,
    /// Only deleting the selected city empties the selection.
    ClearIfSelected,
}

/// One immutable snapshot of the city collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitiesState {
    pub cities: Vec<City>,
    pub current_city: Option<City>,
    pub is_loading: bool,
    pub error: Option<String>,
    in_flight: usize,
}

impl CitiesState {
    pub fn current_city_id(&self) -> Option<CityId> {
        self.current_city.as_ref().map(|city| city.id)
    }

    /// Number of operations that started loading and have not settled yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn settled(&self) -> Self {
        let in_flight = self.in_flight.saturating_sub(1);
        Self {
            in_flight,
            is_loading: in_flight > 0,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CityAction {
    Loading,
    CitiesLoaded(Vec<City>),
    CityLoaded(City),
    CityCreated(City),
    CityDeleted(CityId),
    Rejected(String),
    /// A response arrived after a newer request of the same kind; only the
    /// loading count is released.
    Superseded,
}

pub fn reduce(state: &CitiesState, action: CityAction, policy: DeletePolicy) -> CitiesState {
    match action {
        CityAction::Loading => CitiesState {
            in_flight: state.in_flight + 1,
            is_loading: true,
            ..state.clone()
        },
        CityAction::CitiesLoaded(cities) => CitiesState {
            cities,
            error: None,
            ..state.settled()
        },
        CityAction::CityLoaded(city) => CitiesState {
            current_city: Some(city),
            error: None,
            ..state.settled()
        },
        CityAction::CityCreated(city) => {
            let mut cities = state.cities.clone();
            cities.push(city.clone());
            CitiesState {
                cities,
                current_city: Some(city),
                error: None,
                ..state.settled()
            }
        }
        CityAction::CityDeleted(id) => {
            let cities = state
                .cities
                .iter()
                .filter(|city| city.id != id)
                .cloned()
                .collect();
            let current_city = match policy {
                DeletePolicy::AlwaysClear => None,
                DeletePolicy::ClearIfSelected if state.current_city_id() == Some(id) => None,
                DeletePolicy::ClearIfSelected => state.current_city.clone(),
            };
            CitiesState {
                cities,
                current_city,
                error: None,
                ..state.settled()
            }
        }
        CityAction::Rejected(message) => CitiesState {
            error: Some(message),
            ..state.settled()
        },
        CityAction::Superseded => state.settled(),
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
