use super::*;
use shared::domain::Position;

fn city(id: i64, name: &str) -> City {
    City {
        city_name: name.to_string(),
        country: "Somewhere".to_string(),
        emoji: "🏳".to_string(),
        date: "2027-10-31T15:59:59.138Z".to_string(),
        notes: None,
        position: Position { lat: 1.0, lng: 2.0 },
        id: CityId(id),
    }
}

fn loaded(cities: Vec<City>) -> CitiesState {
    let state = reduce(&CitiesState::default(), CityAction::Loading, DeletePolicy::AlwaysClear);
    reduce(&state, CityAction::CitiesLoaded(cities), DeletePolicy::AlwaysClear)
}

#[test]
fn loading_then_loaded_replaces_cities_and_clears_flag() {
    let initial = CitiesState::default();
    let loading = reduce(&initial, CityAction::Loading, DeletePolicy::AlwaysClear);
    assert!(loading.is_loading);
    assert!(!initial.is_loading, "reducer must not touch the previous snapshot");

    let done = reduce(
        &loading,
        CityAction::CitiesLoaded(vec![city(1, "Lisbon"), city(2, "Berlin")]),
        DeletePolicy::AlwaysClear,
    );
    assert!(!done.is_loading);
    assert_eq!(done.in_flight(), 0);
    let names: Vec<&str> = done.cities.iter().map(|c| c.city_name.as_str()).collect();
    assert_eq!(names, ["Lisbon", "Berlin"]);
}

#[test]
fn created_city_is_appended_and_selected() {
    let state = loaded(vec![city(1, "Lisbon")]);
    let state = reduce(&state, CityAction::Loading, DeletePolicy::AlwaysClear);
    let state = reduce(
        &state,
        CityAction::CityCreated(city(3, "Paris")),
        DeletePolicy::AlwaysClear,
    );
    assert_eq!(state.cities.len(), 2);
    assert_eq!(state.cities[1].id, CityId(3));
    assert_eq!(state.current_city_id(), Some(CityId(3)));
}

#[test]
fn rejection_only_sets_error_and_releases_loading() {
    let before = loaded(vec![city(1, "Lisbon")]);
    let before = reduce(&before, CityAction::CityLoaded(city(1, "Lisbon")), DeletePolicy::AlwaysClear);
    let loading = reduce(&before, CityAction::Loading, DeletePolicy::AlwaysClear);
    let after = reduce(
        &loading,
        CityAction::Rejected("boom".to_string()),
        DeletePolicy::AlwaysClear,
    );

    assert_eq!(after.error.as_deref(), Some("boom"));
    assert!(!after.is_loading);
    assert_eq!(after.cities, before.cities);
    assert_eq!(after.current_city, before.current_city);
}

#[test]
fn success_clears_previous_error() {
    let state = reduce(
        &CitiesState::default(),
        CityAction::Rejected("boom".to_string()),
        DeletePolicy::AlwaysClear,
    );
    let state = reduce(&state, CityAction::CityLoaded(city(1, "Lisbon")), DeletePolicy::AlwaysClear);
    assert_eq!(state.error, None);
}

#[test]
fn always_clear_drops_selection_on_any_delete() {
    let state = loaded(vec![city(1, "Lisbon"), city(2, "Berlin")]);
    let state = reduce(&state, CityAction::CityLoaded(city(1, "Lisbon")), DeletePolicy::AlwaysClear);
    let state = reduce(&state, CityAction::CityDeleted(CityId(2)), DeletePolicy::AlwaysClear);

    assert_eq!(state.cities, vec![city(1, "Lisbon")]);
    assert_eq!(state.current_city, None);
}

#[test]
fn clear_if_selected_keeps_unrelated_selection() {
    let state = loaded(vec![city(1, "Lisbon"), city(2, "Berlin")]);
    let state = reduce(
        &state,
        CityAction::CityLoaded(city(1, "Lisbon")),
        DeletePolicy::ClearIfSelected,
    );

    let other = reduce(&state, CityAction::CityDeleted(CityId(2)), DeletePolicy::ClearIfSelected);
    assert_eq!(other.current_city_id(), Some(CityId(1)));

    let selected = reduce(&other, CityAction::CityDeleted(CityId(1)), DeletePolicy::ClearIfSelected);
    assert!(selected.cities.is_empty());
    assert_eq!(selected.current_city, None);
}

#[test]
fn overlapping_operations_keep_loading_until_all_settle() {
    let state = reduce(&CitiesState::default(), CityAction::Loading, DeletePolicy::AlwaysClear);
    let state = reduce(&state, CityAction::Loading, DeletePolicy::AlwaysClear);
    assert_eq!(state.in_flight(), 2);

    let state = reduce(&state, CityAction::Superseded, DeletePolicy::AlwaysClear);
    assert!(state.is_loading);

    let state = reduce(&state, CityAction::CityLoaded(city(4, "Rome")), DeletePolicy::AlwaysClear);
    assert!(!state.is_loading);
    assert_eq!(state.current_city_id(), Some(CityId(4)));
}

#[test]
fn settling_without_loading_never_underflows() {
    let state = reduce(&CitiesState::default(), CityAction::Superseded, DeletePolicy::AlwaysClear);
    assert_eq!(state.in_flight(), 0);
    assert!(!state.is_loading);
}
