use super::*;

fn draft(name: &str, country: &str) -> NewCity {
    NewCity {
        city_name: name.to_string(),
        country: country.to_string(),
        emoji: "🏳".to_string(),
        date: "2027-10-31T15:59:59.138Z".to_string(),
        notes: None,
        position: Position {
            lat: 38.72,
            lng: -9.14,
        },
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("worldwise_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("cities.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn inserted_cities_get_fresh_ids_and_keep_insertion_order() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let lisbon = storage
        .insert_city(&draft("Lisbon", "Portugal"))
        .await
        .expect("lisbon");
    let berlin = storage
        .insert_city(&draft("Berlin", "Germany"))
        .await
        .expect("berlin");

    assert_eq!(lisbon.id, CityId(1));
    assert_eq!(berlin.id, CityId(2));
    assert_eq!(berlin.draft(), draft("Berlin", "Germany"));

    let names: Vec<String> = storage
        .list_cities()
        .await
        .expect("list")
        .into_iter()
        .map(|city| city.city_name)
        .collect();
    assert_eq!(names, ["Lisbon", "Berlin"]);
}

#[tokio::test]
async fn imported_ids_are_kept_and_new_ids_continue_after_them() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let seeded = vec![
        City::from_draft(CityId(73930385), draft("Lisbon", "Portugal")),
        City::from_draft(CityId(17806751), draft("Madrid", "Spain")),
    ];
    assert_eq!(storage.import_cities(&seeded).await.expect("import"), 2);
    assert_eq!(storage.import_cities(&seeded).await.expect("reimport"), 0);

    let paris = storage
        .insert_city(&draft("Paris", "France"))
        .await
        .expect("paris");
    assert_eq!(paris.id, CityId(73930386));

    let ids: Vec<CityId> = storage
        .list_cities()
        .await
        .expect("list")
        .into_iter()
        .map(|city| city.id)
        .collect();
    assert_eq!(ids, [CityId(73930385), CityId(17806751), CityId(73930386)]);
}

#[tokio::test]
async fn get_and_delete_report_missing_ids() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut with_notes = draft("Porto", "Portugal");
    with_notes.notes = Some("port wine".to_string());
    let porto = storage.insert_city(&with_notes).await.expect("porto");

    let loaded = storage.get_city(porto.id).await.expect("get").expect("present");
    assert_eq!(loaded, porto);
    assert!(storage.get_city(CityId(999)).await.expect("get").is_none());

    assert!(storage.delete_city(porto.id).await.expect("delete"));
    assert!(!storage.delete_city(porto.id).await.expect("second delete"));
    assert_eq!(storage.count_cities().await.expect("count"), 0);
}
