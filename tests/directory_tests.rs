// SPDX-License-Identifier: MIT

//! Gym directory smoke tests.
//!
//! These verify that the bundled directory file loads and resolves the
//! way the rest of the system assumes. If they fail, occupancy readings
//! and community analytics will quietly degrade to placeholder labels.

mod common;

#[test]
fn test_directory_loads() {
    let directory = common::load_test_directory();
    let count = directory.gyms().len();

    assert!(count > 0, "Should load at least one gym");
    assert_eq!(count, 14, "Expected exactly 14 gyms, got {}", count);

    // Spot check some expected gyms
    let names: Vec<&str> = directory.gyms().iter().map(|g| g.name.as_str()).collect();
    assert!(
        names.iter().any(|n| n.contains("Anytime")),
        "Should have an Anytime Fitness location"
    );
    assert!(
        names.iter().any(|n| n.contains("YMCA")),
        "Should have a YMCA location"
    );
}

#[test]
fn test_get_by_id_resolves() {
    let directory = common::load_test_directory();

    let gym = directory
        .get_by_id("mtl-anytime-1")
        .expect("mtl-anytime-1 should resolve");
    assert_eq!(gym.name, "Anytime Fitness Downtown");
    assert_eq!(gym.city, "Montreal");
    assert_eq!(gym.effective_capacity(), 120);

    assert!(directory.get_by_id("nowhere-1").is_none());
}

#[test]
fn test_capacity_defaults_when_absent() {
    let directory = common::load_test_directory();

    // Elite Gyms Westmount carries no capacity in the directory file
    let gym = directory.get_by_id("mtl-elite-1").unwrap();
    assert_eq!(gym.capacity, None);
    assert_eq!(gym.effective_capacity(), 100);
}

#[test]
fn test_cities_for_quebec() {
    let directory = common::load_test_directory();

    let cities = directory.cities_for_province("Quebec");
    assert_eq!(
        cities,
        vec![
            "Gatineau".to_string(),
            "Laval".to_string(),
            "Montreal".to_string(),
            "Quebec City".to_string(),
            "Sherbrooke".to_string(),
        ]
    );
}

#[test]
fn test_search_across_fields() {
    let directory = common::load_test_directory();

    assert_eq!(directory.search("goodlife").len(), 4);
    assert_eq!(directory.search("Sherbrooke").len(), 2);
    assert!(directory.search("planet fitness").is_empty());
}
