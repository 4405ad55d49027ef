// SPDX-License-Identifier: MIT

//! Gym directory loading and lookup service.

use crate::models::Gym;
use std::fs;
use std::path::Path;

/// Read-only gym directory, loaded once at startup.
#[derive(Default, Clone)]
pub struct GymDirectoryService {
    gyms: Vec<Gym>,
}

impl GymDirectoryService {
    /// Load the directory from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| DirectoryError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the directory from a JSON string (an array of gym records).
    pub fn load_from_json(json_data: &str) -> Result<Self, DirectoryError> {
        let gyms: Vec<Gym> = serde_json::from_str(json_data)
            .map_err(|e| DirectoryError::ParseError(e.to_string()))?;

        tracing::info!(count = gyms.len(), "Loaded gym directory");
        Ok(Self { gyms })
    }

    /// Build a directory from in-memory records (tests, seeds).
    pub fn from_gyms(gyms: Vec<Gym>) -> Self {
        Self { gyms }
    }

    /// All gyms, in directory order.
    pub fn gyms(&self) -> &[Gym] {
        &self.gyms
    }

    /// Resolve a gym by id.
    pub fn get_by_id(&self, gym_id: &str) -> Option<&Gym> {
        self.gyms.iter().find(|g| g.id == gym_id)
    }

    /// Distinct cities for a province, sorted.
    pub fn cities_for_province(&self, province: &str) -> Vec<String> {
        let mut cities: Vec<String> = self
            .gyms
            .iter()
            .filter(|g| g.province == province)
            .map(|g| g.city.clone())
            .collect();
        cities.sort();
        cities.dedup();
        cities
    }

    /// Gyms for a province, optionally narrowed to a city.
    pub fn gyms_for_province_and_city(&self, province: &str, city: Option<&str>) -> Vec<&Gym> {
        self.gyms
            .iter()
            .filter(|g| g.province == province)
            .filter(|g| city.map_or(true, |c| g.city == c))
            .collect()
    }

    /// Case-insensitive search over name, brand, and city.
    pub fn search(&self, query: &str) -> Vec<&Gym> {
        let query = query.to_lowercase();
        self.gyms
            .iter()
            .filter(|g| {
                g.name.to_lowercase().contains(&query)
                    || g.brand.to_lowercase().contains(&query)
                    || g.city.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Distinct brands across the directory, sorted.
    pub fn brands(&self) -> Vec<String> {
        let mut brands: Vec<String> = self.gyms.iter().map(|g| g.brand.clone()).collect();
        brands.sort();
        brands.dedup();
        brands
    }
}

/// Errors from directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse gym directory: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn make_gym(id: &str, name: &str, brand: &str, city: &str, province: &str) -> Gym {
        Gym {
            id: id.to_string(),
            name: name.to_string(),
            brand: brand.to_string(),
            city: city.to_string(),
            address: "1 Test St".to_string(),
            province: province.to_string(),
            coordinates: Coordinates {
                lat: 45.5,
                lng: -73.5,
            },
            capacity: None,
        }
    }

    fn test_directory() -> GymDirectoryService {
        GymDirectoryService::from_gyms(vec![
            make_gym(
                "mtl-anytime-1",
                "Anytime Fitness Downtown",
                "Anytime Fitness",
                "Montreal",
                "Quebec",
            ),
            make_gym(
                "mtl-ymca-1",
                "YMCA Montreal Downtown",
                "YMCA",
                "Montreal",
                "Quebec",
            ),
            make_gym(
                "qc-anytime-1",
                "Anytime Fitness Vieux-Quebec",
                "Anytime Fitness",
                "Quebec City",
                "Quebec",
            ),
        ])
    }

    #[test]
    fn test_get_by_id() {
        let directory = test_directory();
        assert!(directory.get_by_id("mtl-ymca-1").is_some());
        assert!(directory.get_by_id("nowhere-1").is_none());
    }

    #[test]
    fn test_cities_sorted_and_deduped() {
        let directory = test_directory();
        assert_eq!(
            directory.cities_for_province("Quebec"),
            vec!["Montreal".to_string(), "Quebec City".to_string()]
        );
        assert!(directory.cities_for_province("Ontario").is_empty());
    }

    #[test]
    fn test_province_and_city_filter() {
        let directory = test_directory();
        assert_eq!(directory.gyms_for_province_and_city("Quebec", None).len(), 3);
        assert_eq!(
            directory
                .gyms_for_province_and_city("Quebec", Some("Montreal"))
                .len(),
            2
        );
    }

    #[test]
    fn test_search_matches_name_brand_city() {
        let directory = test_directory();
        assert_eq!(directory.search("anytime").len(), 2);
        assert_eq!(directory.search("ymca").len(), 1);
        assert_eq!(directory.search("montreal").len(), 2);
        assert!(directory.search("zumba").is_empty());
    }

    #[test]
    fn test_parse_error_reported() {
        let result = GymDirectoryService::load_from_json("not json");
        assert!(matches!(result, Err(DirectoryError::ParseError(_))));
    }
}
