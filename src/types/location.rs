//! The fixed set of cities the downloader covers.

use serde::Serialize;

/// A named point the archive is queried for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    /// Unique city name, written to the `city` column.
    pub name: &'static str,
    /// Latitude in decimal degrees (positive for North).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East).
    pub longitude: f64,
}

impl Location {
    pub const fn new(name: &'static str, latitude: f64, longitude: f64) -> Self {
        Self {
            name,
            latitude,
            longitude,
        }
    }
}

/// Cities of Provence-Alpes-Côte d'Azur, in download order.
pub const PACA_CITIES: [Location; 6] = [
    Location::new("Marseille", 43.2965, 5.3698),
    Location::new("Nice", 43.7102, 7.2620),
    Location::new("Toulon", 43.1242, 5.9280),
    Location::new("Avignon", 43.9493, 4.8055),
    Location::new("Gap", 44.5580, 6.0827),
    Location::new("Digne-les-Bains", 44.0922, 6.2376),
];

/// Looks up a registry city by its exact name.
///
/// ```
/// use paca_climate::location_by_name;
///
/// let nice = location_by_name("Nice").unwrap();
/// assert_eq!(nice.latitude, 43.7102);
/// assert!(location_by_name("Paris").is_none());
/// ```
pub fn location_by_name(name: &str) -> Option<&'static Location> {
    PACA_CITIES.iter().find(|location| location.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_names_are_unique() {
        let names: HashSet<_> = PACA_CITIES.iter().map(|l| l.name).collect();
        assert_eq!(names.len(), PACA_CITIES.len());
    }

    #[test]
    fn test_registry_order_and_coordinates() {
        let names: Vec<_> = PACA_CITIES.iter().map(|l| l.name).collect();
        assert_eq!(
            names,
            ["Marseille", "Nice", "Toulon", "Avignon", "Gap", "Digne-les-Bains"]
        );
        let digne = location_by_name("Digne-les-Bains").unwrap();
        assert_eq!((digne.latitude, digne.longitude), (44.0922, 6.2376));
    }
}
