//! Generation settings and starting-point criteria
//!
//! Plain value objects passed into each phase. Defaults are tuned for
//! grids of roughly 40x40 to 100x100.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::ConfigError;

/// Largest accepted grid dimension
pub const MAX_DIMENSION: usize = 1024;

/// Map edge a room can sit against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum MapEdge {
    North,
    South,
    East,
    West,
}

/// Which map edge the starting room should prefer
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum EdgePreference {
    #[default]
    Any,
    North,
    South,
    East,
    West,
    NorthSouth,
    EastWest,
}

impl EdgePreference {
    /// Whether a room against `edge` satisfies this preference
    pub fn matches(self, edge: MapEdge) -> bool {
        match self {
            EdgePreference::Any => true,
            EdgePreference::North => edge == MapEdge::North,
            EdgePreference::South => edge == MapEdge::South,
            EdgePreference::East => edge == MapEdge::East,
            EdgePreference::West => edge == MapEdge::West,
            EdgePreference::NorthSouth => matches!(edge, MapEdge::North | MapEdge::South),
            EdgePreference::EastWest => matches!(edge, MapEdge::East | MapEdge::West),
        }
    }
}

/// Criteria used to score starting-room candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingPointCriteria {
    /// Rooms smaller than this are never chosen
    pub min_room_area: usize,
    pub min_connections: usize,
    /// Connections above this are penalised
    pub max_connections: usize,
    pub preferred_edge: EdgePreference,
    pub corner_avoidance_radius: f32,
    pub allow_corners: bool,
    /// Prefer rooms near the map edge; otherwise prefer central rooms
    pub prefer_map_edge: bool,
    pub edge_preference_strength: f32,
    /// Fraction of all rooms that must be reachable from a candidate
    pub min_accessibility_ratio: f32,
    pub create_exterior_entrance: bool,
}

impl Default for StartingPointCriteria {
    fn default() -> Self {
        Self {
            min_room_area: 36,
            min_connections: 1,
            max_connections: 3,
            preferred_edge: EdgePreference::Any,
            corner_avoidance_radius: 5.0,
            allow_corners: false,
            prefer_map_edge: true,
            edge_preference_strength: 20.0,
            min_accessibility_ratio: 0.8,
            create_exterior_entrance: true,
        }
    }
}

impl StartingPointCriteria {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_connections > self.max_connections {
            return Err(ConfigError::ConnectionRange {
                min: self.min_connections,
                max: self.max_connections,
            });
        }
        if !(0.0..=1.0).contains(&self.min_accessibility_ratio) {
            return Err(ConfigError::RatioOutOfRange {
                field: "min_accessibility_ratio",
                value: self.min_accessibility_ratio,
            });
        }
        if self.corner_avoidance_radius < 0.0 {
            return Err(ConfigError::Negative {
                field: "corner_avoidance_radius",
                value: self.corner_avoidance_radius,
            });
        }
        if self.edge_preference_strength < 0.0 {
            return Err(ConfigError::Negative {
                field: "edge_preference_strength",
                value: self.edge_preference_strength,
            });
        }
        Ok(())
    }
}

/// Settings for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub min_room_size: usize,
    pub max_room_size: usize,
    /// Margin kept between a room and its partition edges
    pub room_padding: usize,
    pub corridor_width: usize,
    pub max_bsp_depth: usize,
    /// Cap on cells per straight corridor segment
    pub max_corridor_length: usize,
    pub max_repair_attempts: usize,
    /// Repair pairs farther apart than this are abandoned
    pub max_repair_distance: f32,
    pub max_doors_per_room: usize,
    /// Run the boss/treasure/guard/laboratory pass after progression
    pub assign_special_rooms: bool,
    pub starting_point: StartingPointCriteria,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            seed: 42,
            min_room_size: 6,
            max_room_size: 20,
            room_padding: 2,
            corridor_width: 1,
            max_bsp_depth: 6,
            max_corridor_length: 200,
            max_repair_attempts: 10,
            max_repair_distance: 100.0,
            max_doors_per_room: 4,
            assign_special_rooms: false,
            starting_point: StartingPointCriteria::default(),
        }
    }
}

impl GenerationSettings {
    /// Settings for a `width`x`height` grid with the given seed, other fields default
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            seed,
            ..Self::default()
        }
    }

    /// Smallest partition that still fits a padded room
    pub fn min_leaf_size(&self) -> usize {
        self.min_room_size + 2 * self.room_padding
    }

    /// Check settings before generation starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0
            || self.height == 0
            || self.width > MAX_DIMENSION
            || self.height > MAX_DIMENSION
        {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
                max: MAX_DIMENSION,
            });
        }
        if self.min_room_size == 0 {
            return Err(ConfigError::ZeroMinRoomSize);
        }
        if self.min_room_size > self.max_room_size {
            return Err(ConfigError::RoomSizeRange {
                min: self.min_room_size,
                max: self.max_room_size,
            });
        }
        if self.corridor_width == 0 {
            return Err(ConfigError::ZeroCorridorWidth);
        }
        let needed = self.min_leaf_size();
        if self.width < needed || self.height < needed {
            return Err(ConfigError::DomainTooSmall {
                width: self.width,
                height: self.height,
                needed,
            });
        }
        if self.max_repair_distance < 0.0 {
            return Err(ConfigError::Negative {
                field: "max_repair_distance",
                value: self.max_repair_distance,
            });
        }
        self.starting_point.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_default_settings_are_valid() {
        assert_eq!(GenerationSettings::default().validate(), Ok(()));
    }

    #[test]
    fn test_min_leaf_size_includes_padding() {
        let settings = GenerationSettings::default();
        assert_eq!(settings.min_leaf_size(), 10);
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let settings = GenerationSettings::new(0, 40, 1);
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidDimensions { .. })
        ));

        let settings = GenerationSettings::new(8, 40, 1);
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::DomainTooSmall { needed: 10, .. })
        ));
    }

    #[test]
    fn test_rejects_inverted_ranges() {
        let mut settings = GenerationSettings::default();
        settings.min_room_size = 30;
        assert_eq!(
            settings.validate(),
            Err(ConfigError::RoomSizeRange { min: 30, max: 20 })
        );

        let mut settings = GenerationSettings::default();
        settings.starting_point.min_connections = 5;
        assert_eq!(
            settings.validate(),
            Err(ConfigError::ConnectionRange { min: 5, max: 3 })
        );
    }

    #[test]
    fn test_rejects_bad_ratio() {
        let mut settings = GenerationSettings::default();
        settings.starting_point.min_accessibility_ratio = 1.5;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::RatioOutOfRange { .. })
        ));
    }

    #[test]
    fn test_missing_criteria_falls_back_to_default() {
        let settings: GenerationSettings =
            serde_json::from_str(r#"{"width": 60, "height": 40, "seed": 7}"#).unwrap();
        assert_eq!(settings.width, 60);
        assert_eq!(settings.starting_point, StartingPointCriteria::default());
    }

    #[test]
    fn test_edge_preference_matches() {
        for edge in MapEdge::iter() {
            assert!(EdgePreference::Any.matches(edge));
        }
        assert!(EdgePreference::NorthSouth.matches(MapEdge::South));
        assert!(!EdgePreference::NorthSouth.matches(MapEdge::East));
        assert!(EdgePreference::EastWest.matches(MapEdge::West));
        assert!(!EdgePreference::North.matches(MapEdge::South));
        assert_eq!("eastwest".parse::<EdgePreference>(), Ok(EdgePreference::EastWest));
    }
}
