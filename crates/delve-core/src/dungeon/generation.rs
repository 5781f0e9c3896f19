//! End-to-end generation pipeline
//!
//! Phases run strictly in order, each drawing from the same seeded RNG:
//! partition, carve, connect, pick a start, label progression and,
//! when enabled, assign special rooms. An observer is called after
//! every phase so callers can yield, log or snapshot between stages.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::{debug, info};

use crate::config::GenerationSettings;
use crate::error::ConfigError;
use crate::rng::GameRng;

use super::bsp::{BspNode, SpacePartitioner};
use super::carver::RoomCarver;
use super::corridor::{ConnectionReport, CorridorConnector};
use super::data::DungeonData;
use super::progression::ProgressionInitializer;
use super::rect::Rect;
use super::special::{RoomSpecializer, Specialization};
use super::start::{StartSelection, StartingPointSelector};

/// Pipeline stage that has just finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum GenerationPhase {
    Partitioned,
    RoomsCarved,
    Connected,
    StartSelected,
    ProgressionInitialized,
    RoomsSpecialized,
}

/// Called between pipeline phases
pub trait GenerationObserver {
    fn phase_complete(&mut self, phase: GenerationPhase, data: &DungeonData);
}

impl<F> GenerationObserver for F
where
    F: FnMut(GenerationPhase, &DungeonData),
{
    fn phase_complete(&mut self, phase: GenerationPhase, data: &DungeonData) {
        self(phase, data)
    }
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDungeon {
    pub data: DungeonData,
    pub tree: BspNode,
    pub connection: ConnectionReport,
    pub start: StartSelection,
    /// Present when special room assignment ran
    pub special: Option<Specialization>,
}

/// Owns settings and the RNG for repeated generation runs
#[derive(Debug, Clone)]
pub struct DungeonGenerator {
    settings: GenerationSettings,
    rng: GameRng,
}

impl DungeonGenerator {
    pub fn new(settings: GenerationSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let rng = GameRng::new(settings.seed);
        Ok(Self { settings, rng })
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Change the seed used by the next run
    pub fn set_seed(&mut self, seed: u64) {
        self.settings.seed = seed;
    }

    pub fn generate(&mut self) -> Result<GeneratedDungeon, ConfigError> {
        self.generate_with(&mut |_: GenerationPhase, _: &DungeonData| {})
    }

    pub fn generate_with(
        &mut self,
        observer: &mut dyn GenerationObserver,
    ) -> Result<GeneratedDungeon, ConfigError> {
        let settings = &self.settings;
        settings.validate()?;
        self.rng.reseed(settings.seed);
        let rng = &mut self.rng;

        let mut data = DungeonData::new(settings.width, settings.height);
        data.seed = settings.seed;
        info!(
            seed = settings.seed,
            width = settings.width,
            height = settings.height,
            "generating dungeon"
        );

        let domain = Rect::new(0, 0, settings.width as i32, settings.height as i32);
        let mut tree = SpacePartitioner::new(settings.min_leaf_size(), settings.max_bsp_depth)
            .partition(domain, rng);
        observer.phase_complete(GenerationPhase::Partitioned, &data);

        RoomCarver::new(
            settings.min_room_size,
            settings.max_room_size,
            settings.room_padding,
        )
        .carve(&mut tree, &mut data, rng);
        observer.phase_complete(GenerationPhase::RoomsCarved, &data);

        let connection = CorridorConnector::from_settings(settings).connect(&tree, &mut data, rng);
        observer.phase_complete(GenerationPhase::Connected, &data);

        let start = StartingPointSelector::new(settings.starting_point.clone()).select(&mut data);
        observer.phase_complete(GenerationPhase::StartSelected, &data);

        let deepest = ProgressionInitializer.initialize(&mut data);
        observer.phase_complete(GenerationPhase::ProgressionInitialized, &data);

        let special = if settings.assign_special_rooms {
            let special = RoomSpecializer.assign(&mut data);
            observer.phase_complete(GenerationPhase::RoomsSpecialized, &data);
            Some(special)
        } else {
            None
        };

        debug!(
            seed = data.seed,
            rooms = data.rooms.len(),
            doors = data.doors.len(),
            components = connection.residual_components,
            distance = deepest,
            "generation finished"
        );
        Ok(GeneratedDungeon {
            data,
            tree,
            connection,
            start,
            special,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_rejects_bad_settings() {
        let mut settings = GenerationSettings::default();
        settings.min_room_size = 30;
        settings.max_room_size = 10;
        assert!(matches!(
            DungeonGenerator::new(settings),
            Err(ConfigError::RoomSizeRange { min: 30, max: 10 })
        ));
    }

    #[test]
    fn test_same_seed_same_dungeon() {
        let mut generator = DungeonGenerator::new(GenerationSettings::default()).unwrap();
        let first = generator.generate().unwrap();
        let second = generator.generate().unwrap();
        assert_eq!(first, second);

        generator.set_seed(7);
        let third = generator.generate().unwrap();
        assert_eq!(third.data.seed, 7);
    }

    #[test]
    fn test_observer_sees_every_phase() {
        let mut settings = GenerationSettings::default();
        settings.assign_special_rooms = true;
        let mut generator = DungeonGenerator::new(settings).unwrap();

        let mut seen = Vec::new();
        let mut observer = |phase: GenerationPhase, _: &DungeonData| seen.push(phase);
        let result = generator.generate_with(&mut observer).unwrap();

        assert_eq!(seen, GenerationPhase::iter().collect::<Vec<_>>());
        assert!(result.special.is_some());
    }

    #[test]
    fn test_tree_leaves_match_rooms() {
        let result = DungeonGenerator::new(GenerationSettings::new(80, 60, 3))
            .unwrap()
            .generate()
            .unwrap();
        let mut leaf_rooms = result.tree.rooms();
        leaf_rooms.sort();
        let ids: Vec<_> = result.data.rooms.iter().map(|r| r.id).collect();
        assert_eq!(leaf_rooms, ids);
        assert_eq!(result.start.room, result.data.starting_room);
    }
}
