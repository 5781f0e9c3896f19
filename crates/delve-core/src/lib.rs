//! delve-core: BSP dungeon generation
//!
//! This crate contains the whole generation pipeline with no I/O.
//! Given the same settings and seed it produces the same dungeon.
//!
//! ```no_run
//! use delve_core::{dungeon::DungeonGenerator, GenerationSettings};
//!
//! let mut generator = DungeonGenerator::new(GenerationSettings::new(60, 40, 7))?;
//! let dungeon = generator.generate()?;
//! println!("{}", dungeon.data.render_ascii());
//! # Ok::<(), delve_core::ConfigError>(())
//! ```

pub mod config;
pub mod dungeon;
pub mod error;
mod rng;

pub use config::{EdgePreference, GenerationSettings, MapEdge, StartingPointCriteria};
pub use error::ConfigError;
pub use rng::GameRng;
