//! Configuration errors
//!
//! Generation itself never fails: degraded layouts are logged and reported
//! through outcome records. Only bad settings are rejected up front.

use thiserror::Error;

/// Invalid generation settings, reported before any phase runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid grid dimensions {width}x{height}: both must be in 1..={max}")]
    InvalidDimensions { width: usize, height: usize, max: usize },

    #[error("Minimum room size must be positive")]
    ZeroMinRoomSize,

    #[error("Minimum room size {min} exceeds maximum room size {max}")]
    RoomSizeRange { min: usize, max: usize },

    #[error("Corridor width must be positive")]
    ZeroCorridorWidth,

    #[error("Grid {width}x{height} cannot hold a single padded room of size {needed}")]
    DomainTooSmall {
        width: usize,
        height: usize,
        needed: usize,
    },

    #[error("Minimum connections {min} exceeds maximum connections {max}")]
    ConnectionRange { min: usize, max: usize },

    #[error("{field} must be within 0..=1, got {value}")]
    RatioOutOfRange { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
}
