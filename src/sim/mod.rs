//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Single strict update order per tick
//! - No rendering or platform dependencies

pub mod collectibles;
pub mod player;
pub mod rotation;
pub mod snapshot;
pub mod state;
pub mod terrain;
pub mod tick;

pub use collectibles::{CollectiblesField, Pickup, PickupKind};
pub use rotation::{LandingKind, LandingVerdict, RotationTracker};
pub use snapshot::{PickupView, SegmentView, Snapshot, Telemetry};
pub use state::{InvariantViolation, Mode, PlayerState, Simulator, TrickFlags};
pub use terrain::{Surface, TerrainField, TerrainSegment};
pub use tick::{ActionInput, FrameEvent, ScoreReason, tick};
