//! Read-only views handed to the host
//!
//! Snapshots are plain data copied out of the simulator: the renderer and
//! HUD never hold references into live state. Everything here serializes,
//! so a host can also ship views across a worker boundary.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collectibles::PickupKind;
use super::state::{Mode, Simulator};
use super::terrain::Surface;

/// One terrain segment in the active window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentView {
    pub start: Vec2,
    pub end: Vec2,
    pub surface: Surface,
    pub angle: f32,
}

/// One live pickup in the active window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupView {
    pub pos: Vec2,
    pub kind: PickupKind,
}

/// Immutable copy of everything the host renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub seed: u64,
    pub pos: Vec2,
    pub vel: Vec2,
    pub orientation: f32,
    pub angular_vel: f32,
    pub on_ground: bool,
    pub mode: Mode,
    pub lives: u32,
    pub score: u64,
    pub game_over: bool,
    pub segments: Vec<SegmentView>,
    pub pickups: Vec<PickupView>,
}

impl Snapshot {
    pub fn capture(sim: &Simulator) -> Self {
        Self {
            tick: sim.time_ticks,
            seed: sim.seed,
            pos: sim.player.pos,
            vel: sim.player.vel,
            orientation: sim.player.orientation,
            angular_vel: sim.player.angular_vel,
            on_ground: sim.player.on_ground,
            mode: sim.player.mode,
            lives: sim.player.lives,
            score: sim.player.score,
            game_over: sim.game_over,
            segments: sim
                .terrain
                .segments()
                .map(|s| SegmentView {
                    start: Vec2::new(s.start_x, s.start_y),
                    end: Vec2::new(s.end_x, s.end_y),
                    surface: s.surface,
                    angle: s.angle,
                })
                .collect(),
            pickups: sim
                .collectibles
                .pickups()
                .iter()
                .map(|p| PickupView {
                    pos: p.pos,
                    kind: p.kind,
                })
                .collect(),
        }
    }
}

/// Per-frame HUD telemetry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub score: u64,
    pub lives: u32,
    pub speed: f32,
    /// `player.y - run_start_y`; grows as the sled descends
    pub altitude_drop: f32,
}
