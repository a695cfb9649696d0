//! Simulator state and core types
//!
//! The [`Simulator`] owns every piece of gameplay state as a tree: terrain,
//! collectibles, the rotation tracker and the player body hold no references
//! back to it or to each other. The host communicates downward through
//! [`super::ActionInput`] and receives upward communication only as returned
//! [`super::FrameEvent`]s and snapshots.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{ANCHOR_X, ANCHOR_Y};
use crate::rng::GameRng;
use crate::tuning::Tuning;

use super::collectibles::CollectiblesField;
use super::rotation::RotationTracker;
use super::snapshot::{Snapshot, Telemetry};
use super::terrain::TerrainField;

/// Player movement regime. Walk is entered on life loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Mode {
    #[default]
    Sled,
    Walk,
}

/// Per-tick trick state, cancelled on every ground/air transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TrickFlags {
    pub tucking: bool,
    pub dragging: bool,
    pub parachuting: bool,
    pub air_braking: bool,
}

impl TrickFlags {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The circular player body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Body orientation in radians (0 = level, positive = nose down-slope)
    pub orientation: f32,
    /// Angular velocity in radians per second
    pub angular_vel: f32,
    pub on_ground: bool,
    pub mode: Mode,
    pub lives: u32,
    pub score: u64,
    pub tricks: TrickFlags,
    /// Fall-damping scalar in [0, 1]; 1 on landing, decays while parachuting
    pub parachute_effectiveness: f32,
    /// Grounded persistence across segment seams, in ticks
    pub sticky_ticks: u32,
    /// Set on a jump; the next ground check stays airborne, buffer or not
    pub just_jumped: bool,
    /// Set when the penetration failsafe snapped the body this tick
    pub just_teleported: bool,
}

impl PlayerState {
    fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(ANCHOR_X + tuning.segment_width * 0.5, ANCHOR_Y),
            vel: Vec2::ZERO,
            orientation: 0.0,
            angular_vel: 0.0,
            on_ground: true,
            mode: Mode::Sled,
            lives: tuning.initial_lives,
            score: 0,
            tricks: TrickFlags::default(),
            parachute_effectiveness: 1.0,
            sticky_ticks: 0,
            just_jumped: false,
            just_teleported: false,
        }
    }

    /// Orientation in degrees, for the landing classifier
    pub fn orientation_deg(&self) -> f32 {
        self.orientation.to_degrees()
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Fatal programming-defect conditions; the run aborts when one surfaces
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("terrain discontinuity in the active window")]
    TerrainDiscontinuity,
    #[error("lives out of range: {0}")]
    LivesOutOfRange(u32),
    #[error("parachute effectiveness out of range: {0}")]
    ParachuteEffectivenessOutOfRange(f32),
}

/// Complete deterministic simulation state
#[derive(Debug, Clone, PartialEq)]
pub struct Simulator {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG; every gameplay draw flows through it
    pub rng: GameRng,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Player altitude at run start, for the altitude-drop telemetry
    pub run_start_y: f32,
    /// Furthest x the player has reached; behind-view detection anchor
    pub max_x_reached: f32,
    pub game_over: bool,
    pub player: PlayerState,
    pub terrain: TerrainField,
    pub collectibles: CollectiblesField,
    pub tracker: RotationTracker,
    /// Seconds of crash invincibility remaining
    pub invincibility_timer: f32,
    /// Seconds until the post-crash recovery kick, when armed
    pub recovery_timer: Option<f32>,
    /// Accrued contact time toward the next blue-surface score quantum
    pub blue_timer: f32,
    /// Previous tick's toggle_walk, for edge triggering
    pub prev_toggle_walk: bool,
    pub tuning: Tuning,
}

impl Simulator {
    /// New run with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// New run with a host-supplied constant table
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let player = PlayerState::new(&tuning);
        let sim = Self {
            seed,
            rng: GameRng::new(seed),
            time_ticks: 0,
            run_start_y: player.pos.y,
            max_x_reached: player.pos.x,
            game_over: false,
            player,
            terrain: TerrainField::new(ANCHOR_X, ANCHOR_Y, &tuning),
            collectibles: CollectiblesField::new(ANCHOR_X, &tuning),
            tracker: RotationTracker::new(),
            invincibility_timer: 0.0,
            recovery_timer: None,
            blue_timer: 0.0,
            prev_toggle_walk: false,
            tuning,
        };
        log::debug!("simulator created, seed={seed}");
        sim
    }

    /// Advance one fixed timestep. See [`super::tick`].
    pub fn tick(&mut self, input: &super::ActionInput, dt: f32) -> Vec<super::FrameEvent> {
        super::tick(self, input, dt)
    }

    /// Re-seed and re-initialize every owned structure. The only path that
    /// clears `game_over`.
    pub fn reset(&mut self, seed: Option<u64>) {
        let seed = seed.unwrap_or(self.seed);
        log::debug!("simulator reset, seed={seed}");
        *self = Self::with_tuning(seed, self.tuning.clone());
    }

    /// Immutable view of the active window for the host/HUD
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    /// Per-frame HUD telemetry
    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            score: self.player.score,
            lives: self.player.lives,
            speed: self.player.speed(),
            altitude_drop: self.player.pos.y - self.run_start_y,
        }
    }

    /// Debug invariants checked every tick; a violation aborts the run
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.player.lives > self.tuning.max_lives {
            return Err(InvariantViolation::LivesOutOfRange(self.player.lives));
        }
        let eff = self.player.parachute_effectiveness;
        if !(0.0..=1.0).contains(&eff) {
            return Err(InvariantViolation::ParachuteEffectivenessOutOfRange(eff));
        }
        if !self.terrain.is_continuous(&self.tuning) {
            return Err(InvariantViolation::TerrainDiscontinuity);
        }
        Ok(())
    }
}
