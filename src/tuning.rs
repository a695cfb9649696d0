//! Data-driven game balance
//!
//! Every host-configurable constant lives in [`Tuning`]. The defaults are the
//! authoritative arcade feel at a 60 Hz tick; hosts may override any subset
//! by deserializing a partial JSON table on top of the defaults.
//!
//! Units: world distances in pixels, times in seconds, angles for the
//! landing classifier in degrees, angular velocity in radians per second.

use serde::{Deserialize, Serialize};

use crate::sim::terrain::Surface;

/// Categorical weights for picking a segment surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceWeights {
    pub fast: f32,
    pub normal: f32,
    pub slow: f32,
}

impl Default for SurfaceWeights {
    fn default() -> Self {
        Self {
            fast: 0.2,
            normal: 0.7,
            slow: 0.1,
        }
    }
}

/// Host-configurable constant table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Gravity ===
    /// Vertical acceleration while airborne (px/s², downward)
    pub gravity: f32,

    // === Terrain shape ===
    /// Horizontal span of every segment (px)
    pub segment_width: f32,
    /// Highest terrain height the generator may reach (y grows downward)
    pub y_min: f32,
    /// Lowest terrain height the generator may reach
    pub y_max: f32,
    /// Largest upward step between segment endpoints (px)
    pub max_rise: f32,
    /// Largest downward step between segment endpoints (px)
    pub max_drop: f32,
    /// Surface pick distribution
    pub surface_weights: SurfaceWeights,

    // === Terrain window ===
    /// Distance ahead of the player kept generated (px)
    pub lookahead: f32,
    /// Distance behind the player before segments/pickups are dropped (px)
    pub retain_behind: f32,

    // === Ground buffering ===
    /// Gap above the terrain beyond which the body counts as airborne (px)
    pub air_threshold: f32,
    /// Ticks a fresh landing stays grounded across segment seams
    pub sticky_frames: u32,
    /// Penetration depth that triggers the teleport failsafe (px)
    pub penetration_epsilon: f32,

    // === Rotation dynamics ===
    /// Angular speed while a rotate action is held airborne (rad/s)
    pub air_rot_vel: f32,
    /// Per-frame interpolation factor pulling a grounded body onto the slope
    pub slope_alignment: f32,

    // === Grounded forces ===
    /// Constant force along the terrain tangent in Sled mode (px/s²)
    pub downhill_bias_force: f32,
    /// Passive creep force in the direction of motion (px/s²)
    pub forward_boost: f32,
    /// Velocity damping coefficients per surface (1/s)
    pub friction_fast: f32,
    pub friction_normal: f32,
    pub friction_slow: f32,

    // === Trick effects ===
    /// Grounded brake deceleration (px/s²)
    pub drag_force: f32,
    /// Grounded tuck forward acceleration (px/s²)
    pub tuck_boost: f32,
    /// Per-second horizontal velocity retention while air-braking
    pub air_brake_decay: f32,
    /// Fall damping at full parachute effectiveness (vy multiplier per frame)
    pub parachute_factor: f32,
    /// Seconds for parachute effectiveness to decay from 1 to 0
    pub parachute_time_constant: f32,
    /// Forward drift while parachuting, scaled by effectiveness (px/s²)
    pub parachute_drift: f32,

    // === Jump curve ===
    /// Launch speed at standstill (px/s, applied upward)
    pub min_jump_velocity: f32,
    /// Launch speed at or above `min_speed_for_max_jump` (px/s)
    pub max_jump_velocity: f32,
    /// Horizontal speed that earns the full jump (px/s)
    pub min_speed_for_max_jump: f32,
    /// Fixed jump speed in Walk mode (px/s)
    pub walk_jump_velocity: f32,

    // === Landing classifier ===
    /// Max |orientation - slope| for a Clean landing (degrees)
    pub clean_tolerance: f32,
    /// Max |orientation - slope| for a Wobble landing (degrees)
    pub wobble_tolerance: f32,
    /// Partial-flip fraction treated as "barely rotated" on either side
    pub wobble_fraction: f32,

    // === Surface scoring ===
    /// Speed above which Normal (blue) surface contact scores (px/s)
    pub blue_speed_threshold: f32,
    /// Points per (speed - threshold) accrued each scoring interval
    pub blue_points: f32,
    /// Accrual quantum for surface scoring (seconds)
    pub blue_score_interval: f32,

    // === Life economy ===
    pub initial_lives: u32,
    pub max_lives: u32,
    /// Points granted when collecting an extra life at the cap
    pub max_overflow_points: u32,

    // === Collectibles ===
    /// Shortest gap between spawn attempts (px of player travel)
    pub min_interval: f32,
    /// Longest gap between spawn attempts (px)
    pub max_interval: f32,
    /// How far ahead of the player a pickup materializes (px)
    pub spawn_ahead: f32,
    /// Slack before `next_spawn_x` at which the attempt fires (px)
    pub pre_spawn: f32,
    /// Height of a pickup above the terrain curve (px)
    pub hover: f32,
    /// Collection distance from the body center (px)
    pub pickup_radius: f32,

    // === Crash recovery ===
    /// Delay before the post-crash recovery kick (seconds)
    pub recovery_delay: f32,
    /// Invincibility window after a survivable crash (seconds)
    pub invincibility_duration: f32,

    // === Walk mode ===
    /// Top walking speed (px/s)
    pub walk_speed: f32,
    /// Walking acceleration toward the input direction (px/s²)
    pub walk_accel: f32,

    // === Out-of-bounds policy ===
    /// Depth below `y_max` that ends the run (px)
    pub out_of_bounds_depth: f32,
    /// Distance behind the furthest point reached that ends the run (px)
    pub behind_camera_slack: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 700.0,

            segment_width: 160.0,
            y_min: 120.0,
            y_max: 900.0,
            max_rise: 60.0,
            max_drop: 90.0,
            surface_weights: SurfaceWeights::default(),

            lookahead: 1200.0,
            retain_behind: 400.0,

            air_threshold: 6.0,
            sticky_frames: 4,
            penetration_epsilon: 8.0,

            air_rot_vel: 6.0,
            slope_alignment: 0.15,

            downhill_bias_force: 90.0,
            forward_boost: 30.0,
            friction_fast: 0.1,
            friction_normal: 0.5,
            friction_slow: 1.8,

            drag_force: 300.0,
            tuck_boost: 220.0,
            air_brake_decay: 0.15,
            parachute_factor: 0.8,
            parachute_time_constant: 1.0,
            parachute_drift: 40.0,

            min_jump_velocity: 240.0,
            max_jump_velocity: 480.0,
            min_speed_for_max_jump: 500.0,
            walk_jump_velocity: 260.0,

            clean_tolerance: 20.0,
            wobble_tolerance: 45.0,
            wobble_fraction: 0.25,

            blue_speed_threshold: 150.0,
            blue_points: 0.05,
            blue_score_interval: 0.1,

            initial_lives: 3,
            max_lives: 5,
            max_overflow_points: 250,

            min_interval: 900.0,
            max_interval: 2200.0,
            spawn_ahead: 700.0,
            pre_spawn: 200.0,
            hover: 32.0,
            pickup_radius: 40.0,

            recovery_delay: 0.6,
            invincibility_duration: 2.0,

            walk_speed: 120.0,
            walk_accel: 600.0,

            out_of_bounds_depth: 600.0,
            behind_camera_slack: 900.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning table from JSON.
    ///
    /// Unspecified fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Velocity damping coefficient for a surface
    pub fn friction(&self, surface: Surface) -> f32 {
        match surface {
            Surface::Fast => self.friction_fast,
            Surface::Normal => self.friction_normal,
            Surface::Slow => self.friction_slow,
        }
    }
}
