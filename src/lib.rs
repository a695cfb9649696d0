//! Powder Run - deterministic gameplay core for an infinite side-scrolling sledder
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, player dynamics, rotation tracking)
//! - `rng`: Seeded PRNG; all gameplay randomness flows through it
//! - `tuning`: Data-driven game balance
//!
//! The host engine owns rendering, input devices, audio and the frame loop.
//! It drives this crate through [`sim::Simulator`] at a fixed timestep and
//! reads back [`sim::FrameEvent`]s and [`sim::Snapshot`]s. Given the same
//! seed and the same per-tick [`sim::ActionInput`] sequence, two simulators
//! produce bit-identical state traces.
//!
//! World coordinates are screen-style: x grows to the right, y grows
//! downward. Gravity is a positive `vy` increment and a jump is a negative
//! one. `altitude_drop` therefore increases as the sled descends.

pub mod rng;
pub mod sim;
pub mod tuning;

pub use rng::GameRng;
pub use sim::{ActionInput, FrameEvent, Simulator, Snapshot, tick};
pub use tuning::Tuning;

/// Fixed constants that are not host-tunable
pub mod consts {
    /// Nominal fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Smallest timestep the simulator accepts
    pub const MIN_DT: f32 = 1.0 / 120.0;
    /// Largest timestep the simulator accepts
    pub const MAX_DT: f32 = 1.0 / 30.0;

    /// Radius of the circular player body
    pub const PLAYER_RADIUS: f32 = 16.0;

    /// World anchor of the first terrain platform
    pub const ANCHOR_X: f32 = 0.0;
    pub const ANCHOR_Y: f32 = 300.0;
}

/// Normalize an angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Shortest signed difference `a - b` between two angles in degrees,
/// in [-180, 180)
#[inline]
pub fn shortest_angle_diff_deg(a: f32, b: f32) -> f32 {
    (a - b + 540.0).rem_euclid(360.0) - 180.0
}

/// Shortest signed difference `a - b` between two angles in radians
#[inline]
pub fn shortest_angle_diff(a: f32, b: f32) -> f32 {
    normalize_angle(a - b)
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
