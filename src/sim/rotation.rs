//! Airborne rotation tracking and landing classification
//!
//! A two-state machine polled by the simulator: Grounded and Airborne. While
//! airborne it integrates the signed orientation delta each tick; on the
//! airborne-to-grounded transition it classifies the landing and returns a
//! [`LandingVerdict`]. The tracker is pure state - presentation of the
//! outcome (toast, flash, audio) is the host's business.

use serde::{Deserialize, Serialize};

use crate::shortest_angle_diff_deg;
use crate::tuning::Tuning;

/// How a landing is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandingKind {
    /// Orientation matched the slope; flips completed
    Clean,
    /// Noticeably off-angle but recoverable
    Wobble,
    /// Off-angle past tolerance, or a rotation left incomplete
    Crash,
}

/// Result of evaluating an airborne interval on landing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandingVerdict {
    pub kind: LandingKind,
    /// Whole 360-degree rotations completed, either direction
    pub full_flips: u32,
    /// Leftover rotation as a fraction of a full flip, in [0, 1)
    pub partial_flip: f32,
}

impl LandingVerdict {
    /// Trick points for this landing. Crashes score nothing.
    pub fn score(&self) -> u32 {
        if self.kind == LandingKind::Crash {
            return 0;
        }
        if self.full_flips >= 2 {
            1000 * self.full_flips
        } else if self.full_flips == 1 {
            500
        } else if self.partial_flip >= 0.5 {
            100
        } else {
            0
        }
    }
}

/// Accumulates signed airborne rotation between ground contacts
#[derive(Debug, Clone, PartialEq)]
pub struct RotationTracker {
    /// Signed degrees integrated since leaving the ground
    pub accumulated_deg: f32,
    pub was_grounded: bool,
    /// Slope angle (degrees) at the moment of takeoff
    pub initial_ground_angle_deg: f32,
}

impl RotationTracker {
    pub fn new() -> Self {
        Self {
            accumulated_deg: 0.0,
            was_grounded: true,
            initial_ground_angle_deg: 0.0,
        }
    }

    /// Grounded -> Airborne: reset the accumulator
    pub fn take_off(&mut self, ground_angle_deg: f32) {
        self.accumulated_deg = 0.0;
        self.initial_ground_angle_deg = ground_angle_deg;
        self.was_grounded = false;
    }

    /// Add one tick's signed orientation delta (degrees) while airborne
    pub fn accumulate(&mut self, delta_deg: f32) {
        if !self.was_grounded {
            self.accumulated_deg += delta_deg;
        }
    }

    /// Airborne -> Grounded: classify the interval and return the verdict
    pub fn land(
        &mut self,
        orientation_deg: f32,
        ground_angle_deg: f32,
        tuning: &Tuning,
    ) -> LandingVerdict {
        self.was_grounded = true;

        let total = self.accumulated_deg.abs();
        let full_flips = (total / 360.0).floor() as u32;
        let partial_flip = (total % 360.0) / 360.0;
        let delta = shortest_angle_diff_deg(orientation_deg, ground_angle_deg);

        let incomplete = partial_flip >= tuning.wobble_fraction
            && partial_flip < 1.0 - tuning.wobble_fraction;

        let kind = if delta.abs() > tuning.wobble_tolerance || incomplete {
            LandingKind::Crash
        } else if delta.abs() <= tuning.clean_tolerance {
            LandingKind::Clean
        } else {
            LandingKind::Wobble
        };

        LandingVerdict {
            kind,
            full_flips,
            partial_flip,
        }
    }
}

impl Default for RotationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airborne_with(total_deg: f32) -> RotationTracker {
        let mut t = RotationTracker::new();
        t.take_off(0.0);
        // Integrate in tick-sized slices
        let ticks = 60;
        for _ in 0..ticks {
            t.accumulate(total_deg / ticks as f32);
        }
        t
    }

    #[test]
    fn test_clean_double_flip() {
        let tuning = Tuning::default();
        let mut t = airborne_with(720.0);
        let v = t.land(0.0, 0.0, &tuning);
        assert_eq!(v.kind, LandingKind::Clean);
        assert_eq!(v.full_flips, 2);
        assert!(v.partial_flip < 1e-3);
        assert_eq!(v.score(), 2000);
    }

    #[test]
    fn test_clean_single_backflip() {
        let tuning = Tuning::default();
        let mut t = airborne_with(-360.0);
        let v = t.land(5.0, 0.0, &tuning);
        assert_eq!(v.kind, LandingKind::Clean);
        assert_eq!(v.full_flips, 1);
        assert_eq!(v.score(), 500);
    }

    #[test]
    fn test_wobble_landing() {
        let tuning = Tuning::default();
        let mut t = airborne_with(10.0);
        let off = tuning.clean_tolerance + 5.0;
        let v = t.land(off, 0.0, &tuning);
        assert_eq!(v.kind, LandingKind::Wobble);
        assert_eq!(v.score(), 0);
    }

    #[test]
    fn test_crash_by_angle() {
        let tuning = Tuning::default();
        let mut t = airborne_with(0.0);
        let v = t.land(2.0 * tuning.wobble_tolerance, 0.0, &tuning);
        assert_eq!(v.kind, LandingKind::Crash);
        assert_eq!(v.score(), 0);
    }

    #[test]
    fn test_crash_by_incomplete_rotation() {
        let tuning = Tuning::default();
        // Half a flip: orientation is 180 off the slope as well
        let mut t = airborne_with(180.0);
        let v = t.land(180.0, 0.0, &tuning);
        assert_eq!(v.kind, LandingKind::Crash);
        assert!((v.partial_flip - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_near_complete_rotation_counts_as_clean() {
        let tuning = Tuning::default();
        // 350 of 360 degrees: partial 0.972 is past 1 - wobble_fraction
        let mut t = airborne_with(350.0);
        let v = t.land(-10.0, 0.0, &tuning);
        assert_eq!(v.kind, LandingKind::Clean);
        assert_eq!(v.full_flips, 0);
        // Nearly a flip with none completed scores the partial bonus
        assert_eq!(v.score(), 100);
    }

    #[test]
    fn test_flip_count_law() {
        let tuning = Tuning::default();
        for k in 1..5u32 {
            let mut t = airborne_with(360.0 * k as f32 + 1.0);
            let v = t.land(0.0, 0.0, &tuning);
            assert!(v.full_flips >= k, "crossed {}x360 but reported {}", k, v.full_flips);
        }
    }

    #[test]
    fn test_takeoff_resets_accumulator() {
        let mut t = airborne_with(720.0);
        let _ = t.land(0.0, 0.0, &Tuning::default());
        t.take_off(12.0);
        assert_eq!(t.accumulated_deg, 0.0);
        assert_eq!(t.initial_ground_angle_deg, 12.0);
    }

    #[test]
    fn test_accumulate_ignored_while_grounded() {
        let mut t = RotationTracker::new();
        t.accumulate(90.0);
        assert_eq!(t.accumulated_deg, 0.0);
    }

    #[test]
    fn test_verdict_on_sloped_ground() {
        let tuning = Tuning::default();
        let mut t = airborne_with(360.0);
        // Slope of 30 degrees, orientation matches it
        let v = t.land(30.0, 30.0, &tuning);
        assert_eq!(v.kind, LandingKind::Clean);
    }
}
