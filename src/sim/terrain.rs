//! Procedural terrain field
//!
//! A monotonically-advancing polyline of linear segments, generated lazily
//! ahead of the player and pruned behind. Adjacent segments share endpoints
//! exactly (C0 continuity), at most one segment covers any x, and endpoint
//! heights stay inside the `[y_min, y_max]` band.
//!
//! Draw order per appended segment is fixed: height delta first, then the
//! surface roll. Changing it changes every world built from a given seed.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::rng::GameRng;
use crate::tuning::Tuning;

/// Surface type of a segment, affecting friction and scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    /// Icy: low friction
    Fast,
    /// Packed snow ("blue"): medium friction, accrues speed points
    Normal,
    /// Powder: high friction
    Slow,
}

impl Surface {
    /// Roll a surface from the categorical distribution in `tuning`
    fn roll(rng: &mut GameRng, tuning: &Tuning) -> Self {
        let w = tuning.surface_weights;
        let total = w.fast + w.normal + w.slow;
        let x = rng.next_f32() * total;
        if x < w.normal {
            Surface::Normal
        } else if x < w.normal + w.fast {
            Surface::Fast
        } else {
            Surface::Slow
        }
    }
}

/// One linear piece of the terrain polyline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainSegment {
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub surface: Surface,
    /// Precomputed `atan2(end_y - start_y, end_x - start_x)`
    pub angle: f32,
}

impl TerrainSegment {
    pub fn new(start_x: f32, start_y: f32, end_x: f32, end_y: f32, surface: Surface) -> Self {
        debug_assert!(start_x < end_x);
        Self {
            start_x,
            start_y,
            end_x,
            end_y,
            surface,
            angle: (end_y - start_y).atan2(end_x - start_x),
        }
    }

    /// Whether this segment's span covers `x` (start inclusive, end exclusive)
    pub fn covers(&self, x: f32) -> bool {
        self.start_x <= x && x < self.end_x
    }

    /// Height of the surface at `x` by linear interpolation
    pub fn height_at(&self, x: f32) -> f32 {
        let t = (x - self.start_x) / (self.end_x - self.start_x);
        self.start_y + (self.end_y - self.start_y) * t
    }
}

/// Lazy, bounded window of terrain segments around the player
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainField {
    segments: VecDeque<TerrainSegment>,
}

impl TerrainField {
    /// Create the field with its fixed anchor platform: one flat segment of
    /// `segment_width` starting at `(anchor_x, anchor_y)`.
    pub fn new(anchor_x: f32, anchor_y: f32, tuning: &Tuning) -> Self {
        let mut segments = VecDeque::new();
        segments.push_back(TerrainSegment::new(
            anchor_x,
            anchor_y,
            anchor_x + tuning.segment_width,
            anchor_y,
            Surface::Normal,
        ));
        Self { segments }
    }

    /// Append segments until the polyline covers through `x`
    pub fn extend_to(&mut self, x: f32, rng: &mut GameRng, tuning: &Tuning) {
        while self.last().end_x < x {
            let prev = *self.last();
            let dy = rng.range(-tuning.max_rise, tuning.max_drop);
            let end_y = (prev.end_y + dy).clamp(tuning.y_min, tuning.y_max);
            let surface = Surface::roll(rng, tuning);
            self.segments.push_back(TerrainSegment::new(
                prev.end_x,
                prev.end_y,
                prev.end_x + tuning.segment_width,
                end_y,
                surface,
            ));
        }
    }

    /// Drop segments whose end fell more than `retain_behind` behind `x`
    pub fn prune(&mut self, x: f32, tuning: &Tuning) {
        while self.segments.len() > 1
            && self.segments.front().is_some_and(|s| s.end_x < x - tuning.retain_behind)
        {
            self.segments.pop_front();
        }
    }

    /// Segment covering `x`, if any
    pub fn segment_at(&self, x: f32) -> Option<&TerrainSegment> {
        let idx = self.segments.partition_point(|s| s.end_x <= x);
        self.segments.get(idx).filter(|s| s.covers(x))
    }

    /// Surface height at `x`; `None` when no segment covers `x`
    pub fn height_at(&self, x: f32) -> Option<f32> {
        self.segment_at(x).map(|s| s.height_at(x))
    }

    /// Slope angle (radians) of the segment covering `x`
    pub fn slope_at(&self, x: f32) -> Option<f32> {
        self.segment_at(x).map(|s| s.angle)
    }

    /// Segments currently held, oldest first
    pub fn segments(&self) -> impl Iterator<Item = &TerrainSegment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn last(&self) -> &TerrainSegment {
        self.segments.back().expect("terrain field is never empty")
    }

    /// Verify C0 continuity and the height band. Cheap; runs every tick.
    pub fn is_continuous(&self, tuning: &Tuning) -> bool {
        let in_band = |y: f32| y >= tuning.y_min - 1.0 && y <= tuning.y_max + 1.0;
        let mut prev: Option<&TerrainSegment> = None;
        for seg in &self.segments {
            if let Some(p) = prev {
                if p.end_x != seg.start_x || p.end_y != seg.start_y {
                    return false;
                }
                // Every endpoint after the anchor platform stays in band;
                // shared starts are covered by the continuity check above.
                if !in_band(seg.end_y) {
                    return false;
                }
            }
            prev = Some(seg);
        }
        true
    }
}
