//! Extra-life pickups scheduled ahead of the player
//!
//! Spawning is distance-based: a world-x is armed for the next attempt and
//! the attempt fires once the player closes within `pre_spawn` of it. The
//! pickup materializes `spawn_ahead` past the player, hovering above the
//! terrain curve, and is retired on collection or once it falls behind the
//! retained window.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::rng::GameRng;
use crate::tuning::Tuning;

use super::terrain::TerrainField;

/// What a pickup grants on collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    ExtraLife,
}

/// A single uncollected pickup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    pub kind: PickupKind,
}

/// Sparse set of live pickups plus the spawn schedule
#[derive(Debug, Clone, PartialEq)]
pub struct CollectiblesField {
    pickups: Vec<Pickup>,
    /// World-x at which the next spawn attempt is armed
    pub next_spawn_x: f32,
}

impl CollectiblesField {
    /// The first attempt is armed a full minimum interval past the anchor,
    /// without consuming an RNG draw.
    pub fn new(anchor_x: f32, tuning: &Tuning) -> Self {
        Self {
            pickups: Vec::new(),
            next_spawn_x: anchor_x + tuning.min_interval,
        }
    }

    /// Run the spawn policy for this tick. At most one pickup appears.
    ///
    /// Nothing spawns while lives are at the cap or while the terrain ahead
    /// is not yet generated (the attempt stays armed for a later tick).
    pub fn update_spawn(
        &mut self,
        player_x: f32,
        lives: u32,
        terrain: &TerrainField,
        rng: &mut GameRng,
        tuning: &Tuning,
    ) {
        if player_x < self.next_spawn_x - tuning.pre_spawn {
            return;
        }
        if lives >= tuning.max_lives {
            return;
        }
        let spawn_x = player_x + tuning.spawn_ahead;
        let Some(ground_y) = terrain.height_at(spawn_x) else {
            return;
        };
        self.pickups.push(Pickup {
            pos: Vec2::new(spawn_x, ground_y - tuning.hover),
            kind: PickupKind::ExtraLife,
        });
        self.next_spawn_x = player_x + rng.interval(tuning.min_interval, tuning.max_interval);
        log::debug!("pickup spawned at x={spawn_x:.1}, next armed at {:.1}", self.next_spawn_x);
    }

    /// Remove and return every pickup within `pickup_radius` of `center`
    pub fn collect(&mut self, center: Vec2, tuning: &Tuning) -> Vec<PickupKind> {
        let mut collected = Vec::new();
        self.pickups.retain(|p| {
            if p.pos.distance(center) < tuning.pickup_radius {
                collected.push(p.kind);
                false
            } else {
                true
            }
        });
        collected
    }

    /// Drop pickups that fell more than `retain_behind` behind `x`
    pub fn prune(&mut self, x: f32, tuning: &Tuning) {
        self.pickups.retain(|p| p.pos.x >= x - tuning.retain_behind);
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn len(&self) -> usize {
        self.pickups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty()
    }
}
