//! Player body dynamics and ground coupling
//!
//! The player is a circle riding a polyline. Each tick the simulator first
//! derives the buffered ground contact, then runs the mode-specific step:
//! forces, action effects, semi-implicit Euler integration and the
//! penetration failsafe. Airborne bodies with no covering segment are left
//! alone; the failsafe only ever pulls a body up out of the terrain.

use glam::Vec2;

use crate::tuning::Tuning;
use crate::{lerp, shortest_angle_diff};

use super::state::PlayerState;
use super::terrain::TerrainField;
use super::tick::ActionInput;

/// Derive `on_ground` with the air-threshold buffer and sticky frames, snap
/// the body onto the surface, and keep grounded velocity along the tangent.
pub(crate) fn detect_ground(player: &mut PlayerState, terrain: &TerrainField, tuning: &Tuning) {
    player.just_teleported = false;

    // A jump's first-tick displacement can be smaller than the air
    // threshold; the tick after a jump is airborne unconditionally.
    if player.just_jumped {
        player.just_jumped = false;
        player.on_ground = false;
        player.sticky_ticks = 0;
        return;
    }

    let Some(ground_y) = terrain.height_at(player.pos.x) else {
        // No covering segment: airborne, no snap
        player.on_ground = false;
        player.sticky_ticks = 0;
        return;
    };

    // Positive gap = body above the surface (y grows downward)
    let gap = ground_y - player.pos.y;
    if gap > tuning.air_threshold {
        if player.sticky_ticks > 0 {
            // Fresh landing persists across segment seams
            player.sticky_ticks -= 1;
        } else {
            player.on_ground = false;
        }
        return;
    }

    if !player.on_ground {
        player.sticky_ticks = tuning.sticky_frames;
    }
    player.on_ground = true;
    // A grounded body never hovers; slight penetration is tolerated and the
    // failsafe catches anything deeper.
    player.pos.y = player.pos.y.max(ground_y);
    if let Some(angle) = terrain.slope_at(player.pos.x) {
        let tangent = Vec2::new(angle.cos(), angle.sin());
        player.vel = tangent * player.vel.dot(tangent);
    }
}

/// Sled-mode step: forces, action effects, integration, failsafe
pub(crate) fn sled_step(
    player: &mut PlayerState,
    terrain: &TerrainField,
    input: &ActionInput,
    tuning: &Tuning,
    dt: f32,
) {
    let slope = terrain.slope_at(player.pos.x);

    if player.on_ground {
        let angle = slope.unwrap_or(0.0);
        let tangent = Vec2::new(angle.cos(), angle.sin());

        // Downhill bias plus passive creep so flat ground still moves
        player.vel += tangent * tuning.downhill_bias_force * dt;
        let dir = if player.vel.x < 0.0 { -1.0 } else { 1.0 };
        player.vel.x += tuning.forward_boost * dt * dir;

        if let Some(seg) = terrain.segment_at(player.pos.x) {
            let damp = (1.0 - tuning.friction(seg.surface) * dt).max(0.0);
            player.vel *= damp;
        }
    } else {
        player.vel.y += tuning.gravity * dt;
    }

    apply_sled_actions(player, input, slope, tuning, dt);
    integrate(player, dt);
    failsafe(player, terrain, tuning, dt);
}

fn apply_sled_actions(
    player: &mut PlayerState,
    input: &ActionInput,
    slope: Option<f32>,
    tuning: &Tuning,
    dt: f32,
) {
    player.tricks.clear();

    if player.on_ground {
        // Grounded bodies do not spin; they settle onto the slope
        player.angular_vel = 0.0;
        if let Some(angle) = slope {
            let t = (tuning.slope_alignment * dt * 60.0).min(1.0);
            player.orientation += shortest_angle_diff(angle, player.orientation) * t;
        }

        if input.brake {
            player.tricks.dragging = true;
            let dv = tuning.drag_force * dt;
            if player.vel.x.abs() <= dv {
                player.vel.x = 0.0;
            } else {
                player.vel.x -= player.vel.x.signum() * dv;
            }
        }
        if input.trick {
            player.tricks.tucking = true;
            let dir = if player.vel.x < 0.0 { -1.0 } else { 1.0 };
            player.vel.x += tuning.tuck_boost * dt * dir;
        }
        if input.jump {
            let t = (player.vel.x.abs() / tuning.min_speed_for_max_jump).clamp(0.0, 1.0);
            player.vel.y = -lerp(tuning.min_jump_velocity, tuning.max_jump_velocity, t);
            player.on_ground = false;
            player.sticky_ticks = 0;
            player.just_jumped = true;
        }
    } else {
        player.angular_vel = if input.rotate_ccw {
            -tuning.air_rot_vel
        } else if input.rotate_cw {
            tuning.air_rot_vel
        } else {
            0.0
        };

        if input.brake {
            player.tricks.air_braking = true;
            player.vel.x *= tuning.air_brake_decay.powf(dt);
        }
        if input.trick {
            player.tricks.parachuting = true;
            player.parachute_effectiveness = (player.parachute_effectiveness
                - dt / tuning.parachute_time_constant)
                .max(0.0);
            let factor = lerp(1.0, tuning.parachute_factor, player.parachute_effectiveness);
            player.vel.y *= factor.powf(dt * 60.0);
            player.vel.x += tuning.parachute_drift * player.parachute_effectiveness * dt;
        }
    }
}

/// Walk-mode step: input-clamped horizontal speed, fixed jump, upright body
pub(crate) fn walk_step(
    player: &mut PlayerState,
    terrain: &TerrainField,
    input: &ActionInput,
    tuning: &Tuning,
    dt: f32,
) {
    player.tricks.clear();

    let dir = (input.right as i32 - input.left as i32) as f32;
    if player.on_ground {
        let target = dir * tuning.walk_speed;
        let dv = tuning.walk_accel * dt;
        if (target - player.vel.x).abs() <= dv {
            player.vel.x = target;
        } else {
            player.vel.x += (target - player.vel.x).signum() * dv;
        }
        if input.jump {
            player.vel.y = -tuning.walk_jump_velocity;
            player.on_ground = false;
            player.sticky_ticks = 0;
            player.just_jumped = true;
        }
    } else {
        player.vel.y += tuning.gravity * dt;
    }

    player.angular_vel = 0.0;
    let t = (tuning.slope_alignment * dt * 60.0).min(1.0);
    player.orientation += shortest_angle_diff(0.0, player.orientation) * t;

    integrate(player, dt);
    failsafe(player, terrain, tuning, dt);
}

/// Semi-implicit Euler: forces already applied to velocity this tick
fn integrate(player: &mut PlayerState, dt: f32) {
    player.pos += player.vel * dt;
    player.orientation += player.angular_vel * dt;
}

/// Teleport a deeply-penetrating body back above the surface
fn failsafe(player: &mut PlayerState, terrain: &TerrainField, tuning: &Tuning, dt: f32) {
    let Some(ground_y) = terrain.height_at(player.pos.x) else {
        return;
    };
    // Tolerance widens with the distance one tick of fall can cover
    let eps = tuning.penetration_epsilon + player.vel.y.abs() * dt;
    if player.pos.y > ground_y + eps {
        log::warn!(
            "failsafe snap at x={:.1}: y={:.1} below terrain {:.1}",
            player.pos.x,
            player.pos.y,
            ground_y
        );
        player.pos.y = ground_y - 1.0;
        player.vel.y = 0.0;
        player.just_teleported = true;
    }
}

/// Run-ending positions: far below the terrain band or far behind the view
pub(crate) fn out_of_bounds(player: &PlayerState, max_x_reached: f32, tuning: &Tuning) -> bool {
    player.pos.y > tuning.y_max + tuning.out_of_bounds_depth
        || player.pos.x < max_x_reached - tuning.behind_camera_slack
}
