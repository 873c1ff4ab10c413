use std::collections::VecDeque;

use rand::{rngs::StdRng, Rng};

use crate::flow::FlowField;
use crate::model::{Building, Particle, Point, Vec2, MAX_TRAIL};

/// Euler step size.
pub(crate) const DT: f32 = 0.3;

// Spawn policy: tracers enter in a band along the left edge and live for a
// few hundred frames unless something kills them first.
const SPAWN_BAND: f32 = 10.0;
const LIFE_MIN: u32 = 500;
const LIFE_MAX: u32 = 600;

/// Append `count` fresh tracers riding the base wind.
pub(crate) fn spawn(
    particles: &mut Vec<Particle>,
    count: usize,
    height: usize,
    wind: Vec2,
    rng: &mut StdRng,
) {
    for _ in 0..count {
        particles.push(Particle {
            x: rng.gen_range(0.0..SPAWN_BAND),
            y: rng.gen_range(0.0..height as f32),
            vx: wind.vx,
            vy: wind.vy,
            life: 0,
            max_life: rng.gen_range(LIFE_MIN..LIFE_MAX),
            trail: VecDeque::new(),
        });
    }
}

/// One frame of the particle lifecycle. Consumes the old population and
/// returns the survivors: filter-and-rebuild, never in-place removal.
///
/// The velocity resample happens before the discard checks on purpose; it
/// only affects the last recorded velocity of a particle that dies this
/// frame, which nothing reads afterwards.
pub(crate) fn update(
    particles: Vec<Particle>,
    field: &FlowField,
    buildings: &[Building],
    rng: &mut StdRng,
) -> Vec<Particle> {
    let width = field.width() as f32;
    let height = field.height() as f32;

    let mut alive = Vec::with_capacity(particles.len());

    for mut p in particles {
        p.life += 1;

        p.trail.push_back(Point { x: p.x, y: p.y });
        if p.trail.len() > MAX_TRAIL {
            p.trail.pop_front();
        }

        // Off-grid tracers coast on their last sampled velocity.
        if let Some(wind) = field.sample(p.x, p.y) {
            p.vx = wind.vx + (rng.gen::<f32>() - 0.5) / 3.0;
            p.vy = wind.vy + (rng.gen::<f32>() - 0.5) / 5.0;
        }

        let next_x = p.x + p.vx * DT;
        let next_y = p.y + p.vy * DT;

        // Hitting a wall is terminal, not elastic.
        if buildings.iter().any(|b| b.contains(next_x, next_y)) {
            continue;
        }
        if p.life > p.max_life
            || next_x < 0.0
            || next_x >= width
            || next_y < 0.0
            || next_y >= height
        {
            continue;
        }

        p.x = next_x;
        p.y = next_y;
        alive.push(p);
    }

    alive
}
