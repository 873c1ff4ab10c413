use crate::model::{Building, Vec2};

// Wake geometry, in grid cells.
const WAKE_LENGTH: i32 = 50;
const RECIRC_LENGTH: i32 = 10;

// Vortex street shape.
const VORTEX_AMPLITUDE: f32 = 10.0;
const VORTEX_DECAY: f32 = 20.0;
const VORTEX_WAVELENGTH: f32 = 5.0;

const RECIRC_DRAG: f32 = 0.1;
const STREET_DRAG: f32 = 0.7;
const RECIRC_SWIRL: f32 = 0.5;

/// Static wind grid, one cell per terminal cell. Filled once at setup,
/// read-only for the rest of the run.
pub(crate) struct FlowField {
    width: usize,
    height: usize,
    cells: Vec<Vec2>,
}

impl FlowField {
    pub(crate) fn uniform(width: usize, height: usize, base: Vec2) -> Self {
        Self {
            width,
            height,
            cells: vec![base; width * height],
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    pub(crate) fn at(&self, x: usize, y: usize) -> Vec2 {
        self.cells[y * self.width + x]
    }

    fn at_mut(&mut self, x: usize, y: usize) -> &mut Vec2 {
        &mut self.cells[y * self.width + x]
    }

    /// Cell under a continuous position, `None` off-grid.
    pub(crate) fn sample(&self, x: f32, y: f32) -> Option<Vec2> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (gx, gy) = (x as usize, y as usize);
        if gx >= self.width || gy >= self.height {
            return None;
        }
        Some(self.at(gx, gy))
    }
}

/// Carve one building's wake into the field: a strongly damped recirculation
/// pocket right behind the facade, then an alternating vortex street that
/// decays downstream. Rows cover `[y, y + h]` inclusive so the street is
/// mirror-symmetric about the centerline; the centerline itself gets no
/// vertical kick. Later buildings compose onto whatever the field already
/// holds.
pub(crate) fn apply_wake(field: &mut FlowField, b: Building) {
    let center_y = b.center_y();
    let x0 = b.right().max(0);
    let x1 = (b.right() + WAKE_LENGTH).min(field.width() as i32);
    let y0 = b.y.max(0);
    let y1 = (b.y + b.h).min(field.height() as i32 - 1);

    for y in y0..=y1 {
        for x in x0..x1 {
            let rel_x = (x - b.right()) as f32;
            let rel_y = y as f32 - center_y;

            let strength = VORTEX_AMPLITUDE * (-rel_x / VORTEX_DECAY).exp();
            let side = if rel_y > 0.0 {
                1.0
            } else if rel_y < 0.0 {
                -1.0
            } else {
                0.0
            };
            let swirl = strength * (rel_x / VORTEX_WAVELENGTH).sin() * side;

            let cell = field.at_mut(x as usize, y as usize);
            if rel_x < RECIRC_LENGTH as f32 {
                cell.vx *= RECIRC_DRAG;
                cell.vy += swirl * RECIRC_SWIRL;
            } else {
                cell.vx *= STREET_DRAG;
                cell.vy += swirl;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Vec2 {
        Vec2::new(5.0, 0.0)
    }

    #[test]
    fn wake_is_spatially_local() {
        let mut field = FlowField::uniform(80, 20, base());
        apply_wake(
            &mut field,
            Building {
                x: 10,
                y: 8,
                w: 4,
                h: 4,
            },
        );

        // Band is rows 8..=12, columns 14..64. Everything else stays base wind.
        for y in 0..20usize {
            for x in 0..80usize {
                let in_band = (8..=12).contains(&y) && (14..64).contains(&x);
                if !in_band {
                    assert_eq!(field.at(x, y), base(), "cell ({x},{y}) was touched");
                }
            }
        }
    }

    #[test]
    fn wake_is_deterministic() {
        let b = Building {
            x: 12,
            y: 5,
            w: 3,
            h: 7,
        };
        let mut a = FlowField::uniform(60, 20, base());
        let mut c = FlowField::uniform(60, 20, base());
        apply_wake(&mut a, b);
        apply_wake(&mut c, b);
        for y in 0..20usize {
            for x in 0..60usize {
                assert_eq!(a.at(x, y), c.at(x, y));
            }
        }
    }

    #[test]
    fn street_mirrors_across_the_centerline() {
        // 10x10 grid, building {3,4,2,2}: center row 5, wake rows 4..=6.
        let mut field = FlowField::uniform(10, 10, base());
        apply_wake(
            &mut field,
            Building {
                x: 3,
                y: 4,
                w: 2,
                h: 2,
            },
        );

        let above = field.at(9, 4);
        let below = field.at(9, 6);
        assert!(above.vy != 0.0);
        assert!((above.vy + below.vy).abs() < 1e-5);
        assert!((above.vy.abs() - below.vy.abs()).abs() < 1e-5);

        // The centerline row gets drag but no vertical kick.
        assert_eq!(field.at(9, 5).vy, 0.0);
    }

    #[test]
    fn recirculation_damps_harder_than_the_street() {
        let mut field = FlowField::uniform(80, 20, base());
        apply_wake(
            &mut field,
            Building {
                x: 10,
                y: 8,
                w: 4,
                h: 4,
            },
        );

        // rel_x = 6: near wake. rel_x = 16: vortex street.
        assert!((field.at(20, 10).vx - 0.5).abs() < 1e-4);
        assert!((field.at(30, 10).vx - 3.5).abs() < 1e-4);
    }

    #[test]
    fn overlapping_wakes_compose() {
        let b1 = Building {
            x: 5,
            y: 6,
            w: 3,
            h: 6,
        };
        let b2 = Building {
            x: 20,
            y: 6,
            w: 3,
            h: 6,
        };

        let mut only1 = FlowField::uniform(80, 20, base());
        apply_wake(&mut only1, b1);
        let mut only2 = FlowField::uniform(80, 20, base());
        apply_wake(&mut only2, b2);
        let mut both = FlowField::uniform(80, 20, base());
        apply_wake(&mut both, b1);
        apply_wake(&mut both, b2);

        // (30, 7) sits in both downstream bands: vertical kicks add, drags stack.
        let a = only1.at(30, 7);
        let c = only2.at(30, 7);
        let combined = both.at(30, 7);
        assert!((combined.vy - (a.vy + c.vy)).abs() < 1e-4);
        assert!((combined.vx - a.vx * c.vx / 5.0).abs() < 1e-4);
    }

    #[test]
    fn wake_clips_at_the_field_edge() {
        // Building close to the right edge: the band truncates, nothing panics.
        let mut field = FlowField::uniform(30, 10, base());
        apply_wake(
            &mut field,
            Building {
                x: 25,
                y: 2,
                w: 3,
                h: 4,
            },
        );
        assert_ne!(field.at(29, 3), base());
        assert_eq!(field.at(27, 1), base());
    }

    #[test]
    fn sample_truncates_and_bounds_checks() {
        let mut field = FlowField::uniform(10, 10, base());
        apply_wake(
            &mut field,
            Building {
                x: 3,
                y: 4,
                w: 2,
                h: 2,
            },
        );

        assert_eq!(field.sample(6.7, 4.2), Some(field.at(6, 4)));
        assert_eq!(field.sample(-0.1, 5.0), None);
        assert_eq!(field.sample(5.0, -0.1), None);
        assert_eq!(field.sample(10.0, 5.0), None);
        assert_eq!(field.sample(9.9, 9.9), Some(field.at(9, 9)));
    }
}
