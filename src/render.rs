use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate},
};

use crate::model::{Building, Particle, Vec2};

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
}

impl Cell {
    fn blank() -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
        }
    }
}

/// Double-buffered character screen; flush only touches cells that changed
/// since the previous frame.
pub(crate) struct Screen {
    cols: u16,
    rows: u16,
    back: Vec<Cell>,
    front: Vec<Cell>,
    needs_full_redraw: bool,
}

impl Screen {
    pub(crate) fn new(cols: u16, rows: u16) -> Self {
        let n = cols as usize * rows as usize;
        Self {
            cols,
            rows,
            back: vec![Cell::blank(); n],
            front: vec![Cell::blank(); n],
            needs_full_redraw: true,
        }
    }

    pub(crate) fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        let n = cols as usize * rows as usize;
        self.back.clear();
        self.back.resize(n, Cell::blank());
        self.front.clear();
        self.front.resize(n, Cell::blank());
        self.needs_full_redraw = true;
    }

    fn set(&mut self, x: i32, y: i32, ch: char, fg: Color) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u16, y as u16);
        if x >= self.cols || y >= self.rows {
            return;
        }
        self.back[y as usize * self.cols as usize + x as usize] = Cell { ch, fg };
    }

    /// Compose one frame: buildings as solid blocks, trail dots in fading
    /// grays, then live particles as colored arrows on top.
    pub(crate) fn draw_frame(
        &mut self,
        buildings: &[Building],
        particles: &[Particle],
        paused: bool,
    ) {
        self.back.fill(Cell::blank());

        for b in buildings {
            for y in b.y..b.y + b.h {
                for x in b.x..b.x + b.w {
                    self.set(x, y, '#', Color::DarkGrey);
                }
            }
        }

        for p in particles {
            let len = p.trail.len();
            for (i, pt) in p.trail.iter().enumerate() {
                self.set(pt.x as i32, pt.y as i32, '.', trail_color(i, len));
            }
        }

        for p in particles {
            let v = Vec2::new(p.vx, p.vy);
            self.set(p.x as i32, p.y as i32, arrow_glyph(v), speed_color(v.speed()));
        }

        self.draw_hud(particles.len(), paused);
    }

    fn draw_hud(&mut self, count: usize, paused: bool) {
        let line = format!(
            " windtunnel | {count} tracers | space pause  r rebuild  q quit{}",
            if paused { "  (paused)" } else { "" }
        );
        for (i, ch) in line.chars().enumerate() {
            self.set(i as i32, 0, ch, Color::White);
        }
    }

    pub(crate) fn flush(&mut self, out: &mut io::Stdout) -> io::Result<()> {
        queue!(out, BeginSynchronizedUpdate)?;
        if self.needs_full_redraw {
            queue!(out, Clear(ClearType::All))?;
            self.front.fill(Cell::blank());
        }

        let cols = self.cols as usize;
        let rows = self.rows as usize;
        let mut last_fg: Option<Color> = None;

        for y in 0..rows {
            let mut x = 0usize;
            while x < cols {
                let i = y * cols + x;
                if self.back[i] == self.front[i] {
                    x += 1;
                    continue;
                }
                // extend the run of changed cells
                let mut x2 = x + 1;
                while x2 < cols && self.back[y * cols + x2] != self.front[y * cols + x2] {
                    x2 += 1;
                }

                queue!(out, cursor::MoveTo(x as u16, y as u16))?;
                for xx in x..x2 {
                    let c = self.back[y * cols + xx];
                    if last_fg != Some(c.fg) {
                        queue!(out, SetForegroundColor(c.fg))?;
                        last_fg = Some(c.fg);
                    }
                    queue!(out, Print(c.ch))?;
                }

                self.front[i..y * cols + x2].copy_from_slice(&self.back[i..y * cols + x2]);
                x = x2;
            }
        }

        self.needs_full_redraw = false;
        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()
    }
}

/// Eight-way arrow for a velocity. Sector boundaries belong to the
/// counter-clockwise neighbor: [-22.5, 22.5) degrees is east. Glyphs are in
/// screen coordinates, y growing downward.
pub(crate) fn arrow_glyph(v: Vec2) -> char {
    let mut angle = v.vy.atan2(v.vx).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    if !(22.5..337.5).contains(&angle) {
        '>'
    } else if angle < 67.5 {
        '/'
    } else if angle < 112.5 {
        '^'
    } else if angle < 157.5 {
        '\\'
    } else if angle < 202.5 {
        '<'
    } else if angle < 247.5 {
        '/'
    } else if angle < 292.5 {
        'v'
    } else {
        '\\'
    }
}

/// Four-tier ramp from calm blue up to fast red.
pub(crate) fn speed_color(speed: f32) -> Color {
    if speed > 4.0 {
        Color::Red
    } else if speed > 2.0 {
        Color::Yellow
    } else if speed > 1.0 {
        Color::Cyan
    } else {
        Color::Blue
    }
}

/// Grayscale fade for trail dots on the xterm 232..255 ramp, oldest darkest.
pub(crate) fn trail_color(index: usize, len: usize) -> Color {
    let level = 232 + (index * 23 / len.max(1)) as u8;
    Color::AnsiValue(level)
}
