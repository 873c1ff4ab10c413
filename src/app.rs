use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    cursor, execute,
    style::ResetColor,
    terminal::{
        self, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::flow::{self, FlowField};
use crate::input::{self, Action};
use crate::model::{Building, Particle, Vec2};
use crate::render::Screen;
use crate::sim;

const TARGET_FPS: u64 = 24;
const WIND_SPEED: f32 = 5.0;
const SPAWN_PER_FRAME: usize = 48;
const INITIAL_BURST: usize = 200;
const MIN_COLS: u16 = 60;
const MIN_ROWS: u16 = 24;

// Skyline generator, in grid cells.
const MAX_BUILDINGS: usize = 6;
const FIRST_X: i32 = 15;
const EDGE_MARGIN: i32 = 2;
const RIGHT_RESERVE: i32 = 20;

pub(crate) fn run() -> Result<()> {
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen, cursor::Hide, DisableLineWrap)?;
    terminal::enable_raw_mode()?;

    let result = App::new().and_then(|mut app| app.run(&mut out));

    terminal::disable_raw_mode()?;
    execute!(
        out,
        ResetColor,
        EnableLineWrap,
        cursor::Show,
        LeaveAlternateScreen
    )?;
    result
}

struct App {
    // Grid dimensions, fixed at startup; the screen may resize, the
    // simulation does not.
    cols: u16,
    rows: u16,
    screen: Screen,
    field: FlowField,
    buildings: Vec<Building>,
    particles: Vec<Particle>,
    rng: StdRng,
    paused: bool,
}

impl App {
    fn new() -> Result<Self> {
        let (cols, rows) = terminal::size()?;
        let cols = cols.max(MIN_COLS);
        let rows = rows.max(MIN_ROWS);

        let mut app = Self {
            cols,
            rows,
            screen: Screen::new(cols, rows),
            field: FlowField::uniform(cols as usize, rows as usize, base_wind()),
            buildings: Vec::new(),
            particles: Vec::new(),
            rng: StdRng::from_entropy(),
            paused: false,
        };
        app.rebuild();
        Ok(app)
    }

    /// Fresh skyline, fresh field, fresh population.
    fn rebuild(&mut self) {
        let (w, h) = (self.cols as usize, self.rows as usize);
        self.buildings = generate_buildings(w as i32, h as i32, &mut self.rng);
        self.field = FlowField::uniform(w, h, base_wind());
        for &b in &self.buildings {
            flow::apply_wake(&mut self.field, b);
        }
        self.particles.clear();
        sim::spawn(
            &mut self.particles,
            INITIAL_BURST,
            h,
            base_wind(),
            &mut self.rng,
        );
    }

    fn run(&mut self, out: &mut io::Stdout) -> Result<()> {
        let frame_budget = Duration::from_millis(1000 / TARGET_FPS);

        loop {
            let frame_start = Instant::now();

            for action in input::poll_actions()? {
                match action {
                    Action::Quit => return Ok(()),
                    Action::TogglePause => self.paused = !self.paused,
                    Action::Rebuild => self.rebuild(),
                    Action::Resize(cols, rows) => self.screen.resize(cols, rows),
                }
            }

            if !self.paused {
                sim::spawn(
                    &mut self.particles,
                    SPAWN_PER_FRAME,
                    self.rows as usize,
                    base_wind(),
                    &mut self.rng,
                );
                let old = std::mem::take(&mut self.particles);
                self.particles = sim::update(old, &self.field, &self.buildings, &mut self.rng);
            }

            self.screen
                .draw_frame(&self.buildings, &self.particles, self.paused);
            self.screen.flush(out)?;

            pace(frame_start, frame_budget);
        }
    }
}

fn base_wind() -> Vec2 {
    Vec2::new(WIND_SPEED, 0.0)
}

/// Random left-to-right skyline. Buildings never overlap on x and always fit
/// inside the vertical margins.
fn generate_buildings(width: i32, height: i32, rng: &mut StdRng) -> Vec<Building> {
    let mut buildings = Vec::new();
    let mut cursor = FIRST_X;

    for _ in 0..MAX_BUILDINGS {
        if cursor > width - RIGHT_RESERVE {
            break;
        }
        let w = rng.gen_range(3..8);
        let max_h = height - 2 * EDGE_MARGIN - 1;
        let h = rng.gen_range(5..15).min(max_h);
        let y = EDGE_MARGIN + rng.gen_range(0..height - h - 2 * EDGE_MARGIN);
        buildings.push(Building { x: cursor, y, w, h });
        cursor += w + 5 + rng.gen_range(0..5);
    }

    buildings
}

/// Sleep out the rest of the frame budget. An overrun frame just lets the
/// next one start immediately; the loop never tries to catch up.
fn pace(frame_start: Instant, budget: Duration) {
    let elapsed = frame_start.elapsed();
    if elapsed < budget {
        std::thread::sleep(budget - elapsed);
    }
}
