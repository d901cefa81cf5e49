use rand::seq::SliceRandom;
use rand::Rng;
use std::time::SystemTime;

const SYMBOLS: [char; 6] = ['*', '+', 'o', '.', 'x', '#'];
const GRAVITY: f64 = 12.0;
const DURATION_SECS: f64 = 3.0;

/// One confetti particle of the new-record animation, in terminal cell space
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    age: f64,
    max_age: f64,
}

impl Particle {
    fn new(x: f64, y: f64) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            x,
            y,
            vel_x: rng.gen_range(-14.0..14.0),
            vel_y: rng.gen_range(-10.0..-2.0),
            symbol: *SYMBOLS.choose(&mut rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(1.5..DURATION_SECS),
        }
    }

    /// Advance by `dt` seconds; false once the particle has burned out
    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += GRAVITY * dt;
        self.age += dt;
        self.age < self.max_age
    }
}

/// Confetti burst shown when a finished session takes first place on the
/// leaderboard. Purely visual; owned by the host, never by the engine.
#[derive(Debug)]
pub struct Celebration {
    pub particles: Vec<Particle>,
    pub is_active: bool,
    width: f64,
    height: f64,
    last_update: SystemTime,
}

impl Celebration {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            is_active: false,
            width: 80.0,
            height: 24.0,
            last_update: SystemTime::now(),
        }
    }

    /// Launch a burst from the center of a `width`x`height` cell area
    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();
        self.width = width as f64;
        self.height = height as f64;
        self.is_active = true;
        self.last_update = SystemTime::now();

        let center_x = self.width / 2.0;
        let center_y = self.height / 2.0;
        self.particles = (0..80)
            .map(|_| {
                Particle::new(
                    center_x + rng.gen_range(-4.0..4.0),
                    center_y + rng.gen_range(-2.0..2.0),
                )
            })
            .collect();
    }

    /// Step the animation using wall-clock time since the previous update
    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }
        let now = SystemTime::now();
        let dt = now
            .duration_since(self.last_update)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
            .min(0.25);
        self.last_update = now;
        self.step(dt);
    }

    fn step(&mut self, dt: f64) {
        let (width, height) = (self.width, self.height);
        self.particles
            .retain_mut(|p| p.update(dt) && p.x >= 0.0 && p.x < width && p.y < height);
        if self.particles.is_empty() {
            self.is_active = false;
        }
    }

    pub fn stop(&mut self) {
        self.particles.clear();
        self.is_active = false;
    }
}
