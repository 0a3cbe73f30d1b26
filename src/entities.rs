//! All game entity types. Mostly pure data; the only behaviour here is
//! geometry and the per-tier difficulty table.

use crate::consts::{ENEMY_HEIGHT, ENEMY_WIDTH};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    /// Starting difficulty for a freshly chosen tier.
    pub fn difficulty(self) -> Difficulty {
        match self {
            Tier::Easy => Difficulty {
                enemy_speed: 2.0,
                spawn_interval: 1.5,
            },
            Tier::Medium => Difficulty {
                enemy_speed: 3.0,
                spawn_interval: 1.2,
            },
            Tier::Hard => Difficulty {
                enemy_speed: 4.0,
                spawn_interval: 1.0,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Easy => "Easy",
            Tier::Medium => "Medium",
            Tier::Hard => "Hard",
        }
    }
}

/// Which of the three screens owns the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Start,
    Playing,
    GameOver,
}

// ── Geometry ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Axis-aligned rectangle; used for clickable UI labels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

// ── Difficulty ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Difficulty {
    /// Pixels per frame every enemy descends.
    pub enemy_speed: f32,
    /// Seconds between spawns.
    pub spawn_interval: f32,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// A player laser. `(x, y)` is the sprite's top-left and also the hit point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Laser {
    pub x: f32,
    pub y: f32,
}

// ── Player & enemy ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub lives: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
}

impl Enemy {
    /// True when the laser point lies strictly inside this enemy's rectangle.
    pub fn is_hit_by(&self, laser: &Laser) -> bool {
        self.x < laser.x
            && laser.x < self.x + ENEMY_WIDTH
            && self.y < laser.y
            && laser.y < self.y + ENEMY_HEIGHT
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Everything that belongs to one run.  Cloneable so pure update functions
/// can return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct Session {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub lasers: Vec<Laser>,
    pub difficulty: Difficulty,
    pub tier: Tier,
    pub score: u32,
    /// Clock reading (seconds) of the most recent spawn.
    pub last_spawn: f64,
    pub frame: u64,
    pub width: f32,
    pub height: f32,
}
