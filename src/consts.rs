//! Gameplay constants. All distances are in virtual playfield pixels and all
//! speeds are per frame.

pub const SCREEN_WIDTH: f32 = 800.0;
pub const SCREEN_HEIGHT: f32 = 600.0;
pub const TARGET_FPS: u32 = 60;

// ── Player ────────────────────────────────────────────────────────────────────

pub const PLAYER_WIDTH: f32 = 50.0;
pub const PLAYER_HEIGHT: f32 = 50.0;
pub const PLAYER_SPEED: f32 = 5.0;
pub const PLAYER_LIVES: u32 = 3;

/// Independent-axis distance under which an enemy counts as touching the player.
pub const PROXIMITY_THRESHOLD: f32 = 40.0;

// ── Laser ─────────────────────────────────────────────────────────────────────

pub const LASER_WIDTH: f32 = 10.0;
pub const LASER_HEIGHT: f32 = 30.0;
pub const LASER_SPEED: f32 = 7.0;

// ── Enemy ─────────────────────────────────────────────────────────────────────

pub const ENEMY_WIDTH: f32 = 50.0;
pub const ENEMY_HEIGHT: f32 = 50.0;
pub const ENEMY_SPAWN_Y: f32 = -50.0;
pub const SCORE_PER_KILL: u32 = 10;

// ── Game-over screen ──────────────────────────────────────────────────────────

pub const MOOD_SIZE: f32 = 150.0;
/// Final score at which the game-over screen switches to the happy face.
pub const HAPPY_SCORE: u32 = 100;
