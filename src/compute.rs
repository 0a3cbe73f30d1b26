//! Pure game-logic functions.
//!
//! Every public function takes an immutable reference to the current
//! `Session` (and, where needed, the clock reading and an RNG handle) and
//! returns a brand-new `Session`.  Side effects are limited to the injected RNG.

use rand::Rng;

use crate::consts::{
    ENEMY_SPAWN_Y, ENEMY_WIDTH, LASER_SPEED, LASER_WIDTH, PLAYER_HEIGHT, PLAYER_LIVES,
    PLAYER_SPEED, PLAYER_WIDTH, PROXIMITY_THRESHOLD, SCORE_PER_KILL,
};
use crate::entities::{Difficulty, Enemy, Laser, Player, Session, Tier};

// ── Difficulty ramp ──────────────────────────────────────────────────────────

/// Per-frame (speed delta, interval delta, interval floor) for a score band.
fn ramp_for(score: u32) -> Option<(f32, f32, f32)> {
    match score {
        0..=49 => None,
        50..=99 => Some((0.01, 0.001, 0.8)),
        100..=199 => Some((0.02, 0.002, 0.5)),
        _ => Some((0.03, 0.003, 0.3)),
    }
}

/// Apply one frame of difficulty ramp for the current score.
///
/// Runs every frame, so the effect accumulates with frame count.  The interval
/// never moves upward, even if it already sits below the band's floor.
pub fn update_difficulty(difficulty: &Difficulty, score: u32) -> Difficulty {
    match ramp_for(score) {
        None => *difficulty,
        Some((speed_step, interval_step, floor)) => Difficulty {
            enemy_speed: difficulty.enemy_speed + speed_step,
            spawn_interval: (difficulty.spawn_interval - interval_step)
                .max(floor)
                .min(difficulty.spawn_interval),
        },
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

fn start_player(width: f32, height: f32) -> Player {
    Player {
        x: ((width - PLAYER_WIDTH) / 2.0).max(0.0),
        y: (height - PLAYER_HEIGHT).max(0.0),
        lives: PLAYER_LIVES,
    }
}

/// Build a fresh session for a tier.  `now` seeds the spawn clock so the first
/// enemy arrives one full interval after the run begins.
pub fn init_session(tier: Tier, width: f32, height: f32, now: f64) -> Session {
    Session {
        player: start_player(width, height),
        enemies: Vec::new(),
        lasers: Vec::new(),
        difficulty: tier.difficulty(),
        tier,
        score: 0,
        last_spawn: now,
        frame: 0,
        width,
        height,
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

pub fn move_player_left(state: &Session) -> Session {
    let new_x = (state.player.x - PLAYER_SPEED).max(0.0);
    Session {
        player: Player {
            x: new_x,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

pub fn move_player_right(state: &Session) -> Session {
    let new_x = (state.player.x + PLAYER_SPEED).min(state.width - PLAYER_WIDTH);
    Session {
        player: Player {
            x: new_x,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

/// Fire a laser from the middle of the ship.  No cap on lasers in flight.
pub fn fire_laser(state: &Session) -> Session {
    let laser = Laser {
        x: state.player.x + PLAYER_WIDTH / 2.0 - LASER_WIDTH / 2.0,
        y: state.player.y,
    };
    let mut lasers = state.lasers.clone();
    lasers.push(laser);
    Session {
        lasers,
        ..state.clone()
    }
}

// ── Spawner ──────────────────────────────────────────────────────────────────

/// Spawn one enemy once `spawn_interval` seconds have passed since the last.
pub fn spawn_enemy(state: &Session, now: f64, rng: &mut impl Rng) -> Session {
    // Compare in the interval's precision: widening 1.2f32 overshoots 1.2
    let elapsed = (now - state.last_spawn) as f32;
    if elapsed < state.difficulty.spawn_interval {
        return state.clone();
    }
    let max_x = (state.width - ENEMY_WIDTH).max(0.0) as i32;
    let x = rng.gen_range(0..=max_x) as f32;
    log::debug!("spawned enemy at x={x} (t={now:.2})");

    let mut enemies = state.enemies.clone();
    enemies.push(Enemy { x, y: ENEMY_SPAWN_Y });
    Session {
        enemies,
        last_spawn: now,
        ..state.clone()
    }
}

// ── Physics / collision ──────────────────────────────────────────────────────

pub fn update_lasers(state: &Session) -> Session {
    let lasers = state
        .lasers
        .iter()
        .map(|l| Laser {
            y: l.y - LASER_SPEED,
            ..*l
        })
        .filter(|l| l.y >= 0.0)
        .collect();
    Session {
        lasers,
        ..state.clone()
    }
}

fn touches_player(player: &Player, enemy: &Enemy) -> bool {
    (player.x - enemy.x).abs() < PROXIMITY_THRESHOLD
        && (player.y - enemy.y).abs() < PROXIMITY_THRESHOLD
}

/// Move every enemy and resolve laser and player collisions.
///
/// Returns the new session and `false` if the player lost their last life
/// this frame.  Processing stops at the fatal hit: enemies after it in the
/// list are carried over untouched.
pub fn update_enemies(state: &Session) -> (Session, bool) {
    let mut lasers = state.lasers.clone();
    let mut enemies = Vec::with_capacity(state.enemies.len());
    let mut score = state.score;
    let mut lives = state.player.lives;

    for (i, enemy) in state.enemies.iter().enumerate() {
        let moved = Enemy {
            y: enemy.y + state.difficulty.enemy_speed,
            ..*enemy
        };

        // First matching laser wins, in firing order.
        if let Some(hit) = lasers.iter().position(|l| moved.is_hit_by(l)) {
            lasers.remove(hit);
            score += SCORE_PER_KILL;
            continue;
        }

        if touches_player(&state.player, &moved) {
            lives = lives.saturating_sub(1);
            if lives == 0 {
                enemies.extend_from_slice(&state.enemies[i + 1..]);
                let next = Session {
                    player: Player {
                        lives,
                        ..state.player.clone()
                    },
                    enemies,
                    lasers,
                    score,
                    ..state.clone()
                };
                return (next, false);
            }
            continue;
        }

        if moved.y > state.height {
            continue;
        }
        enemies.push(moved);
    }

    let next = Session {
        player: Player {
            lives,
            ..state.player.clone()
        },
        enemies,
        lasers,
        score,
        ..state.clone()
    };
    (next, true)
}

// ── Per-frame tick (nearly pure — RNG and clock are injected) ────────────────

/// Advance a playing session by one frame: spawn, physics, then difficulty.
/// The second value is `false` when the episode ended this frame; in that
/// case the difficulty ramp is skipped.
pub fn tick(state: &Session, now: f64, rng: &mut impl Rng) -> (Session, bool) {
    let state = spawn_enemy(state, now, rng);
    let state = update_lasers(&state);
    let (state, alive) = update_enemies(&state);

    let difficulty = if alive {
        update_difficulty(&state.difficulty, state.score)
    } else {
        state.difficulty
    };

    let next = Session {
        difficulty,
        frame: state.frame + 1,
        ..state
    };
    (next, alive)
}
