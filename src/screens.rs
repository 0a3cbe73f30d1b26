//! Screen controller: an explicit three-state machine over `Session`.
//!
//! Transition functions are pure and take the clickable regions produced by
//! the draw functions, so each screen's layout is also its hit map.

use rand::Rng;

use crate::assets::Assets;
use crate::backend::{Backend, Color, FontSize, InputEvent, Key};
use crate::compute::{fire_laser, init_session, move_player_left, move_player_right, tick};
use crate::consts::HAPPY_SCORE;
use crate::entities::{Point, Rect, Screen, Session, Tier};

#[derive(Clone, Debug)]
pub struct Game {
    pub screen: Screen,
    pub session: Session,
}

/// What the outer loop should do after a frame.
#[derive(Clone, Debug)]
pub enum Flow {
    Continue(Game),
    Quit,
}

/// Click regions of the start screen, one per tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StartMenu {
    pub easy: Rect,
    pub medium: Rect,
    pub hard: Rect,
}

impl StartMenu {
    pub fn tier_at(&self, p: Point) -> Option<Tier> {
        [
            (self.easy, Tier::Easy),
            (self.medium, Tier::Medium),
            (self.hard, Tier::Hard),
        ]
        .into_iter()
        .find(|(rect, _)| rect.contains(p))
        .map(|(_, tier)| tier)
    }
}

impl Game {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            screen: Screen::Start,
            session: init_session(Tier::Easy, width, height, 0.0),
        }
    }
}

// ── Transitions ───────────────────────────────────────────────────────────────

pub fn choose_tier(game: &Game, tier: Tier, now: f64) -> Game {
    log::info!("starting {} run", tier.label());
    Game {
        screen: Screen::Playing,
        session: init_session(tier, game.session.width, game.session.height, now),
    }
}

/// Restart always returns to the easy tier, whatever was chosen before.
pub fn restart(game: &Game, now: f64) -> Game {
    log::info!("restarting after a score of {}", game.session.score);
    Game {
        screen: Screen::Playing,
        session: init_session(Tier::Easy, game.session.width, game.session.height, now),
    }
}

pub fn handle_start_event(game: &Game, menu: &StartMenu, event: InputEvent, now: f64) -> Flow {
    match event {
        InputEvent::Quit => Flow::Quit,
        InputEvent::MouseDown(p) => match menu.tier_at(p) {
            Some(tier) => Flow::Continue(choose_tier(game, tier, now)),
            None => Flow::Continue(game.clone()),
        },
        InputEvent::KeyDown(_) => Flow::Continue(game.clone()),
    }
}

pub fn handle_game_over_event(
    game: &Game,
    restart_rect: Rect,
    event: InputEvent,
    now: f64,
) -> Flow {
    match event {
        InputEvent::Quit => Flow::Quit,
        InputEvent::MouseDown(p) if restart_rect.contains(p) => Flow::Continue(restart(game, now)),
        _ => Flow::Continue(game.clone()),
    }
}

pub fn handle_playing_event(game: &Game, event: InputEvent) -> Flow {
    match event {
        InputEvent::Quit => Flow::Quit,
        InputEvent::KeyDown(Key::Fire) => Flow::Continue(Game {
            session: fire_laser(&game.session),
            ..game.clone()
        }),
        _ => Flow::Continue(game.clone()),
    }
}

/// Held-key movement followed by one simulation tick.  Switches to the
/// game-over screen on the frame the last life is lost.
pub fn step_playing(game: &Game, left: bool, right: bool, now: f64, rng: &mut impl Rng) -> Game {
    let mut session = game.session.clone();
    if left {
        session = move_player_left(&session);
    }
    if right {
        session = move_player_right(&session);
    }

    let (session, alive) = tick(&session, now, rng);
    if alive {
        return Game { session, ..game.clone() };
    }
    log::info!("game over: score {} on frame {}", session.score, session.frame);
    Game {
        screen: Screen::GameOver,
        session,
    }
}

// ── Drawing ───────────────────────────────────────────────────────────────────

/// Render `text` at `pos` and return the label's bounding rect.
pub fn draw_text<B: Backend>(
    backend: &mut B,
    text: &str,
    size: FontSize,
    color: Color,
    pos: Point,
) -> anyhow::Result<Rect> {
    let image = backend.render_text(text, size, color);
    backend.draw(&image, pos)?;
    Ok(Rect::new(pos, backend.image_size(&image)))
}

/// Like `draw_text`, but horizontally centred on `centre_x`.
fn draw_text_centred<B: Backend>(
    backend: &mut B,
    text: &str,
    size: FontSize,
    color: Color,
    centre_x: f32,
    y: f32,
) -> anyhow::Result<Rect> {
    let image = backend.render_text(text, size, color);
    let width = backend.image_size(&image).width;
    let pos = Point::new(centre_x - width / 2.0, y);
    backend.draw(&image, pos)?;
    Ok(Rect::new(pos, backend.image_size(&image)))
}

pub fn draw_start_screen<B: Backend>(
    backend: &mut B,
    width: f32,
    height: f32,
) -> anyhow::Result<StartMenu> {
    backend.fill(Color::Black)?;
    draw_text_centred(
        backend,
        "Space Shooter",
        FontSize::Large,
        Color::White,
        width / 2.0,
        height / 4.0,
    )?;

    let x = width / 2.0 - 50.0;
    let mut option = |label: &str, color: Color, y: f32| {
        draw_text(&mut *backend, label, FontSize::Small, color, Point::new(x, y))
    };
    let menu = StartMenu {
        easy: option("Easy", Color::Green, height / 2.0 - 60.0)?,
        medium: option("Medium", Color::Blue, height / 2.0)?,
        hard: option("Hard", Color::Red, height / 2.0 + 60.0)?,
    };
    backend.present()?;
    Ok(menu)
}

/// Returns the "Start Again" click region.
pub fn draw_game_over_screen<B: Backend>(
    backend: &mut B,
    assets: &Assets<B::Image>,
    session: &Session,
) -> anyhow::Result<Rect> {
    let (w, h) = (session.width, session.height);
    let happy = session.score >= HAPPY_SCORE;

    backend.fill(Color::Black)?;
    draw_text_centred(backend, "Game Over!", FontSize::Large, Color::White, w / 2.0, h / 4.0)?;
    draw_text_centred(
        backend,
        &format!("Your Score: {}", session.score),
        FontSize::Small,
        Color::White,
        w / 2.0,
        h / 2.0 - 20.0,
    )?;

    let mood = if happy { &assets.happy } else { &assets.sad };
    let mood_width = backend.image_size(mood).width;
    backend.draw(mood, Point::new(w / 2.0 - mood_width / 2.0, h / 2.0 + 40.0))?;

    let msg = if happy { "Awesome! :)" } else { "Try Again! :(" };
    draw_text_centred(backend, msg, FontSize::Small, Color::White, w / 2.0, h / 2.0 + 10.0)?;

    let restart_rect = draw_text(
        backend,
        "Start Again",
        FontSize::Small,
        Color::Green,
        Point::new(w / 2.0 - 80.0, h / 2.0 + 200.0),
    )?;
    backend.present()?;
    Ok(restart_rect)
}

pub fn draw_playfield<B: Backend>(
    backend: &mut B,
    assets: &Assets<B::Image>,
    session: &Session,
) -> anyhow::Result<()> {
    backend.fill(Color::Black)?;
    backend.draw(&assets.background, Point::new(0.0, 0.0))?;

    backend.draw(&assets.player, Point::new(session.player.x, session.player.y))?;
    for enemy in &session.enemies {
        backend.draw(&assets.enemy, Point::new(enemy.x, enemy.y))?;
    }
    for laser in &session.lasers {
        backend.draw(&assets.laser, Point::new(laser.x, laser.y))?;
    }

    draw_text(
        backend,
        &format!("Score: {}", session.score),
        FontSize::Small,
        Color::White,
        Point::new(10.0, 10.0),
    )?;
    draw_text(
        backend,
        &format!("Lives: {}", session.player.lives),
        FontSize::Small,
        Color::Red,
        Point::new(session.width - 120.0, 10.0),
    )?;
    backend.present()
}

// ── Frame driver ──────────────────────────────────────────────────────────────

/// Run one frame of whichever screen is active.  Events are handled in
/// arrival order; a quit anywhere ends the loop.
pub fn run_frame<B: Backend>(
    game: &Game,
    backend: &mut B,
    assets: &Assets<B::Image>,
    target_fps: u32,
    now: f64,
    rng: &mut impl Rng,
) -> anyhow::Result<Flow> {
    backend.tick(target_fps);

    match game.screen {
        Screen::Start => {
            let menu = draw_start_screen(backend, game.session.width, game.session.height)?;
            let mut game = game.clone();
            for event in backend.poll_events() {
                // Once a tier is chosen, later clicks no longer hit this menu
                if game.screen != Screen::Start {
                    if matches!(event, InputEvent::Quit) {
                        return Ok(Flow::Quit);
                    }
                    continue;
                }
                match handle_start_event(&game, &menu, event, now) {
                    Flow::Quit => return Ok(Flow::Quit),
                    Flow::Continue(next) => game = next,
                }
            }
            Ok(Flow::Continue(game))
        }
        Screen::GameOver => {
            let restart_rect = draw_game_over_screen(backend, assets, &game.session)?;
            let mut game = game.clone();
            for event in backend.poll_events() {
                if game.screen != Screen::GameOver {
                    if matches!(event, InputEvent::Quit) {
                        return Ok(Flow::Quit);
                    }
                    continue;
                }
                match handle_game_over_event(&game, restart_rect, event, now) {
                    Flow::Quit => return Ok(Flow::Quit),
                    Flow::Continue(next) => game = next,
                }
            }
            Ok(Flow::Continue(game))
        }
        Screen::Playing => {
            let mut game = game.clone();
            for event in backend.poll_events() {
                match handle_playing_event(&game, event) {
                    Flow::Quit => return Ok(Flow::Quit),
                    Flow::Continue(next) => game = next,
                }
            }
            let left = backend.is_key_held(Key::Left);
            let right = backend.is_key_held(Key::Right);
            let game = step_playing(&game, left, right, now, rng);
            draw_playfield(backend, assets, &game.session)?;
            Ok(Flow::Continue(game))
        }
    }
}
