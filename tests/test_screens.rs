use std::collections::{HashSet, VecDeque};
use std::path::Path;

use anyhow::bail;
use rand::rngs::StdRng;
use rand::SeedableRng;

use space_shooter::assets::Assets;
use space_shooter::backend::{Backend, Color, FontSize, InputEvent, Key};
use space_shooter::config::AssetConfig;
use space_shooter::entities::*;
use space_shooter::screens::*;

// ── Scripted backend ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
struct FakeImage {
    name: String,
    size: Size,
}

/// Text is 10 px per character and 25 px tall, like an 80×24 terminal.
#[derive(Default)]
struct FakeBackend {
    /// One batch of events per `poll_events` call.
    script: VecDeque<Vec<InputEvent>>,
    held: HashSet<Key>,
    draws: Vec<(String, Point)>,
    presents: usize,
    ticks: usize,
    missing: Option<&'static str>,
}

impl FakeBackend {
    fn scripted(frames: Vec<Vec<InputEvent>>) -> Self {
        Self {
            script: frames.into(),
            ..Self::default()
        }
    }

    fn drew(&self, name: &str) -> Option<Point> {
        self.draws.iter().find(|(n, _)| n == name).map(|(_, p)| *p)
    }
}

impl Backend for FakeBackend {
    type Image = FakeImage;

    fn load_image(&mut self, path: &Path) -> anyhow::Result<FakeImage> {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        if self.missing == Some(name.as_str()) {
            bail!("No such file or directory");
        }
        Ok(FakeImage { name, size: Size { width: 10.0, height: 10.0 } })
    }

    fn scale_image(&mut self, image: &FakeImage, width: f32, height: f32) -> FakeImage {
        FakeImage { name: image.name.clone(), size: Size { width, height } }
    }

    fn image_size(&self, image: &FakeImage) -> Size {
        image.size
    }

    fn render_text(&mut self, text: &str, _size: FontSize, _color: Color) -> FakeImage {
        FakeImage {
            name: text.to_string(),
            size: Size { width: 10.0 * text.chars().count() as f32, height: 25.0 },
        }
    }

    fn fill(&mut self, _color: Color) -> anyhow::Result<()> {
        self.draws.clear();
        Ok(())
    }

    fn draw(&mut self, image: &FakeImage, pos: Point) -> anyhow::Result<()> {
        self.draws.push((image.name.clone(), pos));
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.script.pop_front().unwrap_or_default()
    }

    fn is_key_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn tick(&mut self, _target_fps: u32) {
        self.ticks += 1;
    }

    fn present(&mut self) -> anyhow::Result<()> {
        self.presents += 1;
        Ok(())
    }
}

fn assets(backend: &mut FakeBackend) -> Assets<FakeImage> {
    Assets::load(backend, &AssetConfig::default(), 800.0, 600.0).unwrap()
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

fn menu() -> StartMenu {
    StartMenu {
        easy: Rect { x: 350.0, y: 240.0, width: 40.0, height: 25.0 },
        medium: Rect { x: 350.0, y: 300.0, width: 60.0, height: 25.0 },
        hard: Rect { x: 350.0, y: 360.0, width: 40.0, height: 25.0 },
    }
}

fn expect_game(flow: Flow) -> Game {
    match flow {
        Flow::Continue(game) => game,
        Flow::Quit => panic!("unexpected quit"),
    }
}

fn game_over_game() -> Game {
    let mut game = Game::new(800.0, 600.0);
    game.screen = Screen::GameOver;
    game.session.tier = Tier::Hard;
    game.session.score = 130;
    game.session.player.lives = 0;
    game.session.player.x = 20.0;
    game.session.difficulty = Difficulty { enemy_speed: 7.3, spawn_interval: 0.3 };
    game.session.enemies.push(Enemy { x: 1.0, y: 2.0 });
    game.session.lasers.push(Laser { x: 3.0, y: 4.0 });
    game
}

// ── Start screen ──────────────────────────────────────────────────────────────

#[test]
fn new_game_opens_on_start_screen() {
    let game = Game::new(800.0, 600.0);
    assert_eq!(game.screen, Screen::Start);
}

#[test]
fn start_screen_regions_are_label_rects() {
    let mut backend = FakeBackend::default();
    let drawn = draw_start_screen(&mut backend, 800.0, 600.0).unwrap();
    assert_eq!(drawn, menu());
    assert_eq!(backend.drew("Space Shooter"), Some(Point::new(335.0, 150.0)));
    assert_eq!(backend.presents, 1);
}

#[test]
fn clicking_a_tier_starts_that_tier() {
    let game = Game::new(800.0, 600.0);
    let click = InputEvent::MouseDown(Point::new(360.0, 310.0));
    let next = expect_game(handle_start_event(&game, &menu(), click, 4.0));
    assert_eq!(next.screen, Screen::Playing);
    assert_eq!(next.session.tier, Tier::Medium);
    assert_eq!(next.session.difficulty, Tier::Medium.difficulty());
    assert_eq!(next.session.last_spawn, 4.0);
    assert_eq!(next.session.player.lives, 3);
}

#[test]
fn tier_at_each_region() {
    let m = menu();
    assert_eq!(m.tier_at(Point::new(351.0, 241.0)), Some(Tier::Easy));
    assert_eq!(m.tier_at(Point::new(409.0, 324.0)), Some(Tier::Medium));
    assert_eq!(m.tier_at(Point::new(389.0, 384.0)), Some(Tier::Hard));
    assert_eq!(m.tier_at(Point::new(395.0, 250.0)), None); // past "Easy"
    assert_eq!(m.tier_at(Point::new(360.0, 280.0)), None); // between rows
}

#[test]
fn missed_click_and_keys_stay_on_start() {
    let game = Game::new(800.0, 600.0);
    let miss = InputEvent::MouseDown(Point::new(10.0, 10.0));
    let next = expect_game(handle_start_event(&game, &menu(), miss, 1.0));
    assert_eq!(next.screen, Screen::Start);
    let key = InputEvent::KeyDown(Key::Fire);
    let next = expect_game(handle_start_event(&game, &menu(), key, 1.0));
    assert_eq!(next.screen, Screen::Start);
}

// ── Quit ──────────────────────────────────────────────────────────────────────

#[test]
fn quit_is_honoured_on_every_screen() {
    let game = Game::new(800.0, 600.0);
    assert!(matches!(
        handle_start_event(&game, &menu(), InputEvent::Quit, 0.0),
        Flow::Quit
    ));
    let playing = choose_tier(&game, Tier::Easy, 0.0);
    assert!(matches!(handle_playing_event(&playing, InputEvent::Quit), Flow::Quit));
    let over = game_over_game();
    assert!(matches!(
        handle_game_over_event(&over, Rect::default(), InputEvent::Quit, 0.0),
        Flow::Quit
    ));
}

// ── Playing ───────────────────────────────────────────────────────────────────

#[test]
fn fire_key_adds_laser() {
    let game = choose_tier(&Game::new(800.0, 600.0), Tier::Easy, 0.0);
    let next = expect_game(handle_playing_event(&game, InputEvent::KeyDown(Key::Fire)));
    assert_eq!(next.session.lasers, vec![Laser { x: 395.0, y: 550.0 }]);
    // Movement keys arrive as held state, not as events
    let next = expect_game(handle_playing_event(&game, InputEvent::KeyDown(Key::Left)));
    assert_eq!(next.session.player.x, 375.0);
}

#[test]
fn held_keys_move_the_player() {
    let game = choose_tier(&Game::new(800.0, 600.0), Tier::Easy, 0.0);
    let next = step_playing(&game, true, false, 0.1, &mut rng());
    assert_eq!(next.session.player.x, 370.0);
    let next = step_playing(&next, false, true, 0.2, &mut rng());
    assert_eq!(next.session.player.x, 375.0);
    assert_eq!(next.session.frame, 2);
}

#[test]
fn losing_last_life_switches_to_game_over() {
    let mut game = choose_tier(&Game::new(800.0, 600.0), Tier::Easy, 0.0);
    game.session.player.lives = 1;
    game.session.enemies.push(Enemy { x: 375.0, y: 540.0 });
    let next = step_playing(&game, false, false, 0.1, &mut rng());
    assert_eq!(next.screen, Screen::GameOver);
    assert_eq!(next.session.player.lives, 0);
}

#[test]
fn surviving_a_hit_keeps_playing() {
    let mut game = choose_tier(&Game::new(800.0, 600.0), Tier::Easy, 0.0);
    game.session.enemies.push(Enemy { x: 375.0, y: 540.0 });
    let next = step_playing(&game, false, false, 0.1, &mut rng());
    assert_eq!(next.screen, Screen::Playing);
    assert_eq!(next.session.player.lives, 2);
}

#[test]
fn playfield_draws_background_first_and_hud() {
    let mut backend = FakeBackend::default();
    let assets = assets(&mut backend);
    let mut session = choose_tier(&Game::new(800.0, 600.0), Tier::Easy, 0.0).session;
    session.enemies.push(Enemy { x: 40.0, y: 60.0 });
    session.score = 30;
    draw_playfield(&mut backend, &assets, &session).unwrap();

    assert_eq!(backend.draws[0], ("background.txt".to_string(), Point::new(0.0, 0.0)));
    assert_eq!(backend.drew("player.txt"), Some(Point::new(375.0, 550.0)));
    assert_eq!(backend.drew("enemy.txt"), Some(Point::new(40.0, 60.0)));
    assert_eq!(backend.drew("Score: 30"), Some(Point::new(10.0, 10.0)));
    assert_eq!(backend.drew("Lives: 3"), Some(Point::new(680.0, 10.0)));
}

// ── Game over ─────────────────────────────────────────────────────────────────

#[test]
fn restart_resets_to_easy_regardless_of_tier() {
    let next = restart(&game_over_game(), 9.0);
    assert_eq!(next.screen, Screen::Playing);
    assert_eq!(next.session.score, 0);
    assert_eq!(next.session.player.lives, 3);
    assert_eq!(next.session.player.x, 375.0);
    assert!(next.session.enemies.is_empty());
    assert!(next.session.lasers.is_empty());
    assert_eq!(next.session.tier, Tier::Easy);
    assert_eq!(
        next.session.difficulty,
        Difficulty { enemy_speed: 2.0, spawn_interval: 1.5 }
    );
    assert_eq!(next.session.last_spawn, 9.0);
}

#[test]
fn restart_needs_a_click_inside_the_label() {
    let over = game_over_game();
    let rect = Rect { x: 320.0, y: 500.0, width: 110.0, height: 25.0 };

    let miss = InputEvent::MouseDown(Point::new(300.0, 510.0));
    let next = expect_game(handle_game_over_event(&over, rect, miss, 1.0));
    assert_eq!(next.screen, Screen::GameOver);
    assert_eq!(next.session.score, 130);

    let hit = InputEvent::MouseDown(Point::new(325.0, 510.0));
    let next = expect_game(handle_game_over_event(&over, rect, hit, 1.0));
    assert_eq!(next.screen, Screen::Playing);
}

#[test]
fn game_over_screen_mood_follows_score() {
    let mut backend = FakeBackend::default();
    let assets = assets(&mut backend);
    let mut over = game_over_game();

    let rect = draw_game_over_screen(&mut backend, &assets, &over.session).unwrap();
    assert_eq!(rect, Rect { x: 320.0, y: 500.0, width: 110.0, height: 25.0 });
    assert!(backend.drew("smile.txt").is_some());
    assert!(backend.drew("Awesome! :)").is_some());
    assert!(backend.drew("Your Score: 130").is_some());
    assert_eq!(backend.drew("smile.txt"), Some(Point::new(325.0, 340.0)));

    over.session.score = 90;
    draw_game_over_screen(&mut backend, &assets, &over.session).unwrap();
    assert!(backend.drew("crying.txt").is_some());
    assert!(backend.drew("smile.txt").is_none());
    assert!(backend.drew("Try Again! :(").is_some());
}

// ── Frame driver ──────────────────────────────────────────────────────────────

#[test]
fn run_frame_walks_menu_play_and_quit() {
    let easy = InputEvent::MouseDown(Point::new(355.0, 250.0));
    let mut backend = FakeBackend::scripted(vec![
        vec![easy],
        vec![InputEvent::KeyDown(Key::Fire)],
        vec![InputEvent::Quit],
    ]);
    let assets = assets(&mut backend);
    let mut rng = rng();

    let game = Game::new(800.0, 600.0);
    let game = expect_game(run_frame(&game, &mut backend, &assets, 60, 0.5, &mut rng).unwrap());
    assert_eq!(game.screen, Screen::Playing);
    assert_eq!(game.session.tier, Tier::Easy);

    let game = expect_game(run_frame(&game, &mut backend, &assets, 60, 0.6, &mut rng).unwrap());
    // Fired at y=550, then moved once by the tick
    assert_eq!(game.session.lasers, vec![Laser { x: 395.0, y: 543.0 }]);
    assert!(backend.drew("laser.txt").is_some());

    let flow = run_frame(&game, &mut backend, &assets, 60, 0.7, &mut rng).unwrap();
    assert!(matches!(flow, Flow::Quit));
    assert_eq!(backend.ticks, 3);
}

#[test]
fn later_clicks_in_the_same_frame_do_not_override_choice() {
    let easy = InputEvent::MouseDown(Point::new(355.0, 250.0));
    let hard = InputEvent::MouseDown(Point::new(355.0, 370.0));
    let mut backend = FakeBackend::scripted(vec![vec![easy, hard], vec![easy, InputEvent::Quit]]);
    let assets = assets(&mut backend);
    let mut rng = rng();

    let game = Game::new(800.0, 600.0);
    let game = expect_game(run_frame(&game, &mut backend, &assets, 60, 0.0, &mut rng).unwrap());
    assert_eq!(game.session.tier, Tier::Easy);

    let start = Game::new(800.0, 600.0);
    let flow = run_frame(&start, &mut backend, &assets, 60, 0.0, &mut rng).unwrap();
    assert!(matches!(flow, Flow::Quit));
}

#[test]
fn run_frame_restarts_from_game_over() {
    let click = InputEvent::MouseDown(Point::new(330.0, 510.0));
    let mut backend = FakeBackend::scripted(vec![vec![click]]);
    let assets = assets(&mut backend);
    let game = expect_game(
        run_frame(&game_over_game(), &mut backend, &assets, 60, 3.0, &mut rng()).unwrap(),
    );
    assert_eq!(game.screen, Screen::Playing);
    assert_eq!(game.session.score, 0);
    assert_eq!(game.session.tier, Tier::Easy);
}

// ── Assets ────────────────────────────────────────────────────────────────────

#[test]
fn assets_are_scaled_to_draw_size() {
    let mut backend = FakeBackend::default();
    let a = assets(&mut backend);
    assert_eq!(a.player.size, Size { width: 50.0, height: 50.0 });
    assert_eq!(a.laser.size, Size { width: 10.0, height: 30.0 });
    assert_eq!(a.background.size, Size { width: 800.0, height: 600.0 });
    assert_eq!(a.happy.size, Size { width: 150.0, height: 150.0 });
}

#[test]
fn missing_asset_is_fatal_and_named() {
    let mut backend = FakeBackend {
        missing: Some("crying.txt"),
        ..FakeBackend::default()
    };
    let err = Assets::load(&mut backend, &AssetConfig::default(), 800.0, 600.0).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("crying.txt"), "{msg}");
}
