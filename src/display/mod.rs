//! Rendering layer — all terminal I/O lives here.
//!
//! `TerminalBackend` projects the virtual playfield onto the terminal grid,
//! composes each frame in an off-screen `Canvas`, and turns crossterm events
//! into `InputEvent`s.  No game logic is performed here.
//!
//! Images keep their pixel size, so after a terminal resize they are
//! resampled to the new cell grid when drawn.

pub mod canvas;
pub mod sprite;

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::{self, TryRecvError};
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};

use crate::backend::{Backend, Color, FontSize, InputEvent, Key};
use crate::entities::{Point, Size};
use canvas::{Canvas, CellScale};
use sprite::Sprite;

// ── Terminal mode ─────────────────────────────────────────────────────────────

/// Raw mode, alternate screen, mouse capture, hidden cursor.  Returns whether
/// the terminal accepted key-release reporting.  On error the caller must
/// still run `leave_terminal`.
pub fn enter_terminal<W: Write>(out: &mut W) -> anyhow::Result<bool> {
    terminal::enable_raw_mode().context("enabling raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(EnableMouseCapture)?;
    out.execute(cursor::Hide)?;

    // Kitty-protocol terminals report releases; others fall back to HOLD_WINDOW
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    Ok(keyboard_enhanced)
}

/// Undo `enter_terminal`.  Best effort: every step runs even if one fails.
pub fn leave_terminal<W: Write>(out: &mut W, keyboard_enhanced: bool) {
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

// ── Held-key tracking ─────────────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈133 ms at
/// 60 FPS) is always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<Key, u64>, key: Key, frame: u64) -> bool {
    key_frame
        .get(&key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn key_for(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::Right),
        KeyCode::Enter => Some(Key::Fire),
        _ => None,
    }
}

/// Map a crossterm event to a game input.  Only key presses count; repeats
/// and releases only feed the held-key map.
pub fn translate(event: &Event, scale: &CellScale) -> Option<InputEvent> {
    match event {
        Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            modifiers,
            ..
        }) => match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(InputEvent::Quit),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                Some(InputEvent::Quit)
            }
            other => key_for(*other).map(InputEvent::KeyDown),
        },
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => Some(InputEvent::MouseDown(scale.cell_centre(*column, *row))),
        _ => None,
    }
}

// ── Backend ───────────────────────────────────────────────────────────────────

pub struct TerminalBackend<W: Write> {
    out: W,
    rx: mpsc::Receiver<Event>,
    width: f32,
    height: f32,
    scale: CellScale,
    canvas: Canvas,
    /// Maps each held key → the frame it was last seen (press or repeat).
    key_frame: HashMap<Key, u64>,
    frame: u64,
    frame_start: Instant,
}

impl<W: Write> TerminalBackend<W> {
    /// Set up the playfield projection for a `width` × `height` pixel window.
    /// The terminal must already be in raw/alternate-screen mode; events are
    /// read on another thread and arrive through `rx`.
    pub fn create_window(
        mut out: W,
        rx: mpsc::Receiver<Event>,
        width: f32,
        height: f32,
        title: &str,
    ) -> anyhow::Result<Self> {
        out.execute(terminal::SetTitle(title))
            .context("setting terminal title")?;
        let (cols, rows) = terminal::size().context("querying terminal size")?;
        log::info!("terminal is {cols}x{rows} cells for a {width}x{height} playfield");
        Ok(Self {
            out,
            rx,
            width,
            height,
            scale: CellScale::new(width, height, cols, rows),
            canvas: Canvas::new(cols, rows),
            key_frame: HashMap::new(),
            frame: 0,
            frame_start: Instant::now(),
        })
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        log::debug!("terminal resized to {cols}x{rows}");
        self.scale = CellScale::new(self.width, self.height, cols, rows);
        self.canvas = Canvas::new(cols, rows);
    }

    fn record_key(&mut self, code: KeyCode, kind: KeyEventKind) {
        let Some(key) = key_for(code) else { return };
        match kind {
            // Press / Repeat: refresh timestamp so key stays "held"
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.key_frame.insert(key, self.frame);
            }
            // Release: remove key immediately (keyboard-enhancement path)
            KeyEventKind::Release => {
                self.key_frame.remove(&key);
            }
        }
    }
}

impl<W: Write> Backend for TerminalBackend<W> {
    type Image = Sprite;

    fn load_image(&mut self, path: &Path) -> anyhow::Result<Sprite> {
        let text = std::fs::read_to_string(path)?;
        Sprite::parse(&text, self.scale)
    }

    fn scale_image(&mut self, image: &Sprite, width: f32, height: f32) -> Sprite {
        image.scaled(width, height, self.scale)
    }

    fn image_size(&self, image: &Sprite) -> Size {
        Size {
            width: image.width,
            height: image.height,
        }
    }

    fn render_text(&mut self, text: &str, size: FontSize, color: Color) -> Sprite {
        Sprite::text(text, size, color, self.scale)
    }

    fn fill(&mut self, _color: Color) -> anyhow::Result<()> {
        // The terminal background is the fill; only glyphs carry colour
        self.canvas.clear();
        Ok(())
    }

    fn draw(&mut self, image: &Sprite, pos: Point) -> anyhow::Result<()> {
        let col = self.scale.col_of(pos.x);
        let row = self.scale.row_of(pos.y);
        self.canvas.blit(&image.fitted(self.scale), col, row);
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(Event::Resize(cols, rows)) => self.resize(cols, rows),
                Ok(event) => {
                    if let Event::Key(KeyEvent { code, kind, .. }) = event {
                        self.record_key(code, kind);
                    }
                    if let Some(input) = translate(&event, &self.scale) {
                        events.push(input);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("input reader stopped; quitting");
                    events.push(InputEvent::Quit);
                    break;
                }
            }
        }
        events
    }

    fn is_key_held(&self, key: Key) -> bool {
        is_held(&self.key_frame, key, self.frame)
    }

    fn tick(&mut self, target_fps: u32) {
        let frame = Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1)));
        let elapsed = self.frame_start.elapsed();
        if elapsed < frame {
            std::thread::sleep(frame - elapsed);
        }
        self.frame_start = Instant::now();
        self.frame += 1;
    }

    fn present(&mut self) -> anyhow::Result<()> {
        self.canvas
            .flush(&mut self.out)
            .context("writing frame to terminal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn press(code: KeyCode) -> Event {
        key(code, KeyEventKind::Press, KeyModifiers::NONE)
    }

    fn scale() -> CellScale {
        CellScale::new(800.0, 600.0, 80, 24)
    }

    #[test]
    fn quit_keys() {
        assert_eq!(translate(&press(KeyCode::Char('q')), &scale()), Some(InputEvent::Quit));
        assert_eq!(translate(&press(KeyCode::Esc), &scale()), Some(InputEvent::Quit));
        let ctrl_c = key(KeyCode::Char('c'), KeyEventKind::Press, KeyModifiers::CONTROL);
        assert_eq!(translate(&ctrl_c, &scale()), Some(InputEvent::Quit));
        assert_eq!(translate(&press(KeyCode::Char('c')), &scale()), None);
    }

    #[test]
    fn enter_fires_only_on_press() {
        assert_eq!(
            translate(&press(KeyCode::Enter), &scale()),
            Some(InputEvent::KeyDown(Key::Fire))
        );
        let repeat = key(KeyCode::Enter, KeyEventKind::Repeat, KeyModifiers::NONE);
        assert_eq!(translate(&repeat, &scale()), None);
    }

    #[test]
    fn left_click_maps_to_cell_centre() {
        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 35,
            row: 10,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(
            translate(&click, &scale()),
            Some(InputEvent::MouseDown(Point::new(355.0, 262.5)))
        );
        let right = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column: 35,
            row: 10,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(translate(&right, &scale()), None);
    }

    #[test]
    fn held_key_expires_after_window() {
        let mut map = HashMap::new();
        map.insert(Key::Left, 10);
        assert!(is_held(&map, Key::Left, 10));
        assert!(is_held(&map, Key::Left, 10 + HOLD_WINDOW));
        assert!(!is_held(&map, Key::Left, 11 + HOLD_WINDOW));
        assert!(!is_held(&map, Key::Right, 10));
    }

    #[test]
    fn movement_keys_include_letters() {
        assert_eq!(key_for(KeyCode::Char('a')), Some(Key::Left));
        assert_eq!(key_for(KeyCode::Right), Some(Key::Right));
        assert_eq!(key_for(KeyCode::Char(' ')), None);
    }

    #[test]
    fn leave_terminal_restores_screen_and_cursor() {
        let mut out = Vec::new();
        leave_terminal(&mut out, false);
        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\x1b[?1000l"));
        assert!(written.contains("\x1b[?25h"));
        assert!(written.ends_with("\x1b[?1049l"));
        assert!(!written.contains("\x1b[<1u"));

        let mut out = Vec::new();
        leave_terminal(&mut out, true);
        assert!(String::from_utf8(out).unwrap().starts_with("\x1b[<1u"));
    }
}
