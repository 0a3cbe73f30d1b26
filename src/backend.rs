//! The presentation backend contract.
//!
//! Gameplay and screen logic never touch the terminal directly; they draw and
//! read input through this trait.  `display::TerminalBackend` is the real
//! implementation, and the integration tests drive the screens with a
//! scripted fake.

use std::path::Path;

use crate::entities::{Point, Size};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
    Red,
    Green,
    Blue,
    Yellow,
    DarkGrey,
}

impl Color {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "black" => Some(Color::Black),
            "white" => Some(Color::White),
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "blue" => Some(Color::Blue),
            "yellow" => Some(Color::Yellow),
            "darkgrey" | "darkgray" | "grey" | "gray" => Some(Color::DarkGrey),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontSize {
    /// Titles.
    Large,
    /// Labels and HUD.
    Small,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Fire,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Quit,
    MouseDown(Point),
    KeyDown(Key),
}

pub trait Backend {
    type Image: Clone;

    /// Load an image from disk.  Failures are fatal at startup.
    fn load_image(&mut self, path: &Path) -> anyhow::Result<Self::Image>;

    fn scale_image(&mut self, image: &Self::Image, width: f32, height: f32) -> Self::Image;

    /// Size in playfield pixels.
    fn image_size(&self, image: &Self::Image) -> Size;

    fn render_text(&mut self, text: &str, size: FontSize, color: Color) -> Self::Image;

    /// Clear the whole frame to a solid colour.
    fn fill(&mut self, color: Color) -> anyhow::Result<()>;

    /// Draw with the image's top-left corner at `pos`.
    fn draw(&mut self, image: &Self::Image, pos: Point) -> anyhow::Result<()>;

    /// Drain pending input without blocking.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    fn is_key_held(&self, key: Key) -> bool;

    /// Block until the next frame is due at `target_fps`.
    fn tick(&mut self, target_fps: u32);

    /// Show the frame assembled since the last `fill`.
    fn present(&mut self) -> anyhow::Result<()>;
}
