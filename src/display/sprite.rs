//! Text-art images.
//!
//! A sprite file is plain text, one line per cell row.  An optional first line
//! `color: <name>` picks the colour (white otherwise).  Spaces are transparent.

use std::borrow::Cow;

use anyhow::{bail, Context};

use super::canvas::CellScale;
use crate::backend::{Color, FontSize};

#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub rows: Vec<Vec<char>>,
    pub color: Color,
    /// Size in playfield pixels.
    pub width: f32,
    pub height: f32,
}

impl Sprite {
    fn from_rows(rows: Vec<Vec<char>>, color: Color, scale: CellScale) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = rows.len() as f32 * scale.px_per_row;
        Self {
            rows,
            color,
            width: cols as f32 * scale.px_per_col,
            height,
        }
    }

    pub fn parse(text: &str, scale: CellScale) -> anyhow::Result<Self> {
        let mut lines = text.lines().peekable();
        let mut color = Color::White;
        if let Some(name) = lines.peek().and_then(|l| l.strip_prefix("color:")) {
            color = Color::from_name(name)
                .with_context(|| format!("unknown colour {:?}", name.trim()))?;
            lines.next();
        }

        let mut rows: Vec<Vec<char>> = lines.map(|l| l.trim_end().chars().collect()).collect();
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        if rows.iter().all(|r| r.iter().all(|&c| c == ' ')) {
            bail!("sprite has no visible cells");
        }

        // Pad to a rectangle so scaling samples a uniform grid
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(cols, ' ');
        }
        Ok(Self::from_rows(rows, color, scale))
    }

    /// Nearest-neighbour resample to cover `width` × `height` pixels.
    pub fn scaled(&self, width: f32, height: f32, scale: CellScale) -> Self {
        let (target_cols, target_rows) = cell_grid(width, height, scale);
        let src_rows = self.rows.len().max(1);
        let src_cols = self.rows.iter().map(Vec::len).max().unwrap_or(0).max(1);

        let rows = (0..target_rows)
            .map(|r| {
                let src_row = (r * src_rows / target_rows).min(self.rows.len().saturating_sub(1));
                let src = &self.rows[src_row];
                (0..target_cols)
                    .map(|c| src.get(c * src_cols / target_cols).copied().unwrap_or(' '))
                    .collect()
            })
            .collect();
        Self {
            rows,
            color: self.color,
            width,
            height,
        }
    }

    /// The sprite as it should be drawn under `scale`.  Sprites built for an
    /// older terminal size are resampled to keep their pixel footprint.
    pub fn fitted(&self, scale: CellScale) -> Cow<'_, Sprite> {
        let cols = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        if cell_grid(self.width, self.height, scale) == (cols, self.rows.len()) {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(self.scaled(self.width, self.height, scale))
        }
    }

    /// A one-row text label.  Large text is letter-spaced.
    pub fn text(text: &str, size: FontSize, color: Color, scale: CellScale) -> Self {
        let chars: Vec<char> = match size {
            FontSize::Small => text.chars().collect(),
            FontSize::Large => {
                let mut spaced = Vec::with_capacity(text.len() * 2);
                for (i, ch) in text.chars().enumerate() {
                    if i > 0 {
                        spaced.push(' ');
                    }
                    spaced.push(ch);
                }
                spaced
            }
        };
        Self::from_rows(vec![chars], color, scale)
    }
}

/// Cells covered by `width` × `height` pixels, never less than one.
fn cell_grid(width: f32, height: f32, scale: CellScale) -> (usize, usize) {
    let cols = (width / scale.px_per_col).round().max(1.0) as usize;
    let rows = (height / scale.px_per_row).round().max(1.0) as usize;
    (cols, rows)
}
