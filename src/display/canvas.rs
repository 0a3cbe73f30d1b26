//! Off-screen cell buffer and the pixel ↔ cell projection.

use std::io::Write;

use crossterm::{cursor, style, QueueableCommand};

use super::sprite::Sprite;
use crate::backend::Color;
use crate::entities::Point;

pub fn term_color(color: Color) -> style::Color {
    match color {
        Color::Black => style::Color::Black,
        Color::White => style::Color::White,
        Color::Red => style::Color::Red,
        Color::Green => style::Color::Green,
        Color::Blue => style::Color::Blue,
        Color::Yellow => style::Color::Yellow,
        Color::DarkGrey => style::Color::DarkGrey,
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

/// How many playfield pixels one terminal cell covers on each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellScale {
    pub px_per_col: f32,
    pub px_per_row: f32,
}

impl CellScale {
    pub fn new(width: f32, height: f32, cols: u16, rows: u16) -> Self {
        Self {
            px_per_col: width / f32::from(cols.max(1)),
            px_per_row: height / f32::from(rows.max(1)),
        }
    }

    /// The cell whose centre lies in `[px, px + px_per_col)`.  Paired with
    /// `cell_centre`, a click on any cell of a drawn label lands inside the
    /// label's pixel rect.
    pub fn col_of(&self, px: f32) -> i32 {
        (px / self.px_per_col - 0.5).ceil() as i32
    }

    pub fn row_of(&self, py: f32) -> i32 {
        (py / self.px_per_row - 0.5).ceil() as i32
    }

    pub fn cell_centre(&self, col: u16, row: u16) -> Point {
        Point::new(
            (f32::from(col) + 0.5) * self.px_per_col,
            (f32::from(row) + 0.5) * self.px_per_row,
        )
    }
}

// ── Canvas ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Color,
}

const BLANK: Cell = Cell {
    ch: ' ',
    color: Color::Black,
};

#[derive(Clone, Debug)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![BLANK; usize::from(cols) * usize::from(rows)],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(self.cells[usize::from(row) * usize::from(self.cols) + usize::from(col)])
    }

    /// Copy a sprite with its top-left at (`col`, `row`).  Spaces are
    /// transparent and anything outside the canvas is clipped.
    pub fn blit(&mut self, sprite: &Sprite, col: i32, row: i32) {
        for (dy, line) in sprite.rows.iter().enumerate() {
            let y = row + dy as i32;
            if y < 0 || y >= i32::from(self.rows) {
                continue;
            }
            for (dx, &ch) in line.iter().enumerate() {
                let x = col + dx as i32;
                if ch == ' ' || x < 0 || x >= i32::from(self.cols) {
                    continue;
                }
                let idx = y as usize * usize::from(self.cols) + x as usize;
                self.cells[idx] = Cell {
                    ch,
                    color: sprite.color,
                };
            }
        }
    }

    /// Queue the whole buffer, one colour run at a time, and flush.
    pub fn flush<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for row in 0..self.rows {
            out.queue(cursor::MoveTo(0, row))?;
            let start = usize::from(row) * usize::from(self.cols);
            let line = &self.cells[start..start + usize::from(self.cols)];

            let mut run = String::new();
            let mut run_color = None;
            for cell in line {
                if run_color != Some(cell.color) && cell.ch != ' ' {
                    if let Some(color) = run_color {
                        out.queue(style::SetForegroundColor(term_color(color)))?;
                        out.queue(style::Print(&run))?;
                        run.clear();
                    }
                    run_color = Some(cell.color);
                }
                run.push(cell.ch);
            }
            if let Some(color) = run_color {
                out.queue(style::SetForegroundColor(term_color(color)))?;
            }
            out.queue(style::Print(&run))?;
        }
        out.queue(style::ResetColor)?;
        out.flush()
    }
}
