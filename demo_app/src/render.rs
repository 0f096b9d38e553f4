//! Text-mode render target and camera

use std::fmt;

use ecs_core::prelude::*;

/// Character grid the text renderer draws into
pub struct TextCanvas {
    columns: usize,
    rows: usize,
    cells: Vec<char>,
}

impl TextCanvas {
    /// Create a blank canvas at least one column wide
    pub fn new(columns: usize, rows: usize) -> Self {
        let columns = columns.max(1);
        Self {
            columns,
            rows,
            cells: vec![' '; columns * rows],
        }
    }

    /// Blank every cell
    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    /// Draw `symbol` at a screen position; off-canvas positions are ignored
    pub fn plot(&mut self, screen: Vec2, symbol: char) -> bool {
        if screen.x < 0.0 || screen.y < 0.0 {
            return false;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (column, row) = (screen.x as usize, screen.y as usize);
        if column >= self.columns || row >= self.rows {
            return false;
        }
        self.cells[row * self.columns + column] = symbol;
        true
    }

    /// Number of non-blank cells
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|cell| **cell != ' ').count()
    }
}

impl fmt::Display for TextCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = "-".repeat(self.columns);
        writeln!(f, "+{border}+")?;
        for row in self.cells.chunks(self.columns) {
            let line: String = row.iter().collect();
            writeln!(f, "|{line}|")?;
        }
        write!(f, "+{border}+")
    }
}

/// Maps a world rectangle onto a character grid
pub struct GridCamera {
    bounds: Rect,
    scale: Vec2,
}

impl GridCamera {
    /// Create a camera showing `bounds` on a `columns` x `rows` grid
    #[allow(clippy::cast_precision_loss)]
    pub fn new(bounds: Rect, columns: usize, rows: usize) -> Self {
        let size = bounds.size();
        Self {
            bounds,
            scale: Vec2::new(columns as f32 / size.x, rows as f32 / size.y),
        }
    }
}

impl Camera for GridCamera {
    fn world_to_screen(&self, point: Vec2) -> Vec2 {
        (point - self.bounds.min).component_mul(&self.scale)
    }

    fn screen_to_world(&self, point: Vec2) -> Vec2 {
        point.component_div(&self.scale) + self.bounds.min
    }

    fn viewport(&self) -> Rect {
        self.bounds
    }
}
