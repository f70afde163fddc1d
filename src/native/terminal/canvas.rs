//! A grid of styled cells, the terminal toolkit's frame buffer.
//!
//! Controls paint into a [`Canvas`]; consecutive frames are diffed so the
//! driver only rewrites cells that changed.

/// Text attributes of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub bold: bool,
    pub dim: bool,
    pub reverse: bool,
    pub underline: bool,
}

impl CellStyle {
    pub const PLAIN: CellStyle = CellStyle {
        bold: false,
        dim: false,
        reverse: false,
        underline: false,
    };

    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::PLAIN
        }
    }

    pub fn dim() -> Self {
        Self {
            dim: true,
            ..Self::PLAIN
        }
    }

    pub fn reverse() -> Self {
        Self {
            reverse: true,
            ..Self::PLAIN
        }
    }

    pub fn underline() -> Self {
        Self {
            underline: true,
            ..Self::PLAIN
        }
    }
}

/// One character with its style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: CellStyle,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        style: CellStyle::PLAIN,
    };
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

/// A cell that changed between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellUpdate {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

/// Fixed-size cell buffer, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize)
    }

    /// Write one character; out-of-bounds writes are dropped.
    pub fn put(&mut self, x: i32, y: i32, ch: char, style: CellStyle) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.cells[index] = Cell { ch, style };
    }

    /// Write `text` from (x, y), clipped to `max_width` cells and the canvas.
    /// Returns the number of cells written.
    pub fn put_str(&mut self, x: i32, y: i32, text: &str, style: CellStyle, max_width: usize) -> usize {
        let mut written = 0;
        for ch in text.chars().take(max_width) {
            self.put(x + written as i32, y, ch, style);
            written += 1;
        }
        written
    }

    /// Apply `style` to `width` existing cells from (x, y).
    pub fn restyle(&mut self, x: i32, y: i32, width: usize, style: CellStyle) {
        for dx in 0..width as i32 {
            let (cx, cy) = (x + dx, y);
            if cx < 0 || cy < 0 || cx >= self.width as i32 || cy >= self.height as i32 {
                continue;
            }
            let index = cy as usize * self.width as usize + cx as usize;
            self.cells[index].style = style;
        }
    }

    /// Cells that differ from `previous`. A size change repaints everything.
    pub fn diff(&self, previous: &Canvas) -> Vec<CellUpdate> {
        let resized = self.width != previous.width || self.height != previous.height;
        let mut updates = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let index = y as usize * self.width as usize + x as usize;
                let cell = self.cells[index];
                if resized || previous.cells[index] != cell {
                    updates.push(CellUpdate { x, y, cell });
                }
            }
        }
        updates
    }

    /// Plain text of the canvas: trailing spaces and trailing blank rows
    /// removed.
    pub fn to_text(&self) -> String {
        let mut rows: Vec<String> = (0..self.height as usize)
            .map(|y| {
                let start = y * self.width as usize;
                let row: String = self.cells[start..start + self.width as usize]
                    .iter()
                    .map(|c| c.ch)
                    .collect();
                row.trim_end().to_owned()
            })
            .collect();
        while rows.last().is_some_and(String::is_empty) {
            rows.pop();
        }
        rows.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_is_blank() {
        let canvas = Canvas::new(4, 2);
        assert_eq!(canvas.get(3, 1), Some(&Cell::BLANK));
        assert_eq!(canvas.get(4, 0), None);
        assert_eq!(canvas.to_text(), "");
    }

    #[test]
    fn put_str_clips() {
        let mut canvas = Canvas::new(5, 1);
        assert_eq!(canvas.put_str(2, 0, "hello", CellStyle::PLAIN, 10), 5);
        assert_eq!(canvas.to_text(), "  hel");
        assert_eq!(canvas.put_str(0, 0, "xyz", CellStyle::PLAIN, 1), 1);
        assert_eq!(canvas.to_text(), "x hel");
    }

    #[test]
    fn diff_reports_changed_cells_only() {
        let before = Canvas::new(3, 2);
        let mut after = before.clone();
        after.put(1, 1, 'x', CellStyle::bold());
        let updates = after.diff(&before);
        assert_eq!(
            updates,
            vec![CellUpdate {
                x: 1,
                y: 1,
                cell: Cell {
                    ch: 'x',
                    style: CellStyle::bold()
                }
            }]
        );
    }

    #[test]
    fn diff_after_resize_repaints_all() {
        let before = Canvas::new(2, 1);
        let after = Canvas::new(2, 2);
        assert_eq!(after.diff(&before).len(), 4);
    }

    #[test]
    fn restyle_keeps_characters() {
        let mut canvas = Canvas::new(3, 1);
        canvas.put_str(0, 0, "abc", CellStyle::PLAIN, 3);
        canvas.restyle(0, 0, 2, CellStyle::reverse());
        assert_eq!(canvas.get(0, 0).map(|c| (c.ch, c.style.reverse)), Some(('a', true)));
        assert_eq!(canvas.get(2, 0).map(|c| c.style.reverse), Some(false));
    }
}
