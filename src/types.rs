//! Shared types passed between the core and the packaging stage.
//!
//! [`Layout`] is produced once per sheet by the solver and then consumed by
//! every extraction call; it is also written verbatim into `manifest.json`.

use serde::{Deserialize, Serialize};

/// Inferred grid partition of a sticker sheet.
///
/// `count` is always `rows * cols`. The solver only produces layouts whose
/// rows and cols divide the sheet dimensions exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub rows: u32,
    pub cols: u32,
    pub count: u32,
}

impl Layout {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            count: rows * cols,
        }
    }

    /// Source tile size for a sheet of the given dimensions.
    ///
    /// Returns `None` when the sheet does not divide evenly by this layout.
    pub fn tile_size(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if self.cols == 0 || self.rows == 0 {
            return None;
        }
        if width % self.cols != 0 || height % self.rows != 0 {
            return None;
        }
        Some((width / self.cols, height / self.rows))
    }

    /// Every cell of the grid in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = TileCell> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| TileCell { row, col }))
    }

    /// 1-based row-major index of a cell.
    pub fn index_of(&self, cell: TileCell) -> u32 {
        cell.row * self.cols + cell.col + 1
    }
}

/// Zero-based grid position of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCell {
    pub row: u32,
    pub col: u32,
}

impl TileCell {
    /// The top-left tile, used for the main and tab icons.
    pub const ORIGIN: TileCell = TileCell { row: 0, col: 0 };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_computes_count() {
        let layout = Layout::new(4, 8);
        assert_eq!(layout.count, 32);
    }

    #[test]
    fn tile_size_divides_sheet() {
        assert_eq!(Layout::new(4, 8).tile_size(2960, 1280), Some((370, 320)));
    }

    #[test]
    fn tile_size_rejects_remainder() {
        assert_eq!(Layout::new(3, 8).tile_size(2960, 1280), None);
    }

    #[test]
    fn cells_are_row_major() {
        let cells: Vec<_> = Layout::new(2, 3).cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], TileCell { row: 0, col: 0 });
        assert_eq!(cells[2], TileCell { row: 0, col: 2 });
        assert_eq!(cells[3], TileCell { row: 1, col: 0 });
    }

    #[test]
    fn index_is_one_based_row_major() {
        let layout = Layout::new(4, 8);
        assert_eq!(layout.index_of(TileCell::ORIGIN), 1);
        assert_eq!(layout.index_of(TileCell { row: 0, col: 7 }), 8);
        assert_eq!(layout.index_of(TileCell { row: 1, col: 0 }), 9);
        assert_eq!(layout.index_of(TileCell { row: 3, col: 7 }), 32);
    }
}
