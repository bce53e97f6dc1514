use crate::error::{GameError, Result};
use crate::tile::TileKind;
use crate::{BoardInt, Coords};

/// Logical tile grid for one stage. This is the source of truth for what
/// occupies every coordinate; the display only mirrors it.
///
/// Every write that changes a tile is remembered until `take_dirty` is
/// called, so the display can be updated with just the tiles that changed.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: BoardInt,
    cols: BoardInt,
    tiles: Vec<TileKind>,
    dirty: Vec<Coords>,
}

impl Grid {
    pub fn new(rows: BoardInt, cols: BoardInt) -> Self {
        let len = rows.max(0) as usize * cols.max(0) as usize;
        Grid { rows, cols, tiles: vec![TileKind::Empty; len], dirty: vec![] }
    }

    /// (rows, cols) of the play area, border included.
    pub fn size(&self) -> (BoardInt, BoardInt) {
        (self.rows, self.cols)
    }

    pub fn contains(&self, pos: Coords) -> bool {
        pos.0 >= 0 && pos.0 < self.rows && pos.1 >= 0 && pos.1 < self.cols
    }

    pub fn is_boundary(&self, pos: Coords) -> bool {
        self.contains(pos)
            && (pos.0 == 0 || pos.1 == 0 || pos.0 == self.rows - 1 || pos.1 == self.cols - 1)
    }

    /// Tile at `pos`, or `None` outside the play area.
    pub fn tile(&self, pos: Coords) -> Option<TileKind> {
        self.index(pos).map(|i| self.tiles[i])
    }

    pub fn set(&mut self, pos: Coords, kind: TileKind) -> Result<()> {
        let i = self.index(pos).ok_or(GameError::OutOfBounds(pos))?;

        if self.tiles[i] != kind {
            self.tiles[i] = kind;
            self.dirty.push(pos);
        }

        Ok(())
    }

    /// Coordinates changed since the last call, oldest first. A coordinate
    /// written several times may appear more than once.
    pub fn take_dirty(&mut self) -> Vec<Coords> {
        std::mem::take(&mut self.dirty)
    }

    pub fn coords(&self) -> impl Iterator<Item = Coords> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|t| **t == kind).count()
    }

    fn index(&self, pos: Coords) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.0 as usize * self.cols as usize + pos.1 as usize)
        } else {
            None
        }
    }
}
