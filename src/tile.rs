/// Orientation of a wall piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallKind {
    Horizontal,
    Vertical,
    Corner,
}

/// What occupies a single play-area tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Empty,
    SnakeBody,
    Growth,
    Poison,
    Gate,
    Wall(WallKind),
}

impl TileKind {
    pub fn glyph(self) -> char {
        match self {
            TileKind::Empty => ' ',
            TileKind::SnakeBody => '#',
            TileKind::Growth => 'O',
            TileKind::Poison => 'X',
            TileKind::Gate => '?',
            TileKind::Wall(WallKind::Horizontal) => '-',
            TileKind::Wall(WallKind::Vertical) => '|',
            TileKind::Wall(WallKind::Corner) => '+',
        }
    }

    /// Horizontal or vertical wall. Gates may be anchored on these, never on corners.
    pub fn is_straight_wall(self) -> bool {
        matches!(
            self,
            TileKind::Wall(WallKind::Horizontal) | TileKind::Wall(WallKind::Vertical)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyphs_are_distinct() {
        let kinds = [
            TileKind::Empty,
            TileKind::SnakeBody,
            TileKind::Growth,
            TileKind::Poison,
            TileKind::Gate,
            TileKind::Wall(WallKind::Horizontal),
            TileKind::Wall(WallKind::Vertical),
            TileKind::Wall(WallKind::Corner),
        ];

        let mut glyphs: Vec<char> = kinds.iter().map(|k| k.glyph()).collect();
        glyphs.sort_unstable();
        glyphs.dedup();
        assert_eq!(glyphs.len(), kinds.len());
    }

    #[test]
    fn test_straight_walls() {
        assert!(TileKind::Wall(WallKind::Horizontal).is_straight_wall());
        assert!(TileKind::Wall(WallKind::Vertical).is_straight_wall());
        assert!(!TileKind::Wall(WallKind::Corner).is_straight_wall());
        assert!(!TileKind::Empty.is_straight_wall());
    }
}
