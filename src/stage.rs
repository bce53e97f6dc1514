//! Stage layouts, missions and run-wide bookkeeping.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::Grid;
use crate::tile::{TileKind, WallKind};
use crate::{BoardInt, Coords};

pub const STAGE_COUNT: usize = 4;
pub const MISSION_MIN: u32 = 5;
pub const MISSION_MAX: u32 = 20;

/// One of the four fixed stage geometries, chosen by stage index mod 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Open,
    VerticalSplit,
    HorizontalSplit,
    Cross,
}

impl Layout {
    pub const ALL: [Layout; 4] =
        [Layout::Open, Layout::VerticalSplit, Layout::HorizontalSplit, Layout::Cross];

    pub fn for_stage(index: usize) -> Self {
        match index % 4 {
            0 => Layout::Open,
            1 => Layout::VerticalSplit,
            2 => Layout::HorizontalSplit,
            _ => Layout::Cross,
        }
    }

    /// The tile this layout puts at `pos` on a fresh board of `size`.
    ///
    /// Partitions run through the middle row/column, end in corners on the
    /// border, and leave two openings at a third of the way along.
    pub fn tile_at(self, pos: Coords, size: (BoardInt, BoardInt)) -> TileKind {
        let (rows, cols) = size;
        let (row, col) = pos;
        let (last_row, last_col) = (rows - 1, cols - 1);
        let (mid_row, mid_col) = (last_row / 2, last_col / 2);

        let on_vertical =
            matches!(self, Layout::VerticalSplit | Layout::Cross) && col == mid_col;
        let on_horizontal =
            matches!(self, Layout::HorizontalSplit | Layout::Cross) && row == mid_row;

        if on_vertical && on_horizontal {
            return TileKind::Wall(WallKind::Corner);
        }

        if on_vertical {
            return if row == 0 || row == last_row {
                TileKind::Wall(WallKind::Corner)
            } else if row == last_row / 3 || row == last_row - last_row / 3 {
                TileKind::Empty
            } else {
                TileKind::Wall(WallKind::Vertical)
            };
        }

        if on_horizontal {
            return if col == 0 || col == last_col {
                TileKind::Wall(WallKind::Corner)
            } else if col == last_col / 3 || col == last_col - last_col / 3 {
                TileKind::Empty
            } else {
                TileKind::Wall(WallKind::Horizontal)
            };
        }

        let on_row_edge = row == 0 || row == last_row;
        let on_col_edge = col == 0 || col == last_col;

        match (on_row_edge, on_col_edge) {
            (true, true) => TileKind::Wall(WallKind::Corner),
            (true, false) => TileKind::Wall(WallKind::Horizontal),
            (false, true) => TileKind::Wall(WallKind::Vertical),
            (false, false) => TileKind::Empty,
        }
    }

    /// The tile a closed gate leaves behind at `pos`.
    ///
    /// Same as `tile_at`, except that anywhere on a partition line comes back
    /// as wall, so a gate that sat in an opening closes it.
    pub fn restore_tile(self, pos: Coords, size: (BoardInt, BoardInt)) -> TileKind {
        let original = self.tile_at(pos, size);
        if original != TileKind::Empty {
            return original;
        }

        let (mid_row, mid_col) = ((size.0 - 1) / 2, (size.1 - 1) / 2);
        if matches!(self, Layout::VerticalSplit | Layout::Cross) && pos.1 == mid_col {
            TileKind::Wall(WallKind::Vertical)
        } else if matches!(self, Layout::HorizontalSplit | Layout::Cross) && pos.0 == mid_row {
            TileKind::Wall(WallKind::Horizontal)
        } else {
            TileKind::Empty
        }
    }

    /// Overwrites every tile of `grid` with this layout.
    pub fn paint(self, grid: &mut Grid) -> Result<()> {
        let size = grid.size();
        let coords: Vec<Coords> = grid.coords().collect();

        for pos in coords {
            grid.set(pos, self.tile_at(pos, size))?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionKind {
    Size,
    Growth,
    Poison,
    Gates,
}

/// A stage objective. For `Size` the count is the target length and is
/// never decremented; for the others it counts down to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub kind: MissionKind,
    pub remaining: u32,
}

impl Mission {
    pub fn new(kind: MissionKind, remaining: u32) -> Self {
        Mission { kind, remaining }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let kind = match rng.gen_range(0..4) {
            0 => MissionKind::Size,
            1 => MissionKind::Growth,
            2 => MissionKind::Poison,
            _ => MissionKind::Gates,
        };
        Mission::new(kind, rng.gen_range(MISSION_MIN..=MISSION_MAX))
    }

    /// Counts one event toward the mission if it matches.
    pub fn record(&mut self, event: MissionKind) {
        if event == self.kind && event != MissionKind::Size {
            self.remaining = self.remaining.saturating_sub(1);
        }
    }

    pub fn is_met(&self, snake_len: usize) -> bool {
        self.remaining == 0
            || (self.kind == MissionKind::Size && snake_len == self.remaining as usize)
    }

    pub fn describe(&self) -> String {
        let n = self.remaining;
        match self.kind {
            MissionKind::Size => format!("Size of snake must reach {}!", n),
            MissionKind::Growth => format!("Collect {} growth items!", n),
            MissionKind::Poison => format!("Collect {} poison items!", n),
            MissionKind::Gates => format!("Pass through {} gates!", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageStatus {
    NotStarted,
    Running,
    Completed,
    Failed,
}

/// Everything that outlives a single stage: score, missions and outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub score: i32,
    pub current: usize,
    missions: Vec<Mission>,
    statuses: Vec<StageStatus>,
}

impl RunState {
    pub fn new(missions: Vec<Mission>) -> Self {
        let statuses = vec![StageStatus::NotStarted; missions.len()];
        RunState { score: 0, current: 0, missions, statuses }
    }

    /// Missions are drawn once, up front, for every stage.
    pub fn random<R: Rng + ?Sized>(stage_count: usize, rng: &mut R) -> Self {
        let missions = (0..stage_count).map(|_| Mission::random(rng)).collect();
        RunState::new(missions)
    }

    pub fn stage_count(&self) -> usize {
        self.missions.len()
    }

    pub fn mission(&self) -> &Mission {
        &self.missions[self.current]
    }

    pub fn mission_mut(&mut self) -> &mut Mission {
        &mut self.missions[self.current]
    }

    pub fn status(&self) -> StageStatus {
        self.statuses[self.current]
    }

    pub fn set_status(&mut self, status: StageStatus) {
        self.statuses[self.current] = status;
    }

    pub fn statuses(&self) -> &[StageStatus] {
        &self.statuses
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            score: self.score,
            completed: self.statuses.iter().map(|s| *s == StageStatus::Completed).collect(),
        }
    }
}

/// Final results shown when the run ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub score: i32,
    pub completed: Vec<bool>,
}

impl RunSummary {
    pub fn won(&self) -> bool {
        !self.completed.is_empty() && self.completed.iter().all(|c| *c)
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            if self.won() { "You won!" } else { "Game Over!" }.to_string(),
            format!("You scored {} points!", self.score),
            String::new(),
        ];

        for (i, done) in self.completed.iter().enumerate() {
            let verdict = if *done { "completed" } else { "not completed" };
            lines.push(format!("Stage {}: {}", i + 1, verdict));
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const SIZE: (BoardInt, BoardInt) = (19, 45);

    #[test]
    fn test_layout_by_index() {
        assert_eq!(Layout::for_stage(0), Layout::Open);
        assert_eq!(Layout::for_stage(1), Layout::VerticalSplit);
        assert_eq!(Layout::for_stage(2), Layout::HorizontalSplit);
        assert_eq!(Layout::for_stage(3), Layout::Cross);
        assert_eq!(Layout::for_stage(5), Layout::VerticalSplit);
    }

    #[test]
    fn test_open_layout_border() {
        let layout = Layout::Open;
        assert_eq!(layout.tile_at((0, 0), SIZE), TileKind::Wall(WallKind::Corner));
        assert_eq!(layout.tile_at((18, 44), SIZE), TileKind::Wall(WallKind::Corner));
        assert_eq!(layout.tile_at((0, 10), SIZE), TileKind::Wall(WallKind::Horizontal));
        assert_eq!(layout.tile_at((18, 10), SIZE), TileKind::Wall(WallKind::Horizontal));
        assert_eq!(layout.tile_at((5, 0), SIZE), TileKind::Wall(WallKind::Vertical));
        assert_eq!(layout.tile_at((5, 44), SIZE), TileKind::Wall(WallKind::Vertical));
        assert_eq!(layout.tile_at((9, 22), SIZE), TileKind::Empty);
    }

    #[test]
    fn test_vertical_split_has_openings() {
        let layout = Layout::VerticalSplit;
        // mid column 22, openings at rows 6 and 12
        assert_eq!(layout.tile_at((0, 22), SIZE), TileKind::Wall(WallKind::Corner));
        assert_eq!(layout.tile_at((18, 22), SIZE), TileKind::Wall(WallKind::Corner));
        assert_eq!(layout.tile_at((3, 22), SIZE), TileKind::Wall(WallKind::Vertical));
        assert_eq!(layout.tile_at((6, 22), SIZE), TileKind::Empty);
        assert_eq!(layout.tile_at((12, 22), SIZE), TileKind::Empty);
        assert_eq!(layout.tile_at((9, 21), SIZE), TileKind::Empty);
    }

    #[test]
    fn test_horizontal_split_has_openings() {
        let layout = Layout::HorizontalSplit;
        // mid row 9, openings at columns 14 and 30
        assert_eq!(layout.tile_at((9, 0), SIZE), TileKind::Wall(WallKind::Corner));
        assert_eq!(layout.tile_at((9, 44), SIZE), TileKind::Wall(WallKind::Corner));
        assert_eq!(layout.tile_at((9, 5), SIZE), TileKind::Wall(WallKind::Horizontal));
        assert_eq!(layout.tile_at((9, 14), SIZE), TileKind::Empty);
        assert_eq!(layout.tile_at((9, 30), SIZE), TileKind::Empty);
    }

    #[test]
    fn test_cross_meets_in_corner() {
        let layout = Layout::Cross;
        assert_eq!(layout.tile_at((9, 22), SIZE), TileKind::Wall(WallKind::Corner));
        assert_eq!(layout.tile_at((3, 22), SIZE), TileKind::Wall(WallKind::Vertical));
        assert_eq!(layout.tile_at((9, 5), SIZE), TileKind::Wall(WallKind::Horizontal));
        assert_eq!(layout.tile_at((6, 22), SIZE), TileKind::Empty);
        assert_eq!(layout.tile_at((9, 30), SIZE), TileKind::Empty);
    }

    #[test]
    fn test_restore_closes_openings() {
        assert_eq!(
            Layout::VerticalSplit.restore_tile((6, 22), SIZE),
            TileKind::Wall(WallKind::Vertical)
        );
        assert_eq!(
            Layout::HorizontalSplit.restore_tile((9, 30), SIZE),
            TileKind::Wall(WallKind::Horizontal)
        );
        assert_eq!(Layout::Cross.restore_tile((12, 22), SIZE), TileKind::Wall(WallKind::Vertical));
        assert_eq!(Layout::Cross.restore_tile((9, 14), SIZE), TileKind::Wall(WallKind::Horizontal));

        // Off the partitions nothing changes
        assert_eq!(Layout::Open.restore_tile((6, 22), SIZE), TileKind::Empty);
        assert_eq!(Layout::VerticalSplit.restore_tile((9, 14), SIZE), TileKind::Empty);
        assert_eq!(
            Layout::VerticalSplit.restore_tile((0, 10), SIZE),
            TileKind::Wall(WallKind::Horizontal)
        );
    }

    #[test]
    fn test_paint_matches_tile_at() {
        let mut grid = Grid::new(SIZE.0, SIZE.1);
        Layout::Cross.paint(&mut grid).unwrap();

        for pos in grid.coords() {
            assert_eq!(grid.tile(pos), Some(Layout::Cross.tile_at(pos, SIZE)));
        }
    }

    #[test]
    fn test_random_missions_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(12345);
        for _ in 0..200 {
            let mission = Mission::random(&mut rng);
            assert!((MISSION_MIN..=MISSION_MAX).contains(&mission.remaining));
        }
    }

    #[test]
    fn test_record_only_matching_kind() {
        let mut mission = Mission::new(MissionKind::Growth, 2);
        mission.record(MissionKind::Poison);
        assert_eq!(mission.remaining, 2);
        mission.record(MissionKind::Growth);
        assert_eq!(mission.remaining, 1);
        mission.record(MissionKind::Growth);
        mission.record(MissionKind::Growth);
        assert_eq!(mission.remaining, 0);
        assert!(mission.is_met(3));
    }

    #[test]
    fn test_size_mission_uses_length() {
        let mut mission = Mission::new(MissionKind::Size, 7);
        mission.record(MissionKind::Size);
        assert_eq!(mission.remaining, 7);
        assert!(!mission.is_met(6));
        assert!(mission.is_met(7));
        assert!(!mission.is_met(8));
    }

    #[test]
    fn test_run_state_tracks_current_stage() {
        let mut run = RunState::new(vec![
            Mission::new(MissionKind::Gates, 5),
            Mission::new(MissionKind::Poison, 6),
        ]);
        assert_eq!(run.status(), StageStatus::NotStarted);

        run.set_status(StageStatus::Completed);
        run.current = 1;
        assert_eq!(run.mission().kind, MissionKind::Poison);
        run.set_status(StageStatus::Failed);

        assert_eq!(run.statuses(), &[StageStatus::Completed, StageStatus::Failed]);
        assert_eq!(run.summary().completed, vec![true, false]);
    }

    #[test]
    fn test_summary_lines() {
        let summary = RunSummary { score: 35, completed: vec![true, true] };
        let lines = summary.lines();
        assert_eq!(lines[0], "You won!");
        assert_eq!(lines[1], "You scored 35 points!");
        assert_eq!(lines[3], "Stage 1: completed");

        let summary = RunSummary { score: -5, completed: vec![true, false] };
        assert_eq!(summary.lines()[0], "Game Over!");
        assert_eq!(summary.lines()[4], "Stage 2: not completed");
    }
}
