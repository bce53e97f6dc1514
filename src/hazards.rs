//! Growth and poison items, the gate pair, and random tile placement.

use rand::Rng;
use tracing::{debug, warn};

use crate::error::{GameError, Result};
use crate::grid::Grid;
use crate::stage::Layout;
use crate::tile::TileKind;
use crate::Coords;

/// Ticks an item stays put before it relocates.
pub const ITEM_LIFETIME: u32 = 10;

/// Samples uniformly random coordinates until one shows an Empty tile.
pub fn place_at_random_empty<R: Rng + ?Sized>(
    grid: &Grid,
    rng: &mut R,
    max_attempts: u32,
) -> Result<Coords> {
    sample_tile(grid, rng, max_attempts, |tile| tile == TileKind::Empty)
}

/// Like `place_at_random_empty`, but straight wall pieces are also accepted,
/// so a gate can sit on the border or on a partition.
pub fn place_at_random_empty_or_boundary<R: Rng + ?Sized>(
    grid: &Grid,
    rng: &mut R,
    max_attempts: u32,
) -> Result<Coords> {
    sample_tile(grid, rng, max_attempts, |tile| {
        tile == TileKind::Empty || tile.is_straight_wall()
    })
}

fn sample_tile<R, F>(grid: &Grid, rng: &mut R, max_attempts: u32, accept: F) -> Result<Coords>
where
    R: Rng + ?Sized,
    F: Fn(TileKind) -> bool,
{
    let (rows, cols) = grid.size();

    if rows > 0 && cols > 0 {
        for _ in 0..max_attempts {
            let pos = (rng.gen_range(0..rows), rng.gen_range(0..cols));
            if grid.tile(pos).map_or(false, &accept) {
                return Ok(pos);
            }
        }
    }

    Err(GameError::SamplingExhausted { attempts: max_attempts })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    Growth,
    Poison,
}

impl HazardKind {
    pub fn from_tile(tile: TileKind) -> Option<Self> {
        match tile {
            TileKind::Growth => Some(HazardKind::Growth),
            TileKind::Poison => Some(HazardKind::Poison),
            _ => None,
        }
    }

    pub fn tile(self) -> TileKind {
        match self {
            HazardKind::Growth => TileKind::Growth,
            HazardKind::Poison => TileKind::Poison,
        }
    }
}

/// A placed growth or poison item and the ticks since it was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub pos: Coords,
    pub age: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatePair {
    pub first: Coords,
    pub second: Coords,
}

impl GatePair {
    /// The gate the snake comes out of when it enters `entry`.
    pub fn exit_for(&self, entry: Coords) -> Coords {
        if entry == self.first {
            self.second
        } else {
            self.first
        }
    }
}

/// Owns every transient object on the board and keeps the grid in sync
/// with it. The item collections stay at their fixed sizes; an item that
/// could not be placed waits in `pending` and is retried on later ticks.
#[derive(Debug, Clone)]
pub struct HazardRegistry {
    growth: Vec<Item>,
    poison: Vec<Item>,
    pending: Vec<HazardKind>,
    gates: Option<GatePair>,
    // Snake segments still to come out of the gates, while a traversal is in flight.
    traversal: Option<usize>,
    max_attempts: u32,
}

impl HazardRegistry {
    pub fn new(max_attempts: u32) -> Self {
        HazardRegistry {
            growth: vec![],
            poison: vec![],
            pending: vec![],
            gates: None,
            traversal: None,
            max_attempts,
        }
    }

    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        grid: &mut Grid,
        rng: &mut R,
        growth: usize,
        poison: usize,
    ) -> Result<()> {
        self.pending.extend(std::iter::repeat(HazardKind::Growth).take(growth));
        self.pending.extend(std::iter::repeat(HazardKind::Poison).take(poison));
        self.refill(grid, rng)
    }

    pub fn growth(&self) -> &[Item] {
        &self.growth
    }

    pub fn poison(&self) -> &[Item] {
        &self.poison
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn gates(&self) -> Option<GatePair> {
        self.gates
    }

    /// Remaining segments inside the gates, if a traversal is in flight.
    pub fn traversal(&self) -> Option<usize> {
        self.traversal
    }

    pub fn inside_gates(&self) -> bool {
        self.traversal.is_some()
    }

    /// Removes the item at `pos` and places a replacement elsewhere.
    ///
    /// The consumed tile is left as is for the caller to overwrite with the
    /// snake head, which keeps the replacement from landing on it.
    pub fn consume<R: Rng + ?Sized>(
        &mut self,
        kind: HazardKind,
        pos: Coords,
        grid: &mut Grid,
        rng: &mut R,
    ) -> Result<()> {
        self.items_mut(kind).retain(|item| item.pos != pos);
        self.spawn_or_defer(kind, grid, rng)
    }

    /// Advances every item's age, relocates the expired ones, and retries
    /// deferred placements.
    pub fn age<R: Rng + ?Sized>(&mut self, grid: &mut Grid, rng: &mut R) -> Result<()> {
        for kind in [HazardKind::Growth, HazardKind::Poison] {
            for i in 0..self.items_mut(kind).len() {
                let item = &mut self.items_mut(kind)[i];
                item.age += 1;
                if item.age < ITEM_LIFETIME {
                    continue;
                }

                let old = item.pos;
                item.age = 0;

                match place_at_random_empty(grid, rng, self.max_attempts) {
                    Ok(new) => {
                        grid.set(old, TileKind::Empty)?;
                        grid.set(new, kind.tile())?;
                        self.items_mut(kind)[i].pos = new;
                    }
                    Err(GameError::SamplingExhausted { attempts }) => {
                        warn!(?kind, attempts, "no room to relocate item, leaving it in place");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.refill(grid, rng)
    }

    /// Places a new gate pair. Fails with `SamplingExhausted` (and leaves
    /// the grid untouched) when either gate finds no spot.
    pub fn open_gates<R: Rng + ?Sized>(&mut self, grid: &mut Grid, rng: &mut R) -> Result<GatePair> {
        let first = place_at_random_empty_or_boundary(grid, rng, self.max_attempts)?;
        let under_first = grid.tile(first).unwrap_or(TileKind::Empty);
        grid.set(first, TileKind::Gate)?;

        let second = match place_at_random_empty_or_boundary(grid, rng, self.max_attempts) {
            Ok(pos) => pos,
            Err(e) => {
                grid.set(first, under_first)?;
                return Err(e);
            }
        };
        grid.set(second, TileKind::Gate)?;

        let pair = GatePair { first, second };
        debug!(?pair, "gates opened");
        self.gates = Some(pair);
        Ok(pair)
    }

    /// Removes the gate pair. Each spot gets the layout's wall back, and a
    /// gate that sat in a partition opening walls it up.
    pub fn close_gates(&mut self, grid: &mut Grid, layout: Layout) -> Result<()> {
        self.traversal = None;

        if let Some(pair) = self.gates.take() {
            let size = grid.size();
            grid.set(pair.first, layout.restore_tile(pair.first, size))?;
            grid.set(pair.second, layout.restore_tile(pair.second, size))?;
            debug!(?pair, "gates closed");
        }

        Ok(())
    }

    pub fn begin_traversal(&mut self, segments: usize) {
        self.traversal = Some(segments);
    }

    /// Counts `segments` more pieces out of the gates, never below zero.
    pub fn advance_traversal(&mut self, segments: usize) {
        if let Some(remaining) = self.traversal.as_mut() {
            *remaining = remaining.saturating_sub(segments);
        }
    }

    pub fn traversal_done(&self) -> bool {
        self.traversal == Some(0)
    }

    fn refill<R: Rng + ?Sized>(&mut self, grid: &mut Grid, rng: &mut R) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        for kind in pending {
            self.spawn_or_defer(kind, grid, rng)?;
        }
        Ok(())
    }

    fn spawn_or_defer<R: Rng + ?Sized>(
        &mut self,
        kind: HazardKind,
        grid: &mut Grid,
        rng: &mut R,
    ) -> Result<()> {
        match place_at_random_empty(grid, rng, self.max_attempts) {
            Ok(pos) => {
                grid.set(pos, kind.tile())?;
                self.items_mut(kind).push(Item { pos, age: 0 });
                Ok(())
            }
            Err(GameError::SamplingExhausted { attempts }) => {
                warn!(?kind, attempts, "no room for item, retrying next tick");
                self.pending.push(kind);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn items_mut(&mut self, kind: HazardKind) -> &mut Vec<Item> {
        match kind {
            HazardKind::Growth => &mut self.growth,
            HazardKind::Poison => &mut self.poison,
        }
    }

    /// Puts items and gates at fixed spots, for setting up exact situations in tests.
    #[cfg(test)]
    pub(crate) fn arrange(
        &mut self,
        grid: &mut Grid,
        growth: &[Coords],
        poison: &[Coords],
        gates: Option<GatePair>,
    ) -> Result<()> {
        for pos in growth {
            grid.set(*pos, TileKind::Growth)?;
            self.growth.push(Item { pos: *pos, age: 0 });
        }
        for pos in poison {
            grid.set(*pos, TileKind::Poison)?;
            self.poison.push(Item { pos: *pos, age: 0 });
        }
        if let Some(pair) = gates {
            grid.set(pair.first, TileKind::Gate)?;
            grid.set(pair.second, TileKind::Gate)?;
            self.gates = Some(pair);
        }
        Ok(())
    }
}
