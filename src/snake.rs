use std::collections::VecDeque;

use crate::error::{GameError, Result};
use crate::{BoardInt, Coords};
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// (row, col) offset of one step.
    pub fn delta(self) -> (BoardInt, BoardInt) {
        match self {
            Up => (-1, 0),
            Down => (1, 0),
            Left => (0, -1),
            Right => (0, 1),
        }
    }

    pub fn step(self, pos: Coords) -> Coords {
        let (dr, dc) = self.delta();
        (pos.0 + dr, pos.1 + dc)
    }

    /// Next direction in the gate exit search: right, down, left, up, right...
    pub fn clockwise(self) -> Self {
        match self {
            Right => Down,
            Down => Left,
            Left => Up,
            Up => Right,
        }
    }
}

/// The snake body, stored tail first so the head is always the back.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    body: VecDeque<Coords>,
    heading: Direction,
}

impl Snake {
    /// A straight snake of `size` pieces ending at `head`, pointing along `heading`.
    pub fn new(head: Coords, size: usize, heading: Direction) -> Self {
        let (dr, dc) = heading.delta();

        let body = (0..size as BoardInt)
            .rev()
            .map(|i| (head.0 - dr * i, head.1 - dc * i))
            .collect();
        Snake { body, heading }
    }

    pub fn body(&self) -> impl Iterator<Item = &Coords> {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn head(&self) -> Option<Coords> {
        self.body.back().copied()
    }

    pub fn tail(&self) -> Option<Coords> {
        self.body.front().copied()
    }

    pub fn contains(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    /// Where the head would be after one step along the current heading.
    pub fn next_head(&self) -> Option<Coords> {
        self.head().map(|head| self.heading.step(head))
    }

    pub fn add_piece(&mut self, pos: Coords) {
        self.body.push_back(pos);
    }

    /// Drops the tail and returns where it was.
    pub fn remove_piece(&mut self) -> Result<Coords> {
        self.body.pop_front().ok_or(GameError::EmptySnake)
    }

    /// Reversing into the body is allowed; the next tick treats it as a crash.
    pub fn set_heading(&mut self, heading: Direction) {
        self.heading = heading;
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }
}
