//! Stage Snake - a multi-stage terminal snake game
//!
//! The simulation core (grid, snake, hazards, stages) has no terminal
//! dependency; `term` is the crossterm-backed display and input.

pub mod config;
pub mod display;
pub mod error;
pub mod game;
pub mod grid;
pub mod hazards;
pub mod sim;
pub mod snake;
pub mod stage;
pub mod term;
pub mod tile;

pub type BoardInt = i16;

/// A play-area coordinate as (row, col).
pub type Coords = (BoardInt, BoardInt);
