//! Grid navigation for agents moving over a landscape littered with
//! buildings and other agents.
//!
//! [Amit's A* Pages](https://theory.stanford.edu/~amitp/GameProgramming/)
//!
//! The landscape is covered by a uniform grid, the [nav_grid::NavGrid],
//! where every cell counts how many obstructions overlap it. Agents are
//! represented by a footprint of cells, a [brush::PathBrush], which must fit
//! between obstructions as it moves.
//!
//! Definitions:
//!
//! * Cell - a square of the grid identified by its `(column, row)`, cell `(0, 0)` sits on the world origin
//! * Static obstruction - terrain or a building blocking a cell
//! * Dynamic obstruction - the footprint of a moving agent blocking a cell
//! * Brush - the footprint of an agent, its anchor is the cell of its smallest column and row
//! * Boundary - a window of cells outside of which everything is treated as obstructed, it caps how far a search may wander
//! * Step - the expansion of a single node by the A* search, searches are paid for in steps
//!
//! ```text
//!  _____ _____ _____ _____ _____
//! |     |  #  |     |     |     |
//! |_____|__#__|_____|_____|_____|
//! |  a  |  a  |     |  s  |  s  |
//! |_____|_____|_____|__s__|__s__|
//! |  a  |  a  |     |     |     |
//! |_____|_____|_____|_____|_____|
//!
//! # - terrain, s - static building, a - an agent with a 2x2 brush
//! ```
//!
//! Searches are scheduled by the [path_manager::PathManager]. Each update it
//! spends a fixed number of steps on the most urgent requests so that a crowd
//! asking for paths at once never stalls a frame. Found paths are simplified
//! and smoothed by [path::GraphPath] before being handed back.
//!

pub mod astar;
pub mod brush;
pub mod config;
pub mod landscape;
pub mod nav_grid;
pub mod path;
pub mod path_manager;
pub mod placement;
pub mod priority_queue;
pub mod utilities;
