//! This is a plugin for Bevy game engine to find paths for agents across a grid, spreading the cost of A* searches over many frames
//!

pub mod bundle;
pub mod navigation;
pub mod plugin;

pub mod prelude;
