//! `use bevy_pathgrid_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::navigation::{
	astar::*, brush::*, config::*, landscape::*, nav_grid::*, path::*, path_manager::*,
	placement::*, priority_queue::*, utilities::*,
};

#[doc(hidden)]
pub use crate::{
	bundle::*,
	plugin::{obstacle_layer::*, path_layer::*, *},
};
