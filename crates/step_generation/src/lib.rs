//! Compiles high-level liquid-handling steps into robot commands and matching Python protocol source.

pub mod command;
pub mod command_creator;
pub mod command_creators;
pub mod command_key;
pub mod errors;
pub mod invariant_context;
pub mod next_robot_state;
pub mod python;
pub mod robot_state;
pub mod robot_state_selectors;
pub mod step_args;
pub mod timeline;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod fixtures;
