//! Command creators, each turns one set of arguments into commands and python, or errors.
//!
//! Atomic creators map to one robot operation, compound creators fold atomic (and other compound) creators with
//! [`crate::command_creator::reduce_command_creators`].

pub mod atomic;
pub mod compound;
