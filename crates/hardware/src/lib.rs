//! Static descriptions of the physical things a protocol uses.
//!
//! Nothing in here changes while a protocol is compiled, see the `step_generation` crate for the
//! simulated robot state.

pub mod deck;
pub mod labware;
pub mod module;
pub mod pipette;

#[cfg(any(test, feature = "testing"))]
pub mod test;
