//! sandgrid application: platform directories, the fixed-rate tick clock,
//! and a headless sandbox scene that drives the world and collision crates.

pub mod demo;
pub mod platform;
pub mod sandbox;
pub mod tick;
