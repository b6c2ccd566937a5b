//! Core data structures for the embryoid simulation.

pub mod agent;
pub mod vector;
