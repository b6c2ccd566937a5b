//! # Embryoid Core
//!
//! The simulation engine for embryoid-body differentiation: an aggregate of stem
//! cells that divide, push on each other, and commit to a differentiated fate under
//! neighbor feedback.
//!
//! This crate contains:
//! - Spatial agents with a clamped per-step displacement
//! - Dividing and stem cell variants
//! - The stochastic Hill-function differentiation rule
//! - The neighbor network and the step driver with its addition queue
//! - Gradient grids, contact mechanics and aggregate seeding
//! - Metrics collection and structured logging
//!
//! ## Example
//!
//! ```
//! use embryoid_core::config::SimConfig;
//! use embryoid_core::simulation::Simulation;
//!
//! let mut config = SimConfig::default();
//! config.simulation.seed = Some(7);
//! config.simulation.end_time = 3.0;
//! config.aggregate.cell_count = 20;
//!
//! let mut sim = Simulation::seeded("demo", config).unwrap();
//! let summary = sim.run().unwrap();
//! assert_eq!(summary.steps.len(), 3);
//! ```

/// Cell agents and their update rules
pub mod cell;
/// Configuration management for simulation parameters
pub mod config;
/// Interface agents use to reach the driver
pub mod context;
/// Hill-function fate decision
pub mod differentiation;
/// Error types
pub mod error;
/// Random points on and in spheres
pub mod geometry;
/// Diffusible-species grids
pub mod gradient;
/// Step records and run summaries
pub mod history;
/// Spring contacts and domain confinement
pub mod mechanics;
/// Performance metrics collection and logging
pub mod metrics;
/// Contact graph between agents
pub mod network;
/// Step driver
pub mod simulation;
/// Positioned agent with displacement accumulators
pub mod spatial;
/// Initial aggregate construction
pub mod structure;

pub use cell::{CellAgent, CellKind};
pub use config::SimConfig;
pub use context::SimulationContext;
pub use differentiation::DifferentiationParams;
pub use error::{Result, SimError};
pub use metrics::{init_logging, init_logging_to, Metrics};
pub use simulation::Simulation;
pub use spatial::SpatialAgent;
