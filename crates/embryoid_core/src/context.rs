//! What an agent may ask of the driver while it updates.
//!
//! Agents never touch the live population. New agents go through
//! [`SimulationContext::enqueue_addition`] and only become visible to neighbor queries
//! once the driver flushes its queue after the sweep.

use crate::cell::CellAgent;
use embryoid_data::{AgentId, CellState};

pub trait SimulationContext {
    /// Fresh identity. Never repeats for the lifetime of the simulation.
    fn next_id(&mut self) -> AgentId;

    /// Stages a newly created agent for admission after the current sweep.
    fn enqueue_addition(&mut self, agent: CellAgent);

    /// States of the agent's network neighbors, in network order.
    fn neighbor_states(&self, id: AgentId) -> Vec<CellState>;
}
