//! The simulation driver.
//!
//! Owns the population, the neighbor network, identity allocation and the addition
//! queue. A step runs in phases so that nothing mutates the population while it is
//! being iterated:
//!
//! 1. sample every gradient at every agent;
//! 2. accumulate contact and confinement vectors, then integrate them;
//! 3. snapshot agent states and sweep `update` over the population, which reads
//!    neighbor states from the snapshot and stages newborns in the queue;
//! 4. admit the queued agents and wire them into the network.

use crate::cell::CellAgent;
use crate::config::SimConfig;
use crate::context::SimulationContext;
use crate::error::{Result, SimError};
use crate::gradient::GradientField;
use crate::history::{RunSummary, StepRecord, StopReason};
use crate::mechanics;
use crate::metrics::Metrics;
use crate::network::NeighborNetwork;
use crate::structure;
use chrono::Utc;
use embryoid_data::{AgentId, CellState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// View of the driver handed to agents during the sweep.
struct StepContext<'a> {
    network: &'a NeighborNetwork,
    states: &'a HashMap<AgentId, CellState>,
    next_id: &'a mut u64,
    pending: &'a mut Vec<CellAgent>,
}

impl SimulationContext for StepContext<'_> {
    fn next_id(&mut self) -> AgentId {
        let id = AgentId(*self.next_id);
        *self.next_id += 1;
        id
    }

    fn enqueue_addition(&mut self, agent: CellAgent) {
        self.pending.push(agent);
    }

    fn neighbor_states(&self, id: AgentId) -> Vec<CellState> {
        self.network
            .neighbors(id)
            .into_iter()
            .filter_map(|n| self.states.get(&n).copied())
            .collect()
    }
}

pub struct Simulation {
    pub config: SimConfig,
    pub sim_id: String,
    pub time: f64,
    pub step: u64,
    pub network: NeighborNetwork,
    pub metrics: Metrics,
    agents: Vec<CellAgent>,
    index: HashMap<AgentId, usize>,
    gradients: Vec<GradientField>,
    next_id: u64,
    pending: Vec<CellAgent>,
    rng: ChaCha8Rng,
    history: Vec<StepRecord>,
}

impl Simulation {
    /// Empty simulation with the configured gradients and no agents.
    pub fn new(sim_id: &str, config: SimConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| SimError::config(e.to_string()))?;
        let seed = config.simulation.seed.unwrap_or_else(rand::random);
        let gradients = config
            .gradients
            .iter()
            .map(GradientField::from_config)
            .collect();
        Ok(Self {
            sim_id: sim_id.to_string(),
            time: config.simulation.start_time,
            step: 0,
            network: NeighborNetwork::new(),
            metrics: Metrics::new(),
            agents: Vec::new(),
            index: HashMap::new(),
            gradients,
            next_id: 0,
            pending: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            history: Vec::new(),
            config,
        })
    }

    /// Simulation populated with a freshly built aggregate.
    pub fn seeded(sim_id: &str, config: SimConfig) -> Result<Self> {
        let mut sim = Self::new(sim_id, config)?;
        let params = Arc::new(sim.config.differentiation);
        let aggregate = structure::seed_aggregate(
            &sim.config.aggregate,
            params,
            sim.next_id,
            &mut sim.rng,
        );
        for cell in aggregate.cells {
            sim.add(cell)?;
        }
        for (a, b) in aggregate.edges {
            sim.connect(a, b)?;
        }
        info!(
            sim_id = %sim.sim_id,
            cells = sim.population(),
            edges = sim.network.edge_count(),
            "Aggregate seeded"
        );
        Ok(sim)
    }

    /// Admits an agent to the live population.
    ///
    /// Configured gradient rates are applied to the agent. Identities must be unique.
    pub fn add(&mut self, mut agent: CellAgent) -> Result<()> {
        let id = agent.id();
        if self.index.contains_key(&id) {
            return Err(SimError::DuplicateAgent(id));
        }
        for g in &self.config.gradients {
            agent
                .body
                .set_gradient_source_sink_coeff(&g.name, g.source, g.sink);
        }
        self.next_id = self.next_id.max(id.0 + 1);
        self.network.add_node(id);
        self.index.insert(id, self.agents.len());
        self.agents.push(agent);
        Ok(())
    }

    pub fn add_gradient(&mut self, field: GradientField) {
        self.gradients.push(field);
    }

    pub fn connect(&mut self, a: AgentId, b: AgentId) -> Result<()> {
        self.network.add_edge(a, b)
    }

    /// Fresh identity, shared with the allocator agents use during a step.
    pub fn allocate_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Stages an agent for admission at the end of the next step.
    pub fn add_to_addition_queue(&mut self, agent: CellAgent) {
        self.pending.push(agent);
    }

    #[must_use]
    pub fn agents(&self) -> &[CellAgent] {
        &self.agents
    }

    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&CellAgent> {
        self.index.get(&id).map(|&i| &self.agents[i])
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut CellAgent> {
        self.index.get(&id).map(|&i| &mut self.agents[i])
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn gradients(&self) -> &[GradientField] {
        &self.gradients
    }

    pub fn gradient_mut(&mut self, name: &str) -> Option<&mut GradientField> {
        self.gradients.iter_mut().find(|g| g.name == name)
    }

    #[must_use]
    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Advances the whole population by one `dt`.
    pub fn step(&mut self) -> Result<StepRecord> {
        let started = Instant::now();
        let dt = self.config.simulation.dt;

        self.sample_gradients();

        mechanics::resolve_contacts(&self.network, &mut self.agents, &self.index);
        mechanics::confine(&mut self.agents, self.config.simulation.domain_half_width);
        for agent in &mut self.agents {
            agent.update_constraints(dt);
        }

        let states: HashMap<AgentId, CellState> =
            self.agents.iter().map(|a| (a.id(), a.state)).collect();
        let mut converged = 0u64;
        {
            let mut ctx = StepContext {
                network: &self.network,
                states: &states,
                next_id: &mut self.next_id,
                pending: &mut self.pending,
            };
            for agent in &mut self.agents {
                converged += u64::from(agent.update(&mut ctx, &mut self.rng, dt)?);
            }
        }

        let births = self.flush_additions()?;

        self.step += 1;
        self.time += dt;
        let mut record = StepRecord {
            step: self.step,
            time: self.time,
            births,
            converged,
            ..Default::default()
        };
        record.tally(self.agents.iter().map(|a| a.state));
        self.metrics.record_step(started.elapsed(), &record);
        self.history.push(record.clone());
        Ok(record)
    }

    /// Steps until the end time, or until the differentiated fraction reaches the
    /// configured convergence threshold.
    pub fn run(&mut self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let steps = self.config.step_count();
        info!(
            sim_id = %self.sim_id,
            population = self.population(),
            steps,
            params = ?self.config.differentiation.as_array(),
            "Starting simulation"
        );

        let mut stop_reason = StopReason::EndTime;
        for _ in 0..steps {
            let record = self.step()?;
            if let Some(threshold) = self.config.simulation.convergence_fraction {
                let fraction = record.differentiated_fraction();
                if fraction >= threshold {
                    warn!(step = record.step, fraction, "Population converged, stopping early");
                    stop_reason = StopReason::Converged;
                    break;
                }
            }
        }

        info!(
            sim_id = %self.sim_id,
            population = self.population(),
            elapsed_ms = self.metrics.elapsed().as_millis() as u64,
            "Simulation finished"
        );
        Ok(RunSummary {
            run_id: Uuid::new_v4(),
            sim_id: self.sim_id.clone(),
            started_at,
            finished_at: Utc::now(),
            config_fingerprint: self.config.fingerprint(),
            stop_reason,
            steps: self.history.clone(),
        })
    }

    fn sample_gradients(&mut self) {
        for field in &self.gradients {
            for agent in &mut self.agents {
                let body = &mut agent.body;
                match field.locate(body.location) {
                    Some(idx) => {
                        body.set_gradient_location(&field.name, idx);
                        if let Some(value) = field.value_at(idx) {
                            body.set_gradient_value(&field.name, value);
                        }
                    }
                    None => {
                        body.clear_gradient_location(&field.name);
                        body.set_gradient_value(&field.name, field.outside_c);
                    }
                }
            }
        }
    }

    /// Admits everything staged during the sweep. Returns how many were admitted.
    fn flush_additions(&mut self) -> Result<usize> {
        let pending = std::mem::take(&mut self.pending);
        let births = pending.len();
        for child in pending {
            let id = child.id();
            let parent = child.parent_id;
            self.add(child)?;
            if let Some(parent) = parent {
                self.connect_to_lineage(id, parent)?;
            }
        }
        Ok(births)
    }

    /// Links a newborn to its parent and to any of the parent's neighbors in reach.
    fn connect_to_lineage(&mut self, child: AgentId, parent: AgentId) -> Result<()> {
        self.network.add_edge(child, parent)?;
        let child_cell = self.agent(child).ok_or(SimError::UnknownAgent(child))?;
        let (location, reach) = (child_cell.body.location, child_cell.interaction_length());

        let close: Vec<AgentId> = self
            .network
            .neighbors(parent)
            .into_iter()
            .filter(|&n| n != child)
            .filter(|&n| {
                self.agent(n).is_some_and(|other| {
                    location.distance_to(&other.body.location) < reach + other.interaction_length()
                })
            })
            .collect();
        for n in close {
            self.network.add_edge(child, n)?;
        }
        Ok(())
    }
}

/// Outside a step, the driver answers agent queries from the live population.
impl SimulationContext for Simulation {
    fn next_id(&mut self) -> AgentId {
        self.allocate_id()
    }

    fn enqueue_addition(&mut self, agent: CellAgent) {
        self.add_to_addition_queue(agent);
    }

    fn neighbor_states(&self, id: AgentId) -> Vec<CellState> {
        self.network
            .neighbors(id)
            .into_iter()
            .filter_map(|n| self.agent(n).map(|a| a.state))
            .collect()
    }
}
