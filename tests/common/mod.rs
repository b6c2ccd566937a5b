use embryoid_core::cell::CellAgent;
use embryoid_core::config::SimConfig;
use embryoid_core::differentiation::DifferentiationParams;
use embryoid_core::simulation::Simulation;
use embryoid_data::{AgentId, CellState, Vec3};
use std::sync::Arc;

#[allow(dead_code)]
pub struct SimulationBuilder {
    config: SimConfig,
    cells: Vec<CellAgent>,
    edges: Vec<(u64, u64)>,
}

#[allow(dead_code)]
impl SimulationBuilder {
    /// Empty population, fixed seed, ten one-hour steps.
    pub fn new() -> Self {
        let mut config = SimConfig::default();
        config.simulation.seed = Some(0);
        config.simulation.end_time = 10.0;
        config.aggregate.cell_count = 0;
        Self {
            config,
            cells: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.simulation.seed = Some(seed);
        self
    }

    pub fn with_end_time(mut self, end_time: f64) -> Self {
        self.config.simulation.end_time = end_time;
        self
    }

    pub fn with_params(mut self, params: DifferentiationParams) -> Self {
        self.config.differentiation = params;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_cell(mut self, cell: CellAgent) -> Self {
        self.cells.push(cell);
        self
    }

    pub fn with_edge(mut self, a: u64, b: u64) -> Self {
        self.edges.push((a, b));
        self
    }

    /// Hand-placed cells only.
    pub fn build(self) -> Simulation {
        let mut sim = Simulation::new("test", self.config).unwrap();
        for cell in self.cells {
            sim.add(cell).unwrap();
        }
        for (a, b) in self.edges {
            sim.connect(AgentId(a), AgentId(b)).unwrap();
        }
        sim
    }

    /// Generated aggregate of `count` cells.
    pub fn build_aggregate(mut self, count: usize) -> Simulation {
        self.config.aggregate.cell_count = count;
        Simulation::seeded("test", self.config).unwrap()
    }
}

#[allow(dead_code)]
pub fn params(a: f64) -> Arc<DifferentiationParams> {
    Arc::new(DifferentiationParams::new(a, 0.5, 25.0, 0.5, 25.0))
}

#[allow(dead_code)]
pub fn stem(id: u64, x: f64, state: CellState, a: f64) -> CellAgent {
    CellAgent::stem(Vec3::new(x, 0.0, 0.0), 5.0, AgentId(id), state, params(a))
}
