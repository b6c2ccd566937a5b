//! Configuration management for simulation parameters.
//!
//! Strongly-typed structures that map to a `config.toml` file. Every field has a
//! default reproducing the standard embryoid-body setup, so a file only needs the
//! values it changes.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [simulation]
//! end_time = 200.0
//! seed = 42
//!
//! [aggregate]
//! cell_count = 500
//!
//! [differentiation]
//! a = 0.005
//! k1 = 0.5
//! n1 = 25.0
//! k2 = 0.3
//! n2 = 25.0
//!
//! [[gradients]]
//! name = "LIF"
//! source = 2.0e-20
//! ```

use crate::differentiation::DifferentiationParams;
use serde::{Deserialize, Serialize};

const STEP_EPSILON: f64 = 1e-9;

/// Time stepping and run control.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub start_time: f64,
    pub end_time: f64,
    pub dt: f64,
    pub seed: Option<u64>,
    /// Stop once this fraction of the population is differentiated.
    pub convergence_fraction: Option<f64>,
    /// Agents are held inside a cube of this half-width by fixed constraints.
    pub domain_half_width: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            end_time: 100.0,
            dt: 1.0,
            seed: None,
            convergence_fraction: None,
            domain_half_width: 350.0,
        }
    }
}

/// Shape of the initial aggregate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AggregateConfig {
    pub cell_count: usize,
    pub cell_radius: f64,
    /// Initial division timers are drawn uniformly from `[0, division_spread)`.
    pub division_spread: f64,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            cell_count: 1000,
            cell_radius: 5.0,
            division_spread: 19.0,
        }
    }
}

/// One diffusible field and the rates every cell applies to it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GradientConfig {
    pub name: String,
    pub diffusion: f64,
    pub size: [f64; 3],
    pub dims: [usize; 3],
    pub outside_c: f64,
    pub source: f64,
    pub sink: f64,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffusion: 10.0,
            size: [700.0, 700.0, 700.0],
            dims: [15, 15, 15],
            outside_c: 0.0,
            source: 2.0e-20,
            sink: 0.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub aggregate: AggregateConfig,
    pub differentiation: DifferentiationParams,
    pub gradients: Vec<GradientConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let production_rate = 2.0e-20;
        Self {
            simulation: SimulationConfig::default(),
            aggregate: AggregateConfig::default(),
            differentiation: DifferentiationParams::new(0.005, 0.5, 25.0, 0.5, 25.0),
            gradients: vec![
                GradientConfig {
                    name: "TNF".to_string(),
                    source: production_rate,
                    sink: production_rate / 2.0,
                    ..Default::default()
                },
                GradientConfig {
                    name: "LIF".to_string(),
                    source: production_rate,
                    sink: 0.0,
                    ..Default::default()
                },
            ],
        }
    }
}

impl SimConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure. Hill exponents and thresholds are not
    /// range-checked here; out-of-range values surface when the rule evaluates them.
    pub fn validate(&self) -> anyhow::Result<()> {
        let sim = &self.simulation;
        anyhow::ensure!(sim.dt > 0.0, "Time step must be positive");
        anyhow::ensure!(
            sim.end_time >= sim.start_time,
            "End time must not precede start time"
        );
        anyhow::ensure!(
            sim.domain_half_width > 0.0,
            "Domain half-width must be positive"
        );
        if let Some(fraction) = sim.convergence_fraction {
            anyhow::ensure!(
                (0.0..=1.0).contains(&fraction),
                "Convergence fraction must be in [0.0, 1.0]"
            );
        }

        let agg = &self.aggregate;
        anyhow::ensure!(agg.cell_radius > 0.0, "Cell radius must be positive");
        anyhow::ensure!(
            agg.division_spread >= 0.0,
            "Division spread must be non-negative"
        );

        DifferentiationParams::from_slice(&self.differentiation.as_array())?;
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.differentiation.a),
            "Basal differentiation probability must be in [0.0, 1.0]"
        );

        let mut names = std::collections::HashSet::new();
        for g in &self.gradients {
            anyhow::ensure!(!g.name.is_empty(), "Gradient name must not be empty");
            anyhow::ensure!(names.insert(&g.name), "Duplicate gradient name: {}", g.name);
            anyhow::ensure!(
                g.dims.iter().all(|&d| d > 0),
                "Gradient {} must have at least one cell per axis",
                g.name
            );
            anyhow::ensure!(
                g.size.iter().all(|&s| s > 0.0),
                "Gradient {} must have a positive size",
                g.name
            );
            anyhow::ensure!(
                g.diffusion >= 0.0,
                "Gradient {} diffusion must be non-negative",
                g.name
            );
        }

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Stable hash of everything that shapes the outcome of a run.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.simulation).as_bytes());
        hasher.update(format!("{:?}", self.aggregate).as_bytes());
        hasher.update(format!("{:?}", self.differentiation).as_bytes());
        hasher.update(format!("{:?}", self.gradients).as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Seed derived from a run label, for runs that name a structure but no seed.
    ///
    /// Numeric labels are used as-is; anything else is hashed.
    #[must_use]
    pub fn seed_from_label(label: &str) -> u64 {
        use sha2::{Digest, Sha256};
        if let Ok(seed) = label.parse::<u64>() {
            return seed;
        }
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Number of whole steps between start and end time.
    ///
    /// Quotients within `STEP_EPSILON` below an integer count as that integer, so
    /// `0.3 / 0.1` gives 3 steps rather than 2.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        let span = self.simulation.end_time - self.simulation.start_time;
        (span / self.simulation.dt + STEP_EPSILON).floor() as u64
    }
}
