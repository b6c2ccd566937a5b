//! The spatial agent record shared by every agent kind.
//!
//! A `SpatialAgent` is a sphere with an identity. External force resolution feeds
//! its displacement and fixed-constraint accumulators during a step, and
//! [`SpatialAgent::update_constraints`] folds both into the location, each capped at
//! [`MAX_STEP_DISPLACEMENT`]. The gradient solver stores per-gradient coefficients,
//! grid positions and sampled values here by gradient name.

use embryoid_data::{AgentId, GridIndex, SimType, SourceSink, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Largest distance an accumulator may move an agent in one step.
pub const MAX_STEP_DISPLACEMENT: f64 = 5.0;
/// Spring stiffness used between any two agents.
pub const DEFAULT_SPRING_CONSTANT: f64 = 0.25;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialAgent {
    pub location: Vec3,
    pub radius: f64,
    pub id: AgentId,
    /// Controlling super-agent. Equal to `id` for single-part agents.
    pub owner_id: AgentId,
    pub sim_type: SimType,
    #[serde(skip)]
    displacement_vec: Vec3,
    #[serde(skip)]
    fixed_constraint_vec: Vec3,
    gradient_source_sink_coeff: HashMap<String, SourceSink>,
    #[serde(skip)]
    gradient_position: HashMap<String, GridIndex>,
    #[serde(skip)]
    gradient_value: HashMap<String, f64>,
}

impl SpatialAgent {
    pub fn new(location: Vec3, radius: f64, id: AgentId, sim_type: SimType) -> Self {
        Self::with_owner(location, radius, id, id, sim_type)
    }

    pub fn with_owner(
        location: Vec3,
        radius: f64,
        id: AgentId,
        owner_id: AgentId,
        sim_type: SimType,
    ) -> Self {
        Self {
            location,
            radius,
            id,
            owner_id,
            sim_type,
            displacement_vec: Vec3::ZERO,
            fixed_constraint_vec: Vec3::ZERO,
            gradient_source_sink_coeff: HashMap::new(),
            gradient_position: HashMap::new(),
            gradient_value: HashMap::new(),
        }
    }

    #[must_use]
    pub fn max_interaction_length(&self) -> f64 {
        self.radius * 2.0
    }

    #[must_use]
    pub fn interaction_length(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn spring_constant(&self, _other: &SpatialAgent) -> f64 {
        DEFAULT_SPRING_CONSTANT
    }

    pub fn add_displacement_vec(&mut self, v: Vec3) {
        self.displacement_vec += v;
    }

    pub fn add_fixed_constraint_vec(&mut self, v: Vec3) {
        self.fixed_constraint_vec += v;
    }

    #[must_use]
    pub fn displacement_vec(&self) -> Vec3 {
        self.displacement_vec
    }

    #[must_use]
    pub fn fixed_constraint_vec(&self) -> Vec3 {
        self.fixed_constraint_vec
    }

    /// Applies both accumulators to the location and clears them.
    ///
    /// Each vector is clamped on its own, so the agent can move at most
    /// `2 * MAX_STEP_DISPLACEMENT` in a single call.
    pub fn update_constraints(&mut self, _dt: f64) {
        let displacement = std::mem::take(&mut self.displacement_vec);
        self.location += displacement.clamp_magnitude(MAX_STEP_DISPLACEMENT);

        let fixed = std::mem::take(&mut self.fixed_constraint_vec);
        self.location += fixed.clamp_magnitude(MAX_STEP_DISPLACEMENT);
    }

    /// Overwrites the source and sink rates for a gradient.
    pub fn set_gradient_source_sink_coeff(&mut self, name: &str, source: f64, sink: f64) {
        self.gradient_source_sink_coeff
            .insert(name.to_string(), SourceSink::new(source, sink));
    }

    /// Source and sink rates for a gradient, `None` if never set.
    #[must_use]
    pub fn gradient_source_sink_coeff(&self, name: &str) -> Option<SourceSink> {
        self.gradient_source_sink_coeff.get(name).copied()
    }

    pub fn set_gradient_location(&mut self, name: &str, index: GridIndex) {
        self.gradient_position.insert(name.to_string(), index);
    }

    /// Forgets the grid cell for a gradient, e.g. once the agent has left its box.
    pub fn clear_gradient_location(&mut self, name: &str) {
        self.gradient_position.remove(name);
    }

    #[must_use]
    pub fn gradient_location(&self, name: &str) -> Option<GridIndex> {
        self.gradient_position.get(name).copied()
    }

    pub fn set_gradient_value(&mut self, name: &str, value: f64) {
        self.gradient_value.insert(name.to_string(), value);
    }

    #[must_use]
    pub fn gradient_value(&self, name: &str) -> Option<f64> {
        self.gradient_value.get(name).copied()
    }
}

impl PartialEq for SpatialAgent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SpatialAgent {}

impl Hash for SpatialAgent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for SpatialAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({:.3}, {:.3}, {:.3})",
            self.sim_type, self.id, self.location.x, self.location.y, self.location.z
        )
    }
}
