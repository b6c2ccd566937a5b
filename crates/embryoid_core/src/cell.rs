//! Cell agents: a spatial body plus a division timer and a fate state.
//!
//! Variants are an explicit enum ([`CellKind`]) with one update function each:
//!
//! - `Dividing` divides whenever its timer reaches the division time;
//! - `Stem` divides the same way, turns `T` into `D` at division, and runs the
//!   differentiation rule while in `U`.

use crate::context::SimulationContext;
use crate::differentiation::{self, DifferentiationParams, NeighborTally};
use crate::error::Result;
use crate::geometry::random_point_on_sphere;
use crate::spatial::SpatialAgent;
use embryoid_data::{AgentId, CellState, SimType, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

/// Interaction halo beyond the membrane.
pub const CONTACT_HALO: f64 = 2.0;
/// Default division time of a plain dividing cell, in hours.
pub const DIVIDING_CELL_DIVISION_TIME: f64 = 14.0;
/// Default division time of a stem cell, in hours.
pub const STEM_CELL_DIVISION_TIME: f64 = 19.0;
/// Division time a stem cell adopts once it reaches `D`, in hours.
pub const DIFFERENTIATED_DIVISION_TIME: f64 = 51.0;

/// Variant payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CellKind {
    Dividing,
    /// Parameters are shared with every descendant.
    Stem { params: Arc<DifferentiationParams> },
}

impl CellKind {
    #[must_use]
    pub fn sim_type(&self) -> SimType {
        match self {
            CellKind::Dividing => SimType::DividingCell,
            CellKind::Stem { .. } => SimType::StemCell,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellAgent {
    pub body: SpatialAgent,
    pub parent_id: Option<AgentId>,
    pub state: CellState,
    pub division_timer: f64,
    pub division_time: f64,
    pub kind: CellKind,
}

impl CellAgent {
    pub fn dividing(location: Vec3, radius: f64, id: AgentId) -> Self {
        Self::with_kind(
            location,
            radius,
            id,
            CellState::Undifferentiated,
            CellKind::Dividing,
            DIVIDING_CELL_DIVISION_TIME,
        )
    }

    pub fn stem(
        location: Vec3,
        radius: f64,
        id: AgentId,
        state: CellState,
        params: Arc<DifferentiationParams>,
    ) -> Self {
        Self::with_kind(
            location,
            radius,
            id,
            state,
            CellKind::Stem { params },
            STEM_CELL_DIVISION_TIME,
        )
    }

    fn with_kind(
        location: Vec3,
        radius: f64,
        id: AgentId,
        state: CellState,
        kind: CellKind,
        division_time: f64,
    ) -> Self {
        Self {
            body: SpatialAgent::new(location, radius, id, kind.sim_type()),
            parent_id: None,
            state,
            division_timer: 0.0,
            division_time,
            kind,
        }
    }

    /// Starts the division timer part-way, so a population does not divide in lockstep.
    #[must_use]
    pub fn with_division_set(mut self, division_set: f64) -> Self {
        self.division_timer = division_set;
        self
    }

    #[must_use]
    pub fn with_division_time(mut self, division_time: f64) -> Self {
        self.division_time = division_time;
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner_id: AgentId) -> Self {
        self.body.owner_id = owner_id;
        self
    }

    #[must_use]
    pub fn id(&self) -> AgentId {
        self.body.id
    }

    #[must_use]
    pub fn sim_type(&self) -> SimType {
        self.body.sim_type
    }

    #[must_use]
    pub fn params(&self) -> Option<&Arc<DifferentiationParams>> {
        match &self.kind {
            CellKind::Stem { params } => Some(params),
            CellKind::Dividing => None,
        }
    }

    #[must_use]
    pub fn is_differentiated(&self) -> bool {
        self.state == CellState::Differentiated
    }

    /// Membrane plus halo.
    #[must_use]
    pub fn interaction_length(&self) -> f64 {
        self.body.radius + CONTACT_HALO
    }

    #[must_use]
    pub fn max_interaction_length(&self) -> f64 {
        self.body.max_interaction_length()
    }

    pub fn update_constraints(&mut self, dt: f64) {
        self.body.update_constraints(dt);
    }

    /// Advances the cell by `dt`.
    ///
    /// Returns 1 if the cell is in `D` afterwards, 0 otherwise.
    pub fn update<C, R>(&mut self, ctx: &mut C, rng: &mut R, dt: f64) -> Result<u32>
    where
        C: SimulationContext + ?Sized,
        R: Rng + ?Sized,
    {
        match &self.kind {
            CellKind::Dividing => self.update_dividing(ctx, rng, dt),
            CellKind::Stem { params } => {
                let params = Arc::clone(params);
                self.update_stem(ctx, rng, dt, params)?;
            }
        }
        Ok(u32::from(self.is_differentiated()))
    }

    fn update_dividing<C, R>(&mut self, ctx: &mut C, rng: &mut R, dt: f64)
    where
        C: SimulationContext + ?Sized,
        R: Rng + ?Sized,
    {
        self.division_timer += dt;
        if self.division_timer >= self.division_time {
            let location = self.daughter_location(rng);
            let child = CellAgent::dividing(location, self.body.radius, ctx.next_id());
            self.release(ctx, child);
        }
    }

    fn update_stem<C, R>(
        &mut self,
        ctx: &mut C,
        rng: &mut R,
        dt: f64,
        params: Arc<DifferentiationParams>,
    ) -> Result<()>
    where
        C: SimulationContext + ?Sized,
        R: Rng + ?Sized,
    {
        self.division_timer += dt;
        if self.division_timer >= self.division_time {
            if self.state == CellState::Transitioning {
                self.state = CellState::Differentiated;
                self.division_time = DIFFERENTIATED_DIVISION_TIME;
                debug!(id = %self.id(), "Cell differentiated at division");
            }
            let location = self.daughter_location(rng);
            let child = CellAgent::stem(
                location,
                self.body.radius,
                ctx.next_id(),
                self.state,
                Arc::clone(&params),
            )
            .with_division_time(self.division_time);
            self.release(ctx, child);
        }

        if self.state == CellState::Undifferentiated {
            let tally = NeighborTally::from_states(ctx.neighbor_states(self.id()));
            self.state = differentiation::decide(self.state, &tally, &params, rng)?;
            if self.state == CellState::Transitioning {
                debug!(id = %self.id(), neighbors = tally.total, "Cell committed");
            }
        }
        Ok(())
    }

    /// Random point on the sphere of half the radius around the parent.
    fn daughter_location<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.body.location + random_point_on_sphere(rng).scale(self.body.radius / 2.0)
    }

    fn release<C: SimulationContext + ?Sized>(&mut self, ctx: &mut C, mut child: CellAgent) {
        child.parent_id = Some(self.id());
        debug!(parent = %self.id(), child = %child.id(), "Cell divided");
        ctx.enqueue_addition(child);
        self.division_timer = 0.0;
    }
}

impl PartialEq for CellAgent {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
    }
}

impl Eq for CellAgent {}

impl Hash for CellAgent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.body.hash(state);
    }
}

impl fmt::Display for CellAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.body, self.state)
    }
}
