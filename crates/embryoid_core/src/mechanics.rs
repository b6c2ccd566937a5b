//! Contact mechanics feeding the per-agent accumulators.
//!
//! Connected agents are joined by linear springs whose rest length is the sum of
//! their radii: overlapping pairs push apart, stretched pairs pull together.
//! Agents that leave the domain cube get a fixed constraint pointing back inside.

use crate::cell::CellAgent;
use crate::network::NeighborNetwork;
use embryoid_data::{AgentId, Vec3};
use std::collections::HashMap;

/// Accumulates spring displacements along every network edge.
///
/// Each endpoint takes half of the correction. Coincident pairs have no direction
/// and are skipped.
pub fn resolve_contacts(
    network: &NeighborNetwork,
    agents: &mut [CellAgent],
    index: &HashMap<AgentId, usize>,
) {
    let mut pushes: Vec<(usize, Vec3)> = Vec::with_capacity(network.edge_count() * 2);
    for (a, b) in network.edges() {
        let (Some(&ia), Some(&ib)) = (index.get(&a), index.get(&b)) else {
            continue;
        };
        let (body_a, body_b) = (&agents[ia].body, &agents[ib].body);
        let offset = body_b.location - body_a.location;
        let distance = offset.magnitude();
        if distance == 0.0 {
            continue;
        }
        let stretch = distance - (body_a.radius + body_b.radius);
        let k = body_a.spring_constant(body_b);
        let correction = offset.normalized().scale(k * stretch * 0.5);
        pushes.push((ia, correction));
        pushes.push((ib, -correction));
    }
    for (i, v) in pushes {
        agents[i].body.add_displacement_vec(v);
    }
}

/// Pushes every agent back inside `[-half_width, half_width]^3`.
pub fn confine(agents: &mut [CellAgent], half_width: f64) {
    let back = |c: f64| -> f64 {
        if c > half_width {
            half_width - c
        } else if c < -half_width {
            -half_width - c
        } else {
            0.0
        }
    };
    for agent in agents.iter_mut() {
        let loc = agent.body.location;
        let v = Vec3::new(back(loc.x), back(loc.y), back(loc.z));
        if !v.is_zero() {
            agent.body.add_fixed_constraint_vec(v);
        }
    }
}
