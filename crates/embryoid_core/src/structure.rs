//! Initial aggregate construction.
//!
//! Cells are scattered uniformly through a ball sized so that their volume fills
//! about 64% of it (random close packing), then every pair closer than the sum of
//! their interaction lengths is connected. Overlaps are left for the contact
//! mechanics to relax.

use crate::cell::CellAgent;
use crate::config::AggregateConfig;
use crate::differentiation::DifferentiationParams;
use crate::geometry::random_point_in_ball;
use embryoid_data::{AgentId, CellState, Vec3};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

const PACKING_FRACTION: f64 = 0.64;

/// Cells and connections of a freshly built aggregate.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    pub cells: Vec<CellAgent>,
    pub edges: Vec<(AgentId, AgentId)>,
}

/// Radius of the ball holding `count` spheres of `cell_radius` at the packing fraction.
#[must_use]
pub fn aggregate_radius(count: usize, cell_radius: f64) -> f64 {
    cell_radius * (count as f64 / PACKING_FRACTION).cbrt()
}

/// Builds an undifferentiated stem-cell aggregate centred on the origin.
///
/// Identities run from `first_id` upwards.
pub fn seed_aggregate<R: Rng + ?Sized>(
    config: &AggregateConfig,
    params: Arc<DifferentiationParams>,
    first_id: u64,
    rng: &mut R,
) -> Aggregate {
    let bound = aggregate_radius(config.cell_count, config.cell_radius);
    let cells: Vec<CellAgent> = (0..config.cell_count as u64)
        .map(|i| {
            let location = random_point_in_ball(rng, Vec3::ZERO, bound);
            let division_set = rng.gen::<f64>() * config.division_spread;
            CellAgent::stem(
                location,
                config.cell_radius,
                AgentId(first_id + i),
                CellState::Undifferentiated,
                Arc::clone(&params),
            )
            .with_division_set(division_set)
        })
        .collect();
    let edges = contact_pairs(&cells);
    Aggregate { cells, edges }
}

/// Pairs of cells within each other's interaction range.
///
/// Buckets cells on a grid as wide as the largest cutoff, so only adjacent buckets
/// are compared.
pub fn contact_pairs(cells: &[CellAgent]) -> Vec<(AgentId, AgentId)> {
    let Some(cutoff) = cells
        .iter()
        .map(|c| c.interaction_length() * 2.0)
        .reduce(f64::max)
    else {
        return Vec::new();
    };

    let key = |p: Vec3| -> (i64, i64, i64) {
        (
            (p.x / cutoff).floor() as i64,
            (p.y / cutoff).floor() as i64,
            (p.z / cutoff).floor() as i64,
        )
    };

    let mut buckets: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    for (i, cell) in cells.iter().enumerate() {
        buckets.entry(key(cell.body.location)).or_default().push(i);
    }

    let mut pairs = Vec::new();
    for (i, cell) in cells.iter().enumerate() {
        let (bx, by, bz) = key(cell.body.location);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = buckets.get(&(bx + dx, by + dy, bz + dz)) else {
                        continue;
                    };
                    for &j in bucket {
                        if j <= i {
                            continue;
                        }
                        let other = &cells[j];
                        let reach = cell.interaction_length() + other.interaction_length();
                        if cell.body.location.distance_to(&other.body.location) < reach {
                            pairs.push((cell.id(), other.id()));
                        }
                    }
                }
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config(cell_count: usize) -> AggregateConfig {
        AggregateConfig {
            cell_count,
            ..Default::default()
        }
    }

    #[test]
    fn test_seeded_aggregate_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let params = Arc::new(DifferentiationParams::new(0.01, 0.5, 10.0, 0.5, 10.0));
        let agg = seed_aggregate(&config(200), params, 10, &mut rng);

        assert_eq!(agg.cells.len(), 200);
        assert_eq!(agg.cells[0].id(), AgentId(10));
        assert_eq!(agg.cells[199].id(), AgentId(209));
        let bound = aggregate_radius(200, 5.0);
        for cell in &agg.cells {
            assert!(cell.body.location.magnitude() <= bound + 1e-9);
            assert!(cell.division_timer >= 0.0 && cell.division_timer < 19.0);
            assert_eq!(cell.state, CellState::Undifferentiated);
        }
        assert!(!agg.edges.is_empty());
    }

    #[test]
    fn test_contact_pairs_match_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let params = Arc::new(DifferentiationParams::new(0.01, 0.5, 10.0, 0.5, 10.0));
        let agg = seed_aggregate(&config(150), params, 0, &mut rng);

        let mut brute = Vec::new();
        for i in 0..agg.cells.len() {
            for j in (i + 1)..agg.cells.len() {
                let (a, b) = (&agg.cells[i], &agg.cells[j]);
                let reach = a.interaction_length() + b.interaction_length();
                if a.body.location.distance_to(&b.body.location) < reach {
                    brute.push((a.id(), b.id()));
                }
            }
        }
        brute.sort_unstable();
        assert_eq!(agg.edges, brute);
    }

    #[test]
    fn test_empty_aggregate() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let params = Arc::new(DifferentiationParams::new(0.01, 0.5, 10.0, 0.5, 10.0));
        let agg = seed_aggregate(&config(0), params, 0, &mut rng);
        assert!(agg.cells.is_empty());
        assert!(agg.edges.is_empty());
    }
}
