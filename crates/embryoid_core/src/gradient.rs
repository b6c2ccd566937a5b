//! Gradient grid geometry and sampling.
//!
//! A `GradientField` is a box of `dims` cells centred on the origin. It maps agent
//! locations onto grid cells and hands back the stored concentration. Solving the
//! diffusion-reaction problem is left to whatever writes into [`GradientField::values_mut`].

use crate::config::GradientConfig;
use embryoid_data::{GridIndex, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientField {
    pub name: String,
    /// Diffusion coefficient, um^2/s.
    pub diffusion: f64,
    /// Edge lengths of the box, um.
    pub size: Vec3,
    pub dims: [usize; 3],
    /// Concentration outside the aggregate, also the initial value of every cell.
    pub outside_c: f64,
    values: Vec<f64>,
}

impl GradientField {
    pub fn new(name: &str, diffusion: f64, size: Vec3, dims: [usize; 3], outside_c: f64) -> Self {
        let len = dims[0] * dims[1] * dims[2];
        Self {
            name: name.to_string(),
            diffusion,
            size,
            dims,
            outside_c,
            values: vec![outside_c; len],
        }
    }

    pub fn from_config(config: &GradientConfig) -> Self {
        Self::new(
            &config.name,
            config.diffusion,
            Vec3::from(config.size),
            config.dims,
            config.outside_c,
        )
    }

    /// Grid cell containing `location`, or `None` outside the box.
    #[must_use]
    pub fn locate(&self, location: Vec3) -> Option<GridIndex> {
        let axis = |coord: f64, extent: f64, cells: usize| -> Option<usize> {
            if cells == 0 || extent <= 0.0 {
                return None;
            }
            let shifted = coord + extent / 2.0;
            if !(0.0..=extent).contains(&shifted) {
                return None;
            }
            let idx = (shifted / extent * cells as f64).floor() as usize;
            Some(idx.min(cells - 1))
        };
        Some(GridIndex::new(
            axis(location.x, self.size.x, self.dims[0])?,
            axis(location.y, self.size.y, self.dims[1])?,
            axis(location.z, self.size.z, self.dims[2])?,
        ))
    }

    fn offset(&self, index: GridIndex) -> Option<usize> {
        let [ni, nj, nk] = self.dims;
        if index.i >= ni || index.j >= nj || index.k >= nk {
            return None;
        }
        Some((index.i * nj + index.j) * nk + index.k)
    }

    #[must_use]
    pub fn value_at(&self, index: GridIndex) -> Option<f64> {
        self.offset(index).map(|o| self.values[o])
    }

    /// Writes one cell. Returns false for an index outside the grid.
    pub fn set_value(&mut self, index: GridIndex, value: f64) -> bool {
        match self.offset(index) {
            Some(o) => {
                self.values[o] = value;
                true
            }
            None => false,
        }
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
