//! Per-step population records and the summary of a finished run.

use chrono::{DateTime, Utc};
use embryoid_data::CellState;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use uuid::Uuid;

/// Population composition after one step.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct StepRecord {
    pub step: u64,
    pub time: f64,
    pub population: usize,
    pub undifferentiated: usize,
    pub transitioning: usize,
    pub differentiated: usize,
    /// Agents born during this step.
    pub births: usize,
    /// Sum of the per-agent convergence signals.
    pub converged: u64,
}

impl StepRecord {
    pub fn tally<I: IntoIterator<Item = CellState>>(&mut self, states: I) {
        for state in states {
            self.population += 1;
            match state {
                CellState::Undifferentiated => self.undifferentiated += 1,
                CellState::Transitioning => self.transitioning += 1,
                CellState::Differentiated => self.differentiated += 1,
                CellState::Apoptotic => {}
            }
        }
    }

    #[must_use]
    pub fn differentiated_fraction(&self) -> f64 {
        if self.population == 0 {
            0.0
        } else {
            self.differentiated as f64 / self.population as f64
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTime,
    Converged,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub sim_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config_fingerprint: String,
    pub stop_reason: StopReason,
    pub steps: Vec<StepRecord>,
}

impl RunSummary {
    #[must_use]
    pub fn final_step(&self) -> Option<&StepRecord> {
        self.steps.last()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
