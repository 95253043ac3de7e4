// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # fsqca — Fuzzy-set Qualitative Comparative Analysis
//!
//! Calibration, truth tables, and configurational solutions.
//!
//! ## Core Concept
//!
//! fsQCA asks which **combinations** of conditions are sufficient (or
//! necessary) for an outcome across a medium-N set of cases. Raw scores are
//! calibrated into fuzzy-set memberships, each case is placed in the corner
//! of the condition space it belongs to most, and the corners consistent
//! with the outcome are minimized into a Boolean solution.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fsqca::{run, AnalysisConfig, QuineMcCluskey, RawTable};
//!
//! let config = AnalysisConfig::from_path("analysis.yaml")?;
//! let raw = RawTable::from_path("cases.csv", &config.case_id)?;
//!
//! let analysis = run(&raw, &config, &QuineMcCluskey)?;
//! println!("{}", analysis.truth_table.to_report(false));
//! println!("{}", analysis.solution.to_report());
//! ```
//!
//! ## Config Format
//!
//! ```yaml
//! case_id: country
//! outcome: democracy
//! conditions: [wealth, literacy, urban]
//! calibration:
//!   democracy: { exclusion: 2.0, crossover: 5.0, inclusion: 8.0 }
//!   wealth:    { exclusion: 550, crossover: 1000, inclusion: 1900 }
//!   literacy:  { exclusion: 75, crossover: 90, inclusion: 99 }
//!   urban:     { exclusion: 25, crossover: 50, inclusion: 65 }
//! cutoffs:
//!   inclusion: 0.8
//!   necessity: 0.9
//!   coverage: 0.5
//!   frequency: 1
//! remainders: exclude   # conservative; `include` for parsimonious
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  RawTable (CSV)          AnalysisConfig (YAML)              │
//! │       │                         │                           │
//! │       └──► build_condition_set ◄┘                           │
//! │                    │                                        │
//! │                    ▼                                        │
//! │            CalibratedTable ──► analyze_necessity            │
//! │                    │                  │                     │
//! │                    ▼                  ▼                     │
//! │          build_truth_table     NecessityReport              │
//! │                    │                                        │
//! │                    ▼                                        │
//! │               TruthTable ──► solve(&dyn Minimizer)          │
//! │                                       │                     │
//! │                                       ▼                     │
//! │                                SolutionReport               │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`run`] chains all stages; it either returns every artifact or the first
//! error.

pub mod calibrate;
pub mod conditions;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fit;
pub mod minimize;
pub mod necessity;
pub mod pipeline;
pub mod solution;
pub mod truth_table;
pub mod warning;

// Re-exports
pub use calibrate::{calibrate, calibrate_column, CalibratedColumn, ThresholdTriplet};
pub use conditions::{build_condition_set, CalibratedTable};
pub use config::{AnalysisConfig, Cutoffs, RemainderPolicy};
pub use dataset::{Case, RawTable};
pub use error::{Error, Result};
pub use fit::{NecessityFit, SufficiencyFit};
pub use minimize::{Implicant, Literal, MinimizationProblem, Minimizer, QuineMcCluskey};
pub use necessity::{analyze_necessity, DisjunctionFit, LiteralFit, NecessityReport};
pub use pipeline::{run, Analysis, ReportFormat};
pub use solution::{solve, Solution, SolutionReport, SolutionTerm};
pub use truth_table::{build_truth_table, RowTag, TruthTable, TruthTableRow, MAX_CONDITIONS};
pub use warning::Warning;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
