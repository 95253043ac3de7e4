//! CLI command implementations
//!
//! - `config`: config validation and schema commands
//! - `analysis`: calibrate, necessity, truth-table, solve
//! - `util`: shared input/output helpers

pub mod analysis;
pub mod config;
pub mod util;

pub use analysis::{cmd_calibrate, cmd_necessity, cmd_solve, cmd_truth_table, SolveOptions};
pub use config::{cmd_check, cmd_schema};
