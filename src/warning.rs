//! Non-fatal data-quality findings reported alongside results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A finding that does not abort the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A raw value sits exactly on its crossover anchor
    AmbiguousMembership {
        case: String,
        set: String,
        raw: f64,
    },

    /// A positive truth table row rests on a single case
    SparseCorner { corner: String, cases: usize },

    /// A corner has cases but fewer than the frequency cutoff, so it is a remainder
    BelowFrequencyCutoff {
        corner: String,
        cases: usize,
        cutoff: usize,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::AmbiguousMembership { case, set, raw } => write!(
                f,
                "case '{}' has membership 0.5 in '{}' (raw value {} is the crossover anchor)",
                case, set, raw
            ),
            Warning::SparseCorner { corner, cases } => write!(
                f,
                "positive corner {} is supported by only {} case",
                corner, cases
            ),
            Warning::BelowFrequencyCutoff {
                corner,
                cases,
                cutoff,
            } => write!(
                f,
                "corner {} has {} case(s), below the frequency cutoff of {}; treated as remainder",
                corner, cases, cutoff
            ),
        }
    }
}
