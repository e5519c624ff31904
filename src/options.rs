//! Caller-facing configuration.
//!
//! Both structs deserialize from partial documents; missing fields take
//! their defaults.

use serde::{Deserialize, Serialize};

/// SMILES output options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmilesWriteOptions {
    /// Write `@`/`@@`, `/`/`\` and isotope labels.
    pub stereo: bool,
    /// Write alternating single and double bonds instead of aromatic atoms.
    pub kekule: bool,
    /// Order atoms canonically so equal graphs give equal strings.
    pub canonical: bool,
    /// Keep atom map numbers; otherwise they are cleared on the output copy.
    pub map_numbers: bool,
    /// Fold removable hydrogen nodes into hydrogen counts before writing.
    pub remove_h: bool,
}

impl Default for SmilesWriteOptions {
    fn default() -> Self {
        Self {
            stereo: true,
            kekule: false,
            canonical: true,
            map_numbers: false,
            remove_h: true,
        }
    }
}

/// Post-processing applied when a graph is built from external records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Remove hydrogen nodes, keeping the ones that carry information.
    pub remove_h: bool,
    pub sanitize: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            remove_h: false,
            sanitize: true,
        }
    }
}
