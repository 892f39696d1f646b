//! Hardware family tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one hardware family with its own serialization format.
///
/// The four built-in families cover the hardware this library ships support
/// for; [`FamilyTag::Custom`] lets callers register additional schemas at
/// runtime without touching decode/encode/reconcile logic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FamilyTag {
    /// Legacy Mustang I–V series (fixed-layout binary records).
    Classic,
    /// Mustang LT series (Tone-style JSON audio graph).
    MustangLt,
    /// Rumble LT bass series (Tone-style JSON with an EQ chain role).
    RumbleLt,
    /// Mustang Micro Plus (Tone-style JSON with byte-valued parameters).
    MicroPlus,
    /// A caller-registered family.
    Custom(String),
}

impl FamilyTag {
    /// Short stable identifier, usable in note text and logs.
    pub fn id(&self) -> &str {
        match self {
            FamilyTag::Classic => "classic",
            FamilyTag::MustangLt => "mustang-lt",
            FamilyTag::RumbleLt => "rumble-lt",
            FamilyTag::MicroPlus => "micro-plus",
            FamilyTag::Custom(id) => id,
        }
    }
}

impl fmt::Display for FamilyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
