//! Sprite lifecycle notifications.
//!
//! The engine emits a [`LifecycleEvent`] when a sprite starts traversing the
//! canvas and another when it leaves it (naturally or by forced removal).
//! Hosts may ignore them entirely.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique id of a sprite within one renderer session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpriteId(pub u64);

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sprite#{}", self.0)
    }
}

/// Lifecycle stage reported to the host.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpriteStage {
    /// The sprite entered the canvas.
    Begin = 1,
    /// The sprite left the canvas.
    End = 2,
}

/// A lifecycle notification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Stage reached.
    pub stage: SpriteStage,
    /// Sprite that reached it.
    pub sprite: SpriteId,
    /// Type tag of the sprite's descriptor.
    pub sprite_name: String,
    /// Stable identifier of the sprite's descriptor, if any.
    pub identifier: Option<String>,
    /// Logical time of the transition.
    pub time: f64,
    /// Free-form parameters: the descriptor params plus engine-provided keys
    /// (`lane`, `axis`, and `reason` for forced removals).
    pub params: BTreeMap<String, String>,
}

impl LifecycleEvent {
    /// Returns a parameter by key.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
