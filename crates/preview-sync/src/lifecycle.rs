//! Preview server lifecycle state machine.
//!
//! Valid transitions:
//!
//! ```text
//! off ──start──▶ loading ──started──▶ on
//!  ▲                │ ▲                │
//!  └────closed──────┘ └─────close──────┘
//! ```
//!
//! `loading` is the only mutual exclusion between start and close sequences;
//! a toggle arriving while loading is dropped.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key the state is persisted under.
pub const STATE_KEY: &str = "preview-sync.state";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    #[default]
    Off,
    Loading,
    On,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Off => "off",
            LifecycleState::Loading => "loading",
            LifecycleState::On => "on",
        }
    }

    fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Off, Loading) | (Loading, On) | (On, Loading) | (Loading, Off) | (Loading, Loading)
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status bar affordance derived from the lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusItem {
    pub text: String,
    pub tooltip: Option<String>,
    /// Drawn in the accent color while the server is live
    pub highlighted: bool,
}

impl StatusItem {
    pub fn for_state(state: LifecycleState, open_url: Option<&str>) -> Self {
        match state {
            LifecycleState::On => Self {
                text: format!("$(zap) {}", open_url.unwrap_or_default()),
                tooltip: Some("Close Preview".to_string()),
                highlighted: true,
            },
            LifecycleState::Loading => Self {
                text: "$(sync~spin) Going Live...".to_string(),
                tooltip: None,
                highlighted: false,
            },
            LifecycleState::Off => Self {
                text: "$(play-circle) Go Live".to_string(),
                tooltip: Some("Open Preview".to_string()),
                highlighted: false,
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == LifecycleState::On
    }

    /// Move to `next`, rejecting transitions outside the table above.
    pub fn transition(&mut self, next: LifecycleState) -> Result<LifecycleState> {
        if !self.state.can_transition_to(next) {
            return Err(SyncError::Lifecycle(format!("{} -> {}", self.state, next)));
        }
        tracing::debug!("Lifecycle {} -> {}", self.state, next);
        self.state = next;
        Ok(next)
    }
}
