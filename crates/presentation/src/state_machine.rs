use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupState {
    Hidden,
    Visible,
    Dismissed,
}

/// Describes a single valid state transition for a popup instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: PopupState,
    pub to: PopupState,
    pub trigger: String,
}

/// Guards the popup lifecycle by enforcing a finite set of valid
/// transitions. `Dismissed` has no way out.
#[derive(Debug, Clone)]
pub struct PopupStateMachine {
    pub state: PopupState,
    pub transitions: Vec<StateTransition>,
}

impl PopupStateMachine {
    /// Creates a new state machine starting in `Hidden`.
    pub fn new() -> Self {
        let transitions = vec![
            StateTransition {
                from: PopupState::Hidden,
                to: PopupState::Visible,
                trigger: "trigger_fired".to_string(),
            },
            StateTransition {
                from: PopupState::Visible,
                to: PopupState::Dismissed,
                trigger: "dismissed".to_string(),
            },
        ];

        Self {
            state: PopupState::Hidden,
            transitions,
        }
    }

    /// Returns `true` if the given transition is allowed.
    pub fn can_transition(&self, from: &PopupState, to: &PopupState) -> bool {
        self.transitions
            .iter()
            .any(|t| t.from == *from && t.to == *to)
    }

    /// Attempts to move the state machine to `to`. Returns an error if the
    /// transition is not permitted.
    pub fn transition(&mut self, to: PopupState) -> Result<()> {
        if self.can_transition(&self.state, &to) {
            self.state = to;
            Ok(())
        } else {
            Err(anyhow!(
                "Invalid popup transition from {:?} to {:?}",
                self.state,
                to
            ))
        }
    }
}

impl Default for PopupStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
