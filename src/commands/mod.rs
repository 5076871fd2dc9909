//! Command adapter layer.
//!
//! The UI collaborator calls these functions with JSON payloads and
//! gets `{"success": true, ...}` envelopes back. This layer owns the
//! mutable application state (the dataset handle and the selection
//! state machine) and does nothing else: parsing, delegation to the
//! pure analysis modules, and response shaping.

use std::sync::Mutex;

use crate::dataset::DatasetState;
use crate::selection::SelectionState;

pub mod analytics;
pub mod dataset;
pub mod selection;

/// Managed application state handed to every command.
pub struct AppState {
    pub dataset: DatasetState,
    pub selection: Mutex<SelectionState>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            dataset: DatasetState::new(),
            selection: Mutex::new(SelectionState::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
