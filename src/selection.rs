//! Selection state machine for the dashboard's product-analysis view.
//!
//! NoBranch -> BranchSelected -> ProductSelected. Menus are
//! branch-specific, so picking a branch always resets any previously
//! selected product. The machine is a pure type; the command adapter
//! owns the single mutable instance and re-runs the pipeline after
//! each applied event.

use serde::Serialize;

use crate::error::AnalysisError;
use crate::product_analysis::SortKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Selection {
    NoBranch,
    BranchSelected { branch: String },
    ProductSelected { branch: String, menu: String },
}

/// The adapter-owned UI selection: where the user is in the state
/// machine, plus the current sort key and result-count limit.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    selection: Selection,
    sort_key: SortKey,
    /// `None` means unbounded ("show all").
    limit: Option<usize>,
}

/// Default result count for the Top Performers table.
pub const DEFAULT_LIMIT: usize = 10;

impl SelectionState {
    pub fn new() -> Self {
        SelectionState {
            selection: Selection::NoBranch,
            sort_key: SortKey::default(),
            limit: Some(DEFAULT_LIMIT),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// The active branch, if any.
    pub fn branch(&self) -> Option<&str> {
        match &self.selection {
            Selection::NoBranch => None,
            Selection::BranchSelected { branch } | Selection::ProductSelected { branch, .. } => {
                Some(branch)
            }
        }
    }

    /// The selected product, if any.
    pub fn menu(&self) -> Option<&str> {
        match &self.selection {
            Selection::ProductSelected { menu, .. } => Some(menu),
            _ => None,
        }
    }

    /// Apply a branch selection. An empty/unset branch returns to
    /// NoBranch from any state; any real branch moves to
    /// BranchSelected, discarding a selected product even when the
    /// branch is re-selected unchanged.
    pub fn select_branch(&mut self, branch: Option<&str>) {
        let branch = branch.map(str::trim).filter(|b| !b.is_empty());
        self.selection = match branch {
            None => Selection::NoBranch,
            Some(branch) => Selection::BranchSelected {
                branch: branch.to_string(),
            },
        };
    }

    /// Select a product within the active branch. Requires a branch
    /// to be selected first.
    pub fn select_product(&mut self, menu: &str) -> Result<(), AnalysisError> {
        let menu = menu.trim();
        let branch = match self.branch() {
            Some(branch) => branch.to_string(),
            None => return Err(AnalysisError::NoBranchSelected),
        };
        if menu.is_empty() {
            // Clearing the product keeps the branch selection.
            self.selection = Selection::BranchSelected { branch };
        } else {
            self.selection = Selection::ProductSelected {
                branch,
                menu: menu.to_string(),
            };
        }
        Ok(())
    }

    /// Change the sort key. A no-op transition: it only takes effect
    /// (returns `true`) when a branch is already selected.
    pub fn set_sort_key(&mut self, key: SortKey) -> bool {
        if self.branch().is_none() {
            return false;
        }
        self.sort_key = key;
        true
    }

    /// Change the result-count limit (`None` = unbounded). Same
    /// no-op-transition rule as the sort key.
    pub fn set_limit(&mut self, limit: Option<usize>) -> bool {
        if self.branch().is_none() {
            return false;
        }
        self.limit = limit;
        true
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_no_branch_and_defaults() {
        let state = SelectionState::new();
        assert_eq!(state.selection(), &Selection::NoBranch);
        assert_eq!(state.sort_key(), SortKey::Revenue);
        assert_eq!(state.limit(), Some(DEFAULT_LIMIT));
    }

    #[test]
    fn selecting_branch_then_product() {
        let mut state = SelectionState::new();
        state.select_branch(Some("Kemang"));
        assert_eq!(state.branch(), Some("Kemang"));
        assert_eq!(state.menu(), None);

        state.select_product("Sate Ayam").expect("branch is set");
        assert_eq!(state.menu(), Some("Sate Ayam"));
    }

    #[test]
    fn selecting_branch_resets_product() {
        let mut state = SelectionState::new();
        state.select_branch(Some("Kemang"));
        state.select_product("Sate Ayam").expect("branch is set");

        // Even re-selecting the same branch discards the product:
        // product identity is not meaningful across selections.
        state.select_branch(Some("Kemang"));
        assert_eq!(state.menu(), None);
        assert_eq!(state.branch(), Some("Kemang"));

        state.select_product("Sate Ayam").expect("branch is set");
        state.select_branch(Some("Senopati"));
        assert_eq!(state.menu(), None);
        assert_eq!(state.branch(), Some("Senopati"));
    }

    #[test]
    fn empty_branch_returns_to_no_branch_from_any_state() {
        let mut state = SelectionState::new();
        state.select_branch(Some("Kemang"));
        state.select_product("Sate Ayam").expect("branch is set");

        state.select_branch(Some(""));
        assert_eq!(state.selection(), &Selection::NoBranch);

        state.select_branch(Some("Kemang"));
        state.select_branch(None);
        assert_eq!(state.selection(), &Selection::NoBranch);
    }

    #[test]
    fn product_selection_requires_branch() {
        let mut state = SelectionState::new();
        assert_eq!(
            state.select_product("Sate Ayam").unwrap_err(),
            AnalysisError::NoBranchSelected
        );
    }

    #[test]
    fn clearing_product_keeps_branch() {
        let mut state = SelectionState::new();
        state.select_branch(Some("Kemang"));
        state.select_product("Sate Ayam").expect("branch is set");
        state.select_product("").expect("branch is set");
        assert_eq!(
            state.selection(),
            &Selection::BranchSelected {
                branch: "Kemang".to_string()
            }
        );
    }

    #[test]
    fn sort_and_limit_are_noops_without_a_branch() {
        let mut state = SelectionState::new();
        assert!(!state.set_sort_key(SortKey::Quantity));
        assert!(!state.set_limit(None));
        assert_eq!(state.sort_key(), SortKey::Revenue);
        assert_eq!(state.limit(), Some(DEFAULT_LIMIT));

        state.select_branch(Some("Kemang"));
        assert!(state.set_sort_key(SortKey::Quantity));
        assert!(state.set_limit(None));
        assert_eq!(state.sort_key(), SortKey::Quantity);
        assert_eq!(state.limit(), None);

        // Sort/limit changes do not disturb the selection itself.
        state.select_product("Sate Ayam").expect("branch is set");
        assert!(state.set_limit(Some(25)));
        assert_eq!(state.menu(), Some("Sate Ayam"));
    }
}
