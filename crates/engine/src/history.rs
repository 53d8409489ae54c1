//! Undo/Redo history built from dispatch patch sets

use crate::patch::{Patch, PatchSet};

/// Receives the diff of every recorded dispatch.
pub trait UndoSink {
    /// Record a new undo step.
    fn add_undo_patch(&mut self, patches: PatchSet);

    /// Fold a follow-up diff into the most recent undo step.
    /// Without `inverse_patches` the step keeps its existing inverse.
    fn replace_undo_patch(&mut self, patches: Vec<Patch>, inverse_patches: Option<Vec<Patch>>);
}

/// Bounded undo/redo stacks.
#[derive(Clone, Debug)]
pub struct History {
    undo_stack: Vec<PatchSet>,
    redo_stack: Vec<PatchSet>,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_max_entries(100)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn push(&mut self, entry: PatchSet) {
        if entry.is_empty() {
            return;
        }
        self.undo_stack.push(entry);
        self.redo_stack.clear();

        // Limit history size
        if self.undo_stack.len() > self.max_entries {
            self.undo_stack.remove(0);
        }
    }

    /// Merge into the last entry: forward patches run after it, inverse
    /// patches run before it.
    pub fn replace(&mut self, patches: Vec<Patch>, inverse_patches: Option<Vec<Patch>>) {
        match self.undo_stack.last_mut() {
            Some(last) => {
                last.patches.extend(patches);
                if let Some(mut inverse) = inverse_patches {
                    inverse.append(&mut last.inverse_patches);
                    last.inverse_patches = inverse;
                }
            }
            None => self.push(PatchSet {
                patches,
                inverse_patches: inverse_patches.unwrap_or_default(),
            }),
        }
    }

    /// Pop the last entry for undo, returns the patches to apply
    pub fn undo(&mut self) -> Option<Vec<Patch>> {
        let entry = self.undo_stack.pop()?;
        let patches = entry.inverse_patches.clone();
        self.redo_stack.push(entry);
        Some(patches)
    }

    /// Pop from redo stack, returns the patches to apply
    pub fn redo(&mut self) -> Option<Vec<Patch>> {
        let entry = self.redo_stack.pop()?;
        let patches = entry.patches.clone();
        self.undo_stack.push(entry);
        Some(patches)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn last(&self) -> Option<&PatchSet> {
        self.undo_stack.last()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl UndoSink for History {
    fn add_undo_patch(&mut self, patches: PatchSet) {
        self.push(patches);
    }

    fn replace_undo_patch(&mut self, patches: Vec<Patch>, inverse_patches: Option<Vec<Patch>>) {
        self.replace(patches, inverse_patches);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::SheetId;

    fn select(id: &str) -> Patch {
        Patch::SelectedSheet { id: Some(SheetId::new(id)) }
    }

    fn entry(forward: &str, inverse: &str) -> PatchSet {
        PatchSet {
            patches: vec![select(forward)],
            inverse_patches: vec![select(inverse)],
        }
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = History::new();
        history.push(entry("b", "a"));
        assert!(history.can_undo());
        assert!(!history.can_redo());

        assert_eq!(history.undo(), Some(vec![select("a")]));
        assert!(history.can_redo());
        assert_eq!(history.redo(), Some(vec![select("b")]));
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new();
        history.push(entry("b", "a"));
        history.undo();
        history.push(entry("c", "a"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_max_entries() {
        let mut history = History::with_max_entries(2);
        history.push(entry("b", "a"));
        history.push(entry("c", "b"));
        history.push(entry("d", "c"));
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.undo(), Some(vec![select("c")]));
        assert_eq!(history.undo(), Some(vec![select("b")]));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_replace_folds_into_last_entry() {
        let mut history = History::new();
        history.push(entry("b", "a"));
        history.replace(vec![select("c")], Some(vec![select("b")]));

        let last = history.last().unwrap();
        assert_eq!(last.patches, vec![select("b"), select("c")]);
        assert_eq!(last.inverse_patches, vec![select("b"), select("a")]);
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_replace_without_inverse_keeps_existing() {
        let mut history = History::new();
        history.push(entry("b", "a"));
        history.replace(vec![select("c")], None);
        assert_eq!(history.last().unwrap().inverse_patches, vec![select("a")]);
    }

    #[test]
    fn test_replace_on_empty_history_pushes() {
        let mut history = History::new();
        history.replace(vec![select("b")], Some(vec![select("a")]));
        assert_eq!(history.undo(), Some(vec![select("a")]));
    }

    #[test]
    fn test_empty_entries_are_ignored() {
        let mut history = History::new();
        history.push(PatchSet::default());
        assert!(!history.can_undo());
    }
}
