//! Partial assignment of words to slots.

use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::puzzle::VarId;

/// Maps each slot to its tentatively chosen word.
///
/// Uses array-based storage indexed by [`VarId`] instead of a `HashMap`,
/// since slot ids are small and dense, and `Rc<str>` values to avoid string
/// cloning in the search's hot path. Grows as the search commits choices and
/// shrinks as it backtracks; complete when every slot has an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    slots: Vec<Option<Rc<str>>>,
    assigned: usize,
}

impl Assignment {
    /// An empty assignment over `var_count` slots.
    #[must_use]
    pub fn new(var_count: usize) -> Assignment {
        Assignment { slots: vec![None; var_count], assigned: 0 }
    }

    /// Tentatively bind `var` to `word`, replacing any previous binding.
    pub fn set(&mut self, var: VarId, word: Rc<str>) {
        if self.slots[var].is_none() {
            self.assigned += 1;
        }
        self.slots[var] = Some(word);
    }

    /// Undo the binding for `var`, if any.
    pub fn unset(&mut self, var: VarId) {
        if self.slots[var].take().is_some() {
            self.assigned -= 1;
        }
    }

    /// The word bound to `var`, if any.
    #[must_use]
    pub fn get(&self, var: VarId) -> Option<&Rc<str>> {
        self.slots[var].as_ref()
    }

    /// Whether `var` currently has a binding.
    #[must_use]
    pub fn contains(&self, var: VarId) -> bool {
        self.slots[var].is_some()
    }

    /// Number of bound slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned == 0
    }

    /// Whether every slot has a binding.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.assigned == self.slots.len()
    }

    /// Total number of slots, bound or not.
    #[must_use]
    pub fn var_count(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over the bound (slot id, word) pairs in slot-id order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Rc<str>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(var, slot)| slot.as_ref().map(|word| (var, word)))
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(var, word)| format!("{var}→{word}")).collect();
        write!(f, "[{}]", pairs.join(", "))
    }
}
