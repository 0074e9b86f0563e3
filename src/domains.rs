//! Per-slot candidate sets with an undo trail for backtracking.
//!
//! Arc-consistency pruning is destructive, so the search needs a way to put
//! removed words back when it abandons a branch. Every removal lands on a
//! trail; [`Domains::mark`] records a trail position and
//! [`Domains::undo_to`] rewinds removals back to it, restoring exactly the
//! words pruned since the mark. An undo log is much cheaper than cloning
//! every candidate set per search node.
//!
//! Words are `Rc<str>` so the same allocation is shared by every domain, the
//! assignment, and the trail.

use std::collections::HashSet;
use std::rc::Rc;

use crate::puzzle::VarId;

/// The candidate words still considered legal for each slot.
#[derive(Debug, Clone)]
pub struct Domains {
    sets: Vec<HashSet<Rc<str>>>,
    /// Removals since construction, oldest first.
    trail: Vec<(VarId, Rc<str>)>,
}

impl Domains {
    /// One copy of the full vocabulary per slot.
    pub(crate) fn new(var_count: usize, vocabulary: HashSet<Rc<str>>) -> Domains {
        Domains { sets: vec![vocabulary; var_count], trail: Vec::new() }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// The current candidate set for a slot.
    pub fn candidates(&self, var: VarId) -> &HashSet<Rc<str>> {
        &self.sets[var]
    }

    /// Current domain size of a slot.
    pub fn size(&self, var: VarId) -> usize {
        self.sets[var].len()
    }

    /// Remove `word` from `var`'s candidates, recording the removal on the
    /// trail. Returns whether the word was present.
    pub(crate) fn remove(&mut self, var: VarId, word: &Rc<str>) -> bool {
        if let Some(word) = self.sets[var].take(word) {
            self.trail.push((var, word));
            true
        } else {
            false
        }
    }

    /// Keep only the words satisfying `pred`; removals land on the trail.
    pub(crate) fn retain<F: Fn(&str) -> bool>(&mut self, var: VarId, pred: F) {
        let doomed: Vec<Rc<str>> =
            self.sets[var].iter().filter(|word| !pred(word)).cloned().collect();
        for word in &doomed {
            self.remove(var, word);
        }
    }

    /// Shrink `var`'s candidates to the single chosen word.
    pub(crate) fn assign(&mut self, var: VarId, word: &Rc<str>) {
        let chosen = Rc::clone(word);
        self.retain(var, move |w| w == chosen.as_ref());
    }

    /// Trail position marking the current state; pass to [`Domains::undo_to`].
    pub(crate) fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Put back every word removed since `mark` was taken.
    pub(crate) fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let Some((var, word)) = self.trail.pop() else { break };
            self.sets[var].insert(word);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains_of(words: &[&str], var_count: usize) -> Domains {
        let vocabulary: HashSet<Rc<str>> = words.iter().map(|&w| Rc::from(w)).collect();
        Domains::new(var_count, vocabulary)
    }

    #[test]
    fn test_new_copies_vocabulary_per_slot() {
        let domains = domains_of(&["CAT", "DOG"], 3);
        assert_eq!(domains.len(), 3);
        for var in 0..3 {
            assert_eq!(domains.size(var), 2);
        }
    }

    #[test]
    fn test_remove_and_undo_roundtrip() {
        let mut domains = domains_of(&["CAT", "DOG", "EEL"], 2);
        let mark = domains.mark();

        let cat: Rc<str> = Rc::from("CAT");
        assert!(domains.remove(0, &cat));
        assert!(!domains.remove(0, &cat));
        assert_eq!(domains.size(0), 2);
        assert_eq!(domains.size(1), 3);

        domains.undo_to(mark);
        assert_eq!(domains.size(0), 3);
        assert!(domains.candidates(0).contains("CAT"));
    }

    #[test]
    fn test_retain_records_removals() {
        let mut domains = domains_of(&["AB", "ABC", "ABCD"], 1);
        let mark = domains.mark();

        domains.retain(0, |w| w.len() == 3);
        assert_eq!(domains.size(0), 1);
        assert!(domains.candidates(0).contains("ABC"));

        domains.undo_to(mark);
        assert_eq!(domains.size(0), 3);
    }

    #[test]
    fn test_assign_shrinks_to_one() {
        let mut domains = domains_of(&["CAT", "DOG", "EEL"], 1);
        let dog: Rc<str> = Rc::from("DOG");

        let mark = domains.mark();
        domains.assign(0, &dog);
        assert_eq!(domains.size(0), 1);
        assert!(domains.candidates(0).contains("DOG"));

        domains.undo_to(mark);
        assert_eq!(domains.size(0), 3);
    }

    #[test]
    fn test_nested_marks_rewind_independently() {
        let mut domains = domains_of(&["A1", "B2", "C3"], 1);

        let outer = domains.mark();
        domains.remove(0, &Rc::from("A1"));
        let inner = domains.mark();
        domains.remove(0, &Rc::from("B2"));

        domains.undo_to(inner);
        assert_eq!(domains.size(0), 2);
        domains.undo_to(outer);
        assert_eq!(domains.size(0), 3);
    }
}
