use std::collections::HashMap;
use std::collections::hash_map::Entry;
pub use string_cache::DefaultAtom as Atom;

/// Interns stimulus paths in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct PathInterner {
    positions: HashMap<Atom, usize>,
}

impl PathInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a path and return its first-seen position, plus whether it was new
    pub fn intern(&mut self, path: &str) -> (usize, bool) {
        let next = self.positions.len();
        match self.positions.entry(Atom::from(path)) {
            Entry::Occupied(seen) => (*seen.get(), false),
            Entry::Vacant(slot) => (*slot.insert(next), true),
        }
    }
}
