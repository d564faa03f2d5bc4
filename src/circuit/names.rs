//! Unique name allocation for signals, function nodes, and ports.

use std::collections::{HashMap, HashSet};

/// Struct which hands out unique names within one namespace.
///
/// The first request for a name returns it unchanged;
/// later requests for the same name get a numeric suffix (`name_1`, `name_2`, ...).
#[derive(Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
    counters: HashMap<String, usize>
}
/// Base name used when a requested name is blank.
pub const FALLBACK_NAME: &str = "unnamed";

fn process(s: &str) -> &str {
    match s.trim() {
        "" => FALLBACK_NAME,
        s => s
    }
}
impl NameAllocator {
    /// Creates an empty allocator.
    pub fn new() -> Self {
        Default::default()
    }

    /// Checks whether a name has already been handed out.
    pub fn contains(&self, s: &str) -> bool {
        self.taken.contains(process(s))
    }

    /// Allocates a unique name derived from `s`.
    pub fn allocate(&mut self, s: &str) -> String {
        let base = process(s);
        let name = match self.taken.contains(base) {
            false => base.to_string(),
            true => {
                let ctr = self.counters.entry(base.to_string()).or_insert(0);
                loop {
                    *ctr += 1;
                    let candidate = format!("{base}_{ctr}");
                    if !self.taken.contains(&candidate) {
                        break candidate;
                    }
                }
            }
        };
        self.taken.insert(name.clone());
        name
    }
}
impl std::fmt::Debug for NameAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.taken.fmt(f)
    }
}
