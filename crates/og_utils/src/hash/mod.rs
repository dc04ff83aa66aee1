//! Hash containers over *hashbrown* with *foldhash* hashing.
//!
//! The default state uses a fixed seed, so two maps built from the same
//! insertions iterate in the same order. Encoders rely on that to produce
//! byte-identical output.

// -----------------------------------------------------------------------------
// Modules

mod hasher;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::{FixedHashState, FixedHasher};
pub use hasher::{NoOpHashState, NoOpHasher};

/// A [`hashbrown::HashMap`] using [`FixedHashState`] by default.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`] by default.
pub type HashSet<T, S = FixedHashState> = hashbrown::HashSet<T, S>;

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{HashMap, HashSet};

    #[test]
    fn fixed_iteration_order() {
        let build = || {
            let mut map: HashMap<String, u32> = HashMap::default();
            for i in 0..64_u32 {
                map.insert(i.to_string(), i);
            }
            map.into_iter().collect::<Vec<_>>()
        };

        assert_eq!(build(), build());
    }

    #[test]
    fn set_basic() {
        let mut set: HashSet<&str> = HashSet::default();
        assert!(set.insert("a"));
        assert!(!set.insert("a"));
        assert!(set.contains("a"));
    }
}
