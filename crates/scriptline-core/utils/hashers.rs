//! ahash-backed collections used by the override snapshot
//!
//! Lookups happen once per normalized line, so the classifier uses ahash
//! for consistent performance across platforms including WASM.

use ahash::RandomState;
use std::collections::{HashMap, HashSet};

/// Create a new `HashMap` with the ahash hasher
///
/// # Example
///
/// ```rust
/// use scriptline_core::utils::create_hash_map;
///
/// let mut map = create_hash_map::<String, i32>();
/// map.insert("key".to_string(), 42);
/// ```
#[must_use]
pub fn create_hash_map<K, V>() -> HashMap<K, V, RandomState> {
    HashMap::with_hasher(RandomState::new())
}

/// Create a new `HashSet` with the ahash hasher
#[must_use]
pub fn create_hash_set<T>() -> HashSet<T, RandomState> {
    HashSet::with_hasher(RandomState::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_behave_like_std() {
        let mut map = create_hash_map::<&str, u8>();
        map.insert("a", 1);
        assert_eq!(map.get("a"), Some(&1));

        let mut set = create_hash_set::<String>();
        assert!(set.insert("x".to_string()));
        assert!(!set.insert("x".to_string()));
    }
}
