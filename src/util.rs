use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn stable_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Maps an id to a pair of values in [-1, 1] that never change between runs.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let hash = stable_hash(id);

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

pub fn format_count(value: usize, singular: &str, plural: &str) -> String {
    if value == 1 {
        format!("{value} {singular}")
    } else {
        format!("{value} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_repeatable_and_bounded() {
        let first = stable_pair("node-42");
        let second = stable_pair("node-42");
        assert_eq!(first, second);
        assert!((-1.0..=1.0).contains(&first.0));
        assert!((-1.0..=1.0).contains(&first.1));
    }

    #[test]
    fn stable_hash_separates_tuple_fields() {
        assert_ne!(stable_hash(&("ab", "c")), stable_hash(&("a", "bc")));
    }

    #[test]
    fn format_count_picks_plural() {
        assert_eq!(format_count(1, "edge", "edges"), "1 edge");
        assert_eq!(format_count(3, "edge", "edges"), "3 edges");
    }
}
