//! Deterministic key ordering for flat-map replay.
//!
//! Replaying a flat map in its given order can apply a leaf before the
//! sibling key that determines its existence (a name-list field that
//! spawns typed children). Sorting ascending by [`key_priority`] guarantees
//! that every `Name`-bearing key is applied first, and that short,
//! uppercase-led category keys are applied before deep leaf keys.

use crate::extract::FlatMap;

/// Sort key for a flat-map key, ascending.
///
/// Ordering rules, in precedence order:
/// 1. keys containing the substring `Name` sort strictly first;
/// 2. each dot-segment weighs 1 when it starts with an uppercase letter,
///    10 otherwise; the total weight (scaled by 100) is the primary rank;
/// 3. ties break by key length, then lexicographically.
pub fn key_priority(key: &str) -> (bool, u64, usize, String) {
    let weight: u64 = key
        .split('.')
        .map(|segment| {
            if segment.chars().next().is_some_and(|c| c.is_uppercase()) {
                1
            } else {
                10
            }
        })
        .sum();
    (!key.contains("Name"), weight * 100, key.len(), key.to_string())
}

impl FlatMap {
    /// Reorder the entries by ascending [`key_priority`].
    pub fn sorted_by_priority(self) -> FlatMap {
        let mut entries: Vec<_> = self.into_iter().collect();
        entries.sort_by_cached_key(|(key, _)| key_priority(key));
        entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simdeck_schema::Value;

    fn sorted_keys(keys: &[&str]) -> Vec<String> {
        let flat: FlatMap = keys
            .iter()
            .map(|k| (k.to_string(), Value::from(1i64)))
            .collect();
        flat.sorted_by_priority()
            .keys()
            .map(|k| k.to_string())
            .collect()
    }

    #[test]
    fn test_name_keys_sort_strictly_first() {
        let keys = sorted_keys(&[
            "Process.Topology.P",
            "GeomInput.Names",
            "A",
            "Geom.box1.FileName",
        ]);
        assert_eq!(
            keys,
            ["GeomInput.Names", "Geom.box1.FileName", "A", "Process.Topology.P"]
        );
    }

    #[test]
    fn test_uppercase_segments_outrank_lowercase() {
        // One lowercase segment outweighs many uppercase ones.
        let keys = sorted_keys(&["Geom.box1.Lower", "Geom.Box.Upper.Deep.Deeper"]);
        assert_eq!(keys, ["Geom.Box.Upper.Deep.Deeper", "Geom.box1.Lower"]);
    }

    #[test]
    fn test_shallow_keys_before_deep_keys() {
        let keys = sorted_keys(&["A.B.C", "A.B", "A"]);
        assert_eq!(keys, ["A", "A.B", "A.B.C"]);
    }

    #[test]
    fn test_ties_break_by_length_then_lexical() {
        // All three tie on weight and length, so the order is lexical.
        let keys = sorted_keys(&["BB.X", "A.YY", "A.XX"]);
        assert_eq!(keys, ["A.XX", "A.YY", "BB.X"]);
    }

    #[test]
    fn test_spawning_key_applies_before_dependent_leaves() {
        let keys = sorted_keys(&[
            "Process.Topology.Q.CellCount",
            "Process.Topology.Q.Name",
            "Process.Topology.P",
        ]);
        assert_eq!(keys[0], "Process.Topology.Q.Name");
    }
}
