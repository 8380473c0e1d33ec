//! Path selector: a small navigation grammar over the deck tree.
//!
//! A location string is `/`-delimited. Each segment maps the current
//! frontier of nodes to the next one:
//!
//! - `.` keeps the frontier unchanged
//! - `..` moves to parents (branches at the root drop)
//! - `{TypeName}` fans out to all direct children of that schema type
//! - any other segment is a direct-child lookup by name
//!
//! A leading `/` starts at the tree root instead of the current node.
//! Empty segments are skipped, so `"../../"` and `"../.."` are the same
//! location. The result keeps deterministic left-to-right declaration
//! order and may be empty.

use crate::node::{Deck, NodeId};

impl Deck {
    /// Evaluate `location` against the frontier `[from]`.
    ///
    /// ```rust
    /// # use simdeck_db::Deck;
    /// # use simdeck_schema::{NodeSpec, SchemaRegistry};
    /// # let mut registry = SchemaRegistry::new();
    /// # registry.insert("Run", NodeSpec::new().with_child("Process", "Process"));
    /// # registry.insert("Process", NodeSpec::new().with_child("Topology", "Topology"));
    /// # registry.insert("Topology", NodeSpec::new());
    /// let deck = Deck::new(&registry, "Run").unwrap();
    /// let topology = deck.select(deck.root(), "Process/Topology")[0];
    /// assert_eq!(deck.select(topology, "../.."), vec![deck.root()]);
    /// assert_eq!(deck.select(topology, "/Process"), deck.select(deck.root(), "Process"));
    /// ```
    pub fn select(&self, from: NodeId, location: &str) -> Vec<NodeId> {
        let start = if location.starts_with('/') {
            self.root()
        } else {
            from
        };

        let mut frontier = vec![start];
        for segment in location.split('/') {
            if segment.is_empty() {
                continue;
            }

            let current = std::mem::take(&mut frontier);
            match segment {
                "." => frontier = current,
                ".." => {
                    frontier = current
                        .into_iter()
                        .filter_map(|id| self.node(id).parent())
                        .collect();
                }
                _ if segment.starts_with('{') && segment.ends_with('}') => {
                    let type_name = &segment[1..segment.len() - 1];
                    for id in current {
                        frontier.extend(self.children_of_type(id, type_name));
                    }
                }
                name => {
                    for id in current {
                        frontier.extend(self.child(id, name));
                    }
                }
            }
        }
        frontier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DeckContext;
    use simdeck_schema::{Decorator, LeafSpec, NodeSpec, SchemaRegistry, Value};

    fn deck() -> Deck {
        let mut registry = SchemaRegistry::new();
        registry.insert(
            "Run",
            NodeSpec::new()
                .with_child("Process", "Process")
                .with_child("Geom", "GeomContainer"),
        );
        registry.insert("Process", NodeSpec::new().with_child("Topology", "Topology"));
        registry.insert("Topology", NodeSpec::new());
        registry.insert(
            "GeomContainer",
            NodeSpec::new().with_leaf(
                "Names",
                LeafSpec::new()
                    .with_decorator(Decorator::SplitToList)
                    .with_decorator(Decorator::SpawnChildren {
                        node_type: "GeomItem".to_string(),
                        location: ".".to_string(),
                    }),
            ),
        );
        registry.insert("GeomItem", NodeSpec::new());
        Deck::new(&registry, "Run").unwrap()
    }

    #[test]
    fn test_identity_and_parent() {
        let deck = deck();
        let topology = deck.select(deck.root(), "Process/Topology")[0];
        assert_eq!(deck.select(topology, "."), vec![topology]);

        let process = deck.child(deck.root(), "Process").unwrap();
        assert_eq!(deck.select(topology, ".."), vec![process]);
        assert_eq!(deck.select(topology, "../../"), vec![deck.root()]);
    }

    #[test]
    fn test_past_root_yields_nothing() {
        let deck = deck();
        assert!(deck.select(deck.root(), "..").is_empty());
        let topology = deck.select(deck.root(), "Process/Topology")[0];
        assert!(deck.select(topology, "../../../..").is_empty());
    }

    #[test]
    fn test_leading_slash_starts_at_root() {
        let deck = deck();
        let topology = deck.select(deck.root(), "Process/Topology")[0];
        assert_eq!(
            deck.select(topology, "/Process"),
            vec![deck.child(deck.root(), "Process").unwrap()]
        );
    }

    #[test]
    fn test_absent_name_drops_branch() {
        let deck = deck();
        assert!(deck.select(deck.root(), "Process/Nope").is_empty());
        assert!(deck.select(deck.root(), "Nope/Topology").is_empty());
    }

    #[test]
    fn test_type_selection_in_declaration_order() {
        let mut deck = deck();
        let ctx = DeckContext::default();
        let geom = deck.child(deck.root(), "Geom").unwrap();
        deck.set(geom, "Names", Value::from("a b c"), &ctx).unwrap();

        let items = deck.select(deck.root(), "Geom/{GeomItem}");
        let names: Vec<&str> = items.iter().map(|id| deck.node(*id).name()).collect();
        assert_eq!(names, ["a", "b", "c"]);

        assert!(deck.select(deck.root(), "Geom/{Topology}").is_empty());
    }

    #[test]
    fn test_type_selection_flattens_across_frontier() {
        let mut deck = deck();
        let ctx = DeckContext::default();
        let geom = deck.child(deck.root(), "Geom").unwrap();
        deck.set(geom, "Names", Value::from("a b"), &ctx).unwrap();

        // Frontier of two GeomItems, each mapped to its parent, flattened.
        let parents = deck.select(deck.root(), "Geom/{GeomItem}/..");
        assert_eq!(parents, vec![geom, geom]);
    }
}
