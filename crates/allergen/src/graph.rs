use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use allersafe_shared::allergen::CrossReactivityGroup;
use allersafe_shared::user::UserAllergy;

/// Set of allergen ids. Ordered so that logs and plan output are stable.
pub type AllergenSet = BTreeSet<String>;

/// Undirected cross-reactivity graph.
///
/// Nodes are allergen ids and two allergens share an edge when they appear in
/// the same [`CrossReactivityGroup`]. Group membership is many-to-many so the
/// graph has cycles; it is stored as an adjacency table and queried by
/// traversal.
///
/// Build it once per process and share it between requests: it is immutable
/// after construction.
#[derive(Debug, Clone, Default)]
pub struct AllergenGraph {
    adjacency: HashMap<String, HashSet<String>>,
    memberships: HashMap<String, Vec<String>>,
    edge_count: usize,
}

impl AllergenGraph {
    pub fn from_groups<'a>(groups: impl IntoIterator<Item = &'a CrossReactivityGroup>) -> Self {
        let mut graph = AllergenGraph::default();

        for group in groups {
            let members = group
                .allergen_ids
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty())
                .collect::<BTreeSet<_>>();

            for member in members.iter() {
                graph
                    .memberships
                    .entry(member.to_string())
                    .or_default()
                    .push(group.id.to_owned());

                graph.adjacency.entry(member.to_string()).or_default();
            }

            for (i, a) in members.iter().enumerate() {
                for b in members.iter().skip(i + 1) {
                    graph.connect(a, b);
                }
            }
        }

        tracing::debug!(
            allergens = graph.adjacency.len(),
            edges = graph.edge_count,
            "allergen graph built"
        );

        graph
    }

    fn connect(&mut self, a: &str, b: &str) {
        let inserted = self
            .adjacency
            .entry(a.to_owned())
            .or_default()
            .insert(b.to_owned());

        self.adjacency
            .entry(b.to_owned())
            .or_default()
            .insert(a.to_owned());

        if inserted {
            self.edge_count += 1;
        }
    }

    /// Every allergen reachable from `allergies` through one or more
    /// cross-reactivity edges, plus the originals.
    ///
    /// Multi-source breadth-first traversal, O(allergens + edges). Allergens
    /// unknown to the graph resolve to themselves.
    pub fn resolve_exclusion_set(&self, allergies: &AllergenSet) -> AllergenSet {
        let mut visited = HashSet::with_capacity(allergies.len());
        let mut queue = VecDeque::with_capacity(allergies.len());

        for allergen in allergies {
            if visited.insert(allergen.as_str()) {
                queue.push_back(allergen.as_str());
            }
        }

        while let Some(current) = queue.pop_front() {
            let Some(neighbours) = self.adjacency.get(current) else {
                continue;
            };

            for neighbour in neighbours {
                if visited.insert(neighbour.as_str()) {
                    queue.push_back(neighbour.as_str());
                }
            }
        }

        visited.into_iter().map(str::to_owned).collect()
    }

    /// Exclusion set for a stored allergy profile plus request-scoped
    /// exclusions. Outgrown allergies are ignored.
    pub fn resolve_for_user<'a>(
        &self,
        allergies: &[UserAllergy],
        extra: impl IntoIterator<Item = &'a String>,
    ) -> AllergenSet {
        let direct = allergies
            .iter()
            .filter(|a| a.is_active())
            .map(|a| a.allergen_id.to_owned())
            .chain(extra.into_iter().cloned())
            .collect::<AllergenSet>();

        self.resolve_exclusion_set(&direct)
    }

    /// Allergens sharing at least one group with `allergen_id`.
    pub fn cross_reactive_with(&self, allergen_id: &str) -> AllergenSet {
        self.adjacency
            .get(allergen_id)
            .map(|n| n.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn groups_of(&self, allergen_id: &str) -> &[String] {
        self.memberships
            .get(allergen_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, allergen_id: &str) -> bool {
        self.adjacency.contains_key(allergen_id)
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}
