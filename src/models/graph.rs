//! Disjoint-set structure used for connected-component analysis.
//!
//! Entity IDs are interned to dense indices so the forest itself is a pair of
//! vectors. Components are reported in first-insertion order, which keeps the
//! output stable when callers insert from an ordered map.

use std::collections::HashMap;

/// Union-Find (Disjoint Set Union) over entity IDs.
///
/// Uses path halving and union by rank. Time complexity: O(α(n)) per operation.
#[derive(Debug, Clone, Default)]
pub struct UnionFind {
    /// Interned ID -> index
    index: HashMap<String, usize>,

    /// Index -> ID, in insertion order
    ids: Vec<String>,

    /// Parent pointer per index
    parent: Vec<usize>,

    /// Approximate tree height per root
    rank: Vec<u8>,
}

impl UnionFind {
    /// Create a new empty Union-Find structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a structure with every ID in its own set.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut uf = Self::new();
        for id in ids {
            uf.make_set(id);
        }
        uf
    }

    /// Add a new element. Adding an existing element is a no-op.
    pub fn make_set(&mut self, id: impl Into<String>) {
        let id = id.into();
        if self.index.contains_key(&id) {
            return;
        }
        let idx = self.ids.len();
        self.index.insert(id.clone(), idx);
        self.ids.push(id);
        self.parent.push(idx);
        self.rank.push(0);
    }

    fn root(&mut self, mut idx: usize) -> usize {
        while self.parent[idx] != idx {
            // Path halving
            self.parent[idx] = self.parent[self.parent[idx]];
            idx = self.parent[idx];
        }
        idx
    }

    /// Find the representative of the set containing `id`.
    ///
    /// Returns `None` if the element was never added.
    pub fn find(&mut self, id: &str) -> Option<&str> {
        let idx = *self.index.get(id)?;
        let root = self.root(idx);
        Some(&self.ids[root])
    }

    /// Union the sets containing `a` and `b`.
    ///
    /// Returns `true` if two distinct sets were merged. Unknown elements are
    /// ignored, which is how dangling relationship endpoints drop out.
    pub fn union(&mut self, a: &str, b: &str) -> bool {
        let (Some(&ia), Some(&ib)) = (self.index.get(a), self.index.get(b)) else {
            return false;
        };
        let ra = self.root(ia);
        let rb = self.root(ib);
        if ra == rb {
            return false;
        }

        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        true
    }

    /// Check if `a` and `b` are in the same set. Unknown elements are never connected.
    pub fn connected(&mut self, a: &str, b: &str) -> bool {
        let (Some(&ia), Some(&ib)) = (self.index.get(a), self.index.get(b)) else {
            return false;
        };
        self.root(ia) == self.root(ib)
    }

    /// All sets, each listing its members in insertion order.
    ///
    /// Sets are ordered by the insertion position of their first member.
    pub fn components(&mut self) -> Vec<Vec<String>> {
        let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
        let mut components: Vec<Vec<String>> = Vec::new();

        for idx in 0..self.ids.len() {
            let root = self.root(idx);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(self.ids[idx].clone());
        }

        components
    }

    /// Number of distinct sets.
    pub fn num_components(&mut self) -> usize {
        (0..self.ids.len())
            .filter(|&idx| self.root(idx) == idx)
            .count()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the structure is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
