//! Generation index and the visibility-source seam.
//!
//! A [`GenerationIndex`] is the listing every downstream component works
//! from: the retention engine, the garbage collector and the retrieval
//! selector. It only ever holds *visible* generations; how visibility is
//! decided (lock keys, manifest objects) is the business of the
//! [`GenerationSource`] implementation.

use crate::errors::Result;
use crate::model::{GenerationId, ItemKey, Namespace, RelativePath};
use std::collections::{BTreeMap, BTreeSet};

/// Source of visible generations for a namespace.
pub trait GenerationSource {
    /// List the complete, visible generations of `namespace`.
    ///
    /// Generations whose publish has not finished must never appear.
    fn list_generations(&self, namespace: &Namespace) -> Result<GenerationIndex>;
}

impl<T: GenerationSource + ?Sized> GenerationSource for Box<T> {
    fn list_generations(&self, namespace: &Namespace) -> Result<GenerationIndex> {
        (**self).list_generations(namespace)
    }
}

/// Ordered set of visible generations with the paths each one holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationIndex {
    namespace: Namespace,
    generations: BTreeMap<GenerationId, BTreeSet<RelativePath>>,
}

impl GenerationIndex {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            generations: BTreeMap::new(),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Record that `path` is present in `generation`.
    pub fn insert(&mut self, generation: GenerationId, path: RelativePath) {
        self.generations.entry(generation).or_default().insert(path);
    }

    /// Record a whole generation at once (manifest-backed listings).
    ///
    /// An empty path set still registers the generation.
    pub fn insert_generation(&mut self, generation: GenerationId, paths: BTreeSet<RelativePath>) {
        self.generations.entry(generation).or_default().extend(paths);
    }

    pub fn paths(&self, generation: GenerationId) -> Option<&BTreeSet<RelativePath>> {
        self.generations.get(&generation)
    }

    pub fn contains(&self, generation: GenerationId) -> bool {
        self.generations.contains_key(&generation)
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    /// Generations in ascending order (oldest first).
    pub fn generations(&self) -> impl DoubleEndedIterator<Item = GenerationId> + '_ {
        self.generations.keys().copied()
    }

    /// Generations with their paths, newest first.
    pub fn newest_first(
        &self,
    ) -> impl Iterator<Item = (GenerationId, &BTreeSet<RelativePath>)> + '_ {
        self.generations.iter().rev().map(|(g, p)| (*g, p))
    }

    /// Invert the index: every path with the generations that hold it,
    /// ascending.
    pub fn generations_by_path(&self) -> BTreeMap<&RelativePath, Vec<GenerationId>> {
        let mut by_path: BTreeMap<&RelativePath, Vec<GenerationId>> = BTreeMap::new();
        for (generation, paths) in &self.generations {
            for path in paths {
                by_path.entry(path).or_default().push(*generation);
            }
        }
        by_path
    }

    /// Flatten into item keys, ordered by generation then path.
    pub fn items(&self) -> Vec<ItemKey> {
        self.generations
            .iter()
            .flat_map(|(generation, paths)| {
                paths.iter().map(move |path| {
                    ItemKey::new(self.namespace.clone(), path.clone(), *generation)
                })
            })
            .collect()
    }

    /// Total number of (path, generation) pairs.
    pub fn item_count(&self) -> usize {
        self.generations.values().map(BTreeSet::len).sum()
    }
}
