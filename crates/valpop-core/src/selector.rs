//! Retrieval selector: one version per logical path.

use crate::index::GenerationIndex;
use crate::model::{GenerationId, RelativePath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which generation of a path gets exported when several are visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    /// Latest published version of each path.
    #[default]
    Newest,
    /// Earliest visible version of each path (historical `pop` behaviour).
    Oldest,
}

/// Pick exactly one generation for every path in the listing.
pub fn select(index: &GenerationIndex, rule: SelectionRule) -> BTreeMap<RelativePath, GenerationId> {
    index
        .generations_by_path()
        .into_iter()
        .filter_map(|(path, generations)| {
            // generations_by_path yields ascending lists
            let chosen = match rule {
                SelectionRule::Newest => generations.last(),
                SelectionRule::Oldest => generations.first(),
            };
            chosen.map(|g| (path.clone(), *g))
        })
        .collect()
}
