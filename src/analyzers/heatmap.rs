use std::collections::{BTreeMap, HashSet};

use crate::classify::add_ratio;
use crate::types::{FileChangeCounts, FileChangeRecord, FileHeat, FileTreeNode};

/// Files kept in the sunburst tree.
pub const TREE_FILE_LIMIT: usize = 50;
/// Deeper paths are folded into their fourth segment.
pub const TREE_MAX_DEPTH: usize = 4;

/// Per-file churn and touch counts.
///
/// Only rows whose hash is in `kept_hashes` are aggregated. Rows belonging to
/// a commit in `known_hashes` that was filtered out are counted as automated;
/// rows matching no commit at all are counted as orphaned.
pub fn analyze_file_heat(
    changes: &[FileChangeRecord],
    kept_hashes: &HashSet<&str>,
    known_hashes: &HashSet<&str>,
) -> (Vec<FileHeat>, FileChangeCounts) {
    // path → (distinct commits, insertions, deletions)
    let mut per_file: BTreeMap<&str, (HashSet<&str>, u64, u64)> = BTreeMap::new();
    let mut counts = FileChangeCounts::default();

    for change in changes {
        let hash = change.hash.as_str();
        if !kept_hashes.contains(hash) {
            if known_hashes.contains(hash) {
                counts.automated += 1;
            } else {
                counts.orphaned += 1;
            }
            continue;
        }
        counts.counted += 1;
        let entry = per_file.entry(change.filepath.as_str()).or_default();
        entry.0.insert(hash);
        entry.1 += change.insertions;
        entry.2 += change.deletions;
    }

    let mut heat: Vec<FileHeat> = per_file
        .into_iter()
        .map(|(path, (hashes, insertions, deletions))| FileHeat {
            path: path.to_string(),
            touches: hashes.len(),
            insertions,
            deletions,
            churn: insertions + deletions,
            add_ratio: add_ratio(insertions, deletions),
        })
        .collect();

    heat.sort_by(|a, b| {
        b.touches
            .cmp(&a.touches)
            .then_with(|| b.churn.cmp(&a.churn))
            .then_with(|| a.path.cmp(&b.path))
    });
    (heat, counts)
}

#[derive(Default)]
struct TreeBuilder {
    value: usize,
    children: BTreeMap<String, TreeBuilder>,
}

impl TreeBuilder {
    fn into_nodes(self) -> Vec<FileTreeNode> {
        let mut nodes: Vec<FileTreeNode> = self
            .children
            .into_iter()
            .map(|(name, child)| FileTreeNode {
                name,
                value: child.value,
                children: child.into_nodes(),
            })
            .collect();
        nodes.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
        nodes
    }
}

/// Directory tree of the most-touched files. Each node's value is the sum of
/// touches of the files beneath it. Expects `heat` sorted hottest first.
pub fn build_file_tree(heat: &[FileHeat], limit: usize, max_depth: usize) -> Vec<FileTreeNode> {
    let mut root = TreeBuilder::default();
    for file in heat.iter().take(limit) {
        let normalized = file.path.replace('\\', "/");
        let mut parts: Vec<String> = normalized.split('/').map(str::to_string).collect();
        if max_depth > 0 && parts.len() > max_depth {
            let tail = parts.split_off(max_depth - 1).join("/");
            parts.push(tail);
        }

        let mut node = &mut root;
        for part in parts {
            node = node.children.entry(part).or_default();
            node.value += file.touches;
        }
    }
    root.into_nodes()
}
