//! Reading and writing trees as line-delimited node records.
//!
//! Each line holds one node as a JSON array:
//!
//! ```text
//! [is_internal, node_id, [[referenced_id, [x_low, x_high, y_low, y_high]], ...]]
//! ```
//!
//! `is_internal` is `0` for a leaf, whose entries reference objects, and `1` for an internal
//! node, whose entries reference child nodes. A node's own bounds are not stored; they are
//! recomputed from its entries. The root is not marked either: by convention it is the node
//! with the largest id, which holds for every tree built by
//! [`RTreeBuilder`][crate::rtree::RTreeBuilder] because the root is always created last.

use std::collections::btree_map::Entry as MapEntry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::error::{PackedRTreeError, Result};
use crate::r#type::IndexableNum;
use crate::rtree::index::{Node, RTree};
use crate::rtree::rect::Rect;

/// A rectangle as persisted: `[x_low, x_high, y_low, y_high]`.
pub type RecordRect<N> = [N; 4];

/// One persisted node: `(is_internal, node_id, entries)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "N: IndexableNum")]
pub struct NodeRecord<N: IndexableNum>(pub u8, pub u32, pub Vec<(u32, RecordRect<N>)>);

impl<N: IndexableNum> NodeRecord<N> {
    fn from_node(node: &Node<N>) -> Self {
        let entries = node
            .entries()
            .iter()
            .map(|entry| {
                let rect = &entry.rect;
                (
                    entry.target.id(),
                    [rect.min_x(), rect.max_x(), rect.min_y(), rect.max_y()],
                )
            })
            .collect();
        Self(node.is_internal() as u8, node.id(), entries)
    }

    /// Convert into a node, checking the record's shape. `line` is only used for errors.
    fn into_node(self, line: usize) -> Result<Node<N>> {
        let malformed =
            |reason: String| PackedRTreeError::MalformedPersistedRecord { line, reason };

        let Self(flag, node_id, entries) = self;
        let is_internal = match flag {
            0 => false,
            1 => true,
            other => {
                return Err(malformed(format!(
                    "is_internal flag must be 0 or 1, got {other}"
                )))
            }
        };
        if entries.is_empty() {
            return Err(malformed(format!("node {node_id} has no entries")));
        }

        let entries = entries
            .into_iter()
            .map(|(ref_id, [x_low, x_high, y_low, y_high])| -> Result<(u32, Rect<N>)> {
                let rect = Rect::try_new(x_low, y_low, x_high, y_high)
                    .map_err(|err| malformed(format!("entry {ref_id}: {err}")))?;
                Ok((ref_id, rect))
            })
            .collect::<Result<Vec<_>>>()?;

        Node::new(node_id, is_internal, entries).map_err(|err| malformed(err.to_string()))
    }
}

impl<N: IndexableNum> RTree<N> {
    /// The persisted records of every node, in ascending node id order.
    pub fn to_records(&self) -> Vec<NodeRecord<N>> {
        self.nodes().map(NodeRecord::from_node).collect()
    }

    /// Assemble a tree from persisted records.
    ///
    /// The root is the node with the largest id. It is an error for any entry to reference the
    /// root as a child, for a node to have more than one parent, or for a node to be unreachable
    /// from the root. Child references to missing nodes are not checked here; they fail the
    /// query that reaches them with [`PackedRTreeError::UnknownNodeReference`].
    pub fn from_records(records: impl IntoIterator<Item = NodeRecord<N>>) -> Result<Self> {
        Self::from_numbered_records(
            records
                .into_iter()
                .enumerate()
                .map(|(i, record)| (i + 1, record)),
        )
    }

    fn from_numbered_records(
        records: impl IntoIterator<Item = (usize, NodeRecord<N>)>,
    ) -> Result<Self> {
        let mut nodes = BTreeMap::new();
        let mut lines = HashMap::new();
        for (line, record) in records {
            let node = record.into_node(line)?;
            match nodes.entry(node.id()) {
                MapEntry::Occupied(_) => {
                    return Err(PackedRTreeError::MalformedPersistedRecord {
                        line,
                        reason: format!("duplicate node id {}", node.id()),
                    })
                }
                MapEntry::Vacant(slot) => {
                    lines.insert(node.id(), line);
                    slot.insert(node);
                }
            }
        }

        let root_id = match nodes.keys().next_back() {
            Some(root_id) => *root_id,
            None => return Err(PackedRTreeError::EmptyInput),
        };
        check_tree_shape(&nodes, &lines, root_id)?;

        log::debug!("Loaded {} node records, root {}", nodes.len(), root_id);
        Ok(RTree::from_parts(nodes, root_id))
    }

    /// Read a tree from line-delimited node records. Blank lines are skipped.
    pub fn read_records(reader: impl BufRead) -> Result<Self> {
        let mut records = vec![];
        for (i, line) in reader.lines().enumerate() {
            let line_number = i + 1;
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: NodeRecord<N> = serde_json::from_str(line).map_err(|err| {
                PackedRTreeError::MalformedPersistedRecord {
                    line: line_number,
                    reason: err.to_string(),
                }
            })?;
            records.push((line_number, record));
        }
        Self::from_numbered_records(records)
    }

    /// Write every node as one record per line, in ascending node id order.
    pub fn write_records(&self, mut writer: impl Write) -> Result<()> {
        for record in self.to_records() {
            serde_json::to_writer(&mut writer, &record).map_err(std::io::Error::from)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Check that the stored nodes form a single tree under `root_id`.
///
/// The root must not be referenced, every other stored node must be referenced by exactly one
/// internal entry, and every stored node must be reachable from the root. Together these rule
/// out cycles, so traversal always terminates. References to ids that are not stored are left
/// for queries to report.
fn check_tree_shape<N: IndexableNum>(
    nodes: &BTreeMap<u32, Node<N>>,
    lines: &HashMap<u32, usize>,
    root_id: u32,
) -> Result<()> {
    let line_of = |id: u32| lines.get(&id).copied().unwrap_or(0);

    let mut parents: HashMap<u32, u32> = HashMap::new();
    for node in nodes.values().filter(|node| node.is_internal()) {
        for entry in node.entries() {
            let child_id = entry.target.id();
            if child_id == root_id {
                return Err(PackedRTreeError::MalformedPersistedRecord {
                    line: line_of(node.id()),
                    reason: format!("node {root_id} has the largest id but is not the root"),
                });
            }
            if let Some(first_parent) = parents.insert(child_id, node.id()) {
                return Err(PackedRTreeError::MalformedPersistedRecord {
                    line: line_of(node.id()),
                    reason: format!(
                        "node {} is referenced by both node {} and node {}",
                        child_id,
                        first_parent,
                        node.id()
                    ),
                });
            }
        }
    }

    let mut reached = HashSet::new();
    let mut stack = vec![root_id];
    while let Some(node_id) = stack.pop() {
        let Some(node) = nodes.get(&node_id) else {
            continue;
        };
        if !reached.insert(node_id) {
            continue;
        }
        if node.is_internal() {
            stack.extend(node.entries().iter().map(|entry| entry.target.id()));
        }
    }
    if let Some(orphan) = nodes.keys().find(|id| !reached.contains(*id)) {
        return Err(PackedRTreeError::MalformedPersistedRecord {
            line: line_of(*orphan),
            reason: format!("node {orphan} is not reachable from root {root_id}"),
        });
    }
    Ok(())
}
