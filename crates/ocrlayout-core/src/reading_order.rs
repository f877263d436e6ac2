//! Reading order tree and index
//!
//! The reading order is a tree of ordered and unordered groups whose leaves
//! reference regions by id. Groups may themselves reference a region (a
//! container region whose sub-regions are the group's children).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Groups nested deeper than this are not visited
pub const MAX_READING_ORDER_DEPTH: usize = 64;

/// Id given to the root group created for pages without a reading order
pub const ROOT_GROUP_ID: &str = "ro_root";

/// Group of reading-order nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoGroup {
    pub id: String,
    /// Region this group stands for, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_ref: Option<String>,
    #[serde(default)]
    pub children: Vec<ReadingOrderNode>,
}

impl RoGroup {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            region_ref: None,
            children: Vec::new(),
        }
    }
}

/// Node of the reading order tree
///
/// `index` is the position within an enclosing ordered group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReadingOrderNode {
    RegionRef {
        region_ref: String,
        #[serde(default)]
        index: Option<u32>,
    },
    Ordered {
        group: RoGroup,
        #[serde(default)]
        index: Option<u32>,
    },
    Unordered {
        group: RoGroup,
        #[serde(default)]
        index: Option<u32>,
    },
}

impl ReadingOrderNode {
    /// Leaf reference to a region
    #[must_use]
    pub fn region(region_ref: impl Into<String>, index: Option<u32>) -> Self {
        Self::RegionRef {
            region_ref: region_ref.into(),
            index,
        }
    }

    /// Ordered group without children
    #[must_use]
    pub fn ordered(group: RoGroup) -> Self {
        Self::Ordered { group, index: None }
    }

    /// Unordered group without children
    #[must_use]
    pub fn unordered(group: RoGroup) -> Self {
        Self::Unordered { group, index: None }
    }

    /// Region referenced by this node
    #[must_use]
    pub fn region_ref(&self) -> Option<&str> {
        match self {
            Self::RegionRef { region_ref, .. } => Some(region_ref),
            Self::Ordered { group, .. } | Self::Unordered { group, .. } => {
                group.region_ref.as_deref()
            }
        }
    }

    #[must_use]
    pub const fn index(&self) -> Option<u32> {
        match self {
            Self::RegionRef { index, .. }
            | Self::Ordered { index, .. }
            | Self::Unordered { index, .. } => *index,
        }
    }

    fn set_index(&mut self, value: Option<u32>) {
        match self {
            Self::RegionRef { index, .. }
            | Self::Ordered { index, .. }
            | Self::Unordered { index, .. } => *index = value,
        }
    }

    #[must_use]
    pub const fn group(&self) -> Option<&RoGroup> {
        match self {
            Self::RegionRef { .. } => None,
            Self::Ordered { group, .. } | Self::Unordered { group, .. } => Some(group),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        matches!(self, Self::Ordered { .. })
    }

    /// Builder-style child append; leaves are returned unchanged
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        if let Self::Ordered { group, .. } | Self::Unordered { group, .. } = &mut self {
            group.children.push(child);
        }
        self
    }
}

/// Map every referenced region id to its node.
///
/// Leaves are recorded under their region reference, groups under theirs (if
/// set). Later duplicates replace earlier ones.
#[must_use]
pub fn index_reading_order(root: &ReadingOrderNode) -> FxHashMap<&str, &ReadingOrderNode> {
    let mut index = FxHashMap::default();
    collect_refs(root, 0, &mut index);
    index
}

fn collect_refs<'a>(
    node: &'a ReadingOrderNode,
    depth: usize,
    index: &mut FxHashMap<&'a str, &'a ReadingOrderNode>,
) {
    if depth > MAX_READING_ORDER_DEPTH {
        log::warn!(
            "Reading order nested deeper than {MAX_READING_ORDER_DEPTH} levels, skipping subtree"
        );
        return;
    }
    match node {
        ReadingOrderNode::RegionRef { region_ref, .. } => {
            index.insert(region_ref.as_str(), node);
        }
        ReadingOrderNode::Ordered { group, .. } | ReadingOrderNode::Unordered { group, .. } => {
            if let Some(region_ref) = &group.region_ref {
                index.insert(region_ref.as_str(), node);
            }
            for child in &group.children {
                collect_refs(child, depth + 1, index);
            }
        }
    }
}

/// Children of a group in traversal order.
///
/// Ordered groups sort by index with missing indices last (stable); unordered
/// groups keep document order. Leaves have no children.
#[must_use]
pub fn ordered_children(node: &ReadingOrderNode) -> Vec<&ReadingOrderNode> {
    match node {
        ReadingOrderNode::RegionRef { .. } => Vec::new(),
        ReadingOrderNode::Ordered { group, .. } => {
            let mut children: Vec<&ReadingOrderNode> = group.children.iter().collect();
            children.sort_by_key(|child| child.index().map_or((1, 0), |i| (0, i)));
            children
        }
        ReadingOrderNode::Unordered { group, .. } => group.children.iter().collect(),
    }
}

/// Every referenced region id in traversal order (a group before its children)
#[must_use]
pub fn region_refs_in_order(root: &ReadingOrderNode) -> Vec<&str> {
    let mut refs = Vec::new();
    flatten(root, 0, &mut refs);
    refs
}

fn flatten<'a>(node: &'a ReadingOrderNode, depth: usize, refs: &mut Vec<&'a str>) {
    if depth > MAX_READING_ORDER_DEPTH {
        return;
    }
    if let Some(region_ref) = node.region_ref() {
        refs.push(region_ref);
    }
    for child in ordered_children(node) {
        flatten(child, depth + 1, refs);
    }
}

/// Append a region reference to the root group, creating an ordered
/// [`ROOT_GROUP_ID`] group when there is none
pub fn append_region_ref(root: &mut Option<ReadingOrderNode>, region_id: &str) {
    let node = root.get_or_insert_with(|| {
        log::debug!("Creating reading order root group");
        ReadingOrderNode::ordered(RoGroup::new(ROOT_GROUP_ID))
    });

    if let ReadingOrderNode::RegionRef { .. } = node {
        // A bare leaf cannot hold siblings; lift it into an ordered root
        let mut leaf = std::mem::replace(node, ReadingOrderNode::ordered(RoGroup::new(ROOT_GROUP_ID)));
        leaf.set_index(Some(0));
        if let ReadingOrderNode::Ordered { group, .. } = node {
            group.children.push(leaf);
        }
    }

    match node {
        ReadingOrderNode::Ordered { group, .. } => {
            let next = group
                .children
                .iter()
                .filter_map(ReadingOrderNode::index)
                .max()
                .map_or(0, |max| max + 1);
            group
                .children
                .push(ReadingOrderNode::region(region_id, Some(next)));
        }
        ReadingOrderNode::Unordered { group, .. } => {
            group.children.push(ReadingOrderNode::region(region_id, None));
        }
        ReadingOrderNode::RegionRef { .. } => {}
    }
}

/// Remove references to `removed` region ids, pruning groups left empty.
///
/// A group that referenced a removed region loses that reference but survives
/// while it still has children. The root becomes `None` if nothing is left.
pub fn remove_region_refs(root: &mut Option<ReadingOrderNode>, removed: &[String]) {
    if removed.is_empty() {
        return;
    }
    let keep = root
        .as_mut()
        .is_some_and(|node| prune(node, removed, 0));
    if !keep {
        *root = None;
    }
}

/// Returns whether the node should stay
fn prune(node: &mut ReadingOrderNode, removed: &[String], depth: usize) -> bool {
    match node {
        ReadingOrderNode::RegionRef { region_ref, .. } => !removed.contains(region_ref),
        ReadingOrderNode::Ordered { group, .. } | ReadingOrderNode::Unordered { group, .. } => {
            if depth > MAX_READING_ORDER_DEPTH {
                return true;
            }
            if group
                .region_ref
                .as_ref()
                .is_some_and(|region_ref| removed.contains(region_ref))
            {
                group.region_ref = None;
            }
            group
                .children
                .retain_mut(|child| prune(child, removed, depth + 1));
            if group.children.is_empty() {
                log::debug!("Pruning empty reading order group {}", group.id);
                return false;
            }
            true
        }
    }
}
