//! # Partition Tree
//!
//! Binary space partitioning of the map bounds.
//!
//! The tree is an arena of [`PartitionNode`]s addressed by index, with
//! explicit parent and child links so it can be walked top-down while building
//! and bottom-up while picking spine rooms. Every leaf receives exactly one
//! [`Room`], inset from the leaf rectangle by a random margin.

use super::{PartitionConfig, Room, RoomType};
use crate::utils::GenRng;
use crate::world::Rect;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Reciprocal of the golden ratio.
const INV_PHI: f64 = 0.618_033_988_749_895;

/// Direction of the cut line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitOrientation {
    /// Horizontal cut: children are stacked top and bottom
    Horizontal,
    /// Vertical cut: children sit side by side
    Vertical,
}

/// Where and how a node was split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub orientation: SplitOrientation,
    /// First row (horizontal) or column (vertical) of the second child
    pub position: i32,
}

/// One rectangle in the partition tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionNode {
    pub rect: Rect,
    pub depth: u32,
    pub parent: Option<usize>,
    /// `(first, second)` child indices; `None` for leaves
    pub children: Option<(usize, usize)>,
    pub split: Option<Split>,
    /// Room inset from this node, leaves only
    pub room: Option<u32>,
}

impl PartitionNode {
    fn new(rect: Rect, depth: u32, parent: Option<usize>) -> Self {
        Self {
            rect,
            depth,
            parent,
            children: None,
            split: None,
            room: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Arena-backed partition tree plus the rooms inset from its leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionTree {
    nodes: Vec<PartitionNode>,
    rooms: Vec<Room>,
}

impl PartitionTree {
    /// Index of the root node.
    pub const ROOT: usize = 0;

    pub fn nodes(&self) -> &[PartitionNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&PartitionNode> {
        self.nodes.get(index)
    }

    pub fn root(&self) -> &PartitionNode {
        &self.nodes[Self::ROOT]
    }

    /// Rooms in tree order (left subtree before right subtree).
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Discards the tree and keeps the rooms.
    pub fn into_rooms(self) -> Vec<Room> {
        self.rooms
    }

    /// Deepest node depth.
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Leaf indices in tree order below (and including) `index`.
    pub fn subtree_leaves(&self, index: usize) -> Vec<usize> {
        let mut leaves = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            match node.children {
                Some((first, second)) => {
                    stack.push(second);
                    stack.push(first);
                }
                None => leaves.push(current),
            }
        }
        leaves
    }

    /// All leaf indices in tree order.
    pub fn leaves(&self) -> Vec<usize> {
        self.subtree_leaves(Self::ROOT)
    }

    /// Ancestors of `index`, nearest first, following parent links.
    pub fn ancestors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.nodes.get(index).and_then(|node| node.parent), |&current| {
            self.nodes[current].parent
        })
    }

    /// Nodes at `depth`, plus leaves that stop above it, in tree order.
    pub fn frontier(&self, depth: u32) -> Vec<usize> {
        let mut frontier = Vec::new();
        let mut stack = vec![Self::ROOT];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            match node.children {
                Some((first, second)) if node.depth < depth => {
                    stack.push(second);
                    stack.push(first);
                }
                _ => frontier.push(current),
            }
        }
        frontier
    }

    /// Frontier node at `depth` that contains `index`.
    ///
    /// Walks parent links up from `index` to the first node no deeper than
    /// `depth`; a node already that shallow is its own frontier.
    pub fn frontier_of(&self, index: usize, depth: u32) -> usize {
        std::iter::once(index)
            .chain(self.ancestors(index))
            .find(|&current| self.nodes[current].depth <= depth)
            .unwrap_or(Self::ROOT)
    }

    /// Core rooms for the circulation spine.
    ///
    /// One room per frontier subtree at `spine_depth`: the largest-area leaf
    /// of that subtree, earliest in tree order on ties. The result follows
    /// tree order, so consecutive cores are spatial neighbors in the
    /// partition.
    pub fn spine_rooms(&self, spine_depth: u32) -> Vec<u32> {
        // Leaves of one subtree are contiguous in tree order
        let mut cores: Vec<(usize, &Room)> = Vec::new();
        for leaf in self.leaves() {
            let Some(room) = self.nodes[leaf].room.and_then(|id| self.rooms.get(id as usize)) else {
                continue;
            };
            let subtree = self.frontier_of(leaf, spine_depth);
            match cores.last_mut() {
                Some((current, best)) if *current == subtree => {
                    if room.area() > best.area() {
                        *best = room;
                    }
                }
                _ => cores.push((subtree, room)),
            }
        }
        cores.into_iter().map(|(_, room)| room.id()).collect()
    }
}

/// Recursively partitions `bounds` and insets one room per leaf.
///
/// Regions too small to split become leaves immediately, so degenerate
/// bounds still yield one (possibly tiny) room rather than an error. The
/// bounds must be non-empty; [`super::GenerationConfig::validate`] enforces
/// that before generation starts.
pub fn generate_partition(bounds: Rect, config: &PartitionConfig, rng: &mut GenRng) -> PartitionTree {
    let mut builder = TreeBuilder {
        config,
        rng,
        tree: PartitionTree {
            nodes: vec![PartitionNode::new(bounds, 0, None)],
            rooms: Vec::new(),
        },
    };
    builder.build(PartitionTree::ROOT);

    debug!(
        "Partitioned {}x{} into {} leaves (depth {})",
        bounds.width,
        bounds.height,
        builder.tree.rooms.len(),
        builder.tree.depth()
    );
    builder.tree
}

struct TreeBuilder<'a> {
    config: &'a PartitionConfig,
    rng: &'a mut GenRng,
    tree: PartitionTree,
}

impl TreeBuilder<'_> {
    fn build(&mut self, index: usize) {
        let (rect, depth) = {
            let node = &self.tree.nodes[index];
            (node.rect, node.depth)
        };

        let Some(split) = self.choose_split(rect, depth) else {
            self.make_leaf(index);
            return;
        };

        let (first_rect, second_rect) = split_rect(rect, split);
        let first = self.tree.nodes.len();
        self.tree.nodes.push(PartitionNode::new(first_rect, depth + 1, Some(index)));
        let second = self.tree.nodes.len();
        self.tree.nodes.push(PartitionNode::new(second_rect, depth + 1, Some(index)));

        let node = &mut self.tree.nodes[index];
        node.children = Some((first, second));
        node.split = Some(split);
        trace!("Split node {index} at depth {depth}: {split:?}");

        self.build(first);
        self.build(second);
    }

    fn choose_split(&mut self, rect: Rect, depth: u32) -> Option<Split> {
        let config = self.config;
        if depth >= config.max_depth {
            return None;
        }

        let min_split = config.min_split_size();
        let can_cut_horizontal = rect.height >= min_split;
        let can_cut_vertical = rect.width >= min_split;
        if !can_cut_horizontal && !can_cut_vertical {
            return None;
        }

        let room_fits = config.max_room_size + config.max_margin * 2;
        if rect.width <= room_fits
            && rect.height <= room_fits
            && self.rng.chance(config.early_stop_chance)
        {
            return None;
        }

        let orientation = if !can_cut_vertical {
            SplitOrientation::Horizontal
        } else if !can_cut_horizontal {
            SplitOrientation::Vertical
        } else {
            let horizontal = half_rect_aspect(rect, SplitOrientation::Horizontal);
            let vertical = half_rect_aspect(rect, SplitOrientation::Vertical);
            match (horizontal > config.max_aspect_ratio, vertical > config.max_aspect_ratio) {
                (true, false) => SplitOrientation::Vertical,
                (false, true) => SplitOrientation::Horizontal,
                // Both too thin: take the cut that leaves squarer children
                (true, true) if horizontal < vertical => SplitOrientation::Horizontal,
                (true, true) if vertical < horizontal => SplitOrientation::Vertical,
                _ if self.rng.chance(config.split_bias) => SplitOrientation::Horizontal,
                _ => SplitOrientation::Vertical,
            }
        };

        let (origin, length) = match orientation {
            SplitOrientation::Horizontal => (rect.y, rect.height),
            SplitOrientation::Vertical => (rect.x, rect.width),
        };
        let offset = self.split_offset(length);

        Some(Split {
            orientation,
            position: origin + offset as i32,
        })
    }

    /// Offset of the cut from the start of a side of `length` tiles.
    ///
    /// Blends a jittered center cut with a golden-ratio cut on a random side,
    /// then clamps so both children keep at least `min_room_size`.
    fn split_offset(&mut self, length: u32) -> u32 {
        let config = self.config;
        let length_f = f64::from(length);

        let jittered = length_f / 2.0 + self.rng.signed_unit() * config.split_jitter * length_f;
        let golden = if self.rng.chance(0.5) {
            length_f * INV_PHI
        } else {
            length_f * (1.0 - INV_PHI)
        };
        let blended = jittered * (1.0 - config.golden_ratio_weight) + golden * config.golden_ratio_weight;

        let lo = config.min_room_size;
        let hi = length.saturating_sub(config.min_room_size).max(lo);
        (blended.round().max(0.0) as u32).clamp(lo, hi)
    }

    fn make_leaf(&mut self, index: usize) {
        let config = self.config;
        let (partition, depth) = {
            let node = &self.tree.nodes[index];
            (node.rect, node.depth)
        };

        let (x, width) = self.inset_axis(partition.x, partition.width);
        let (y, height) = self.inset_axis(partition.y, partition.height);
        let rect = Rect::new(x, y, width, height);

        let id = self.tree.rooms.len() as u32;
        let room_type = RoomType::classify(&rect, depth, config);
        self.tree.rooms.push(Room::new(id, rect, depth, room_type));
        self.tree.nodes[index].room = Some(id);
        trace!("Leaf {index} -> room {id} {rect:?} ({room_type:?})");
    }

    /// Insets one axis of a leaf: returns the room start and length.
    ///
    /// The margin is drawn from the configured range but shrinks for sides
    /// too short to keep a one-tile room. Rooms longer than `max_room_size`
    /// are capped and slid to a random offset inside the inset span.
    fn inset_axis(&mut self, start: i32, length: u32) -> (i32, u32) {
        let config = self.config;
        let drawn = self.rng.range_inclusive(config.min_margin, config.max_margin);
        let margin = drawn.min(length.saturating_sub(1) / 2);

        let span = length - margin * 2;
        let room_length = span.min(config.max_room_size).max(1);
        let slack = span - room_length;
        let slide = self.rng.range_inclusive(0, slack);

        (start + (margin + slide) as i32, room_length)
    }
}

fn split_rect(rect: Rect, split: Split) -> (Rect, Rect) {
    match split.orientation {
        SplitOrientation::Horizontal => {
            let top = (split.position - rect.y) as u32;
            (
                Rect::new(rect.x, rect.y, rect.width, top),
                Rect::new(rect.x, split.position, rect.width, rect.height - top),
            )
        }
        SplitOrientation::Vertical => {
            let left = (split.position - rect.x) as u32;
            (
                Rect::new(rect.x, rect.y, left, rect.height),
                Rect::new(split.position, rect.y, rect.width - left, rect.height),
            )
        }
    }
}

/// Aspect ratio of either child produced by a center cut.
fn half_rect_aspect(rect: Rect, orientation: SplitOrientation) -> f64 {
    let half = match orientation {
        SplitOrientation::Horizontal => Rect::new(rect.x, rect.y, rect.width, (rect.height / 2).max(1)),
        SplitOrientation::Vertical => Rect::new(rect.x, rect.y, (rect.width / 2).max(1), rect.height),
    };
    half.aspect_ratio()
}
