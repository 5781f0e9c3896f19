//! Binary space partitioning of the map into room footprints

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rng::GameRng;

use super::rect::Rect;
use super::room::RoomId;

/// Aspect ratio at which the split axis stops being a coin flip
pub const FORCED_SPLIT_RATIO: f32 = 1.25;

/// Default recursion limit
pub const DEFAULT_MAX_DEPTH: usize = 6;

/// A node in the partition tree. Leaf iff it has no children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BspNode {
    pub bounds: Rect,
    pub left: Option<Box<BspNode>>,
    pub right: Option<Box<BspNode>>,
    /// Room carved in this leaf, if carving succeeded
    pub room: Option<RoomId>,
}

impl BspNode {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            left: None,
            right: None,
            room: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Both children of an internal node
    pub fn children(&self) -> Option<(&BspNode, &BspNode)> {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => Some((&**left, &**right)),
            _ => None,
        }
    }

    /// Leaves in left-to-right order
    pub fn leaves(&self) -> Vec<&BspNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a BspNode>) {
        if self.is_leaf() {
            out.push(self);
            return;
        }
        if let Some(left) = self.left.as_deref() {
            left.collect_leaves(out);
        }
        if let Some(right) = self.right.as_deref() {
            right.collect_leaves(out);
        }
    }

    /// Mutable leaves in left-to-right order
    pub fn leaves_mut(&mut self) -> Vec<&mut BspNode> {
        let mut out = Vec::new();
        self.collect_leaves_mut(&mut out);
        out
    }

    fn collect_leaves_mut<'a>(&'a mut self, out: &mut Vec<&'a mut BspNode>) {
        if self.is_leaf() {
            out.push(self);
            return;
        }
        if let Some(left) = self.left.as_deref_mut() {
            left.collect_leaves_mut(out);
        }
        if let Some(right) = self.right.as_deref_mut() {
            right.collect_leaves_mut(out);
        }
    }

    /// Rooms carved anywhere below this node, left to right
    pub fn rooms(&self) -> Vec<RoomId> {
        self.leaves().into_iter().filter_map(|leaf| leaf.room).collect()
    }

    /// Height of the tree (a lone leaf has depth 0)
    pub fn depth(&self) -> usize {
        match self.children() {
            Some((left, right)) => 1 + left.depth().max(right.depth()),
            None => 0,
        }
    }
}

/// Recursively bisects a rectangle into a binary tree of partitions
#[derive(Debug, Clone, Copy)]
pub struct SpacePartitioner {
    /// Smallest side a partition may be cut down to
    pub min_size: usize,
    pub max_depth: usize,
}

impl SpacePartitioner {
    pub fn new(min_size: usize, max_depth: usize) -> Self {
        Self {
            min_size: min_size.max(1),
            max_depth,
        }
    }

    pub fn partition(&self, domain: Rect, rng: &mut GameRng) -> BspNode {
        let mut root = BspNode::new(domain);
        self.split(&mut root, 0, rng);
        debug!(
            leaves = root.leaves().len(),
            depth = root.depth(),
            "partitioned domain"
        );
        root
    }

    fn split(&self, node: &mut BspNode, depth: usize, rng: &mut GameRng) {
        let min = self.min_size as i32;
        let Rect {
            x,
            y,
            width,
            height,
        } = node.bounds;
        if depth >= self.max_depth || width < min * 2 || height < min * 2 {
            return;
        }

        // Long partitions are always cut across their long axis
        let cut_vertically = if width as f32 / height as f32 >= FORCED_SPLIT_RATIO {
            true
        } else if height as f32 / width as f32 >= FORCED_SPLIT_RATIO {
            false
        } else {
            rng.coin()
        };

        let (first, second) = if cut_vertically {
            let offset = rng.range(min, width - min);
            (
                Rect::new(x, y, offset, height),
                Rect::new(x + offset, y, width - offset, height),
            )
        } else {
            let offset = rng.range(min, height - min);
            (
                Rect::new(x, y, width, offset),
                Rect::new(x, y + offset, width, height - offset),
            )
        };

        let mut left = Box::new(BspNode::new(first));
        let mut right = Box::new(BspNode::new(second));
        self.split(&mut left, depth + 1, rng);
        self.split(&mut right, depth + 1, rng);
        node.left = Some(left);
        node.right = Some(right);
    }
}

impl Default for SpacePartitioner {
    fn default() -> Self {
        Self::new(10, DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_leaf_area(node: &BspNode) -> usize {
        node.leaves().iter().map(|leaf| leaf.bounds.area()).sum()
    }

    #[test]
    fn test_bsp_node_is_leaf() {
        let node = BspNode::new(Rect::new(0, 0, 10, 10));
        assert!(node.is_leaf());
        assert_eq!(node.depth(), 0);
        assert_eq!(node.leaves().len(), 1);
    }

    #[test]
    fn test_partition_covers_domain() {
        let mut rng = GameRng::new(42);
        let domain = Rect::new(0, 0, 80, 50);
        let root = SpacePartitioner::new(6, 6).partition(domain, &mut rng);
        assert!(!root.is_leaf());
        assert_eq!(total_leaf_area(&root), domain.area());
        for leaf in root.leaves() {
            assert!(domain.contains_rect(&leaf.bounds));
            assert!(leaf.bounds.width >= 6 && leaf.bounds.height >= 6);
        }
    }

    #[test]
    fn test_small_domain_does_not_split() {
        let mut rng = GameRng::new(1);
        let root = SpacePartitioner::new(10, 6).partition(Rect::new(0, 0, 19, 40), &mut rng);
        assert!(root.is_leaf());
    }

    #[test]
    fn test_depth_limit() {
        let mut rng = GameRng::new(3);
        let root = SpacePartitioner::new(2, 3).partition(Rect::new(0, 0, 200, 200), &mut rng);
        assert!(root.depth() >= 1 && root.depth() <= 3);
        assert!(root.leaves().len() <= 8);

        let root = SpacePartitioner::new(2, 0).partition(Rect::new(0, 0, 200, 200), &mut rng);
        assert!(root.is_leaf());
    }

    #[test]
    fn test_wide_domain_cut_vertically() {
        for seed in 0..20 {
            let mut rng = GameRng::new(seed);
            let root = SpacePartitioner::new(5, 1).partition(Rect::new(0, 0, 50, 20), &mut rng);
            let (left, right) = root.children().unwrap();
            assert_eq!(left.bounds.height, 20);
            assert_eq!(right.bounds.height, 20);
            assert!(left.bounds.width >= 5 && right.bounds.width >= 5);
        }
    }

    #[test]
    fn test_partition_is_deterministic() {
        let domain = Rect::new(0, 0, 64, 64);
        let a = SpacePartitioner::new(8, 6).partition(domain, &mut GameRng::new(11));
        let b = SpacePartitioner::new(8, 6).partition(domain, &mut GameRng::new(11));
        assert_eq!(a, b);
    }
}
