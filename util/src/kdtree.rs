//! # K-d Tree Implementation
//!
//! A static two dimensional k-d tree, as described in [the wikipedia
//! article](https://en.wikipedia.org/wiki/K-d_tree), supporting nearest
//! neighbour queries.
//!
//! The tree is built once from a fixed list of points and is never modified,
//! replacing the point set means building a new tree. Queries return the
//! index of the point in the list the tree was built from.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use nalgebra::Vector2;

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// The nearest point found by a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Index of the point in the list the tree was built from
    pub index: usize,

    /// Euclidian distance between the query point and the nearest point
    pub distance: f64
}

/// A static 2D k-d tree.
#[derive(Clone, Debug)]
pub struct KdTree {
    /// Arena of all nodes in the tree, the root is always the first node.
    nodes: Vec<Node>
}

/// A single node of the tree.
#[derive(Clone, Debug)]
struct Node {
    /// The point stored at this node
    point: Vector2<f64>,

    /// Index of the point in the source list
    index: usize,

    /// The axis this node splits on, 0 for X and 1 for Y
    axis: usize,

    /// Node holding points below the split
    left: Option<usize>,

    /// Node holding points at or above the split
    right: Option<usize>
}

/// Running best result of a query.
#[derive(Clone, Copy)]
struct Best {
    index: usize,
    dist_sq: f64
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum KdTreeError {
    #[error("Cannot build a k-d tree from an empty list of points")]
    NoPoints,

    #[error("Point {0} ({1}) is not finite")]
    NonFinitePoint(usize, Vector2<f64>),
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl KdTree {
    /// Build a new tree from the given points.
    ///
    /// Building is `O(n log n)`. The structure of the tree depends only on
    /// the points and their order, so equal inputs always produce equal trees.
    pub fn build(points: &[Vector2<f64>]) -> Result<Self, KdTreeError> {
        if points.is_empty() {
            return Err(KdTreeError::NoPoints)
        }

        if let Some((i, p)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !(p[0].is_finite() && p[1].is_finite())) 
        {
            return Err(KdTreeError::NonFinitePoint(i, *p))
        }

        let mut items: Vec<(usize, Vector2<f64>)> = points
            .iter()
            .cloned()
            .enumerate()
            .collect();
        let mut nodes = Vec::with_capacity(points.len());

        build_node(&mut items, 0, &mut nodes);

        Ok(Self { nodes })
    }

    /// Number of points in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Find the point closest to `target`.
    ///
    /// If more than one point is at the same distance the one with the lowest
    /// index is returned.
    pub fn nearest(&self, target: &Vector2<f64>) -> Nearest {
        let mut best = Best {
            index: self.nodes[0].index,
            dist_sq: std::f64::INFINITY
        };

        self.search(0, target, &mut best);

        Nearest {
            index: best.index,
            distance: best.dist_sq.sqrt()
        }
    }

    fn search(&self, node_id: usize, target: &Vector2<f64>, best: &mut Best) {
        let node = &self.nodes[node_id];

        let dist_sq = (node.point - target).norm_squared();
        if dist_sq < best.dist_sq || (dist_sq == best.dist_sq && node.index < best.index) {
            best.index = node.index;
            best.dist_sq = dist_sq;
        }

        // Descend into the side of the split the target is on first, then the
        // other side only if the splitting line is closer than the best so far.
        let diff = target[node.axis] - node.point[node.axis];
        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        }
        else {
            (node.right, node.left)
        };

        if let Some(n) = near {
            self.search(n, target, best);
        }

        if let Some(f) = far {
            if diff * diff <= best.dist_sq {
                self.search(f, target, best);
            }
        }
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Recursively build the subtree for `items`, returning the id of its root node.
fn build_node(
    items: &mut [(usize, Vector2<f64>)], 
    depth: usize, 
    nodes: &mut Vec<Node>
) -> Option<usize> {
    if items.is_empty() {
        return None
    }

    let axis = depth % 2;
    let median = items.len() / 2;

    // Partition around the median, ties on the axis are ordered by index so
    // the tree is deterministic.
    items.select_nth_unstable_by(median, |a, b| {
        a.1[axis].total_cmp(&b.1[axis]).then(a.0.cmp(&b.0))
    });

    let (index, point) = items[median];
    let node_id = nodes.len();
    nodes.push(Node {
        point,
        index,
        axis,
        left: None,
        right: None
    });

    let (lower, rest) = items.split_at_mut(median);
    let left = build_node(lower, depth + 1, nodes);
    let right = build_node(&mut rest[1..], depth + 1, nodes);

    nodes[node_id].left = left;
    nodes[node_id].right = right;

    Some(node_id)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Simple deterministic point generator
    fn scatter(n: usize, seed: u64) -> Vec<Vector2<f64>> {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as f64 / (1u64 << 31) as f64) * 200.0 - 100.0
        };

        (0..n).map(|_| Vector2::new(next(), next())).collect()
    }

    fn brute_force(points: &[Vector2<f64>], target: &Vector2<f64>) -> usize {
        let mut best = 0;
        for (i, p) in points.iter().enumerate() {
            if (p - target).norm_squared() < (points[best] - target).norm_squared() {
                best = i;
            }
        }
        best
    }

    #[test]
    fn test_exact_match() {
        let points = scatter(257, 7);
        let tree = KdTree::build(&points).unwrap();

        assert_eq!(tree.len(), 257);

        for (i, p) in points.iter().enumerate() {
            let nearest = tree.nearest(p);
            assert_eq!(nearest.index, i);
            assert_eq!(nearest.distance, 0.0);
        }
    }

    #[test]
    fn test_matches_brute_force() {
        let points = scatter(500, 11);
        let targets = scatter(200, 3);
        let tree = KdTree::build(&points).unwrap();

        for t in targets.iter() {
            assert_eq!(tree.nearest(t).index, brute_force(&points, t));
        }
    }

    #[test]
    fn test_ties_use_lowest_index() {
        // Collinear points, the target is exactly between 1 and 2, and the
        // last point duplicates the first.
        let points = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(10.0, 0.0),
            Vector2::new(20.0, 0.0),
            Vector2::new(0.0, 0.0),
        ];
        let tree = KdTree::build(&points).unwrap();

        assert_eq!(tree.nearest(&Vector2::new(15.0, 0.0)).index, 1);
        assert_eq!(tree.nearest(&Vector2::new(-1.0, 0.0)).index, 0);
    }

    #[test]
    fn test_invalid_points() {
        assert!(matches!(KdTree::build(&[]), Err(KdTreeError::NoPoints)));
        assert!(matches!(
            KdTree::build(&[Vector2::new(0.0, 0.0), Vector2::new(std::f64::NAN, 1.0)]),
            Err(KdTreeError::NonFinitePoint(1, _))
        ));
    }
}
