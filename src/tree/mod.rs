//! tree — a concrete, immutable tree topology for likelihood evaluation.
//!
//! Purpose
//! -------
//! Provide [`FixedTree`], an in-crate
//! [`TreeTopology`](crate::likelihood::TreeTopology) implementation for
//! single-chain setups, demos, and tests: a rooted tree (binary or
//! multifurcating) with branch lengths and taxon-indexed leaves, validated
//! once at construction and read-only afterwards.
//!
//! Key behaviors
//! -------------
//! - Built from parallel per-node vectors (parent link, branch length, leaf
//!   taxon). Exactly one node may have no parent; it becomes the root.
//! - A postorder traversal (children before parents, root last) is computed
//!   once at construction and handed out as a slice.
//! - Construction verifies structural consistency: parent indices in range,
//!   no self-parenting, connectivity and acyclicity, finite non-negative
//!   branch lengths below the root, leaves carrying unique taxon indices
//!   that form a contiguous `0..leaf_count` range, and internal nodes
//!   carrying none.
//!
//! Conventions
//! -----------
//! - Node, taxon, and branch indexing are all 0-based. `branch_length(node)`
//!   is the branch *above* `node`; the root's entry is ignored.
//! - Structural violations fail construction with
//!   [`LikelihoodError::ModelResolution`] carrying a human-readable reason;
//!   there is no partial construction.
use crate::likelihood::errors::{LikelihoodError, LikelihoodResult};
use crate::likelihood::traits::TreeTopology;

/// Immutable rooted tree with branch lengths and taxon-indexed leaves.
#[derive(Debug, Clone)]
pub struct FixedTree {
    children: Vec<Vec<usize>>,
    branch_lengths: Vec<f64>,
    leaf_taxa: Vec<Option<usize>>,
    root: usize,
    postorder: Vec<usize>,
}

impl FixedTree {
    /// Build a tree from parallel per-node vectors.
    ///
    /// `parents[node]` is the parent link (`None` for the root),
    /// `branch_lengths[node]` the length of the branch above `node`, and
    /// `leaf_taxa[node]` the taxon index for leaves (`None` for internal
    /// nodes). All structural invariants are checked here; see the module
    /// docs.
    pub fn new(
        parents: Vec<Option<usize>>, branch_lengths: Vec<f64>, leaf_taxa: Vec<Option<usize>>,
    ) -> LikelihoodResult<FixedTree> {
        let node_count = parents.len();
        if node_count == 0 {
            return Err(resolution("a tree requires at least one node".to_string()));
        }
        if branch_lengths.len() != node_count || leaf_taxa.len() != node_count {
            return Err(resolution(format!(
                "per-node vectors disagree: {node_count} parents, {} branch lengths, {} leaf taxa",
                branch_lengths.len(),
                leaf_taxa.len()
            )));
        }

        // Root detection and child lists.
        let mut root = None;
        let mut children = vec![Vec::new(); node_count];
        for (node, parent) in parents.iter().enumerate() {
            match parent {
                None => {
                    if let Some(existing) = root {
                        return Err(resolution(format!(
                            "nodes {existing} and {node} both lack a parent"
                        )));
                    }
                    root = Some(node);
                }
                Some(parent) => {
                    if *parent >= node_count {
                        return Err(resolution(format!(
                            "node {node} names parent {parent}, past {node_count} nodes"
                        )));
                    }
                    if *parent == node {
                        return Err(resolution(format!("node {node} is its own parent")));
                    }
                    children[*parent].push(node);
                }
            }
        }
        let root = match root {
            Some(root) => root,
            None => return Err(resolution("no root: every node has a parent".to_string())),
        };

        // Branch lengths below the root must be finite and non-negative.
        for (node, &length) in branch_lengths.iter().enumerate() {
            if node != root && (!length.is_finite() || length < 0.0) {
                return Err(resolution(format!(
                    "branch above node {node} has invalid length {length}"
                )));
            }
        }

        // Leaves carry taxa, internal nodes do not, and the taxa form a
        // contiguous 0..leaf_count range.
        let leaf_count = children.iter().filter(|c| c.is_empty()).count();
        let mut seen = vec![false; leaf_count];
        for node in 0..node_count {
            match (children[node].is_empty(), leaf_taxa[node]) {
                (true, Some(taxon)) => {
                    if taxon >= leaf_count || seen[taxon] {
                        return Err(resolution(format!(
                            "leaf {node} has duplicate or out-of-range taxon {taxon} for {leaf_count} leaves"
                        )));
                    }
                    seen[taxon] = true;
                }
                (true, None) => {
                    return Err(resolution(format!("leaf {node} has no taxon index")));
                }
                (false, Some(taxon)) => {
                    return Err(resolution(format!(
                        "internal node {node} carries taxon {taxon}"
                    )));
                }
                (false, None) => {}
            }
        }

        // Postorder via reversed preorder; a short traversal means the
        // parent links form a cycle or a disconnected component.
        let mut stack = vec![root];
        let mut postorder = Vec::with_capacity(node_count);
        while let Some(node) = stack.pop() {
            postorder.push(node);
            stack.extend_from_slice(&children[node]);
        }
        postorder.reverse();
        if postorder.len() != node_count {
            return Err(resolution(format!(
                "only {} of {node_count} nodes are reachable from the root",
                postorder.len()
            )));
        }

        Ok(FixedTree { children, branch_lengths, leaf_taxa, root, postorder })
    }
}

fn resolution(reason: String) -> LikelihoodError {
    LikelihoodError::ModelResolution { reason }
}

impl TreeTopology for FixedTree {
    fn node_count(&self) -> usize {
        self.branch_lengths.len()
    }

    fn root(&self) -> usize {
        self.root
    }

    fn postorder(&self) -> &[usize] {
        &self.postorder
    }

    fn children(&self, node: usize) -> &[usize] {
        &self.children[node]
    }

    fn branch_length(&self, node: usize) -> f64 {
        self.branch_lengths[node]
    }

    fn leaf_taxon(&self, node: usize) -> Option<usize> {
        self.leaf_taxa[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction of a valid rooted tree and its postorder contract.
    // - Structural rejection paths (two roots, cycles, bad taxa, bad branch
    //   lengths).
    //
    // They intentionally DO NOT cover:
    // - Likelihood evaluation over the tree (covered in the likelihood
    //   layer).
    // -------------------------------------------------------------------------

    /// Four taxa: ((0,1),(2,3)). Nodes 0-3 are leaves, 4 and 5 internal,
    /// 6 is the root.
    fn four_taxon_tree() -> FixedTree {
        FixedTree::new(
            vec![Some(4), Some(4), Some(5), Some(5), Some(6), Some(6), None],
            vec![0.1, 0.2, 0.3, 0.1, 0.05, 0.15, 0.0],
            vec![Some(0), Some(1), Some(2), Some(3), None, None, None],
        )
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // A valid tree reports its structure and a postorder with children
    // before parents and the root last.
    //
    // Given
    // -----
    // - The four-taxon fixture ((0,1),(2,3)).
    //
    // Expect
    // ------
    // - 7 nodes, 4 leaves, root 6 last in postorder, and every child
    //   appearing before its parent.
    fn valid_tree_reports_structure_and_postorder() {
        // Arrange
        let tree = four_taxon_tree();

        // Act
        let postorder = tree.postorder();

        // Assert
        assert_eq!(tree.node_count(), 7);
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.root(), 6);
        assert_eq!(postorder.len(), 7);
        assert_eq!(*postorder.last().unwrap(), 6);
        let position =
            |node: usize| postorder.iter().position(|&n| n == node).unwrap();
        for parent in [4, 5, 6] {
            for &child in tree.children(parent) {
                assert!(
                    position(child) < position(parent),
                    "child {child} must precede parent {parent}"
                );
            }
        }
        assert_eq!(tree.leaf_taxon(2), Some(2));
        assert_eq!(tree.leaf_taxon(5), None);
    }

    #[test]
    // Purpose
    // -------
    // Two parentless nodes are rejected.
    //
    // Given
    // -----
    // - A three-node forest where nodes 0 and 2 both lack a parent.
    //
    // Expect
    // ------
    // - `Err(LikelihoodError::ModelResolution { .. })`.
    fn two_roots_are_rejected() {
        // Act
        let result = FixedTree::new(
            vec![None, Some(0), None],
            vec![0.0, 0.1, 0.0],
            vec![None, Some(0), Some(1)],
        );

        // Assert
        assert!(matches!(result, Err(LikelihoodError::ModelResolution { .. })));
    }

    #[test]
    // Purpose
    // -------
    // A parent cycle is detected as unreachable nodes.
    //
    // Given
    // -----
    // - A root plus two nodes parenting each other.
    //
    // Expect
    // ------
    // - `Err(LikelihoodError::ModelResolution { .. })` mentioning
    //   reachability.
    fn parent_cycle_is_rejected() {
        // Act
        let result = FixedTree::new(
            vec![None, Some(2), Some(1)],
            vec![0.0, 0.1, 0.1],
            vec![Some(0), None, None],
        );

        // Assert
        match result {
            Err(LikelihoodError::ModelResolution { reason }) => {
                assert!(reason.contains("reachable"), "unexpected reason: {reason}");
            }
            other => panic!("expected ModelResolution error, got: {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Duplicate taxon indices and taxon-less leaves are rejected.
    //
    // Given
    // -----
    // - A two-leaf tree where both leaves claim taxon 0, and another where
    //   a leaf has no taxon.
    //
    // Expect
    // ------
    // - `Err(LikelihoodError::ModelResolution { .. })` for both.
    fn bad_leaf_taxa_are_rejected() {
        // Act
        let duplicate = FixedTree::new(
            vec![Some(2), Some(2), None],
            vec![0.1, 0.1, 0.0],
            vec![Some(0), Some(0), None],
        );
        let missing = FixedTree::new(
            vec![Some(2), Some(2), None],
            vec![0.1, 0.1, 0.0],
            vec![Some(0), None, None],
        );

        // Assert
        assert!(matches!(duplicate, Err(LikelihoodError::ModelResolution { .. })));
        assert!(matches!(missing, Err(LikelihoodError::ModelResolution { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Negative and non-finite branch lengths below the root are rejected;
    // the root's entry is ignored.
    //
    // Given
    // -----
    // - A two-leaf tree with a negative leaf branch, and a valid tree with
    //   a NaN root entry.
    //
    // Expect
    // ------
    // - The negative branch fails; the NaN root entry is accepted.
    fn branch_length_validation_skips_the_root() {
        // Act
        let negative = FixedTree::new(
            vec![Some(2), Some(2), None],
            vec![-0.1, 0.1, 0.0],
            vec![Some(0), Some(1), None],
        );
        let nan_root = FixedTree::new(
            vec![Some(2), Some(2), None],
            vec![0.1, 0.1, f64::NAN],
            vec![Some(0), Some(1), None],
        );

        // Assert
        assert!(matches!(negative, Err(LikelihoodError::ModelResolution { .. })));
        assert!(nan_root.is_ok());
    }
}
