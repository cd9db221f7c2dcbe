//! Arena-backed index tree.
//!
//! Every node of the index lives in one [`Tree`] arena and is addressed by
//! [`NodeId`]. The arena alone owns the nodes; parent and child links are
//! plain indices, so the parent/child cycle carries no ownership and a child
//! index is always greater than its parent's, keeping the tree acyclic by
//! construction.

use crate::error::IndexError;
use crate::hasher;
use crate::types::Digest;
use std::collections::VecDeque;

/// Handle to a node within its [`Tree`].
///
/// A `NodeId` is only meaningful for the tree that produced it; using it
/// against another tree panics or addresses an unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Kind-specific node data.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Fixed-size slice of a file's byte stream. Always a leaf, never named.
    Block {
        /// Byte offset within the containing file.
        offset: u64,
        /// Weak rolling checksum of the block bytes.
        weak: u32,
    },
    /// A regular file; children are its blocks in ascending offset order.
    File { name: String, size: u64 },
    /// A directory; children are files and subdirectories.
    Dir { name: String },
}

impl NodeKind {
    /// Name of a file or directory node. Blocks are unnamed.
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeKind::Block { .. } => None,
            NodeKind::File { name, .. } | NodeKind::Dir { name } => Some(name),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Dir { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File { .. })
    }

    pub fn is_block(&self) -> bool {
        matches!(self, NodeKind::Block { .. })
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    /// Set at creation for blocks and files; memoized on demand for
    /// directories.
    digest: Option<Digest>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena of index nodes with a single designated root directory.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// The root directory, once one has been added.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a directory. With no parent this creates the tree's root; a tree
    /// has exactly one.
    pub fn add_dir(&mut self, parent: Option<NodeId>, name: &str) -> Result<NodeId, IndexError> {
        let kind = NodeKind::Dir {
            name: name.to_string(),
        };
        match parent {
            None => {
                if self.root.is_some() {
                    return Err(IndexError::Structure("tree already has a root".into()));
                }
                let id = self.push(kind, None, None);
                self.root = Some(id);
                Ok(id)
            }
            Some(parent) => {
                self.expect_dir(parent)?;
                Ok(self.push(kind, None, Some(parent)))
            }
        }
    }

    /// Add a file under a directory. The digest is the strong digest of the
    /// file's whole byte stream, computed by the block indexer.
    pub fn add_file(
        &mut self,
        parent: NodeId,
        name: &str,
        size: u64,
        digest: Digest,
    ) -> Result<NodeId, IndexError> {
        self.expect_dir(parent)?;
        let kind = NodeKind::File {
            name: name.to_string(),
            size,
        };
        Ok(self.push(kind, Some(digest), Some(parent)))
    }

    /// Add a block under a file. Blocks must be added in ascending offset
    /// order, the order the indexer reads them.
    pub fn add_block(
        &mut self,
        parent: NodeId,
        offset: u64,
        weak: u32,
        digest: Digest,
    ) -> Result<NodeId, IndexError> {
        if !self.node(parent).kind.is_file() {
            return Err(IndexError::Structure(
                "blocks can only be attached to files".into(),
            ));
        }
        Ok(self.push(NodeKind::Block { offset, weak }, Some(digest), Some(parent)))
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Name of a file or directory node.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).kind.name()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children in attach order: blocks by ascending offset, directory
    /// entries in discovery order. No digest depends on this order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Digest already computed for this node, if any.
    pub fn cached_digest(&self, id: NodeId) -> Option<Digest> {
        self.node(id).digest
    }

    /// Digest of a node, computing and memoizing directory digests on
    /// demand. Computing a directory's digest computes each descendant
    /// directory's digest exactly once; deep trees stay off the call stack.
    pub fn digest(&mut self, id: NodeId) -> Digest {
        let mut stack = vec![id];
        while let Some(&top) = stack.last() {
            if self.node(top).digest.is_some() {
                stack.pop();
                continue;
            }
            // Only directories are ever un-digested: blocks and files get
            // theirs at creation.
            let pending: Vec<NodeId> = self
                .node(top)
                .children
                .iter()
                .copied()
                .filter(|&child| self.node(child).digest.is_none())
                .collect();
            if pending.is_empty() {
                let digest = hasher::dir_digest(&self.child_digests(top));
                self.nodes[top.0].digest = Some(digest);
                stack.pop();
            } else {
                stack.extend(pending);
            }
        }
        match self.node(id).digest {
            Some(digest) => digest,
            None => unreachable!("digest loop fills the node it was asked for"),
        }
    }

    /// Canonical textual listing of a directory's direct children, the
    /// exact preimage of its digest. Computes any missing child digests.
    pub fn listing(&mut self, id: NodeId) -> Result<String, IndexError> {
        if !self.node(id).kind.is_dir() {
            return Err(IndexError::Structure(
                "listing requested for a non-directory node".into(),
            ));
        }
        for child in self.node(id).children.to_vec() {
            self.digest(child);
        }
        Ok(hasher::dir_listing(&self.child_digests(id)))
    }

    /// Child of a directory with the given name.
    pub fn child_named(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.node(dir)
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).kind.name() == Some(name))
    }

    /// Resolve a `/`-separated relative path against a directory node.
    pub fn resolve(&self, from: NodeId, relpath: &str) -> Option<NodeId> {
        let mut current = from;
        for part in relpath.split('/').filter(|part| !part.is_empty()) {
            current = self.child_named(current, part)?;
        }
        Some(current)
    }

    /// Visit nodes breadth-first starting at `start`. The visitor's return
    /// value decides whether to descend into the node's children.
    pub fn walk<F>(&self, start: NodeId, mut visit: F)
    where
        F: FnMut(&Tree, NodeId) -> bool,
    {
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            if visit(self, current) {
                queue.extend(self.node(current).children.iter().copied());
            }
        }
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn expect_dir(&self, id: NodeId) -> Result<(), IndexError> {
        if self.node(id).kind.is_dir() {
            Ok(())
        } else {
            Err(IndexError::Structure(
                "named nodes can only be attached to directories".into(),
            ))
        }
    }

    fn push(&mut self, kind: NodeKind, digest: Option<Digest>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            digest,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
            self.invalidate_upward(parent);
        }
        id
    }

    /// Clear the memoized digest of every directory from `from` up to the
    /// root. Block and file digests derive from content, not from children,
    /// and are left untouched.
    fn invalidate_upward(&mut self, from: NodeId) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            if node.kind.is_dir() {
                node.digest = None;
            }
            current = node.parent;
        }
    }

    /// `(name, digest)` pairs of a directory's children. Every child must
    /// already carry a digest; directory children are always named.
    fn child_digests(&self, id: NodeId) -> Vec<(String, Digest)> {
        self.node(id)
            .children
            .iter()
            .map(|&child| {
                let node = self.node(child);
                match (node.kind.name(), node.digest) {
                    (Some(name), Some(digest)) => (name.to_string(), digest),
                    _ => unreachable!("directory children are named and digested"),
                }
            })
            .collect()
    }
}
