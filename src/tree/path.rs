//! Path reconstruction from tree position.
//!
//! A node's path is derived, not stored: it is the chain of ancestor names
//! from the root down to the node itself.

use crate::error::IndexError;
use crate::tree::node::{NodeId, Tree};
use std::path::PathBuf;

/// Path components of a named node, root-to-node, root name included.
///
/// Blocks are unnamed and have no path; a parent chain that does not end at
/// the tree's root is an internal-consistency violation. Both report as
/// [`IndexError::Structure`].
pub fn path_components(tree: &Tree, id: NodeId) -> Result<Vec<String>, IndexError> {
    let mut parts = Vec::new();
    let mut current = id;
    loop {
        let name = tree.name(current).ok_or_else(|| {
            IndexError::Structure("path requested for an unnamed block node".into())
        })?;
        parts.push(name.to_string());
        match tree.parent(current) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    if tree.root() != Some(current) {
        return Err(IndexError::Structure(
            "node is not attached to the tree root".into(),
        ));
    }
    parts.reverse();
    Ok(parts)
}

/// Filesystem-style relative path of a named node, separator-joined.
pub fn node_path(tree: &Tree, id: NodeId) -> Result<PathBuf, IndexError> {
    Ok(path_components(tree, id)?.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher;

    #[test]
    fn reconstructs_nested_path() {
        let mut tree = Tree::new();
        let root = tree.add_dir(None, "root").unwrap();

        let etc = tree.add_dir(Some(root), "etc").unwrap();
        tree.add_file(etc, "passwd", 0, hasher::digest(b"")).unwrap();
        tree.add_file(etc, "hosts", 0, hasher::digest(b"")).unwrap();

        let usr = tree.add_dir(Some(root), "usr").unwrap();
        let bin = tree.add_dir(Some(usr), "bin").unwrap();
        tree.add_dir(Some(usr), "lib").unwrap();
        tree.add_dir(Some(usr), "share").unwrap();

        let ls = tree.add_file(bin, "ls", 2, hasher::digest(b"#!")).unwrap();

        assert_eq!(
            path_components(&tree, ls).unwrap(),
            vec!["root", "usr", "bin", "ls"]
        );
        assert_eq!(
            node_path(&tree, ls).unwrap(),
            PathBuf::from("root/usr/bin/ls")
        );
        assert_eq!(tree.children(etc).len(), 2);
    }

    #[test]
    fn root_path_is_its_own_name() {
        let mut tree = Tree::new();
        let root = tree.add_dir(None, "top").unwrap();
        assert_eq!(path_components(&tree, root).unwrap(), vec!["top"]);
    }

    #[test]
    fn blocks_have_no_path() {
        let mut tree = Tree::new();
        let root = tree.add_dir(None, "root").unwrap();
        let file = tree.add_file(root, "f", 1, hasher::digest(b"x")).unwrap();
        let block = tree.add_block(file, 0, 0, hasher::digest(b"x")).unwrap();
        assert!(matches!(
            path_components(&tree, block),
            Err(IndexError::Structure(_))
        ));
    }
}
