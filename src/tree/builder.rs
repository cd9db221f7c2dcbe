//! Directory tree construction.
//!
//! Walks a directory subtree iteratively, indexing every regular file block
//! by block and pairing every discovered directory with its node so results
//! attach as they stream out of the walk. Unreadable entries are logged and
//! skipped; the scan itself always completes.

use crate::error::IndexError;
use crate::index::{self, FileIndex};
use crate::tree::node::{NodeId, Tree};
use crate::types::Digest;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Scan configuration.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Follow symbolic links instead of skipping them (default: false).
    pub follow_symlinks: bool,
    /// Entry names to prune from the scan, matched against single path
    /// components (e.g. ".git").
    pub ignore: Vec<String>,
    /// Maximum depth below the root (None = unlimited).
    pub max_depth: Option<usize>,
}

/// Builds the block/file/directory index of a filesystem subtree.
pub struct TreeBuilder {
    root: PathBuf,
    options: ScanOptions,
}

impl TreeBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Index the subtree under the builder's root.
    ///
    /// Returns the tree and its root node. A failure to enumerate or read
    /// one entry is logged and that entry skipped; only a root that is not
    /// a readable directory fails the build as a whole. Directory digests
    /// are not forced here; they are computed on first request.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn build(&self) -> Result<(Tree, NodeId), IndexError> {
        let started = Instant::now();

        let meta = std::fs::metadata(&self.root).map_err(|e| IndexError::io(&self.root, e))?;
        if !meta.is_dir() {
            return Err(IndexError::InvalidPath(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }

        let mut tree = Tree::new();
        let root_id = tree.add_dir(None, &root_name(&self.root))?;

        // Pair every scanned directory with its node. Discovery order is
        // irrelevant to digests: directory hashing sorts children by name.
        let mut dir_nodes: HashMap<PathBuf, NodeId> = HashMap::new();
        dir_nodes.insert(self.root.clone(), root_id);

        let mut files = 0usize;
        let mut skipped = 0usize;

        let mut entries = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(self.options.max_depth.unwrap_or(usize::MAX))
            .follow_links(self.options.follow_symlinks)
            .into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // One unreadable entry never aborts the scan.
                    warn!("skipping unreadable entry: {e}");
                    skipped += 1;
                    continue;
                }
            };

            if self.is_ignored(&entry) {
                if entry.file_type().is_dir() {
                    entries.skip_current_dir();
                }
                continue;
            }

            let parent_id = match entry.path().parent().and_then(|p| dir_nodes.get(p)) {
                Some(&id) => id,
                None => {
                    // The parent was skipped; its descendants go with it.
                    debug!(path = %entry.path().display(), "skipping entry under an unindexed parent");
                    if entry.file_type().is_dir() {
                        entries.skip_current_dir();
                    }
                    skipped += 1;
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                let id = tree.add_dir(Some(parent_id), &entry.file_name().to_string_lossy())?;
                dir_nodes.insert(entry.path().to_path_buf(), id);
            } else if file_type.is_file() {
                match index::index_file(entry.path()) {
                    Ok(file_index) => {
                        attach_file(&mut tree, parent_id, &file_index)?;
                        files += 1;
                    }
                    Err(e) => {
                        warn!(path = %entry.path().display(), "skipping unreadable file: {e}");
                        skipped += 1;
                    }
                }
            } else {
                // Symlinks, devices, sockets: not indexed.
                debug!(path = %entry.path().display(), "skipping non-regular entry");
            }
        }

        info!(
            nodes = tree.len(),
            files,
            skipped,
            duration_ms = started.elapsed().as_millis() as u64,
            "indexed directory tree"
        );

        Ok((tree, root_id))
    }

    /// Index the subtree and return the root directory's digest, computing
    /// every descendant directory's digest along the way.
    pub fn root_digest(&self) -> Result<Digest, IndexError> {
        let (mut tree, root) = self.build()?;
        Ok(tree.digest(root))
    }

    fn is_ignored(&self, entry: &walkdir::DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.options.ignore.iter().any(|pattern| name == pattern.as_str())
    }
}

/// Attach an indexed file and its blocks under a directory node.
pub fn attach_file(
    tree: &mut Tree,
    parent: NodeId,
    file: &FileIndex,
) -> Result<NodeId, IndexError> {
    let file_id = tree.add_file(parent, &file.name, file.size, file.strong)?;
    for block in &file.blocks {
        tree.add_block(file_id, block.offset, block.weak, block.strong)?;
    }
    Ok(file_id)
}

/// Name of the root node: the root path's final component.
fn root_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn single_file_tree() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("test.txt"), "test content").unwrap();

        let (tree, root) = TreeBuilder::new(temp.path()).build().unwrap();
        // root dir + file + one block
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn empty_directories_are_indexed() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("empty")).unwrap();

        let (tree, root) = TreeBuilder::new(temp.path()).build().unwrap();
        let empty = tree.child_named(root, "empty").unwrap();
        assert!(tree.kind(empty).is_dir());
        assert!(tree.children(empty).is_empty());
    }

    #[test]
    fn nested_structure_is_attached_to_the_right_parents() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::write(temp.path().join("a/b/deep.txt"), "deep").unwrap();
        fs::write(temp.path().join("top.txt"), "top").unwrap();

        let (tree, root) = TreeBuilder::new(temp.path()).build().unwrap();
        let deep = tree.resolve(root, "a/b/deep.txt").unwrap();
        assert!(tree.kind(deep).is_file());

        let b = tree.resolve(root, "a/b").unwrap();
        assert_eq!(tree.parent(deep), Some(b));
    }

    #[test]
    fn root_digest_is_deterministic() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("test.txt"), "test content").unwrap();

        let builder = TreeBuilder::new(temp.path());
        assert_eq!(
            builder.root_digest().unwrap(),
            builder.root_digest().unwrap()
        );
    }

    #[test]
    fn ignored_names_prune_whole_subtrees() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("file.txt"), "content").unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        fs::write(temp.path().join(".git/config"), "git config").unwrap();

        let options = ScanOptions {
            ignore: vec![".git".to_string()],
            ..ScanOptions::default()
        };
        let (tree, root) = TreeBuilder::new(temp.path())
            .with_options(options)
            .build()
            .unwrap();

        assert!(tree.child_named(root, ".git").is_none());
        assert!(tree.child_named(root, "file.txt").is_some());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("real.txt"), "real").unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("real.txt"),
            temp.path().join("link.txt"),
        )
        .unwrap();

        let (tree, root) = TreeBuilder::new(temp.path()).build().unwrap();
        assert!(tree.child_named(root, "link.txt").is_none());
        assert!(tree.child_named(root, "real.txt").is_some());
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlink_does_not_abort_the_scan() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ok.txt"), "ok").unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("missing"),
            temp.path().join("dangling"),
        )
        .unwrap();

        let (tree, root) = TreeBuilder::new(temp.path()).build().unwrap();
        assert!(tree.child_named(root, "ok.txt").is_some());
    }

    #[test]
    fn root_must_be_a_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "not a dir").unwrap();
        assert!(TreeBuilder::new(&file).build().is_err());
        assert!(TreeBuilder::new(temp.path().join("missing")).build().is_err());
    }

    #[test]
    fn root_node_is_named_after_the_final_component() {
        let temp = TempDir::new().unwrap();
        let named = temp.path().join("myroot");
        fs::create_dir(&named).unwrap();

        let (tree, root) = TreeBuilder::new(&named).build().unwrap();
        assert_eq!(tree.name(root), Some("myroot"));
    }
}
