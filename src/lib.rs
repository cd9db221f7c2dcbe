//! blocktree: content-addressed indexing of a filesystem subtree.
//!
//! Every block of every file, every file, and every directory is assigned a
//! strong digest such that identical content yields identical digests
//! anywhere in the tree, and any change propagates up to the root. The
//! index, together with the rolling weak checksum, is the foundation of an
//! rsync-style synchronization tool: a remote peer can tell, digest by
//! digest, which blocks, files, and directories already match and which
//! must be transferred.

pub mod checksum;
pub mod cli;
pub mod error;
pub mod hasher;
pub mod index;
pub mod logging;
pub mod tree;
pub mod types;
