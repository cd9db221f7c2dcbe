//! CLI surface: argument parsing and command execution.

use crate::error::IndexError;
use crate::tree::builder::{ScanOptions, TreeBuilder};
use crate::tree::node::{NodeId, NodeKind, Tree};
use crate::tree::path;
use crate::types::Digest;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Content-addressed filesystem indexer.
#[derive(Debug, Parser)]
#[command(name = "blocktree", version, about)]
pub struct Cli {
    /// Log level: trace, debug, info, warn, error, off.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format: text or json.
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Reduce logging to errors only.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug-level logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Index a directory tree and print a digest per file and directory.
    Scan(ScanArgs),
    /// Print the canonical child listing of an indexed directory.
    Listing(ListingArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Root directory to index.
    pub path: PathBuf,

    /// Also print one line per block (offset, weak, strong).
    #[arg(long)]
    pub blocks: bool,

    /// Emit the index as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Entry name to skip entirely (repeatable), e.g. --ignore .git
    #[arg(long = "ignore", value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Follow symbolic links instead of skipping them.
    #[arg(long)]
    pub follow_symlinks: bool,
}

#[derive(Debug, Args)]
pub struct ListingArgs {
    /// Root directory to index.
    pub path: PathBuf,

    /// Directory inside the tree, relative to the root (default: the root).
    pub dir: Option<String>,

    /// Entry name to skip entirely (repeatable).
    #[arg(long = "ignore", value_name = "NAME")]
    pub ignore: Vec<String>,
}

/// Execute a parsed command, returning the text for stdout.
pub fn run(cli: &Cli) -> Result<String, IndexError> {
    match &cli.command {
        Commands::Scan(args) => run_scan(args),
        Commands::Listing(args) => run_listing(args),
    }
}

#[derive(Debug, Serialize)]
struct ScanReport {
    root: String,
    root_digest: Digest,
    entries: Vec<EntryReport>,
}

#[derive(Debug, Serialize)]
struct EntryReport {
    path: String,
    kind: &'static str,
    digest: Digest,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocks: Option<Vec<BlockReport>>,
}

#[derive(Debug, Serialize)]
struct BlockReport {
    offset: u64,
    weak: u32,
    strong: Digest,
}

fn scan_options(ignore: &[String], follow_symlinks: bool) -> ScanOptions {
    ScanOptions {
        follow_symlinks,
        ignore: ignore.to_vec(),
        max_depth: None,
    }
}

/// All named nodes of the tree, sorted by reconstructed path.
fn named_nodes(tree: &Tree, root: NodeId) -> Result<Vec<(PathBuf, NodeId)>, IndexError> {
    let mut ids = Vec::new();
    tree.walk(root, |tree, id| {
        if tree.name(id).is_some() {
            ids.push(id);
        }
        // Blocks are reported with their file, not walked into.
        !tree.kind(id).is_file()
    });

    let mut named = Vec::with_capacity(ids.len());
    for id in ids {
        named.push((path::node_path(tree, id)?, id));
    }
    named.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(named)
}

fn block_reports(tree: &mut Tree, file: NodeId) -> Vec<BlockReport> {
    let children = tree.children(file).to_vec();
    let mut reports = Vec::with_capacity(children.len());
    for child in children {
        let (offset, weak) = match *tree.kind(child) {
            NodeKind::Block { offset, weak } => (offset, weak),
            _ => continue,
        };
        reports.push(BlockReport {
            offset,
            weak,
            strong: tree.digest(child),
        });
    }
    reports
}

fn run_scan(args: &ScanArgs) -> Result<String, IndexError> {
    let (mut tree, root) = TreeBuilder::new(&args.path)
        .with_options(scan_options(&args.ignore, args.follow_symlinks))
        .build()?;
    let root_digest = tree.digest(root);
    let named = named_nodes(&tree, root)?;

    if args.json {
        let mut entries = Vec::with_capacity(named.len());
        for (path, id) in &named {
            let size = match *tree.kind(*id) {
                NodeKind::File { size, .. } => Some(size),
                _ => None,
            };
            let blocks = match size {
                Some(_) if args.blocks => Some(block_reports(&mut tree, *id)),
                _ => None,
            };
            entries.push(EntryReport {
                path: path.display().to_string(),
                kind: if size.is_some() { "file" } else { "dir" },
                digest: tree.digest(*id),
                size,
                blocks,
            });
        }
        let report = ScanReport {
            root: args.path.display().to_string(),
            root_digest,
            entries,
        };
        return serde_json::to_string_pretty(&report)
            .map_err(|e| IndexError::Config(format!("serializing scan report: {e}")));
    }

    let mut out = String::new();
    for (path, id) in &named {
        out.push_str(&format!("{}  {}\n", tree.digest(*id), path.display()));
        let is_file = tree.kind(*id).is_file();
        if args.blocks && is_file {
            for block in block_reports(&mut tree, *id) {
                out.push_str(&format!(
                    "  {:>12}  {:08x}  {}\n",
                    block.offset, block.weak, block.strong
                ));
            }
        }
    }
    Ok(out)
}

fn run_listing(args: &ListingArgs) -> Result<String, IndexError> {
    let (mut tree, root) = TreeBuilder::new(&args.path)
        .with_options(scan_options(&args.ignore, false))
        .build()?;

    let dir = match &args.dir {
        Some(rel) => tree.resolve(root, rel).ok_or_else(|| {
            IndexError::InvalidPath(format!("{rel} not found under {}", args.path.display()))
        })?,
        None => root,
    };
    tree.listing(dir)
}
