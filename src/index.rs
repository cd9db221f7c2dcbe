//! File block indexing.
//!
//! Splits a file's byte stream into fixed-size blocks, computing a strong
//! digest and weak checksum per block and a strong digest of the whole
//! stream in the same single pass.

use crate::checksum;
use crate::error::IndexError;
use crate::hasher::{self, Digester};
use crate::types::{Digest, BLOCK_SIZE};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;
use tracing::trace;

/// One fixed-size slice of a file's byte stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockIndex {
    /// Byte offset of the block within the file. A multiple of `BLOCK_SIZE`;
    /// only the final block may cover fewer than `BLOCK_SIZE` bytes.
    pub offset: u64,
    /// Rolling pre-filter checksum of the block bytes.
    pub weak: u32,
    /// Strong digest of exactly the block bytes.
    pub strong: Digest,
}

/// The complete block-level index of one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileIndex {
    /// Final path component of the indexed file.
    pub name: String,
    /// Total length of the byte stream.
    pub size: u64,
    /// Strong digest of the whole byte stream.
    pub strong: Digest,
    /// Blocks in ascending offset order.
    pub blocks: Vec<BlockIndex>,
}

/// Index a single regular file.
///
/// Reads the stream sequentially in `BLOCK_SIZE` chunks, looping on short
/// reads so only the final block may be short. A hard read error fails the
/// whole operation; the caller must not attach a partial index to a tree.
/// A zero-length file yields zero blocks and the digest of the empty stream.
pub fn index_file(path: &Path) -> Result<FileIndex, IndexError> {
    let name = path
        .file_name()
        .ok_or_else(|| IndexError::InvalidPath(format!("{} has no file name", path.display())))?
        .to_string_lossy()
        .into_owned();

    let mut file = File::open(path).map_err(|e| IndexError::io(path, e))?;
    let mut buf = [0u8; BLOCK_SIZE];
    let mut stream_digest = Digester::new();
    let mut blocks = Vec::new();
    let mut offset = 0u64;

    loop {
        let read = read_block(&mut file, &mut buf).map_err(|e| IndexError::io(path, e))?;
        if read == 0 {
            break;
        }
        let chunk = &buf[..read];
        blocks.push(BlockIndex {
            offset,
            weak: checksum::weak(chunk),
            strong: hasher::digest(chunk),
        });
        stream_digest.update(chunk);
        offset += read as u64;
    }

    trace!(path = %path.display(), size = offset, blocks = blocks.len(), "indexed file");

    Ok(FileIndex {
        name,
        size: offset,
        strong: stream_digest.finalize(),
        blocks,
    })
}

/// Fill `buf` from `reader`, stopping short only at end of input.
fn read_block(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
