//! Strong digest computation.
//!
//! SHA-1 is the strong checksum used throughout the index: per block, per
//! file, and over each directory's canonical child listing. It serves as a
//! content address, not a security boundary.

use crate::types::Digest;
use sha1::{Digest as _, Sha1};

/// Strong digest of a complete buffer.
pub fn digest(buf: &[u8]) -> Digest {
    Digest::from_bytes(Sha1::digest(buf).into())
}

/// Incremental strong digest for single-pass streaming.
#[derive(Default)]
pub struct Digester {
    inner: Sha1,
}

impl Digester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, buf: &[u8]) {
        self.inner.update(buf);
    }

    pub fn finalize(self) -> Digest {
        Digest::from_bytes(self.inner.finalize().into())
    }
}

/// Canonical textual listing of a directory's direct children.
///
/// One `name \t digest \n` line per child, sorted by name, never by
/// enumeration order (which varies across filesystems). This string is the
/// exact preimage of the directory's digest, and doubles as the printable
/// form of a directory's immediate contents.
pub fn dir_listing(children: &[(String, Digest)]) -> String {
    let mut children: Vec<&(String, Digest)> = children.iter().collect();
    children.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::new();
    for (name, digest) in children {
        out.push_str(name);
        out.push('\t');
        out.push_str(&digest.to_hex());
        out.push('\n');
    }
    out
}

/// Digest of a directory, derived from its children's names and digests.
pub fn dir_digest(children: &[(String, Digest)]) -> Digest {
    digest(dir_listing(children).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    // SHA-1 reference vectors.
    const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
    const ABC_SHA1: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";

    #[test]
    fn digest_of_empty_input() {
        assert_eq!(digest(b"").to_hex(), EMPTY_SHA1);
    }

    #[test]
    fn digest_of_known_input() {
        assert_eq!(digest(b"abc").to_hex(), ABC_SHA1);
    }

    #[test]
    fn streaming_matches_one_shot() {
        let mut streaming = Digester::new();
        streaming.update(b"a");
        streaming.update(b"b");
        streaming.update(b"c");
        assert_eq!(streaming.finalize(), digest(b"abc"));
    }

    #[test]
    fn listing_is_sorted_by_name() {
        let b = digest(b"b");
        let a = digest(b"a");
        let listing = dir_listing(&[("zeta".to_string(), b), ("alpha".to_string(), a)]);
        assert_eq!(
            listing,
            format!("alpha\t{}\nzeta\t{}\n", a.to_hex(), b.to_hex())
        );
    }

    #[test]
    fn dir_digest_ignores_input_order() {
        let children = vec![
            ("one".to_string(), digest(b"1")),
            ("two".to_string(), digest(b"2")),
        ];
        let mut reversed = children.clone();
        reversed.reverse();
        assert_eq!(dir_digest(&children), dir_digest(&reversed));
    }

    #[test]
    fn dir_digest_is_sensitive_to_names() {
        let content = digest(b"same bytes");
        let before = dir_digest(&[("old-name".to_string(), content)]);
        let after = dir_digest(&[("new-name".to_string(), content)]);
        assert_ne!(before, after);
    }

    #[test]
    fn empty_dir_digest_is_digest_of_empty_listing() {
        assert_eq!(dir_digest(&[]).to_hex(), EMPTY_SHA1);
    }
}
