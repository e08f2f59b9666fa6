/* src/strings/src/key.rs */

use sha2::{Digest, Sha256};

/// Length in hex chars of a string key (128 bits).
pub const KEY_LEN: usize = 32;

/// Hash canonical translatable text to its string key.
///
/// Keys are purely content-derived: the same text in any template, at any
/// call site, hashes to the same key. First 16 bytes of SHA-256 as lowercase
/// hex.
pub fn string_key(text: &str) -> String {
  let digest = Sha256::digest(text.as_bytes());
  hex::encode(&digest[..KEY_LEN / 2])
}

/// True if `s` already has the shape of a string key (32 lowercase hex
/// chars). Used by the extractor to refuse re-compiling compiled source.
pub fn is_string_key(s: &str) -> bool {
  s.len() == KEY_LEN && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
