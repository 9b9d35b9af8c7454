use sha2::{Digest, Sha256};

/// Fingerprint of everything that determines generated content for a clue.
///
/// Clue and answer are trimmed, so whitespace-only differences share a key.
pub fn cache_key(model: &str, prompt_version: &str, clue: &str, answer: &str) -> String {
    let mut h = Sha256::new();
    h.update(b"model=");
    h.update(model.as_bytes());
    h.update(b"\nprompt_version=");
    h.update(prompt_version.as_bytes());
    h.update(b"\nclue=");
    h.update(clue.trim().as_bytes());
    h.update(b"\nanswer=");
    h.update(answer.trim().as_bytes());
    hex::encode(h.finalize())
}
