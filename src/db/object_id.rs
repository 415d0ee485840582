//! ObjectId-style identifiers for documents inserted without an `_id`
//!
//! 12 bytes rendered as 24 lowercase hex digits: a 4-byte big-endian Unix
//! timestamp, a 5-byte per-process value, and a 3-byte counter.

use std::fmt::Write;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;

static COUNTER: AtomicU32 = AtomicU32::new(0);
static PROCESS_PART: LazyLock<[u8; 5]> = LazyLock::new(|| {
    let pid = std::process::id().to_be_bytes();
    let nanos = Utc::now().timestamp_subsec_nanos();
    [pid[0], pid[1], pid[2], pid[3], (nanos & 0xff) as u8]
});

/// Generate a new identifier
pub fn generate() -> String {
    let timestamp = (Utc::now().timestamp() as u32).to_be_bytes();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed).to_be_bytes();

    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&timestamp);
    bytes[4..9].copy_from_slice(&*PROCESS_PART);
    bytes[9..].copy_from_slice(&count[1..]);

    bytes.iter().fold(String::with_capacity(24), |mut hex, b| {
        let _ = write!(hex, "{b:02x}");
        hex
    })
}

/// Whether `s` looks like a generated identifier
pub fn is_valid(s: &str) -> bool {
    s.len() == 24 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
