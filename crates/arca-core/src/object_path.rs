//! Attachment object path generation.
//!
//! Paths are collision-resistant: a millisecond timestamp plus a random
//! alphanumeric suffix, keeping the original file extension so stores and
//! browsers can infer content handling.
//!
//! Example: `docs/1700000000000_x1y2z3.pdf`

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Key prefix for all document attachments within the store.
pub const OBJECT_PREFIX: &str = "docs";

/// Length of the random suffix appended after the timestamp.
const SUFFIX_LEN: usize = 6;

/// Generate a fresh object path for an uploaded file.
///
/// The original extension (if any) is preserved in lowercase; the rest of
/// the client file name never reaches the store.
pub fn generate_object_path(file_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();

    match extension(file_name) {
        Some(ext) => format!("{}/{}_{}.{}", OBJECT_PREFIX, millis, suffix, ext),
        None => format!("{}/{}_{}", OBJECT_PREFIX, millis, suffix),
    }
}

/// Extract a lowercase extension from a client file name.
fn extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
