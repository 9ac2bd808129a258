//! Driver key formatting and parsing
//!
//! Keys look like `driver:<id>` with a plain decimal id (no padding).

/// Build the hash key of driver `id`
pub fn driver_key(prefix: &str, id: u64) -> String {
    let mut buf = itoa::Buffer::new();
    let mut key = String::with_capacity(prefix.len() + 20);
    key.push_str(prefix);
    key.push_str(buf.format(id));
    key
}

/// Parse the id out of `prefix<id>`. Anything else yields `None`.
pub fn parse_driver_id(key: &str, prefix: &str) -> Option<u64> {
    key.strip_prefix(prefix)?.parse().ok()
}

/// Ids of every well-formed key, in input order; malformed keys are skipped
pub fn extract_driver_ids(keys: &[String], prefix: &str) -> Vec<u64> {
    keys.iter()
        .filter_map(|k| parse_driver_id(k, prefix))
        .collect()
}
