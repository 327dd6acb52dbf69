use crate::assets::codec::OutputFormat;
use crate::naming::sanitize::sanitize_base;

/// How a freshly transformed sticker is named.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// `NNN_<sanitized original>.png`, `NNN` counting successful transforms from 1.
    #[default]
    Prefixed,
    /// `<sanitized original>.png`.
    KeepOriginal,
}

/// Original file name without its last extension; the whole name when that would be empty.
pub fn original_base(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}

/// Candidate name (before collision resolution) for the `seq`-th successful transform.
pub fn sticker_candidate(
    policy: NamingPolicy,
    seq: u32,
    file_name: &str,
    max_len: usize,
) -> String {
    let base = sanitize_base(original_base(file_name), max_len);
    let ext = OutputFormat::Png.extension();
    match policy {
        NamingPolicy::Prefixed => format!("{seq:03}_{base}{ext}"),
        NamingPolicy::KeepOriginal => format!("{base}{ext}"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/naming/policy.rs"]
mod tests;
