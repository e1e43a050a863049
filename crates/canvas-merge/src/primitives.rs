//! Conflict rules shared by every level of the merge.

/// Prefix of the `lastAction` tag that signals a deletion.
pub const DELETED_PREFIX: &str = "deleted:";

/// Take `incoming` if it is present and non-blank after trimming, else keep
/// `cached`.
///
/// Agents echo empty strings for fields they did not touch, so an empty
/// incoming value never overwrites.
pub fn prefer_non_empty(incoming: Option<&str>, cached: &str) -> String {
    match incoming {
        Some(s) if !s.trim().is_empty() => s.to_owned(),
        _ => cached.to_owned(),
    }
}

/// The id named by a `deleted:<id>` tag.
///
/// The id must be non-empty and must not contain a line terminator; any other
/// tag names no deletion.
pub fn deleted_id(tag: &str) -> Option<&str> {
    let id = tag.strip_prefix(DELETED_PREFIX)?;
    let breaks_line = |c: char| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}');
    (!id.is_empty() && !id.contains(breaks_line)).then_some(id)
}
