//! Name normalisation shared by every translator.

/// Derives the runtime resource name from a catalog name.
///
/// Only the last `/` segment is kept; the result is lowercased and every
/// character outside `[a-z0-9]` becomes `-`, with leading and trailing
/// dashes trimmed. `io.example/echo` becomes `echo`.
#[must_use]
pub fn runtime_name(catalog_name: &str) -> String {
    let last_segment = catalog_name.rsplit('/').next().unwrap_or(catalog_name);
    let mapped: String = last_segment
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() {
                character.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let mut collapsed = String::with_capacity(mapped.len());
    for character in mapped.chars() {
        if character == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(character);
    }
    collapsed.trim_matches('-').to_owned()
}

/// Makes a version string safe for use as a single path segment.
#[must_use]
pub fn sanitize_version(version: &str) -> String {
    let sanitized: String = version
        .trim()
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || matches!(character, '.' | '-' | '_') {
                character
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() || sanitized.chars().all(|character| character == '.') {
        return "latest".to_owned();
    }
    sanitized
}
