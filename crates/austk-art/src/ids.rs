// Identifier normalization. Every externally supplied name passes through one
// of these before it becomes a path or URL segment.

/// Derive an identifier from a human name: lowercase, then keep only
/// `[a-z0-9.-]`. Total and idempotent.
///
/// `name_to_id("Alice In Chains")` is `"aliceinchains"`.
pub fn name_to_id(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
        .collect()
}

/// Derive a hierarchical identifier from a title: like [`name_to_id`] but
/// preserving `/` so albums can nest tracks.
///
/// `title_to_hierarchy("Facelift / 01. We Die Young")` is
/// `"facelift/01.wedieyoung"`.
pub fn title_to_hierarchy(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-' | '/'))
        .collect()
}
