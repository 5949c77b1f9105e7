// src/utils/html.rs

/// Sanitizes user-authored display text (quiz titles and descriptions).
///
/// Whitelist-based: safe inline tags survive, `<script>` and friends are
/// removed together with their content, event-handler attributes are dropped.
/// Quiz *content* (questions, options, explanations) is never passed through
/// here; it may contain math markup that must round-trip verbatim.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input.trim())
}

/// `clean_html` for optional fields. Blank input becomes `None`.
pub fn clean_optional(input: Option<&str>) -> Option<String> {
    input
        .map(clean_html)
        .filter(|cleaned| !cleaned.is_empty())
}
