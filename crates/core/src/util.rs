//! Shared helpers for TypeScript identifier and string handling.

/// Check if a property name needs quoting when used as an object or
/// type-literal key.
///
/// Returns true if the name:
/// - Is empty
/// - Doesn't start with a letter, underscore, or dollar sign
/// - Contains characters other than alphanumeric, underscore, or dollar sign
pub fn needs_quoting(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            .unwrap_or(false)
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for use in JavaScript/TypeScript string literals.
/// Escapes backslashes and double quotes.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quote a string if needed for use as a property key.
/// Returns the name quoted with escaped special characters if needed,
/// or the original name if it's a valid identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// Convert a name to PascalCase.
///
/// Words are split on `-`, `_`, `.`, spaces, and lower-to-upper camel
/// boundaries; each word keeps its first letter uppercased and the rest
/// lowercased. Reference-target type names are canonicalized with this
/// before comparison, so `newsItem`, `news-item`, and `NewsItem` all
/// name the same type.
pub fn pascal_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut word_start = true;
    let mut prev_lower = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.' | ' ') {
            word_start = true;
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower {
            word_start = true;
        }
        if word_start {
            result.extend(c.to_uppercase());
            word_start = false;
        } else {
            result.extend(c.to_lowercase());
        }
        prev_lower = c.is_ascii_lowercase();
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_quoting() {
        // Valid identifiers
        assert!(!needs_quoting("foo"));
        assert!(!needs_quoting("_refs"));
        assert!(!needs_quoting("$foo"));
        assert!(!needs_quoting("foo123"));

        // Need quoting
        assert!(needs_quoting(""));
        assert!(needs_quoting("123foo"));
        assert!(needs_quoting("foo-bar"));
        assert!(needs_quoting("foo.bar"));
        assert!(needs_quoting("foo bar"));
    }

    #[test]
    fn test_escape_js_string() {
        assert_eq!(escape_js_string("hello"), "hello");
        assert_eq!(escape_js_string("hel\"lo"), "hel\\\"lo");
        assert_eq!(escape_js_string("hel\\lo"), "hel\\\\lo");
    }

    #[test]
    fn test_quote_if_needed() {
        assert_eq!(quote_if_needed("foo"), "foo");
        assert_eq!(quote_if_needed("foo-bar"), "\"foo-bar\"");
        assert_eq!(quote_if_needed("123"), "\"123\"");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("contact"), "Contact");
        assert_eq!(pascal_case("Contact"), "Contact");
        assert_eq!(pascal_case("news-item"), "NewsItem");
        assert_eq!(pascal_case("newsItem"), "NewsItem");
        assert_eq!(pascal_case("news_item"), "NewsItem");
        assert_eq!(pascal_case(""), "");
    }
}
