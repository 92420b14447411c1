//! Field name to wire key conversion.
//!
//! The default transform turns `CamelCase` and `camelCase` identifiers into
//! `snake_case`. Identifiers that are already snake_case come out unchanged,
//! so Rust field names pass through as-is.
//!
//! | Input | Output |
//! |-------|--------|
//! | `PageSize` | `page_size` |
//! | `UserID` | `user_id` |
//! | `HTTPServer` | `http_server` |
//! | `Page2Size` | `page2_size` |
//! | `page_size` | `page_size` |

/// Convert a CamelCase identifier to snake_case.
///
/// An underscore is inserted before an uppercase letter that follows a
/// lowercase letter or a digit, and before the last letter of an uppercase
/// run when a lowercase letter follows it. A leading `r#` is dropped.
///
/// # Examples
///
/// ```
/// use qskit::naming::snake_case;
///
/// assert_eq!(snake_case("PageSize"), "page_size");
/// assert_eq!(snake_case("HTTPServer"), "http_server");
/// assert_eq!(snake_case("page_size"), "page_size");
/// ```
pub fn snake_case(name: &str) -> String {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + name.len() / 2);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 && chars[i - 1] != '_' {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                if prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower)
                {
                    result.push('_');
                }
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

/// Use the declared field name verbatim (minus a leading `r#`).
pub fn verbatim(name: &str) -> String {
    name.strip_prefix("r#").unwrap_or(name).to_string()
}
