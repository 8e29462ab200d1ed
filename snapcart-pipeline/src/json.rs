//! Extraction of a JSON object embedded in free-form model text.
//!
//! Models asked for structured output routinely wrap the JSON in prose
//! or markdown fences. Both the vision and ranking callers locate the
//! first balanced `{...}` substring and parse only that; when there is
//! no such substring the caller treats the reply as "no answer" rather
//! than failing.

/// Return the first balanced `{...}` substring of `text`, if any.
///
/// The scan is string-aware: braces inside JSON string literals (and
/// escaped quotes inside those) do not affect nesting depth. Returns
/// `None` when no opening brace exists or the braces never balance.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_object() {
        assert_eq!(extract_json_object(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn extracts_object_wrapped_in_prose() {
        let text = "Sure! Here is the result:\n```json\n{\"match_found\": true}\n``` hope that helps";
        assert_eq!(extract_json_object(text), Some(r#"{"match_found": true}"#));
    }

    #[test]
    fn handles_nested_objects() {
        let text = r#"prefix {"outer": {"inner": 2}} suffix"#;
        assert_eq!(extract_json_object(text), Some(r#"{"outer": {"inner": 2}}"#));
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        let text = r#"{"reasoning": "uses } and { freely", "n": 1}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn escaped_quotes_inside_strings() {
        let text = r#"{"reasoning": "she said \"no}\" twice"}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn no_object_returns_none() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object(""), None);
    }

    #[test]
    fn unbalanced_braces_return_none() {
        assert_eq!(extract_json_object(r#"{"a": 1"#), None);
    }
}
