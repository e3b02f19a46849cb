//! Decoding of OBO tag values
//!
//! A raw value may carry a quoted string, trailing `{qualifier=...}`
//! modifiers and a `! comment`. These helpers peel those layers off.

/// Drop a trailing `! comment` and `{...}` modifier block.
///
/// `!` only starts a comment outside quotes and at a word boundary.
pub(crate) fn strip_trailing(value: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    let mut prev_space = true;
    let mut cut = value.len();
    let mut brace_start = None;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            prev_space = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '!' if !in_quotes && prev_space => {
                cut = i;
                break;
            }
            '{' if !in_quotes && prev_space && brace_start.is_none() => brace_start = Some(i),
            _ => {}
        }
        prev_space = c.is_whitespace();
    }

    let mut stripped = value[..cut].trim_end();
    if let Some(start) = brace_start {
        if start < stripped.len() && stripped.ends_with('}') {
            stripped = stripped[..start].trim_end();
        }
    }
    stripped.trim_start()
}

/// First whitespace-delimited token, e.g. the id in `HP:0000118 ! Phenotypic abnormality`
pub(crate) fn first_token(value: &str) -> Option<&str> {
    strip_trailing(value).split_whitespace().next()
}

/// First quoted string (with `\"`, `\\`, `\n`, `\t` escapes) and the text after it
pub(crate) fn quoted(value: &str) -> Option<(String, &str)> {
    let start = value.find('"')? + 1;
    let mut text = String::new();
    let mut escaped = false;

    for (i, c) in value[start..].char_indices() {
        if escaped {
            text.push(match c {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => return Some((text, &value[start + i + 1..])),
            _ => text.push(c),
        }
    }

    None
}
