// src/core/sanitize.rs

/// Decode the handful of entities the reference sites actually emit.
/// `&amp;` goes last so `&amp;nbsp;` stays literal.
pub fn normalize_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_decode_once() {
        assert_eq!(normalize_entities("A&nbsp;&amp;&nbsp;M"), "A & M");
        assert_eq!(normalize_entities("&amp;nbsp;"), "&nbsp;");
        assert_eq!(normalize_entities("St. Mary&#39;s"), "St. Mary's");
    }

    #[test]
    fn whitespace_collapses() {
        assert_eq!(normalize_ws("  Tom \n\t Brady "), "Tom Brady");
    }
}
