// src/core/html.rs
pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii() {
                c.to_ascii_lowercase()
            } else {
                c
            }
        })
        .collect()
}

/// Inner text of the first `open_pat … '>' … close_pat` region, case-insensitive.
/// `open_pat` may stop short of the tag's attributes ("<h1" matches `<h1 class=x>`).
pub fn slice_between_ci<'a>(s: &'a str, open_pat: &str, close_pat: &str) -> Option<&'a str> {
    let lc = to_lower(s);
    let open = to_lower(open_pat);
    let close = to_lower(close_pat);
    let o = lc.find(&open)?;
    let after = s[o..].find('>')? + o + 1;
    let cr = lc[after..].find(&close)?;
    Some(&s[after..after + cr])
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    super::sanitize::normalize_ws(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_between_handles_attributes_and_case() {
        let doc = r#"<H1 class="page-head">Fire Temple</H1>"#;
        assert_eq!(slice_between_ci(doc, "<h1", "</h1>"), Some("Fire Temple"));
    }

    #[test]
    fn slice_between_missing_close_is_none() {
        assert_eq!(slice_between_ci("<title>Oops", "<title", "</title>"), None);
    }

    #[test]
    fn strip_tags_collapses_whitespace() {
        assert_eq!(strip_tags("<b>Fire</b>\n  <i>Temple</i>"), "Fire Temple");
    }
}
