// src/dom/parse.rs
//
// Tolerant tag-soup parser. Enough HTML for shop listing pages: comments,
// doctype, void elements, raw-text script/style, quoted/unquoted attributes,
// stray close tags. Anything it cannot make sense of is kept as text.

use super::{Document, NodeId, is_raw_text, is_void};
use crate::core::html::to_lower;
use crate::core::sanitize::decode_entities;

pub fn parse(html: &str) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    let mut stack: Vec<NodeId> = vec![root];

    let b = html.as_bytes();
    let mut i = 0usize;
    let mut text_start = 0usize;

    while i < b.len() {
        if b[i] != b'<' {
            i += 1;
            continue;
        }

        let rest = &html[i..];

        if rest.starts_with("<!--") {
            flush_text(&mut doc, &stack, &html[text_start..i]);
            i = match rest.find("-->") {
                Some(p) => i + p + 3,
                None => b.len(),
            };
            text_start = i;
        } else if rest.starts_with("</") {
            flush_text(&mut doc, &stack, &html[text_start..i]);
            let (name, after) = read_close_tag(html, i);
            if let Some(name) = name {
                // pop to the matching open element; ignore a close with no match
                if let Some(pos) = stack.iter().rposition(|&id| doc.tag(id) == Some(name.as_str())) {
                    if pos > 0 {
                        stack.truncate(pos);
                    }
                }
            }
            i = after;
            text_start = i;
        } else if rest.len() > 1 && rest.as_bytes()[1].is_ascii_alphabetic() {
            flush_text(&mut doc, &stack, &html[text_start..i]);
            let (tag, attrs, self_closing, after) = read_open_tag(html, i);

            let el = doc.create_element(&tag);
            doc.push_raw_attrs(el, attrs);
            let top = *stack.last().unwrap_or(&root);
            doc.append_child(top, el);

            if self_closing || is_void(&tag) {
                i = after;
            } else if is_raw_text(&tag) {
                // swallow everything up to the matching close tag, verbatim
                let close = format!("</{}", tag);
                let lc = to_lower(&html[after..]);
                match lc.find(&close) {
                    Some(p) => {
                        if p > 0 {
                            let raw = doc.create_text(&html[after..after + p]);
                            doc.append_child(el, raw);
                        }
                        let close_end = html[after + p..]
                            .find('>')
                            .map(|g| after + p + g + 1)
                            .unwrap_or(b.len());
                        i = close_end;
                    }
                    None => {
                        if after < b.len() {
                            let raw = doc.create_text(&html[after..]);
                            doc.append_child(el, raw);
                        }
                        i = b.len();
                    }
                }
            } else {
                stack.push(el);
                i = after;
            }
            text_start = i;
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            flush_text(&mut doc, &stack, &html[text_start..i]);
            let gt = rest.find('>').map(|p| i + p + 1).unwrap_or(b.len());
            let lc = to_lower(&rest[..(gt - i).min(rest.len())]);
            if let Some(inner) = lc.strip_prefix("<!doctype") {
                let inner = inner.trim_end_matches('>').trim();
                if !inner.is_empty() {
                    doc.set_doctype(inner);
                }
            }
            i = gt;
            text_start = i;
        } else {
            // literal '<' in text
            i += 1;
        }
    }

    flush_text(&mut doc, &stack, &html[text_start..]);
    doc
}

fn flush_text(doc: &mut Document, stack: &[NodeId], text: &str) {
    if text.is_empty() {
        return;
    }
    let top = *stack.last().expect("stack holds root");
    let node = doc.create_text(&decode_entities(text));
    doc.append_child(top, node);
}

/// `</name ... >` → (Some(lowercased name), index after '>').
fn read_close_tag(html: &str, at: usize) -> (Option<String>, usize) {
    let b = html.as_bytes();
    let mut j = at + 2;
    let name_start = j;
    while j < b.len() && (b[j].is_ascii_alphanumeric() || b[j] == b'-') {
        j += 1;
    }
    let name = if j > name_start {
        Some(to_lower(&html[name_start..j]))
    } else {
        None
    };
    while j < b.len() && b[j] != b'>' {
        j += 1;
    }
    (name, (j + 1).min(html.len()))
}

/// `<name attr="v" ...>` → (name, attrs, self_closing, index after '>').
/// Attribute names are lowercased; values entity-decoded.
fn read_open_tag(html: &str, at: usize) -> (String, Vec<(String, String)>, bool, usize) {
    let b = html.as_bytes();
    let mut j = at + 1;

    let name_start = j;
    while j < b.len() && (b[j].is_ascii_alphanumeric() || b[j] == b'-') {
        j += 1;
    }
    let tag = to_lower(&html[name_start..j]);

    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        while j < b.len() && b[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= b.len() {
            break;
        }
        if b[j] == b'>' {
            j += 1;
            break;
        }
        if b[j] == b'/' {
            if j + 1 < b.len() && b[j + 1] == b'>' {
                self_closing = true;
                j += 2;
                break;
            }
            j += 1;
            continue;
        }

        // attribute name
        let an_start = j;
        while j < b.len()
            && !b[j].is_ascii_whitespace()
            && b[j] != b'='
            && b[j] != b'>'
            && b[j] != b'/'
        {
            j += 1;
        }
        let an = to_lower(&html[an_start..j]);
        if an.is_empty() {
            j += 1;
            continue;
        }

        while j < b.len() && b[j].is_ascii_whitespace() {
            j += 1;
        }

        let mut value = s!();
        if j < b.len() && b[j] == b'=' {
            j += 1;
            while j < b.len() && b[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < b.len() && (b[j] == b'"' || b[j] == b'\'') {
                let quote = b[j];
                j += 1;
                let v_start = j;
                while j < b.len() && b[j] != quote {
                    j += 1;
                }
                value = decode_entities(&html[v_start..j]);
                if j < b.len() {
                    j += 1; // closing quote
                }
            } else {
                let v_start = j;
                while j < b.len() && !b[j].is_ascii_whitespace() && b[j] != b'>' {
                    j += 1;
                }
                value = decode_entities(&html[v_start..j]);
            }
        }
        attrs.push((an, value));
    }

    (tag, attrs, self_closing, j.min(html.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeData;

    fn first_text(doc: &Document, root: NodeId) -> Option<String> {
        let mut stack: Vec<NodeId> = doc.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(t) = doc.text(id) {
                return Some(s!(t));
            }
            for &c in doc.children(id).iter().rev() {
                stack.push(c);
            }
        }
        None
    }

    #[test]
    fn parses_nested_elements_and_text() {
        let doc = parse("<div><p>Set N12345</p><p>next</p></div>");
        let root = doc.root();
        let div = doc.children(root)[0];
        assert_eq!(doc.tag(div), Some("div"));
        assert_eq!(doc.children(div).len(), 2);
        assert_eq!(first_text(&doc, root).as_deref(), Some("Set N12345"));
    }

    #[test]
    fn decodes_entities_in_text_and_attrs() {
        let doc = parse(r#"<a title="Fish &amp; Chips">A &lt; B</a>"#);
        let a = doc.children(doc.root())[0];
        assert_eq!(doc.attr(a, "title"), Some("Fish & Chips"));
        assert_eq!(first_text(&doc, doc.root()).as_deref(), Some("A < B"));
    }

    #[test]
    fn script_content_is_one_raw_text_node() {
        let doc = parse("<script>if (a < b) { x = \"<div>\"; }</script><p>after</p>");
        let root = doc.root();
        let script = doc.children(root)[0];
        assert_eq!(doc.tag(script), Some("script"));
        assert_eq!(doc.children(script).len(), 1);
        assert_eq!(
            doc.text(doc.children(script)[0]),
            Some("if (a < b) { x = \"<div>\"; }")
        );
        assert_eq!(doc.tag(doc.children(root)[1]), Some("p"));
    }

    #[test]
    fn void_and_self_closing_tags_do_not_nest() {
        let doc = parse("<p>a<br>b<img src=x.png>c</p>");
        let p = doc.children(doc.root())[0];
        // a, br, b, img, c
        assert_eq!(doc.children(p).len(), 5);
        assert_eq!(doc.tag(doc.children(p)[1]), Some("br"));
        assert_eq!(doc.attr(doc.children(p)[3], "src"), Some("x.png"));
    }

    #[test]
    fn stray_close_tag_is_ignored() {
        let doc = parse("<div>a</span>b</div>");
        let div = doc.children(doc.root())[0];
        assert_eq!(doc.children(div).len(), 2); // "a", "b"
    }

    #[test]
    fn doctype_survives_round_trip() {
        let doc = parse("<!DOCTYPE html><html><body>x</body></html>");
        assert!(doc.to_html().starts_with("<!doctype html>"));
    }

    #[test]
    fn unquoted_and_boolean_attributes() {
        let doc = parse("<input type=checkbox checked data-i='7'>");
        let input = doc.children(doc.root())[0];
        assert_eq!(doc.attr(input, "type"), Some("checkbox"));
        assert_eq!(doc.attr(input, "checked"), Some(""));
        assert_eq!(doc.attr(input, "data-i"), Some("7"));
    }

    #[test]
    fn serialization_round_trips_simple_page() {
        let src = r#"<div class="x"><p>M4321 &amp; more</p></div>"#;
        let doc = parse(src);
        assert_eq!(doc.to_html(), src);
    }

    #[test]
    fn literal_lt_stays_text() {
        let doc = parse("<p>5 < 6</p>");
        let p = doc.children(doc.root())[0];
        assert_eq!(doc.text(doc.children(p)[0]), Some("5 < 6"));
    }

    #[test]
    fn data_is_element_or_text_only() {
        let doc = parse("<b>x</b>");
        let b = doc.children(doc.root())[0];
        assert!(matches!(doc.node(b).data, NodeData::Element { .. }));
    }
}
