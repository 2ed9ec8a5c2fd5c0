use crate::feature::Attributes;

/// Escape text for use in HTML element content and quoted attribute values.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Build popup HTML: one `<b>label:</b> value` line per attribute, in attribute
/// order, skipping the `excluded` (style) attributes.
pub(crate) fn popup_html(attributes: &Attributes, excluded: &[&str]) -> String {
    let mut out = String::from(r#"<div style="width: 250px; word-wrap: break-word;">"#);
    for (key, value) in attributes.iter().filter(|(key, _)| !excluded.contains(key)) {
        out.push_str(&format!("<b>{}:</b> {}<br>", escape_html(key), escape_html(&value.to_string())));
    }
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::AttrValue;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">R&D</a>"#), "&lt;a href=&quot;x&quot;&gt;R&amp;D&lt;/a&gt;");
    }

    #[test]
    fn lists_attributes_in_order_without_style_fields() {
        let attributes: Attributes = [
            ("Project", AttrValue::from("Plant-1")),
            ("Color", AttrValue::from("red")),
            ("Capacity", AttrValue::Number(12.0)),
            ("Line_wt", AttrValue::Number(2.0)),
            ("Owner", AttrValue::Null),
        ].into_iter().collect();

        let html = popup_html(&attributes, &["Color", "Line_wt"]);
        assert_eq!(
            html,
            r#"<div style="width: 250px; word-wrap: break-word;"><b>Project:</b> Plant-1<br><b>Capacity:</b> 12<br><b>Owner:</b> <br></div>"#,
        );
    }

    #[test]
    fn values_are_escaped() {
        let attributes: Attributes = [("Note", "<script>")].into_iter().collect();
        assert!(popup_html(&attributes, &[]).contains("&lt;script&gt;"));
    }
}
