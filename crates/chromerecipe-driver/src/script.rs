//! JavaScript snippets evaluated in the page.

/// Quote a Rust string as a JavaScript string literal.
fn js_string(s: &str) -> String {
    // JSON string literals are valid JavaScript string literals.
    serde_json::Value::String(s.to_string()).to_string()
}

/// Expression evaluating to `true` once the first match of `selector` is
/// rendered with a non-empty box and not hidden by CSS.
pub(crate) fn is_visible(selector: &str) -> String {
    format!(
        r#"(() => {{
    const el = document.querySelector({sel});
    if (!el) return false;
    const style = window.getComputedStyle(el);
    if (style.visibility === 'hidden' || style.display === 'none') return false;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}})()"#,
        sel = js_string(selector)
    )
}

/// Expression assigning `.value` on the first match of `selector`; evaluates
/// to `false` when nothing matches.
pub(crate) fn set_value(selector: &str, value: &str) -> String {
    format!(
        r#"(() => {{
    const el = document.querySelector({sel});
    if (!el) return false;
    el.value = {val};
    return true;
}})()"#,
        sel = js_string(selector),
        val = js_string(value)
    )
}

/// Function declaration returning the receiver's text content.
pub(crate) const TEXT_CONTENT: &str = "function() { return this.textContent; }";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_is_quoted() {
        let js = is_visible(r#"div[data-x="a'b"]"#);
        assert!(js.contains(r#"document.querySelector("div[data-x=\"a'b\"]")"#));
    }

    #[test]
    fn test_value_is_quoted() {
        let js = set_value("#q", "line1\nline2");
        assert!(js.contains(r#"el.value = "line1\nline2";"#));
    }
}
