use crate::adf::Mark;

/// Wraps text in the syntax of each mark, last mark innermost.
pub fn apply_marks(text: &str, marks: &[Mark]) -> String {
    let mut result = text.to_string();
    for mark in marks.iter().rev() {
        result = match mark.kind.as_str() {
            "strong" => format!("**{}**", result),
            "em" => format!("*{}*", result),
            "code" => format!("`{}`", result),
            "strike" => format!("~~{}~~", result),
            "underline" => format!("<u>{}</u>", result),
            "link" => format_link(&result, mark),
            "subsup" => format_subsup(&result, mark),
            "textColor" => format_text_color(&result, mark),
            "backgroundColor" => format_background_color(&result, mark),
            other => {
                tracing::trace!("Ignoring unsupported mark: {}", other);
                result
            }
        };
    }
    result
}

fn format_link(text: &str, mark: &Mark) -> String {
    let href = mark.attr_str("href").unwrap_or("");

    if href.is_empty() {
        return text.to_string();
    }

    let href_lower = href.to_lowercase();
    if href_lower.starts_with("javascript:")
        || href_lower.starts_with("vbscript:")
        || href_lower.starts_with("data:")
    {
        return text.to_string();
    }

    match mark.attr_str("title").filter(|t| !t.is_empty()) {
        Some(title) => format!("[{}]({} \"{}\")", text, href, title),
        None => format!("[{}]({})", text, href),
    }
}

fn format_subsup(text: &str, mark: &Mark) -> String {
    match mark.attr_str("type") {
        Some("sub") => format!("<sub>{}</sub>", text),
        _ => format!("<sup>{}</sup>", text),
    }
}

fn format_text_color(text: &str, mark: &Mark) -> String {
    match mark.attr_str("color").filter(|c| !c.is_empty()) {
        Some(color) => format!("<span style=\"color:{}\">{}</span>", color, text),
        None => text.to_string(),
    }
}

fn format_background_color(text: &str, mark: &Mark) -> String {
    match mark.attr_str("color").filter(|c| !c.is_empty()) {
        Some(color) => format!("<mark style=\"background:{}\">{}</mark>", color, text),
        None => text.to_string(),
    }
}
