use std::collections::HashMap;

use mail_send::mail_builder::MessageBuilder;
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches `#key#`; keys may contain anything but `#` and line breaks.
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#([^#\r\n]+)#").unwrap());

/// Replace `#key#` with values from `fields`; leave unknown `#key#` intact.
///
/// Substituted values are inserted verbatim (no HTML escaping) and are
/// never scanned again, so a value that itself looks like a placeholder
/// stays as it is.
pub fn render_template(template: &str, fields: &HashMap<String, String>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(caps) = PLACEHOLDER_RE.captures_at(template, search) {
        let Some(placeholder) = caps.get(0) else {
            break;
        };
        match fields.get(&caps[1]) {
            Some(value) => {
                rendered.push_str(&template[copied..placeholder.start()]);
                rendered.push_str(value);
                copied = placeholder.end();
                search = placeholder.end();
            }
            // The closing `#` may open the next placeholder.
            None => search = placeholder.end() - 1,
        }
    }

    rendered.push_str(&template[copied..]);
    rendered
}

/// Appends an invisible 1x1 image pointing at the open tracker.
pub fn inject_tracking_pixel(html: &str, tracking_url: &str) -> String {
    format!(r#"{html}<img src="{tracking_url}" width="1" height="1" />"#)
}

/// Builds an email message ready to be sent via SMTP.
///
/// The HTML body is sent as the HTML alternative of a
/// `multipart/alternative` message, with a plain-text rendering of the
/// same content next to it.
#[must_use]
pub fn build_message<'a>(
    sender: &'a str,
    recipient: &'a str,
    subject: String,
    html_body: String,
) -> MessageBuilder<'a> {
    let text_body = html2text::from_read(html_body.as_bytes(), usize::MAX)
        .unwrap_or_else(|_| html_body.clone());

    MessageBuilder::new()
        .from(sender)
        .to(vec![("", recipient)])
        .subject(subject)
        .html_body(html_body)
        .text_body(text_body)
}
