/// Central template renderer for the studio.
///
/// One HTML template (`studio/assets/studio.html`) with `{{TOKEN}}`
/// placeholders, embedded at compile time. Global placeholders are resolved
/// here; the caller's closure fills the tab-specific ones and anything left
/// over is blanked. Flash and alert text use `<!--NAME-->` markers instead
/// and are substituted after blanking.

use digit_sketch::{Alert, Caption};

use crate::state::{FlashKind, FlashMessage};

const TEMPLATE: &str = include_str!("assets/studio.html");

/// Which tab is active.
#[derive(Clone, Copy)]
pub enum Page {
    Draw  = 0,
    Photo = 1,
}

/// Renders the full studio page.
///
/// - `pending`: a recognition is in flight; the page refreshes itself until it lands
/// - `alert`:   shown as a modal browser alert on load
pub fn render_page<F>(page: Page, pending: bool, alert: Option<&Alert>, flash: Option<&FlashMessage>, fill: F) -> String
where
    F: FnOnce(String) -> String,
{
    let mut html = TEMPLATE.to_owned();

    html = html.replace("{{ACTIVE_TAB}}", &(page as u8).to_string());
    html = html.replace(
        "{{AUTO_REFRESH}}",
        if pending { r#"<meta http-equiv="refresh" content="1">"# } else { "" },
    );
    html = html.replace("{{PENDING}}", if pending { "Recognizing&hellip;" } else { "" });

    html = fill(html);

    // Message text goes in last so braces inside it survive the blanking pass.
    let mut html = blank_remaining(html);
    html = html.replace("<!--ALERT-->", &alert_script(alert));
    html = html.replace("<!--FLASH-->", &render_flash_html(flash));
    html
}

pub fn caption_html(caption: Option<&Caption>) -> String {
    match caption {
        None    => String::new(),
        Some(c) => format!(
            r#"<div class="caption"><div class="digit">{}</div><div class="confidence">{}</div></div>"#,
            html_escape(&c.digit_line),
            html_escape(&c.confidence_line),
        ),
    }
}

fn render_flash_html(flash: Option<&FlashMessage>) -> String {
    match flash {
        None    => String::new(),
        Some(f) => {
            let cls = match f.kind {
                FlashKind::Info  => "flash-info",
                FlashKind::Error => "flash-error",
            };
            format!(r#"<div class="flash {}">{}</div>"#, cls, html_escape(&f.text))
        }
    }
}

fn alert_script(alert: Option<&Alert>) -> String {
    match alert {
        None    => String::new(),
        Some(a) => {
            // serde_json produces a valid JS string literal; `</` is split so
            // the message cannot close the script element.
            let text = format!("{}\n\n{}", a.title, a.message);
            let literal = serde_json::to_string(&text)
                .unwrap_or_else(|_| "\"Error\"".to_owned())
                .replace("</", "<\\/");
            format!("<script>window.addEventListener('load', function() {{ alert({}); }});</script>", literal)
        }
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
     .replace('<', "&lt;")
     .replace('>', "&gt;")
     .replace('"', "&quot;")
}

/// Replaces any `{{TOKEN}}` that wasn't substituted with an empty string.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}
