//! Server-side rendering of the single page.
//!
//! The whole page is re-rendered on every request from the session state,
//! history included. Every piece of user- or model-supplied text passes
//! through [`escape_html`].

use crate::config::ContactInfo;
use crate::error::PdfQaError;
use crate::preset::Preset;
use crate::session::Session;
use std::fmt::Write;

/// Static parts of the page taken from configuration.
#[derive(Debug, Clone)]
pub struct PageSettings {
    pub title: String,
    pub contact: ContactInfo,
}

const STYLE: &str = r#"
body { margin: 0; background-color: #f0f0f5; color: #003366; font-family: 'Roboto', sans-serif; }
.layout { display: flex; min-height: 100vh; }
.sidebar { width: 260px; background-color: #e0e0e0; padding: 20px; border-right: 2px solid #003366; }
.sidebar h2 { color: #003366; }
.sidebar .info { background: #dbe8f5; border-radius: 5px; padding: 10px; font-size: 14px; }
.hint { font-size: 13px; color: #555; }
.preset { display: block; margin: 8px 0; }
.preset small { display: block; margin-left: 22px; color: #335577; }
main { flex: 1; padding: 20px 40px; max-width: 960px; }
.header-border { border-top: 2px solid #003366; padding-top: 10px; margin-top: 20px; }
button { background-color: #003366; color: #ffffff; border-radius: 5px; padding: 0.5rem 1rem; font-size: 16px;
         border: 2px solid #003366; cursor: pointer; transition: background-color 0.3s ease, box-shadow 0.3s ease; }
button:hover { background-color: #002244; box-shadow: 0 4px 8px rgba(0, 0, 0, 0.2); }
input[type=text] { border-radius: 5px; padding: 0.5rem; border: 2px solid #003366; width: 100%; box-sizing: border-box; }
input[type=text]:focus { border-color: #002244; outline: none; }
.input-container { display: flex; flex-direction: column; margin-bottom: 20px; }
.input-container > button { margin-top: 10px; align-self: flex-end; }
.success { background: #dff0d8; border-radius: 5px; padding: 10px; }
.error { background: #f8d7da; color: #721c24; border-radius: 5px; padding: 10px; white-space: pre-wrap; }
.documents { font-size: 14px; }
.chat-history, .contact-info { border: 1px solid #003366; border-radius: 5px; padding: 10px; background-color: #ffffff; margin-top: 20px; }
.chat-item { border-bottom: 1px solid #e0e0e0; padding: 10px; white-space: pre-wrap; }
.chat-item:last-of-type { border-bottom: none; }
.footer { margin-top: 20px; border-top: 2px solid #003366; padding: 10px 0; text-align: center; }
summary { cursor: pointer; font-weight: bold; }
"#;

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the full page for `session`, with an optional error banner.
pub fn render_page(page: &PageSettings, session: &Session, error: Option<&PdfQaError>) -> String {
    let title = escape_html(&page.title);
    let mut html = String::with_capacity(8 * 1024);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<div class=\"layout\">\n"
    );

    render_sidebar(&mut html, session.preset);

    let _ = write!(
        html,
        "<main>\n<h1>📚 {title}</h1>\n<div class=\"header-border\"></div>\n\
         <h3>Upload your PDFs and ask questions about them. Let's get started!</h3>\n"
    );

    if let Some(err) = error {
        let _ = write!(
            html,
            "<div class=\"error\" role=\"alert\"><strong>Error:</strong> {}</div>\n",
            escape_html(&err.to_string())
        );
    }

    html.push_str(
        "<form class=\"input-container\" action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <label for=\"files\">Upload PDF files here</label>\n\
         <input id=\"files\" type=\"file\" name=\"files\" accept=\".pdf,application/pdf\" multiple required>\n\
         <button type=\"submit\">Process PDFs</button>\n\
         <p class=\"hint\">The page reloads once every file has been processed. \
         Per-document progress is only written to the server log.</p>\n</form>\n",
    );

    if let Some(docs) = &session.documents {
        html.push_str(
            "<div class=\"success\">PDFs processed successfully. Ask your questions below.</div>\n\
             <ul class=\"documents\">\n",
        );
        for d in &docs.documents {
            let _ = writeln!(
                html,
                "<li>{} — {} page(s), {} with text, {} chars</li>",
                escape_html(&d.filename),
                d.page_count,
                d.pages_with_text,
                d.chars
            );
        }
        html.push_str("</ul>\n");

        html.push_str(
            "<h3>Ask your question:</h3>\n\
             <form id=\"question-form\" class=\"input-container\" action=\"/ask\" method=\"post\">\n\
             <input type=\"text\" name=\"question\" placeholder=\"Enter your question here:\" autocomplete=\"off\" autofocus>\n\
             <button type=\"submit\">Submit</button>\n</form>\n",
        );

        html.push_str("<h2>ANSWERS</h2>\n");
        if !session.history.is_empty() {
            html.push_str(
                "<details class=\"chat-history\">\n<summary>View ANSWERS</summary>\n",
            );
            for exchange in session.history.iter() {
                let _ = write!(
                    html,
                    "<div class=\"chat-item\"><strong>You:</strong> {}</div>\n\
                     <div class=\"chat-item\"><strong>Assistant:</strong> {}</div>\n",
                    escape_html(&exchange.question),
                    escape_html(&exchange.answer)
                );
            }
            html.push_str("</details>\n");
        }
    }

    render_contact(&mut html, &page.contact);

    html.push_str(
        "<div class=\"footer\">\n<form action=\"/reset\" method=\"post\">\
         <button type=\"submit\">Start a new session</button></form>\n</div>\n\
         </main>\n</div>\n</body>\n</html>\n",
    );

    html
}

/// Preset radio buttons. They sit outside the question form but belong to it
/// through the `form` attribute, so the choice is sent with each question.
fn render_sidebar(html: &mut String, selected: Preset) {
    html.push_str("<aside class=\"sidebar\">\n<h2>🎨 Preset Options</h2>\n<p>Select response style:</p>\n");
    for preset in Preset::ALL {
        let checked = if preset == selected { " checked" } else { "" };
        let _ = writeln!(
            html,
            "<label class=\"preset\"><input type=\"radio\" name=\"preset\" form=\"question-form\" \
             value=\"{label}\"{checked}> {label}<small>{desc}</small></label>",
            label = preset.label(),
            desc = preset.description(),
        );
    }
    html.push_str(
        "<p class=\"info\">Select a style to tailor the AI responses to your preference.</p>\n</aside>\n",
    );
}

fn render_contact(html: &mut String, contact: &ContactInfo) {
    if contact.is_empty() {
        return;
    }
    html.push_str("<details class=\"contact-info\">\n<summary>Contact Us</summary>\n");
    if let Some(phone) = &contact.phone {
        let _ = writeln!(
            html,
            "<p><strong>Mobile No.:</strong> {}</p>",
            escape_html(phone)
        );
    }
    if let Some(email) = &contact.email {
        let email = escape_html(email);
        let _ = writeln!(
            html,
            "<p><strong>Email:</strong> <a href=\"mailto:{email}\">{email}</a></p>"
        );
    }
    html.push_str("</details>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract::{DocumentSummary, ExtractedText};
    use uuid::Uuid;

    fn settings() -> PageSettings {
        PageSettings {
            title: "College Information Assistant".into(),
            contact: ContactInfo::default(),
        }
    }

    fn session_with_docs() -> Session {
        let mut s = Session::new(Uuid::new_v4(), Preset::Formal);
        s.documents = Some(ExtractedText {
            text: "Hello".into(),
            documents: vec![DocumentSummary {
                filename: "guide.pdf".into(),
                page_count: 2,
                pages_with_text: 1,
                chars: 5,
            }],
        });
        s
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn fresh_session_shows_only_upload() {
        let s = Session::new(Uuid::new_v4(), Preset::Formal);
        let html = render_page(&settings(), &s, None);
        assert!(html.contains("action=\"/upload\""));
        assert!(html.contains("Per-document progress is only written to the server log"));
        assert!(!html.contains("id=\"question-form\""));
        assert!(!html.contains("ANSWERS"));
    }

    #[test]
    fn processed_session_shows_question_form_and_summary() {
        let html = render_page(&settings(), &session_with_docs(), None);
        assert!(html.contains("PDFs processed successfully"));
        assert!(html.contains("guide.pdf — 2 page(s), 1 with text, 5 chars"));
        assert!(html.contains("id=\"question-form\""));
        assert!(!html.contains("View ANSWERS"));
    }

    #[test]
    fn history_is_rendered_in_order_and_escaped() {
        let mut s = session_with_docs();
        s.history.push("first <q>", "first answer");
        s.history.push("second", "<script>alert(1)</script>");
        let html = render_page(&settings(), &s, None);

        let first = html.find("first &lt;q&gt;").unwrap();
        let second = html.find("<strong>You:</strong> second").unwrap();
        assert!(first < second);
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn selected_preset_is_checked() {
        let mut s = session_with_docs();
        s.preset = Preset::Concise;
        let html = render_page(&settings(), &s, None);
        assert!(html.contains("value=\"Concise\" checked"));
        assert!(!html.contains("value=\"Formal\" checked"));
    }

    #[test]
    fn error_banner_is_rendered() {
        let s = Session::new(Uuid::new_v4(), Preset::Formal);
        let html = render_page(&settings(), &s, Some(&PdfQaError::NoDocuments));
        assert!(html.contains("role=\"alert\""));
        assert!(html.contains("No PDF documents have been uploaded"));
    }

    #[test]
    fn contact_panel_only_when_configured() {
        let s = Session::new(Uuid::new_v4(), Preset::Formal);
        assert!(!render_page(&settings(), &s, None).contains("Contact Us"));

        let page = PageSettings {
            contact: ContactInfo {
                phone: Some("98110 00000".into()),
                email: Some("help@example.edu".into()),
            },
            ..settings()
        };
        let html = render_page(&page, &s, None);
        assert!(html.contains("Contact Us"));
        assert!(html.contains("mailto:help@example.edu"));
        assert!(html.contains("98110 00000"));
    }
}
