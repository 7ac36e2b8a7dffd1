//! Small helpers shared by the server-rendered pages.

const BASE_CSS: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: "Segoe UI", "Noto Sans", "Noto Naskh Arabic", sans-serif; color: #1a202c; }
a.button, button { display: inline-block; border: 0; border-radius: 9999px; padding: 0.6rem 1.4rem;
  margin: 0 0.25rem 0.5rem 0; font-size: 1rem; color: #fff; text-decoration: none; cursor: pointer; }
.teal { background: #319795; } .blue { background: #3182ce; }
.green { background: #38a169; } .purple { background: #805ad5; }
"#;

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Wraps `body` in a complete UTF-8 HTML document.
pub fn page(title: &str, extra_css: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        BASE_CSS,
        extra_css,
        body
    )
}
