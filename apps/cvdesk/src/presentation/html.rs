//! HTML rendering of the document view.

use crate::markup::{escape, page};
use crate::presentation::view::{DocumentView, ImagePanel, LabeledLine, NO_IMAGE};
use crate::routes::{DOCUMENT_PDF_ROUTE, DOCUMENT_PRINT_ROUTE, INTAKE_ROUTE, LOGO_ROUTE};

/// Element id of the document container on the document page.
pub const DOCUMENT_CONTAINER_ID: &str = "cv-container";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Regular on-screen page with the action toolbar.
    Screen,
    /// Same document, toolbar hidden, native print dialog opened on load.
    Print,
}

pub(crate) const DOCUMENT_CSS: &str = r#"
.cv-page { padding: 1rem; background: #edf2f7; min-height: 100vh; }
.toolbar { text-align: center; margin-bottom: 1rem; }
.cv-sheet { background: #fff; max-width: 1200px; margin: 0 auto; padding: 1.5rem; border-radius: 0.5rem;
  box-shadow: 0 10px 15px rgba(0,0,0,0.1); display: flex; flex-direction: row; gap: 1.5rem; }
.cv-main { flex: 3; background: linear-gradient(to bottom right, #b2f5ea, #faf5ff); padding: 1rem; border-radius: 0.375rem; }
.cv-side { flex: 2; background: linear-gradient(to bottom right, #bee3f8, #fff); padding: 1rem; border-radius: 0.375rem;
  display: flex; align-items: center; justify-content: center; }
.cv-header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 1rem; }
.cv-header .logo, .logo-placeholder { width: 60px; height: 60px; object-fit: contain; }
.cv-titles { text-align: center; }
.cv-titles .en { font-weight: bold; font-size: 1.25rem; color: #285e61; }
.cv-titles .ar { color: #553c9a; }
.portrait, .portrait-placeholder { width: 80px; height: 80px; border-radius: 0.375rem; object-fit: cover; }
.portrait-placeholder, .panel-placeholder { background: #e2e8f0; }
.panel-placeholder { width: 100%; height: 400px; border-radius: 0.375rem; display: flex; align-items: center;
  justify-content: center; color: #718096; }
.panel-image { max-height: 400px; max-width: 100%; object-fit: contain; border-radius: 0.375rem; }
.cv-block p { margin: 0.4rem 0; color: #1a365d; font-weight: bold; }
.cv-emergency p { margin: 0.25rem 0; }
.cv-emergency h3 { font-size: 1rem; color: #553c9a; }
hr { border: 0; border-top: 1px solid #cbd5e0; margin: 1rem 0; }
.empty-state { max-width: 480px; margin: 4rem auto; text-align: center; }
@media print {
  body * { visibility: hidden; }
  #cv-container, #cv-container * { visibility: visible; }
  #cv-container { position: absolute; left: 0; top: 0; width: 100%; max-width: none; margin: 0; padding: 0;
    box-shadow: none; background: #fff; overflow: visible; }
  .toolbar { display: none; }
}
"#;

/// Full document page at `/cv` or `/cv/print`.
pub fn render_document_page(view: &DocumentView, mode: RenderMode, with_logo: bool) -> String {
    let mut body = String::from("<div class=\"cv-page\">\n");

    if mode == RenderMode::Screen {
        body.push_str(&format!(
            "<div class=\"toolbar\">\
             <a class=\"button blue\" href=\"{DOCUMENT_PDF_ROUTE}\" download=\"cv.pdf\">Download PDF</a>\
             <a class=\"button teal\" href=\"{DOCUMENT_PRINT_ROUTE}\">Print</a>\
             <a class=\"button purple\" href=\"{INTAKE_ROUTE}\">Back to form</a>\
             </div>\n"
        ));
    }

    body.push_str(&render_document_fragment(view, DOCUMENT_CONTAINER_ID, with_logo));
    body.push_str("</div>\n");

    if mode == RenderMode::Print {
        body.push_str("<script>window.addEventListener('load', function () { window.print(); });</script>\n");
    }

    page("CV", DOCUMENT_CSS, &body)
}

/// Page shown when no record is stored.
pub fn render_missing_page() -> String {
    let body = format!(
        "<div class=\"cv-page\"><div class=\"empty-state\">\
         <h2>No CV record found</h2>\
         <p>Fill in and submit the registration form first.</p>\
         <a class=\"button teal\" href=\"{INTAKE_ROUTE}\">Go to registration form</a>\
         </div></div>"
    );
    page("CV", DOCUMENT_CSS, &body)
}

/// The document container alone; also embedded as the intake page preview.
/// Without a configured logo the header keeps an empty box in its place.
pub fn render_document_fragment(view: &DocumentView, container_id: &str, with_logo: bool) -> String {
    let mut html = format!(
        "<div id=\"{}\" class=\"cv-sheet cv-print\">\n<div class=\"cv-main\">\n",
        escape(container_id)
    );

    // Header
    html.push_str("<div class=\"cv-header\">\n");
    if with_logo {
        html.push_str(&format!(
            "<img class=\"logo\" src=\"{LOGO_ROUTE}\" alt=\"Logo\">\n"
        ));
    } else {
        html.push_str("<div class=\"logo-placeholder\"></div>\n");
    }
    html.push_str(&format!(
        "<div class=\"cv-titles\"><div class=\"en\">{}</div><div class=\"ar\" dir=\"rtl\" lang=\"ar\">{}</div></div>\n",
        escape(view.title_en),
        escape(view.title_ar)
    ));
    match &view.small_image {
        ImagePanel::Image(src) => html.push_str(&format!(
            "<img class=\"portrait\" src=\"{}\" alt=\"Photo\">\n",
            escape(src)
        )),
        ImagePanel::Placeholder => html.push_str("<div class=\"portrait-placeholder\"></div>\n"),
    }
    html.push_str("</div>\n<hr>\n");

    html.push_str("<div class=\"cv-block\">\n");
    for line in view.personal.iter().chain(view.background.iter()) {
        html.push_str(&render_line(line));
    }
    html.push_str("</div>\n<hr>\n");

    html.push_str(&format!(
        "<div class=\"cv-emergency\">\n<h3>{}</h3>\n",
        escape(view.emergency_heading)
    ));
    for line in &view.emergency {
        html.push_str(&render_line(line));
    }
    html.push_str("</div>\n</div>\n");

    html.push_str("<div class=\"cv-side\">\n");
    match &view.large_image {
        ImagePanel::Image(src) => html.push_str(&format!(
            "<img class=\"panel-image\" src=\"{}\" alt=\"Large\">\n",
            escape(src)
        )),
        ImagePanel::Placeholder => html.push_str(&format!(
            "<div class=\"panel-placeholder\">{NO_IMAGE}</div>\n"
        )),
    }
    html.push_str("</div>\n</div>\n");

    html
}

fn render_line(line: &LabeledLine) -> String {
    format!(
        "<p><b>{} / <span dir=\"rtl\" lang=\"ar\">{}</span>:</b> {}</p>\n",
        escape(line.label_en),
        escape(line.label_ar),
        escape(&line.value)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApplicationRecord;

    fn view(record: ApplicationRecord) -> DocumentView {
        DocumentView::from_record(&record)
    }

    #[test]
    fn test_screen_page_has_toolbar_and_container() {
        let html = render_document_page(
            &view(ApplicationRecord {
                name: Some("Amina".to_string()),
                ..Default::default()
            }),
            RenderMode::Screen,
            false,
        );
        assert!(html.contains("id=\"cv-container\""));
        assert!(html.contains("Download PDF"));
        assert!(html.contains("Amina"));
        assert!(!html.contains("window.print()"));
    }

    #[test]
    fn test_print_page_hides_everything_but_container() {
        let html = render_document_page(&view(ApplicationRecord::default()), RenderMode::Print, false);
        assert!(html.contains("window.print()"));
        assert!(html.contains("body * { visibility: hidden; }"));
        assert!(html.contains("#cv-container, #cv-container * { visibility: visible; }"));
        assert!(!html.contains("Download PDF"));
    }

    #[test]
    fn test_placeholders_instead_of_broken_images() {
        let html = render_document_fragment(&view(ApplicationRecord::default()), "cv-preview", false);
        assert!(html.contains("id=\"cv-preview\""));
        assert!(html.contains("portrait-placeholder"));
        assert!(html.contains("panel-placeholder"));
        assert!(html.contains(NO_IMAGE));
        assert!(!html.contains("alt=\"Photo\""));
        assert!(!html.contains("alt=\"Large\""));
    }

    #[test]
    fn test_values_are_escaped() {
        let html = render_document_fragment(
            &view(ApplicationRecord {
                name: Some("<script>alert(1)</script>".to_string()),
                ..Default::default()
            }),
            DOCUMENT_CONTAINER_ID,
            false,
        );
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_bilingual_titles_present() {
        let html = render_document_fragment(&view(ApplicationRecord::default()), DOCUMENT_CONTAINER_ID, false);
        assert!(html.contains("APPLICATION FOR EMPLOYMENT"));
        assert!(html.contains("dir=\"rtl\" lang=\"ar\">طلب توظيف"));
    }

    #[test]
    fn test_logo_only_when_configured() {
        let record = view(ApplicationRecord::default());

        let html = render_document_fragment(&record, DOCUMENT_CONTAINER_ID, false);
        assert!(!html.contains(LOGO_ROUTE));
        assert!(html.contains("class=\"logo-placeholder\""));

        let html = render_document_fragment(&record, DOCUMENT_CONTAINER_ID, true);
        assert!(html.contains("src=\"/logo.png\""));
        assert!(!html.contains("class=\"logo-placeholder\""));
    }

    #[test]
    fn test_missing_page_links_back_to_form() {
        let html = render_missing_page();
        assert!(html.contains("No CV record found"));
        assert!(html.contains("href=\"/\""));
        assert!(!html.contains("Loading"));
    }
}
