//! The registration form page.

use crate::intake::upload::ImageDraft;
use crate::markup::{escape, page};
use crate::models::record::{DOCUMENTS, GENDERS, MARITAL_STATUSES, SKILLS};
use crate::models::{ApplicationRecord, Experience, ImageSlot};
use crate::presentation::html::{render_document_fragment, DOCUMENT_CSS};
use crate::presentation::view::DocumentView;
use crate::routes::{NAVIGATE_ROUTE, PREVIEW_PDF_ROUTE, REGISTER_ROUTE, SPREADSHEET_ROUTE};

/// Element id of the on-page preview region captured by "Export as PDF".
pub const PREVIEW_CONTAINER_ID: &str = "cv-preview";

pub const SUCCESS_MESSAGE: &str = "Registered successfully!";

const FORM_CSS: &str = r#"
.form-page { min-height: 100vh; background: #f7fafc; padding: 1rem; }
.form-card { background: #fff; max-width: 900px; margin: 0 auto; padding: 2rem; border-radius: 0.5rem;
  box-shadow: 0 10px 15px rgba(0,0,0,0.1); }
.form-card h1 { text-align: center; font-size: 1.5rem; margin: 0 0 1.5rem; }
.field { display: flex; flex-direction: column; margin-bottom: 1rem; }
.field label { font-weight: 600; margin-bottom: 0.25rem; }
.field input[type=text], .field input[type=date], .field select { padding: 0.75rem; border: 1px solid #e2e8f0;
  border-radius: 0.375rem; font-size: 1rem; }
.field input:focus, .field select:focus { outline: none; border-color: #319795; }
.choices { display: flex; flex-wrap: wrap; gap: 0.75rem; }
.emergency { border-bottom: 5px solid #2b6cb0; padding-bottom: 1rem; }
.emergency h2 { font-size: 1rem; margin: 1rem 0 0.5rem; }
.upload-preview { border-radius: 0.375rem; object-fit: contain; margin-top: 0.5rem; align-self: flex-start; }
.actions { margin-top: 2rem; }
.banner { padding: 0.75rem 1rem; border-radius: 0.375rem; margin-bottom: 1rem; }
.banner.success { background: #c6f6d5; color: #22543d; }
.preview { margin-top: 2rem; }
"#;

/// Renders the intake form, prefilled from the persisted record when there is
/// one. Pending images come from the draft.
pub fn render_form_page(
    draft: &ImageDraft,
    record: Option<&ApplicationRecord>,
    registered: bool,
    with_logo: bool,
) -> String {
    let empty = ApplicationRecord::default();
    let r = record.unwrap_or(&empty);

    let mut body = String::from("<div class=\"form-page\">\n<div class=\"form-card\">\n<h1>Registration Form</h1>\n");
    if registered {
        body.push_str(&format!(
            "<div class=\"banner success\" role=\"status\">{SUCCESS_MESSAGE}</div>\n"
        ));
    }

    body.push_str(&format!(
        "<form method=\"post\" action=\"{REGISTER_ROUTE}\" enctype=\"multipart/form-data\">\n"
    ));

    body.push_str(&text_input("Full Name", "name", "Enter your full name", r.name.as_deref()));
    body.push_str(&select("Gender", "gender", "Select gender", &GENDERS, r.gender.as_deref()));
    body.push_str(&text_input("Address", "address", "Enter your address", r.address.as_deref()));
    body.push_str(&text_input("Zone", "zone", "Enter zone", r.zone.as_deref()));
    body.push_str(&text_input("Woreda", "woreda", "Enter woreda", r.woreda.as_deref()));
    body.push_str(&text_input("Phone", "phone", "Enter phone number", r.phone.as_deref()));
    body.push_str(&text_input("Family ID", "familyId", "Enter family ID", r.family_id.as_deref()));
    body.push_str(&select(
        "Marital Status",
        "maritalStatus",
        "Select status",
        &MARITAL_STATUSES,
        r.marital_status.as_deref(),
    ));
    let experience_options = Experience::ALL.map(|e| e.as_str());
    body.push_str(&select(
        "Experience",
        "experience",
        "Select experience",
        &experience_options,
        r.experience.as_deref(),
    ));
    body.push_str(&text_input("Country", "country", "Enter country", r.country.as_deref()));
    body.push_str(&text_input("Years", "years", "Enter years of experience", r.years.as_deref()));
    body.push_str(&text_input("Code", "code", "Enter code", r.code.as_deref()));
    body.push_str(&format!(
        "<div class=\"field\"><label for=\"date\">Date</label>\
         <input type=\"date\" id=\"date\" name=\"date\" value=\"{}\"></div>\n",
        escape(r.date.as_deref().unwrap_or_default())
    ));
    body.push_str(&checkbox_group("Skills", "skills", &SKILLS, r.skills.as_deref()));
    body.push_str(&checkbox_group(
        "Customer Documents",
        "documents",
        &DOCUMENTS,
        r.documents.as_deref(),
    ));
    body.push_str(&file_input("Large Image", ImageSlot::Large, draft.get(ImageSlot::Large), 200));
    body.push_str(&file_input("Small Image", ImageSlot::Small, draft.get(ImageSlot::Small), 100));

    body.push_str("<div class=\"emergency\">\n<h2>Emergency Contact</h2>\n");
    body.push_str(&text_input("Name", "emergencyName", "Name", r.emergency_name.as_deref()));
    body.push_str(&text_input("Phone", "emergencyPhone", "Phone", r.emergency_phone.as_deref()));
    body.push_str(&text_input("Address", "emergencyAddress", "Address", r.emergency_address.as_deref()));
    body.push_str(&text_input("House No", "emergencyHouse", "House No", r.emergency_house.as_deref()));
    body.push_str("</div>\n");

    body.push_str(&format!(
        "<div class=\"actions\">\
         <button type=\"submit\" class=\"teal\">Register</button>\
         <a class=\"button blue\" href=\"{NAVIGATE_ROUTE}\">Prepare CV</a>\
         <a class=\"button green\" href=\"{SPREADSHEET_ROUTE}\">Export as Excel</a>\
         <a class=\"button purple\" href=\"{PREVIEW_PDF_ROUTE}\">Export as PDF</a>\
         </div>\n</form>\n</div>\n"
    ));

    if let Some(record) = record {
        body.push_str("<div class=\"preview\">\n");
        body.push_str(&render_document_fragment(
            &DocumentView::from_record(record),
            PREVIEW_CONTAINER_ID,
            with_logo,
        ));
        body.push_str("</div>\n");
    }
    body.push_str("</div>\n");

    let css = format!("{FORM_CSS}{DOCUMENT_CSS}");
    page("Registration Form", &css, &body)
}

fn text_input(label: &str, name: &str, placeholder: &str, value: Option<&str>) -> String {
    format!(
        "<div class=\"field\"><label for=\"{name}\">{}</label>\
         <input type=\"text\" id=\"{name}\" name=\"{name}\" placeholder=\"{}\" value=\"{}\"></div>\n",
        escape(label),
        escape(placeholder),
        escape(value.unwrap_or_default())
    )
}

fn select(label: &str, name: &str, placeholder: &str, options: &[&str], value: Option<&str>) -> String {
    let mut html = format!(
        "<div class=\"field\"><label for=\"{name}\">{}</label><select id=\"{name}\" name=\"{name}\">\
         <option value=\"\">{}</option>",
        escape(label),
        escape(placeholder)
    );
    for option in options {
        let selected = if value == Some(*option) { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{0}\"{selected}>{0}</option>",
            escape(option)
        ));
    }
    html.push_str("</select></div>\n");
    html
}

fn checkbox_group(label: &str, name: &str, options: &[&str], checked: Option<&[String]>) -> String {
    let checked = checked.unwrap_or_default();
    let mut html = format!(
        "<div class=\"field\"><label>{}</label><div class=\"choices\">",
        escape(label)
    );
    for option in options {
        let mark = if checked.iter().any(|c| c == option) { " checked" } else { "" };
        html.push_str(&format!(
            "<label><input type=\"checkbox\" name=\"{name}\" value=\"{0}\"{mark}> {0}</label>",
            escape(option)
        ));
    }
    html.push_str("</div></div>\n");
    html
}

fn file_input(label: &str, slot: ImageSlot, pending: Option<&str>, max_height: u32) -> String {
    let field = slot.form_field();
    let mut html = format!(
        "<div class=\"field\"><label for=\"{field}\">{}</label>\
         <input type=\"file\" id=\"{field}\" name=\"{field}\" accept=\"image/*\">",
        escape(label)
    );
    if let Some(src) = pending {
        html.push_str(&format!(
            "<img class=\"upload-preview\" style=\"max-height: {max_height}px\" src=\"{}\" alt=\"{} Preview\">",
            escape(src),
            escape(label.trim_end_matches(" Image"))
        ));
    }
    html.push_str("</div>\n");
    html
}
