//! Document view model: the fixed bilingual layout filled from a record.
//!
//! Both the HTML page and the raster painter consume this model, so the
//! conditional and default-text rules live here and nowhere else.

use serde::Serialize;

use crate::models::ApplicationRecord;

pub const TITLE_EN: &str = "APPLICATION FOR EMPLOYMENT";
pub const TITLE_AR: &str = "طلب توظيف";
pub const EMERGENCY_HEADING: &str = "Emergency Contact / جهة الاتصال في حالات الطوارئ";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_IMAGE: &str = "No Image";

/// Separator between the country and years values.
pub const EM_DASH_SEPARATOR: &str = " — ";

/// One "English / Arabic: value" row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledLine {
    pub label_en: &'static str,
    pub label_ar: &'static str,
    pub value: String,
}

impl LabeledLine {
    fn new(label_en: &'static str, label_ar: &'static str, value: impl Into<String>) -> Self {
        Self {
            label_en,
            label_ar,
            value: value.into(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} / {}", self.label_en, self.label_ar)
    }
}

/// An image position in the layout: the uploaded picture or an empty box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "src", rename_all = "snake_case")]
pub enum ImagePanel {
    Image(String),
    Placeholder,
}

impl ImagePanel {
    fn from_data_uri(uri: Option<&str>) -> Self {
        match uri {
            Some(s) if !s.trim().is_empty() => ImagePanel::Image(s.to_string()),
            _ => ImagePanel::Placeholder,
        }
    }

    pub fn src(&self) -> Option<&str> {
        match self {
            ImagePanel::Image(src) => Some(src),
            ImagePanel::Placeholder => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentView {
    pub title_en: &'static str,
    pub title_ar: &'static str,
    /// Header portrait.
    pub small_image: ImagePanel,
    /// Name, gender, address, phone, family ID, marital status.
    pub personal: Vec<LabeledLine>,
    /// Experience, the optional country/years row, skills, documents, code, date.
    pub background: Vec<LabeledLine>,
    pub emergency_heading: &'static str,
    pub emergency: Vec<LabeledLine>,
    /// Secondary column picture.
    pub large_image: ImagePanel,
}

impl DocumentView {
    pub fn from_record(record: &ApplicationRecord) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();

        let address = format!(
            "{}, Zone {}, Woreda {}",
            text(&record.address),
            text(&record.zone),
            text(&record.woreda)
        );

        let personal = vec![
            LabeledLine::new("Full Name", "الاسم الكامل", text(&record.name)),
            LabeledLine::new("Gender", "الجنس", text(&record.gender)),
            LabeledLine::new("Address", "العنوان", address),
            LabeledLine::new("Phone", "رقم الهاتف", text(&record.phone)),
            LabeledLine::new("Family ID", "رقم العائلة", text(&record.family_id)),
            LabeledLine::new("Marital Status", "الحالة الزوجية", text(&record.marital_status)),
        ];

        let mut background = vec![LabeledLine::new(
            "Experience",
            "الخبرة",
            text(&record.experience),
        )];
        if record.is_experienced() {
            background.push(LabeledLine::new(
                "Country — Years",
                "البلد — سنوات",
                format!(
                    "{}{}{}",
                    text(&record.country),
                    EM_DASH_SEPARATOR,
                    text(&record.years)
                ),
            ));
        }
        background.push(LabeledLine::new(
            "Skills",
            "المهارات",
            join_or_default(record.skills.as_deref()),
        ));
        background.push(LabeledLine::new(
            "Documents",
            "الوثائق",
            join_or_default(record.documents.as_deref()),
        ));
        background.push(LabeledLine::new("Code", "الرمز", text(&record.code)));
        background.push(LabeledLine::new("Date", "التاريخ", text(&record.date)));

        let emergency = vec![
            LabeledLine::new("Name", "الاسم", text(&record.emergency_name)),
            LabeledLine::new("Phone", "الهاتف", text(&record.emergency_phone)),
            LabeledLine::new("Address", "العنوان", text(&record.emergency_address)),
            LabeledLine::new("House No", "رقم المنزل", text(&record.emergency_house)),
        ];

        DocumentView {
            title_en: TITLE_EN,
            title_ar: TITLE_AR,
            small_image: ImagePanel::from_data_uri(record.small_img.as_deref()),
            personal,
            background,
            emergency_heading: EMERGENCY_HEADING,
            emergency,
            large_image: ImagePanel::from_data_uri(record.large_img.as_deref()),
        }
    }

    /// First row whose English label matches.
    pub fn line(&self, label_en: &str) -> Option<&LabeledLine> {
        self.personal
            .iter()
            .chain(self.background.iter())
            .chain(self.emergency.iter())
            .find(|l| l.label_en == label_en)
    }

    pub fn shows_experience_detail(&self) -> bool {
        self.line("Country — Years").is_some()
    }
}

/// Joins a set with ", ", or "N/A" when it is absent or empty.
fn join_or_default(items: Option<&[String]>) -> String {
    match items {
        Some(items) if !items.is_empty() => items.join(", "),
        _ => NOT_AVAILABLE.to_string(),
    }
}
