//! The Application Record, the one structure the intake form writes and the
//! document view reads.
//!
//! Every field is optional: the stored record is whatever shape the form
//! produced, and readers must cope with any key being missing. An oddly-typed
//! value reads as "absent" for that field instead of failing the whole record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ────────────────────────────────────────────────────────────────────────────
// Fixed vocabularies
// ────────────────────────────────────────────────────────────────────────────

pub const SKILLS: [&str; 7] = [
    "Decoration",
    "Driving",
    "Ironing",
    "Baby Sitting",
    "Cleaning",
    "Cooking",
    "Washing",
];

pub const DOCUMENTS: [&str; 7] = [
    "Passport",
    "Photo",
    "ID",
    "Family ID",
    "Medical",
    "COC",
    "Ashara",
];

pub const GENDERS: [&str; 2] = ["Female", "Male"];

pub const MARITAL_STATUSES: [&str; 3] = ["Single", "Married", "Divorced"];

/// JSON keys in canonical order. Spreadsheet columns follow this order.
pub const FIELD_NAMES: [&str; 21] = [
    "name",
    "gender",
    "address",
    "zone",
    "woreda",
    "phone",
    "familyId",
    "maritalStatus",
    "experience",
    "country",
    "years",
    "skills",
    "documents",
    "code",
    "date",
    "emergencyName",
    "emergencyPhone",
    "emergencyAddress",
    "emergencyHouse",
    "largeImg",
    "smallImg",
];

// ────────────────────────────────────────────────────────────────────────────
// Enumerations
// ────────────────────────────────────────────────────────────────────────────

/// Work experience level. Only `Experienced` unlocks the country/years block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Experience {
    New,
    Experienced,
}

impl Experience {
    pub const ALL: [Experience; 2] = [Experience::New, Experience::Experienced];

    /// Exact, case-sensitive match against the form's option values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "New" => Some(Experience::New),
            "Experienced" => Some(Experience::Experienced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Experience::New => "New",
            Experience::Experienced => "Experienced",
        }
    }
}

/// Which of the two uploaded images a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSlot {
    /// Full-height picture shown in the document's side panel.
    Large,
    /// Portrait shown in the document header.
    Small,
}

impl ImageSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSlot::Large => "large",
            ImageSlot::Small => "small",
        }
    }

    /// Multipart field name the intake form uses for this slot.
    pub fn form_field(&self) -> &'static str {
        match self {
            ImageSlot::Large => "largeImg",
            ImageSlot::Small => "smallImg",
        }
    }

    pub fn from_form_field(name: &str) -> Option<Self> {
        match name {
            "largeImg" => Some(ImageSlot::Large),
            "smallImg" => Some(ImageSlot::Small),
            _ => None,
        }
    }
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "large" => Ok(ImageSlot::Large),
            "small" => Ok(ImageSlot::Small),
            other => Err(format!("unknown image slot '{other}' (expected 'large' or 'small')")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Record
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub woreda: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub family_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub years: Option<String>,
    #[serde(default, deserialize_with = "lenient_set", skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_set", skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub emergency_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub emergency_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub emergency_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub emergency_house: Option<String>,
    /// Data URI (`data:image/png;base64,...`).
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub large_img: Option<String>,
    /// Data URI (`data:image/png;base64,...`).
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub small_img: Option<String>,
}

impl ApplicationRecord {
    /// Interpreted experience level; `None` when absent or not one of the options.
    pub fn experience_level(&self) -> Option<Experience> {
        self.experience.as_deref().and_then(Experience::parse)
    }

    pub fn is_experienced(&self) -> bool {
        self.experience_level() == Some(Experience::Experienced)
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&str> {
        match slot {
            ImageSlot::Large => self.large_img.as_deref(),
            ImageSlot::Small => self.small_img.as_deref(),
        }
    }

    pub fn set_image(&mut self, slot: ImageSlot, data_uri: Option<String>) {
        match slot {
            ImageSlot::Large => self.large_img = data_uri,
            ImageSlot::Small => self.small_img = data_uri,
        }
    }
}

/// Removes duplicates while keeping first-occurrence order.
pub fn normalize_set(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field readers
// ────────────────────────────────────────────────────────────────────────────

/// Strings pass through; numbers and booleans are stringified; anything else
/// (null, arrays, objects) reads as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Checkbox groups: an array of strings, or a single string when only one box
/// was ticked. `false` (untouched group) reads as an empty set.
fn lenient_set<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(normalize_set(
            items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        )),
        Some(Value::String(s)) => Some(vec![s]),
        Some(Value::Bool(false)) => Some(Vec::new()),
        _ => None,
    })
}
