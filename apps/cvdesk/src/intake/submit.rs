//! Form values + draft images → one Application Record in the slot.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::intake::upload::ImageDraft;
use crate::models::record::normalize_set;
use crate::models::{ApplicationRecord, ImageSlot};
use crate::storage::{RecordStore, StoreError};

/// Everything the intake form posts except the images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormValues {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub zone: Option<String>,
    pub woreda: Option<String>,
    pub phone: Option<String>,
    pub family_id: Option<String>,
    pub marital_status: Option<String>,
    pub experience: Option<String>,
    pub country: Option<String>,
    pub years: Option<String>,
    pub skills: Option<Vec<String>>,
    pub documents: Option<Vec<String>>,
    pub code: Option<String>,
    pub date: Option<String>,
    pub emergency_name: Option<String>,
    pub emergency_phone: Option<String>,
    pub emergency_address: Option<String>,
    pub emergency_house: Option<String>,
}

impl FormValues {
    /// Starting point for an HTML form post. Unticked checkbox groups send no
    /// parts at all, so both groups start out as empty sets.
    pub fn from_html_form() -> Self {
        Self {
            skills: Some(Vec::new()),
            documents: Some(Vec::new()),
            ..Default::default()
        }
    }

    /// Applies one posted form field. Checkbox groups accumulate; text fields
    /// take the last value. Returns `false` for names that are not form fields.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let text = match name {
            "skills" => {
                self.skills.get_or_insert_with(Vec::new).push(value);
                return true;
            }
            "documents" => {
                self.documents.get_or_insert_with(Vec::new).push(value);
                return true;
            }
            "name" => &mut self.name,
            "gender" => &mut self.gender,
            "address" => &mut self.address,
            "zone" => &mut self.zone,
            "woreda" => &mut self.woreda,
            "phone" => &mut self.phone,
            "familyId" => &mut self.family_id,
            "maritalStatus" => &mut self.marital_status,
            "experience" => &mut self.experience,
            "country" => &mut self.country,
            "years" => &mut self.years,
            "code" => &mut self.code,
            "date" => &mut self.date,
            "emergencyName" => &mut self.emergency_name,
            "emergencyPhone" => &mut self.emergency_phone,
            "emergencyAddress" => &mut self.emergency_address,
            "emergencyHouse" => &mut self.emergency_house,
            _ => return false,
        };
        *text = Some(value);
        true
    }

    /// Merges the values with the draft images. Nothing is validated.
    pub fn into_record(self, draft: &ImageDraft) -> ApplicationRecord {
        let mut record = ApplicationRecord {
            name: self.name,
            gender: self.gender,
            address: self.address,
            zone: self.zone,
            woreda: self.woreda,
            phone: self.phone,
            family_id: self.family_id,
            marital_status: self.marital_status,
            experience: self.experience,
            country: self.country,
            years: self.years,
            skills: self.skills.map(normalize_set),
            documents: self.documents.map(normalize_set),
            code: self.code,
            date: self.date,
            emergency_name: self.emergency_name,
            emergency_phone: self.emergency_phone,
            emergency_address: self.emergency_address,
            emergency_house: self.emergency_house,
            ..Default::default()
        };
        for slot in [ImageSlot::Large, ImageSlot::Small] {
            record.set_image(slot, draft.get(slot).map(str::to_string));
        }
        record
    }
}

/// Builds the record and overwrites the persisted slot with it.
pub async fn submit(
    store: &dyn RecordStore,
    values: FormValues,
    draft: &ImageDraft,
) -> Result<ApplicationRecord, StoreError> {
    let record = values.into_record(draft);
    store.put(&record).await?;
    info!(
        "Record persisted ({} backend, large image: {}, small image: {})",
        store.backend(),
        record.image(ImageSlot::Large).is_some(),
        record.image(ImageSlot::Small).is_some()
    );
    Ok(record)
}
