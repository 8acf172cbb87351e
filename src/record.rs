use crate::fields::CategoryOutcome;
use crate::prompt::Category;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// The per-file output record combining all categories.
///
/// Field order here is the serialized key order. `file_name` keeps the
/// input's original extension; payloads are stored as raw JSON values and
/// never validated against a schema.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateRecord {
    /// Source file's base name, original extension intact
    pub file_name: String,

    /// Contact details and education; null when unavailable
    pub basic_info: Value,

    /// Language entries; empty when unavailable
    pub languages: Value,

    /// Areas of expertise; empty when unavailable
    pub specialties: Value,

    /// Flat skills list; empty when unavailable
    pub skills: Value,
}

impl CandidateRecord {
    /// Creates a fresh record with every category at its default.
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            basic_info: Value::Null,
            languages: Value::Array(Vec::new()),
            specialties: Value::Array(Vec::new()),
            skills: Value::Array(Vec::new()),
        }
    }

    /// Applies one category outcome to the record.
    ///
    /// `Empty` and `Failed` leave the category at its default (null for
    /// basic_info, an empty array for the list categories); a failure is
    /// reported but never aborts the record.
    pub fn apply(&mut self, category: Category, outcome: CategoryOutcome) {
        let value = match outcome {
            CategoryOutcome::Extracted(value) => value,
            CategoryOutcome::Empty => return,
            CategoryOutcome::Failed(e) => {
                warn!("Keeping default for {category}: {e}");
                return;
            }
        };

        // List categories stay list-typed no matter what was extracted
        if category.key().is_some() && !value.is_array() {
            warn!("Discarding non-array payload for {category}");
            return;
        }

        match category {
            Category::BasicInfo => self.basic_info = value,
            Category::Languages => self.languages = value,
            Category::Specialties => self.specialties = value,
            Category::Skills => self.skills = value,
        }
    }
}
