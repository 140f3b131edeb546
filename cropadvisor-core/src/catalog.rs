//! Crop reference data and per-crop task timelines
//!
//! Both are keyed by `scientificName`, a plain string rather than an id
//! reference. Lookups compare names case-insensitively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{require_text, Document};
use crate::lenient;
use crate::{ObjectId, Result};

/// Reference data describing one crop species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub crop_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub growth_period: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub nitrogen_required: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub phosphorus_required: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub potassium_required: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub humidity: Option<String>,
    #[serde(rename = "soilpH", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub soil_ph: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fertilizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pest_control: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvesting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunlight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
    #[serde(default = "crate::now")]
    pub created_at: DateTime<Utc>,
}

impl Crop {
    /// Whether this crop is known under `name`
    pub fn is_named(&self, name: &str) -> bool {
        self.scientific_name
            .as_deref()
            .is_some_and(|own| same_scientific_name(own, name))
    }
}

impl Document for Crop {
    const PROTECTED: &'static [&'static str] = &["_id", "createdAt"];

    fn id(&self) -> ObjectId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        require_text("cropName", &self.crop_name)
    }
}

/// One day-indexed farming task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineTask {
    pub day: u32,
    pub title: String,
    pub details: String,
}

/// The ordered task list for one crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub scientific_name: String,
    #[serde(default)]
    pub tasks: Vec<TimelineTask>,
    #[serde(default = "crate::now")]
    pub created_at: DateTime<Utc>,
}

impl Timeline {
    /// Order tasks by day; tasks on the same day keep their submitted order
    pub fn sort_tasks(&mut self) {
        self.tasks.sort_by_key(|task| task.day);
    }

    pub fn is_named(&self, name: &str) -> bool {
        same_scientific_name(&self.scientific_name, name)
    }
}

impl Document for Timeline {
    const PROTECTED: &'static [&'static str] = &["_id", "createdAt"];

    fn id(&self) -> ObjectId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        require_text("scientificName", &self.scientific_name)?;
        for task in &self.tasks {
            require_text("tasks.title", &task.title)?;
            require_text("tasks.details", &task.details)?;
        }
        Ok(())
    }
}

/// Case-insensitive scientific name comparison
pub fn same_scientific_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
