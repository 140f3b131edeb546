//! Prediction runs and the crops users select from them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::UserSummary;
use crate::document::{require_text, Document};
use crate::lenient;
use crate::{ObjectId, Result};

/// Map position of the field the prediction was run for
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// Soil, climate and budget inputs of a prediction run, stored verbatim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_coordinates: Option<Coordinates>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub nitrogen_required: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub phosphorous_required: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub potassium_required: Option<String>,
    #[serde(rename = "soilpH", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub soil_ph: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub humidity: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub rainfall: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub farm_size: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub climate: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub previous_crop: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One recommendation produced for a prediction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedCrop {
    pub crop_name: String,
    pub scientific_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suitability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,
}

/// A stored prediction run
///
/// The recommendations are supplied by the caller; nothing here checks that
/// `user_id` or any `scientific_name` resolves to an existing document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    #[serde(default)]
    pub input_data: InputData,
    #[serde(default)]
    pub recommended_crops: Vec<RecommendedCrop>,
    #[serde(default = "crate::now")]
    pub predicted_at: DateTime<Utc>,
}

impl Prediction {
    /// Find the recommendation for a crop, matching case-insensitively
    pub fn recommendation_for(&self, scientific_name: &str) -> Option<&RecommendedCrop> {
        self.recommended_crops
            .iter()
            .find(|rc| crate::catalog::same_scientific_name(&rc.scientific_name, scientific_name))
    }

    /// Replace the user reference with the user's name/email projection
    pub fn populate(self, user: Option<UserSummary>) -> PopulatedPrediction {
        PopulatedPrediction {
            id: self.id,
            user_id: user,
            input_data: self.input_data,
            recommended_crops: self.recommended_crops,
            predicted_at: self.predicted_at,
        }
    }
}

impl Document for Prediction {
    const PROTECTED: &'static [&'static str] = &["_id", "predictedAt"];

    fn id(&self) -> ObjectId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        for crop in &self.recommended_crops {
            require_text("recommendedCrops.cropName", &crop.crop_name)?;
            require_text("recommendedCrops.scientificName", &crop.scientific_name)?;
        }
        Ok(())
    }
}

/// A prediction as listed to administrators; a dangling user is `null`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedPrediction {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: Option<UserSummary>,
    pub input_data: InputData,
    pub recommended_crops: Vec<RecommendedCrop>,
    pub predicted_at: DateTime<Utc>,
}

/// A user's choice of one recommended crop
///
/// Selections accumulate; the current one is the latest by `selected_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedCrop {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub prediction_id: ObjectId,
    pub crop_name: String,
    pub scientific_name: String,
    #[serde(default = "crate::now")]
    pub selected_at: DateTime<Utc>,
}

impl SelectedCrop {
    pub fn new(prediction_id: ObjectId, crop_name: &str, scientific_name: &str) -> Self {
        Self {
            id: ObjectId::new(),
            prediction_id,
            crop_name: crop_name.to_string(),
            scientific_name: scientific_name.to_string(),
            selected_at: crate::now(),
        }
    }
}

impl Document for SelectedCrop {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn validate(&self) -> Result<()> {
        require_text("cropName", &self.crop_name)?;
        require_text("scientificName", &self.scientific_name)
    }
}
