//! Crop detail view for one prediction
//!
//! Joins crop reference data, the crop's timeline and the prediction's
//! recommendation entry by scientific name. Missing pieces are filled with
//! placeholders instead of failing, since scientific names are not enforced
//! references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Crop, Timeline, TimelineTask};
use crate::prediction::{Coordinates, Prediction};

/// Risk label used when the prediction has no entry for the crop
pub const UNKNOWN_RISK: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropDetails {
    pub scientific_name: String,
    pub crop: Option<Crop>,
    pub tasks: Vec<TimelineTask>,
    pub suitability: f64,
    pub risk: String,
    pub predicted_at: DateTime<Utc>,
    pub location_coordinates: Option<Coordinates>,
}

/// Turn a URL slug such as `oryza-sativa` back into a scientific name
pub fn scientific_name_from_slug(slug: &str) -> String {
    slug.replace('-', " ")
}

/// Build the detail view for `scientific_name` within `prediction`
pub fn crop_details(
    scientific_name: &str,
    crops: &[Crop],
    timelines: &[Timeline],
    prediction: &Prediction,
) -> CropDetails {
    let crop = crops.iter().find(|c| c.is_named(scientific_name)).cloned();
    let tasks = timelines
        .iter()
        .find(|t| t.is_named(scientific_name))
        .map(|t| t.tasks.clone())
        .unwrap_or_default();
    let recommendation = prediction.recommendation_for(scientific_name);

    CropDetails {
        scientific_name: scientific_name.to_string(),
        crop,
        tasks,
        suitability: recommendation.and_then(|rc| rc.suitability).unwrap_or(0.0),
        risk: recommendation
            .and_then(|rc| rc.risk.clone())
            .unwrap_or_else(|| UNKNOWN_RISK.to_string()),
        predicted_at: prediction.predicted_at,
        location_coordinates: prediction.input_data.location_coordinates,
    }
}
