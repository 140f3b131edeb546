//! Crop Advisory Core Library
//!
//! Domain model for the crop advisory platform:
//! - Farmers run predictions that store inputs and recommended crops
//! - A farmer selects one recommended crop per prediction (history is kept)
//! - Crops and their task timelines are reference data keyed by scientific name
//! - Administrators are a separate account collection

pub mod account;
pub mod catalog;
pub mod details;
pub mod document;
pub mod error;
pub mod lenient;
pub mod object_id;
pub mod pagination;
pub mod prediction;

pub use account::{normalize_email, Admin, AdminSummary, Role, User, UserStatus, UserSummary};
pub use catalog::{Crop, Timeline, TimelineTask};
pub use details::{crop_details, CropDetails};
pub use document::Document;
pub use error::Error;
pub use object_id::ObjectId;
pub use pagination::PageParams;
pub use prediction::{Coordinates, InputData, PopulatedPrediction, Prediction, RecommendedCrop, SelectedCrop};

use chrono::{DateTime, SubsecRound, Utc};

/// Result type for cropadvisor-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Current time at millisecond precision, the resolution documents store
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
