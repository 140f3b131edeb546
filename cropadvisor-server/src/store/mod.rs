//! Storage abstractions for the advisory server

pub mod memory;
pub mod sqlite;

pub use memory::{InMemoryAccountStore, InMemoryCatalogStore, InMemoryPredictionStore};
pub use sqlite::SqliteStore;

use cropadvisor_core::{Admin, Crop, ObjectId, Prediction, SelectedCrop, Timeline, User};

use crate::error::ApiError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, ApiError>;

/// Trait for farmer and administrator accounts
pub trait AccountStore: Send + Sync {
    /// Insert a new user
    fn create_user(&self, user: &User) -> StoreResult<()>;

    /// Get a user by ID
    fn get_user(&self, id: ObjectId) -> StoreResult<Option<User>>;

    /// Find the first user with the given email (exact match)
    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// List all users in creation order
    fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Overwrite a stored user
    fn replace_user(&self, user: &User) -> StoreResult<()>;

    /// Delete a user; returns whether one existed
    fn delete_user(&self, id: ObjectId) -> StoreResult<bool>;

    /// Insert a new admin (email must be unique)
    fn create_admin(&self, admin: &Admin) -> StoreResult<()>;

    /// Get an admin by ID
    fn get_admin(&self, id: ObjectId) -> StoreResult<Option<Admin>>;

    /// Get an admin by normalized email
    fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>>;

    /// List all admins in creation order
    fn list_admins(&self) -> StoreResult<Vec<Admin>>;

    /// Overwrite a stored admin
    fn replace_admin(&self, admin: &Admin) -> StoreResult<()>;

    /// Delete an admin; returns whether one existed
    fn delete_admin(&self, id: ObjectId) -> StoreResult<bool>;
}

/// Trait for crop reference data and timelines
pub trait CatalogStore: Send + Sync {
    fn create_crop(&self, crop: &Crop) -> StoreResult<()>;

    fn get_crop(&self, id: ObjectId) -> StoreResult<Option<Crop>>;

    /// Find a crop by scientific name (case-insensitive)
    fn find_crop_by_scientific_name(&self, name: &str) -> StoreResult<Option<Crop>>;

    fn list_crops(&self) -> StoreResult<Vec<Crop>>;

    fn replace_crop(&self, crop: &Crop) -> StoreResult<()>;

    fn delete_crop(&self, id: ObjectId) -> StoreResult<bool>;

    fn create_timeline(&self, timeline: &Timeline) -> StoreResult<()>;

    fn get_timeline(&self, id: ObjectId) -> StoreResult<Option<Timeline>>;

    /// Find a timeline by scientific name (case-insensitive)
    fn find_timeline_by_scientific_name(&self, name: &str) -> StoreResult<Option<Timeline>>;

    fn list_timelines(&self) -> StoreResult<Vec<Timeline>>;

    fn replace_timeline(&self, timeline: &Timeline) -> StoreResult<()>;

    fn delete_timeline(&self, id: ObjectId) -> StoreResult<bool>;
}

/// Trait for predictions and the crops selected from them
pub trait PredictionStore: Send + Sync {
    fn create_prediction(&self, prediction: &Prediction) -> StoreResult<()>;

    fn get_prediction(&self, id: ObjectId) -> StoreResult<Option<Prediction>>;

    /// List all predictions in creation order
    fn list_predictions(&self) -> StoreResult<Vec<Prediction>>;

    /// List the predictions belonging to one user
    fn list_predictions_by_user(&self, user_id: ObjectId) -> StoreResult<Vec<Prediction>>;

    fn replace_prediction(&self, prediction: &Prediction) -> StoreResult<()>;

    /// Delete a prediction only; selections referencing it are left in place
    fn delete_prediction(&self, id: ObjectId) -> StoreResult<bool>;

    /// Record a selection (always a new row)
    fn create_selected_crop(&self, selected: &SelectedCrop) -> StoreResult<()>;

    fn get_selected_crop(&self, id: ObjectId) -> StoreResult<Option<SelectedCrop>>;

    /// List all selections, newest first
    fn list_selected_crops(&self) -> StoreResult<Vec<SelectedCrop>>;

    /// The most recent selection for a prediction
    fn latest_selected_crop(&self, prediction_id: ObjectId) -> StoreResult<Option<SelectedCrop>>;

    fn replace_selected_crop(&self, selected: &SelectedCrop) -> StoreResult<()>;

    fn delete_selected_crop(&self, id: ObjectId) -> StoreResult<bool>;

    /// Delete every selection of a prediction; returns how many were removed
    fn delete_selected_crops_for_prediction(&self, prediction_id: ObjectId) -> StoreResult<u64>;
}
