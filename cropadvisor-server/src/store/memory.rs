//! In-memory storage implementations

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use cropadvisor_core::{Admin, Crop, Document, ObjectId, Prediction, SelectedCrop, Timeline, User};

use super::{AccountStore, CatalogStore, PredictionStore, StoreResult};
use crate::error::ApiError;

/// Documents of one kind, iterated in insertion order
///
/// Each insert takes the next sequence number, the in-memory counterpart of
/// SQLite's `rowid`.
struct Rows<T> {
    next_seq: u64,
    docs: BTreeMap<u64, T>,
    seq_of: HashMap<ObjectId, u64>,
}

impl<T: Document + Clone> Rows<T> {
    fn new() -> Self {
        Self {
            next_seq: 0,
            docs: BTreeMap::new(),
            seq_of: HashMap::new(),
        }
    }

    fn insert(&mut self, doc: &T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some(old) = self.seq_of.insert(doc.id(), seq) {
            self.docs.remove(&old);
        }
        self.docs.insert(seq, doc.clone());
    }

    fn get(&self, id: ObjectId) -> Option<T> {
        self.seq_of.get(&id).and_then(|seq| self.docs.get(seq)).cloned()
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        self.docs.values()
    }

    /// Overwrite in place, keeping the original position
    fn replace(&mut self, doc: &T) -> bool {
        match self.seq_of.get(&doc.id()) {
            Some(seq) => {
                self.docs.insert(*seq, doc.clone());
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: ObjectId) -> bool {
        match self.seq_of.remove(&id) {
            Some(seq) => self.docs.remove(&seq).is_some(),
            None => false,
        }
    }

    /// Remove every document matching `pred`; returns how many went
    fn remove_where(&mut self, pred: impl Fn(&T) -> bool) -> usize {
        let doomed: Vec<ObjectId> = self.values().filter(|d| pred(*d)).map(|d| d.id()).collect();
        doomed.into_iter().filter(|id| self.remove(*id)).count()
    }

    /// Newest first by `key`; equal keys keep the later insert first
    fn sorted_desc_by<K: Ord>(&self, key: impl Fn(&T) -> K) -> Vec<T> {
        let mut entries: Vec<(&u64, &T)> = self.docs.iter().collect();
        entries.sort_by(|x, y| (key(y.1), y.0).cmp(&(key(x.1), x.0)));
        entries.into_iter().map(|(_, d)| d.clone()).collect()
    }
}

/// In-memory user and admin store
pub struct InMemoryAccountStore {
    users: RwLock<Rows<User>>,
    admins: RwLock<Rows<Admin>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Rows::new()),
            admins: RwLock::new(Rows::new()),
        }
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn create_user(&self, user: &User) -> StoreResult<()> {
        self.users.write().unwrap().insert(user);
        Ok(())
    }

    fn get_user(&self, id: ObjectId) -> StoreResult<Option<User>> {
        Ok(self.users.read().unwrap().get(id))
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().unwrap();
        let found = users.values().find(|u| u.email == email).cloned();
        Ok(found)
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().unwrap().values().cloned().collect())
    }

    fn replace_user(&self, user: &User) -> StoreResult<()> {
        if !self.users.write().unwrap().replace(user) {
            return Err(ApiError::UserNotFound);
        }
        Ok(())
    }

    fn delete_user(&self, id: ObjectId) -> StoreResult<bool> {
        Ok(self.users.write().unwrap().remove(id))
    }

    fn create_admin(&self, admin: &Admin) -> StoreResult<()> {
        let mut admins = self.admins.write().unwrap();
        if admins.values().any(|a| a.email == admin.email) {
            return Err(ApiError::AdminAlreadyExists);
        }
        admins.insert(admin);
        Ok(())
    }

    fn get_admin(&self, id: ObjectId) -> StoreResult<Option<Admin>> {
        Ok(self.admins.read().unwrap().get(id))
    }

    fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        let admins = self.admins.read().unwrap();
        let found = admins.values().find(|a| a.email == email).cloned();
        Ok(found)
    }

    fn list_admins(&self) -> StoreResult<Vec<Admin>> {
        Ok(self.admins.read().unwrap().values().cloned().collect())
    }

    fn replace_admin(&self, admin: &Admin) -> StoreResult<()> {
        let mut admins = self.admins.write().unwrap();
        if admins
            .values()
            .any(|a| a.email == admin.email && a.id != admin.id)
        {
            return Err(ApiError::AdminAlreadyExists);
        }
        if !admins.replace(admin) {
            return Err(ApiError::AdminNotFound);
        }
        Ok(())
    }

    fn delete_admin(&self, id: ObjectId) -> StoreResult<bool> {
        Ok(self.admins.write().unwrap().remove(id))
    }
}

/// In-memory crop and timeline store
pub struct InMemoryCatalogStore {
    crops: RwLock<Rows<Crop>>,
    timelines: RwLock<Rows<Timeline>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self {
            crops: RwLock::new(Rows::new()),
            timelines: RwLock::new(Rows::new()),
        }
    }
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn create_crop(&self, crop: &Crop) -> StoreResult<()> {
        self.crops.write().unwrap().insert(crop);
        Ok(())
    }

    fn get_crop(&self, id: ObjectId) -> StoreResult<Option<Crop>> {
        Ok(self.crops.read().unwrap().get(id))
    }

    fn find_crop_by_scientific_name(&self, name: &str) -> StoreResult<Option<Crop>> {
        let crops = self.crops.read().unwrap();
        let found = crops.values().find(|c| c.is_named(name)).cloned();
        Ok(found)
    }

    fn list_crops(&self) -> StoreResult<Vec<Crop>> {
        Ok(self.crops.read().unwrap().values().cloned().collect())
    }

    fn replace_crop(&self, crop: &Crop) -> StoreResult<()> {
        if !self.crops.write().unwrap().replace(crop) {
            return Err(ApiError::CropNotFound);
        }
        Ok(())
    }

    fn delete_crop(&self, id: ObjectId) -> StoreResult<bool> {
        Ok(self.crops.write().unwrap().remove(id))
    }

    fn create_timeline(&self, timeline: &Timeline) -> StoreResult<()> {
        self.timelines.write().unwrap().insert(timeline);
        Ok(())
    }

    fn get_timeline(&self, id: ObjectId) -> StoreResult<Option<Timeline>> {
        Ok(self.timelines.read().unwrap().get(id))
    }

    fn find_timeline_by_scientific_name(&self, name: &str) -> StoreResult<Option<Timeline>> {
        let timelines = self.timelines.read().unwrap();
        let found = timelines.values().find(|t| t.is_named(name)).cloned();
        Ok(found)
    }

    fn list_timelines(&self) -> StoreResult<Vec<Timeline>> {
        Ok(self.timelines.read().unwrap().values().cloned().collect())
    }

    fn replace_timeline(&self, timeline: &Timeline) -> StoreResult<()> {
        if !self.timelines.write().unwrap().replace(timeline) {
            return Err(ApiError::TimelineNotFound);
        }
        Ok(())
    }

    fn delete_timeline(&self, id: ObjectId) -> StoreResult<bool> {
        Ok(self.timelines.write().unwrap().remove(id))
    }
}

/// In-memory prediction and selection store
pub struct InMemoryPredictionStore {
    predictions: RwLock<Rows<Prediction>>,
    selected: RwLock<Rows<SelectedCrop>>,
}

impl InMemoryPredictionStore {
    pub fn new() -> Self {
        Self {
            predictions: RwLock::new(Rows::new()),
            selected: RwLock::new(Rows::new()),
        }
    }
}

impl Default for InMemoryPredictionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionStore for InMemoryPredictionStore {
    fn create_prediction(&self, prediction: &Prediction) -> StoreResult<()> {
        self.predictions.write().unwrap().insert(prediction);
        Ok(())
    }

    fn get_prediction(&self, id: ObjectId) -> StoreResult<Option<Prediction>> {
        Ok(self.predictions.read().unwrap().get(id))
    }

    fn list_predictions(&self) -> StoreResult<Vec<Prediction>> {
        Ok(self.predictions.read().unwrap().values().cloned().collect())
    }

    fn list_predictions_by_user(&self, user_id: ObjectId) -> StoreResult<Vec<Prediction>> {
        let predictions = self.predictions.read().unwrap();
        Ok(predictions
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    fn replace_prediction(&self, prediction: &Prediction) -> StoreResult<()> {
        if !self.predictions.write().unwrap().replace(prediction) {
            return Err(ApiError::PredictionNotFound);
        }
        Ok(())
    }

    fn delete_prediction(&self, id: ObjectId) -> StoreResult<bool> {
        Ok(self.predictions.write().unwrap().remove(id))
    }

    fn create_selected_crop(&self, selected: &SelectedCrop) -> StoreResult<()> {
        self.selected.write().unwrap().insert(selected);
        Ok(())
    }

    fn get_selected_crop(&self, id: ObjectId) -> StoreResult<Option<SelectedCrop>> {
        Ok(self.selected.read().unwrap().get(id))
    }

    fn list_selected_crops(&self) -> StoreResult<Vec<SelectedCrop>> {
        Ok(self.selected.read().unwrap().sorted_desc_by(|s| s.selected_at))
    }

    fn latest_selected_crop(&self, prediction_id: ObjectId) -> StoreResult<Option<SelectedCrop>> {
        let selected = self.selected.read().unwrap();
        Ok(selected
            .sorted_desc_by(|s| s.selected_at)
            .into_iter()
            .find(|s| s.prediction_id == prediction_id))
    }

    fn replace_selected_crop(&self, selected: &SelectedCrop) -> StoreResult<()> {
        if !self.selected.write().unwrap().replace(selected) {
            return Err(ApiError::SelectedCropNotFound);
        }
        Ok(())
    }

    fn delete_selected_crop(&self, id: ObjectId) -> StoreResult<bool> {
        Ok(self.selected.write().unwrap().remove(id))
    }

    fn delete_selected_crops_for_prediction(&self, prediction_id: ObjectId) -> StoreResult<u64> {
        let removed = self
            .selected
            .write()
            .unwrap()
            .remove_where(|s| s.prediction_id == prediction_id);
        Ok(removed as u64)
    }
}
