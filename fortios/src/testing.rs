//! In-memory CMDB for exercising resources without a device

use crate::api::{ApiError, CmdbClient};
use async_trait::async_trait;
use fortimap::{RemoteRecord, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

type ObjectKey = (String, Option<String>);

/// A write the fake received: path, mkey, payload, vdom
pub type RecordedWrite = (String, Option<String>, RemoteRecord, Option<String>);

#[derive(Default)]
pub struct FakeCmdb {
    objects: Mutex<HashMap<ObjectKey, RemoteRecord>>,
    writes: Mutex<Vec<RecordedWrite>>,
    deleted: Mutex<Vec<ObjectKey>>,
    version: Option<String>,
    next_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeCmdb {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Seeds an object as the device would return it
    ///
    /// Anything but a JSON object is ignored.
    pub fn put(&self, path: &str, mkey: Option<&str>, object: serde_json::Value) {
        if let Ok(record) = RemoteRecord::try_from(object) {
            lock(&self.objects).insert(key(path, mkey), record);
        }
    }

    pub fn get(&self, path: &str, mkey: Option<&str>) -> Option<RemoteRecord> {
        lock(&self.objects).get(&key(path, mkey)).cloned()
    }

    pub fn last_write(&self) -> Option<RecordedWrite> {
        lock(&self.writes).last().cloned()
    }

    pub fn deleted(&self) -> Vec<(String, Option<String>)> {
        lock(&self.deleted).clone()
    }

    fn record_write(
        &self,
        path: &str,
        mkey: Option<&str>,
        payload: &RemoteRecord,
        vdom: Option<&str>,
    ) {
        lock(&self.writes).push((
            path.to_string(),
            mkey.map(str::to_string),
            payload.clone(),
            vdom.map(str::to_string),
        ));
    }
}

fn key(path: &str, mkey: Option<&str>) -> ObjectKey {
    (path.to_string(), mkey.map(str::to_string))
}

#[async_trait]
impl CmdbClient for FakeCmdb {
    async fn create(
        &self,
        path: &str,
        payload: &RemoteRecord,
        vdom: Option<&str>,
    ) -> Result<Option<String>, ApiError> {
        self.record_write(path, None, payload, vdom);

        let mkey = match payload.get("id").or_else(|| payload.get("name")) {
            Some(Value::Int(id)) => id.to_string(),
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
        };

        let mut objects = lock(&self.objects);
        let object_key = key(path, Some(mkey.as_str()));
        if objects.contains_key(&object_key) {
            return Err(ApiError::ApiError {
                status: 500,
                message: "A duplicate entry already exists".to_string(),
                code: Some(-5),
            });
        }
        objects.insert(object_key, payload.clone());
        Ok(Some(mkey))
    }

    async fn read(
        &self,
        path: &str,
        mkey: Option<&str>,
        _vdom: Option<&str>,
    ) -> Result<Option<RemoteRecord>, ApiError> {
        Ok(self.get(path, mkey))
    }

    async fn update(
        &self,
        path: &str,
        mkey: Option<&str>,
        payload: &RemoteRecord,
        vdom: Option<&str>,
    ) -> Result<(), ApiError> {
        self.record_write(path, mkey, payload, vdom);

        let mut objects = lock(&self.objects);
        let object_key = key(path, mkey);
        // singletons always exist; table rows must be created first
        if mkey.is_some() && !objects.contains_key(&object_key) {
            return Err(ApiError::NotFound(format!(
                "{}/{}",
                path,
                mkey.unwrap_or_default()
            )));
        }

        let object = objects.entry(object_key).or_default();
        for (name, value) in payload.iter() {
            if value.is_null() {
                object.remove(name);
            } else {
                object.insert(name, value.clone());
            }
        }
        Ok(())
    }

    async fn delete(
        &self,
        path: &str,
        mkey: Option<&str>,
        _vdom: Option<&str>,
    ) -> Result<(), ApiError> {
        let object_key = key(path, mkey);
        if lock(&self.objects).remove(&object_key).is_none() {
            return Err(ApiError::NotFound(path.to_string()));
        }
        lock(&self.deleted).push(object_key);
        Ok(())
    }

    async fn version(&self) -> Option<String> {
        self.version.clone()
    }
}
