//! Mock storage implementation for testing

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thumbnailer_core::{ObjectLocation, StorageBackend};
use thumbnailer_storage::{
    ObjectMetadata, ObjectStorage, ObjectStream, StorageError, StorageResult,
};

/// Operation recorded by [`MockStorage`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Fetch(ObjectLocation),
    Store(ObjectLocation),
    Delete(ObjectLocation),
}

type FailFn = fn(String) -> StorageError;

/// Mock storage implementation that keeps objects in memory
#[derive(Default)]
pub struct MockStorage {
    objects: Arc<Mutex<HashMap<ObjectLocation, (Vec<u8>, Option<ObjectMetadata>)>>>,
    calls: Arc<Mutex<Vec<StorageCall>>>,
    releases: Arc<AtomicUsize>,
    fail_fetch: Mutex<Option<FailFn>>,
    fail_read: Mutex<bool>,
    fail_store: Mutex<Option<FailFn>>,
    fail_delete: Mutex<Option<FailFn>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an object in the mock storage
    pub fn put_object(&self, bucket: &str, key: &str, data: Vec<u8>) {
        self.objects
            .lock()
            .unwrap()
            .insert(ObjectLocation::new(bucket, key), (data, None));
    }

    pub fn has_object(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&ObjectLocation::new(bucket, key))
    }

    /// Get object data and the metadata it was stored with (for test assertions)
    pub fn get_object(&self, bucket: &str, key: &str) -> Option<(Vec<u8>, Option<ObjectMetadata>)> {
        self.objects
            .lock()
            .unwrap()
            .get(&ObjectLocation::new(bucket, key))
            .cloned()
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of fetched streams released so far.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn fail_fetch_with(&self, err: FailFn) {
        *self.fail_fetch.lock().unwrap() = Some(err);
    }

    /// Fetch succeeds but the body errors halfway through.
    pub fn fail_read(&self) {
        *self.fail_read.lock().unwrap() = true;
    }

    pub fn fail_store_with(&self, err: FailFn) {
        *self.fail_store.lock().unwrap() = Some(err);
    }

    pub fn fail_delete_with(&self, err: FailFn) {
        *self.fail_delete.lock().unwrap() = Some(err);
    }

    fn record(&self, call: StorageCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn fetch(&self, bucket: &str, key: &str) -> StorageResult<ObjectStream> {
        let location = ObjectLocation::new(bucket, key);
        self.record(StorageCall::Fetch(location.clone()));

        if let Some(fail) = *self.fail_fetch.lock().unwrap() {
            return Err(fail(location.to_string()));
        }

        let data = self
            .objects
            .lock()
            .unwrap()
            .get(&location)
            .map(|(data, _)| Bytes::from(data.clone()))
            .ok_or_else(|| StorageError::NotFound(location.to_string()))?;

        let releases = self.releases.clone();
        let stream = if *self.fail_read.lock().unwrap() {
            let chunks: Vec<StorageResult<Bytes>> = vec![
                Ok(data.slice(..data.len() / 2)),
                Err(StorageError::DownloadFailed("connection reset".to_string())),
            ];
            ObjectStream::new(location, Box::pin(futures::stream::iter(chunks)))
        } else {
            ObjectStream::from_bytes(location, data)
        };

        Ok(stream.on_release(move || {
            releases.fetch_add(1, Ordering::SeqCst);
        }))
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        metadata: &ObjectMetadata,
    ) -> StorageResult<()> {
        let location = ObjectLocation::new(bucket, key);
        self.record(StorageCall::Store(location.clone()));

        if let Some(fail) = *self.fail_store.lock().unwrap() {
            return Err(fail(location.to_string()));
        }

        self.objects
            .lock()
            .unwrap()
            .insert(location, (data.to_vec(), Some(metadata.clone())));
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let location = ObjectLocation::new(bucket, key);
        self.record(StorageCall::Delete(location.clone()));

        if let Some(fail) = *self.fail_delete.lock().unwrap() {
            return Err(fail(location.to_string()));
        }

        self.objects.lock().unwrap().remove(&location);
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
