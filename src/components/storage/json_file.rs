use super::memory::InMemoryStore;
use super::records::{
    validate_appointment, validate_provider, validate_review, validate_service, Dataset,
    DatasetDocument, DatasetRecord,
};
use super::BookingStore;
use crate::components::availability::models::{Appointment, Provider, Service};
use crate::components::reviews::Review;
use crate::error::{storage_error, BookingResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Store backed by a single JSON document.
///
/// Reads are served from memory. A mutation is applied to a copy of the
/// data, the copy is written through a temporary file and a rename, and only
/// then does it replace what readers see.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryStore,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> BookingResult<Self> {
        let path = path.into();

        let dataset = match fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str::<DatasetRecord>(&content)?.into_dataset(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No data file at {}, starting with an empty store", path.display());
                Dataset::default()
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "Loaded {} providers, {} services, {} appointments and {} reviews from {}",
            dataset.providers.len(),
            dataset.services.len(),
            dataset.appointments.len(),
            dataset.reviews.len(),
            path.display()
        );

        Ok(Self {
            path,
            inner: InMemoryStore::with_dataset(dataset),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the data, write it, then publish it
    async fn update<T>(&self, change: impl FnOnce(&mut Dataset) -> T) -> BookingResult<T> {
        let _guard = self.write_lock.lock().await;

        let mut next = self.inner.snapshot().await;
        let result = change(&mut next);
        self.write(&next).await?;
        self.inner.replace(next).await;

        Ok(result)
    }

    async fn write(&self, dataset: &Dataset) -> BookingResult<()> {
        let json = serde_json::to_string_pretty(&DatasetDocument::from(dataset))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            storage_error(&format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        debug!("Wrote data file {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl BookingStore for JsonFileStore {
    async fn providers(&self) -> BookingResult<Vec<Provider>> {
        self.inner.providers().await
    }

    async fn provider(&self, id: &str) -> BookingResult<Option<Provider>> {
        self.inner.provider(id).await
    }

    async fn services(&self) -> BookingResult<Vec<Service>> {
        self.inner.services().await
    }

    async fn service(&self, id: &str) -> BookingResult<Option<Service>> {
        self.inner.service(id).await
    }

    async fn appointments(&self) -> BookingResult<Vec<Appointment>> {
        self.inner.appointments().await
    }

    async fn appointment(&self, id: &str) -> BookingResult<Option<Appointment>> {
        self.inner.appointment(id).await
    }

    async fn appointments_for(
        &self,
        provider_id: &str,
        date: &str,
    ) -> BookingResult<Vec<Appointment>> {
        self.inner.appointments_for(provider_id, date).await
    }

    async fn reviews(&self) -> BookingResult<Vec<Review>> {
        self.inner.reviews().await
    }

    async fn review(&self, id: &str) -> BookingResult<Option<Review>> {
        self.inner.review(id).await
    }

    async fn save_provider(&self, provider: Provider) -> BookingResult<()> {
        validate_provider(&provider)?;
        self.update(|data| data.upsert_provider(provider)).await
    }

    async fn save_service(&self, service: Service) -> BookingResult<()> {
        validate_service(&service)?;
        self.update(|data| data.upsert_service(service)).await
    }

    async fn save_appointment(&self, appointment: Appointment) -> BookingResult<()> {
        validate_appointment(&appointment)?;
        self.update(|data| data.upsert_appointment(appointment)).await
    }

    async fn save_review(&self, review: Review) -> BookingResult<()> {
        validate_review(&review)?;
        self.update(|data| data.upsert_review(review)).await
    }

    async fn delete_provider(&self, id: &str) -> BookingResult<bool> {
        self.update(|data| data.remove_provider(id)).await
    }

    async fn delete_service(&self, id: &str) -> BookingResult<bool> {
        self.update(|data| data.remove_service(id)).await
    }

    async fn delete_appointment(&self, id: &str) -> BookingResult<bool> {
        self.update(|data| data.remove_appointment(id)).await
    }

    async fn delete_review(&self, id: &str) -> BookingResult<bool> {
        self.update(|data| data.remove_review(id)).await
    }
}
