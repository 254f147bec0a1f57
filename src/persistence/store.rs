//! Draft persistence keyed by draft id

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use super::backend::{FileBackend, MemoryBackend, StorageBackend, StoreError};
use super::serializer::{serialize, SerializableDraft};
use crate::draft::OfferDraft;
use crate::types::OfferType;
use crate::wizard::WizardStep;

/// Namespace for every stored draft key
pub const KEY_PREFIX: &str = "offer-wizard:draft:";

/// One stored draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub draft_id: Uuid,
    pub current_step: WizardStep,
    pub completed_steps: Vec<WizardStep>,
    pub saved_at: DateTime<Utc>,
    pub form_data: SerializableDraft,
}

impl DraftRecord {
    /// Working draft with its id restored
    pub fn to_draft(&self) -> OfferDraft {
        let mut draft = self.form_data.clone().into_draft();
        draft.draft_id = Some(self.draft_id);
        draft
    }
}

/// Listing entry for resume pickers and the CLI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftSummary {
    pub draft_id: Uuid,
    pub current_step: WizardStep,
    pub saved_at: DateTime<Utc>,
    pub offer_type: Option<OfferType>,
    pub merchant_name: Option<String>,
    pub headline: String,
}

impl From<&DraftRecord> for DraftSummary {
    fn from(record: &DraftRecord) -> Self {
        let draft = &record.form_data.draft;
        Self {
            draft_id: record.draft_id,
            current_step: record.current_step,
            saved_at: record.saved_at,
            offer_type: draft.offer_type,
            merchant_name: draft.merchant.as_ref().map(|m| m.display_name().to_string()),
            headline: draft.headline.clone(),
        }
    }
}

/// Create/read/delete over a [`StorageBackend`].
///
/// Every failure is caught here and logged; callers only see whether the
/// operation took effect. The in-memory draft stays authoritative until the
/// next successful write.
#[derive(Clone)]
pub struct DraftStore {
    backend: Arc<dyn StorageBackend>,
}

impl DraftStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Store backed by one JSON file per draft in `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(dir))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    pub fn key_for(id: Uuid) -> String {
        format!("{KEY_PREFIX}{id}")
    }

    /// Persist `draft` under `id`. Returns `false` if nothing was written.
    pub fn save(
        &self,
        id: Uuid,
        draft: &OfferDraft,
        step: WizardStep,
        completed_steps: &[WizardStep],
    ) -> bool {
        match self.try_save(id, draft, step, completed_steps) {
            Ok(record) => {
                tracing::debug!(
                    draft_id = %id,
                    step = %record.current_step,
                    saved_at = %record.saved_at.to_rfc3339(),
                    "Draft saved"
                );
                true
            }
            Err(e) => {
                tracing::warn!(draft_id = %id, error = %e, "Failed to save draft");
                false
            }
        }
    }

    pub fn try_save(
        &self,
        id: Uuid,
        draft: &OfferDraft,
        step: WizardStep,
        completed_steps: &[WizardStep],
    ) -> Result<DraftRecord, StoreError> {
        let record = DraftRecord {
            draft_id: id,
            current_step: step,
            completed_steps: completed_steps.to_vec(),
            saved_at: Utc::now(),
            form_data: serialize(draft),
        };
        let contents = serde_json::to_string_pretty(&record)?;
        self.backend.put(&Self::key_for(id), &contents)?;
        Ok(record)
    }

    /// Load the record stored under `id`, if any readable one exists
    pub fn load(&self, id: Uuid) -> Option<DraftRecord> {
        match self.try_load(id) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(draft_id = %id, error = %e, "Failed to load draft");
                None
            }
        }
    }

    pub fn try_load(&self, id: Uuid) -> Result<Option<DraftRecord>, StoreError> {
        let key = Self::key_for(id);
        let Some(contents) = self.backend.get(&key)? else {
            return Ok(None);
        };

        let record: DraftRecord =
            serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
                key: key.clone(),
                reason: e.to_string(),
            })?;

        if record.draft_id != id {
            return Err(StoreError::Corrupt {
                key,
                reason: format!("record carries draft id {}", record.draft_id),
            });
        }
        Ok(Some(record))
    }

    /// Remove the record for `id`. Returns whether a record was removed.
    pub fn delete(&self, id: Uuid) -> bool {
        match self.backend.remove(&Self::key_for(id)) {
            Ok(removed) => {
                tracing::debug!(draft_id = %id, removed, "Draft deleted");
                removed
            }
            Err(e) => {
                tracing::warn!(draft_id = %id, error = %e, "Failed to delete draft");
                false
            }
        }
    }

    /// Every readable draft, most recently saved first
    pub fn list(&self) -> Vec<DraftSummary> {
        let keys = match self.backend.keys(KEY_PREFIX) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list drafts");
                return Vec::new();
            }
        };

        let mut summaries: Vec<DraftSummary> = keys
            .iter()
            .filter_map(|key| {
                let id = key.strip_prefix(KEY_PREFIX)?;
                match Uuid::parse_str(id) {
                    Ok(id) => self.load(id),
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Skipping draft with malformed key");
                        None
                    }
                }
            })
            .map(|record| DraftSummary::from(&record))
            .collect();

        summaries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        summaries
    }
}

impl std::fmt::Debug for DraftStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftStore").finish_non_exhaustive()
    }
}
