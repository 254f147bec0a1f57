//! Offer submission collaborator
//!
//! Publishing hands the finalized draft to a [`Submitter`]. The real network
//! call lives outside this crate; [`StubSubmitter`] stands in with a fixed
//! delay.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::PublishConfig;
use crate::draft::OfferDraft;
use crate::persistence::{serialize, SerializableDraft};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("offer was rejected: {0}")]
    Rejected(String),

    #[error("submission service unavailable: {0}")]
    Unavailable(String),
}

/// Returned by a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    /// Id of the published offer
    pub offer_id: String,
    pub submitted_at: DateTime<Utc>,
    /// True when an existing offer was updated in place
    pub updated: bool,
}

/// Accepts a finalized draft for publishing
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, offer: &SerializableDraft) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Build the payload handed to a [`Submitter`]
pub fn payload(draft: &OfferDraft) -> SerializableDraft {
    serialize(draft)
}

/// Delayed stand-in for the publish call
#[derive(Debug, Clone)]
pub struct StubSubmitter {
    delay: Duration,
    failure: Option<SubmissionError>,
}

impl StubSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            failure: None,
        }
    }

    pub fn from_config(config: &PublishConfig) -> Self {
        Self::new(Duration::from_millis(config.simulated_delay_ms))
    }

    /// Every submission fails with `error`
    pub fn failing(mut self, error: SubmissionError) -> Self {
        self.failure = Some(error);
        self
    }
}

#[async_trait]
impl Submitter for StubSubmitter {
    async fn submit(&self, offer: &SerializableDraft) -> Result<SubmissionReceipt, SubmissionError> {
        tokio::time::sleep(self.delay).await;

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let existing = offer.draft.edit_target_id.clone();
        Ok(SubmissionReceipt {
            updated: existing.is_some(),
            offer_id: existing.unwrap_or_else(|| format!("OFR-{}", Uuid::new_v4().simple())),
            submitted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OfferType;

    #[tokio::test]
    async fn test_stub_assigns_new_offer_id() {
        let submitter = StubSubmitter::new(Duration::from_millis(1));
        let receipt = submitter
            .submit(&payload(&OfferDraft::with_type(OfferType::Bogo)))
            .await
            .unwrap();
        assert!(receipt.offer_id.starts_with("OFR-"));
        assert!(!receipt.updated);
    }

    #[tokio::test]
    async fn test_stub_updates_edit_target() {
        let mut draft = OfferDraft::with_type(OfferType::Bogo);
        draft.edit_target_id = Some("OFR-7".to_string());
        let receipt = StubSubmitter::new(Duration::ZERO)
            .submit(&payload(&draft))
            .await
            .unwrap();
        assert_eq!(receipt.offer_id, "OFR-7");
        assert!(receipt.updated);
    }

    #[tokio::test]
    async fn test_stub_failure() {
        let submitter = StubSubmitter::new(Duration::ZERO)
            .failing(SubmissionError::Unavailable("maintenance".to_string()));
        let err = submitter
            .submit(&payload(&OfferDraft::new()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "submission service unavailable: maintenance");
    }
}
