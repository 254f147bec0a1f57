//! Persistable form of a draft

use serde::{Deserialize, Serialize};

use crate::draft::OfferDraft;

/// An [`OfferDraft`] with every binary file handle removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableDraft {
    #[serde(flatten)]
    pub draft: OfferDraft,
    /// Set once binary handles have been stripped
    #[serde(default)]
    pub stripped: bool,
}

impl SerializableDraft {
    /// Back into a working draft. Custom image slots keep their preview URL
    /// but no longer carry the uploaded file.
    pub fn into_draft(self) -> OfferDraft {
        self.draft
    }
}

/// Deep copy of `draft` safe to persist.
///
/// File handles are nulled while URL and preview references are retained, so
/// the visual state survives a reload. Session-only touch state is dropped.
pub fn serialize(draft: &OfferDraft) -> SerializableDraft {
    let mut copy = draft.clone();
    copy.logo.file = None;
    copy.banner.file = None;
    copy.touched.clear();

    SerializableDraft {
        draft: copy,
        stripped: true,
    }
}
