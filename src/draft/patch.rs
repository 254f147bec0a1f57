//! Partial updates produced by the auto-fill cascade

use std::collections::BTreeSet;

use super::OfferDraft;
use crate::types::{Field, ImageSlot, Merchant, OfferType, Provenance, RedemptionMethod};

/// A partial update to a draft. `None` leaves the field untouched.
///
/// Fields listed in `inferred` are marked [`Provenance::Inferred`] once the
/// patch is applied; the offer type and merchant, when present, are user
/// choices and become [`Provenance::UserSet`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftPatch {
    pub offer_type: Option<OfferType>,
    pub merchant: Option<Merchant>,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub terms: Option<String>,
    pub categories: Option<BTreeSet<String>>,
    pub commodities: Option<BTreeSet<String>>,
    pub redemption_methods: Option<BTreeSet<RedemptionMethod>>,
    pub logo: Option<ImageSlot>,
    pub banner: Option<ImageSlot>,
    /// Reset discount, minimum spend, cashback cap, tiers and item description
    pub clear_type_specific: bool,
    pub inferred: Vec<Field>,
}

impl DraftPatch {
    pub fn is_empty(&self) -> bool {
        *self == DraftPatch::default()
    }

    /// Record an inferred write so provenance is stamped on apply
    pub(crate) fn infer(&mut self, field: Field) {
        if !self.inferred.contains(&field) {
            self.inferred.push(field);
        }
    }

    /// Fold another patch on top of this one; later values win
    pub fn merge(mut self, other: DraftPatch) -> Self {
        macro_rules! take {
            ($($f:ident),*) => {
                $(if other.$f.is_some() { self.$f = other.$f; })*
            };
        }
        take!(
            offer_type,
            merchant,
            headline,
            description,
            terms,
            categories,
            commodities,
            redemption_methods,
            logo,
            banner
        );
        self.clear_type_specific |= other.clear_type_specific;
        for field in other.inferred {
            self.infer(field);
        }
        self
    }
}

impl OfferDraft {
    /// Apply a cascade patch, producing the next revision in place
    pub fn apply(&mut self, patch: DraftPatch) {
        if patch.clear_type_specific {
            self.clear_type_specific();
        }
        if let Some(t) = patch.offer_type {
            self.offer_type = Some(t);
            self.provenance.insert(Field::OfferType, Provenance::UserSet);
        }
        if let Some(m) = patch.merchant {
            self.merchant = Some(m);
            self.provenance.insert(Field::Merchant, Provenance::UserSet);
        }
        if let Some(v) = patch.headline {
            self.headline = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.terms {
            self.terms = v;
        }
        if let Some(v) = patch.categories {
            self.categories = v;
        }
        if let Some(v) = patch.commodities {
            self.commodities = v;
        }
        if let Some(v) = patch.redemption_methods {
            self.redemption_methods = v;
        }
        if let Some(v) = patch.logo {
            self.logo = v;
        }
        if let Some(v) = patch.banner {
            self.banner = v;
        }
        for field in patch.inferred {
            if self.is_field_empty(field) {
                self.provenance.remove(&field);
            } else {
                self.provenance.insert(field, Provenance::Inferred);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_stamps_inferred_provenance() {
        let mut draft = OfferDraft::new();
        let mut patch = DraftPatch {
            headline: Some("Lunch deals at Luigi's".to_string()),
            ..DraftPatch::default()
        };
        patch.infer(Field::Headline);

        draft.apply(patch);

        assert_eq!(draft.headline, "Lunch deals at Luigi's");
        assert_eq!(draft.provenance(Field::Headline), Provenance::Inferred);
        assert!(!draft.touched.contains(&Field::Headline));
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut draft = OfferDraft::with_type(OfferType::Bogo);
        let before = draft.clone();
        assert!(DraftPatch::default().is_empty());
        draft.apply(DraftPatch::default());
        assert_eq!(draft, before);
    }

    #[test]
    fn test_merge_later_values_win() {
        let mut first = DraftPatch {
            headline: Some("first".to_string()),
            terms: Some("terms".to_string()),
            ..DraftPatch::default()
        };
        first.infer(Field::Headline);
        let mut second = DraftPatch {
            headline: Some("second".to_string()),
            clear_type_specific: true,
            ..DraftPatch::default()
        };
        second.infer(Field::Headline);

        let merged = first.merge(second);
        assert_eq!(merged.headline.as_deref(), Some("second"));
        assert_eq!(merged.terms.as_deref(), Some("terms"));
        assert!(merged.clear_type_specific);
        assert_eq!(merged.inferred, vec![Field::Headline]);
    }
}
