//! The in-progress offer record and its mutation primitives
//!
//! An [`OfferDraft`] is a plain value. Every mutation in the wizard produces a
//! new revision through [`OfferDraft::set_field`] (direct user edits) or
//! [`OfferDraft::apply`] (cascade patches), never through shared mutable state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::types::{
    Field, ImageSlot, Merchant, OfferStatus, OfferType, Provenance, RedemptionMethod, ResetPeriod,
    Tier,
};

mod edit;
mod patch;

pub use edit::{FieldEdit, ImageEdit};
pub use patch::DraftPatch;

/// Aggregate under construction by the wizard
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OfferDraft {
    #[serde(default)]
    pub offer_type: Option<OfferType>,
    #[serde(default)]
    pub merchant: Option<Merchant>,
    /// Brand edition tag, required only when the publishing context has several
    #[serde(default)]
    pub brand: Option<String>,

    // ─── Content ────────────────────────────────────────────────────────────
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub terms: String,

    // ─── Classification ─────────────────────────────────────────────────────
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub commodities: BTreeSet<String>,

    // ─── Type-specific ──────────────────────────────────────────────────────
    #[serde(default)]
    pub discount_value: String,
    #[serde(default)]
    pub minimum_spend: String,
    #[serde(default)]
    pub cashback_cap: String,
    #[serde(default)]
    pub tiers: Vec<Tier>,
    /// Short item description for buy-one-get-one offers
    #[serde(default)]
    pub item_description: String,

    // ─── Redemption ─────────────────────────────────────────────────────────
    #[serde(default)]
    pub redemption_url: String,
    #[serde(default)]
    pub promo_code: String,
    #[serde(default)]
    pub redemption_methods: BTreeSet<RedemptionMethod>,

    // ─── Dates & usage ──────────────────────────────────────────────────────
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub uses_per_customer: String,
    #[serde(default)]
    pub reset_period: ResetPeriod,

    // ─── Images ─────────────────────────────────────────────────────────────
    #[serde(default)]
    pub logo: ImageSlot,
    #[serde(default)]
    pub banner: ImageSlot,

    /// Who wrote each field. Missing entries mean [`Provenance::Unset`].
    #[serde(default)]
    pub provenance: BTreeMap<Field, Provenance>,

    // ─── Bookkeeping ────────────────────────────────────────────────────────
    /// Persistence key, assigned on first save and stable afterwards
    #[serde(default)]
    pub draft_id: Option<Uuid>,
    /// Id of the published offer being edited, if any
    #[serde(default)]
    pub edit_target_id: Option<String>,
    #[serde(default)]
    pub origin_status: Option<OfferStatus>,

    /// Fields the user has interacted with this session
    #[serde(skip)]
    pub touched: BTreeSet<Field>,
}

/// A published offer loaded for editing or cloning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingOffer {
    pub id: String,
    pub status: OfferStatus,
    #[serde(flatten)]
    pub fields: OfferDraft,
}

impl OfferDraft {
    /// Fresh draft with usage defaults populated
    pub fn new() -> Self {
        Self {
            uses_per_customer: "1".to_string(),
            reset_period: ResetPeriod::Never,
            ..Self::default()
        }
    }

    /// Fresh draft with the offer type preselected
    pub fn with_type(offer_type: OfferType) -> Self {
        let mut draft = Self::new();
        draft.offer_type = Some(offer_type);
        draft.redemption_methods = offer_type
            .default_redemption_methods()
            .into_iter()
            .collect();
        draft
            .provenance
            .insert(Field::OfferType, Provenance::UserSet);
        draft
            .provenance
            .insert(Field::RedemptionMethods, Provenance::Inferred);
        draft
    }

    /// Hydrate from a published offer for in-place editing
    pub fn for_edit(offer: ExistingOffer) -> Self {
        let mut draft = offer.fields;
        draft.edit_target_id = Some(offer.id);
        draft.origin_status = Some(offer.status);
        draft.draft_id = None;
        draft.touched.clear();
        draft.mark_populated_as_user_set();
        draft
    }

    /// Hydrate from a published offer as the basis of a brand-new one
    pub fn for_clone(offer: ExistingOffer) -> Self {
        let mut draft = offer.fields;
        draft.edit_target_id = None;
        draft.origin_status = None;
        draft.draft_id = None;
        draft.start_date = None;
        draft.end_date = None;
        draft.touched.clear();
        draft.mark_populated_as_user_set();
        draft
    }

    pub fn is_edit(&self) -> bool {
        self.edit_target_id.is_some()
    }

    pub fn provenance(&self, field: Field) -> Provenance {
        self.provenance.get(&field).copied().unwrap_or_default()
    }

    /// Drop a field's provenance so auto-fill may write it again
    pub fn clear_provenance(&mut self, field: Field) {
        self.provenance.remove(&field);
    }

    /// Auto-fill may write a field that is not user-set and is either empty or inferred
    pub fn can_autofill(&self, field: Field) -> bool {
        match self.provenance(field) {
            Provenance::UserSet => false,
            Provenance::Inferred => true,
            Provenance::Unset => self.is_field_empty(field),
        }
    }

    /// Whether a field currently holds no meaningful value
    pub fn is_field_empty(&self, field: Field) -> bool {
        match field {
            Field::OfferType => self.offer_type.is_none(),
            Field::Merchant => self.merchant.is_none(),
            Field::Brand => self.brand.as_deref().map_or(true, |b| b.trim().is_empty()),
            Field::Headline => self.headline.trim().is_empty(),
            Field::Description => self.description.trim().is_empty(),
            Field::Terms => self.terms.trim().is_empty(),
            Field::Categories => self.categories.is_empty(),
            Field::Commodities => self.commodities.is_empty(),
            Field::DiscountValue => self.discount_value.trim().is_empty(),
            Field::MinimumSpend => self.minimum_spend.trim().is_empty(),
            Field::CashbackCap => self.cashback_cap.trim().is_empty(),
            Field::Tiers => self.tiers.is_empty(),
            Field::ItemDescription => self.item_description.trim().is_empty(),
            Field::RedemptionUrl => self.redemption_url.trim().is_empty(),
            Field::PromoCode => self.promo_code.trim().is_empty(),
            Field::RedemptionMethods => self.redemption_methods.is_empty(),
            Field::StartDate => self.start_date.is_none(),
            Field::EndDate => self.end_date.is_none(),
            Field::UsesPerCustomer => self.uses_per_customer.trim().is_empty(),
            Field::ResetPeriod => false,
            Field::Logo => self.logo.effective_url().is_none(),
            Field::Banner => self.banner.effective_url().is_none(),
        }
    }

    /// Reset every type-specific field and its provenance
    pub fn clear_type_specific(&mut self) {
        self.discount_value.clear();
        self.minimum_spend.clear();
        self.cashback_cap.clear();
        self.tiers.clear();
        self.item_description.clear();
        for field in Field::type_specific() {
            self.provenance.remove(field);
            self.touched.remove(field);
        }
    }

    fn mark_populated_as_user_set(&mut self) {
        self.provenance.clear();
        let populated: Vec<Field> = ALL_FIELDS
            .iter()
            .copied()
            .filter(|f| !self.is_field_empty(*f))
            .collect();
        for field in populated {
            self.provenance.insert(field, Provenance::UserSet);
        }
    }
}

const ALL_FIELDS: &[Field] = &[
    Field::OfferType,
    Field::Merchant,
    Field::Brand,
    Field::Headline,
    Field::Description,
    Field::Terms,
    Field::Categories,
    Field::Commodities,
    Field::DiscountValue,
    Field::MinimumSpend,
    Field::CashbackCap,
    Field::Tiers,
    Field::ItemDescription,
    Field::RedemptionUrl,
    Field::PromoCode,
    Field::RedemptionMethods,
    Field::StartDate,
    Field::EndDate,
    Field::UsesPerCustomer,
    Field::Logo,
    Field::Banner,
];
