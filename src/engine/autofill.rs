//! Auto-fill cascade for merchant and offer-type selection
//!
//! Both entry points are pure: they read the current draft and return a
//! [`DraftPatch`]. A field is only written when [`OfferDraft::can_autofill`]
//! allows it, so user-set values are never replaced.

use crate::draft::{DraftPatch, OfferDraft};
use crate::types::{Field, ImageSlot, Merchant, OfferType};

use super::inference;

/// Patch for attaching `merchant` to the draft
pub fn on_merchant_selected(draft: &OfferDraft, merchant: &Merchant) -> DraftPatch {
    let mut patch = DraftPatch {
        merchant: Some(merchant.clone()),
        ..DraftPatch::default()
    };

    if draft.is_field_empty(Field::Terms) {
        patch.terms = Some(inference::infer_terms(merchant));
        patch.infer(Field::Terms);
    }

    if draft.is_field_empty(Field::Categories) {
        patch.categories = Some(inference::infer_categories(merchant));
        patch.infer(Field::Categories);
    }

    if draft.is_field_empty(Field::Commodities) {
        let commodities = inference::infer_commodities(merchant);
        if !commodities.is_empty() {
            patch.commodities = Some(commodities);
            patch.infer(Field::Commodities);
        }
    }

    infer_copy(&mut patch, draft, draft.offer_type, merchant);

    if !draft.logo.is_custom() {
        patch.logo = Some(merchant_slot(merchant.logo_url.as_deref()));
        patch.infer(Field::Logo);
    }
    if !draft.banner.is_custom() {
        patch.banner = Some(merchant_slot(merchant.banner_url.as_deref()));
        patch.infer(Field::Banner);
    }

    tracing::debug!(
        merchant_id = %merchant.id,
        inferred = ?patch.inferred,
        "Merchant auto-fill computed"
    );
    patch
}

/// Patch for switching the draft to `offer_type`.
///
/// Selecting the type the draft already has is a no-op.
pub fn on_type_selected(draft: &OfferDraft, offer_type: OfferType) -> DraftPatch {
    if draft.offer_type == Some(offer_type) {
        return DraftPatch::default();
    }

    let mut patch = DraftPatch {
        offer_type: Some(offer_type),
        clear_type_specific: true,
        ..DraftPatch::default()
    };

    if draft.can_autofill(Field::RedemptionMethods) {
        patch.redemption_methods = Some(
            offer_type
                .default_redemption_methods()
                .into_iter()
                .collect(),
        );
        patch.infer(Field::RedemptionMethods);
    }

    if let Some(merchant) = &draft.merchant {
        infer_copy(&mut patch, draft, Some(offer_type), merchant);
    }

    tracing::debug!(
        from = ?draft.offer_type,
        to = %offer_type,
        "Offer type switch computed"
    );
    patch
}

fn infer_copy(
    patch: &mut DraftPatch,
    draft: &OfferDraft,
    offer_type: Option<OfferType>,
    merchant: &Merchant,
) {
    if draft.can_autofill(Field::Headline) {
        patch.headline = Some(inference::infer_headline(offer_type, merchant));
        patch.infer(Field::Headline);
    }
    if draft.can_autofill(Field::Description) {
        patch.description = Some(inference::infer_description(offer_type, merchant));
        patch.infer(Field::Description);
    }
}

fn merchant_slot(url: Option<&str>) -> ImageSlot {
    match url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(u) => ImageSlot::from_merchant(u),
        None => ImageSlot::absent(),
    }
}
