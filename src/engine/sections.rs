//! Per-section completeness, derived purely from a draft

use serde::Serialize;

use crate::draft::OfferDraft;
use crate::types::{parse_amount, OfferType, RedemptionMethod, SectionId};

/// Publishing context the draft is being built for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishContext {
    /// Brand editions the offer can be published under
    pub brands: Vec<String>,
}

impl PublishContext {
    pub fn single_brand() -> Self {
        Self::default()
    }

    pub fn with_brands<I, S>(brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            brands: brands.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_multi_brand(&self) -> bool {
        self.brands.len() > 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionStatus {
    pub id: SectionId,
    pub complete: bool,
}

/// Result of [`compute_sections`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    pub sections: Vec<SectionStatus>,
    pub first_incomplete: Option<SectionId>,
    pub all_complete: bool,
}

impl SectionReport {
    pub fn is_complete(&self, id: SectionId) -> bool {
        self.sections
            .iter()
            .any(|s| s.id == id && s.complete)
    }

    pub fn completed_count(&self) -> usize {
        self.sections.iter().filter(|s| s.complete).count()
    }
}

/// Compute completeness for every section, in presentation order
pub fn compute_sections(draft: &OfferDraft, ctx: &PublishContext) -> SectionReport {
    let sections: Vec<SectionStatus> = SectionId::all()
        .iter()
        .map(|id| SectionStatus {
            id: *id,
            complete: is_section_complete(*id, draft, ctx),
        })
        .collect();

    let first_incomplete = sections.iter().find(|s| !s.complete).map(|s| s.id);

    SectionReport {
        all_complete: first_incomplete.is_none(),
        first_incomplete,
        sections,
    }
}

/// [`compute_sections`] for a single-brand publishing context
pub fn compute_sections_default(draft: &OfferDraft) -> SectionReport {
    compute_sections(draft, &PublishContext::single_brand())
}

pub fn is_section_complete(id: SectionId, draft: &OfferDraft, ctx: &PublishContext) -> bool {
    match id {
        SectionId::Merchant => merchant_complete(draft, ctx),
        SectionId::TypeDetail => type_detail_complete(draft),
        SectionId::Content => has_text(&draft.headline) && has_text(&draft.description),
        SectionId::Redemption => redemption_complete(draft),
        SectionId::Classification => !draft.categories.is_empty(),
        SectionId::Dates => draft.start_date.is_some(),
        SectionId::Terms => true,
    }
}

fn merchant_complete(draft: &OfferDraft, ctx: &PublishContext) -> bool {
    if draft.merchant.is_none() {
        return false;
    }
    !ctx.is_multi_brand() || draft.brand.as_deref().is_some_and(has_text)
}

/// Discount present plus the per-type extras
pub(crate) fn type_detail_complete(draft: &OfferDraft) -> bool {
    let Some(offer_type) = draft.offer_type else {
        return false;
    };

    if offer_type == OfferType::Tiered {
        return draft.tiers.iter().any(|t| t.is_positive());
    }

    if !has_text(&draft.discount_value) {
        return false;
    }

    match offer_type {
        OfferType::DollarOffWithMin => matches!(
            (parse_amount(&draft.discount_value), parse_amount(&draft.minimum_spend)),
            (Some(discount), Some(min)) if min > discount
        ),
        OfferType::Bogo => has_text(&draft.item_description),
        _ => true,
    }
}

fn redemption_complete(draft: &OfferDraft) -> bool {
    if draft.redemption_methods.contains(&RedemptionMethod::Online) {
        return has_text(&draft.redemption_url) && has_text(&draft.promo_code);
    }
    draft.redemption_methods.contains(&RedemptionMethod::InStore)
}

fn has_text(s: &str) -> bool {
    !s.trim().is_empty()
}
