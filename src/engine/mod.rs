//! Pure derivations over an [`OfferDraft`]
//!
//! Nothing in this module performs I/O or keeps state between calls. The
//! session layer feeds every user edit through [`apply_field_change`] and then
//! recomputes sections and errors from the resulting revision.

pub mod autofill;
pub mod inference;
pub mod sections;
pub mod validation;

pub use autofill::{on_merchant_selected, on_type_selected};
pub use sections::{
    compute_sections, compute_sections_default, is_section_complete, PublishContext,
    SectionReport, SectionStatus,
};
pub use validation::{compute_errors, compute_errors_with, ValidationReport};

use crate::draft::{FieldEdit, OfferDraft};
use crate::types::{Field, ImageSlot, ImageSource};

/// Reduce one user edit into the next draft revision.
///
/// Offer type and merchant selection run their auto-fill cascade; every other
/// edit is a plain [`OfferDraft::set_field`].
pub fn apply_field_change(draft: &OfferDraft, edit: FieldEdit) -> OfferDraft {
    let mut next = draft.clone();
    let field = edit.field();

    match edit {
        FieldEdit::OfferType(offer_type) => {
            next.apply(on_type_selected(draft, offer_type));
            next.touched.insert(field);
        }
        FieldEdit::Merchant(Some(merchant)) => {
            next.apply(on_merchant_selected(draft, &merchant));
            next.touched.insert(field);
        }
        FieldEdit::Merchant(None) => {
            detach_merchant(&mut next);
            next.touched.insert(field);
        }
        other => next.set_field(other),
    }

    tracing::trace!(field = ?field, "Field change reduced");
    next
}

/// Drop the merchant and any image slot it supplied
fn detach_merchant(draft: &mut OfferDraft) {
    draft.merchant = None;
    draft.clear_provenance(Field::Merchant);

    for (slot, field) in [
        (&mut draft.logo, Field::Logo),
        (&mut draft.banner, Field::Banner),
    ] {
        if slot.source == ImageSource::Merchant {
            *slot = ImageSlot::absent();
            draft.provenance.remove(&field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Merchant, OfferType, Provenance, SectionId};

    fn merchant() -> Merchant {
        Merchant::existing("M001")
            .with_name("Luigi's")
            .with_categories(["restaurant"])
            .with_logo("https://cdn.example.com/logo.png")
    }

    #[test]
    fn test_apply_field_change_leaves_input_untouched() {
        let draft = OfferDraft::new();
        let next = apply_field_change(&draft, FieldEdit::OfferType(OfferType::Bogo));
        assert_eq!(draft.offer_type, None);
        assert_eq!(next.offer_type, Some(OfferType::Bogo));
        assert!(next.touched.contains(&Field::OfferType));
    }

    #[test]
    fn test_merchant_edit_runs_autofill() {
        let draft = OfferDraft::with_type(OfferType::PercentOff);
        let next = apply_field_change(&draft, FieldEdit::Merchant(Some(merchant())));
        assert!(!next.headline.is_empty());
        assert_eq!(next.provenance(Field::Headline), Provenance::Inferred);
        assert_eq!(next.logo.source, ImageSource::Merchant);
    }

    #[test]
    fn test_user_edit_after_autofill_is_sticky() {
        let draft = OfferDraft::with_type(OfferType::PercentOff);
        let draft = apply_field_change(&draft, FieldEdit::Merchant(Some(merchant())));
        let draft = apply_field_change(&draft, FieldEdit::Headline("Mine".to_string()));
        let draft = apply_field_change(&draft, FieldEdit::OfferType(OfferType::DollarOff));
        let other = Merchant::existing("M002").with_name("Other");
        let draft = apply_field_change(&draft, FieldEdit::Merchant(Some(other)));
        assert_eq!(draft.headline, "Mine");
    }

    #[test]
    fn test_detaching_merchant_clears_inherited_images() {
        let draft = OfferDraft::with_type(OfferType::PercentOff);
        let draft = apply_field_change(&draft, FieldEdit::Merchant(Some(merchant())));
        let draft = apply_field_change(&draft, FieldEdit::Merchant(None));
        assert!(draft.merchant.is_none());
        assert_eq!(draft.logo.source, ImageSource::Absent);
        assert_eq!(
            compute_sections_default(&draft).first_incomplete,
            Some(SectionId::Merchant)
        );
    }

    #[test]
    fn test_scenario_dollar_off_with_min() {
        let draft = OfferDraft::new();
        let draft = apply_field_change(&draft, FieldEdit::OfferType(OfferType::DollarOffWithMin));
        let draft = apply_field_change(&draft, FieldEdit::DiscountValue("10".to_string()));
        let draft = apply_field_change(&draft, FieldEdit::MinimumSpend("5".to_string()));
        assert!(!compute_sections_default(&draft).is_complete(SectionId::TypeDetail));

        let draft = apply_field_change(&draft, FieldEdit::MinimumSpend("20".to_string()));
        assert!(compute_sections_default(&draft).is_complete(SectionId::TypeDetail));
    }
}
