//! Direct user edits to a draft

use chrono::NaiveDate;

use super::OfferDraft;
use crate::types::{
    Field, FileHandle, ImageSlot, Merchant, OfferType, Provenance, RedemptionMethod, ResetPeriod,
    Tier,
};

/// Change to an image slot
#[derive(Debug, Clone, PartialEq)]
pub enum ImageEdit {
    /// Custom upload; takes precedence over any merchant asset
    Upload { file: FileHandle, preview_url: String },
    /// Remove the custom upload and fall back to the merchant asset, if any
    Remove,
}

/// A single field-level change coming from the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    OfferType(OfferType),
    Merchant(Option<Merchant>),
    Brand(Option<String>),
    Headline(String),
    Description(String),
    Terms(String),
    Categories(Vec<String>),
    Commodities(Vec<String>),
    DiscountValue(String),
    MinimumSpend(String),
    CashbackCap(String),
    Tiers(Vec<Tier>),
    ItemDescription(String),
    RedemptionUrl(String),
    PromoCode(String),
    RedemptionMethods(Vec<RedemptionMethod>),
    StartDate(Option<NaiveDate>),
    EndDate(Option<NaiveDate>),
    UsesPerCustomer(String),
    ResetPeriod(ResetPeriod),
    Logo(ImageEdit),
    Banner(ImageEdit),
}

impl FieldEdit {
    pub fn field(&self) -> Field {
        match self {
            FieldEdit::OfferType(_) => Field::OfferType,
            FieldEdit::Merchant(_) => Field::Merchant,
            FieldEdit::Brand(_) => Field::Brand,
            FieldEdit::Headline(_) => Field::Headline,
            FieldEdit::Description(_) => Field::Description,
            FieldEdit::Terms(_) => Field::Terms,
            FieldEdit::Categories(_) => Field::Categories,
            FieldEdit::Commodities(_) => Field::Commodities,
            FieldEdit::DiscountValue(_) => Field::DiscountValue,
            FieldEdit::MinimumSpend(_) => Field::MinimumSpend,
            FieldEdit::CashbackCap(_) => Field::CashbackCap,
            FieldEdit::Tiers(_) => Field::Tiers,
            FieldEdit::ItemDescription(_) => Field::ItemDescription,
            FieldEdit::RedemptionUrl(_) => Field::RedemptionUrl,
            FieldEdit::PromoCode(_) => Field::PromoCode,
            FieldEdit::RedemptionMethods(_) => Field::RedemptionMethods,
            FieldEdit::StartDate(_) => Field::StartDate,
            FieldEdit::EndDate(_) => Field::EndDate,
            FieldEdit::UsesPerCustomer(_) => Field::UsesPerCustomer,
            FieldEdit::ResetPeriod(_) => Field::ResetPeriod,
            FieldEdit::Logo(_) => Field::Logo,
            FieldEdit::Banner(_) => Field::Banner,
        }
    }
}

impl OfferDraft {
    /// Write a user edit into the draft.
    ///
    /// The field is marked touched. A non-empty value becomes
    /// [`Provenance::UserSet`]; clearing a field resets it to
    /// [`Provenance::Unset`] so auto-fill may populate it again.
    ///
    /// Offer type and merchant are written verbatim here; the cascades that
    /// follow them live in [`crate::engine::apply_field_change`].
    pub fn set_field(&mut self, edit: FieldEdit) {
        let field = edit.field();
        match edit {
            FieldEdit::OfferType(t) => self.offer_type = Some(t),
            FieldEdit::Merchant(m) => self.merchant = m,
            FieldEdit::Brand(b) => self.brand = b,
            FieldEdit::Headline(v) => self.headline = v,
            FieldEdit::Description(v) => self.description = v,
            FieldEdit::Terms(v) => self.terms = v,
            FieldEdit::Categories(v) => self.categories = v.into_iter().collect(),
            FieldEdit::Commodities(v) => self.commodities = v.into_iter().collect(),
            FieldEdit::DiscountValue(v) => self.discount_value = v,
            FieldEdit::MinimumSpend(v) => self.minimum_spend = v,
            FieldEdit::CashbackCap(v) => self.cashback_cap = v,
            FieldEdit::Tiers(v) => self.tiers = v,
            FieldEdit::ItemDescription(v) => self.item_description = v,
            FieldEdit::RedemptionUrl(v) => self.redemption_url = v,
            FieldEdit::PromoCode(v) => self.promo_code = v,
            FieldEdit::RedemptionMethods(v) => self.redemption_methods = v.into_iter().collect(),
            FieldEdit::StartDate(v) => self.start_date = v,
            FieldEdit::EndDate(v) => self.end_date = v,
            FieldEdit::UsesPerCustomer(v) => self.uses_per_customer = v,
            FieldEdit::ResetPeriod(v) => self.reset_period = v,
            FieldEdit::Logo(e) => {
                let fallback = self.merchant.as_ref().and_then(|m| m.logo_url.clone());
                apply_image_edit(&mut self.logo, e, fallback);
            }
            FieldEdit::Banner(e) => {
                let fallback = self.merchant.as_ref().and_then(|m| m.banner_url.clone());
                apply_image_edit(&mut self.banner, e, fallback);
            }
        }

        self.touched.insert(field);
        if self.is_field_empty(field) {
            self.provenance.remove(&field);
        } else {
            self.provenance.insert(field, Provenance::UserSet);
        }
    }
}

fn apply_image_edit(slot: &mut ImageSlot, edit: ImageEdit, merchant_url: Option<String>) {
    *slot = match edit {
        ImageEdit::Upload { file, preview_url } => ImageSlot::custom(file, preview_url),
        ImageEdit::Remove => merchant_url.map_or_else(ImageSlot::absent, ImageSlot::from_merchant),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageSource;

    #[test]
    fn test_user_edit_marks_user_set_and_touched() {
        let mut draft = OfferDraft::new();
        draft
            .provenance
            .insert(Field::Headline, Provenance::Inferred);
        draft.set_field(FieldEdit::Headline("My own headline".to_string()));

        assert_eq!(draft.headline, "My own headline");
        assert_eq!(draft.provenance(Field::Headline), Provenance::UserSet);
        assert!(draft.touched.contains(&Field::Headline));
    }

    #[test]
    fn test_clearing_a_field_resets_provenance() {
        let mut draft = OfferDraft::new();
        draft.set_field(FieldEdit::Description("Something".to_string()));
        draft.set_field(FieldEdit::Description("   ".to_string()));
        assert_eq!(draft.provenance(Field::Description), Provenance::Unset);
        assert!(draft.can_autofill(Field::Description));
    }

    #[test]
    fn test_removing_custom_logo_falls_back_to_merchant() {
        let mut draft = OfferDraft::new();
        draft.merchant = Some(Merchant::existing("M001").with_logo("https://cdn.example.com/m.png"));
        draft.set_field(FieldEdit::Logo(ImageEdit::Upload {
            file: FileHandle {
                name: "mine.png".to_string(),
                mime_type: "image/png".to_string(),
                bytes: vec![7; 4],
            },
            preview_url: "blob:mine".to_string(),
        }));
        assert_eq!(draft.logo.source, ImageSource::Custom);

        draft.set_field(FieldEdit::Logo(ImageEdit::Remove));
        assert_eq!(draft.logo.source, ImageSource::Merchant);
        assert_eq!(
            draft.logo.effective_url(),
            Some("https://cdn.example.com/m.png")
        );
    }

    #[test]
    fn test_removing_banner_without_merchant_leaves_absent() {
        let mut draft = OfferDraft::new();
        draft.set_field(FieldEdit::Banner(ImageEdit::Remove));
        assert_eq!(draft.banner.source, ImageSource::Absent);
        assert_eq!(draft.provenance(Field::Banner), Provenance::Unset);
    }
}
