//! Field and section identifiers, plus per-field provenance

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical groupings of draft fields, in the order the wizard presents them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Merchant,
    TypeDetail,
    Content,
    Redemption,
    Classification,
    Dates,
    Terms,
}

impl SectionId {
    pub fn all() -> &'static [SectionId] {
        &[
            SectionId::Merchant,
            SectionId::TypeDetail,
            SectionId::Content,
            SectionId::Redemption,
            SectionId::Classification,
            SectionId::Dates,
            SectionId::Terms,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            SectionId::Merchant => "merchant",
            SectionId::TypeDetail => "type_detail",
            SectionId::Content => "content",
            SectionId::Redemption => "redemption",
            SectionId::Classification => "classification",
            SectionId::Dates => "dates",
            SectionId::Terms => "terms",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Every editable field of an offer draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    OfferType,
    Merchant,
    Brand,
    Headline,
    Description,
    Terms,
    Categories,
    Commodities,
    DiscountValue,
    MinimumSpend,
    CashbackCap,
    Tiers,
    ItemDescription,
    RedemptionUrl,
    PromoCode,
    RedemptionMethods,
    StartDate,
    EndDate,
    UsesPerCustomer,
    ResetPeriod,
    Logo,
    Banner,
}

impl Field {
    /// Section owning this field; used to route validation errors
    pub fn section(&self) -> SectionId {
        match self {
            Field::Merchant | Field::Brand => SectionId::Merchant,
            Field::OfferType
            | Field::DiscountValue
            | Field::MinimumSpend
            | Field::CashbackCap
            | Field::Tiers
            | Field::ItemDescription => SectionId::TypeDetail,
            Field::Headline | Field::Description | Field::Logo | Field::Banner => {
                SectionId::Content
            }
            Field::RedemptionUrl | Field::PromoCode | Field::RedemptionMethods => {
                SectionId::Redemption
            }
            Field::Categories | Field::Commodities => SectionId::Classification,
            Field::StartDate | Field::EndDate => SectionId::Dates,
            Field::Terms | Field::UsesPerCustomer | Field::ResetPeriod => SectionId::Terms,
        }
    }

    /// Fields whose meaning depends on the offer type; cleared on every type switch
    pub fn type_specific() -> &'static [Field] {
        &[
            Field::DiscountValue,
            Field::MinimumSpend,
            Field::CashbackCap,
            Field::Tiers,
            Field::ItemDescription,
        ]
    }

    pub fn is_type_specific(&self) -> bool {
        Field::type_specific().contains(self)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::OfferType => "Offer type",
            Field::Merchant => "Merchant",
            Field::Brand => "Brand",
            Field::Headline => "Headline",
            Field::Description => "Description",
            Field::Terms => "Terms",
            Field::Categories => "Categories",
            Field::Commodities => "Commodities",
            Field::DiscountValue => "Discount value",
            Field::MinimumSpend => "Minimum spend",
            Field::CashbackCap => "Cash back cap",
            Field::Tiers => "Tiers",
            Field::ItemDescription => "Item description",
            Field::RedemptionUrl => "Redemption URL",
            Field::PromoCode => "Promo code",
            Field::RedemptionMethods => "Redemption method",
            Field::StartDate => "Start date",
            Field::EndDate => "End date",
            Field::UsesPerCustomer => "Uses per customer",
            Field::ResetPeriod => "Reset period",
            Field::Logo => "Logo",
            Field::Banner => "Banner",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who set a field's current value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Never written, or explicitly cleared
    #[default]
    Unset,
    /// Written by the auto-fill cascade; may be replaced by a later inference
    Inferred,
    /// Entered by the user; auto-fill never touches it
    UserSet,
}

impl Provenance {
    pub fn is_user_set(self) -> bool {
        self == Provenance::UserSet
    }
}
