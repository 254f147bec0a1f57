//! Field-level validation in two strictness modes
//!
//! Continuous mode only checks fields the user has touched, and only for
//! malformed values (numeric ranges, date ordering, formats). The
//! `validate_all` pass run before publish checks every field and also flags
//! required fields that are still empty. Errors are always returned as data.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::sections::PublishContext;
use crate::draft::OfferDraft;
use crate::types::{parse_amount, Field, OfferType, RedemptionMethod, SectionId};

pub const HEADLINE_MAX_CHARS: usize = 80;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

static PROMO_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,32}$").expect("promo code pattern is valid"));

/// Result of [`compute_errors`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: BTreeMap<Field, String>,
    pub first_section_with_error: Option<SectionId>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Errors belonging to one section, in field order
    pub fn errors_in(&self, section: SectionId) -> Vec<(Field, &str)> {
        self.errors
            .iter()
            .filter(|(f, _)| f.section() == section)
            .map(|(f, m)| (*f, m.as_str()))
            .collect()
    }
}

/// [`compute_errors_with`] for a single-brand publishing context
pub fn compute_errors(draft: &OfferDraft, validate_all: bool) -> ValidationReport {
    compute_errors_with(draft, validate_all, &PublishContext::single_brand())
}

pub fn compute_errors_with(
    draft: &OfferDraft,
    validate_all: bool,
    ctx: &PublishContext,
) -> ValidationReport {
    let mut checker = Checker {
        draft,
        validate_all,
        errors: BTreeMap::new(),
    };

    checker.check_formats();
    if validate_all {
        checker.check_required(ctx);
    }

    let errors = checker.errors;
    let first_section_with_error = SectionId::all()
        .iter()
        .copied()
        .find(|s| errors.keys().any(|f| f.section() == *s));

    ValidationReport {
        errors,
        first_section_with_error,
    }
}

struct Checker<'a> {
    draft: &'a OfferDraft,
    validate_all: bool,
    errors: BTreeMap<Field, String>,
}

impl Checker<'_> {
    fn active(&self, field: Field) -> bool {
        self.validate_all || self.draft.touched.contains(&field)
    }

    fn flag(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    fn check_formats(&mut self) {
        let draft = self.draft;

        if let Some(offer_type) = draft.offer_type {
            self.check_type_specific(offer_type);
        }

        if self.active(Field::EndDate) || self.active(Field::StartDate) {
            if let (Some(start), Some(end)) = (draft.start_date, draft.end_date) {
                if end < start {
                    self.flag(Field::EndDate, "End date must be on or after the start date");
                }
            }
        }

        if self.active(Field::UsesPerCustomer) && !draft.uses_per_customer.trim().is_empty() {
            match draft.uses_per_customer.trim().parse::<u32>() {
                Ok(n) if n > 0 => {}
                _ => self.flag(Field::UsesPerCustomer, "Enter a whole number of at least 1"),
            }
        }

        let url = draft.redemption_url.trim();
        if self.active(Field::RedemptionUrl) && !url.is_empty() && !is_web_url(url) {
            self.flag(Field::RedemptionUrl, "Enter a full http(s) link");
        }

        let code = draft.promo_code.trim();
        if self.active(Field::PromoCode) && !code.is_empty() && !PROMO_CODE.is_match(code) {
            self.flag(
                Field::PromoCode,
                "Use 3 to 32 letters, digits, dashes or underscores",
            );
        }

        if self.active(Field::Headline) && draft.headline.trim().chars().count() > HEADLINE_MAX_CHARS
        {
            self.flag(
                Field::Headline,
                format!("Keep the headline to at most {HEADLINE_MAX_CHARS} characters"),
            );
        }

        if self.active(Field::Description)
            && draft.description.trim().chars().count() > DESCRIPTION_MAX_CHARS
        {
            self.flag(
                Field::Description,
                format!("Keep the description to at most {DESCRIPTION_MAX_CHARS} characters"),
            );
        }
    }

    fn check_type_specific(&mut self, offer_type: OfferType) {
        let draft = self.draft;
        let upper = offer_type.discount_upper_bound();

        if offer_type != OfferType::Tiered
            && self.active(Field::DiscountValue)
            && !draft.discount_value.trim().is_empty()
        {
            match parse_amount(&draft.discount_value) {
                None => self.flag(Field::DiscountValue, "Enter a number"),
                Some(v) if v <= Decimal::ZERO || v > upper => {
                    self.flag(Field::DiscountValue, range_message(offer_type));
                }
                Some(_) => {}
            }
        }

        if offer_type == OfferType::DollarOffWithMin
            && self.active(Field::MinimumSpend)
            && !draft.minimum_spend.trim().is_empty()
        {
            match parse_amount(&draft.minimum_spend) {
                None => self.flag(Field::MinimumSpend, "Enter a number"),
                Some(min) if min <= Decimal::ZERO => {
                    self.flag(Field::MinimumSpend, "Minimum spend must be greater than 0");
                }
                Some(min) => {
                    if let Some(discount) = parse_amount(&draft.discount_value) {
                        if min <= discount {
                            self.flag(
                                Field::MinimumSpend,
                                "Minimum spend must be greater than the discount",
                            );
                        }
                    }
                }
            }
        }

        if offer_type == OfferType::Cashback
            && self.active(Field::CashbackCap)
            && !draft.cashback_cap.trim().is_empty()
        {
            match parse_amount(&draft.cashback_cap) {
                Some(cap) if cap > Decimal::ZERO => {}
                _ => self.flag(Field::CashbackCap, "Cash back cap must be a positive amount"),
            }
        }

        if offer_type == OfferType::Tiered && self.active(Field::Tiers) {
            if let Some(message) = tier_error(draft, upper) {
                self.flag(Field::Tiers, message);
            }
        }
    }

    fn check_required(&mut self, ctx: &PublishContext) {
        let draft = self.draft;
        let mut missing = |field: Field, message: &str| {
            if draft.is_field_empty(field) {
                self.errors
                    .entry(field)
                    .or_insert_with(|| message.to_string());
            }
        };

        missing(Field::OfferType, "Choose an offer type");
        missing(Field::Merchant, "Choose a merchant");
        if ctx.is_multi_brand() {
            missing(Field::Brand, "Choose a brand edition");
        }
        missing(Field::Headline, "Headline is required");
        missing(Field::Description, "Description is required");
        missing(Field::Categories, "Select at least one category");
        missing(Field::StartDate, "Start date is required");
        missing(Field::RedemptionMethods, "Choose how customers redeem the offer");

        match draft.offer_type {
            Some(OfferType::Tiered) => missing(Field::Tiers, "Add at least one tier"),
            Some(t) => {
                missing(Field::DiscountValue, "Discount value is required");
                if t == OfferType::DollarOffWithMin {
                    missing(Field::MinimumSpend, "Minimum spend is required");
                }
                if t == OfferType::Bogo {
                    missing(Field::ItemDescription, "Describe the item");
                }
            }
            None => {}
        }

        if draft.redemption_methods.contains(&RedemptionMethod::Online) {
            missing(Field::RedemptionUrl, "Redemption URL is required for online offers");
            missing(Field::PromoCode, "Promo code is required for online offers");
        }
    }
}

fn range_message(offer_type: OfferType) -> String {
    match offer_type {
        OfferType::PercentOff | OfferType::Bogo | OfferType::Cashback => {
            "Enter a percentage greater than 0 and at most 100".to_string()
        }
        _ => format!(
            "Enter an amount greater than 0 and at most {}",
            offer_type.discount_upper_bound()
        ),
    }
}

fn tier_error(draft: &OfferDraft, upper: Decimal) -> Option<String> {
    let mut previous_spend: Option<Decimal> = None;
    for (idx, tier) in draft.tiers.iter().enumerate() {
        let n = idx + 1;
        let (Some(spend), Some(discount)) = (parse_amount(&tier.spend), parse_amount(&tier.discount))
        else {
            return Some(format!("Tier {n}: enter a spend and a discount"));
        };
        if spend <= Decimal::ZERO || discount <= Decimal::ZERO {
            return Some(format!("Tier {n}: spend and discount must be greater than 0"));
        }
        if discount > upper {
            return Some(format!("Tier {n}: discount must be at most {upper}"));
        }
        if previous_spend.is_some_and(|prev| spend <= prev) {
            return Some(format!("Tier {n}: spend must be higher than the previous tier"));
        }
        previous_spend = Some(spend);
    }
    None
}

fn is_web_url(raw: &str) -> bool {
    url::Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}
