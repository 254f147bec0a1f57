//! Suggested content derived from merchant context
//!
//! Category profiles map merchant lookup categories onto offer categories,
//! commodities, default terms and a phrase used in generated copy. Headline
//! and description copy is rendered with handlebars templates keyed by offer
//! type.

use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde_json::json;
use std::collections::{BTreeSet, HashMap};

use crate::types::{Merchant, OfferType};

/// What a merchant category implies for an offer
#[derive(Debug, Clone, Copy)]
pub struct CategoryProfile {
    pub offer_categories: &'static [&'static str],
    pub commodities: &'static [&'static str],
    pub terms: &'static str,
    /// Noun phrase for generated copy ("dining", "groceries")
    pub phrase: &'static str,
}

const GENERIC_TERMS: &str = "Offer valid while supplies last. Cannot be combined with other \
offers. Not redeemable for cash. Merchant reserves the right to modify or end this offer at any time.";

const GENERIC_PROFILE: CategoryProfile = CategoryProfile {
    offer_categories: &["shopping"],
    commodities: &[],
    terms: GENERIC_TERMS,
    phrase: "your next purchase",
};

static PROFILES: Lazy<HashMap<&'static str, CategoryProfile>> = Lazy::new(|| {
    let dining = CategoryProfile {
        offer_categories: &["dining"],
        commodities: &["food_beverage"],
        terms: "Valid for dine-in and takeout. Excludes alcohol, tax and gratuity. \
One offer per table per visit. Not valid with other promotions.",
        phrase: "dining",
    };
    let grocery = CategoryProfile {
        offer_categories: &["grocery"],
        commodities: &["food_beverage", "household"],
        terms: "Excludes alcohol, tobacco, lottery, gift cards and prescriptions. \
Limit one per household per transaction.",
        phrase: "groceries",
    };
    let retail = CategoryProfile {
        offer_categories: &["shopping"],
        commodities: &["general_merchandise"],
        terms: "Excludes gift cards, clearance items and prior purchases. \
Cannot be combined with other discounts.",
        phrase: "your next purchase",
    };
    let apparel = CategoryProfile {
        offer_categories: &["shopping", "fashion"],
        commodities: &["apparel"],
        terms: "Excludes gift cards and sale merchandise. Returns refunded at the discounted price.",
        phrase: "clothing and accessories",
    };
    let travel = CategoryProfile {
        offer_categories: &["travel"],
        commodities: &["travel_services"],
        terms: "Subject to availability. Blackout dates may apply. \
Taxes and fees not included. Must be booked through the provided link.",
        phrase: "travel bookings",
    };
    let entertainment = CategoryProfile {
        offer_categories: &["entertainment"],
        commodities: &["tickets"],
        terms: "Subject to availability. Not valid on premium or special events.",
        phrase: "tickets and experiences",
    };
    let wellness = CategoryProfile {
        offer_categories: &["health_wellness"],
        commodities: &["personal_services"],
        terms: "New and returning customers. Appointment required. \
24-hour cancellation policy applies.",
        phrase: "services",
    };
    let electronics = CategoryProfile {
        offer_categories: &["shopping", "electronics"],
        commodities: &["electronics"],
        terms: "Excludes gift cards, open-box items and extended warranties. \
While supplies last.",
        phrase: "electronics",
    };
    let automotive = CategoryProfile {
        offer_categories: &["automotive"],
        commodities: &["fuel", "auto_services"],
        terms: "Valid on services only. Parts and fluids extra unless stated. \
Not valid on prior services.",
        phrase: "auto services",
    };

    let mut map = HashMap::new();
    for key in ["restaurant", "cafe", "bar", "bakery", "fast_food"] {
        map.insert(key, dining);
    }
    for key in ["grocery", "supermarket", "convenience"] {
        map.insert(key, grocery);
    }
    for key in ["retail", "department_store", "home_goods"] {
        map.insert(key, retail);
    }
    for key in ["apparel", "clothing", "shoes"] {
        map.insert(key, apparel);
    }
    for key in ["travel", "hotel", "airline", "car_rental"] {
        map.insert(key, travel);
    }
    for key in ["entertainment", "cinema", "theater", "events"] {
        map.insert(key, entertainment);
    }
    for key in ["fitness", "gym", "spa", "salon", "beauty"] {
        map.insert(key, wellness);
    }
    for key in ["electronics", "computers"] {
        map.insert(key, electronics);
    }
    for key in ["automotive", "gas_station", "car_wash"] {
        map.insert(key, automotive);
    }
    map
});

fn normalize(category: &str) -> String {
    category.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Profiles for every recognised merchant category, in merchant order
fn matched_profiles(merchant: &Merchant) -> Vec<&'static CategoryProfile> {
    merchant
        .categories
        .iter()
        .filter_map(|c| PROFILES.get(normalize(c).as_str()))
        .collect()
}

/// Profile of the first recognised merchant category, or the generic profile
pub fn profile_for(merchant: &Merchant) -> &'static CategoryProfile {
    matched_profiles(merchant)
        .into_iter()
        .next()
        .unwrap_or(&GENERIC_PROFILE)
}

pub fn infer_terms(merchant: &Merchant) -> String {
    profile_for(merchant).terms.to_string()
}

/// Union of offer categories implied by all merchant categories
pub fn infer_categories(merchant: &Merchant) -> BTreeSet<String> {
    let profiles = matched_profiles(merchant);
    if profiles.is_empty() {
        return GENERIC_PROFILE
            .offer_categories
            .iter()
            .map(|c| (*c).to_string())
            .collect();
    }
    profiles
        .iter()
        .flat_map(|p| p.offer_categories.iter())
        .map(|c| (*c).to_string())
        .collect()
}

pub fn infer_commodities(merchant: &Merchant) -> BTreeSet<String> {
    matched_profiles(merchant)
        .iter()
        .flat_map(|p| p.commodities.iter())
        .map(|c| (*c).to_string())
        .collect()
}

// ─── Copy templates ─────────────────────────────────────────────────────────

const HEADLINE_TEMPLATE: &str = "{{lead}} at {{merchant}}";
const DESCRIPTION_TEMPLATE: &str =
    "Enjoy {{savings}} on {{phrase}} at {{merchant}}{{#if address}}, {{address}}{{/if}}.";

static COPY: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut hb = Handlebars::new();
    // Plain text copy; apostrophes in merchant names must survive
    hb.register_escape_fn(handlebars::no_escape);
    hb.set_strict_mode(false);
    if let Err(e) = hb.register_template_string("headline", HEADLINE_TEMPLATE) {
        tracing::warn!(error = %e, "Failed to register headline template");
    }
    if let Err(e) = hb.register_template_string("description", DESCRIPTION_TEMPLATE) {
        tracing::warn!(error = %e, "Failed to register description template");
    }
    hb
});

fn headline_lead(offer_type: Option<OfferType>) -> &'static str {
    match offer_type {
        Some(OfferType::PercentOff) => "Percent off",
        Some(OfferType::DollarOff) => "Instant savings",
        Some(OfferType::DollarOffWithMin) => "Spend more, save more",
        Some(OfferType::Bogo) => "Buy one, get one",
        Some(OfferType::Cashback) => "Cash back",
        Some(OfferType::Tiered) => "Tiered savings",
        None => "Special offer",
    }
}

fn savings_phrase(offer_type: Option<OfferType>) -> &'static str {
    match offer_type {
        Some(OfferType::PercentOff) => "a percentage off",
        Some(OfferType::DollarOff) => "money off",
        Some(OfferType::DollarOffWithMin) => "money off when you reach the minimum spend",
        Some(OfferType::Bogo) => "a second item on us",
        Some(OfferType::Cashback) => "cash back",
        Some(OfferType::Tiered) => "bigger savings the more you spend",
        None => "exclusive savings",
    }
}

pub fn infer_headline(offer_type: Option<OfferType>, merchant: &Merchant) -> String {
    let data = json!({
        "lead": headline_lead(offer_type),
        "merchant": merchant.display_name(),
    });
    COPY.render("headline", &data).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Headline template failed, using plain copy");
        format!("{} at {}", headline_lead(offer_type), merchant.display_name())
    })
}

pub fn infer_description(offer_type: Option<OfferType>, merchant: &Merchant) -> String {
    let data = json!({
        "savings": savings_phrase(offer_type),
        "phrase": profile_for(merchant).phrase,
        "merchant": merchant.display_name(),
        "address": merchant.address.as_deref().map(str::trim).filter(|a| !a.is_empty()),
    });
    COPY.render("description", &data).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Description template failed, using plain copy");
        format!(
            "Enjoy {} on {} at {}.",
            savings_phrase(offer_type),
            profile_for(merchant).phrase,
            merchant.display_name()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luigis() -> Merchant {
        Merchant::existing("M001")
            .with_name("Luigi's Trattoria")
            .with_categories(["Restaurant", "Bar"])
    }

    #[test]
    fn test_restaurant_profile() {
        let merchant = luigis();
        assert_eq!(profile_for(&merchant).phrase, "dining");
        assert!(infer_terms(&merchant).contains("gratuity"));
        assert_eq!(
            infer_categories(&merchant),
            ["dining".to_string()].into_iter().collect()
        );
        assert!(infer_commodities(&merchant).contains("food_beverage"));
    }

    #[test]
    fn test_unknown_category_uses_generic_profile() {
        let merchant = Merchant::existing("M009").with_categories(["Quantum widgets"]);
        assert_eq!(infer_terms(&merchant), GENERIC_TERMS);
        assert!(infer_categories(&merchant).contains("shopping"));
        assert!(infer_commodities(&merchant).is_empty());
    }

    #[test]
    fn test_categories_union_across_merchant_categories() {
        let merchant = Merchant::existing("M010").with_categories(["grocery", "gas station"]);
        let categories = infer_categories(&merchant);
        assert!(categories.contains("grocery"));
        assert!(categories.contains("automotive"));
    }

    #[test]
    fn test_headline_keeps_apostrophes() {
        let headline = infer_headline(Some(OfferType::Bogo), &luigis());
        assert_eq!(headline, "Buy one, get one at Luigi's Trattoria");
    }

    #[test]
    fn test_description_includes_address_when_known() {
        let mut merchant = luigis();
        assert_eq!(
            infer_description(Some(OfferType::PercentOff), &merchant),
            "Enjoy a percentage off on dining at Luigi's Trattoria."
        );

        merchant.address = Some("12 Main St".to_string());
        assert_eq!(
            infer_description(None, &merchant),
            "Enjoy exclusive savings on dining at Luigi's Trattoria, 12 Main St."
        );
    }
}
