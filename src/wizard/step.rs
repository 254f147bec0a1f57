//! Wizard steps and their advance predicates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::draft::OfferDraft;
use crate::engine::sections::type_detail_complete;

/// Ordered wizard steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    #[serde(rename = "type")]
    TypeSelection,
    #[serde(rename = "merchant")]
    MerchantSelection,
    #[serde(rename = "offer")]
    ContentEntry,
    Review,
}

impl WizardStep {
    pub fn all() -> &'static [WizardStep] {
        &[
            WizardStep::TypeSelection,
            WizardStep::MerchantSelection,
            WizardStep::ContentEntry,
            WizardStep::Review,
        ]
    }

    pub fn first() -> Self {
        WizardStep::TypeSelection
    }

    pub fn index(&self) -> usize {
        match self {
            WizardStep::TypeSelection => 0,
            WizardStep::MerchantSelection => 1,
            WizardStep::ContentEntry => 2,
            WizardStep::Review => 3,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::all().get(self.index() + 1).copied()
    }

    pub fn prev(&self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::all()[i])
    }

    /// Persisted key
    pub fn key(&self) -> &'static str {
        match self {
            WizardStep::TypeSelection => "type",
            WizardStep::MerchantSelection => "merchant",
            WizardStep::ContentEntry => "offer",
            WizardStep::Review => "review",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::TypeSelection => "Offer type",
            WizardStep::MerchantSelection => "Merchant",
            WizardStep::ContentEntry => "Offer details",
            WizardStep::Review => "Review & publish",
        }
    }

    /// Whether the draft satisfies this step well enough to move past it
    pub fn can_advance(&self, draft: &OfferDraft) -> bool {
        match self {
            WizardStep::TypeSelection => draft.offer_type.is_some(),
            WizardStep::MerchantSelection => draft.merchant.is_some(),
            WizardStep::ContentEntry => content_ready(draft),
            WizardStep::Review => true,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

impl FromStr for WizardStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|step| step.key() == s)
            .ok_or_else(|| format!("unknown wizard step '{s}'"))
    }
}

fn content_ready(draft: &OfferDraft) -> bool {
    let filled = |s: &str| !s.trim().is_empty();

    if !(filled(&draft.headline)
        && filled(&draft.description)
        && draft.start_date.is_some()
        && filled(&draft.redemption_url)
        && filled(&draft.promo_code))
    {
        return false;
    }

    type_detail_complete(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Merchant, OfferType, Tier};
    use chrono::NaiveDate;

    fn content_draft(offer_type: OfferType) -> OfferDraft {
        let mut draft = OfferDraft::with_type(offer_type);
        draft.headline = "Half off pastries".to_string();
        draft.description = "Every pastry, every morning".to_string();
        draft.start_date = NaiveDate::from_ymd_opt(2026, 12, 1);
        draft.redemption_url = "https://bakery.example.com".to_string();
        draft.promo_code = "PASTRY50".to_string();
        draft
    }

    #[test]
    fn test_step_keys_round_trip() {
        for step in WizardStep::all() {
            assert_eq!(step.key().parse::<WizardStep>(), Ok(*step));
            let json = serde_json::to_string(step).unwrap();
            assert_eq!(json, format!("\"{}\"", step.key()));
        }
        assert!("payment".parse::<WizardStep>().is_err());
    }

    #[test]
    fn test_next_and_prev() {
        assert_eq!(
            WizardStep::TypeSelection.next(),
            Some(WizardStep::MerchantSelection)
        );
        assert_eq!(WizardStep::Review.next(), None);
        assert_eq!(WizardStep::TypeSelection.prev(), None);
        assert_eq!(
            WizardStep::Review.prev(),
            Some(WizardStep::ContentEntry)
        );
    }

    #[test]
    fn test_merchant_step_needs_merchant() {
        let mut draft = OfferDraft::with_type(OfferType::PercentOff);
        assert!(!WizardStep::MerchantSelection.can_advance(&draft));
        draft.merchant = Some(Merchant::existing("M001"));
        assert!(WizardStep::MerchantSelection.can_advance(&draft));
    }

    #[test]
    fn test_content_step_requires_code_and_link() {
        let mut draft = content_draft(OfferType::PercentOff);
        draft.discount_value = "50".to_string();
        assert!(WizardStep::ContentEntry.can_advance(&draft));

        draft.promo_code.clear();
        assert!(!WizardStep::ContentEntry.can_advance(&draft));
    }

    #[test]
    fn test_content_step_needs_a_positive_tier() {
        let mut draft = content_draft(OfferType::Tiered);
        assert!(!WizardStep::ContentEntry.can_advance(&draft));

        draft.tiers = vec![Tier::new("", "")];
        assert!(!WizardStep::ContentEntry.can_advance(&draft));

        draft.tiers.push(Tier::new("50", "5"));
        assert!(WizardStep::ContentEntry.can_advance(&draft));
    }
}
