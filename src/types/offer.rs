//! Offer-level enums and small value types shared by the draft and the engines

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of promotion being built. Drives which type-specific fields apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    /// Percentage off the purchase
    PercentOff,
    /// Flat amount off the purchase
    DollarOff,
    /// Flat amount off once a minimum spend is reached
    DollarOffWithMin,
    /// Buy one item, get another discounted or free
    Bogo,
    /// Percentage returned as cash back, redeemed through a link
    Cashback,
    /// Spend/discount schedule with increasing thresholds
    Tiered,
}

impl OfferType {
    pub fn all() -> &'static [OfferType] {
        &[
            OfferType::PercentOff,
            OfferType::DollarOff,
            OfferType::DollarOffWithMin,
            OfferType::Bogo,
            OfferType::Cashback,
            OfferType::Tiered,
        ]
    }

    /// Stable key used in records and the CLI
    pub fn key(&self) -> &'static str {
        match self {
            OfferType::PercentOff => "percent_off",
            OfferType::DollarOff => "dollar_off",
            OfferType::DollarOffWithMin => "dollar_off_with_min",
            OfferType::Bogo => "bogo",
            OfferType::Cashback => "cashback",
            OfferType::Tiered => "tiered",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OfferType::PercentOff => "Percent off",
            OfferType::DollarOff => "Dollar off",
            OfferType::DollarOffWithMin => "Dollar off with minimum spend",
            OfferType::Bogo => "Buy one, get one",
            OfferType::Cashback => "Cash back",
            OfferType::Tiered => "Tiered spend",
        }
    }

    /// Types redeemed through an external link rather than at the counter
    pub fn is_url_based(&self) -> bool {
        matches!(self, OfferType::Cashback)
    }

    /// Inclusive upper bound for the discount value; the lower bound is always exclusive zero
    pub fn discount_upper_bound(&self) -> Decimal {
        match self {
            OfferType::PercentOff | OfferType::Bogo | OfferType::Cashback => Decimal::ONE_HUNDRED,
            OfferType::DollarOff | OfferType::DollarOffWithMin | OfferType::Tiered => {
                Decimal::from(10_000)
            }
        }
    }

    /// Redemption methods a fresh draft of this type starts with
    pub fn default_redemption_methods(&self) -> Vec<RedemptionMethod> {
        if self.is_url_based() {
            vec![RedemptionMethod::Online]
        } else {
            vec![RedemptionMethod::InStore]
        }
    }
}

impl fmt::Display for OfferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for OfferType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OfferType::all()
            .iter()
            .copied()
            .find(|t| t.key() == s)
            .ok_or_else(|| format!("unknown offer type: {s}"))
    }
}

/// How a customer claims the offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionMethod {
    InStore,
    Online,
}

/// How often the per-customer usage allowance resets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResetPeriod {
    #[default]
    Never,
    Daily,
    Weekly,
    Monthly,
}

/// Status of the offer a draft was hydrated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Draft,
    Scheduled,
    Active,
    Expired,
}

/// One row of a tiered spend/discount schedule, as entered
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tier {
    pub spend: String,
    pub discount: String,
}

impl Tier {
    pub fn new(spend: impl Into<String>, discount: impl Into<String>) -> Self {
        Self {
            spend: spend.into(),
            discount: discount.into(),
        }
    }

    /// Both amounts parse and are strictly positive
    pub fn is_positive(&self) -> bool {
        matches!(
            (parse_amount(&self.spend), parse_amount(&self.discount)),
            (Some(s), Some(d)) if s > Decimal::ZERO && d > Decimal::ZERO
        )
    }
}

/// Where an image slot's current value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    #[default]
    Absent,
    Merchant,
    Custom,
}

/// In-memory handle to an uploaded file. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Logo or banner slot on the offer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageSlot {
    #[serde(default)]
    pub source: ImageSource,
    /// Reference URL (merchant asset or uploaded asset location)
    #[serde(default)]
    pub url: Option<String>,
    /// Local preview reference kept so the slot renders after a reload
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(skip)]
    pub file: Option<FileHandle>,
}

impl ImageSlot {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn from_merchant(url: impl Into<String>) -> Self {
        Self {
            source: ImageSource::Merchant,
            url: Some(url.into()),
            preview_url: None,
            file: None,
        }
    }

    pub fn custom(file: FileHandle, preview_url: impl Into<String>) -> Self {
        Self {
            source: ImageSource::Custom,
            url: None,
            preview_url: Some(preview_url.into()),
            file: Some(file),
        }
    }

    pub fn is_custom(&self) -> bool {
        self.source == ImageSource::Custom
    }

    /// URL to render: custom preview first, then the reference URL
    pub fn effective_url(&self) -> Option<&str> {
        match self.source {
            ImageSource::Absent => None,
            ImageSource::Custom => self.preview_url.as_deref().or(self.url.as_deref()),
            ImageSource::Merchant => self.url.as_deref(),
        }
    }
}

/// Parse a user-entered amount. Accepts surrounding whitespace and a leading `$`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}
