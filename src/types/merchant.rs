//! Merchant records supplied by the merchant-lookup collaborator

use serde::{Deserialize, Serialize};

/// Whether the merchant already exists upstream or is being created with the offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantSource {
    Existing,
    New,
}

/// Structured merchant record, consumed read-only by the auto-fill cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub source: MerchantSource,
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Merchant categories as reported by lookup (e.g., "restaurant", "grocery")
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
}

impl Merchant {
    /// Reference to an existing merchant with no lookup details yet
    pub fn existing(id: impl Into<String>) -> Self {
        Self {
            source: MerchantSource::Existing,
            id: id.into(),
            name: String::new(),
            categories: Vec::new(),
            logo_url: None,
            banner_url: None,
            address: None,
            rating: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_logo(mut self, url: impl Into<String>) -> Self {
        self.logo_url = Some(url.into());
        self
    }

    pub fn with_banner(mut self, url: impl Into<String>) -> Self {
        self.banner_url = Some(url.into());
        self
    }

    /// First reported category, lowercased, used as the primary inference key
    pub fn primary_category(&self) -> Option<String> {
        self.categories
            .iter()
            .map(|c| c.trim().to_lowercase())
            .find(|c| !c.is_empty())
    }

    /// Display name, falling back to the id when lookup returned no name
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            self.name.trim()
        }
    }
}
