//! Shared value types for offer drafts

mod field;
mod merchant;
mod offer;

pub use field::{Field, Provenance, SectionId};
pub use merchant::{Merchant, MerchantSource};
pub use offer::{
    parse_amount, FileHandle, ImageSlot, ImageSource, OfferStatus, OfferType, RedemptionMethod,
    ResetPeriod, Tier,
};
