//! offer-wizard - draft state engine for the promotional offer creation wizard
//!
//! The engine is a set of pure functions over an [`draft::OfferDraft`] value
//! (section completeness, validation, auto-fill), plus the stateful pieces a
//! wizard host drives: [`session::OfferSession`] for mutations and navigation,
//! [`autosave`] for debounced persistence, and [`persistence`] for local
//! draft storage.

pub mod autosave;
pub mod config;
pub mod draft;
pub mod engine;
pub mod logging;
pub mod persistence;
pub mod session;
pub mod submission;
pub mod types;
pub mod wizard;

pub use draft::{DraftPatch, ExistingOffer, FieldEdit, ImageEdit, OfferDraft};
pub use session::{OfferSession, PublishOutcome};
