//! End-to-end draft lifecycle tests
//!
//! Drives [`OfferSession`] the way a wizard host would: field edits, step
//! navigation, clock ticks for autosave, and publish. Storage is either the
//! in-memory backend (to count writes) or a file store in a temp directory.

use std::time::{Duration, Instant};

use offer_wizard::autosave::AutosaveTick;
use offer_wizard::config::Config;
use offer_wizard::engine::{compute_errors, compute_sections_default};
use offer_wizard::persistence::{has_changed, serialize, snapshot, DraftStore, MemoryBackend};
use offer_wizard::submission::{StubSubmitter, SubmissionError};
use offer_wizard::types::{
    Field, Merchant, MerchantSource, OfferType, Provenance, RedemptionMethod, SectionId,
};
use offer_wizard::wizard::WizardStep;
use offer_wizard::{FieldEdit, OfferDraft, OfferSession, PublishOutcome};

use chrono::NaiveDate;
use tempfile::TempDir;
use uuid::Uuid;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn test_config() -> Config {
    let mut config = Config::default();
    config.autosave.debounce_secs = 30;
    config.publish.simulated_delay_ms = 1;
    config
}

fn luigis() -> Merchant {
    Merchant::existing("M001")
        .with_name("Luigi's")
        .with_categories(["restaurant"])
        .with_logo("https://cdn.example.com/luigis/logo.png")
}

/// Walk a session to the review step with every required field filled in
fn filled_session(store: DraftStore, t0: Instant) -> OfferSession {
    let mut session = OfferSession::new(&test_config(), store);
    session.on_field_change(FieldEdit::OfferType(OfferType::PercentOff), t0);
    session.advance(t0).unwrap();
    session.on_field_change(FieldEdit::Merchant(Some(luigis())), t0);
    session.advance(t0).unwrap();

    for edit in [
        FieldEdit::DiscountValue("20".to_string()),
        FieldEdit::StartDate(NaiveDate::from_ymd_opt(2026, 11, 1)),
        FieldEdit::RedemptionMethods(vec![RedemptionMethod::Online]),
        FieldEdit::RedemptionUrl("https://luigis.example.com/order".to_string()),
        FieldEdit::PromoCode("LUIGI20".to_string()),
    ] {
        session.on_field_change(edit, t0);
    }
    session.advance(t0).unwrap();
    assert_eq!(session.wizard().current(), WizardStep::Review);
    session
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn test_min_spend_scenario() {
    let mut draft = OfferDraft::with_type(OfferType::DollarOffWithMin);
    draft.set_field(FieldEdit::DiscountValue("10".to_string()));
    draft.set_field(FieldEdit::MinimumSpend("5".to_string()));
    assert!(!compute_sections_default(&draft).is_complete(SectionId::TypeDetail));

    draft.set_field(FieldEdit::MinimumSpend("20".to_string()));
    assert!(compute_sections_default(&draft).is_complete(SectionId::TypeDetail));
}

#[test]
fn test_merchant_step_scenario() {
    let t0 = Instant::now();
    let mut session = OfferSession::new(&test_config(), DraftStore::in_memory());
    session.on_field_change(FieldEdit::OfferType(OfferType::Bogo), t0);
    session.advance(t0).unwrap();

    assert!(!WizardStep::MerchantSelection.can_advance(session.draft()));
    assert!(session.advance(t0).is_err());

    let merchant = Merchant::existing("M001");
    assert_eq!(merchant.source, MerchantSource::Existing);
    session.on_field_change(FieldEdit::Merchant(Some(merchant)), t0);
    assert!(WizardStep::MerchantSelection.can_advance(session.draft()));
    assert_eq!(session.advance(t0), Ok(WizardStep::ContentEntry));
}

#[test]
fn test_idle_autosave_scenario() {
    let backend = MemoryBackend::new();
    let t0 = Instant::now();
    let mut session = OfferSession::new(&test_config(), DraftStore::new(backend.clone()));
    session.on_field_change(FieldEdit::OfferType(OfferType::Cashback), t0);
    session.advance(t0).unwrap();

    // Host ticks every second for two debounce windows with no edits
    let mut saves = 0;
    for second in 1..=60 {
        if let AutosaveTick::Saved(_) = session.tick(t0 + Duration::from_secs(second)) {
            saves += 1;
        }
    }
    assert_eq!(saves, 1);
    assert_eq!(backend.write_count(), 1);

    // A second idle window triggers nothing
    for second in 61..=120 {
        assert_eq!(
            session.tick(t0 + Duration::from_secs(second)),
            AutosaveTick::NotDue
        );
    }
    assert_eq!(backend.write_count(), 1);
}

#[test]
fn test_edits_keep_pushing_autosave_back() {
    let backend = MemoryBackend::new();
    let t0 = Instant::now();
    let mut session = OfferSession::new(&test_config(), DraftStore::new(backend.clone()));
    session.on_field_change(FieldEdit::OfferType(OfferType::DollarOff), t0);
    session.advance(t0).unwrap();

    for i in 1..=5u64 {
        let now = t0 + Duration::from_secs(20 * i);
        assert_eq!(session.tick(now), AutosaveTick::NotDue);
        session.on_field_change(FieldEdit::DiscountValue(i.to_string()), now);
    }
    assert_eq!(backend.write_count(), 0);

    let last_edit = t0 + Duration::from_secs(100);
    assert!(matches!(
        session.tick(last_edit + Duration::from_secs(30)),
        AutosaveTick::Saved(_)
    ));
    assert_eq!(backend.write_count(), 1);
}

#[tokio::test]
async fn test_publish_blocked_without_promo_code() {
    let backend = MemoryBackend::new();
    let t0 = Instant::now();
    let mut session = filled_session(DraftStore::new(backend.clone()), t0);
    session.on_field_change(FieldEdit::PromoCode(String::new()), t0);
    let id = session.save_draft(t0).unwrap();

    let report = compute_errors(session.draft(), true);
    assert!(!report.is_valid());
    assert_eq!(report.first_section_with_error, Some(SectionId::Redemption));

    let outcome = session
        .publish(&StubSubmitter::from_config(&test_config().publish))
        .await;

    match outcome {
        PublishOutcome::Invalid { section, message } => {
            assert_eq!(section, SectionId::Redemption);
            assert!(message.contains("Promo code"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(session.open_section(), Some(SectionId::Redemption));
    assert_eq!(session.wizard().current(), WizardStep::Review);
    assert!(session.store().load(id).is_some());
}

#[tokio::test]
async fn test_publish_success_deletes_stored_draft() {
    let t0 = Instant::now();
    let store = DraftStore::in_memory();
    let mut session = filled_session(store.clone(), t0);
    let id = session.save_draft(t0).unwrap();

    let outcome = session
        .publish(&StubSubmitter::from_config(&test_config().publish))
        .await;

    assert!(matches!(outcome, PublishOutcome::Published(_)));
    assert!(store.load(id).is_none());
}

#[tokio::test]
async fn test_failed_submission_keeps_draft_for_retry() {
    let t0 = Instant::now();
    let store = DraftStore::in_memory();
    let mut session = filled_session(store.clone(), t0);
    let id = session.save_draft(t0).unwrap();

    let submitter = StubSubmitter::new(Duration::from_millis(1))
        .failing(SubmissionError::Unavailable("timeout".to_string()));
    let outcome = session.publish(&submitter).await;

    assert_eq!(
        outcome,
        PublishOutcome::Failed {
            message: "submission service unavailable: timeout".to_string()
        }
    );
    assert!(store.load(id).is_some());
    assert_eq!(session.wizard().current(), WizardStep::Review);

    let retry = session
        .publish(&StubSubmitter::new(Duration::from_millis(1)))
        .await;
    assert!(matches!(retry, PublishOutcome::Published(_)));
}

// ─── Properties ──────────────────────────────────────────────────────────────

#[test]
fn test_round_trip_through_file_store() {
    let dir = TempDir::new().unwrap();
    let store = DraftStore::open(dir.path().join("drafts"));
    let id = Uuid::new_v4();

    let mut draft = OfferDraft::with_type(OfferType::Tiered);
    draft.set_field(FieldEdit::Merchant(Some(luigis())));
    draft.set_field(FieldEdit::Headline("Spend more, save more".to_string()));
    assert!(draft.draft_id.is_none());
    let completed = [WizardStep::TypeSelection, WizardStep::MerchantSelection];

    assert!(store.save(id, &draft, WizardStep::ContentEntry, &completed));
    let record = store.load(id).unwrap();

    assert_eq!(record.current_step, WizardStep::ContentEntry);
    assert_eq!(record.completed_steps, completed.to_vec());
    assert_eq!(record.form_data, serialize(&draft));
    assert_eq!(record.to_draft().draft_id, Some(id));
}

#[test]
fn test_snapshot_ignores_ids_and_transient_state() {
    let mut a = OfferDraft::with_type(OfferType::PercentOff);
    a.set_field(FieldEdit::Categories(vec!["b".to_string(), "a".to_string()]));
    let mut b = OfferDraft::with_type(OfferType::PercentOff);
    b.set_field(FieldEdit::Categories(vec!["a".to_string(), "b".to_string()]));
    b.draft_id = Some(Uuid::new_v4());
    b.touched.clear();

    assert_eq!(snapshot(&a), snapshot(&b));
    assert!(!has_changed(&b, Some(&snapshot(&a))));
}

#[test]
fn test_user_edits_survive_every_cascade() {
    let t0 = Instant::now();
    let mut session = OfferSession::new(&test_config(), DraftStore::in_memory());
    session.on_field_change(FieldEdit::OfferType(OfferType::PercentOff), t0);
    session.on_field_change(FieldEdit::Merchant(Some(luigis())), t0);
    assert_eq!(
        session.draft().provenance(Field::Description),
        Provenance::Inferred
    );

    session.on_field_change(FieldEdit::Description("Our words".to_string()), t0);
    session.on_field_change(FieldEdit::OfferType(OfferType::Bogo), t0);
    session.on_field_change(
        FieldEdit::Merchant(Some(Merchant::existing("M002").with_name("Bean There"))),
        t0,
    );

    assert_eq!(session.draft().description, "Our words");
    assert_eq!(session.draft().headline, "Buy one, get one at Bean There");
}

#[test]
fn test_resume_from_file_store_restores_wizard() {
    let dir = TempDir::new().unwrap();
    let store = DraftStore::open(dir.path());
    let t0 = Instant::now();

    let mut session = OfferSession::new(&test_config(), store.clone());
    session.on_field_change(FieldEdit::OfferType(OfferType::DollarOff), t0);
    session.advance(t0).unwrap();
    session.on_field_change(FieldEdit::Merchant(Some(luigis())), t0);
    let AutosaveTick::Saved(id) = session.tick(t0 + Duration::from_secs(30)) else {
        panic!("expected autosave");
    };

    let resumed = OfferSession::resume(&test_config(), store, id).unwrap();
    assert_eq!(resumed.wizard().current(), WizardStep::MerchantSelection);
    assert_eq!(resumed.draft().merchant.as_ref().map(|m| m.id.as_str()), Some("M001"));
    assert!(!resumed.has_unsaved_changes());
}
