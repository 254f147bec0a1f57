//! One wizard session over a single offer draft
//!
//! [`OfferSession`] is the only place a draft changes. Every user edit goes
//! through [`OfferSession::on_field_change`], which reduces it into a new
//! revision, recomputes sections and errors, decides where the host should
//! navigate, and reschedules autosave.

use std::collections::VecDeque;
use std::time::Instant;
use uuid::Uuid;

use crate::autosave::{
    AutosaveScheduler, AutosaveTick, ExitChoice, ExitPrompt, ExitResolution, SaveIndicator,
    SavePoint,
};
use crate::config::Config;
use crate::draft::{ExistingOffer, FieldEdit, OfferDraft};
use crate::engine::{
    apply_field_change, compute_errors_with, compute_sections, PublishContext, SectionReport,
    ValidationReport,
};
use crate::persistence::DraftStore;
use crate::submission::{payload, SubmissionReceipt, Submitter};
use crate::types::SectionId;
use crate::wizard::{SectionNavigator, WizardError, WizardMode, WizardState, WizardStep};

/// Result of [`OfferSession::publish`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Submitted; the stored draft has been deleted
    Published(SubmissionReceipt),
    /// Full validation failed; `section` has been reopened
    Invalid { section: SectionId, message: String },
    /// The submission call failed; the draft is kept for a retry
    Failed { message: String },
}

#[derive(Debug)]
pub struct OfferSession {
    draft: OfferDraft,
    history: VecDeque<OfferDraft>,
    history_limit: usize,
    wizard: WizardState,
    navigator: SectionNavigator,
    autosave: AutosaveScheduler,
    store: DraftStore,
    ctx: PublishContext,
    sections: SectionReport,
    errors: ValidationReport,
    /// Set by the first publish attempt; errors then include empty required fields
    show_all_errors: bool,
}

impl OfferSession {
    /// Fresh creation session at the type step
    pub fn new(config: &Config, store: DraftStore) -> Self {
        Self::build(config, store, OfferDraft::new(), WizardState::create())
    }

    /// Resume a stored draft. The loaded draft counts as saved.
    pub fn resume(config: &Config, store: DraftStore, id: Uuid) -> Option<Self> {
        let record = store.load(id)?;
        let draft = record.to_draft();
        let mode = if draft.is_edit() {
            WizardMode::Edit
        } else {
            WizardMode::Create
        };
        let wizard = WizardState::resume(mode, record.current_step, &record.completed_steps);

        let mut session = Self::build(config, store, draft, wizard);
        session.autosave.seed_baseline(&session.draft);
        tracing::info!(
            draft_id = %id,
            step = %record.current_step,
            "Resumed draft"
        );
        Some(session)
    }

    /// Edit a published offer in place
    pub fn edit(config: &Config, store: DraftStore, offer: ExistingOffer) -> Self {
        let target = offer.id.clone();
        let draft = OfferDraft::for_edit(offer);
        let mut session = Self::build(config, store, draft, WizardState::edit());
        session.autosave.seed_baseline(&session.draft);
        tracing::info!(offer_id = %target, "Editing published offer");
        session
    }

    /// Start a new offer from a published one
    pub fn clone_offer(config: &Config, store: DraftStore, offer: ExistingOffer) -> Self {
        let source = offer.id.clone();
        let draft = OfferDraft::for_clone(offer);
        tracing::info!(source_offer_id = %source, "Cloning published offer");
        Self::build(config, store, draft, WizardState::create())
    }

    fn build(config: &Config, store: DraftStore, draft: OfferDraft, wizard: WizardState) -> Self {
        let ctx = PublishContext::with_brands(config.publishing.brands.iter().cloned());
        let mut session = Self {
            sections: compute_sections(&draft, &ctx),
            errors: ValidationReport::default(),
            draft,
            history: VecDeque::new(),
            history_limit: config.wizard.history_limit,
            wizard,
            navigator: SectionNavigator::new(),
            autosave: AutosaveScheduler::new(&config.autosave),
            store,
            ctx,
            show_all_errors: false,
        };
        session.refresh();
        session
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn draft(&self) -> &OfferDraft {
        &self.draft
    }

    pub fn sections(&self) -> &SectionReport {
        &self.sections
    }

    pub fn errors(&self) -> &ValidationReport {
        &self.errors
    }

    pub fn wizard(&self) -> &WizardState {
        &self.wizard
    }

    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    pub fn open_section(&self) -> Option<SectionId> {
        self.navigator.open_section()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn save_indicator(&mut self, now: Instant) -> SaveIndicator {
        self.autosave.indicator(now)
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    // ─── Mutation ───────────────────────────────────────────────────────────

    /// Apply one user edit. Returns a section the host should open, if any.
    pub fn on_field_change(&mut self, edit: FieldEdit, now: Instant) -> Option<SectionId> {
        let next = apply_field_change(&self.draft, edit);
        if next == self.draft {
            return None;
        }

        let previous = std::mem::replace(&mut self.draft, next);
        self.history.push_back(previous);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }

        self.after_mutation(now)
    }

    /// Restore the previous revision
    pub fn undo(&mut self, now: Instant) -> Option<SectionId> {
        let previous = self.history.pop_back()?;
        // Ids are bookkeeping, not content; keep the one already assigned
        let draft_id = self.draft.draft_id;
        self.draft = previous;
        self.draft.draft_id = draft_id.or(self.draft.draft_id);
        tracing::debug!(remaining = self.history.len(), "Undid last change");
        self.after_mutation(now)
    }

    fn after_mutation(&mut self, now: Instant) -> Option<SectionId> {
        let open = self.refresh();
        self.schedule_autosave(now);
        open
    }

    fn refresh(&mut self) -> Option<SectionId> {
        self.sections = compute_sections(&self.draft, &self.ctx);
        self.errors = compute_errors_with(&self.draft, self.show_all_errors, &self.ctx);
        self.navigator.observe(&self.sections)
    }

    fn schedule_autosave(&mut self, now: Instant) {
        let eligible = AutosaveScheduler::is_eligible(self.wizard.current(), &self.draft);
        self.autosave.on_mutation(now, eligible);
    }

    // ─── Navigation ─────────────────────────────────────────────────────────

    pub fn advance(&mut self, now: Instant) -> Result<WizardStep, WizardError> {
        let step = self.wizard.advance(&self.draft)?;
        self.schedule_autosave(now);
        Ok(step)
    }

    pub fn back(&mut self, now: Instant) -> Result<WizardStep, WizardError> {
        let step = self.wizard.back()?;
        self.schedule_autosave(now);
        Ok(step)
    }

    pub fn go_to(&mut self, step: WizardStep, now: Instant) -> Result<WizardStep, WizardError> {
        let step = self.wizard.go_to(step)?;
        self.schedule_autosave(now);
        Ok(step)
    }

    /// Open a section on user request
    pub fn open(&mut self, section: SectionId) {
        self.navigator.open(section);
    }

    // ─── Persistence ────────────────────────────────────────────────────────

    /// Drive the autosave timer; call from the host's clock
    pub fn tick(&mut self, now: Instant) -> AutosaveTick {
        let completed = self.wizard.completed_steps();
        let at = SavePoint {
            step: self.wizard.current(),
            completed: &completed,
        };
        self.autosave.poll(now, &mut self.draft, &self.store, at)
    }

    /// Manual "save as draft"
    pub fn save_draft(&mut self, now: Instant) -> Option<Uuid> {
        let completed = self.wizard.completed_steps();
        let at = SavePoint {
            step: self.wizard.current(),
            completed: &completed,
        };
        self.autosave.save_now(now, &mut self.draft, &self.store, at)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.autosave.has_unsaved_changes(&self.draft)
    }

    pub fn request_exit(&self) -> ExitPrompt {
        if self.has_unsaved_changes() {
            ExitPrompt::Confirm
        } else {
            ExitPrompt::Leave
        }
    }

    pub fn resolve_exit(&mut self, choice: ExitChoice, now: Instant) -> ExitResolution {
        match choice {
            ExitChoice::Cancel => ExitResolution::Stay,
            ExitChoice::Discard => {
                self.autosave.cancel();
                if let Some(id) = self.draft.draft_id {
                    self.store.delete(id);
                }
                tracing::info!(draft_id = ?self.draft.draft_id, "Draft discarded");
                ExitResolution::Left { saved: false }
            }
            ExitChoice::SaveAndLeave => match self.save_draft(now) {
                Some(_) => ExitResolution::Left { saved: true },
                None => ExitResolution::SaveFailed,
            },
        }
    }

    // ─── Publish ────────────────────────────────────────────────────────────

    /// Validate everything and hand the draft to `submitter`.
    ///
    /// Only a successful submission deletes the stored draft. The wizard step
    /// never changes here.
    pub async fn publish(&mut self, submitter: &dyn Submitter) -> PublishOutcome {
        self.show_all_errors = true;
        self.refresh();

        if let Some(section) = self.errors.first_section_with_error {
            let message = self
                .errors
                .errors_in(section)
                .first()
                .map(|(_, m)| (*m).to_string())
                .unwrap_or_default();
            self.navigator.open(section);
            tracing::info!(
                section = section.key(),
                errors = self.errors.errors.len(),
                "Publish blocked by validation"
            );
            return PublishOutcome::Invalid { section, message };
        }

        match submitter.submit(&payload(&self.draft)).await {
            Ok(receipt) => {
                self.autosave.cancel();
                if let Some(id) = self.draft.draft_id {
                    self.store.delete(id);
                }
                tracing::info!(
                    offer_id = %receipt.offer_id,
                    updated = receipt.updated,
                    "Offer published"
                );
                PublishOutcome::Published(receipt)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Publish failed");
                PublishOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}
