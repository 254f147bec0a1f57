//! Debounced autosave
//!
//! Every mutation reschedules a single pending save; a newer mutation simply
//! replaces the deadline, so at most one save is ever pending and it always
//! sees the latest draft. Time is passed in explicitly as an [`Instant`] so the
//! host decides what drives the clock (an event loop tick, a tokio interval,
//! or a test).

use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::AutosaveConfig;
use crate::draft::OfferDraft;
use crate::persistence::{has_changed, snapshot, DraftStore, Snapshot};
use crate::wizard::WizardStep;

/// Single-slot deadline. Scheduling again replaces the pending deadline.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    due_at: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            due_at: None,
        }
    }

    /// A deadline past the representable range is never due
    pub fn schedule(&mut self, now: Instant) {
        self.due_at = now.checked_add(self.delay);
        if self.due_at.is_none() {
            tracing::warn!(
                delay_secs = self.delay.as_secs(),
                "Autosave delay out of range, not scheduling"
            );
        }
    }

    pub fn cancel(&mut self) {
        self.due_at = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    /// Consume the pending deadline if it has passed
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.due_at {
            Some(due) if now >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.due_at.map(|due| due.saturating_duration_since(now))
    }
}

/// Transient "saved" flash shown after a successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveIndicator {
    Idle,
    Saved { until: Instant },
}

/// What a call to [`AutosaveScheduler::poll`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveTick {
    /// Nothing pending, or the deadline has not passed
    NotDue,
    /// Deadline passed but the draft matches the last saved baseline
    Unchanged,
    Saved(Uuid),
    /// Write failed; the save is rescheduled and the baseline left alone
    Failed,
}

/// Where the step and completion data for a save come from
#[derive(Debug, Clone, Copy)]
pub struct SavePoint<'a> {
    pub step: WizardStep,
    pub completed: &'a [WizardStep],
}

#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    debounce: Debouncer,
    indicator_for: Duration,
    indicator: SaveIndicator,
    baseline: Option<Snapshot>,
}

impl AutosaveScheduler {
    pub fn new(config: &AutosaveConfig) -> Self {
        Self::with_timing(
            Duration::from_secs(config.debounce_secs),
            Duration::from_millis(config.saved_indicator_ms),
        )
    }

    pub fn with_timing(debounce: Duration, indicator_for: Duration) -> Self {
        Self {
            debounce: Debouncer::new(debounce),
            indicator_for,
            indicator: SaveIndicator::Idle,
            baseline: None,
        }
    }

    /// Autosave runs once past the first step with an offer type chosen
    pub fn is_eligible(step: WizardStep, draft: &OfferDraft) -> bool {
        step != WizardStep::first() && draft.offer_type.is_some()
    }

    /// Treat `draft` as already saved. Used when resuming a stored draft.
    pub fn seed_baseline(&mut self, draft: &OfferDraft) {
        self.baseline = Some(snapshot(draft));
    }

    pub fn baseline(&self) -> Option<&Snapshot> {
        self.baseline.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.debounce.time_until_due(now)
    }

    /// Reschedule after a mutation, or drop any pending save if not eligible
    pub fn on_mutation(&mut self, now: Instant, eligible: bool) {
        if eligible {
            self.debounce.schedule(now);
        } else {
            self.debounce.cancel();
        }
    }

    pub fn cancel(&mut self) {
        self.debounce.cancel();
    }

    /// Whether leaving now would lose work
    pub fn has_unsaved_changes(&self, draft: &OfferDraft) -> bool {
        // Nothing worth keeping before a type is chosen
        draft.offer_type.is_some() && has_changed(draft, self.baseline.as_ref())
    }

    /// Run the pending save if its deadline has passed
    pub fn poll(
        &mut self,
        now: Instant,
        draft: &mut OfferDraft,
        store: &DraftStore,
        at: SavePoint<'_>,
    ) -> AutosaveTick {
        if !self.debounce.take_due(now) {
            return AutosaveTick::NotDue;
        }

        if !has_changed(draft, self.baseline.as_ref()) {
            tracing::trace!("Autosave skipped, draft unchanged");
            return AutosaveTick::Unchanged;
        }

        match self.persist(now, draft, store, at) {
            Some(id) => AutosaveTick::Saved(id),
            None => {
                self.debounce.schedule(now);
                AutosaveTick::Failed
            }
        }
    }

    /// Manual save. Persists immediately and clears any pending autosave.
    pub fn save_now(
        &mut self,
        now: Instant,
        draft: &mut OfferDraft,
        store: &DraftStore,
        at: SavePoint<'_>,
    ) -> Option<Uuid> {
        self.debounce.cancel();
        self.persist(now, draft, store, at)
    }

    /// Current indicator state; a stale "saved" flash decays to idle
    pub fn indicator(&mut self, now: Instant) -> SaveIndicator {
        if let SaveIndicator::Saved { until } = self.indicator {
            if now >= until {
                self.indicator = SaveIndicator::Idle;
            }
        }
        self.indicator
    }

    fn persist(
        &mut self,
        now: Instant,
        draft: &mut OfferDraft,
        store: &DraftStore,
        at: SavePoint<'_>,
    ) -> Option<Uuid> {
        let id = *draft.draft_id.get_or_insert_with(Uuid::new_v4);

        if !store.save(id, draft, at.step, at.completed) {
            return None;
        }

        let saved = snapshot(draft);
        tracing::info!(
            draft_id = %id,
            step = %at.step,
            fingerprint = %saved.short(),
            "Draft autosaved"
        );
        self.baseline = Some(saved);
        self.indicator = SaveIndicator::Saved {
            until: now + self.indicator_for,
        };
        Some(id)
    }
}

// ─── Exit confirmation ──────────────────────────────────────────────────────

/// Result of asking to leave the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPrompt {
    /// Nothing unsaved; leave straight away
    Leave,
    /// Unsaved changes; ask the user with [`ExitChoice`]
    Confirm,
}

/// Options offered when leaving with unsaved changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitChoice {
    Cancel,
    Discard,
    SaveAndLeave,
}

impl ExitChoice {
    pub fn all() -> &'static [ExitChoice] {
        &[ExitChoice::Cancel, ExitChoice::Discard, ExitChoice::SaveAndLeave]
    }

    pub fn next(self) -> Self {
        match self {
            Self::Cancel => Self::Discard,
            Self::Discard => Self::SaveAndLeave,
            Self::SaveAndLeave => Self::Cancel,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Cancel => Self::SaveAndLeave,
            Self::Discard => Self::Cancel,
            Self::SaveAndLeave => Self::Discard,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cancel => "Keep editing",
            Self::Discard => "Discard changes",
            Self::SaveAndLeave => "Save draft and leave",
        }
    }

    /// Keyboard shortcut
    pub fn key(&self) -> char {
        match self {
            Self::Cancel => 'c',
            Self::Discard => 'd',
            Self::SaveAndLeave => 's',
        }
    }
}

/// Outcome of resolving an [`ExitChoice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitResolution {
    Stay,
    Left { saved: bool },
    /// Save-and-leave could not write; the user stays with the draft intact
    SaveFailed,
}
