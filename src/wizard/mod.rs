//! Wizard step machine and section auto-navigation

mod step;

pub use step::WizardStep;

use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::draft::OfferDraft;
use crate::engine::SectionReport;
use crate::types::SectionId;

/// Errors from wizard navigation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("step '{0}' is not complete yet")]
    CannotAdvance(WizardStep),

    #[error("already at the last step")]
    AtLastStep,

    #[error("already at the first step")]
    AtFirstStep,

    #[error("step '{0}' has not been reached yet")]
    Unreachable(WizardStep),
}

/// Fresh creation, or editing an already-published offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardMode {
    Create,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    mode: WizardMode,
    current: WizardStep,
    completed: BTreeSet<WizardStep>,
}

impl WizardState {
    pub fn create() -> Self {
        Self {
            mode: WizardMode::Create,
            current: WizardStep::first(),
            completed: BTreeSet::new(),
        }
    }

    /// Editing starts with every step before review already completed
    pub fn edit() -> Self {
        Self {
            mode: WizardMode::Edit,
            current: WizardStep::first(),
            completed: WizardStep::all()
                .iter()
                .copied()
                .filter(|s| *s != WizardStep::Review)
                .collect(),
        }
    }

    /// Restore position from a stored draft record
    pub fn resume(mode: WizardMode, current: WizardStep, completed: &[WizardStep]) -> Self {
        Self {
            mode,
            current,
            completed: completed.iter().copied().collect(),
        }
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn current(&self) -> WizardStep {
        self.current
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed.contains(&step)
    }

    /// Completed steps in wizard order
    pub fn completed_steps(&self) -> Vec<WizardStep> {
        self.completed.iter().copied().collect()
    }

    /// Move forward if the current step's predicate holds
    pub fn advance(&mut self, draft: &OfferDraft) -> Result<WizardStep, WizardError> {
        let next = self.current.next().ok_or(WizardError::AtLastStep)?;
        if !self.current.can_advance(draft) {
            return Err(WizardError::CannotAdvance(self.current));
        }

        self.completed.insert(self.current);
        tracing::debug!(from = %self.current, to = %next, "Wizard advanced");
        self.current = next;
        Ok(next)
    }

    /// Step backward.
    ///
    /// In create mode the step returned to and everything after it lose their
    /// completed status and must be advanced through again.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let prev = self.current.prev().ok_or(WizardError::AtFirstStep)?;

        if self.mode == WizardMode::Create {
            self.completed.retain(|s| *s < prev);
        }

        tracing::debug!(from = %self.current, to = %prev, "Wizard stepped back");
        self.current = prev;
        Ok(prev)
    }

    /// Completed steps and the current one are reachable; edit mode reaches all
    pub fn is_reachable(&self, step: WizardStep) -> bool {
        self.mode == WizardMode::Edit || step == self.current || self.completed.contains(&step)
    }

    /// Jump via the step indicator
    pub fn go_to(&mut self, step: WizardStep) -> Result<WizardStep, WizardError> {
        if !self.is_reachable(step) {
            return Err(WizardError::Unreachable(step));
        }
        self.current = step;
        Ok(step)
    }
}

/// Tracks which section the host should open as sections complete.
///
/// The host is told to open a section only when the first incomplete section
/// changes; re-observing the same report is a no-op, which keeps a host that
/// re-renders on every instruction from looping.
#[derive(Debug, Clone, Default)]
pub struct SectionNavigator {
    observed: bool,
    last_first_incomplete: Option<SectionId>,
    open: Option<SectionId>,
}

impl SectionNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Section currently open in the host
    pub fn open_section(&self) -> Option<SectionId> {
        self.open
    }

    /// Feed a fresh report. Returns the section to open, if any.
    pub fn observe(&mut self, report: &SectionReport) -> Option<SectionId> {
        let first = report.first_incomplete;
        if self.observed && first == self.last_first_incomplete {
            return None;
        }
        self.observed = true;
        self.last_first_incomplete = first;

        // All complete: leave whatever is open alone
        let target = first?;
        if self.open == Some(target) {
            return None;
        }
        self.open = Some(target);
        tracing::trace!(section = target.key(), "Auto-navigating to section");
        Some(target)
    }

    /// Open a section directly (user click, or publish reopening an error)
    pub fn open(&mut self, section: SectionId) {
        self.open = Some(section);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_sections_default;
    use crate::types::{Merchant, OfferType};

    #[test]
    fn test_merchant_step_gating() {
        let mut wizard = WizardState::create();
        let mut draft = OfferDraft::with_type(OfferType::PercentOff);
        wizard.advance(&draft).unwrap();
        assert_eq!(wizard.current(), WizardStep::MerchantSelection);

        assert_eq!(
            wizard.advance(&draft),
            Err(WizardError::CannotAdvance(WizardStep::MerchantSelection))
        );

        draft.merchant = Some(Merchant::existing("M001"));
        assert_eq!(wizard.advance(&draft), Ok(WizardStep::ContentEntry));
        assert!(wizard.is_completed(WizardStep::MerchantSelection));
    }

    #[test]
    fn test_back_in_create_mode_revokes_completion() {
        let mut draft = OfferDraft::with_type(OfferType::PercentOff);
        draft.merchant = Some(Merchant::existing("M001"));
        let mut wizard = WizardState::create();
        wizard.advance(&draft).unwrap();
        wizard.advance(&draft).unwrap();

        wizard.back().unwrap();
        assert_eq!(wizard.current(), WizardStep::MerchantSelection);
        assert!(wizard.is_completed(WizardStep::TypeSelection));
        assert!(!wizard.is_completed(WizardStep::MerchantSelection));
        assert!(!wizard.is_reachable(WizardStep::ContentEntry));
    }

    #[test]
    fn test_back_in_edit_mode_keeps_completion() {
        let mut wizard = WizardState::edit();
        wizard.go_to(WizardStep::Review).unwrap();
        wizard.back().unwrap();
        wizard.back().unwrap();
        assert!(wizard.is_completed(WizardStep::ContentEntry));
        assert!(wizard.is_reachable(WizardStep::Review));
    }

    #[test]
    fn test_go_to_only_reached_steps() {
        let mut wizard = WizardState::create();
        assert_eq!(
            wizard.go_to(WizardStep::Review),
            Err(WizardError::Unreachable(WizardStep::Review))
        );
        assert_eq!(wizard.go_to(WizardStep::TypeSelection), Ok(WizardStep::TypeSelection));
        assert_eq!(wizard.back(), Err(WizardError::AtFirstStep));
    }

    #[test]
    fn test_resume_restores_position() {
        let wizard = WizardState::resume(
            WizardMode::Create,
            WizardStep::ContentEntry,
            &[WizardStep::TypeSelection, WizardStep::MerchantSelection],
        );
        assert_eq!(wizard.current(), WizardStep::ContentEntry);
        assert!(wizard.is_reachable(WizardStep::MerchantSelection));
        assert!(!wizard.is_reachable(WizardStep::Review));
    }

    #[test]
    fn test_navigator_only_fires_on_change() {
        let mut nav = SectionNavigator::new();
        let mut draft = OfferDraft::with_type(OfferType::PercentOff);

        let report = compute_sections_default(&draft);
        assert_eq!(nav.observe(&report), Some(SectionId::Merchant));
        assert_eq!(nav.observe(&report), None);

        draft.merchant = Some(Merchant::existing("M001"));
        let report = compute_sections_default(&draft);
        assert_eq!(nav.observe(&report), Some(SectionId::TypeDetail));
        assert_eq!(nav.open_section(), Some(SectionId::TypeDetail));
    }

    #[test]
    fn test_navigator_keeps_section_open_when_all_complete() {
        let mut nav = SectionNavigator::new();
        nav.open(SectionId::Terms);
        let report = SectionReport {
            sections: Vec::new(),
            first_incomplete: None,
            all_complete: true,
        };
        assert_eq!(nav.observe(&report), None);
        assert_eq!(nav.open_section(), Some(SectionId::Terms));
    }
}
