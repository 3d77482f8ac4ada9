/// Testing utilities — `ScriptedOracle` answers oracle exchanges from
/// pre-loaded queues so sessions can be driven end to end offline.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::core::oracle::{
    ChatMessage, OptionSelection, OptionSelectionRequest, Oracle, OracleError, PhaseEnd,
    SituationResult, SituationSuggestion,
};

/// An oracle that replays scripted responses in order.
///
/// Each exchange has its own queue. Calling an exchange whose queue is
/// empty yields `OracleError::Protocol`.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    selections: RefCell<VecDeque<OptionSelection>>,
    situations: RefCell<VecDeque<SituationSuggestion>>,
    results: RefCell<VecDeque<SituationResult>>,
    phase_ends: RefCell<VecDeque<bool>>,
    /// Every option-selection request received, in order.
    requests: RefCell<Vec<OptionSelectionRequest>>,
    /// The history passed to every result exchange, in order.
    result_histories: RefCell<Vec<Vec<ChatMessage>>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for `select_option`.
    pub fn with_selection(
        self,
        option: usize,
        reason: impl Into<String>,
        narration: impl Into<String>,
    ) -> Self {
        self.selections.borrow_mut().push_back(OptionSelection {
            option,
            reason: reason.into(),
            narration: narration.into(),
        });
        self
    }

    /// Queue an answer for `suggest_situation`.
    pub fn with_situation<I, S>(self, situation: impl Into<String>, selections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.situations.borrow_mut().push_back(SituationSuggestion {
            situation: situation.into(),
            selections: selections.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Queue an answer for `resolve_result`.
    pub fn with_result(
        self,
        narration: impl Into<String>,
        health: i32,
        mental: i32,
        money: i32,
    ) -> Self {
        self.results.borrow_mut().push_back(SituationResult {
            narration: narration.into(),
            health,
            mental,
            money,
        });
        self
    }

    /// Queue an answer for `check_phase_end`.
    pub fn with_phase_end(self, is_phase_over: bool) -> Self {
        self.phase_ends.borrow_mut().push_back(is_phase_over);
        self
    }

    pub fn selection_requests(&self) -> Vec<OptionSelectionRequest> {
        self.requests.borrow().clone()
    }

    pub fn result_histories(&self) -> Vec<Vec<ChatMessage>> {
        self.result_histories.borrow().clone()
    }

    /// Total scripted answers not yet consumed.
    pub fn pending(&self) -> usize {
        self.selections.borrow().len()
            + self.situations.borrow().len()
            + self.results.borrow().len()
            + self.phase_ends.borrow().len()
    }
}

fn next<T>(queue: &RefCell<VecDeque<T>>, exchange: &str) -> Result<T, OracleError> {
    queue
        .borrow_mut()
        .pop_front()
        .ok_or_else(|| OracleError::Protocol(format!("no scripted {exchange} response left")))
}

impl Oracle for ScriptedOracle {
    fn select_option(
        &self,
        request: &OptionSelectionRequest,
    ) -> Result<OptionSelection, OracleError> {
        self.requests.borrow_mut().push(request.clone());
        next(&self.selections, "option selection")
    }

    fn suggest_situation(
        &self,
        _history: &[ChatMessage],
    ) -> Result<SituationSuggestion, OracleError> {
        next(&self.situations, "situation")
    }

    fn resolve_result(&self, history: &[ChatMessage]) -> Result<SituationResult, OracleError> {
        self.result_histories.borrow_mut().push(history.to_vec());
        next(&self.results, "result")
    }

    fn check_phase_end(&self, _history: &[ChatMessage]) -> Result<PhaseEnd, OracleError> {
        next(&self.phase_ends, "phase end").map(|is_phase_over| PhaseEnd { is_phase_over })
    }
}
