/// Oracle gateway contract — the typed exchanges narrators make with the
/// external text-generation service.
///
/// Every exchange is stateless from the oracle's side: callers own the
/// conversation history and pass all of it on each call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::status::StatusKind;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("malformed oracle response: {0}")]
    Protocol(String),
    #[error("oracle picked option {index} but only {count} exist")]
    OptionOutOfRange { index: usize, count: usize },
    #[error("invalid oracle configuration: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation threaded through oracle calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// An option as the oracle sees it, with its outcome already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OracleOption {
    pub description: String,
    /// The option's bridging text, or the target node's description.
    pub outcome: Option<String>,
}

/// Ask the oracle to map a freeform action onto one of the options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSelectionRequest {
    pub action: String,
    /// Space-joined descriptions of every node visited so far.
    pub context: String,
    /// The full option list, hidden options included.
    pub options: Vec<OracleOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSelection {
    /// 1-based index into the full option list.
    pub option: usize,
    pub reason: String,
    /// Story text bridging the action, the option and its outcome.
    pub narration: String,
}

impl OptionSelection {
    pub fn validate(&self, count: usize) -> Result<(), OracleError> {
        if self.option == 0 || self.option > count {
            return Err(OracleError::OptionOutOfRange {
                index: self.option,
                count,
            });
        }
        Ok(())
    }
}

/// A freshly generated situation with exactly three candidate actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituationSuggestion {
    pub situation: String,
    pub selections: Vec<String>,
}

impl SituationSuggestion {
    pub const SELECTION_COUNT: usize = 3;

    pub fn validate(&self) -> Result<(), OracleError> {
        if self.selections.len() != Self::SELECTION_COUNT {
            return Err(OracleError::Protocol(format!(
                "expected {} selections, got {}",
                Self::SELECTION_COUNT,
                self.selections.len()
            )));
        }
        Ok(())
    }
}

/// Outcome of the player's action plus the status changes it causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituationResult {
    pub narration: String,
    pub health: i32,
    pub mental: i32,
    pub money: i32,
}

impl SituationResult {
    pub const DELTA_RANGE: std::ops::RangeInclusive<i32> = -2..=2;

    pub fn deltas(&self) -> [(StatusKind, i32); 3] {
        [
            (StatusKind::Health, self.health),
            (StatusKind::Mental, self.mental),
            (StatusKind::Money, self.money),
        ]
    }

    pub fn validate(&self) -> Result<(), OracleError> {
        for (kind, delta) in self.deltas() {
            if !Self::DELTA_RANGE.contains(&delta) {
                return Err(OracleError::Protocol(format!(
                    "{kind} delta {delta} is outside -2..=2"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseEnd {
    pub is_phase_over: bool,
}

/// How the result exchange should treat the player's stated intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// The outcome follows from the action.
    Congruent,
    /// The outcome diverges from what the player intended.
    Twist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultDirective {
    pub tone: Tone,
    /// Ask the oracle to wrap the encounter up this round.
    pub demand_closure: bool,
}

/// The external text-generation collaborator.
#[cfg_attr(test, mockall::automock)]
pub trait Oracle {
    /// Pick the option that best matches a freeform action and narrate it.
    fn select_option(
        &self,
        request: &OptionSelectionRequest,
    ) -> Result<OptionSelection, OracleError>;

    /// Generate a situation and three candidate actions.
    fn suggest_situation(&self, history: &[ChatMessage])
        -> Result<SituationSuggestion, OracleError>;

    /// Narrate the result of the latest action. The directive is already
    /// the last message of `history`.
    fn resolve_result(&self, history: &[ChatMessage]) -> Result<SituationResult, OracleError>;

    /// Decide whether the encounter's end condition has been met. The end
    /// condition is already the last message of `history`.
    fn check_phase_end(&self, history: &[ChatMessage]) -> Result<PhaseEnd, OracleError>;
}
