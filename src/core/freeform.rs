/// Freeform narrator — an oracle-authored side-encounter that runs to
/// completion within a single session turn.

use rand::Rng;
use tracing::{debug, info};

use crate::core::io::{read_non_empty, Line, Selection};
use crate::core::narrator::{NarratorError, PlayContext};
use crate::core::oracle::{ChatMessage, ResultDirective, Tone};
use crate::core::prompts;
use crate::schema::encounter::Encounter;
use crate::schema::status::StatusManager;

const ACTION_PROMPT: &str = "Describe your action:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeformNarrator {
    encounter: Encounter,
}

impl From<Encounter> for FreeformNarrator {
    fn from(encounter: Encounter) -> Self {
        Self { encounter }
    }
}

impl FreeformNarrator {
    pub fn new(situation: impl Into<String>, end_condition: impl Into<String>) -> Self {
        Encounter::new(situation, end_condition).into()
    }

    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    /// Run rounds of situation → action → result until the oracle says the
    /// end condition holds or the player dies.
    pub fn play(
        &self,
        status: &mut StatusManager,
        ctx: &mut PlayContext<'_>,
    ) -> Result<(), NarratorError> {
        let mut history = vec![ChatMessage::system(prompts::encounter_opening(
            &self.encounter.situation,
        ))];
        let mut round: u32 = 0;

        loop {
            let suggestion = ctx.oracle.suggest_situation(&history)?;
            suggestion.validate()?;

            ctx.io.show(Line::Narration(suggestion.situation.clone()));
            for (i, selection) in suggestion.selections.iter().enumerate() {
                ctx.io.show(Line::Option {
                    number: i + 1,
                    text: selection.clone(),
                });
            }

            let input = read_non_empty(ctx.io, ACTION_PROMPT)?;
            let action = match Selection::parse_lettered(&input, suggestion.selections.len()) {
                Selection::Indexed(n) => suggestion.selections[n - 1].clone(),
                Selection::Freeform(text) => text,
            };
            ctx.io.show(Line::Choice(action.clone()));

            let tone = if ctx.rng.gen_bool(ctx.config.twist_probability()) {
                Tone::Twist
            } else {
                Tone::Congruent
            };
            let directive = ResultDirective {
                tone,
                demand_closure: round > ctx.config.closure_after_rounds,
            };
            debug!(round, ?directive, "resolving encounter round");

            history.push(ChatMessage::assistant(prompts::presented_situation(
                &suggestion.situation,
                &suggestion.selections,
            )));
            history.push(ChatMessage::user(action));
            history.push(ChatMessage::system(prompts::result_directive(directive)));

            let result = ctx.oracle.resolve_result(&history)?;
            result.validate()?;

            for (kind, delta) in result.deltas() {
                if delta != 0 {
                    status.apply(kind, delta);
                    ctx.io.show(Line::StatusDelta {
                        name: kind.name().to_string(),
                        delta,
                    });
                }
            }
            ctx.io.show(Line::Narration(result.narration.clone()));
            ctx.io.show(Line::Status(status.to_string()));

            if status.is_dead() {
                info!(round, "player died during encounter");
                return Ok(());
            }

            history.push(ChatMessage::assistant(result.narration));
            history.push(ChatMessage::system(prompts::phase_end(
                &self.encounter.end_condition,
            )));

            if ctx.oracle.check_phase_end(&history)?.is_phase_over {
                debug!(rounds = round + 1, "encounter over");
                return Ok(());
            }
            round += 1;
        }
    }
}
