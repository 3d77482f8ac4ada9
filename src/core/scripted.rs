/// Scripted-graph narrator — walks a pre-authored chapter, delegating
/// freeform player input to the oracle.

use tracing::{debug, info};

use crate::core::io::{read_non_empty, Line, Selection};
use crate::core::narrator::{apply_delta, NarratorError, PlayContext};
use crate::core::oracle::{OptionSelectionRequest, OracleOption};
use crate::schema::chapter::Chapter;
use crate::schema::status::StatusManager;
use crate::schema::story::{ChapterRef, Story, StoryError, StoryId, StoryOption, Transition};

const ACTION_PROMPT: &str = "What will you do?";

/// Owns one chapter graph and the node to start walking from.
#[derive(Debug, Clone)]
pub struct ScriptedNarrator {
    chapter: Chapter,
    entry: StoryId,
}

impl ScriptedNarrator {
    /// Start at the chapter's start point.
    pub fn new(chapter: Chapter) -> Result<Self, StoryError> {
        let entry = chapter
            .start_point()
            .cloned()
            .ok_or_else(|| StoryError::NoStartPoint(chapter.name().to_string()))?;
        Ok(Self { chapter, entry })
    }

    /// Start at an explicit node. The node is looked up when play begins.
    pub fn at(chapter: Chapter, entry: impl Into<StoryId>) -> Self {
        Self {
            chapter,
            entry: entry.into(),
        }
    }

    pub fn chapter_name(&self) -> &str {
        self.chapter.name()
    }

    pub fn entry(&self) -> &StoryId {
        &self.entry
    }

    /// Walk the chapter from the entry node until a terminal node or death.
    pub fn play(
        &self,
        status: &mut StatusManager,
        ctx: &mut PlayContext<'_>,
    ) -> Result<Option<ScriptedNarrator>, NarratorError> {
        let mut current = self.entry.clone();
        let mut context = String::new();
        let mut bridge: Option<String> = None;

        loop {
            let story = self.chapter.get(&current)?;
            debug!(chapter = self.chapter.name(), story = %story.id, "visiting story");

            let text = bridge.take().unwrap_or_else(|| story.description.clone());
            ctx.io.show(Line::Narration(text));

            for (name, delta) in &story.affect_status {
                apply_delta(ctx.io, status, name, *delta)?;
            }
            ctx.io.show(Line::Status(status.to_string()));
            if status.is_dead() {
                info!(chapter = self.chapter.name(), story = %story.id, "player died");
                return Ok(None);
            }

            if !context.is_empty() {
                context.push(' ');
            }
            context.push_str(&story.description);

            match &story.transition {
                Transition::Goto(next) => current = next.clone(),
                Transition::End => return Ok(None),
                Transition::NextEvent(reference) => {
                    let reference = ChapterRef::parse(reference)?;
                    info!(from = self.chapter.name(), to = %reference, "chaining chapter");
                    return Ok(Some(ctx.library.narrator_for(&reference)?));
                }
                Transition::Choice(options) => {
                    let (next, next_bridge) = self.choose(story, options, &context, ctx)?;
                    current = next;
                    bridge = next_bridge;
                }
            }
        }
    }

    /// Present the visible options and resolve the player's answer to a
    /// target node, plus the text to show in place of its description.
    fn choose(
        &self,
        story: &Story,
        options: &[StoryOption],
        context: &str,
        ctx: &mut PlayContext<'_>,
    ) -> Result<(StoryId, Option<String>), NarratorError> {
        let visible = story.visible_options();
        for (i, option) in visible.iter().enumerate() {
            ctx.io.show(Line::Option {
                number: i + 1,
                text: option.description.clone(),
            });
        }

        let input = read_non_empty(ctx.io, ACTION_PROMPT)?;
        match Selection::parse_numbered(&input, visible.len()) {
            Selection::Indexed(n) => {
                let option = visible[n - 1];
                ctx.io.show(Line::Choice(option.description.clone()));
                Ok((option.goto.clone(), option.bridge().map(str::to_string)))
            }
            Selection::Freeform(action) => {
                let request = OptionSelectionRequest {
                    action: action.clone(),
                    context: context.to_string(),
                    options: self.oracle_options(options)?,
                };
                let response = ctx.oracle.select_option(&request)?;
                response.validate(options.len())?;
                let option = &options[response.option - 1];

                ctx.io.show(Line::Choice(action));
                debug!(
                    story = %story.id,
                    option = response.option,
                    reason = %response.reason,
                    "oracle selected option"
                );
                if ctx.config.debug {
                    ctx.io.show(Line::Notice(format!(
                        "selected option {} : {}",
                        response.option, response.reason
                    )));
                }
                Ok((option.goto.clone(), Some(response.narration)))
            }
        }
    }

    /// Every option with its outcome text resolved from this chapter.
    fn oracle_options(&self, options: &[StoryOption]) -> Result<Vec<OracleOption>, StoryError> {
        options
            .iter()
            .map(|option| {
                let outcome = match option.bridge() {
                    Some(text) => text.to_string(),
                    None => self.chapter.get(&option.goto)?.description.clone(),
                };
                Ok(OracleOption {
                    description: option.description.clone(),
                    outcome: Some(outcome),
                })
            })
            .collect()
    }
}
