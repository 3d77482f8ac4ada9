/// Narrator contract — one story unit per session turn.

use rand::rngs::StdRng;
use thiserror::Error;

use crate::core::freeform::FreeformNarrator;
use crate::core::io::{Line, PlayerIo};
use crate::core::library::ChapterLibrary;
use crate::core::oracle::{Oracle, OracleError};
use crate::core::scripted::ScriptedNarrator;
use crate::core::session::SessionConfig;
use crate::schema::status::{StatusError, StatusManager};
use crate::schema::story::StoryError;

#[derive(Debug, Error)]
pub enum NarratorError {
    #[error("story error: {0}")]
    Story(#[from] StoryError),
    #[error("status error: {0}")]
    Status(#[from] StatusError),
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Collaborators a narrator needs while it holds control.
pub struct PlayContext<'a> {
    pub oracle: &'a dyn Oracle,
    pub io: &'a mut dyn PlayerIo,
    pub library: &'a ChapterLibrary,
    pub rng: &'a mut StdRng,
    pub config: &'a SessionConfig,
}

/// A playable story unit.
#[derive(Debug, Clone)]
pub enum Narrator {
    /// Walks a pre-authored chapter graph.
    Scripted(ScriptedNarrator),
    /// Runs an oracle-authored side-encounter to completion.
    Freeform(FreeformNarrator),
}

impl Narrator {
    /// Play one unit. Returns the narrator to queue next, if any.
    ///
    /// Callers check `status.is_dead()` afterwards; a narrator stops
    /// as soon as the player dies and returns `None`.
    pub fn play(
        &self,
        status: &mut StatusManager,
        ctx: &mut PlayContext<'_>,
    ) -> Result<Option<Narrator>, NarratorError> {
        match self {
            Narrator::Scripted(narrator) => {
                Ok(narrator.play(status, ctx)?.map(Narrator::Scripted))
            }
            Narrator::Freeform(narrator) => {
                narrator.play(status, ctx)?;
                Ok(None)
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            Narrator::Scripted(narrator) => format!("chapter {}", narrator.chapter_name()),
            Narrator::Freeform(_) => "encounter".to_string(),
        }
    }
}

impl From<ScriptedNarrator> for Narrator {
    fn from(narrator: ScriptedNarrator) -> Self {
        Narrator::Scripted(narrator)
    }
}

impl From<FreeformNarrator> for Narrator {
    fn from(narrator: FreeformNarrator) -> Self {
        Narrator::Freeform(narrator)
    }
}

/// Show a status change and apply it.
pub(crate) fn apply_delta(
    io: &mut dyn PlayerIo,
    status: &mut StatusManager,
    name: &str,
    delta: i32,
) -> Result<(), StatusError> {
    status.add(name, delta)?;
    io.show(Line::StatusDelta {
        name: name.to_string(),
        delta,
    });
    Ok(())
}
