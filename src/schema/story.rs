/// Story nodes, options and chapter references.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// Errors raised while loading or walking a story graph.
///
/// `Validation`, `DuplicateId`, `Ron` and `Io` happen at load time.
/// `MissingStory`, `UnknownChapter` and `MalformedChapterRef` happen
/// while a narrator walks the graph.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("story {id}: {reason}")]
    Validation { id: StoryId, reason: String },
    #[error("story id {id} appears more than once in chapter '{chapter}'")]
    DuplicateId { chapter: String, id: StoryId },
    #[error("story {id} not found in chapter '{chapter}'")]
    MissingStory { chapter: String, id: StoryId },
    #[error("chapter '{0}' not found")]
    UnknownChapter(String),
    #[error("'{0}' has wrong format, expected <chapter>:<start id>")]
    MalformedChapterRef(String),
    #[error("chapter '{0}' has no start point")]
    NoStartPoint(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Identifier of a story node. Story files may use integers or strings;
/// strings made only of digits are treated as integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoryId {
    Num(i64),
    Name(String),
}

impl StoryId {
    /// Parse an id from text, coercing numeric strings.
    pub fn parse(raw: &str) -> StoryId {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse::<i64>() {
                return StoryId::Num(n);
            }
        }
        StoryId::Name(trimmed.to_string())
    }
}

impl From<i64> for StoryId {
    fn from(n: i64) -> Self {
        StoryId::Num(n)
    }
}

impl From<&str> for StoryId {
    fn from(s: &str) -> Self {
        StoryId::parse(s)
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryId::Num(n) => write!(f, "{n}"),
            StoryId::Name(s) => f.write_str(s),
        }
    }
}

impl Serialize for StoryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StoryId::Num(n) => serializer.serialize_i64(*n),
            StoryId::Name(s) => serializer.serialize_str(s),
        }
    }
}

struct StoryIdVisitor;

impl<'de> Visitor<'de> for StoryIdVisitor {
    type Value = StoryId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer or string story id")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<StoryId, E> {
        Ok(StoryId::Num(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<StoryId, E> {
        i64::try_from(v)
            .map(StoryId::Num)
            .map_err(|_| E::custom(format!("story id {v} is too large")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<StoryId, E> {
        Ok(StoryId::parse(v))
    }
}

impl<'de> Deserialize<'de> for StoryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StoryIdVisitor)
    }
}

/// A labeled transition out of a branching node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryOption {
    pub description: String,
    pub goto: StoryId,
    /// Shown instead of the target node's description when this option is picked directly.
    #[serde(default)]
    pub next_description: Option<String>,
    /// Hidden options never reach the menu, but the oracle may still pick them.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Informational only; not used for gating.
    #[serde(default)]
    pub status_condition: HashMap<String, i32>,
}

fn default_visible() -> bool {
    true
}

impl StoryOption {
    pub fn new(description: impl Into<String>, goto: impl Into<StoryId>) -> Self {
        Self {
            description: description.into(),
            goto: goto.into(),
            next_description: None,
            visible: true,
            status_condition: HashMap::new(),
        }
    }

    pub fn with_next_description(mut self, text: impl Into<String>) -> Self {
        self.next_description = Some(text.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// The bridging text, ignoring empty strings.
    pub fn bridge(&self) -> Option<&str> {
        self.next_description
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// What happens after a node has been narrated.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Terminal node: the chapter is over.
    End,
    /// Pass-through to another node without asking the player.
    Goto(StoryId),
    /// Branching choice point.
    Choice(Vec<StoryOption>),
    /// Terminal node leading to another chapter, `<chapter>:<entry id>`.
    NextEvent(String),
}

/// One addressable unit of narrative content.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub id: StoryId,
    pub description: String,
    pub start_point: bool,
    pub affect_status: BTreeMap<String, i32>,
    pub transition: Transition,
}

impl Story {
    pub fn goto(&self) -> Option<&StoryId> {
        match &self.transition {
            Transition::Goto(id) => Some(id),
            _ => None,
        }
    }

    pub fn options(&self) -> &[StoryOption] {
        match &self.transition {
            Transition::Choice(options) => options,
            _ => &[],
        }
    }

    pub fn next_event(&self) -> Option<&str> {
        match &self.transition {
            Transition::NextEvent(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn visible_options(&self) -> Vec<&StoryOption> {
        self.options().iter().filter(|option| option.visible).collect()
    }
}

/// A story record as it appears in a chapter file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawStory {
    pub id: StoryId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<StoryOption>,
    #[serde(default)]
    pub start_point: bool,
    #[serde(default)]
    pub affect_status: BTreeMap<String, i32>,
    #[serde(default)]
    pub goto: Option<StoryId>,
    #[serde(default)]
    pub next_event: Option<String>,
}

impl RawStory {
    pub fn new(id: impl Into<StoryId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            options: Vec::new(),
            start_point: false,
            affect_status: BTreeMap::new(),
            goto: None,
            next_event: None,
        }
    }
}

impl TryFrom<RawStory> for Story {
    type Error = StoryError;

    fn try_from(raw: RawStory) -> Result<Self, Self::Error> {
        let id = raw.id;
        let set = [
            raw.goto.is_some(),
            !raw.options.is_empty(),
            raw.next_event.is_some(),
        ]
        .iter()
        .filter(|is_set| **is_set)
        .count();
        if set > 1 {
            return Err(StoryError::Validation {
                id,
                reason: "only one of goto, options or next_event may be set".to_string(),
            });
        }

        let transition = match (raw.goto, raw.next_event) {
            (Some(target), _) => Transition::Goto(target),
            (_, Some(reference)) => Transition::NextEvent(reference),
            _ if !raw.options.is_empty() => Transition::Choice(raw.options),
            _ => Transition::End,
        };

        Ok(Story {
            id,
            description: raw.description,
            start_point: raw.start_point,
            affect_status: raw.affect_status,
            transition,
        })
    }
}

/// Parsed `next_event` reference: which chapter to open and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRef {
    pub chapter: String,
    pub entry: StoryId,
}

impl ChapterRef {
    pub fn parse(reference: &str) -> Result<ChapterRef, StoryError> {
        let malformed = || StoryError::MalformedChapterRef(reference.to_string());
        let (chapter, entry) = reference.trim().rsplit_once(':').ok_or_else(malformed)?;
        let (chapter, entry) = (chapter.trim(), entry.trim());
        if chapter.is_empty() || entry.is_empty() {
            return Err(malformed());
        }
        Ok(ChapterRef {
            chapter: chapter.to_string(),
            entry: StoryId::parse(entry),
        })
    }
}

impl fmt::Display for ChapterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.entry)
    }
}
