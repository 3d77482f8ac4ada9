/// Chapters — one story graph loaded from one definition file.

use ron::extensions::Extensions;
use rustc_hash::FxHashMap;
use std::path::Path;

use super::story::{RawStory, Story, StoryError, StoryId};

/// An id → story mapping plus the order records appeared in.
///
/// Referential integrity is not checked here; dangling `goto` targets
/// surface as `StoryError::MissingStory` when a narrator reaches them.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    name: String,
    stories: FxHashMap<StoryId, Story>,
    order: Vec<StoryId>,
}

impl Chapter {
    /// Build a chapter from parsed records, validating each one.
    pub fn from_records(
        name: impl Into<String>,
        records: Vec<RawStory>,
    ) -> Result<Chapter, StoryError> {
        let name = name.into();
        let mut stories = FxHashMap::default();
        let mut order = Vec::with_capacity(records.len());

        for record in records {
            let story = Story::try_from(record)?;
            if stories.contains_key(&story.id) {
                return Err(StoryError::DuplicateId {
                    chapter: name,
                    id: story.id,
                });
            }
            order.push(story.id.clone());
            stories.insert(story.id.clone(), story);
        }

        Ok(Chapter {
            name,
            stories,
            order,
        })
    }

    /// Parse a chapter from RON text. `Option` fields may be written
    /// without the `Some(..)` wrapper.
    pub fn parse_ron(name: impl Into<String>, input: &str) -> Result<Chapter, StoryError> {
        let records: Vec<RawStory> = ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(input)?;
        Self::from_records(name, records)
    }

    /// Load a chapter from a RON file. The chapter is named after the file.
    pub fn load_from_ron(path: &Path) -> Result<Chapter, StoryError> {
        let contents = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        Self::parse_ron(name, &contents)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, id: &StoryId) -> Result<&Story, StoryError> {
        self.stories.get(id).ok_or_else(|| StoryError::MissingStory {
            chapter: self.name.clone(),
            id: id.clone(),
        })
    }

    pub fn contains(&self, id: &StoryId) -> bool {
        self.stories.contains_key(id)
    }

    /// First record flagged as a start point, in file order.
    pub fn start_point(&self) -> Option<&StoryId> {
        self.order
            .iter()
            .find(|id| self.stories.get(*id).is_some_and(|story| story.start_point))
    }

    /// Stories in file order.
    pub fn stories(&self) -> impl Iterator<Item = &Story> {
        self.order.iter().filter_map(|id| self.stories.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
