/// Chapter library — every loaded chapter, keyed by name, used to seed
/// entry narrators and to resolve `next_event` chaining.

use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::debug;

use crate::core::scripted::ScriptedNarrator;
use crate::schema::chapter::Chapter;
use crate::schema::story::{ChapterRef, StoryError};

#[derive(Debug, Clone, Default)]
pub struct ChapterLibrary {
    chapters: FxHashMap<String, Chapter>,
}

impl ChapterLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chapter, replacing any chapter with the same name.
    pub fn insert(&mut self, chapter: Chapter) {
        self.chapters.insert(chapter.name().to_string(), chapter);
    }

    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.insert(chapter);
        self
    }

    /// Load every `.ron` file in `dir` as a chapter.
    pub fn load_dir(dir: &Path) -> Result<Self, StoryError> {
        let mut library = Self::new();
        load_ron_files_from_dir(dir, |path| {
            let chapter = Chapter::load_from_ron(path)?;
            debug!(chapter = chapter.name(), stories = chapter.len(), "loaded chapter");
            library.insert(chapter);
            Ok(())
        })?;
        Ok(library)
    }

    pub fn get(&self, name: &str) -> Option<&Chapter> {
        self.chapters.get(name)
    }

    /// Chapters sorted by name.
    pub fn chapters(&self) -> Vec<&Chapter> {
        let mut chapters: Vec<&Chapter> = self.chapters.values().collect();
        chapters.sort_by(|a, b| a.name().cmp(b.name()));
        chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// One narrator per chapter that has a start point, sorted by name.
    /// Chapters without one are only reachable through `next_event`.
    pub fn entry_narrators(&self) -> Vec<ScriptedNarrator> {
        self.chapters()
            .into_iter()
            .filter(|chapter| chapter.start_point().is_some())
            .filter_map(|chapter| ScriptedNarrator::new(chapter.clone()).ok())
            .collect()
    }

    /// A fresh narrator owning its own copy of the referenced chapter.
    pub fn narrator_for(&self, reference: &ChapterRef) -> Result<ScriptedNarrator, StoryError> {
        let chapter = self
            .chapters
            .get(&reference.chapter)
            .ok_or_else(|| StoryError::UnknownChapter(reference.chapter.clone()))?;
        Ok(ScriptedNarrator::at(chapter.clone(), reference.entry.clone()))
    }
}

/// Call `loader` for each .ron file in `dir`, in file-name order.
fn load_ron_files_from_dir<F>(dir: &Path, mut loader: F) -> Result<(), StoryError>
where
    F: FnMut(&Path) -> Result<(), StoryError>,
{
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("ron") {
            paths.push(path);
        }
    }
    paths.sort();
    for path in paths {
        loader(&path)?;
    }
    Ok(())
}
