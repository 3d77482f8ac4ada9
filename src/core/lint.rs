/// Story linter — static checks over a loaded chapter library.

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

use crate::core::library::ChapterLibrary;
use crate::schema::chapter::Chapter;
use crate::schema::status::StatusKind;
use crate::schema::story::{ChapterRef, StoryId, Transition};

/// Problems found in a library. Errors break play; warnings are content smells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl fmt::Display for LintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.warnings {
            writeln!(f, "WARNING: {warning}")?;
        }
        for error in &self.errors {
            writeln!(f, "ERROR: {error}")?;
        }
        write!(
            f,
            "Summary: {} errors, {} warnings",
            self.errors.len(),
            self.warnings.len()
        )
    }
}

pub fn lint_library(library: &ChapterLibrary) -> LintReport {
    let mut report = LintReport::default();

    // Entry points reached from other chapters, keyed by chapter name.
    let mut chained: FxHashMap<String, Vec<StoryId>> = FxHashMap::default();

    for chapter in library.chapters() {
        for story in chapter.stories() {
            let at = format!("{}:{}", chapter.name(), story.id);

            for name in story.affect_status.keys() {
                if name.parse::<StatusKind>().is_err() {
                    report
                        .errors
                        .push(format!("{at} affects unknown status '{name}'"));
                }
            }

            match &story.transition {
                Transition::End => {}
                Transition::Goto(target) => {
                    if !chapter.contains(target) {
                        report
                            .errors
                            .push(format!("{at} goes to missing story {target}"));
                    }
                }
                Transition::Choice(options) => {
                    for option in options {
                        if !chapter.contains(&option.goto) {
                            report.errors.push(format!(
                                "{at} option '{}' goes to missing story {}",
                                option.description, option.goto
                            ));
                        }
                        for name in option.status_condition.keys() {
                            if name.parse::<StatusKind>().is_err() {
                                report.errors.push(format!(
                                    "{at} option '{}' is conditioned on unknown status '{name}'",
                                    option.description
                                ));
                            }
                        }
                    }
                    if options.iter().all(|option| !option.visible) {
                        report.warnings.push(format!(
                            "{at} hides every option; only freeform input can leave it"
                        ));
                    }
                }
                Transition::NextEvent(raw) => match ChapterRef::parse(raw) {
                    Err(e) => report.errors.push(format!("{at} {e}")),
                    Ok(reference) => match library.get(&reference.chapter) {
                        None => report.errors.push(format!(
                            "{at} chains to unknown chapter '{}'",
                            reference.chapter
                        )),
                        Some(target) if !target.contains(&reference.entry) => {
                            report.errors.push(format!(
                                "{at} chains to missing story {reference}"
                            ))
                        }
                        Some(_) => chained
                            .entry(reference.chapter)
                            .or_default()
                            .push(reference.entry),
                    },
                },
            }
        }
    }

    for chapter in library.chapters() {
        let mut roots: Vec<StoryId> = chained.get(chapter.name()).cloned().unwrap_or_default();
        if let Some(start) = chapter.start_point() {
            roots.push(start.clone());
        }
        if roots.is_empty() {
            report.warnings.push(format!(
                "{} has no start point and no chapter chains to it",
                chapter.name()
            ));
            continue;
        }

        let reached = reachable(chapter, roots);
        for story in chapter.stories() {
            if !reached.contains(&story.id) {
                report.warnings.push(format!(
                    "{}:{} is unreachable",
                    chapter.name(),
                    story.id
                ));
            }
        }
    }

    report
}

fn reachable(chapter: &Chapter, roots: Vec<StoryId>) -> FxHashSet<StoryId> {
    let mut seen = FxHashSet::default();
    let mut stack = roots;
    while let Some(id) = stack.pop() {
        if !seen.insert(id.clone()) {
            continue;
        }
        let Ok(story) = chapter.get(&id) else {
            continue;
        };
        match &story.transition {
            Transition::Goto(next) => stack.push(next.clone()),
            Transition::Choice(options) => {
                stack.extend(options.iter().map(|option| option.goto.clone()))
            }
            Transition::End | Transition::NextEvent(_) => {}
        }
    }
    seen
}
