/// Session driver — owns the narrator pool, the day counter and the
/// player's status for one playthrough.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::core::io::{Line, PlayerIo};
use crate::core::library::ChapterLibrary;
use crate::core::narrator::{Narrator, NarratorError, PlayContext};
use crate::core::oracle::Oracle;
use crate::schema::status::StatusManager;

/// Knobs threaded through every narrator invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Seed for shuffling, pool insertion and encounter tone. Entropy when unset.
    pub seed: Option<u64>,
    /// Show oracle decisions to the player.
    pub debug: bool,
    /// Probability that an encounter round asks for a twist outcome.
    pub twist_chance: f64,
    /// Encounter rounds played before the oracle is asked to wrap up.
    pub closure_after_rounds: u32,
}

impl SessionConfig {
    /// `twist_chance` as a valid probability. NaN counts as never.
    pub fn twist_probability(&self) -> f64 {
        if self.twist_chance.is_nan() {
            0.0
        } else {
            self.twist_chance.clamp(0.0, 1.0)
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            debug: false,
            twist_chance: 0.3,
            closure_after_rounds: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The pool ran dry with the player alive.
    Survived { days: u32 },
    /// A life status bottomed out on this day.
    Died { day: u32 },
}

pub struct Session {
    pool: Vec<Narrator>,
    status: StatusManager,
    rng: StdRng,
    config: SessionConfig,
    day: u32,
}

/// Builder for constructing a `Session`.
pub struct SessionBuilder {
    narrators: Vec<Narrator>,
    status: Option<StatusManager>,
    config: SessionConfig,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder {
            narrators: Vec::new(),
            status: None,
            config: SessionConfig::default(),
        }
    }

    pub fn status(&self) -> &StatusManager {
        &self.status
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The day about to be played, or the last day played once finished.
    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    /// Play narrators until the player dies or the pool is empty.
    pub fn run(
        &mut self,
        oracle: &dyn Oracle,
        io: &mut dyn PlayerIo,
        library: &ChapterLibrary,
    ) -> Result<SessionOutcome, NarratorError> {
        while !self.pool.is_empty() {
            let narrator = self.pool.remove(0);
            io.show(Line::Day(self.day));
            info!(day = self.day, narrator = %narrator.label(), "starting day");

            let next = {
                let mut ctx = PlayContext {
                    oracle,
                    io: &mut *io,
                    library,
                    rng: &mut self.rng,
                    config: &self.config,
                };
                narrator.play(&mut self.status, &mut ctx)?
            };

            if self.status.is_dead() {
                info!(day = self.day, "player died");
                return Ok(SessionOutcome::Died { day: self.day });
            }

            if let Some(next) = next {
                let index = if self.pool.is_empty() {
                    0
                } else {
                    self.rng.gen_range(0..self.pool.len())
                };
                self.pool.insert(index, next);
            }
            self.day += 1;
        }

        let days = self.day - 1;
        info!(days, "player survived");
        Ok(SessionOutcome::Survived { days })
    }
}

impl SessionBuilder {
    pub fn narrator(mut self, narrator: impl Into<Narrator>) -> Self {
        self.narrators.push(narrator.into());
        self
    }

    pub fn narrators<I, N>(mut self, narrators: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Narrator>,
    {
        self.narrators.extend(narrators.into_iter().map(Into::into));
        self
    }

    pub fn status(mut self, status: StatusManager) -> Self {
        self.status = Some(status);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Clamped into `[0, 1]`.
    pub fn twist_chance(mut self, chance: f64) -> Self {
        self.config.twist_chance = chance;
        self.config.twist_chance = self.config.twist_probability();
        self
    }

    pub fn closure_after_rounds(mut self, rounds: u32) -> Self {
        self.config.closure_after_rounds = rounds;
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        let chance = config.twist_chance;
        self.config = config;
        self.twist_chance(chance)
    }

    /// Shuffle the pool and start on day 1.
    pub fn build(self) -> Session {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut pool = self.narrators;
        pool.shuffle(&mut rng);

        Session {
            pool,
            status: self.status.unwrap_or_default(),
            rng,
            config: self.config,
            day: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::freeform::FreeformNarrator;
    use crate::core::io::ScriptedIo;
    use crate::core::oracle::MockOracle;
    use crate::core::scripted::ScriptedNarrator;
    use crate::schema::chapter::Chapter;
    use crate::schema::status::StatusKind;

    fn chapter(name: &str, body: &str) -> Chapter {
        Chapter::parse_ron(name, body).unwrap()
    }

    fn scripted(name: &str, body: &str) -> ScriptedNarrator {
        ScriptedNarrator::new(chapter(name, body)).unwrap()
    }

    fn days(io: &ScriptedIo) -> Vec<u32> {
        io.transcript
            .iter()
            .filter_map(|line| match line {
                Line::Day(day) => Some(*day),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_pool_survives_immediately() {
        let mut session = Session::builder().seed(1).build();
        let mut io = ScriptedIo::default();
        let outcome = session
            .run(&MockOracle::new(), &mut io, &ChapterLibrary::new())
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Survived { days: 0 });
        assert!(io.transcript.is_empty());
    }

    #[test]
    fn plays_every_narrator_once() {
        let mut session = Session::builder()
            .seed(9)
            .narrator(scripted("a.ron", r#"[(id: 1, description: "a", start_point: true)]"#))
            .narrator(scripted("b.ron", r#"[(id: 1, description: "b", start_point: true)]"#))
            .narrator(scripted("c.ron", r#"[(id: 1, description: "c", start_point: true)]"#))
            .build();
        assert_eq!(session.remaining(), 3);

        let mut io = ScriptedIo::default();
        let outcome = session
            .run(&MockOracle::new(), &mut io, &ChapterLibrary::new())
            .unwrap();

        assert_eq!(outcome, SessionOutcome::Survived { days: 3 });
        assert_eq!(days(&io), vec![1, 2, 3]);
        let mut seen = io.narrations();
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c"]);
        assert_eq!(session.remaining(), 0);
    }

    #[test]
    fn death_ends_session_before_next_narrator() {
        let lethal = r#"[(id: 1, description: "lethal", start_point: true, affect_status: {"health": -9})]"#;
        let harmless = r#"[(id: 1, description: "harmless", start_point: true)]"#;

        // Whichever order the shuffle picks, the lethal chapter must end the run.
        for seed in 0..8 {
            let mut session = Session::builder()
                .seed(seed)
                .narrator(scripted("lethal.ron", lethal))
                .narrator(scripted("harmless.ron", harmless))
                .build();
            let mut io = ScriptedIo::default();
            let outcome = session
                .run(&MockOracle::new(), &mut io, &ChapterLibrary::new())
                .unwrap();

            let narrations = io.narrations();
            let day = narrations.iter().position(|n| *n == "lethal").unwrap() as u32 + 1;
            assert_eq!(outcome, SessionOutcome::Died { day });
            assert_eq!(narrations.last(), Some(&"lethal"));
            assert!(session.status().is_dead());
        }
    }

    #[test]
    fn follow_up_narrator_is_requeued() {
        let library = ChapterLibrary::new().with_chapter(chapter(
            "two.ron",
            r#"[(id: 1, description: "unused"), (id: 2, description: "chapter two")]"#,
        ));
        let mut session = Session::builder()
            .seed(4)
            .narrator(scripted(
                "one.ron",
                r#"[(id: 1, description: "chapter one", start_point: true, next_event: "two.ron:2")]"#,
            ))
            .build();
        let mut io = ScriptedIo::default();

        let outcome = session.run(&MockOracle::new(), &mut io, &library).unwrap();

        assert_eq!(outcome, SessionOutcome::Survived { days: 2 });
        assert_eq!(io.narrations(), vec!["chapter one", "chapter two"]);
    }

    #[test]
    fn follow_up_never_lands_at_the_end() {
        let library = ChapterLibrary::new().with_chapter(chapter(
            "next.ron",
            r#"[(id: 1, description: "sequel")]"#,
        ));
        for seed in 0..16 {
            let mut session = Session::builder()
                .seed(seed)
                .narrator(scripted(
                    "first.ron",
                    r#"[(id: 1, description: "first", start_point: true, next_event: "next.ron:1")]"#,
                ))
                .narrator(scripted("other.ron", r#"[(id: 1, description: "other", start_point: true)]"#))
                .build();
            let mut io = ScriptedIo::default();
            session.run(&MockOracle::new(), &mut io, &library).unwrap();
            let narrations = io.narrations();
            if narrations[0] == "first" {
                assert_eq!(narrations, vec!["first", "sequel", "other"]);
            } else {
                assert_eq!(narrations, vec!["other", "first", "sequel"]);
            }
        }
    }

    #[test]
    fn same_seed_same_order() {
        let build = || {
            Session::builder()
                .seed(42)
                .narrators(
                    ["a", "b", "c", "d", "e"]
                        .iter()
                        .map(|n| {
                            scripted(
                                &format!("{n}.ron"),
                                &format!(r#"[(id: 1, description: "{n}", start_point: true)]"#),
                            )
                        })
                        .collect::<Vec<_>>(),
                )
                .build()
        };
        let order = |mut session: Session| {
            let mut io = ScriptedIo::default();
            session
                .run(&MockOracle::new(), &mut io, &ChapterLibrary::new())
                .unwrap();
            io.narrations()
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(order(build()), order(build()));
    }

    #[test]
    fn errors_propagate_out_of_run() {
        let mut session = Session::builder()
            .seed(0)
            .narrator(scripted(
                "a.ron",
                r#"[(id: 1, description: "a", start_point: true, goto: 2)]"#,
            ))
            .build();
        let mut io = ScriptedIo::default();
        let result = session.run(&MockOracle::new(), &mut io, &ChapterLibrary::new());
        assert!(matches!(result, Err(NarratorError::Story(_))));
    }

    #[test]
    fn twist_probability_is_always_valid() {
        let with = |twist_chance| SessionConfig {
            twist_chance,
            ..SessionConfig::default()
        };
        assert_eq!(with(0.3).twist_probability(), 0.3);
        assert_eq!(with(1.5).twist_probability(), 1.0);
        assert_eq!(with(-0.2).twist_probability(), 0.0);
        assert_eq!(with(f64::NAN).twist_probability(), 0.0);

        let session = Session::builder()
            .config(with(f64::NAN))
            .build();
        assert_eq!(session.config().twist_chance, 0.0);
    }

    #[test]
    fn builder_sets_config_and_status() {
        let session = Session::builder()
            .seed(5)
            .debug(true)
            .twist_chance(2.0)
            .closure_after_rounds(4)
            .status(StatusManager::new().with_status(StatusKind::Money, 0, 4, 0))
            .narrator(FreeformNarrator::new("rain", "it stops"))
            .build();
        assert_eq!(session.config().seed, Some(5));
        assert!(session.config().debug);
        assert_eq!(session.config().twist_chance, 1.0);
        assert_eq!(session.config().closure_after_rounds, 4);
        assert_eq!(session.status().get(StatusKind::Money).value(), 0);
        assert_eq!(session.day(), 1);
        assert_eq!(session.remaining(), 1);
    }
}
