/// Player status — bounded attributes and the death condition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("status '{0}' doesn't exist")]
    UnknownStatus(String),
}

/// The fixed set of tracked statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Health,
    Mental,
    Money,
}

impl StatusKind {
    pub const ALL: [StatusKind; 3] = [Self::Health, Self::Mental, Self::Money];

    /// Key used in story files and oracle payloads.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Mental => "mental",
            Self::Money => "money",
        }
    }

    /// Health and mental end the game when they bottom out.
    pub fn is_life(&self) -> bool {
        matches!(self, Self::Health | Self::Mental)
    }

    fn index(&self) -> usize {
        match self {
            Self::Health => 0,
            Self::Mental => 1,
            Self::Money => 2,
        }
    }
}

impl FromStr for StatusKind {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "health" => Ok(Self::Health),
            "mental" => Ok(Self::Mental),
            "money" => Ok(Self::Money),
            other => Err(StatusError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named integer clamped to `[min, max]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    name: String,
    value: i32,
    max: i32,
    min: i32,
}

impl Status {
    pub const DEFAULT_INITIAL: i32 = 3;
    pub const DEFAULT_MAX: i32 = 4;
    pub const DEFAULT_MIN: i32 = 0;

    /// Create a status. The initial value is clamped into range.
    pub fn new(name: impl Into<String>, initial: i32, max: i32, min: i32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            name: name.into(),
            value: initial.clamp(min, max),
            max,
            min,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn add(&mut self, delta: i32) {
        self.value = self.value.saturating_add(delta).clamp(self.min, self.max);
    }

    pub fn subtract(&mut self, delta: i32) {
        self.value = self.value.saturating_sub(delta).clamp(self.min, self.max);
    }

    pub fn set_to_max(&mut self) {
        self.value = self.max;
    }

    pub fn set_to_min(&mut self) {
        self.value = self.min;
    }

    pub fn is_at_min(&self) -> bool {
        self.value == self.min
    }
}

/// Owns the health, mental and money statuses for one playthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusManager {
    statuses: [Status; 3],
}

impl Default for StatusManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusManager {
    pub fn new() -> Self {
        let make = |kind: StatusKind| {
            Status::new(
                kind.name(),
                Status::DEFAULT_INITIAL,
                Status::DEFAULT_MAX,
                Status::DEFAULT_MIN,
            )
        };
        Self {
            statuses: StatusKind::ALL.map(make),
        }
    }

    /// Replace one status, keeping the kind's canonical name.
    pub fn with_status(mut self, kind: StatusKind, initial: i32, max: i32, min: i32) -> Self {
        self.statuses[kind.index()] = Status::new(kind.name(), initial, max, min);
        self
    }

    pub fn get(&self, kind: StatusKind) -> &Status {
        &self.statuses[kind.index()]
    }

    /// Look a status up by its story-file name.
    pub fn status(&self, name: &str) -> Result<&Status, StatusError> {
        let kind: StatusKind = name.parse()?;
        Ok(self.get(kind))
    }

    pub fn add(&mut self, name: &str, delta: i32) -> Result<(), StatusError> {
        let kind: StatusKind = name.parse()?;
        self.statuses[kind.index()].add(delta);
        Ok(())
    }

    pub fn subtract(&mut self, name: &str, delta: i32) -> Result<(), StatusError> {
        let kind: StatusKind = name.parse()?;
        self.statuses[kind.index()].subtract(delta);
        Ok(())
    }

    pub fn apply(&mut self, kind: StatusKind, delta: i32) {
        self.statuses[kind.index()].add(delta);
    }

    /// True once any life status sits at its minimum.
    pub fn is_dead(&self) -> bool {
        StatusKind::ALL
            .iter()
            .filter(|kind| kind.is_life())
            .any(|kind| self.get(*kind).is_at_min())
    }
}

impl fmt::Display for StatusManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Status: health {} / mental {} / money {}",
            self.get(StatusKind::Health).value(),
            self.get(StatusKind::Mental).value(),
            self.get(StatusKind::Money).value(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults() {
        let manager = StatusManager::new();
        for kind in StatusKind::ALL {
            let status = manager.get(kind);
            assert_eq!(status.value(), 3);
            assert_eq!(status.max(), 4);
            assert_eq!(status.min(), 0);
            assert_eq!(status.name(), kind.name());
        }
        assert!(!manager.is_dead());
    }

    #[test]
    fn add_clamps_to_max() {
        let mut status = Status::new("health", 3, 4, 0);
        status.add(10);
        assert_eq!(status.value(), 4);
        status.add(i32::MAX);
        assert_eq!(status.value(), 4);
    }

    #[test]
    fn subtract_clamps_to_min() {
        let mut status = Status::new("health", 3, 4, 0);
        status.subtract(10);
        assert_eq!(status.value(), 0);
        status.subtract(i32::MAX);
        assert_eq!(status.value(), 0);
    }

    #[test]
    fn negative_deltas_flip_direction() {
        let mut status = Status::new("money", 2, 4, 0);
        status.add(-1);
        assert_eq!(status.value(), 1);
        status.subtract(-2);
        assert_eq!(status.value(), 3);
    }

    #[test]
    fn value_stays_in_range_for_any_sequence() {
        let mut status = Status::new("mental", 3, 4, 0);
        let deltas = [5, -7, 2, -1, 3, -3, 9, -12, 1, 0, -2];
        for (i, delta) in deltas.iter().enumerate() {
            if i % 2 == 0 {
                status.add(*delta);
            } else {
                status.subtract(*delta);
            }
            assert!(status.value() >= status.min() && status.value() <= status.max());
        }
    }

    #[test]
    fn new_clamps_initial_value() {
        assert_eq!(Status::new("health", 9, 4, 0).value(), 4);
        assert_eq!(Status::new("health", -3, 4, 0).value(), 0);
    }

    #[test]
    fn set_to_bounds() {
        let mut status = Status::new("money", 2, 4, 0);
        status.set_to_max();
        assert_eq!(status.value(), 4);
        status.set_to_min();
        assert_eq!(status.value(), 0);
        assert!(status.is_at_min());
    }

    #[test]
    fn unknown_status_name_fails() {
        let mut manager = StatusManager::new();
        assert_eq!(
            manager.add("luck", 1),
            Err(StatusError::UnknownStatus("luck".to_string()))
        );
        assert!(manager.subtract("stamina", 1).is_err());
        assert!(manager.status("charisma").is_err());
        assert_eq!(manager, StatusManager::new());
    }

    #[test]
    fn health_reaching_min_is_death() {
        let mut manager = StatusManager::new();
        manager.subtract("health", 1).unwrap();
        assert!(!manager.is_dead());
        manager.subtract("health", 1).unwrap();
        assert!(!manager.is_dead());
        manager.subtract("health", 1).unwrap();
        assert_eq!(manager.get(StatusKind::Health).value(), 0);
        assert!(manager.is_dead());
        manager.subtract("health", 1).unwrap();
        assert_eq!(manager.get(StatusKind::Health).value(), 0);
        assert!(manager.is_dead());
    }

    #[test]
    fn mental_reaching_min_is_death() {
        let mut manager = StatusManager::new();
        manager.add("mental", -3).unwrap();
        assert!(manager.is_dead());
    }

    #[test]
    fn money_at_min_is_not_death() {
        let mut manager = StatusManager::new();
        manager.subtract("money", 5).unwrap();
        assert_eq!(manager.get(StatusKind::Money).value(), 0);
        assert!(!manager.is_dead());
    }

    #[test]
    fn custom_bounds_drive_death_threshold() {
        let mut manager = StatusManager::new().with_status(StatusKind::Health, 5, 10, 2);
        manager.subtract("health", 2).unwrap();
        assert!(!manager.is_dead());
        manager.subtract("health", 1).unwrap();
        assert_eq!(manager.get(StatusKind::Health).value(), 2);
        assert!(manager.is_dead());
    }

    #[test]
    fn status_kind_round_trips_names() {
        for kind in StatusKind::ALL {
            assert_eq!(kind.name().parse::<StatusKind>().unwrap(), kind);
        }
        assert!(StatusKind::Health.is_life());
        assert!(StatusKind::Mental.is_life());
        assert!(!StatusKind::Money.is_life());
    }

    #[test]
    fn display_lists_all_values() {
        let manager = StatusManager::new().with_status(StatusKind::Money, 1, 4, 0);
        assert_eq!(
            manager.to_string(),
            "Status: health 3 / mental 3 / money 1"
        );
    }
}
