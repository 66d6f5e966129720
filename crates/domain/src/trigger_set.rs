//! Trigger set — the ordered, intensity-unique collection of triggers.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::error::TriggerSetError;
use crate::trigger::Trigger;

/// An ordered set of [`Trigger`]s, ascending by intensity.
///
/// Because trigger equality keys on intensity, the set holds at most one
/// trigger per intensity value. Listing indices always refer to positions in
/// the intensity-ascending order, never to insertion order.
#[derive(Debug, Clone, Default)]
pub struct TriggerSet {
    inner: BTreeSet<Trigger>,
}

/// Outcome of merging persisted lines into a [`TriggerSet`].
///
/// Duplicates and skipped lines are informational, not fatal.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Triggers newly inserted.
    pub added: usize,
    /// Parsed triggers rejected because an equal intensity was already present.
    pub duplicates: Vec<Trigger>,
    /// Non-empty lines that did not parse as triggers.
    pub skipped: usize,
}

impl TriggerSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a trigger.
    ///
    /// Returns `false` when a trigger with equal intensity is already
    /// present; the original is left unchanged.
    pub fn add(&mut self, trigger: Trigger) -> bool {
        self.inner.insert(trigger)
    }

    /// Remove the trigger at `index` in the intensity-ascending listing.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerSetError::IndexOutOfRange`] when `index >= len`; the
    /// set is left unchanged.
    pub fn remove(&mut self, index: usize) -> Result<Trigger, TriggerSetError> {
        let trigger = self
            .inner
            .iter()
            .nth(index)
            .cloned()
            .ok_or(TriggerSetError::IndexOutOfRange {
                index,
                len: self.inner.len(),
            })?;
        self.inner.remove(&trigger);
        Ok(trigger)
    }

    /// Iterate over triggers, ascending by intensity.
    ///
    /// The iterator is double-ended, so `iter().rev()` walks intensities
    /// descending.
    pub fn iter(&self) -> std::collections::btree_set::Iter<'_, Trigger> {
        self.inner.iter()
    }

    /// Number of stored triggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Render the persisted form: one `"<intensity> <pattern>"` line per
    /// trigger, `\n`-separated, ascending by intensity.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (i, trigger) in self.inner.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = write!(out, "{}", trigger.to_config_line());
        }
        out
    }

    /// Parse `text` line by line and merge the result into this set.
    ///
    /// Lines that do not parse as triggers are skipped (blank lines
    /// silently, other unparseable lines counted in the report). Parsed
    /// triggers whose intensity is already taken are collected as
    /// duplicates; the existing trigger wins.
    pub fn merge_from_str(&mut self, text: &str) -> LoadReport {
        let mut report = LoadReport::default();
        for line in text.lines() {
            match Trigger::parse_config_line(line) {
                Some(trigger) => {
                    if self.add(trigger.clone()) {
                        report.added += 1;
                    } else {
                        report.duplicates.push(trigger);
                    }
                }
                None => {
                    if !line.trim().is_empty() {
                        report.skipped += 1;
                    }
                }
            }
        }
        report
    }
}

impl<'a> IntoIterator for &'a TriggerSet {
    type Item = &'a Trigger;
    type IntoIter = std::collections::btree_set::Iter<'a, Trigger>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
