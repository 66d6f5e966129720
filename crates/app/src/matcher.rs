//! Matching engine — resolves a chat message against the trigger set.

use chatbuzz_domain::trigger::{Intensity, Trigger};
use chatbuzz_domain::trigger_set::TriggerSet;

/// Resolve the intensity to send for `message`, or `None` when no trigger
/// matches.
///
/// Every trigger whose pattern appears in the message (case-sensitive
/// containment) is a candidate; the result is the **maximum** intensity
/// among them — not the first match, not insertion priority. Since the set
/// iterates ascending by intensity, the first hit of a descending walk is
/// that maximum.
///
/// This is an O(n·m) scan, fine for the expected trigger counts (tens).
#[must_use]
pub fn resolve(message: &str, triggers: &TriggerSet) -> Option<Intensity> {
    triggers
        .iter()
        .rev()
        .find(|trigger| trigger.matches(message))
        .map(Trigger::intensity)
}
