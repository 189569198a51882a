//! Snapshot transforms over [UserData]. Every operation leaves its input untouched and returns a
//! complete new value, ready to be written through to storage as one unit.

use std::collections::BTreeMap;

use chrono::{NaiveDate, SecondsFormat};
use tracing::warn;

use crate::utils::clock::Clock;

use super::entities::{DailyEntry, DayRecord, Improvement, ImprovementKind, RecordPatch, Source, UserData};

/// Caller-provided fields of a new [Improvement]. Identity and timestamp are minted here.
#[derive(Debug, Clone)]
pub struct ImprovementDraft {
    pub text: String,
    pub kind: ImprovementKind,
    pub source: Source,
}

impl UserData {
    /// Appends a new improvement with a freshly minted id. Blank text is a no-op, the caller is
    /// expected to reject it before getting here.
    pub fn add_improvement(&self, draft: ImprovementDraft, clock: &impl Clock) -> UserData {
        let text = draft.text.trim();
        if text.is_empty() {
            warn!("Ignoring improvement with blank text");
            return self.clone();
        }
        let id = mint_token(clock, |token| {
            self.improvements.iter().any(|v| v.id == token)
        });
        let mut next = self.clone();
        next.improvements.push(Improvement {
            id,
            text: text.to_string(),
            kind: draft.kind,
            source: draft.source,
            created_at: clock.now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });
        next
    }

    /// Replaces the text of the matching improvement. Everything else stays as is, an unknown id
    /// is a no-op.
    pub fn edit_improvement_text(&self, id: &str, text: &str) -> UserData {
        let mut next = self.clone();
        match next.improvements.iter_mut().find(|v| v.id == id) {
            Some(improvement) => improvement.text = text.to_string(),
            None => warn!("Attempt to edit unknown improvement {id}"),
        }
        next
    }

    /// Removes the improvement and sweeps its id out of every daily entry's record map. Both
    /// removals land in the same returned snapshot, so no entry can keep a dangling reference.
    pub fn delete_improvement(&self, id: &str) -> UserData {
        if !self.improvements.iter().any(|v| v.id == id) {
            warn!("Attempt to delete unknown improvement {id}");
            return self.clone();
        }
        let mut next = self.clone();
        next.improvements.retain(|v| v.id != id);
        for entry in &mut next.daily_entries {
            entry.improvements.remove(id);
        }
        next
    }

    /// Merges `patch` into the record for `(date, improvement_id)`, creating the daily entry
    /// lazily on first use. A second upsert for the same date always lands in the existing entry.
    /// Unknown improvement ids and patches for the wrong kind of area are no-ops.
    pub fn upsert_daily_record(
        &self,
        date: NaiveDate,
        improvement_id: &str,
        patch: RecordPatch,
        clock: &impl Clock,
    ) -> UserData {
        let Some(improvement) = self.improvements.iter().find(|v| v.id == improvement_id) else {
            warn!("Attempt to record against unknown improvement {improvement_id}");
            return self.clone();
        };
        if patch.kind() != improvement.kind {
            warn!(
                "Ignoring {} record for {} area {improvement_id}",
                patch.kind(),
                improvement.kind
            );
            return self.clone();
        }

        let mut next = self.clone();
        if let Some(index) = next.daily_entries.iter().position(|v| v.date == date) {
            next.daily_entries[index]
                .improvements
                .entry(improvement_id.to_string())
                .or_default()
                .apply(patch);
        } else {
            let id = mint_token(clock, |token| {
                next.daily_entries.iter().any(|v| v.id == token)
            });
            let mut record = DayRecord::default();
            record.apply(patch);
            let mut improvements = BTreeMap::new();
            improvements.insert(improvement_id.to_string(), record);
            next.daily_entries.push(DailyEntry {
                id,
                date,
                improvements,
            });
        }
        next
    }
}

/// Millisecond timestamp token, bumped past collisions so that two mints inside the same
/// millisecond stay unique within their collection.
fn mint_token(clock: &impl Clock, taken: impl Fn(&str) -> bool) -> String {
    let mut candidate = clock.now().timestamp_millis();
    loop {
        let token = candidate.to_string();
        if !taken(&token) {
            return token;
        }
        candidate += 1;
    }
}
