use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A grammar correction extracted from a model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// The user text being corrected
    pub original_utterance: String,
    /// The corrected sentence. May be empty when the model emitted a bare marker.
    pub corrected_text: String,
    pub reason: String,
    /// Absent and empty are different: absent means no example section at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Ledger entry: a correction plus its own identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub correction: Correction,
}

impl CorrectionRecord {
    pub fn new(correction: Correction) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            correction,
        }
    }
}

/// Session-wide, append-only list of corrections. Repeated mistakes are kept
/// as repeated entries; the report relies on seeing them.
#[derive(Debug, Clone, Default)]
pub struct CorrectionLedger {
    records: Vec<CorrectionRecord>,
}

impl CorrectionLedger {
    /// Returns the new ledger length.
    pub fn append(&mut self, record: CorrectionRecord) -> usize {
        self.records.push(record);
        self.records.len()
    }

    /// Oldest first.
    pub fn snapshot(&self) -> &[CorrectionRecord] {
        &self.records
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &CorrectionRecord> {
        self.records.iter().rev()
    }

    /// 1-based position in the newest-first view.
    pub fn nth_newest(&self, position: usize) -> Option<&CorrectionRecord> {
        position
            .checked_sub(1)
            .and_then(|index| self.newest_first().nth(index))
    }

    pub fn get(&self, id: Uuid) -> Option<&CorrectionRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(corrected: &str) -> CorrectionRecord {
        CorrectionRecord::new(Correction {
            original_utterance: "I has a cat".to_string(),
            corrected_text: corrected.to_string(),
            reason: "Agreement.".to_string(),
            example: None,
        })
    }

    #[test]
    fn append_reports_length_and_keeps_duplicates() {
        let mut ledger = CorrectionLedger::default();
        assert_eq!(ledger.append(record("I have a cat")), 1);
        assert_eq!(ledger.append(record("I have a cat")), 2);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn views_are_ordered_both_ways() {
        let mut ledger = CorrectionLedger::default();
        ledger.append(record("first"));
        ledger.append(record("second"));
        ledger.append(record("third"));

        let oldest: Vec<_> = ledger
            .snapshot()
            .iter()
            .map(|r| r.correction.corrected_text.as_str())
            .collect();
        let newest: Vec<_> = ledger
            .newest_first()
            .map(|r| r.correction.corrected_text.as_str())
            .collect();

        assert_eq!(oldest, vec!["first", "second", "third"]);
        assert_eq!(newest, vec!["third", "second", "first"]);
    }

    #[test]
    fn nth_newest_is_one_based() {
        let mut ledger = CorrectionLedger::default();
        ledger.append(record("first"));
        ledger.append(record("second"));

        assert!(ledger.nth_newest(0).is_none());
        assert_eq!(ledger.nth_newest(1).unwrap().correction.corrected_text, "second");
        assert_eq!(ledger.nth_newest(2).unwrap().correction.corrected_text, "first");
        assert!(ledger.nth_newest(3).is_none());
    }

    #[test]
    fn get_finds_records_by_id() {
        let mut ledger = CorrectionLedger::default();
        let kept = record("first");
        let id = kept.id;
        ledger.append(kept);
        ledger.append(record("second"));

        assert_eq!(ledger.get(id).unwrap().correction.corrected_text, "first");
        ledger.clear();
        assert!(ledger.get(id).is_none());
    }

    #[test]
    fn clear_after_many_appends_leaves_nothing() {
        let mut ledger = CorrectionLedger::default();
        for i in 0..25 {
            ledger.append(record(&format!("fix {i}")));
        }
        ledger.clear();
        assert_eq!(ledger.len(), 0);
        assert!(ledger.snapshot().is_empty());
    }

    #[test]
    fn record_serializes_flat_and_omits_absent_example() {
        let json = serde_json::to_value(record("I have a cat")).unwrap();
        assert_eq!(json["corrected_text"], "I have a cat");
        assert!(json.get("example").is_none());
        assert!(json.get("id").is_some());
    }
}
