//! Emotion journal: face/voice classifier readings recorded per user, with
//! simple pattern analysis once enough entries exist.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Entries needed before patterns are reported.
pub const MIN_ENTRIES_FOR_PATTERNS: usize = 5;
const NO_DATA: &str = "No data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalSource {
    Face,
    Voice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub emotion: String,
    pub score: f32,
    #[serde(default)]
    pub note: Option<String>,
    pub source: JournalSource,
    /// Client-local time when supplied; server time otherwise.
    #[serde(default)]
    pub timestamp: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePatterns {
    pub morning: String,
    pub afternoon: String,
    pub evening: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalPatterns {
    pub most_common: Option<String>,
    pub time_patterns: TimePatterns,
}

struct UserLog {
    last_write: u64,
    entries: VecDeque<JournalEntry>,
}

#[derive(Default)]
struct Inner {
    clock: u64,
    users: HashMap<String, UserLog>,
}

/// In-memory journal keeping the most recent entries per user. Holds at
/// most `max_users` users; the one written least recently is dropped when
/// a new user arrives.
pub struct EmotionJournal {
    per_user_cap: usize,
    max_users: usize,
    inner: RwLock<Inner>,
}

impl EmotionJournal {
    pub fn new(per_user_cap: usize, max_users: usize) -> Self {
        Self {
            per_user_cap: per_user_cap.max(1),
            max_users: max_users.max(1),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Record an entry, stamping it with the current time if unset.
    pub fn add(&self, user_id: &str, mut entry: JournalEntry) -> JournalEntry {
        if entry.timestamp.is_none() {
            entry.timestamp = Some(DateTime::<FixedOffset>::from(Utc::now()));
        }
        let mut inner = self.inner.write();
        inner.clock += 1;
        let now = inner.clock;

        if !inner.users.contains_key(user_id) && inner.users.len() >= self.max_users {
            let victim = inner
                .users
                .iter()
                .min_by_key(|(_, log)| log.last_write)
                .map(|(id, _)| id.clone());
            if let Some(id) = victim {
                inner.users.remove(&id);
                tracing::debug!(user_id = %id, "journal full, dropped least recent user");
            }
        }

        let log = inner
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| UserLog {
                last_write: now,
                entries: VecDeque::new(),
            });
        log.last_write = now;
        log.entries.push_back(entry.clone());
        while log.entries.len() > self.per_user_cap {
            log.entries.pop_front();
        }
        entry
    }

    pub fn entries(&self, user_id: &str) -> Vec<JournalEntry> {
        self.inner
            .read()
            .users
            .get(user_id)
            .map(|log| log.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of users with at least one entry.
    pub fn user_count(&self) -> usize {
        self.inner.read().users.len()
    }

    /// Patterns over a user's entries, once there are enough of them.
    pub fn patterns(&self, user_id: &str) -> Option<JournalPatterns> {
        analyze_patterns(&self.entries(user_id))
    }
}

/// Most common emotion overall (case-insensitive) and per time of day:
/// morning 05–11, afternoon 12–17, evening 18–23.
pub fn analyze_patterns(entries: &[JournalEntry]) -> Option<JournalPatterns> {
    if entries.len() < MIN_ENTRIES_FOR_PATTERNS {
        return None;
    }

    let lowered: Vec<String> = entries.iter().map(|e| e.emotion.to_lowercase()).collect();
    let most_common = most_frequent(lowered.iter().map(String::as_str)).map(str::to_string);

    let bucket = |lo: u32, hi: u32| -> String {
        let in_range = entries.iter().filter_map(|e| {
            let hour = e.timestamp?.hour();
            (lo..=hi).contains(&hour).then_some(e.emotion.as_str())
        });
        most_frequent(in_range)
            .map(str::to_string)
            .unwrap_or_else(|| NO_DATA.to_string())
    };

    Some(JournalPatterns {
        most_common,
        time_patterns: TimePatterns {
            morning: bucket(5, 11),
            afternoon: bucket(12, 17),
            evening: bucket(18, 23),
        },
    })
}

/// Highest count wins; ties go to the label seen first.
fn most_frequent<'a>(items: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        let c = counts.entry(item).or_insert(0);
        if *c == 0 {
            order.push(item);
        }
        *c += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for label in order {
        let n = counts[label];
        if best.map_or(true, |(_, b)| n > b) {
            best = Some((label, n));
        }
    }
    best.map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(emotion: &str, rfc3339: &str) -> JournalEntry {
        JournalEntry {
            emotion: emotion.into(),
            score: 0.8,
            note: None,
            source: JournalSource::Face,
            timestamp: Some(DateTime::parse_from_rfc3339(rfc3339).unwrap()),
        }
    }

    #[test]
    fn no_patterns_below_threshold() {
        let journal = EmotionJournal::new(30, 100);
        for _ in 0..4 {
            journal.add("u", at("happy", "2024-05-01T09:00:00+06:00"));
        }
        assert!(journal.patterns("u").is_none());
    }

    #[test]
    fn patterns_by_time_of_day() {
        let entries = vec![
            at("Sad", "2024-05-01T08:00:00+06:00"),
            at("sad", "2024-05-01T09:00:00+06:00"),
            at("happy", "2024-05-01T13:00:00+06:00"),
            at("calm", "2024-05-01T19:00:00+06:00"),
            at("calm", "2024-05-01T20:00:00+06:00"),
            at("sad", "2024-05-01T02:00:00+06:00"),
        ];
        let p = analyze_patterns(&entries).unwrap();
        assert_eq!(p.most_common.as_deref(), Some("sad"));
        assert_eq!(p.time_patterns.morning, "sad");
        assert_eq!(p.time_patterns.afternoon, "happy");
        assert_eq!(p.time_patterns.evening, "calm");
    }

    #[test]
    fn empty_bucket_reports_no_data() {
        let entries: Vec<_> = (0..5)
            .map(|_| at("tired", "2024-05-01T07:00:00+00:00"))
            .collect();
        let p = analyze_patterns(&entries).unwrap();
        assert_eq!(p.time_patterns.afternoon, "No data");
        assert_eq!(p.time_patterns.evening, "No data");
    }

    #[test]
    fn keeps_only_most_recent_entries() {
        let journal = EmotionJournal::new(30, 100);
        for i in 0..35 {
            journal.add("u", at(&format!("e{i}"), "2024-05-01T09:00:00+00:00"));
        }
        let entries = journal.entries("u");
        assert_eq!(entries.len(), 30);
        assert_eq!(entries[0].emotion, "e5");
        assert!(journal.entries("other").is_empty());
    }

    #[test]
    fn least_recently_written_user_is_dropped_when_full() {
        let journal = EmotionJournal::new(30, 2);
        journal.add("a", at("calm", "2024-05-01T09:00:00+00:00"));
        journal.add("b", at("sad", "2024-05-01T09:00:00+00:00"));
        journal.add("a", at("happy", "2024-05-01T10:00:00+00:00"));
        journal.add("c", at("tired", "2024-05-01T11:00:00+00:00"));

        assert_eq!(journal.user_count(), 2);
        assert!(journal.entries("b").is_empty());
        assert_eq!(journal.entries("a").len(), 2);
        assert_eq!(journal.entries("c").len(), 1);
    }

    #[test]
    fn add_stamps_missing_timestamp() {
        let journal = EmotionJournal::new(5, 100);
        let stored = journal.add(
            "u",
            JournalEntry {
                emotion: "happy".into(),
                score: 0.5,
                note: Some("after lunch".into()),
                source: JournalSource::Voice,
                timestamp: None,
            },
        );
        assert!(stored.timestamp.is_some());
    }
}
