//! Helpful / unhelpful ratings of assistant replies, kept in a bounded
//! in-memory log with simple analytics.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, FixedOffset};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Keywords counted in improvement suggestions, in reporting order for ties.
const THEME_KEYWORDS: &[&str] = &[
    "unclear",
    "confusing",
    "irrelevant",
    "wrong",
    "unhelpful",
    "incomplete",
    "specific",
    "detail",
    "emotion",
    "empathy",
    "address",
    "listen",
    "understand",
    "context",
    "more",
    "less",
];
const MAX_THEMES: usize = 10;

/// Clients send either a numeric or a string message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub user_id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub assistant_message: String,
    pub user_message: String,
    pub helpful: bool,
    #[serde(default)]
    pub improvement: Option<String>,
    #[serde(default)]
    pub message_id: Option<MessageId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total: usize,
    pub helpful_count: usize,
    pub unhelpful_count: usize,
    pub helpful_percentage: f64,
    pub unhelpful_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeCount {
    pub theme: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    /// Calendar date in the timestamp's own offset, `YYYY-MM-DD`.
    pub date: String,
    pub total: usize,
    pub helpful: usize,
    pub helpful_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAnalytics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub stats: FeedbackStats,
    pub common_improvement_themes: Vec<ThemeCount>,
    pub daily_stats: Vec<DailyStats>,
}

/// The most recent `capacity` feedback entries, oldest first.
pub struct FeedbackLog {
    capacity: usize,
    entries: RwLock<VecDeque<FeedbackEntry>>,
}

impl FeedbackLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(VecDeque::new()),
        }
    }

    pub fn submit(&self, entry: FeedbackEntry) {
        let mut entries = self.entries.write();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// The last `limit` entries; `0` means all of them.
    pub fn recent(&self, limit: usize) -> Vec<FeedbackEntry> {
        let entries = self.entries.read();
        let skip = if limit == 0 {
            0
        } else {
            entries.len().saturating_sub(limit)
        };
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn analytics(&self) -> FeedbackAnalytics {
        let entries: Vec<FeedbackEntry> = self.entries.read().iter().cloned().collect();
        analyze(&entries)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
}

/// Helpful ratio overall and per day, plus keyword themes from the
/// improvement notes of unhelpful ratings.
pub fn analyze(entries: &[FeedbackEntry]) -> FeedbackAnalytics {
    let total = entries.len();
    if total == 0 {
        return FeedbackAnalytics {
            message: Some("No feedback data available".into()),
            stats: FeedbackStats {
                total: 0,
                helpful_count: 0,
                unhelpful_count: 0,
                helpful_percentage: 0.0,
                unhelpful_percentage: 0.0,
            },
            common_improvement_themes: Vec::new(),
            daily_stats: Vec::new(),
        };
    }

    let helpful_count = entries.iter().filter(|e| e.helpful).count();
    let helpful_percentage = percent(helpful_count, total);

    // Count each keyword once per suggestion, remembering first appearance.
    let mut themes: Vec<ThemeCount> = Vec::new();
    let suggestions = entries
        .iter()
        .filter(|e| !e.helpful)
        .filter_map(|e| e.improvement.as_deref())
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    for suggestion in suggestions {
        for keyword in THEME_KEYWORDS.iter().filter(|k| suggestion.contains(**k)) {
            match themes.iter_mut().find(|t| t.theme == *keyword) {
                Some(t) => t.count += 1,
                None => themes.push(ThemeCount {
                    theme: keyword.to_string(),
                    count: 1,
                }),
            }
        }
    }
    themes.sort_by(|a, b| b.count.cmp(&a.count));
    themes.truncate(MAX_THEMES);

    let mut days: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for e in entries {
        let day = days
            .entry(e.timestamp.date_naive().format("%Y-%m-%d").to_string())
            .or_default();
        day.0 += 1;
        if e.helpful {
            day.1 += 1;
        }
    }
    let daily_stats = days
        .into_iter()
        .map(|(date, (total, helpful))| DailyStats {
            date,
            total,
            helpful,
            helpful_percentage: percent(helpful, total),
        })
        .collect();

    FeedbackAnalytics {
        message: None,
        stats: FeedbackStats {
            total,
            helpful_count,
            unhelpful_count: total - helpful_count,
            helpful_percentage,
            unhelpful_percentage: ((100.0 - helpful_percentage) * 100.0).round() / 100.0,
        },
        common_improvement_themes: themes,
        daily_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(helpful: bool, improvement: Option<&str>, ts: &str) -> FeedbackEntry {
        FeedbackEntry {
            user_id: "u".into(),
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap(),
            assistant_message: "reply".into(),
            user_message: "msg".into(),
            helpful,
            improvement: improvement.map(String::from),
            message_id: None,
        }
    }

    #[test]
    fn keeps_the_most_recent_entries() {
        let log = FeedbackLog::new(100);
        for i in 0..105 {
            let mut e = rating(true, None, "2024-05-01T09:00:00+06:00");
            e.message_id = Some(MessageId::Number(i));
            log.submit(e);
        }
        assert_eq!(log.len(), 100);
        let all = log.recent(0);
        assert_eq!(all[0].message_id, Some(MessageId::Number(5)));
        let last = log.recent(2);
        assert_eq!(last.len(), 2);
        assert_eq!(last[1].message_id, Some(MessageId::Number(104)));
    }

    #[test]
    fn empty_log_reports_zero_stats() {
        let a = FeedbackLog::new(10).analytics();
        assert_eq!(a.message.as_deref(), Some("No feedback data available"));
        assert_eq!(a.stats.total, 0);
        assert!(a.daily_stats.is_empty());
    }

    #[test]
    fn stats_themes_and_days() {
        let entries = vec![
            rating(true, None, "2024-05-01T09:00:00+06:00"),
            rating(false, Some("Too unclear, needs more empathy"), "2024-05-01T21:00:00+06:00"),
            rating(false, Some("more detail please"), "2024-05-02T08:00:00+06:00"),
        ];
        let a = analyze(&entries);

        assert_eq!(a.stats.helpful_count, 1);
        assert_eq!(a.stats.unhelpful_count, 2);
        assert_eq!(a.stats.helpful_percentage, 33.33);
        assert_eq!(a.stats.unhelpful_percentage, 66.67);

        assert_eq!(a.common_improvement_themes[0].theme, "more");
        assert_eq!(a.common_improvement_themes[0].count, 2);
        let names: Vec<_> = a.common_improvement_themes.iter().map(|t| t.theme.as_str()).collect();
        assert_eq!(names, vec!["more", "unclear", "empathy", "detail"]);

        assert_eq!(a.daily_stats.len(), 2);
        assert_eq!(a.daily_stats[0].date, "2024-05-01");
        assert_eq!(a.daily_stats[0].helpful_percentage, 50.0);
        assert_eq!(a.daily_stats[1].date, "2024-05-02");
        assert_eq!(a.daily_stats[1].helpful, 0);
    }

    #[test]
    fn message_id_accepts_number_or_text() {
        let n: MessageId = serde_json::from_str("7").unwrap();
        let t: MessageId = serde_json::from_str("\"m-7\"").unwrap();
        assert_eq!(n, MessageId::Number(7));
        assert_eq!(t, MessageId::Text("m-7".into()));
    }
}
