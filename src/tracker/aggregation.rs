//! Derived metrics over a [UserData] snapshot. Everything here is stateless and recomputed from
//! the source data on every call, there is no cached or incremental state to invalidate.

use chrono::NaiveDate;

use crate::utils::percentage::{ratio_percentage, Percentage};

use super::entities::{DailyEntry, DayRecord, Improvement, ImprovementKind};

pub const DEFAULT_OVERVIEW_WINDOW: usize = 7;

/// Completion summary for a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayProgress {
    /// How many areas were marked attempted.
    pub attempted: usize,
    /// Attempted share of all tracked improvement areas.
    pub percentage: Percentage,
    /// Mean effort over records that were attempted and carry an effort level, 0 when there are
    /// none.
    pub avg_effort: f64,
}

pub fn day_progress(entry: &DailyEntry, total_improvements: usize) -> DayProgress {
    let attempted = entry
        .improvements
        .values()
        .filter(|v| v.attempted.unwrap_or(false))
        .count();
    let efforts = entry
        .improvements
        .values()
        .filter(|v| v.attempted.unwrap_or(false))
        .filter_map(|v| v.effort_level.map(|level| *level as f64))
        .collect::<Vec<_>>();
    DayProgress {
        attempted,
        percentage: ratio_percentage(attempted, total_improvements),
        avg_effort: mean(&efforts),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayOverview {
    pub date: NaiveDate,
    pub progress: DayProgress,
}

/// Aggregate metrics over the most recent window of daily entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    /// Windowed days, most recent first.
    pub days: Vec<DayOverview>,
    pub overall_progress: Percentage,
    /// Averaged only over days that have a positive effort average, unlike `overall_progress`
    /// which counts every windowed day.
    pub overall_effort: f64,
}

/// Takes the `window` most recent entries by calendar date and folds their [day_progress] into
/// overall numbers. Sorting by date means a backfilled old day never displaces genuinely recent
/// ones from the window.
pub fn rolling_overview(
    entries: &[DailyEntry],
    total_improvements: usize,
    window: usize,
) -> Overview {
    let mut recent = entries.iter().collect::<Vec<_>>();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(window);

    let days = recent
        .into_iter()
        .map(|entry| DayOverview {
            date: entry.date,
            progress: day_progress(entry, total_improvements),
        })
        .collect::<Vec<_>>();

    let percentages = days
        .iter()
        .map(|v| *v.progress.percentage)
        .collect::<Vec<_>>();
    let efforts = days
        .iter()
        .map(|v| v.progress.avg_effort)
        .filter(|v| *v > 0.)
        .collect::<Vec<_>>();

    Overview {
        overall_progress: Percentage::new_opt(mean(&percentages))
            .expect("Percentage should always be at least 0"),
        overall_effort: mean(&efforts),
        days,
    }
}

/// One row of the history table: a day's record joined with the area it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow<'a> {
    pub date: NaiveDate,
    pub improvement: &'a Improvement,
    pub record: &'a DayRecord,
}

/// Flattens every `(date, improvement, record)` triple for areas of the requested kind, newest
/// date first. The sort is stable, so rows within a date keep the improvement display order.
pub fn table_projection<'a>(
    improvements: &'a [Improvement],
    entries: &'a [DailyEntry],
    kind: ImprovementKind,
) -> Vec<HistoryRow<'a>> {
    let mut rows = Vec::new();
    for improvement in improvements.iter().filter(|v| v.kind == kind) {
        for entry in entries {
            if let Some(record) = entry.improvements.get(&improvement.id) {
                rows.push(HistoryRow {
                    date: entry.date,
                    improvement,
                    record,
                });
            }
        }
    }
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use crate::tracker::entities::{
        DailyEntry, DayRecord, EffortLevel, Improvement, ImprovementKind, Source,
    };

    use super::{day_progress, rolling_overview, table_projection};

    fn improvement(id: &str, kind: ImprovementKind) -> Improvement {
        Improvement {
            id: id.to_string(),
            text: format!("area {id}"),
            kind,
            source: Source::Team,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn record(attempted: Option<bool>, effort: Option<u8>) -> DayRecord {
        DayRecord {
            attempted,
            effort_level: effort.map(|v| EffortLevel::new_opt(v).unwrap()),
            initiative: None,
            content: None,
        }
    }

    fn entry(id: &str, date: &str, records: Vec<(&str, DayRecord)>) -> DailyEntry {
        DailyEntry {
            id: id.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            improvements: records
                .into_iter()
                .map(|(improvement_id, record)| (improvement_id.to_string(), record))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn day_progress_with_no_improvements_is_zero() {
        let entry = entry("e1", "2024-01-01", vec![]);

        let progress = day_progress(&entry, 0);

        assert_eq!(progress.attempted, 0);
        assert_eq!(*progress.percentage, 0.);
        assert_eq!(progress.avg_effort, 0.);
    }

    #[test]
    fn day_progress_counts_attempted_against_total() {
        let entry = entry("e1", "2024-01-01", vec![("a", record(Some(true), None))]);

        let progress = day_progress(&entry, 2);

        assert_eq!(progress.attempted, 1);
        assert_eq!(*progress.percentage, 50.);
        assert_eq!(progress.avg_effort, 0.);
    }

    #[test]
    fn day_progress_averages_effort_over_attempted_records_only() {
        let entry = entry(
            "e1",
            "2024-01-01",
            vec![
                ("a", record(Some(true), Some(4))),
                ("b", record(Some(true), Some(2))),
                // not attempted, its effort must not pull the average down
                ("c", record(Some(false), Some(5))),
                ("d", record(Some(true), None)),
            ],
        );

        let progress = day_progress(&entry, 4);

        assert_eq!(progress.attempted, 3);
        assert_eq!(progress.avg_effort, 3.);
    }

    #[test]
    fn overview_averages_effort_over_effort_bearing_days_only() {
        let entries = vec![
            entry("e1", "2024-01-01", vec![("a", record(Some(true), Some(4)))]),
            entry("e2", "2024-01-02", vec![("a", record(Some(true), Some(2)))]),
            entry("e3", "2024-01-03", vec![("a", record(Some(true), None))]),
        ];

        let overview = rolling_overview(&entries, 2, 7);

        // every day attempted 1 of 2 areas
        assert_eq!(*overview.overall_progress, 50.);
        // the effortless third day is excluded from the effort average
        assert_eq!(overview.overall_effort, 3.);
        assert_eq!(overview.days.len(), 3);
    }

    #[test]
    fn overview_days_come_back_most_recent_first() {
        let entries = vec![
            entry("e1", "2024-01-01", vec![("a", record(Some(true), None))]),
            entry("e2", "2024-01-03", vec![("a", record(Some(true), None))]),
            entry("e3", "2024-01-02", vec![("a", record(Some(true), None))]),
        ];

        let overview = rolling_overview(&entries, 1, 7);

        let dates = overview
            .days
            .iter()
            .map(|v| v.date.to_string())
            .collect::<Vec<_>>();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);
    }

    /// The original behavior windowed by storage insertion order, so a backfilled old date could
    /// displace a genuinely recent day from the "most recent" window. This implementation windows
    /// by calendar date instead, which is a deliberate divergence.
    #[test]
    fn overview_window_follows_calendar_dates_after_backfill() {
        let entries = vec![
            entry("e1", "2024-01-10", vec![("a", record(Some(true), None))]),
            entry("e2", "2024-01-11", vec![("a", record(Some(true), None))]),
            // backfilled last, but far in the past
            entry("e3", "2023-12-01", vec![("a", record(Some(true), None))]),
        ];

        let overview = rolling_overview(&entries, 1, 2);

        let dates = overview
            .days
            .iter()
            .map(|v| v.date.to_string())
            .collect::<Vec<_>>();
        assert_eq!(dates, vec!["2024-01-11", "2024-01-10"]);
    }

    #[test]
    fn overview_of_no_entries_is_all_zero() {
        let overview = rolling_overview(&[], 3, 7);

        assert!(overview.days.is_empty());
        assert_eq!(*overview.overall_progress, 0.);
        assert_eq!(overview.overall_effort, 0.);
    }

    #[test]
    fn table_rows_sort_by_date_descending_with_stable_area_order() {
        let improvements = vec![
            improvement("a", ImprovementKind::Improvement),
            improvement("b", ImprovementKind::Improvement),
        ];
        let entries = vec![
            entry(
                "e1",
                "2024-01-01",
                vec![
                    ("a", record(Some(true), None)),
                    ("b", record(Some(false), None)),
                ],
            ),
            entry("e2", "2024-01-02", vec![("b", record(Some(true), Some(5)))]),
        ];

        let rows = table_projection(&improvements, &entries, ImprovementKind::Improvement);

        let keys = rows
            .iter()
            .map(|v| (v.date.to_string(), v.improvement.id.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![
                ("2024-01-02".to_string(), "b"),
                ("2024-01-01".to_string(), "a"),
                ("2024-01-01".to_string(), "b"),
            ]
        );
    }

    #[test]
    fn table_rows_filter_by_kind() {
        let improvements = vec![
            improvement("a", ImprovementKind::Improvement),
            improvement("b", ImprovementKind::Preservation),
        ];
        let entries = vec![entry(
            "e1",
            "2024-01-01",
            vec![
                ("a", record(Some(true), None)),
                (
                    "b",
                    DayRecord {
                        content: Some("kept it up".to_string()),
                        ..DayRecord::default()
                    },
                ),
            ],
        )];

        let rows = table_projection(&improvements, &entries, ImprovementKind::Preservation);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].improvement.id, "b");
        assert_eq!(rows[0].record.content.as_deref(), Some("kept it up"));
    }
}
