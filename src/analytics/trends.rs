//! Per-keyword time series bucketed by the requested range.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::models::{TrendMetadata, TrendReport, TrendRow, TrendSeries, Veracity};

const TOP_KEYWORDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendRange {
    OneDay,
    SevenDays,
    ThirtyDays,
    NinetyDays,
}

impl TrendRange {
    /// Unknown keys fall back to the seven-day policy.
    pub fn parse(key: &str) -> Self {
        match key.trim() {
            "1d" => TrendRange::OneDay,
            "7d" => TrendRange::SevenDays,
            "30d" => TrendRange::ThirtyDays,
            "90d" => TrendRange::NinetyDays,
            other => {
                tracing::warn!("Unknown trend range '{}', using 7d", other);
                TrendRange::SevenDays
            }
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            TrendRange::OneDay => "1d",
            TrendRange::SevenDays => "7d",
            TrendRange::ThirtyDays => "30d",
            TrendRange::NinetyDays => "90d",
        }
    }

    pub fn span(&self) -> Duration {
        match self {
            TrendRange::OneDay => Duration::days(1),
            TrendRange::SevenDays => Duration::days(7),
            TrendRange::ThirtyDays => Duration::days(30),
            TrendRange::NinetyDays => Duration::days(90),
        }
    }

    pub fn bucket_count(&self) -> usize {
        match self {
            TrendRange::OneDay => 6,
            TrendRange::SevenDays => 7,
            TrendRange::ThirtyDays => 4,
            TrendRange::NinetyDays => 3,
        }
    }

    /// Months are approximated as 30 days.
    pub fn bucket_width(&self) -> Duration {
        match self {
            TrendRange::OneDay => Duration::hours(4),
            TrendRange::SevenDays => Duration::days(1),
            TrendRange::ThirtyDays => Duration::weeks(1),
            TrendRange::NinetyDays => Duration::days(30),
        }
    }

    pub fn labels(&self, start: DateTime<Utc>) -> Vec<String> {
        (0..self.bucket_count())
            .map(|i| {
                let bucket_start = start + self.bucket_width() * i as i32;
                match self {
                    TrendRange::OneDay => bucket_start.format("%H:00").to_string(),
                    TrendRange::SevenDays => bucket_start.weekday().to_string(),
                    TrendRange::ThirtyDays => format!("Week {}", i + 1),
                    TrendRange::NinetyDays => format!("Month {}", i + 1),
                }
            })
            .collect()
    }

    /// `floor(elapsed / width)`, clamped into the bucket range so an
    /// end-of-range timestamp lands in the last bucket.
    pub fn bucket_index(&self, start: DateTime<Utc>, timestamp: DateTime<Utc>) -> usize {
        let elapsed = (timestamp - start).num_milliseconds();
        let width = self.bucket_width().num_milliseconds();
        let index = elapsed.div_euclid(width).max(0) as usize;
        index.min(self.bucket_count() - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VeracityFilter {
    All,
    False,
    True,
}

impl VeracityFilter {
    pub fn key(&self) -> &'static str {
        match self {
            VeracityFilter::All => "all",
            VeracityFilter::False => "false",
            VeracityFilter::True => "true",
        }
    }

    pub fn matches(&self, result: Veracity) -> bool {
        match self {
            VeracityFilter::All => true,
            VeracityFilter::False => result == Veracity::False,
            VeracityFilter::True => result == Veracity::True,
        }
    }

    pub fn veracity(&self) -> Option<Veracity> {
        match self {
            VeracityFilter::All => None,
            VeracityFilter::False => Some(Veracity::False),
            VeracityFilter::True => Some(Veracity::True),
        }
    }
}

impl FromStr for VeracityFilter {
    type Err = std::convert::Infallible;

    /// Unknown values fall back to `all`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "all" => VeracityFilter::All,
            "false" | "falsa" => VeracityFilter::False,
            "true" | "verdadera" => VeracityFilter::True,
            other => {
                tracing::warn!("Unknown veracity filter '{}', using all", other);
                VeracityFilter::All
            }
        })
    }
}

/// Buckets the rows of `[now - span, now]` into the range's intervals for
/// the five most frequent keywords.
pub fn aggregate(
    rows: &[TrendRow],
    range: TrendRange,
    filter: VeracityFilter,
    now: DateTime<Utc>,
) -> TrendReport {
    let start = now - range.span();

    let mut matching: Vec<&TrendRow> = rows
        .iter()
        .filter(|r| r.timestamp >= start && r.timestamp <= now)
        .filter(|r| filter.matches(r.result))
        .collect();
    matching.sort_by_key(|r| (r.timestamp, r.article_id, r.keyword.id));

    let mut metadata = TrendMetadata {
        range: range.key().to_string(),
        filter: filter.key().to_string(),
        start_date: start,
        end_date: now,
        total_rows: matching.len(),
        keyword_totals: BTreeMap::new(),
    };

    if matching.is_empty() {
        tracing::debug!("No trend rows for {} / {}", range.key(), filter.key());
        return TrendReport {
            categories: Vec::new(),
            series: Vec::new(),
            metadata,
        };
    }

    // Frequency with first-encounter order for ties.
    let mut counts: HashMap<&str, (u64, usize)> = HashMap::new();
    for (position, row) in matching.iter().enumerate() {
        counts
            .entry(row.keyword.word.as_str())
            .or_insert((0, position))
            .0 += 1;
    }
    let mut ranked: Vec<(&str, u64, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(TOP_KEYWORDS);

    let series: Vec<TrendSeries> = ranked
        .iter()
        .map(|(word, total, _)| {
            let mut values = vec![0u64; range.bucket_count()];
            for row in matching.iter().filter(|r| r.keyword.word == *word) {
                values[range.bucket_index(start, row.timestamp)] += 1;
            }
            metadata.keyword_totals.insert(word.to_string(), *total);
            TrendSeries {
                keyword: word.to_string(),
                values,
            }
        })
        .collect();

    TrendReport {
        categories: range.labels(start),
        series,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KeywordRef;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // A Thursday.
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
    }

    fn row(article_id: i64, keyword_id: i64, word: &str, at: DateTime<Utc>, result: Veracity) -> TrendRow {
        TrendRow {
            article_id,
            keyword: KeywordRef::new(keyword_id, word),
            timestamp: at,
            result,
        }
    }

    #[test]
    fn test_range_parsing_defaults_to_week() {
        assert_eq!(TrendRange::parse("1d"), TrendRange::OneDay);
        assert_eq!(TrendRange::parse("90d"), TrendRange::NinetyDays);
        assert_eq!(TrendRange::parse("365d"), TrendRange::SevenDays);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("falsa".parse::<VeracityFilter>().unwrap(), VeracityFilter::False);
        assert_eq!("TRUE".parse::<VeracityFilter>().unwrap(), VeracityFilter::True);
        assert_eq!("whatever".parse::<VeracityFilter>().unwrap(), VeracityFilter::All);
    }

    #[test]
    fn test_empty_rows() {
        let report = aggregate(&[], TrendRange::SevenDays, VeracityFilter::All, now());
        assert!(report.categories.is_empty());
        assert!(report.series.is_empty());
        assert_eq!(report.metadata.total_rows, 0);
    }

    #[test]
    fn test_week_labels_start_from_range_start() {
        let start = now() - Duration::days(7);
        let labels = TrendRange::SevenDays.labels(start);
        assert_eq!(labels, vec!["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"]);
    }

    #[test]
    fn test_label_schemes() {
        let start = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap();
        assert_eq!(
            TrendRange::OneDay.labels(start),
            vec!["12:00", "16:00", "20:00", "00:00", "04:00", "08:00"]
        );
        assert_eq!(TrendRange::ThirtyDays.labels(start), vec!["Week 1", "Week 2", "Week 3", "Week 4"]);
        assert_eq!(TrendRange::NinetyDays.labels(start), vec!["Month 1", "Month 2", "Month 3"]);
    }

    #[test]
    fn test_end_of_range_clamps_into_last_bucket() {
        let report = aggregate(
            &[row(1, 1, "vaccine", now(), Veracity::False)],
            TrendRange::OneDay,
            VeracityFilter::All,
            now(),
        );
        assert_eq!(report.categories.len(), 6);
        assert_eq!(report.series[0].values, vec![0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_thirty_day_overflow_goes_to_week_four() {
        let range = TrendRange::ThirtyDays;
        let start = now() - range.span();
        assert_eq!(range.bucket_index(start, start), 0);
        assert_eq!(range.bucket_index(start, start + Duration::days(7)), 1);
        assert_eq!(range.bucket_index(start, start + Duration::days(29)), 3);
        assert_eq!(range.bucket_index(start, now()), 3);
    }

    #[test]
    fn test_top_five_with_first_encounter_ties() {
        let base = now() - Duration::days(6);
        let mut rows = Vec::new();
        for (i, word) in ["f", "e", "d", "c", "b", "a"].iter().enumerate() {
            rows.push(row(i as i64 + 1, i as i64 + 1, word, base + Duration::hours(i as i64), Veracity::True));
        }
        rows.push(row(10, 6, "a", base + Duration::days(2), Veracity::True));

        let report = aggregate(&rows, TrendRange::SevenDays, VeracityFilter::All, now());
        let keywords: Vec<&str> = report.series.iter().map(|s| s.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["a", "f", "e", "d", "c"]);
    }

    #[test]
    fn test_series_sum_matches_keyword_total() {
        let mut rows = Vec::new();
        for day in 0..7 {
            let at = now() - Duration::days(day) - Duration::minutes(30);
            rows.push(row(day + 1, 1, "vaccine", at, Veracity::False));
            rows.push(row(day + 1, 2, "election", at, Veracity::True));
        }
        // Outside the window.
        rows.push(row(99, 1, "vaccine", now() - Duration::days(8), Veracity::False));

        let report = aggregate(&rows, TrendRange::SevenDays, VeracityFilter::False, now());
        assert_eq!(report.categories.len(), 7);
        assert_eq!(report.series.len(), 1);
        let vaccine = &report.series[0];
        assert_eq!(vaccine.keyword, "vaccine");
        assert_eq!(vaccine.values.iter().sum::<u64>(), 7);
        assert_eq!(report.metadata.keyword_totals["vaccine"], 7);
        assert_eq!(report.metadata.total_rows, 7);
    }
}
