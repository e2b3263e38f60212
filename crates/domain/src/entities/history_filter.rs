//! Date filters for the trip history list
//!
//! Windows are computed in a local timezone and compared inclusively:
//! `[start_of_period, end_of_period]`, where the end is the last millisecond of
//! the period. Weeks start on Sunday.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::entities::TripRecord;
use crate::errors::DomainError;

/// Period selector of the history screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryFilter {
    /// Every trip ("Tous")
    #[default]
    All,
    /// Trips in the current week ("Cette semaine")
    ThisWeek,
    /// Trips in the current month ("Ce mois")
    ThisMonth,
}

impl HistoryFilter {
    /// All options in display order
    pub const ALL: [Self; 3] = [Self::All, Self::ThisWeek, Self::ThisMonth];

    /// Label shown in the filter dropdown
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::All => "Tous",
            Self::ThisWeek => "Cette semaine",
            Self::ThisMonth => "Ce mois",
        }
    }

    /// Inclusive UTC window for this filter relative to `now`, `None` for [`Self::All`]
    #[must_use]
    pub fn window(&self, now: DateTime<Utc>, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let today = now.with_timezone(&tz).date_naive();
        let (start, next_start) = match self {
            Self::All => return None,
            Self::ThisWeek => {
                let offset = i64::from(today.weekday().num_days_from_sunday());
                let start = today - Duration::days(offset);
                (start, start + Duration::days(7))
            },
            Self::ThisMonth => {
                let start = today.with_day(1)?;
                let next = if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)?
                };
                (start, next)
            },
        };

        let start = local_to_utc(tz, start.and_hms_opt(0, 0, 0)?);
        let end = local_to_utc(tz, next_start.and_hms_opt(0, 0, 0)?) - Duration::milliseconds(1);
        Some((start, end))
    }

    /// Whether a trip date passes this filter
    #[must_use]
    pub fn matches(&self, date: DateTime<Utc>, now: DateTime<Utc>, tz: Tz) -> bool {
        self.window(now, tz)
            .is_none_or(|(start, end)| date >= start && date <= end)
    }

    /// Apply the search term and this filter to a history listing
    #[must_use]
    pub fn apply<'a>(
        &self,
        records: &'a [TripRecord],
        search: &str,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Vec<&'a TripRecord> {
        let window = self.window(now, tz);
        records
            .iter()
            .filter(|r| r.matches_search(search))
            .filter(|r| window.is_none_or(|(start, end)| r.date >= start && r.date <= end))
            .collect()
    }
}

fn local_to_utc(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map_or_else(|| Utc.from_utc_datetime(&naive), |dt| dt.with_timezone(&Utc))
}

impl fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HistoryFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tous" | "all" => Ok(Self::All),
            "cette semaine" | "week" | "this_week" => Ok(Self::ThisWeek),
            "ce mois" | "month" | "this_month" => Ok(Self::ThisMonth),
            other => Err(DomainError::validation(format!(
                "unknown history filter: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn trip(sequence: usize, date: &str, route: &str, plate: &str) -> TripRecord {
        TripRecord {
            sequence,
            bus_type: "40".to_string(),
            route_label: route.to_string(),
            plate: plate.to_string(),
            fare: 1000,
            date: at(date),
            distance_km: None,
        }
    }

    fn sample() -> Vec<TripRecord> {
        vec![
            trip(1, "2025-07-08T10:53:33.639Z", "Antanifotsy - Ankofafa", "3456 TBA"),
            trip(2, "2025-07-02T14:20:10.000Z", "Anosy - Tsianolondroa", "1234 TBA"),
            trip(3, "2025-06-29T09:10:00.000Z", "Ampitatafika - Ambatomena", "5698 TBA"),
        ]
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for filter in HistoryFilter::ALL {
            assert_eq!(filter.label().parse::<HistoryFilter>().unwrap(), filter);
        }
        assert_eq!("week".parse::<HistoryFilter>().unwrap(), HistoryFilter::ThisWeek);
        assert!("yearly".parse::<HistoryFilter>().is_err());
    }

    #[test]
    fn week_window_starts_on_sunday() {
        // Wednesday 2025-07-09
        let now = at("2025-07-09T12:00:00Z");
        let (start, end) = HistoryFilter::ThisWeek.window(now, Tz::UTC).unwrap();
        assert_eq!(start, at("2025-07-06T00:00:00Z"));
        assert_eq!(end, at("2025-07-12T23:59:59.999Z"));
    }

    #[test]
    fn this_week_keeps_only_entries_inside_the_window() {
        let now = at("2025-07-09T12:00:00Z");
        let records = sample();
        let kept = HistoryFilter::ThisWeek.apply(&records, "", now, Tz::UTC);
        let ids: Vec<usize> = kept.iter().map(|r| r.sequence).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn week_bounds_are_inclusive() {
        let now = at("2025-07-09T12:00:00Z");
        let filter = HistoryFilter::ThisWeek;
        assert!(filter.matches(at("2025-07-06T00:00:00Z"), now, Tz::UTC));
        assert!(filter.matches(at("2025-07-12T23:59:59.999Z"), now, Tz::UTC));
        assert!(!filter.matches(at("2025-07-05T23:59:59.999Z"), now, Tz::UTC));
        assert!(!filter.matches(at("2025-07-13T00:00:00Z"), now, Tz::UTC));
    }

    #[test]
    fn this_month_window() {
        let now = at("2025-07-09T12:00:00Z");
        let records = sample();
        let kept = HistoryFilter::ThisMonth.apply(&records, "", now, Tz::UTC);
        let ids: Vec<usize> = kept.iter().map(|r| r.sequence).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn december_month_window_rolls_over_the_year() {
        let now = at("2025-12-15T08:00:00Z");
        let (start, end) = HistoryFilter::ThisMonth.window(now, Tz::UTC).unwrap();
        assert_eq!(start, at("2025-12-01T00:00:00Z"));
        assert_eq!(end, at("2025-12-31T23:59:59.999Z"));
    }

    #[test]
    fn window_uses_local_midnight() {
        // Saturday 22:30 UTC is already Sunday 01:30 in Antananarivo (UTC+3)
        let now = at("2025-07-12T22:30:00Z");
        let (start, _) = HistoryFilter::ThisWeek
            .window(now, Tz::Indian__Antananarivo)
            .unwrap();
        assert_eq!(start, at("2025-07-12T21:00:00Z"));
    }

    #[test]
    fn all_keeps_everything_and_combines_with_search() {
        let now = at("2025-07-09T12:00:00Z");
        let records = sample();
        assert_eq!(HistoryFilter::All.apply(&records, "", now, Tz::UTC).len(), 3);

        let kept = HistoryFilter::All.apply(&records, "anosy", now, Tz::UTC);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].sequence, 2);

        let kept = HistoryFilter::ThisWeek.apply(&records, "1234", now, Tz::UTC);
        assert!(kept.is_empty());
    }
}
