use std::fmt;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};

/// Format of the `dt_txt` field in OpenWeather forecast items
const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MIDDAY_HOUR: i64 = 12;

#[derive(Debug)]
pub enum ForecastError {
    Empty,
    Malformed(String),
}

impl fmt::Display for ForecastError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ForecastError::Empty => write!(f, "ForecastError::Empty: forecast list is empty"),
            ForecastError::Malformed(e) => write!(f, "ForecastError::Malformed: {}", e),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct MainValues {
    pub temp: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

/// One 3-hourly item of the OpenWeather forecast list
#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct ForecastEntry {
    #[serde_as(as = "Option<TimestampSeconds<i64>>")]
    pub dt: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dt_txt: Option<String>,
    pub main: MainValues,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

impl ForecastEntry {
    /// Returns the time of the entry as given by the provider.
    ///
    /// `dt_txt` is used verbatim when present, otherwise the unix time `dt` is read as UTC.
    pub fn local_time(&self) -> Result<NaiveDateTime, ForecastError> {
        match (&self.dt_txt, self.dt) {
            (Some(txt), _) => NaiveDateTime::parse_from_str(txt, DT_TXT_FORMAT)
                .map_err(|e| ForecastError::Malformed(format!("invalid dt_txt '{}': {}", txt, e))),
            (None, Some(dt)) => Ok(dt.naive_utc()),
            (None, None) => Err(ForecastError::Malformed("forecast entry without timestamp".to_string())),
        }
    }
}

#[derive(Serialize, Debug, Copy, Clone, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: String,
    pub temp: MinMax,
    pub icon: String,
    pub description: String,
}

/// Groups forecast entries by calendar date and summarizes each of the first `max_days` dates.
///
/// Dates keep the order in which they first appear in `entries`, nothing is sorted. For each date
/// the min/max temperature is taken over all its entries, and icon and description come from the
/// entry closest to 12:00 (the earliest one on a tie).
///
/// # Arguments
///
/// * 'entries' - forecast list as returned by the provider
/// * 'max_days' - maximum number of dates to summarize
pub fn daily_summaries(entries: &[ForecastEntry], max_days: usize) -> Result<Vec<DailySummary>, ForecastError> {
    if entries.is_empty() {
        return Err(ForecastError::Empty);
    }

    let mut groups: Vec<(NaiveDate, Vec<(u32, &ForecastEntry)>)> = Vec::new();
    for entry in entries {
        let time = entry.local_time()?;
        let date = time.date();
        match groups.iter_mut().find(|(d, _)| *d == date) {
            Some((_, group)) => group.push((time.hour(), entry)),
            None => groups.push((date, vec![(time.hour(), entry)])),
        }
    }

    groups.iter()
        .take(max_days)
        .map(|(date, group)| summarize(*date, group))
        .collect()
}

/// Builds the summary of one non-empty date group
///
/// # Arguments
///
/// * 'date' - the calendar date of the group
/// * 'group' - hour of day and entry, in provider order
fn summarize(date: NaiveDate, group: &[(u32, &ForecastEntry)]) -> Result<DailySummary, ForecastError> {
    let mut temp = MinMax { min: f64::INFINITY, max: f64::NEG_INFINITY };
    let mut midday: Option<(i64, &ForecastEntry)> = None;

    for (hour, entry) in group {
        temp.min = temp.min.min(entry.main.temp);
        temp.max = temp.max.max(entry.main.temp);

        let distance = (*hour as i64 - MIDDAY_HOUR).abs();
        match midday {
            Some((best, _)) if best <= distance => {},
            _ => midday = Some((distance, *entry)),
        }
    }

    let condition = midday
        .and_then(|(_, entry)| entry.weather.first())
        .ok_or_else(|| ForecastError::Malformed(format!("no weather condition for {}", date)))?;

    Ok(DailySummary {
        date: date.format("%Y-%m-%d").to_string(),
        temp,
        icon: condition.icon.clone(),
        description: condition.description.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(dt_txt: &str, temp: f64, icon: &str) -> ForecastEntry {
        serde_json::from_value(json!({
            "dt_txt": dt_txt,
            "main": { "temp": temp },
            "weather": [{ "description": format!("sky {}", icon), "icon": icon }]
        })).unwrap()
    }

    #[test]
    fn picks_entry_closest_to_noon() {
        let entries = vec![
            entry("2024-01-15 09:00:00", 4.0, "09"),
            entry("2024-01-15 13:00:00", 6.0, "13"),
            entry("2024-01-15 18:00:00", 2.0, "18"),
        ];

        let daily = daily_summaries(&entries, 3).unwrap();

        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].icon, "13");
        assert_eq!(daily[0].description, "sky 13");
    }

    #[test]
    fn equal_distance_keeps_first_entry() {
        let entries = vec![
            entry("2024-01-15 10:00:00", 4.0, "10"),
            entry("2024-01-15 14:00:00", 6.0, "14"),
        ];

        let daily = daily_summaries(&entries, 3).unwrap();

        assert_eq!(daily[0].icon, "10");
    }

    #[test]
    fn min_max_cover_whole_date() {
        let entries = vec![
            entry("2024-01-15 00:00:00", 1.5, "a"),
            entry("2024-01-15 12:00:00", 8.25, "b"),
            entry("2024-01-15 21:00:00", -3.0, "c"),
            entry("2024-01-16 12:00:00", 7.0, "d"),
        ];

        let daily = daily_summaries(&entries, 3).unwrap();

        assert_eq!(daily[0].temp, MinMax { min: -3.0, max: 8.25 });
        assert_eq!(daily[1].temp, MinMax { min: 7.0, max: 7.0 });
        assert!(daily.iter().all(|d| d.temp.min <= d.temp.max));
    }

    #[test]
    fn nine_entries_over_three_dates() {
        let mut entries = Vec::new();
        for date in ["2024-01-15", "2024-01-16", "2024-01-17"] {
            for hour in ["06", "12", "18"] {
                entries.push(entry(&format!("{} {}:00:00", date, hour), 5.0, hour));
            }
        }

        let daily = daily_summaries(&entries, 3).unwrap();

        let dates: Vec<&str> = daily.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-15", "2024-01-16", "2024-01-17"]);
        assert!(daily.iter().all(|d| d.icon == "12"));
    }

    #[test]
    fn only_first_dates_are_summarized() {
        let entries: Vec<ForecastEntry> = (15..20)
            .map(|day| entry(&format!("2024-01-{} 12:00:00", day), day as f64, "x"))
            .collect();

        let daily = daily_summaries(&entries, 3).unwrap();

        assert_eq!(daily.len(), 3);
        assert_eq!(daily[2].date, "2024-01-17");
    }

    #[test]
    fn fewer_dates_are_not_padded() {
        let entries = vec![
            entry("2024-01-15 21:00:00", 3.0, "a"),
            entry("2024-01-16 00:00:00", 2.0, "b"),
        ];

        let daily = daily_summaries(&entries, 3).unwrap();

        assert_eq!(daily.len(), 2);
    }

    #[test]
    fn date_order_is_first_seen_not_sorted() {
        let entries = vec![
            entry("2024-01-16 12:00:00", 3.0, "a"),
            entry("2024-01-15 12:00:00", 2.0, "b"),
            entry("2024-01-16 15:00:00", 9.0, "c"),
        ];

        let daily = daily_summaries(&entries, 3).unwrap();

        assert_eq!(daily[0].date, "2024-01-16");
        assert_eq!(daily[0].temp, MinMax { min: 3.0, max: 9.0 });
        assert_eq!(daily[1].date, "2024-01-15");
    }

    #[test]
    fn unix_time_is_used_without_dt_txt() {
        // 2024-01-15 12:00:00 UTC
        let entry: ForecastEntry = serde_json::from_value(json!({
            "dt": 1705320000,
            "main": { "temp": 5.0 },
            "weather": [{ "description": "clear sky", "icon": "01d" }]
        })).unwrap();

        let daily = daily_summaries(&[entry], 3).unwrap();

        assert_eq!(daily[0].date, "2024-01-15");
        assert_eq!(daily[0].icon, "01d");
    }

    #[test]
    fn empty_list_is_an_error() {
        assert!(matches!(daily_summaries(&[], 3), Err(ForecastError::Empty)));
    }

    #[test]
    fn entry_without_timestamp_is_malformed() {
        let entry: ForecastEntry = serde_json::from_value(json!({
            "main": { "temp": 5.0 },
            "weather": [{ "description": "clear sky", "icon": "01d" }]
        })).unwrap();

        assert!(matches!(daily_summaries(&[entry], 3), Err(ForecastError::Malformed(_))));
    }

    #[test]
    fn unparsable_dt_txt_is_malformed() {
        let entries = vec![entry("tomorrow at noon", 5.0, "a")];

        assert!(matches!(daily_summaries(&entries, 3), Err(ForecastError::Malformed(_))));
    }

    #[test]
    fn midday_entry_without_condition_is_malformed() {
        let entry: ForecastEntry = serde_json::from_value(json!({
            "dt_txt": "2024-01-15 12:00:00",
            "main": { "temp": 5.0 },
            "weather": []
        })).unwrap();

        assert!(matches!(daily_summaries(&[entry], 3), Err(ForecastError::Malformed(_))));
    }

    #[test]
    fn entry_without_temperature_does_not_parse() {
        let result: Result<ForecastEntry, _> = serde_json::from_value(json!({
            "dt_txt": "2024-01-15 12:00:00",
            "main": { "feels_like": 5.0 },
            "weather": []
        }));

        assert!(result.is_err());
    }

    #[test]
    fn summary_serializes_with_nested_temp() {
        let daily = daily_summaries(&[entry("2024-01-15 12:00:00", 5.0, "01d")], 3).unwrap();

        assert_eq!(serde_json::to_value(&daily[0]).unwrap(), json!({
            "date": "2024-01-15",
            "temp": { "min": 5.0, "max": 5.0 },
            "icon": "01d",
            "description": "sky 01d"
        }));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        // (day offset, hour, temperature), the entry index is used as icon
        fn samples() -> impl Strategy<Value = Vec<(u32, u32, f64)>> {
            prop::collection::vec((0u32..6, 0u32..24, -40.0f64..50.0), 1..40)
        }

        fn entries(samples: &[(u32, u32, f64)]) -> Vec<ForecastEntry> {
            samples.iter()
                .enumerate()
                .map(|(i, (day, hour, temp))| {
                    entry(&format!("2024-01-{:02} {:02}:00:00", 10 + day, hour), *temp, &i.to_string())
                })
                .collect()
        }

        proptest! {
            #[test]
            fn summary_count_is_capped_distinct_dates(samples in samples()) {
                let mut dates: Vec<u32> = Vec::new();
                for (day, _, _) in &samples {
                    if !dates.contains(day) {
                        dates.push(*day);
                    }
                }

                let daily = daily_summaries(&entries(&samples), 3).unwrap();

                prop_assert_eq!(daily.len(), dates.len().min(3));
                for (summary, day) in daily.iter().zip(&dates) {
                    prop_assert_eq!(&summary.date, &format!("2024-01-{:02}", 10 + day));
                }
            }

            #[test]
            fn min_max_are_group_extrema(samples in samples()) {
                let daily = daily_summaries(&entries(&samples), 3).unwrap();

                for summary in &daily {
                    let temps: Vec<f64> = samples.iter()
                        .filter(|(day, _, _)| format!("2024-01-{:02}", 10 + day) == summary.date)
                        .map(|(_, _, temp)| *temp)
                        .collect();
                    let min = temps.iter().cloned().fold(f64::INFINITY, f64::min);
                    let max = temps.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

                    prop_assert_eq!(summary.temp, MinMax { min, max });
                    prop_assert!(summary.temp.min <= summary.temp.max);
                }
            }

            #[test]
            fn midday_entry_is_first_closest_to_noon(samples in samples()) {
                let daily = daily_summaries(&entries(&samples), 3).unwrap();

                for summary in &daily {
                    let group: Vec<(usize, u32)> = samples.iter()
                        .enumerate()
                        .filter(|(_, (day, _, _))| format!("2024-01-{:02}", 10 + day) == summary.date)
                        .map(|(i, (_, hour, _))| (i, *hour))
                        .collect();
                    let best = group.iter().map(|(_, hour)| (*hour as i64 - 12).abs()).min().unwrap();
                    let (expected, _) = group.iter()
                        .find(|(_, hour)| (*hour as i64 - 12).abs() == best)
                        .unwrap();

                    prop_assert_eq!(&summary.icon, &expected.to_string());
                }
            }
        }
    }
}
