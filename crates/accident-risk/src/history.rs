//! Static per-location accident statistics produced alongside the model.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

pub const UNKNOWN_OFFENSE: &str = "Unknown";
const UNKNOWN_STATION: &str = "Unknown";

/// Aggregates recorded for a single `"place, area"` key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocationStats {
    #[serde(default)]
    pub barangay: Option<String>,
    #[serde(default)]
    pub station: Option<String>,
    #[serde(default)]
    pub total_accidents: u64,
    #[serde(default)]
    pub fatal_accidents: u64,
    #[serde(default)]
    pub most_common_offense: Option<String>,
    #[serde(default)]
    pub is_accident_prone: bool,
}

/// Counts merged into a risk assessment; zeros when the location is unseen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoricalRecord {
    pub total_accidents: u64,
    pub fatal_accidents: u64,
    pub most_common_offense: String,
}

impl Default for HistoricalRecord {
    fn default() -> Self {
        Self {
            total_accidents: 0,
            fatal_accidents: 0,
            most_common_offense: UNKNOWN_OFFENSE.to_string(),
        }
    }
}

impl From<&LocationStats> for HistoricalRecord {
    fn from(stats: &LocationStats) -> Self {
        Self {
            total_accidents: stats.total_accidents,
            fatal_accidents: stats.fatal_accidents,
            most_common_offense: stats
                .most_common_offense
                .clone()
                .unwrap_or_else(|| UNKNOWN_OFFENSE.to_string()),
        }
    }
}

/// Listing row for the location directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarangaySummary {
    pub name: String,
    pub station: String,
    pub is_accident_prone: bool,
    pub total_accidents: u64,
    pub fatal_accidents: u64,
}

/// Read-only statistics table keyed by `"place, area"`.
///
/// Entries keep the order they had on disk so listings with equal counts
/// come out in a stable order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalStatistics {
    total_places: u64,
    entries: Vec<(String, LocationStats)>,
    index: HashMap<String, usize>,
}

impl HistoricalStatistics {
    pub fn new(entries: Vec<(String, LocationStats)>) -> Self {
        let total_places = entries.len() as u64;
        Self::with_total(entries, total_places)
    }

    pub fn with_total(entries: Vec<(String, LocationStats)>, total_places: u64) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, (key, _)) in entries.iter().enumerate() {
            index.entry(key.clone()).or_insert(position);
        }
        Self {
            total_places,
            entries,
            index,
        }
    }

    pub fn total_places(&self) -> u64 {
        self.total_places
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn composite_key(place: &str, area: &str) -> String {
        format!("{place}, {area}")
    }

    pub fn get(&self, key: &str) -> Option<&LocationStats> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    /// Counts for a place/area pair, defaulting to zeros and an unknown offense.
    pub fn lookup(&self, place: &str, area: &str) -> HistoricalRecord {
        self.get(&Self::composite_key(place, area))
            .map(HistoricalRecord::from)
            .unwrap_or_default()
    }

    /// All locations (optionally only prone ones), most incidents first.
    pub fn barangay_list(&self, prone_only: bool) -> Vec<BarangaySummary> {
        let mut listing: Vec<BarangaySummary> = self
            .entries
            .iter()
            .filter(|(_, stats)| !prone_only || stats.is_accident_prone)
            .map(|(key, stats)| BarangaySummary {
                name: title_case(stats.barangay.as_deref().unwrap_or(key)),
                station: title_case(stats.station.as_deref().unwrap_or(UNKNOWN_STATION)),
                is_accident_prone: stats.is_accident_prone,
                total_accidents: stats.total_accidents,
                fatal_accidents: stats.fatal_accidents,
            })
            .collect();

        listing.sort_by(|a, b| b.total_accidents.cmp(&a.total_accidents));
        listing
    }

    /// Distinct, title-cased area names in ascending order.
    pub fn municipalities(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|(_, stats)| stats.station.as_deref())
            .map(str::trim)
            .filter(|station| !station.is_empty())
            .map(title_case)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct, title-cased places whose area matches `municipality`
    /// case-insensitively.
    pub fn barangays_in(&self, municipality: &str) -> Vec<String> {
        let wanted = municipality.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|(_, stats)| {
                stats
                    .station
                    .as_deref()
                    .is_some_and(|station| station.trim().to_lowercase() == wanted)
            })
            .filter_map(|(_, stats)| stats.barangay.as_deref())
            .filter(|barangay| !barangay.is_empty())
            .map(title_case)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_alphabetic = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_alphabetic {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_alphabetic = true;
        } else {
            out.push(ch);
            previous_alphabetic = false;
        }
    }
    out
}

#[derive(Deserialize)]
struct StatisticsFile {
    #[serde(default)]
    total_places: Option<u64>,
    #[serde(default)]
    statistics: OrderedEntries,
}

#[derive(Default)]
struct OrderedEntries(Vec<(String, LocationStats)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of location keys to statistics")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, stats)) = map.next_entry::<String, LocationStats>()? {
                    entries.push((key, stats));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl<'de> Deserialize<'de> for HistoricalStatistics {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let file = StatisticsFile::deserialize(deserializer)?;
        let entries = file.statistics.0;
        let total_places = file.total_places.unwrap_or(entries.len() as u64);
        Ok(Self::with_total(entries, total_places))
    }
}
