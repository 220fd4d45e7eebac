//! Core job-listing record model shared by the jobstat crates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

pub const CRATE_NAME: &str = "jobstat-core";

/// Sentinel shown at the presentation boundary for fields a record does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

/// Timestamp layout used by the listing feed for `publishedAt`.
pub const PUBLISHED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `{ id, name }` reference used by the feed for zones and job types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NamedRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl NamedRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Company {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// One job posting as served by the listing feed.
///
/// Only the fields the pipeline reads are typed; everything else the feed sends
/// is kept in `extra` so a snapshot writes records back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<NamedRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub types: Vec<NamedRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    #[serde(
        rename = "publishedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl JobRecord {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            locations: Vec::new(),
            types: Vec::new(),
            company: None,
            published_at: None,
            wage: None,
            body: None,
            extra: Map::new(),
        }
    }

    pub fn with_zones<I, S>(mut self, zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = zones.into_iter().map(NamedRef::named).collect();
        self
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(NamedRef::named).collect();
        self
    }

    pub fn with_company(mut self, name: impl Into<String>) -> Self {
        self.company = Some(Company {
            name: Some(name.into()),
            ..Company::default()
        });
        self
    }

    /// Zone names in feed order; unnamed entries are skipped.
    pub fn zone_names(&self) -> impl Iterator<Item = &str> {
        present_names(&self.locations)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        present_names(&self.types)
    }

    /// Names the record lists for `dimension`, in feed order.
    pub fn dimension_values(&self, dimension: Dimension) -> Vec<&str> {
        match dimension {
            Dimension::Zone => self.zone_names().collect(),
            Dimension::Type => self.type_names().collect(),
        }
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company.as_ref().and_then(|c| c.name.as_deref())
    }

    pub fn company_name_or_na(&self) -> &str {
        self.company_name().unwrap_or(NOT_AVAILABLE)
    }

    pub fn company_description_or_na(&self) -> &str {
        self.company
            .as_ref()
            .and_then(|c| c.description.as_deref())
            .unwrap_or(NOT_AVAILABLE)
    }

    pub fn wage_or_na(&self) -> &str {
        self.wage
            .as_deref()
            .filter(|w| !w.trim().is_empty())
            .unwrap_or(NOT_AVAILABLE)
    }

    /// Parses `publishedAt`, accepting the feed layout or RFC 3339.
    pub fn published_at_parsed(&self) -> Option<NaiveDateTime> {
        let raw = self.published_at.as_deref()?.trim();
        NaiveDateTime::parse_from_str(raw, PUBLISHED_AT_FORMAT)
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.naive_utc())
            })
    }
}

fn present_names(refs: &[NamedRef]) -> impl Iterator<Item = &str> {
    refs.iter()
        .map(|r| r.name.as_str())
        .filter(|name| !name.trim().is_empty())
}

/// The feed sends `null` where a field is absent; read it as the default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Record attribute the statistics are partitioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Zone,
    Type,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Zone => "zone",
            Dimension::Type => "type",
        }
    }

    /// Column header used for this dimension in exported tables.
    pub fn column_label(&self) -> &'static str {
        match self {
            Dimension::Zone => "Zone",
            Dimension::Type => "Type",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDimension(pub String);

impl fmt::Display for UnknownDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown dimension `{}` (expected `zone` or `type`)", self.0)
    }
}

impl std::error::Error for UnknownDimension {}

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zone" => Ok(Dimension::Zone),
            "type" => Ok(Dimension::Type),
            other => Err(UnknownDimension(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_RECORD: &str = r#"{
        "id": 491881,
        "company": {"id": 7, "name": "Altar.io", "description": "Product studio", "logo": "x.png"},
        "title": "Senior Python Developer",
        "body": "<p>Python</p>",
        "types": [{"id": 1, "name": "Full-time"}],
        "locations": [{"id": 29, "name": "Lisboa"}, {"id": 18, "name": "Porto"}],
        "publishedAt": "2024-10-30 10:12:33",
        "slug": "senior-python-developer"
    }"#;

    #[test]
    fn feed_record_round_trips_unknown_fields() {
        let record: JobRecord = serde_json::from_str(FEED_RECORD).expect("parse");
        assert_eq!(record.id, 491881);
        assert_eq!(record.zone_names().collect::<Vec<_>>(), vec!["Lisboa", "Porto"]);
        assert_eq!(record.company_name(), Some("Altar.io"));
        assert_eq!(record.extra.get("slug"), Some(&JsonValue::from("senior-python-developer")));

        let back = serde_json::to_value(&record).expect("serialize");
        let original: JsonValue = serde_json::from_str(FEED_RECORD).expect("parse value");
        assert_eq!(back, original);
    }

    #[test]
    fn missing_fields_fall_back_to_not_available() {
        let record: JobRecord = serde_json::from_str(r#"{"id": 1}"#).expect("parse");
        assert!(record.title.is_empty());
        assert!(record.locations.is_empty());
        assert_eq!(record.company_name_or_na(), NOT_AVAILABLE);
        assert_eq!(record.company_description_or_na(), NOT_AVAILABLE);
        assert_eq!(record.wage_or_na(), NOT_AVAILABLE);
        assert!(record.published_at_parsed().is_none());
    }

    #[test]
    fn null_fields_decode_as_empty() {
        let page: Vec<JobRecord> = serde_json::from_str(
            r#"[
                {"id": 1, "title": null, "locations": null, "types": null, "company": null},
                {"id": 2, "title": "QA Tester", "locations": [{"id": 3, "name": null}],
                 "types": [{"id": 1, "name": "Full-time"}], "wage": null}
            ]"#,
        )
        .expect("page with nulls");

        assert_eq!(page.len(), 2);
        assert!(page[0].title.is_empty());
        assert!(page[0].locations.is_empty());
        assert!(page[0].types.is_empty());
        assert_eq!(page[0].company_name_or_na(), NOT_AVAILABLE);
        assert_eq!(page[1].locations.len(), 1);
        assert_eq!(page[1].zone_names().count(), 0);
        assert_eq!(page[1].type_names().collect::<Vec<_>>(), vec!["Full-time"]);
        assert_eq!(page[1].wage_or_na(), NOT_AVAILABLE);
    }

    #[test]
    fn published_at_accepts_feed_layout() {
        let mut record = JobRecord::new(1, "x");
        record.published_at = Some("2024-10-30 10:12:33".into());
        let parsed = record.published_at_parsed().expect("parsed");
        assert_eq!(parsed.format("%Y-%m-%d").to_string(), "2024-10-30");
    }

    #[test]
    fn dimension_parses_case_insensitively() {
        assert_eq!("Zone".parse::<Dimension>(), Ok(Dimension::Zone));
        assert_eq!("type".parse::<Dimension>(), Ok(Dimension::Type));
        assert!("salary".parse::<Dimension>().is_err());
    }
}
