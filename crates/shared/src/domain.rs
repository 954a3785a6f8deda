use std::{collections::HashSet, fmt, str::FromStr};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Store-assigned city identifier.
///
/// Hosted mock stores hand ids back either as JSON numbers or as numeric
/// strings, so deserialization accepts both. Serialization is always numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CityId(pub i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid city id '{0}': expected an integer")]
pub struct InvalidCityId(pub String);

impl FromStr for CityId {
    type Err = InvalidCityId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim()
            .parse::<i64>()
            .map(CityId)
            .map_err(|_| InvalidCityId(raw.to_string()))
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CityId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for CityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(value) => Ok(CityId(value)),
            RawId::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

/// A city as submitted for creation, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCity {
    pub city_name: String,
    pub country: String,
    pub emoji: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub city_name: String,
    pub country: String,
    pub emoji: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub position: Position,
    pub id: CityId,
}

impl City {
    pub fn from_draft(id: CityId, draft: NewCity) -> Self {
        Self {
            city_name: draft.city_name,
            country: draft.country,
            emoji: draft.emoji,
            date: draft.date,
            notes: draft.notes,
            position: draft.position,
            id,
        }
    }

    /// The city's fields without its id.
    pub fn draft(&self) -> NewCity {
        NewCity {
            city_name: self.city_name.clone(),
            country: self.country.clone(),
            emoji: self.emoji.clone(),
            date: self.date.clone(),
            notes: self.notes.clone(),
            position: self.position,
        }
    }

    pub fn visit_date(&self) -> Option<DateTime<FixedOffset>> {
        parse_visit_date(&self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("city name must not be empty")]
    EmptyCityName,
    #[error("country must not be empty")]
    EmptyCountry,
    #[error("date '{0}' is not an ISO-8601 timestamp")]
    InvalidDate(String),
}

impl NewCity {
    /// Checks the fields a store insists on. Positions are left unchecked.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.city_name.trim().is_empty() {
            return Err(ValidationError::EmptyCityName);
        }
        if self.country.trim().is_empty() {
            return Err(ValidationError::EmptyCountry);
        }
        if parse_visit_date(&self.date).is_none() {
            return Err(ValidationError::InvalidDate(self.date.clone()));
        }
        Ok(())
    }
}

fn parse_visit_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).ok()
}

/// Renders a stored date as e.g. `October 19, 2026`; unparseable input is
/// returned untouched.
pub fn format_visit_date(raw: &str) -> String {
    match parse_visit_date(raw) {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySummary {
    pub country: String,
    pub emoji: String,
}

/// One entry per distinct country, in the order each country is first seen.
pub fn unique_countries(cities: &[City]) -> Vec<CountrySummary> {
    let mut seen = HashSet::new();
    cities
        .iter()
        .filter(|city| seen.insert(city.country.as_str()))
        .map(|city| CountrySummary {
            country: city.country.clone(),
            emoji: city.emoji.clone(),
        })
        .collect()
}
