//! Typed model of the Bing Web Search v7 response.
//!
//! Field aliasing is spelled out per field with `#[serde(rename = ...)]`; the
//! wire key always sits directly above the internal name. Required fields fail
//! parsing when missing, `null`, or of the wrong type. Optional fields treat
//! `null` and absence the same way (`None`). Unknown keys are ignored.
//!
//! Sections the client does not interpret (computation, entities, images,
//! news, videos, related searches, spell suggestions, time zone) are kept as
//! opaque JSON.

use crate::error::{Result, SearchError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Always `SearchResponse` for a successful call.
    #[serde(rename = "_type")]
    pub response_type: String,

    #[serde(rename = "queryContext")]
    pub query_context: BTreeMap<String, String>,

    #[serde(rename = "webPages", default, skip_serializing_if = "Option::is_none")]
    pub web_pages: Option<WebPages>,

    #[serde(rename = "rankingResponse", default, skip_serializing_if = "Option::is_none")]
    pub ranking_response: Option<RankingResponse>,

    #[serde(rename = "computation", default, skip_serializing_if = "Option::is_none")]
    pub computation: Option<Value>,

    #[serde(rename = "entities", default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Value>,

    #[serde(rename = "images", default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Value>,

    #[serde(rename = "news", default, skip_serializing_if = "Option::is_none")]
    pub news: Option<Value>,

    #[serde(rename = "videos", default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Value>,

    #[serde(rename = "relatedSearches", default, skip_serializing_if = "Option::is_none")]
    pub related_searches: Option<Value>,

    #[serde(rename = "spellSuggestions", default, skip_serializing_if = "Option::is_none")]
    pub spell_suggestions: Option<Value>,

    #[serde(rename = "timeZone", default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<Value>,
}

/// Placement of answers on the results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResponse {
    #[serde(rename = "mainline")]
    pub mainline: Mainline,

    #[serde(rename = "pole", default, skip_serializing_if = "Option::is_none")]
    pub pole: Option<Mainline>,

    #[serde(rename = "sidebar", default, skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<Mainline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mainline {
    #[serde(rename = "items")]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "answerType")]
    pub answer_type: String,

    /// Absent when the whole answer is placed rather than a single result,
    /// so this is optional even though the minimal schema lists it as plain.
    #[serde(rename = "resultIndex", default, skip_serializing_if = "Option::is_none")]
    pub result_index: Option<u32>,

    /// Usually `{"id": ...}` pointing at an answer or result.
    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebPages {
    #[serde(rename = "webSearchUrl", default, skip_serializing_if = "Option::is_none")]
    pub web_search_url: Option<String>,

    #[serde(
        rename = "totalEstimatedMatches",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_estimated_matches: Option<u64>,

    #[serde(
        rename = "someResultsRemoved",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub some_results_removed: Option<bool>,

    #[serde(rename = "value")]
    pub value: Vec<WebPageValue>,
}

/// A single web result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebPageValue {
    #[serde(rename = "id")]
    pub id: String,

    #[serde(rename = "name")]
    pub name: String,

    #[serde(rename = "url")]
    pub url: String,

    #[serde(rename = "isFamilyFriendly")]
    pub is_family_friendly: bool,

    #[serde(rename = "displayUrl")]
    pub display_url: String,

    #[serde(rename = "snippet")]
    pub snippet: String,

    #[serde(rename = "dateLastCrawled", with = "crawl_time")]
    pub date_last_crawled: DateTime<Utc>,

    #[serde(rename = "language")]
    pub language: String,

    #[serde(rename = "isNavigational")]
    pub is_navigational: bool,
}

impl SearchResponse {
    /// Parse a raw response body.
    ///
    /// ```
    /// use bingwebsearch::{SearchError, SearchResponse};
    ///
    /// let ok = SearchResponse::from_slice(br#"{"_type":"SearchResponse","queryContext":{"originalQuery":"rust"}}"#)
    ///     .unwrap();
    /// assert_eq!(ok.original_query(), Some("rust"));
    /// assert!(ok.web_results().is_empty());
    ///
    /// let err = SearchResponse::from_slice(br#"{"_type":"SearchResponse"}"#).unwrap_err();
    /// assert!(matches!(err, SearchError::SchemaValidation(_)));
    /// ```
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Web results, or an empty slice when the response has no `webPages`.
    pub fn web_results(&self) -> &[WebPageValue] {
        self.web_pages
            .as_ref()
            .map(|w| w.value.as_slice())
            .unwrap_or_default()
    }

    pub fn original_query(&self) -> Option<&str> {
        self.query_context.get("originalQuery").map(String::as_str)
    }
}

impl FromStr for SearchResponse {
    type Err = SearchError;

    /// Parse a response from text; errors carry line and column.
    fn from_str(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

/// `dateLastCrawled` codec.
///
/// The API sends RFC 3339 with seven fractional digits
/// (`2023-01-20T08:23:00.0000000Z`); older payloads omit the offset, which we
/// read as UTC.
pub mod crawl_time {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| {
            de::Error::custom(format!("dateLastCrawled is not an ISO-8601 timestamp: `{raw}`"))
        })
    }
}
