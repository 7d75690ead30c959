//! Query-parameter and header builder.
//!
//! Every parameter has exactly one wire key, listed in [`wire`]. Unset values
//! are left out of the request entirely; nothing is ever sent as an empty
//! string. List-valued parameters (`responseFilter`, `promote`) are sent as a
//! single comma-joined value, the form the API documents.

use crate::error::{Result, SearchError};
use bingwebsearch_common::{SUBSCRIPTION_KEY_ENV, SUBSCRIPTION_KEY_HEADER};
use bingwebsearch_config::{HeaderDefaults, ParamDefaults};
use chrono::NaiveDate;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, PRAGMA, USER_AGENT};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Wire names of the query parameters.
pub mod wire {
    pub const QUERY: &str = "q";
    pub const COUNT: &str = "count";
    pub const MKT: &str = "mkt";
    pub const CC: &str = "cc";
    pub const FRESHNESS: &str = "freshness";
    pub const OFFSET: &str = "offset";
    pub const RESPONSE_FILTER: &str = "responseFilter";
    pub const PROMOTE: &str = "promote";
    pub const SAFE_SEARCH: &str = "safeSearch";
    pub const SET_LANG: &str = "setLang";
    pub const TEXT_DECORATIONS: &str = "textDecorations";
    pub const TEXT_FORMAT: &str = "textFormat";
    pub const ANSWER_COUNT: &str = "answerCount";

    pub const CLIENT_ID_HEADER: &str = "x-msedge-clientid";
    pub const CLIENT_IP_HEADER: &str = "x-msedge-clientip";
    pub const LOCATION_HEADER: &str = "x-search-location";
}

// ==============================
// Enumerated parameter values
// ==============================

/// Answer kinds the API can return, used by `responseFilter` and `promote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerType {
    Computation,
    Entities,
    Images,
    News,
    Places,
    RelatedSearches,
    SpellSuggestions,
    TimeZone,
    Translations,
    Videos,
    Webpages,
}

impl AnswerType {
    pub const ALL: [AnswerType; 11] = [
        AnswerType::Computation,
        AnswerType::Entities,
        AnswerType::Images,
        AnswerType::News,
        AnswerType::Places,
        AnswerType::RelatedSearches,
        AnswerType::SpellSuggestions,
        AnswerType::TimeZone,
        AnswerType::Translations,
        AnswerType::Videos,
        AnswerType::Webpages,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AnswerType::Computation => "Computation",
            AnswerType::Entities => "Entities",
            AnswerType::Images => "Images",
            AnswerType::News => "News",
            AnswerType::Places => "Places",
            AnswerType::RelatedSearches => "RelatedSearches",
            AnswerType::SpellSuggestions => "SpellSuggestions",
            AnswerType::TimeZone => "TimeZone",
            AnswerType::Translations => "Translations",
            AnswerType::Videos => "Videos",
            AnswerType::Webpages => "Webpages",
        }
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        AnswerType::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SearchError::InvalidParameter(format!("unknown answer type `{s}`")))
    }
}

/// One `responseFilter` entry; exclusions are sent with a leading `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseFilter {
    Include(AnswerType),
    Exclude(AnswerType),
}

impl fmt::Display for ResponseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseFilter::Include(a) => write!(f, "{a}"),
            ResponseFilter::Exclude(a) => write!(f, "-{a}"),
        }
    }
}

impl FromStr for ResponseFilter {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().strip_prefix('-') {
            Some(rest) => Ok(ResponseFilter::Exclude(rest.parse()?)),
            None => Ok(ResponseFilter::Include(s.parse()?)),
        }
    }
}

impl From<AnswerType> for ResponseFilter {
    fn from(a: AnswerType) -> Self {
        ResponseFilter::Include(a)
    }
}

/// Age filter on discovered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Day,
    Week,
    Month,
    /// Pages discovered on this date.
    On(NaiveDate),
    /// Pages discovered between the two dates, inclusive.
    Range(NaiveDate, NaiveDate),
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Freshness::Day => f.write_str("Day"),
            Freshness::Week => f.write_str("Week"),
            Freshness::Month => f.write_str("Month"),
            Freshness::On(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Freshness::Range(from, to) => {
                write!(f, "{}..{}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
            }
        }
    }
}

impl FromStr for Freshness {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let date = |raw: &str| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                SearchError::InvalidParameter(format!("invalid freshness date `{raw}`: {e}"))
            })
        };
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Freshness::Day),
            "week" => Ok(Freshness::Week),
            "month" => Ok(Freshness::Month),
            _ => match s.split_once("..") {
                Some((from, to)) => {
                    let f = Freshness::Range(date(from)?, date(to)?);
                    f.validate()?;
                    Ok(f)
                }
                None => Ok(Freshness::On(date(s)?)),
            },
        }
    }
}

impl Freshness {
    fn validate(&self) -> Result<()> {
        match self {
            Freshness::Range(from, to) if from > to => Err(SearchError::InvalidParameter(
                format!("freshness range starts after it ends: {self}"),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeSearch {
    Off,
    Moderate,
    Strict,
}

impl fmt::Display for SafeSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SafeSearch::Off => "Off",
            SafeSearch::Moderate => "Moderate",
            SafeSearch::Strict => "Strict",
        })
    }
}

impl FromStr for SafeSearch {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(SafeSearch::Off),
            "moderate" => Ok(SafeSearch::Moderate),
            "strict" => Ok(SafeSearch::Strict),
            other => Err(SearchError::InvalidParameter(format!(
                "unknown safe search level `{other}`"
            ))),
        }
    }
}

/// Markup used for hit highlighting in display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Raw,
    Html,
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TextFormat::Raw => "Raw",
            TextFormat::Html => "HTML",
        })
    }
}

impl FromStr for TextFormat {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(TextFormat::Raw),
            "html" => Ok(TextFormat::Html),
            other => Err(SearchError::InvalidParameter(format!(
                "unknown text format `{other}`"
            ))),
        }
    }
}

// ==============================
// Query parameters
// ==============================

/// Search request parameters. Only `query` is required.
///
/// ```
/// use bingwebsearch::{AnswerType, SafeSearch, SearchParams};
///
/// let params = SearchParams {
///     count: Some(5),
///     safe_search: Some(SafeSearch::Strict),
///     response_filter: vec![AnswerType::Webpages.into()],
///     ..SearchParams::new("Wayne Gretzky")
/// };
/// let query = params.to_query().unwrap();
///
/// assert_eq!(query[0], ("q", "Wayne Gretzky".into()));
/// assert!(query.contains(&("safeSearch", "Strict".into())));
/// assert!(query.iter().all(|(k, _)| *k != "mkt"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub count: Option<u32>,
    /// Market, e.g. `en-CA`.
    pub mkt: Option<String>,
    /// Country code, e.g. `CA`.
    pub cc: Option<String>,
    pub freshness: Option<Freshness>,
    pub offset: Option<u32>,
    pub response_filter: Vec<ResponseFilter>,
    pub promote: Vec<AnswerType>,
    pub safe_search: Option<SafeSearch>,
    pub set_lang: Option<String>,
    pub text_decorations: Option<bool>,
    pub text_format: Option<TextFormat>,
    pub answer_count: Option<u32>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Fill every unset parameter from configured defaults.
    pub fn with_defaults(mut self, defaults: &ParamDefaults) -> Result<Self> {
        self.count = self.count.or(defaults.count);
        self.answer_count = self.answer_count.or(defaults.answer_count);
        self.text_decorations = self.text_decorations.or(defaults.text_decorations);
        self.mkt = self.mkt.or_else(|| defaults.mkt.clone());
        self.cc = self.cc.or_else(|| defaults.cc.clone());
        self.set_lang = self.set_lang.or_else(|| defaults.set_lang.clone());
        if self.freshness.is_none() {
            self.freshness = parse_default::<Freshness>(defaults.freshness.as_deref())?;
        }
        if self.safe_search.is_none() {
            self.safe_search = parse_default::<SafeSearch>(defaults.safe_search.as_deref())?;
        }
        if self.text_format.is_none() {
            self.text_format = parse_default::<TextFormat>(defaults.text_format.as_deref())?;
        }
        if self.response_filter.is_empty() {
            self.response_filter = parse_default_list(defaults.response_filter.as_deref())?;
        }
        if self.promote.is_empty() {
            self.promote = parse_default_list(defaults.promote.as_deref())?;
        }
        Ok(self)
    }

    /// Build the query string pairs, `q` first, absent values omitted.
    pub fn to_query(&self) -> Result<Vec<(&'static str, Cow<'_, str>)>> {
        if self.query.trim().is_empty() {
            return Err(SearchError::InvalidParameter(
                "query text must not be empty".into(),
            ));
        }
        if let Some(f) = &self.freshness {
            f.validate()?;
        }

        let mut out: Vec<(&'static str, Cow<'_, str>)> =
            vec![(wire::QUERY, Cow::Borrowed(self.query.as_str()))];

        if let Some(n) = self.count {
            out.push((wire::COUNT, n.to_string().into()));
        }
        push_text(&mut out, wire::MKT, self.mkt.as_deref());
        push_text(&mut out, wire::CC, self.cc.as_deref());
        if let Some(f) = &self.freshness {
            out.push((wire::FRESHNESS, f.to_string().into()));
        }
        if let Some(n) = self.offset {
            out.push((wire::OFFSET, n.to_string().into()));
        }
        if !self.response_filter.is_empty() {
            out.push((wire::RESPONSE_FILTER, join(&self.response_filter).into()));
        }
        if !self.promote.is_empty() {
            out.push((wire::PROMOTE, join(&self.promote).into()));
        }
        if let Some(s) = &self.safe_search {
            out.push((wire::SAFE_SEARCH, s.to_string().into()));
        }
        push_text(&mut out, wire::SET_LANG, self.set_lang.as_deref());
        if let Some(b) = self.text_decorations {
            out.push((wire::TEXT_DECORATIONS, b.to_string().into()));
        }
        if let Some(t) = &self.text_format {
            out.push((wire::TEXT_FORMAT, t.to_string().into()));
        }
        if let Some(n) = self.answer_count {
            out.push((wire::ANSWER_COUNT, n.to_string().into()));
        }
        Ok(out)
    }
}

fn parse_default<T: FromStr<Err = SearchError>>(raw: Option<&str>) -> Result<Option<T>> {
    raw.map(str::parse::<T>)
        .transpose()
        .map_err(|e| SearchError::Configuration(format!("invalid default: {e}")))
}

fn parse_default_list<T: FromStr<Err = SearchError>>(raw: Option<&[String]>) -> Result<Vec<T>> {
    raw.unwrap_or_default()
        .iter()
        .map(|s| s.parse::<T>())
        .collect::<Result<Vec<T>>>()
        .map_err(|e| SearchError::Configuration(format!("invalid default: {e}")))
}

fn push_text<'a>(
    out: &mut Vec<(&'static str, Cow<'a, str>)>,
    key: &'static str,
    value: Option<&'a str>,
) {
    if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
        out.push((key, Cow::Borrowed(v)));
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

// ==============================
// Headers
// ==============================

/// Request headers. The subscription key falls back to
/// `BING_SEARCH_V7_SUBSCRIPTION_KEY` when not set here.
#[derive(Clone, Default, PartialEq)]
pub struct RequestHeaders {
    pub subscription_key: Option<String>,
    pub accept_language: Option<String>,
    /// Typically `no-cache` to bypass cached results.
    pub pragma: Option<String>,
    pub user_agent: Option<String>,
    pub client_id: Option<String>,
    pub client_ip: Option<String>,
    pub location: Option<String>,
}

impl fmt::Debug for RequestHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHeaders")
            .field(
                "subscription_key",
                &self.subscription_key.as_ref().map(|_| "<redacted>"),
            )
            .field("accept_language", &self.accept_language)
            .field("pragma", &self.pragma)
            .field("user_agent", &self.user_agent)
            .field("client_id", &self.client_id)
            .field("client_ip", &self.client_ip)
            .field("location", &self.location)
            .finish()
    }
}

impl From<&HeaderDefaults> for RequestHeaders {
    fn from(h: &HeaderDefaults) -> Self {
        Self {
            subscription_key: None,
            accept_language: h.accept_language.clone(),
            pragma: h.pragma.clone(),
            user_agent: h.user_agent.clone(),
            client_id: h.client_id.clone(),
            client_ip: h.client_ip.clone(),
            location: h.location.clone(),
        }
    }
}

impl RequestHeaders {
    pub fn with_subscription_key(mut self, key: impl Into<String>) -> Self {
        self.subscription_key = Some(key.into());
        self
    }

    /// Resolve the key and build the header map.
    ///
    /// Fails with [`SearchError::Configuration`] when no key can be found.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        self.to_header_map_with(|name| std::env::var(name).ok())
    }

    fn to_header_map_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<HeaderMap> {
        let key = resolve_subscription_key_with(self.subscription_key.as_deref(), env)?;

        let mut map = HeaderMap::new();
        let mut key_value = header_value(SUBSCRIPTION_KEY_HEADER, &key)?;
        key_value.set_sensitive(true);
        map.insert(HeaderName::from_static("ocp-apim-subscription-key"), key_value);

        let optional = [
            (ACCEPT_LANGUAGE, &self.accept_language),
            (PRAGMA, &self.pragma),
            (USER_AGENT, &self.user_agent),
            (HeaderName::from_static(wire::CLIENT_ID_HEADER), &self.client_id),
            (HeaderName::from_static(wire::CLIENT_IP_HEADER), &self.client_ip),
            (HeaderName::from_static(wire::LOCATION_HEADER), &self.location),
        ];
        for (name, value) in optional {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                let hv = header_value(name.as_str(), v)?;
                map.insert(name, hv);
            }
        }
        Ok(map)
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value.trim())
        .map_err(|e| SearchError::Configuration(format!("invalid value for header {name}: {e}")))
}

/// Explicit key if non-blank, else `BING_SEARCH_V7_SUBSCRIPTION_KEY`.
pub fn resolve_subscription_key(explicit: Option<&str>) -> Result<String> {
    resolve_subscription_key_with(explicit, |name| std::env::var(name).ok())
}

fn resolve_subscription_key_with(
    explicit: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    explicit
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| {
            env(SUBSCRIPTION_KEY_ENV)
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        })
        .ok_or_else(|| {
            SearchError::Configuration(format!(
                "no subscription key: pass one explicitly or set {SUBSCRIPTION_KEY_ENV}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn keys(q: &[(&'static str, Cow<'_, str>)]) -> Vec<&'static str> {
        q.iter().map(|(k, _)| *k).collect()
    }

    fn fully_set() -> SearchParams {
        SearchParams {
            count: Some(25),
            mkt: Some("en-CA".into()),
            cc: Some("CA".into()),
            freshness: Some(Freshness::Week),
            offset: Some(50),
            response_filter: vec![
                ResponseFilter::Include(AnswerType::Webpages),
                ResponseFilter::Exclude(AnswerType::News),
            ],
            promote: vec![AnswerType::Videos, AnswerType::Images],
            safe_search: Some(SafeSearch::Moderate),
            set_lang: Some("fr".into()),
            text_decorations: Some(true),
            text_format: Some(TextFormat::Html),
            answer_count: Some(2),
            ..SearchParams::new("Wayne Gretzky")
        }
    }

    #[test]
    fn unset_parameters_are_omitted() {
        let params = SearchParams::new("rust");
        let q = params.to_query().unwrap();
        assert_eq!(q, vec![("q", Cow::Borrowed("rust"))]);
    }

    #[test]
    fn text_parameters_are_sent_trimmed() {
        let params = SearchParams {
            mkt: Some(" en-CA ".into()),
            cc: Some("\tCA".into()),
            set_lang: Some("   ".into()),
            ..SearchParams::new("rust")
        };
        let q = params.to_query().unwrap();
        let got: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
        assert_eq!(got, vec![("q", "rust"), ("mkt", "en-CA"), ("cc", "CA")]);
    }

    #[test]
    fn every_set_parameter_uses_its_wire_key() {
        let params = fully_set();
        let q = params.to_query().unwrap();
        let expected: Vec<(&str, &str)> = vec![
            ("q", "Wayne Gretzky"),
            ("count", "25"),
            ("mkt", "en-CA"),
            ("cc", "CA"),
            ("freshness", "Week"),
            ("offset", "50"),
            ("responseFilter", "Webpages,-News"),
            ("promote", "Videos,Images"),
            ("safeSearch", "Moderate"),
            ("setLang", "fr"),
            ("textDecorations", "true"),
            ("textFormat", "HTML"),
            ("answerCount", "2"),
        ];
        let got: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn each_parameter_is_independently_optional() {
        let full = fully_set();
        let all = keys(&full.to_query().unwrap());
        for (idx, key) in all.iter().enumerate().skip(1) {
            let mut p = full.clone();
            match idx {
                1 => p.count = None,
                2 => p.mkt = None,
                3 => p.cc = None,
                4 => p.freshness = None,
                5 => p.offset = None,
                6 => p.response_filter.clear(),
                7 => p.promote.clear(),
                8 => p.safe_search = None,
                9 => p.set_lang = None,
                10 => p.text_decorations = None,
                11 => p.text_format = None,
                12 => p.answer_count = None,
                _ => unreachable!(),
            }
            let got = keys(&p.to_query().unwrap());
            assert!(!got.contains(key), "{key} should be omitted");
            assert_eq!(got.len(), all.len() - 1);
        }
    }

    #[test]
    fn blank_strings_are_never_sent() {
        let params = SearchParams {
            mkt: Some(String::new()),
            set_lang: Some("  ".into()),
            ..SearchParams::new("rust")
        };
        assert_eq!(keys(&params.to_query().unwrap()), vec!["q"]);
    }

    #[test]
    fn empty_query_is_rejected() {
        for q in ["", "   "] {
            let err = SearchParams::new(q).to_query().unwrap_err();
            assert!(matches!(err, SearchError::InvalidParameter(_)));
        }
    }

    #[test]
    fn freshness_forms() {
        let d = |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        assert_eq!("day".parse::<Freshness>().unwrap(), Freshness::Day);
        assert_eq!(
            "2019-02-01..2019-05-30".parse::<Freshness>().unwrap(),
            Freshness::Range(d("2019-02-01"), d("2019-05-30"))
        );
        assert_eq!(
            Freshness::Range(d("2019-02-01"), d("2019-05-30")).to_string(),
            "2019-02-01..2019-05-30"
        );
        assert_eq!("2019-02-04".parse::<Freshness>().unwrap(), Freshness::On(d("2019-02-04")));
        assert!("2019-05-30..2019-02-01".parse::<Freshness>().is_err());
        assert!("fortnight".parse::<Freshness>().is_err());

        let backwards = SearchParams {
            freshness: Some(Freshness::Range(d("2020-01-02"), d("2020-01-01"))),
            ..SearchParams::new("rust")
        };
        assert!(matches!(
            backwards.to_query(),
            Err(SearchError::InvalidParameter(_))
        ));
    }

    #[test]
    fn enum_parsing_is_case_insensitive() {
        assert_eq!("webpages".parse::<AnswerType>().unwrap(), AnswerType::Webpages);
        assert_eq!(
            "-relatedsearches".parse::<ResponseFilter>().unwrap(),
            ResponseFilter::Exclude(AnswerType::RelatedSearches)
        );
        assert_eq!("STRICT".parse::<SafeSearch>().unwrap(), SafeSearch::Strict);
        assert_eq!("html".parse::<TextFormat>().unwrap(), TextFormat::Html);
        assert!("Podcasts".parse::<AnswerType>().is_err());
        for a in AnswerType::ALL {
            assert_eq!(a.as_str().parse::<AnswerType>().unwrap(), a);
        }
    }

    #[test]
    fn defaults_fill_only_unset_fields() {
        let defaults = ParamDefaults {
            count: Some(10),
            mkt: Some("en-CA".into()),
            safe_search: Some("Strict".into()),
            response_filter: Some(vec!["Webpages".into()]),
            ..Default::default()
        };
        let params = SearchParams {
            count: Some(3),
            ..SearchParams::new("rust")
        }
        .with_defaults(&defaults)
        .unwrap();

        assert_eq!(params.count, Some(3));
        assert_eq!(params.mkt.as_deref(), Some("en-CA"));
        assert_eq!(params.safe_search, Some(SafeSearch::Strict));
        assert_eq!(
            params.response_filter,
            vec![ResponseFilter::Include(AnswerType::Webpages)]
        );
        assert_eq!(params.offset, None);
    }

    #[test]
    fn bad_defaults_are_configuration_errors() {
        let defaults = ParamDefaults {
            text_format: Some("markdown".into()),
            ..Default::default()
        };
        let err = SearchParams::new("rust").with_defaults(&defaults).unwrap_err();
        assert!(matches!(err, SearchError::Configuration(_)));
    }

    #[test]
    fn explicit_key_wins_over_env() {
        let env = |_: &str| Some("from-env".to_string());
        assert_eq!(
            resolve_subscription_key_with(Some("explicit"), env).unwrap(),
            "explicit"
        );
        assert_eq!(resolve_subscription_key_with(None, env).unwrap(), "from-env");
        assert_eq!(resolve_subscription_key_with(Some("  "), env).unwrap(), "from-env");
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let err = resolve_subscription_key_with(None, no_env).unwrap_err();
        assert!(matches!(err, SearchError::Configuration(ref m) if m.contains(SUBSCRIPTION_KEY_ENV)));

        let blank_env = |_: &str| Some(" ".to_string());
        assert!(resolve_subscription_key_with(None, blank_env).is_err());
    }

    #[test]
    fn headers_include_only_present_values() {
        let headers = RequestHeaders {
            accept_language: Some("fr-CA".into()),
            pragma: Some("no-cache".into()),
            ..RequestHeaders::default().with_subscription_key("abc")
        };
        let map = headers.to_header_map_with(no_env).unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map["ocp-apim-subscription-key"], "abc");
        assert!(map["ocp-apim-subscription-key"].is_sensitive());
        assert_eq!(map[ACCEPT_LANGUAGE], "fr-CA");
        assert_eq!(map[PRAGMA], "no-cache");
        assert!(map.get(USER_AGENT).is_none());
        assert!(map.get(wire::CLIENT_ID_HEADER).is_none());
    }

    #[test]
    fn all_headers_map_to_wire_names() {
        let headers = RequestHeaders {
            subscription_key: Some("abc".into()),
            accept_language: Some("en".into()),
            pragma: Some("no-cache".into()),
            user_agent: Some("agent/1.0".into()),
            client_id: Some("cid".into()),
            client_ip: Some("10.0.0.1".into()),
            location: Some("lat:47.6;long:-122.1;re:100".into()),
        };
        let map = headers.to_header_map_with(no_env).unwrap();
        assert_eq!(map.len(), 7);
        assert_eq!(map["user-agent"], "agent/1.0");
        assert_eq!(map["x-msedge-clientid"], "cid");
        assert_eq!(map["x-msedge-clientip"], "10.0.0.1");
        assert_eq!(map["x-search-location"], "lat:47.6;long:-122.1;re:100");
    }

    #[test]
    fn header_env_fallback_and_invalid_values() {
        let env = |_: &str| Some("env-key".to_string());
        let map = RequestHeaders::default().to_header_map_with(env).unwrap();
        assert_eq!(map["ocp-apim-subscription-key"], "env-key");

        let bad = RequestHeaders {
            user_agent: Some("bad\nagent".into()),
            ..RequestHeaders::default().with_subscription_key("abc")
        };
        assert!(matches!(
            bad.to_header_map_with(no_env),
            Err(SearchError::Configuration(_))
        ));
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let headers = RequestHeaders::default().with_subscription_key("top-secret");
        let shown = format!("{headers:?}");
        assert!(!shown.contains("top-secret"));
        assert!(shown.contains("<redacted>"));
    }
}
