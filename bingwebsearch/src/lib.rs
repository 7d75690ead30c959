//! Typed, blocking client for the Bing Web Search v7 API.
//!
//! The crate has three parts: a parameter and header builder ([`params`]), a
//! response model ([`types`]) and a client that performs a single GET per
//! search ([`client`]), optionally dumping the raw body to disk ([`dump`]).
//!
//! # Examples
//! ```no_run
//! use bingwebsearch::{BingWebSearch, SafeSearch, SearchParams};
//!
//! # fn main() -> bingwebsearch::Result<()> {
//! let client = BingWebSearch::new()?; // key from BING_SEARCH_V7_SUBSCRIPTION_KEY
//! let mut params = SearchParams::new("Wayne Gretzky");
//! params.count = Some(10);
//! params.safe_search = Some(SafeSearch::Strict);
//!
//! let res = client.search(&params)?;
//! for page in res.web_results() {
//!     println!("{} {}", page.name, page.url);
//! }
//! # Ok(())
//! # }
//! ```
pub mod client;
pub mod dump;
pub mod error;
pub mod params;
pub mod types;

pub use bingwebsearch_http::HttpError;
pub use client::{BingWebSearch, SearchOptions};
pub use dump::DumpFormat;
pub use error::{Result, SearchError};
pub use params::{
    AnswerType, Freshness, RequestHeaders, ResponseFilter, SafeSearch, SearchParams, TextFormat,
    resolve_subscription_key,
};
pub use types::{Item, Mainline, RankingResponse, SearchResponse, WebPageValue, WebPages};

/// One-shot search against the public endpoint with the key from the
/// environment.
pub fn search(params: &SearchParams) -> Result<SearchResponse> {
    BingWebSearch::new()?.search(params)
}
