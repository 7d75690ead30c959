use bingwebsearch::{AnswerType, Freshness, ResponseFilter, SafeSearch, SearchParams, TextFormat};
use clap::Parser;
use std::path::PathBuf;

/// Query the Bing Web Search v7 API
#[derive(Parser, Debug)]
#[command(name = "bingwebsearch", version)]
pub struct Args {
    /// Search text
    pub query: String,

    /// Number of results to return
    #[arg(long)]
    pub count: Option<u32>,

    /// Market, e.g. en-CA
    #[arg(long)]
    pub mkt: Option<String>,

    /// Country code, e.g. CA
    #[arg(long)]
    pub cc: Option<String>,

    /// Day, Week, Month, YYYY-MM-DD or YYYY-MM-DD..YYYY-MM-DD
    #[arg(long)]
    pub freshness: Option<Freshness>,

    /// Number of results to skip
    #[arg(long)]
    pub offset: Option<u32>,

    /// Answer types to include; prefix with `-` to exclude
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub response_filter: Vec<ResponseFilter>,

    /// Answer types to force into the response
    #[arg(long, value_delimiter = ',')]
    pub promote: Vec<AnswerType>,

    /// Off, Moderate or Strict
    #[arg(long)]
    pub safe_search: Option<SafeSearch>,

    /// UI language for display strings
    #[arg(long)]
    pub set_lang: Option<String>,

    /// Raw or HTML
    #[arg(long)]
    pub text_format: Option<TextFormat>,

    /// Mark query terms in display strings
    #[arg(long)]
    pub text_decorations: bool,

    #[arg(long)]
    pub answer_count: Option<u32>,

    /// Subscription key. Falls back to the config file, then to
    /// BING_SEARCH_V7_SUBSCRIPTION_KEY.
    #[arg(long)]
    pub subscription_key: Option<String>,

    /// Override the search endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// YAML config file (default: ./bingwebsearch.yaml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Save the raw response JSON to this file
    #[arg(long)]
    pub save_json: Option<PathBuf>,

    /// Write the dump exactly as received instead of re-indenting it
    #[arg(long)]
    pub verbatim: bool,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print the parsed response as JSON
    #[arg(long)]
    pub json: bool,

    /// Log to stderr at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            count: self.count,
            mkt: self.mkt.clone(),
            cc: self.cc.clone(),
            freshness: self.freshness,
            offset: self.offset,
            response_filter: self.response_filter.clone(),
            promote: self.promote.clone(),
            safe_search: self.safe_search,
            set_lang: self.set_lang.clone(),
            text_decorations: self.text_decorations.then_some(true),
            text_format: self.text_format,
            answer_count: self.answer_count,
            ..SearchParams::new(self.query.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).expect("valid args")
    }

    #[test]
    fn lists_split_on_commas_and_keep_exclusions() {
        let args = parse(&[
            "bingwebsearch",
            "Wayne Gretzky",
            "--response-filter",
            "Webpages,-News",
            "--promote",
            "videos",
            "--subscription-key",
            "k",
        ]);
        let params = args.search_params();
        assert_eq!(params.query, "Wayne Gretzky");
        assert_eq!(
            params.response_filter,
            vec![
                ResponseFilter::Include(AnswerType::Webpages),
                ResponseFilter::Exclude(AnswerType::News),
            ]
        );
        assert_eq!(params.promote, vec![AnswerType::Videos]);
    }

    #[test]
    fn typed_flags_parse_case_insensitively() {
        let args = parse(&[
            "bingwebsearch",
            "rust",
            "--safe-search",
            "strict",
            "--text-format",
            "html",
            "--freshness",
            "2024-01-01..2024-02-01",
            "--text-decorations",
            "--count",
            "5",
        ]);
        let params = args.search_params();
        assert_eq!(params.safe_search, Some(SafeSearch::Strict));
        assert_eq!(params.text_format, Some(TextFormat::Html));
        assert_eq!(params.freshness.map(|f| f.to_string()).as_deref(), Some("2024-01-01..2024-02-01"));
        assert_eq!(params.text_decorations, Some(true));
        assert_eq!(params.count, Some(5));
    }

    #[test]
    fn unset_flags_stay_unset() {
        let params = parse(&["bingwebsearch", "rust"]).search_params();
        assert_eq!(params.text_decorations, None);
        assert!(params.response_filter.is_empty());
        assert_eq!(params.mkt, None);
    }

    #[test]
    fn bad_enum_value_is_rejected() {
        assert!(Args::try_parse_from(["bingwebsearch", "rust", "--safe-search", "loose"]).is_err());
        assert!(Args::try_parse_from(["bingwebsearch", "rust", "--freshness", "2024-03-01..2024-01-01"]).is_err());
    }
}
