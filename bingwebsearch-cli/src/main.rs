use anyhow::{Context, Result};
use args::Args;
use bingwebsearch::{BingWebSearch, DumpFormat, SearchError, SearchOptions, SearchResponse};
use bingwebsearch_common::observability::{LogConfig, init_logging};
use bingwebsearch_config::{SearchConfig, SearchConfigLoader};
use clap::Parser;
mod args;

const DEFAULT_CONFIG_FILE: &str = "bingwebsearch.yaml";

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LogConfig {
        emit_stderr: args.verbose,
        default_filter: if args.verbose { "debug" } else { "info" },
        ..LogConfig::default()
    })?;

    let cfg = load_config(&args)?;
    let client = BingWebSearch::from_config(&cfg)?;
    let opts = SearchOptions {
        save_json: cfg.save_json.clone(),
        dump_format: if args.verbatim {
            DumpFormat::Verbatim
        } else {
            DumpFormat::Pretty
        },
        timeout: None,
    };

    let res = match client.search_with(&args.search_params(), &opts) {
        Ok(res) => res,
        // The response arrived; only the dump failed. Report it and carry on.
        Err(err @ SearchError::Dump { .. }) => {
            eprintln!("warning: {err}");
            let body = err.received_body().unwrap_or_default();
            SearchResponse::from_slice(body)?
        }
        Err(err) => return Err(err.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&res)?);
    } else {
        print_summary(&res);
    }
    Ok(())
}

/// Config file and `BINGWEBSEARCH__*` env first, then command-line flags on top.
fn load_config(args: &Args) -> Result<SearchConfig> {
    let loader = match &args.config {
        Some(path) => SearchConfigLoader::new().with_file(path),
        None => SearchConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let mut cfg = loader.load().context("loading configuration")?;

    if let Some(endpoint) = &args.endpoint {
        cfg.endpoint = endpoint.clone();
    }
    if let Some(key) = args.subscription_key.as_deref().filter(|k| !k.trim().is_empty()) {
        cfg.subscription_key = Some(key.to_string());
    }
    if let Some(secs) = args.timeout_secs {
        cfg.timeout_secs = secs;
    }
    if let Some(path) = &args.save_json {
        cfg.save_json = Some(path.clone());
    }
    tracing::debug!(endpoint=%cfg.endpoint, timeout_secs=cfg.timeout_secs, "cli.config_loaded");
    Ok(cfg)
}

fn print_summary(res: &SearchResponse) {
    let query = res.original_query().unwrap_or_default();
    match res.web_pages.as_ref().and_then(|w| w.total_estimated_matches) {
        Some(total) => println!("{query}: about {total} results"),
        None => println!("{query}"),
    }
    for (i, page) in res.web_results().iter().enumerate() {
        println!();
        println!("{:>2}. {}", i + 1, page.name);
        println!("    {}", page.url);
        println!("    {}", page.snippet);
    }
}
