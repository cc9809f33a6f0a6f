mod page;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use judge_client::{ClientConfig, Endpoints, ReqwestApi, SharedOverrides};
use judge_core::BreadcrumbItem;
use judge_logging::{judge_info, LevelFilter, LogDestination};

use crate::page::{open_page, LoadPolicy, PageKind};

const USAGE: &str = "usage: judge_app [--retries N] <path> [config.ron]";

/// Command line: the path to open, an optional config file and how many
/// times a failed load is retried. Failures are shown as-is unless the
/// caller opts into retries.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    path: Option<String>,
    config: Option<String>,
    retries: u32,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => parsed.help = true,
            "--retries" => {
                let count = args.next().context("--retries needs a count")?;
                parsed.retries = count
                    .parse()
                    .with_context(|| format!("invalid retry count {count:?}"))?;
            }
            _ if parsed.path.is_none() => parsed.path = Some(arg),
            _ if parsed.config.is_none() => parsed.config = Some(arg),
            _ => anyhow::bail!("unexpected argument {arg:?}\n{USAGE}"),
        }
    }
    Ok(parsed)
}

fn main() -> anyhow::Result<()> {
    judge_logging::initialize(LogDestination::Terminal, LevelFilter::Info);

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    let path = args.path.unwrap_or_else(|| "/".to_string());
    let config = match args.config {
        Some(file) => ClientConfig::load(Path::new(&file))
            .with_context(|| format!("loading config {file}"))?,
        None => ClientConfig::default(),
    };

    let resolver = config.resolver().context("building breadcrumb routes")?;
    let api = ReqwestApi::new(config.api_settings()).context("creating api client")?;
    judge_info!("Using judge service at {}", api.base_url());
    let endpoints = Endpoints::new(Arc::new(api));
    let overrides = SharedOverrides::new();
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;

    let kind = PageKind::for_path(resolver.table(), &path);
    let policy = LoadPolicy {
        timeout: Duration::from_secs(15),
        retries: args.retries,
    };
    let outcome = open_page(
        runtime.handle(),
        &kind,
        &path,
        &endpoints,
        &overrides,
        policy,
    );

    println!("{}", render_trail(&overrides.resolve(&resolver, &path)));
    match outcome.as_ref().map(|outcome| &outcome.summary) {
        Some(Ok(summary)) => println!("{summary}"),
        Some(Err(error)) => println!("error: {error} (run again or pass --retries N to retry)"),
        None => {}
    }
    Ok(())
}

fn render_trail(items: &[BreadcrumbItem]) -> String {
    items
        .iter()
        .map(|item| match &item.href {
            Some(href) => format!("{} <{}>", item.title, href),
            None => format!("[{}]", item.title),
        })
        .collect::<Vec<_>>()
        .join(" > ")
}
