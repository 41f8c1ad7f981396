use std::io;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use bnc_db::Corpus;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use bnc_lookup::cli::{Cli, Command, EXIT_FOUND, EXIT_UNAVAILABLE, ServeArgs, run_query};
use bnc_lookup::{AppState, Lookup, router};

const MAX_PAGE_SIZE: usize = 500;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.default_log_level());

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_UNAVAILABLE)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let start = Instant::now();
    let lookup = cli.open()?;
    info!(
        "corpus at {} ready in {} ms",
        lookup.corpus().root().display(),
        start.elapsed().as_millis()
    );

    match cli.command {
        Command::Query(query) => {
            let code = run_query(&lookup, &query, &mut io::stdout().lock(), &mut io::stderr())?;
            Ok(code)
        }
        Command::Serve(args) => {
            serve(lookup, args).await?;
            Ok(EXIT_FOUND)
        }
    }
}

async fn serve(lookup: Lookup<Corpus>, args: ServeArgs) -> anyhow::Result<()> {
    info!("binding to {}:{}", args.host, args.port);
    info!("load mode: {:?}", lookup.corpus().mode());
    if args.no_cache {
        info!("cache headers disabled");
    }

    if args.preload {
        let start = Instant::now();
        let stats = lookup.corpus().preload();
        info!(
            "preloaded {} shards ({} missing), {} entries, {} buckets in {} ms",
            stats.shards_loaded,
            stats.shards_missing,
            stats.entries,
            stats.buckets_loaded,
            start.elapsed().as_millis()
        );
    }

    let state = AppState {
        lookup: Arc::new(lookup),
        max_page_size: MAX_PAGE_SIZE,
        disable_cache: args.no_cache,
    };
    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.host, args.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
