//! mq-route CLI
//!
//! Dispatches one value through a route table built from the command line
//! and reports which route matched.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_mq::{invoke, Handler, Message, Method, PatternOptions, Routing};

/// Match a value against route patterns.
#[derive(Parser)]
#[command(name = "mq-route")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route pattern; repeat to add routes in evaluation order.
    #[arg(short, long = "route", value_name = "PATTERN")]
    routes: Vec<String>,

    /// Host pattern, evaluated before path routes.
    #[arg(long = "host", value_name = "PATTERN")]
    hosts: Vec<String>,

    /// Request method of the message.
    #[arg(short, long, env = "MQ_ROUTE_METHOD")]
    method: Option<String>,

    /// Header as `Name:Value`; repeatable.
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    headers: Vec<String>,

    /// Tolerate a trailing slash on path routes.
    #[arg(long)]
    lenient: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Value to dispatch.
    value: String,
}

#[derive(Debug, Clone)]
struct Hit {
    index: usize,
    pattern: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if cli.routes.is_empty() && cli.hosts.is_empty() {
        bail!("no routes given; pass at least one --route or --host");
    }

    let options = if cli.lenient {
        PatternOptions::lenient()
    } else {
        PatternOptions::default()
    };

    let hit = Arc::new(Mutex::new(None));
    let mut routing = Routing::new().with_options(options);
    let patterns = cli
        .hosts
        .iter()
        .map(|p| (p, true))
        .chain(cli.routes.iter().map(|p| (p, false)));
    for (index, (pattern, is_host)) in patterns.enumerate() {
        let handler = record(Arc::clone(&hit), index, pattern);
        let added = if is_host {
            routing.host(pattern, handler)
        } else {
            routing.append(pattern, handler)
        };
        routing = added.with_context(|| format!("invalid pattern '{pattern}'"))?;
    }
    debug!(routes = routing.len(), "route table built");

    let mut msg = match &cli.method {
        Some(method) => Message::request(Method::parse(method), cli.value.as_str()),
        None => Message::new(cli.value.as_str()),
    };
    for header in &cli.headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("invalid header '{header}', expected NAME:VALUE");
        };
        msg = msg.header(name.trim(), value.trim());
    }

    invoke(&Handler::from(routing), &mut msg).await?;

    let hit = hit
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .context("route table finished without a match")?;

    println!("route:  #{} {}", hit.index, hit.pattern);
    println!("params: {:?}", msg.params);
    println!("value:  {:?}", msg.value);
    Ok(())
}

fn record(hit: Arc<Mutex<Option<Hit>>>, index: usize, pattern: &str) -> Handler {
    let pattern = pattern.to_string();
    Handler::func(move |_: &mut Message| {
        *hit.lock().unwrap_or_else(PoisonError::into_inner) = Some(Hit {
            index,
            pattern: pattern.clone(),
        });
    })
}
