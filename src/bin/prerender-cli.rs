use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request};
use clap::{Args, Parser, Subcommand};
use serde_json::json;

use prerender_proxy::config::{load_config, ProxyConfig};
use prerender_proxy::prerender::relay::{build_exchange, render_url, RelayOutcome, RenderClient};
use prerender_proxy::prerender::{should_render, RequestFacts};

#[derive(Parser)]
#[command(name = "prerender-cli")]
#[command(about = "Inspect prerender decisions and the rendering service", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "PRERENDER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether a request would be rendered
    Classify(RequestArgs),
    /// Send a request to the rendering service and show what would be relayed
    Render(RequestArgs),
}

#[derive(Args)]
struct RequestArgs {
    /// Path and query, e.g. "/page?foo=1"
    path: String,

    #[arg(short = 'A', long, default_value = "")]
    user_agent: String,

    #[arg(short = 'X', long, default_value = "GET")]
    method: Method,

    #[arg(long, default_value = "localhost")]
    host: String,

    /// Send the forced-render header
    #[arg(long)]
    force: bool,
}

impl RequestArgs {
    fn to_request(&self, config: &ProxyConfig) -> Result<Request<Body>, Box<dyn std::error::Error>> {
        let mut builder = Request::builder()
            .method(self.method.clone())
            .uri(self.path.as_str())
            .header(header::HOST, self.host.as_str());
        if !self.user_agent.is_empty() {
            builder = builder.header(header::USER_AGENT, self.user_agent.as_str());
        }
        if self.force {
            builder = builder.header(config.prerender.force_render_header.as_str(), "1");
        }
        Ok(builder.body(Body::empty())?)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    match cli.command {
        Commands::Classify(args) => {
            let req = args.to_request(&config)?;
            let facts = RequestFacts::from_request(&req, &config.prerender.force_render_header);
            let render = should_render(&facts, &config.prerender);
            let url = if render {
                Some(render_url(&facts, &config.prerender)?)
            } else {
                None
            };
            print_json(&json!({ "render": render, "render_url": url }))?;
        }
        Commands::Render(args) => {
            let req = args.to_request(&config)?;
            let exchange = {
                let facts = RequestFacts::from_request(&req, &config.prerender.force_render_header);
                if !should_render(&facts, &config.prerender) {
                    eprintln!("Request would pass through; not rendering");
                    return Ok(());
                }
                build_exchange(&facts, &config.prerender)?
            };

            let client = RenderClient::new(Duration::from_secs(config.timeouts.connect_secs))?;
            let target = exchange.url.clone();
            match client.relay(exchange, &config.prerender).await? {
                RelayOutcome::Redirect { status, location } => print_json(&json!({
                    "target": target,
                    "status": status.as_u16(),
                    "redirect": location.to_str().unwrap_or_default(),
                }))?,
                RelayOutcome::Rendered { status, content_type, body } => print_json(&json!({
                    "target": target,
                    "status": status.as_u16(),
                    "content_type": content_type.as_ref().and_then(|v| v.to_str().ok()),
                    "body_bytes": body.len(),
                }))?,
            }
        }
    }

    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
