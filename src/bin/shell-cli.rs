use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use spa_shell::apps::{self, APP_NAMES};
use spa_shell::config::{self, ShellConfig};
use spa_shell::observability::logging;
use spa_shell::routing::Segment;
use spa_shell::{Host, Shell, ShellContext};

#[derive(Parser)]
#[command(name = "shell-cli")]
#[command(about = "Query the shell API and inspect mounted applications", long_about = None)]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `api.base_url`.
    #[arg(short, long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Add two numbers through the API
    Sum { a: String, b: String },
    /// Print an application's route tree
    Routes {
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(APP_NAMES))]
        app: String,
    },
    /// Mount an application headlessly and print the HTML for each location
    Render {
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(APP_NAMES))]
        app: String,
        /// Locations to visit in order; the first is the initial location.
        #[arg(required = true)]
        locations: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config: ShellConfig = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::loader::default_config()?,
    };
    if let Some(url) = cli.url {
        config.api.base_url = url;
    }
    logging::init_tracing("warn");

    match cli.command {
        Commands::Health => {
            let res = reqwest::get(format!("{}/health", config.api.base_url.trim_end_matches('/'))).await?;
            print_response(res).await?;
        }
        Commands::Sum { a, b } => {
            let res = reqwest::Client::new()
                .get(format!("{}/sum", config.api.base_url.trim_end_matches('/')))
                .query(&[("a", a), ("b", b)])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Routes { app } => {
            let app = apps::by_name(&app).ok_or("unknown app")?;
            let tree = app.build_tree()?;
            for (depth, id) in tree.walk() {
                let Some(node) = tree.node(id) else { continue };
                let kind = match node.segment() {
                    Segment::Wildcard => " (wildcard)",
                    Segment::Exact(_) => "",
                };
                let fallback = if node.fallback().is_some() { " [boundary]" } else { "" };
                println!("{}{}{}{}", "  ".repeat(depth), node.path(), kind, fallback);
            }
        }
        Commands::Render { app, locations } => {
            let app = apps::by_name(&app).ok_or("unknown app")?;
            let ctx = ShellContext::from_config(&config)?;
            let host = Host::new();
            host.add_container(&config.shell.container_id);

            let mut locations = locations.into_iter();
            let initial = locations.next().unwrap_or_else(|| config.shell.initial_location.clone());
            let mut shell = Shell::mount(&host, &config.shell.container_id, app, &ctx, initial.as_str())?;
            shell.settle().await?;
            println!("{}\t{}", initial, shell.html());

            for location in locations {
                shell.navigate(location.as_str())?;
                shell.settle().await?;
                println!("{}\t{}", location, shell.html());
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
