//! Swap Router CLI
//!
//! Routes a swap request read from a JSON file and prints the selected strategy and its
//! estimate. No wallet is connected, so nothing is ever signed.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use swap_config::config_path;
use swap_router::{
	init_tracing, load_config, log_service_info, log_service_shutdown, log_startup_complete,
	SwapRequest, SwapRouterBuilder,
};
use tracing::error;

#[derive(Parser)]
#[command(name = "swap-router")]
#[command(about = "Route token swaps across DEX pools, aggregators and manual venues")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the estimate for a swap request
	Quote {
		/// Path to a JSON swap request
		request: PathBuf,
	},
	/// Print the strategy a swap request routes to, with its estimate
	Route {
		/// Path to a JSON swap request
		request: PathBuf,
	},
}

fn read_request(path: &PathBuf) -> Result<SwapRequest, Box<dyn std::error::Error>> {
	let raw = std::fs::read_to_string(path)
		.map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
	let request = serde_json::from_str(&raw)
		.map_err(|e| format!("invalid swap request in {}: {}", path.display(), e))?;
	Ok(request)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let cli = Cli::parse();

	let settings = load_config()?;
	init_tracing(&settings.logging).map_err(|e| e as Box<dyn std::error::Error>)?;
	log_service_info(&settings, &config_path());

	let app = SwapRouterBuilder::new().with_settings(settings).build().await?;
	log_startup_complete(&app.router.strategy_names());

	let (path, show_route) = match &cli.command {
		Commands::Quote { request } => (request, false),
		Commands::Route { request } => (request, true),
	};
	let request = read_request(path)?;

	let output = match app.router.get_estimate(&request).await {
		Ok(outcome) => {
			let strategy = match outcome.estimate() {
				Some(estimate) => estimate.strategy.clone(),
				None => app.router.route(&request)?.name().to_string(),
			};
			if show_route {
				json!({ "strategy": strategy, "outcome": outcome })
			} else {
				serde_json::to_value(&outcome)?
			}
		},
		Err(e) => {
			error!("routing failed: {}", e);
			json!({
				"error": e.kind(),
				"message": e.to_string(),
				"hint": e.user_hint(),
				"retryable": e.is_retryable(),
			})
		},
	};

	println!("{}", serde_json::to_string_pretty(&output)?);
	log_service_shutdown();
	Ok(())
}
