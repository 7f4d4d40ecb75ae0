mod app;

use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use eframe::egui::vec2;
use knowledge_lens::{GraphEngine, load_graph_payload};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph payload (JSON with `nodes`, `edges` and optional `centerId`).
    graph: PathBuf,

    /// Overrides the payload's center node.
    #[arg(long)]
    center: Option<String>,

    /// Edges below this confidence are hidden.
    #[arg(long, default_value_t = 0.0)]
    min_confidence: f32,

    /// Settle the layout without a window and print the final frame as JSON.
    #[arg(long)]
    headless: bool,

    /// Tick budget for headless runs.
    #[arg(long, default_value_t = 600)]
    ticks: usize,

    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    #[arg(long, default_value_t = 800.0)]
    height: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if args.headless {
        return run_headless(&args);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    eframe::run_native(
        "knowledge-lens",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::KnowledgeLensApp::new(
                cc,
                args.graph.clone(),
                args.center.clone(),
                args.min_confidence,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

fn run_headless(args: &Args) -> Result<()> {
    let mut payload = load_graph_payload(&args.graph)?;
    if let Some(center) = &args.center {
        payload.center_id = Some(center.clone());
    }

    let mut engine = GraphEngine::new(vec2(args.width, args.height));
    engine.initialize(payload);
    engine.set_confidence_threshold(args.min_confidence);
    engine.run_until_settled(args.ticks);

    let frame = serde_json::to_string_pretty(&engine.frame()).context("failed to serialize frame")?;
    println!("{frame}");
    Ok(())
}
