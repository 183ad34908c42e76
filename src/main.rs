use actix_web::web;
use clap::{Args, Parser, Subcommand};
use motiondx_api::{AppState, RestApi};
use motiondx_core::{DiagnosisEngine, Embedder, EngineConfig, KnowledgeBase};
use motiondx_report::TemplateReportGenerator;
use motiondx_storage::{
    KnowledgeFile, KnowledgeSeeder, PatternCatalogue, RemoteEmbedder, RemoteEmbedderConfig,
    SeedOptions,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Diagnosis retrieval over multichannel motion signals
#[derive(Parser, Debug)]
#[command(name = "motiondx")]
#[command(about = "Gait diagnosis retrieval engine", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the diagnosis API over a knowledge file
    Serve(ServeArgs),
    /// Generate a knowledge file from the pattern catalogue
    Seed(SeedArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Knowledge file (JSON array of records)
    #[arg(short, long, default_value = "./data/knowledge.json")]
    knowledge: PathBuf,

    /// HTTP API port
    #[arg(long, default_value_t = 8000)]
    http_port: u16,

    /// Embedding dimension
    #[arg(long, default_value_t = 256)]
    dimension: usize,

    /// Neighbors fetched per channel
    #[arg(long, default_value_t = 5)]
    top_k: usize,

    /// Percent similarity for plausible candidates
    #[arg(long, default_value_t = 10.0)]
    candidate_threshold: f32,

    /// Percent similarity for reported conditions
    #[arg(long, default_value_t = 80.0)]
    report_threshold: f32,

    /// Embedding service for requests that send raw samples
    #[arg(long)]
    embedder_url: Option<String>,
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// Knowledge file to write
    #[arg(short, long, default_value = "./data/knowledge.json")]
    output: PathBuf,

    /// Embedding service URL
    #[arg(long)]
    embedder_url: String,

    /// Embedding dimension
    #[arg(long, default_value_t = 256)]
    dimension: usize,

    /// Pattern catalogue (JSON); the built-in gait catalogue if omitted
    #[arg(long)]
    catalogue: Option<PathBuf>,

    /// Samples per synthetic signal
    #[arg(long, default_value_t = motiondx_core::synth::DEFAULT_SAMPLE_COUNT)]
    samples: usize,

    /// Random seed
    #[arg(long, default_value_t = motiondx_core::synth::DEFAULT_SEED)]
    seed: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting motiondx v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve(args) => serve(args).await,
        // the blocking HTTP client must stay off the async runtime
        Command::Seed(args) => tokio::task::spawn_blocking(move || seed(args)).await?,
    }
}

fn seed(args: SeedArgs) -> anyhow::Result<()> {
    let catalogue = match &args.catalogue {
        Some(path) => PatternCatalogue::from_file(path)?,
        None => PatternCatalogue::builtin()?,
    };
    info!("Seeding {} patterns into {:?}", catalogue.len(), args.output);

    let embedder = RemoteEmbedder::new(RemoteEmbedderConfig::new(args.embedder_url, args.dimension));
    let seeder = KnowledgeSeeder::with_options(
        embedder,
        SeedOptions {
            sample_count: args.samples,
            seed: args.seed,
        },
    );
    let written = seeder.seed(&catalogue, &KnowledgeFile::new(&args.output))?;
    info!("Wrote {} knowledge records", written);
    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = EngineConfig {
        dimension: args.dimension,
        top_k: args.top_k,
        candidate_threshold: args.candidate_threshold,
        report_threshold: args.report_threshold,
    };
    config.validate()?;

    info!("Knowledge file: {:?}", args.knowledge);
    info!("HTTP API port: {}", args.http_port);

    let knowledge = KnowledgeFile::new(&args.knowledge);
    let records = knowledge.read()?;
    let base = KnowledgeBase::load(config.dimension, &records)?;
    let report = base.store().load_report();
    if report.has_warnings() {
        warn!("Skipped {} invalid knowledge records", report.skipped.len());
    }
    let engine = Arc::new(DiagnosisEngine::new(config, base)?);

    let embedder = args.embedder_url.map(|url| {
        info!("Embedding service: {}", url);
        Arc::new(RemoteEmbedder::new(RemoteEmbedderConfig::new(url, args.dimension))) as Arc<dyn Embedder>
    });

    let state = web::Data::new(AppState {
        engine,
        knowledge,
        embedder,
        generator: Arc::new(TemplateReportGenerator),
    });

    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, http_port).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    });

    info!("motiondx started successfully");
    info!("HTTP API: http://localhost:{}/", http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
