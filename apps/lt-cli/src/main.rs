use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use lt_app::{
    AppError, AppResult, Pipeline, PipelineEvent, PipelineOptions, Placement, TierOutcome,
    build_export_command, generate_positions, ini_lines, metric_table, run_export,
    summarize_scalars, summarize_vectors, write_all_series,
};
use lt_config::PipelineConfig;
use lt_core::{m, s};
use lt_results::{CacheTier, RecordKind};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lt-cli")]
#[command(about = "LoRa TDMA results pipeline - export, clean and summarize simulator output", long_about = None)]
struct Cli {
    /// Pipeline config file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Results directory, overrides the config value
    #[arg(short, long, global = true)]
    results_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default pipeline config
    InitConfig {
        /// Output path (.yaml)
        path: PathBuf,
    },
    /// Show which cache tiers exist on disk
    Status,
    /// Run the export tool, replacing any existing export JSON
    Export {
        #[arg(long, value_enum, default_value_t = KindArg::Both)]
        kind: KindArg,
    },
    /// Fill cache tiers up to the requested one
    Ensure {
        #[arg(long, value_enum, default_value_t = KindArg::Both)]
        kind: KindArg,
        #[arg(long, value_enum, default_value_t = TierArg::Mirror)]
        tier: TierArg,
        /// Fail instead of running the export tool when export JSON is missing
        #[arg(long)]
        no_export: bool,
    },
    /// Per-run summary of the clean data
    Summary {
        #[arg(long, value_enum, default_value_t = KindArg::Both)]
        kind: KindArg,
        #[arg(long)]
        no_export: bool,
    },
    /// Derived metrics per node count
    Metrics {
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
        #[arg(long)]
        no_export: bool,
    },
    /// Write metric series files for the plotting layer
    Series {
        /// Parameter label used in the file names (e.g. a spreading factor)
        param: String,
        #[arg(long)]
        no_export: bool,
    },
    /// Print random node positions as ini lines
    Positions {
        /// Number of nodes
        count: usize,
        /// RNG seed for a reproducible layout
        #[arg(long)]
        seed: Option<u64>,
        /// Maximum distance from the centre in metres
        #[arg(long, default_value_t = 100.0)]
        radius: f64,
        #[arg(long, default_value_t = 100.0)]
        center_x: f64,
        #[arg(long, default_value_t = 100.0)]
        center_y: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Vector,
    Scalar,
    Both,
}

impl KindArg {
    fn kinds(self) -> &'static [RecordKind] {
        match self {
            KindArg::Vector => &[RecordKind::Vector],
            KindArg::Scalar => &[RecordKind::Scalar],
            KindArg::Both => &[RecordKind::Vector, RecordKind::Scalar],
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Export,
    Snapshot,
    Clean,
    Mirror,
}

impl From<TierArg> for CacheTier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Export => CacheTier::ExportJson,
            TierArg::Snapshot => CacheTier::Snapshot,
            TierArg::Clean => CacheTier::Clean,
            TierArg::Mirror => CacheTier::CleanMirror,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {}", err);
        std::process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> AppResult<()> {
    let config = load_config(cli.config.as_deref(), cli.results_dir)?;

    match cli.command {
        Commands::InitConfig { path } => cmd_init_config(&path, &config),
        Commands::Status => cmd_status(config),
        Commands::Export { kind } => cmd_export(&config, kind),
        Commands::Ensure {
            kind,
            tier,
            no_export,
        } => cmd_ensure(config, kind, tier.into(), !no_export),
        Commands::Summary { kind, no_export } => cmd_summary(config, kind, !no_export),
        Commands::Metrics { json, no_export } => cmd_metrics(config, json, !no_export),
        Commands::Series { param, no_export } => cmd_series(config, &param, !no_export),
        Commands::Positions {
            count,
            seed,
            radius,
            center_x,
            center_y,
        } => cmd_positions(count, seed, radius, center_x, center_y),
    }
}

fn load_config(path: Option<&Path>, results_dir: Option<PathBuf>) -> AppResult<PipelineConfig> {
    let mut config = match path {
        Some(path) => lt_config::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = results_dir {
        config.results_dir = dir;
    }
    Ok(config)
}

fn open_pipeline(config: PipelineConfig, run_exporter: bool) -> AppResult<Pipeline> {
    Pipeline::new(config, PipelineOptions { run_exporter })
}

fn cmd_init_config(path: &Path, config: &PipelineConfig) -> AppResult<()> {
    if path.exists() {
        return Err(AppError::InvalidInput(format!(
            "{} already exists",
            path.display()
        )));
    }
    lt_config::save_yaml(path, config)?;
    println!("✓ Wrote config: {}", path.display());
    Ok(())
}

fn cmd_status(config: PipelineConfig) -> AppResult<()> {
    let pipeline = open_pipeline(config, false)?;
    println!("Results dir: {}", pipeline.store().root_dir().display());
    for status in pipeline.status() {
        println!(
            "  [{}] {:<7} {:<17} {}",
            if status.exists { "x" } else { " " },
            status.kind.label(),
            status.tier.label(),
            status.path.display()
        );
    }
    Ok(())
}

fn cmd_export(config: &PipelineConfig, kind: KindArg) -> AppResult<()> {
    lt_config::validate_config(config)?;
    let store = lt_results::CacheStore::for_config(config);
    for &kind in kind.kinds() {
        let output = store.path(kind, CacheTier::ExportJson);
        let command = build_export_command(config, kind, &output)?;
        println!("Running: {}", command.display());
        run_export(&command)?;
        println!("✓ Exported {} data: {}", kind, output.display());
    }
    Ok(())
}

fn cmd_ensure(
    config: PipelineConfig,
    kind: KindArg,
    tier: CacheTier,
    run_exporter: bool,
) -> AppResult<()> {
    let pipeline = open_pipeline(config, run_exporter)?;
    for &kind in kind.kinds() {
        let mut last_stage = None;
        let outcome = pipeline.ensure_with_progress(
            kind,
            tier,
            Some(&mut |event| {
                if last_stage != Some(event.stage) {
                    render_cli_progress(&event);
                    last_stage = Some(event.stage);
                }
            }),
        )?;
        clear_progress_line();
        match outcome {
            TierOutcome::Cached => println!("✓ {} {} already cached", kind, tier.label()),
            TierOutcome::Produced => println!("✓ {} {} written", kind, tier.label()),
        }
    }
    Ok(())
}

fn cmd_summary(config: PipelineConfig, kind: KindArg, run_exporter: bool) -> AppResult<()> {
    let pipeline = open_pipeline(config, run_exporter)?;
    for &kind in kind.kinds() {
        match kind {
            RecordKind::Vector => {
                let data = with_spinner(|| pipeline.load_vectors())?;
                println!(
                    "Vector runs ({}), cleaned {}:",
                    data.manifest.run_count, data.manifest.created_at
                );
                for run in summarize_vectors(&data.runs) {
                    println!(
                        "  numNodes={:<4} {}  power nodes={} packet nodes={} samples={}  power sum={:.4}  packet bits={:.0}",
                        run.num_nodes,
                        run.run_id,
                        run.nodes_with_power,
                        run.nodes_with_packets,
                        run.sample_count,
                        run.total_power_sum,
                        run.total_packet_length_sum
                    );
                }
            }
            RecordKind::Scalar => {
                let data = with_spinner(|| pipeline.load_scalars())?;
                println!(
                    "Scalar runs ({}), cleaned {}:",
                    data.manifest.run_count, data.manifest.created_at
                );
                for run in summarize_scalars(&data.runs) {
                    println!(
                        "  numNodes={:<4} {}  energy nodes={}  total={:.4} J  per node={:.4} J  sent={}",
                        run.num_nodes,
                        run.run_id,
                        run.nodes_with_energy,
                        run.total_energy_consumed,
                        run.mean_node_energy_consumption,
                        run.total_packets_sent
                    );
                }
            }
        }
    }
    Ok(())
}

fn cmd_metrics(config: PipelineConfig, json: bool, run_exporter: bool) -> AppResult<()> {
    let pipeline = open_pipeline(config, run_exporter)?;
    let data = with_spinner(|| pipeline.load_available())?;
    let window = s(pipeline.config().observation_window_s);
    let rows = metric_table(
        data.vectors.as_ref().map(|d| &d.runs),
        data.scalars.as_ref().map(|d| &d.runs),
        window,
    );

    if json {
        let text = serde_json::to_string_pretty(&rows)
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    println!(
        "{:>8} {:>14} {:>14} {:>14} {:>14} {:>10}",
        "numNodes", "throughput", "ppn (vec)", "ppn (J)", "nec (J)", "sent/node"
    );
    for row in &rows {
        println!(
            "{:>8} {:>14} {:>14} {:>14} {:>14} {:>10}",
            row.num_nodes,
            cell(row.throughput_bps),
            cell(row.vector_power_per_node),
            cell(row.energy_per_node_j),
            cell(row.network_energy_j),
            cell(row.packets_sent_per_node)
        );
    }
    Ok(())
}

fn cmd_series(config: PipelineConfig, param: &str, run_exporter: bool) -> AppResult<()> {
    let pipeline = open_pipeline(config, run_exporter)?;
    let data = with_spinner(|| pipeline.load_available())?;
    let window = s(pipeline.config().observation_window_s);
    let rows = metric_table(
        data.vectors.as_ref().map(|d| &d.runs),
        data.scalars.as_ref().map(|d| &d.runs),
        window,
    );

    let written = write_all_series(&pipeline.series_store(), &rows, param)?;
    for path in &written {
        println!("✓ {}", path.display());
    }
    println!("Wrote {} series for {} node counts", written.len(), rows.len());
    Ok(())
}

fn cmd_positions(
    count: usize,
    seed: Option<u64>,
    radius: f64,
    center_x: f64,
    center_y: f64,
) -> AppResult<()> {
    let placement = Placement::new(m(center_x), m(center_y), m(radius))?;
    for line in ini_lines(&generate_positions(count, &placement, seed)?) {
        println!("{}", line);
    }
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn with_spinner<T>(load: impl FnOnce() -> AppResult<T>) -> AppResult<T> {
    let started = Instant::now();
    print!("\r| loading...");
    let _ = io::stdout().flush();
    let result = load();
    clear_progress_line();
    if result.is_ok() {
        tracing::debug!(elapsed_s = started.elapsed().as_secs_f64(), "loaded clean data");
    }
    result
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &PipelineEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    print!(
        "\r{} {} {}: {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.kind,
        event.tier.label(),
        event.stage.label(),
        event.elapsed_wall_s
    );
    let _ = io::stdout().flush();
}
