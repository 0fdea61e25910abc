use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use nba_player_clusters::ml::{ClusteringConfig, PositionPolicy};
use nba_player_clusters::pipeline::{self, Step};
use nba_player_clusters::prompt;
use nba_player_clusters::server::{self, ServerConfig};
use nba_player_clusters::{DataLayout, ModelRegistry, PipelineConfig, SearchScope, SeasonModels, SeasonType};

#[derive(Parser)]
#[command(name = "nba-stats")]
#[command(about = "Clean NBA player stats, cluster playing styles and find comparable players", long_about = None)]
struct Cli {
    /// Directory holding raw/, processed/, key_stats/, clustered/ and analysis/
    #[arg(long, env = "NBA_STATS_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Directory holding the persisted scalers and cluster models
    #[arg(long, env = "NBA_STATS_MODELS_DIR", default_value = "models", global = true)]
    models_dir: PathBuf,

    /// Only process one season type (R or P); batch steps run both by default
    #[arg(long, global = true, value_parser = parse_season)]
    season: Option<SeasonType>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize names, merge duplicate rows and derive advanced metrics
    Clean(CleanArgs),

    /// Select the comparison features from the cleaned tables
    KeyStats,

    /// Label every key-stats row with a rule-based archetype
    Label,

    /// Scale and one-hot encode the cleaned tables for modeling
    Prepare(PrepareArgs),

    /// Write correlation and PCA variance reports for the ML-ready tables
    Analyze,

    /// Fit and save the scaler and cluster model
    Train(TrainArgs),

    /// Run every batch step in order
    Pipeline {
        #[command(flatten)]
        clean: CleanArgs,
        #[command(flatten)]
        prepare: PrepareArgs,
        #[command(flatten)]
        train: TrainArgs,
    },

    /// Interactively enter a stat line and find the closest player
    Predict {
        /// Which players the closest match is drawn from [default: population]
        #[arg(long, value_enum)]
        scope: Option<SearchScope>,
    },

    /// Serve the prediction form
    Serve {
        #[arg(short, long, default_value_t = 5000)]
        port: u16,

        /// Which players the closest match is drawn from [default: population]
        #[arg(long, value_enum)]
        scope: Option<SearchScope>,
    },
}

#[derive(Args)]
struct CleanArgs {
    /// Regular-season players with fewer games are dropped
    #[arg(long, default_value_t = 20.0)]
    min_games: f64,
}

#[derive(Args)]
struct PrepareArgs {
    /// Resolve dual positions ("SF-PF") randomly with this seed instead of taking the first
    #[arg(long)]
    position_seed: Option<u64>,
}

#[derive(Args)]
struct TrainArgs {
    /// Number of clusters
    #[arg(long, default_value_t = 4)]
    clusters: usize,

    /// Random seed for cluster initialization
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of initialization restarts
    #[arg(long, default_value_t = 10)]
    n_init: usize,

    /// Maximum iterations per restart
    #[arg(long, default_value_t = 300)]
    max_iterations: usize,

    /// Convergence threshold on the summed squared centroid shift
    #[arg(long, default_value_t = 1e-4)]
    tolerance: f64,
}

impl PrepareArgs {
    fn policy(&self) -> PositionPolicy {
        match self.position_seed {
            Some(seed) => PositionPolicy::Seeded { seed },
            None => PositionPolicy::FirstListed,
        }
    }
}

impl TrainArgs {
    fn clustering(&self) -> ClusteringConfig {
        ClusteringConfig {
            k: self.clusters,
            seed: self.seed,
            n_init: self.n_init,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
        }
    }
}

fn parse_season(s: &str) -> std::result::Result<SeasonType, String> {
    SeasonType::from_code(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let layout = DataLayout::new(&cli.data_dir, &cli.models_dir);
    let seasons: Vec<SeasonType> = match cli.season {
        Some(season) => vec![season],
        None => SeasonType::ALL.to_vec(),
    };

    match cli.command {
        Commands::Clean(args) => {
            let config = PipelineConfig {
                min_games: args.min_games,
                ..PipelineConfig::default()
            };
            run(Step::Clean, &layout, &seasons, &config)?;
        }
        Commands::KeyStats => run(Step::KeyStats, &layout, &seasons, &PipelineConfig::default())?,
        Commands::Label => run(Step::Label, &layout, &seasons, &PipelineConfig::default())?,
        Commands::Prepare(args) => {
            let config = PipelineConfig {
                position_policy: args.policy(),
                ..PipelineConfig::default()
            };
            run(Step::Prepare, &layout, &seasons, &config)?;
        }
        Commands::Analyze => run(Step::Analyze, &layout, &seasons, &PipelineConfig::default())?,
        Commands::Train(args) => {
            let config = PipelineConfig {
                clustering: args.clustering(),
                ..PipelineConfig::default()
            };
            run(Step::Train, &layout, &seasons, &config)?;
        }
        Commands::Pipeline { clean, prepare, train } => {
            let config = PipelineConfig {
                min_games: clean.min_games,
                clustering: train.clustering(),
                position_policy: prepare.policy(),
                ..PipelineConfig::default()
            };
            pipeline::run_pipeline(&layout, &seasons, &config)?;
            println!("Pipeline finished; models written to {}", layout.models_dir.display());
        }
        Commands::Predict { scope } => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            prompt::run_session(
                &mut stdin.lock(),
                &mut stdout.lock(),
                |season| load_season(&layout, season),
                scope.unwrap_or(PipelineConfig::default().search_scope),
            )?;
        }
        Commands::Serve { port, scope } => {
            let registry = ModelRegistry::load(&layout)
                .context("Failed to load models (run `nba-stats pipeline` first)")?;
            let config = ServerConfig {
                port,
                search_scope: scope.unwrap_or(PipelineConfig::default().search_scope),
            };
            let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
            runtime.block_on(server::run_server(config, registry))?;
        }
    }

    Ok(())
}

fn run(step: Step, layout: &DataLayout, seasons: &[SeasonType], config: &PipelineConfig) -> Result<()> {
    pipeline::run_step(step, layout, seasons, config)?;
    for &season in seasons {
        println!("{} {}: done", step, season);
    }
    Ok(())
}

fn load_season(layout: &DataLayout, season: SeasonType) -> nba_player_clusters::Result<SeasonModels> {
    SeasonModels::load(
        season,
        &layout.scaler(season),
        &layout.cluster_model(season),
        &layout.clustered(season),
    )
}
