use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the rolling-horizon simulation over a model folder.
    Run {
        /// Directory containing `<model_name>/` input CSVs (spec section 6).
        #[arg(long)]
        input_folder: PathBuf,

        /// Model subdirectory name under `input_folder`.
        #[arg(long)]
        model_name: String,

        /// TOML file with `SimConfig` fields (spec section 6).
        #[arg(long)]
        config: PathBuf,

        /// Directory output artifacts are written into.
        #[arg(long)]
        output_folder: PathBuf,

        /// Number of rolling-horizon windows to run; defaults to the
        /// full year implied by the config.
        #[arg(long)]
        steps: Option<usize>,

        /// Solver wall-clock time limit per window, in seconds.
        #[arg(long)]
        time_limit_secs: Option<u64>,

        /// Solver thread count; "auto" uses all available cores.
        #[arg(long, default_value = "auto")]
        threads: String,

        /// Run the rounding heuristic before falling back to a full MILP
        /// solve (spec section 4.9).
        #[arg(long)]
        use_rounding: bool,
    },

    /// Print shell completions to stdout.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
