//! Command-line entry point (spec section 6): loads a model folder, runs
//! the rolling-horizon simulation, and writes the long-form and LMP CSV
//! output artifacts. A `clap::Parser` front door, a
//! `tracing_subscriber::FmtSubscriber` sized by `--log-level`, and a `rayon`
//! global pool sized by `--threads`, narrowed down to the one subcommand
//! this simulator needs.

mod cli;
mod config;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use pownet_io::{write_lmp_csv, write_long_form_csv, LongFormRow};
use pownet_sim::Simulator;
use pownet_solve::SolveOptions;
use rayon::ThreadPoolBuilder;
use std::collections::HashMap;
use std::time::Duration;
use tracing_subscriber::FmtSubscriber;

fn configure_threads(spec: &str) -> usize {
    let count = if spec.eq_ignore_ascii_case("auto") {
        num_cpus::get()
    } else {
        spec.parse().unwrap_or_else(|_| num_cpus::get())
    };
    let _ = ThreadPoolBuilder::new().num_threads(count).build_global();
    count
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(cli.log_level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    match cli.command {
        Commands::Run {
            input_folder,
            model_name,
            config,
            output_folder,
            steps,
            time_limit_secs,
            threads,
            use_rounding,
        } => run(input_folder, model_name, config, output_folder, steps, time_limit_secs, threads, use_rounding),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    input_folder: std::path::PathBuf,
    model_name: String,
    config_path: std::path::PathBuf,
    output_folder: std::path::PathBuf,
    steps: Option<usize>,
    time_limit_secs: Option<u64>,
    threads: String,
    use_rounding: bool,
) -> anyhow::Result<()> {
    let sim_config = config::load_sim_config(&config_path)?;
    let num_windows = sim_config.num_windows();

    tracing::info!(model = %model_name, input = %input_folder.display(), "loading system input");
    let system = pownet_io::load_system_input(&input_folder, &model_name, sim_config)?;

    let num_threads = configure_threads(&threads);
    let options = SolveOptions {
        log_to_console: false,
        mipgap: 1e-4,
        timelimit: Duration::from_secs(time_limit_secs.unwrap_or(600)),
        num_threads,
    };

    let rounding = use_rounding.then(|| pownet_sim::RoundingOptions {
        strategy: "slow".to_string(),
        threshold: 0.5,
        max_iter: 20,
    });

    std::fs::create_dir_all(&output_folder)?;
    let infeasible_dir = output_folder.join("infeasible");

    let simulator = Simulator::new(&system, model_name.clone());
    let requested_steps = steps.unwrap_or(num_windows);

    let (record, coupler_report) =
        simulator.run_with_rounding(requested_steps, &options, rounding.as_ref(), None, &infeasible_dir)?;

    if let Some(report) = coupler_report {
        tracing::info!(windows = report.iterations_per_window.len(), runtime = ?report.cumulative_runtime, "power-water coupler finished");
    }

    let mut rows: Vec<LongFormRow> = Vec::new();
    for node_row in record.node_rows() {
        rows.push(LongFormRow {
            varname: format!("{}.{}", node_row.component, node_row.var_name),
            value: node_row.value,
            node: node_row.entity.clone(),
            timestep: node_row.hour,
            hour: node_row.hour,
        });
    }
    for flow_row in record.flow_rows() {
        rows.push(LongFormRow {
            varname: flow_row.var_name.clone(),
            value: flow_row.value,
            node: format!("{}->{}", flow_row.source, flow_row.sink),
            timestep: flow_row.hour,
            hour: flow_row.hour,
        });
    }
    for system_row in record.system_rows() {
        rows.push(LongFormRow {
            varname: format!("{}.{}", system_row.component, system_row.var_name),
            value: system_row.value,
            node: String::new(),
            timestep: system_row.hour,
            hour: system_row.hour,
        });
    }

    write_long_form_csv(&output_folder.join("variables.csv"), rows)?;

    let lmp: HashMap<(String, usize), f64> = record
        .lmp_rows()
        .iter()
        .map(|row| ((row.node.clone(), row.hour), row.value))
        .collect();
    let nodes: Vec<String> = system.network.nodes().map(str::to_string).collect();
    let hours = 1..=(system.config.sim_horizon * requested_steps);
    write_lmp_csv(&output_folder.join("lmp.csv"), &lmp, &nodes, hours)?;

    tracing::info!("simulation complete");
    Ok(())
}
