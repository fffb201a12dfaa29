//! Command-line driver for the built-in demonstration models.

use clap::{Args, Parser, Subcommand};
use stator_cli::models::{Abp, Bank, Wgc};
use stator_cli::render;
use stator_mc::{CheckOutcome, Config, Explorer};
use stator_model::{LayoutBuilder, Model, VarLayout};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error("layout error: {0}")]
    Layout(#[from] stator_model::LayoutError),
}

#[derive(Parser)]
#[command(name = "stator", version)]
#[command(about = "Explicit-state model checker over compiled-in models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// The wolf, sheep, and cabbage puzzle (safety)
    Wgc {
        #[command(flatten)]
        opts: CheckOpts,
    },

    /// A lossy-channel banking system (safety + may progress)
    Bank {
        #[command(flatten)]
        opts: CheckOpts,
    },

    /// The alternating bit protocol with failure and recovery (deadlock;
    /// stubborn-capable)
    Abp {
        /// Channel capacity
        #[arg(long, default_value = "4")]
        size: u32,

        /// Track messages in transit and check delivered contents
        #[arg(long)]
        check_out: bool,

        #[command(flatten)]
        opts: CheckOpts,
    },
}

#[derive(Args)]
struct CheckOpts {
    /// Stubborn-set reduction
    #[arg(long)]
    stubborn: bool,

    /// Symmetry reduction (model must define a representative function)
    #[arg(long)]
    symmetry: bool,

    /// Try transitions in ascending order
    #[arg(long)]
    try_forward: bool,

    /// Check legal termination
    #[arg(long)]
    deadlock: bool,

    /// Check may progress
    #[arg(long)]
    may_progress: bool,

    /// Check must progress
    #[arg(long)]
    must_progress: bool,

    /// Terminal states do not count as may-progress states
    #[arg(long)]
    dl_not_may: bool,

    /// Terminal states do not count as must-progress states
    #[arg(long)]
    dl_not_must: bool,

    /// Print a typical execution instead of model checking
    #[arg(long)]
    typical: bool,

    /// Progress report period in states (0 = quiet)
    #[arg(long, default_value = "1000")]
    show_count: usize,

    /// Abort state-space construction after this many states
    #[arg(long, default_value = "30000000")]
    stop_count: usize,

    /// log2 of the hash table size
    #[arg(long, default_value = "23")]
    hash_bits: u32,

    /// Skip modelling sanity checks in the hot path
    #[arg(long)]
    no_sanity: bool,

    /// Skip the progress infrastructure entirely (saves memory)
    #[arg(long)]
    no_progress_check: bool,
}

impl CheckOpts {
    /// Layers the command-line switches over a model's default property
    /// selection.
    fn apply(&self, mut cfg: Config) -> Config {
        cfg.stubborn |= self.stubborn;
        cfg.symmetry |= self.symmetry;
        cfg.try_forward |= self.try_forward;
        cfg.check_deadlock |= self.deadlock;
        cfg.check_may_progress |= self.may_progress;
        cfg.check_must_progress |= self.must_progress;
        cfg.dl_not_may |= self.dl_not_may;
        cfg.dl_not_must |= self.dl_not_must;
        cfg.show_count = self.show_count;
        cfg.stop_count = self.stop_count;
        cfg.hash_bits = self.hash_bits;
        cfg.sanity_checks = !self.no_sanity;
        cfg.progress_check = !self.no_progress_check;
        cfg
    }
}

fn run<M: Model>(model: M, layout: VarLayout, cfg: Config, typical: bool) {
    let quiet = cfg.show_count == 0;
    let summary = cfg.summary();
    let mut explorer = Explorer::new(model, layout, cfg);

    let result = if typical {
        explorer.typical()
    } else {
        explorer.check()
    };

    match &result {
        Ok(outcome) => render::print_outcome(explorer.model(), outcome),
        Err(err) => render::print_error(explorer.model(), err),
    }

    let stats = explorer.stats();
    if matches!(result, Ok(CheckOutcome::Typical { .. })) {
        println!("{} states", stats.states);
    } else {
        println!("{} states, {} edges", stats.states, stats.edges);
    }
    for w in explorer.config().warnings() {
        println!("!!! Warning: {w}");
    }
    if quiet {
        println!("{summary}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli) {
        eprintln!("error: {e}");
        std::process::exit(2);
    }
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Wgc { opts } => {
            let mut b = LayoutBuilder::new();
            let model = Wgc::new(&mut b)?;
            let cfg = opts.apply(Config {
                check_state: true,
                ..Config::default()
            });
            run(model, b.finish(), cfg, opts.typical);
        }
        Commands::Bank { opts } => {
            let mut b = LayoutBuilder::new();
            let model = Bank::new(&mut b)?;
            let cfg = opts.apply(Config {
                check_state: true,
                check_may_progress: true,
                ..Config::default()
            });
            run(model, b.finish(), cfg, opts.typical);
        }
        Commands::Abp {
            size,
            check_out,
            opts,
        } => {
            let mut b = LayoutBuilder::new();
            let model = Abp::new(&mut b, size, check_out)?;
            let cfg = opts.apply(Config {
                check_deadlock: true,
                check_state: check_out,
                size_par: Some(u64::from(size)),
                ..Config::default()
            });
            run(model, b.finish(), cfg, opts.typical);
        }
    }
    Ok(())
}
