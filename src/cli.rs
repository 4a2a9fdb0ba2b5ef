//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use crate::adapters::csv_feed_adapter::CsvFeedSupplier;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::indicator::SimIndicatorEngine;
use crate::adapters::sim_account_adapter::SimAccount;
use crate::adapters::sim_broker_adapter::SimBroker;
use crate::domain::builtins::Builtin;
use crate::domain::context::EvalContext;
use crate::domain::error::QuantDslError;
use crate::domain::eval::evaluate;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "quantdsl", about = "Trading-strategy expression evaluator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a strategy step-by-step over CSV candle data
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        strategy: PathBuf,
        /// Override [run] steps from the config
        #[arg(long)]
        steps: Option<usize>,
    },
    /// Parse a strategy document and report problems
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// List the functions and symbols a strategy references
    Inspect {
        #[arg(short, long)]
        strategy: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            config,
            strategy,
            steps,
        } => run_strategy(&config, &strategy, steps),
        Command::Validate { strategy } => validate_strategy(&strategy),
        Command::Inspect { strategy } => inspect_strategy(&strategy),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn load_config(path: &Path) -> Result<FileConfigAdapter, QuantDslError> {
    FileConfigAdapter::from_file(path).map_err(|e| QuantDslError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn load_strategy(path: &Path) -> Result<Strategy, QuantDslError> {
    let content = fs::read_to_string(path)?;
    Ok(Strategy::from_json(&content)?)
}

pub struct RunConfig {
    pub data_dir: PathBuf,
    pub steps: usize,
    pub initial_capital: f64,
    pub print_orders: bool,
}

pub fn build_run_config(
    adapter: &dyn ConfigPort,
    steps_override: Option<usize>,
) -> Result<RunConfig, QuantDslError> {
    let data_dir = adapter
        .get_string("data", "dir")
        .ok_or_else(|| QuantDslError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })?;

    let steps = match steps_override {
        Some(steps) => steps as i64,
        None => adapter.get_int("run", "steps", 0),
    };
    if steps < 1 {
        return Err(QuantDslError::ConfigInvalid {
            section: "run".into(),
            key: "steps".into(),
            reason: "must be a positive step count".into(),
        });
    }

    Ok(RunConfig {
        data_dir: PathBuf::from(data_dir),
        steps: steps as usize,
        initial_capital: adapter.get_double("run", "initial_capital", 100_000.0),
        print_orders: adapter.get_bool("run", "print_orders", true),
    })
}

pub fn run_strategy(
    config_path: &Path,
    strategy_path: &Path,
    steps_override: Option<usize>,
) -> Result<(), QuantDslError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    let run_config = build_run_config(&adapter, steps_override)?;

    eprintln!("Loading strategy from {}", strategy_path.display());
    let strategy = load_strategy(strategy_path)?;
    eprintln!("Running '{}' by {}", strategy.name, strategy.author);

    let clock = Rc::new(Cell::new(0usize));
    let supplier = CsvFeedSupplier::new(run_config.data_dir, Rc::clone(&clock));
    let engine = SimIndicatorEngine::new(Rc::clone(&clock));
    let broker = Rc::new(RefCell::new(SimBroker::new()));
    let account = Rc::new(SimAccount::new(run_config.initial_capital, Rc::clone(&clock)));

    let mut ctx = EvalContext::new(
        Rc::new(supplier),
        Rc::new(engine),
        broker.clone(),
        account.clone(),
    );

    for step in 0..run_config.steps {
        clock.set(step);
        account.record_step();
        let mut root = strategy.root.clone();
        if let Err(e) = evaluate(&mut ctx, &mut root) {
            eprintln!("Run aborted at step {}", step);
            return Err(e.into());
        }
    }

    let broker = broker.borrow();
    eprintln!(
        "Run complete: {} steps, {} feed(s), {} indicator(s), {} order(s)",
        run_config.steps,
        ctx.feed_count(),
        ctx.indicator_count(),
        broker.orders().len()
    );
    if run_config.print_orders {
        for order in broker.orders() {
            println!("{}", order);
        }
    }
    Ok(())
}

pub fn validate_strategy(strategy_path: &Path) -> Result<(), QuantDslError> {
    let strategy = load_strategy(strategy_path)?;
    for name in unknown_functions(&strategy) {
        eprintln!("warning: unknown function '{}' will evaluate to 0", name);
    }
    println!("{} by {}: valid", strategy.name, strategy.author);
    Ok(())
}

pub fn inspect_strategy(strategy_path: &Path) -> Result<(), QuantDslError> {
    let strategy = load_strategy(strategy_path)?;
    println!("name:   {}", strategy.name);
    println!("author: {}", strategy.author);
    println!("functions:");
    for name in strategy.referenced_functions() {
        if Builtin::from_name(&name).is_some() {
            println!("  {}", name);
        } else {
            println!("  {} (unknown, evaluates to 0)", name);
        }
    }
    Ok(())
}

fn unknown_functions(strategy: &Strategy) -> Vec<String> {
    strategy
        .referenced_functions()
        .into_iter()
        .filter(|name| Builtin::from_name(name).is_none())
        .collect()
}
