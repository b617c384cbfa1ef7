mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use simple_logger::SimpleLogger;
use std::process;

use commands::comparison::NpvArgs;
use commands::loan::{AmortizationArgs, TaxSavingArgs};
use commands::scenarios::{GrowthSweepArgs, HoldingSweepArgs, ScenarioArgs};

/// Buy versus rent housing decisions with decimal precision
#[derive(Parser)]
#[command(
    name = "rentbuy",
    version,
    about = "Buy versus rent housing decisions with decimal precision",
    long_about = "A CLI comparing the net present value of buying a home with a \
                  mortgage against renting and investing the down payment. Supports \
                  amortization schedules, mortgage tax relief, named growth scenarios, \
                  and holding-period and house-growth sweeps."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Diagnostic log level (written to stderr)
    #[arg(long, default_value = "warn", global = true)]
    log_level: LogLevel,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly amortization schedule with yearly interest, principal and equity
    Amortization(AmortizationArgs),
    /// Mortgage tax saving for one year of interest and principal
    TaxSaving(TaxSavingArgs),
    /// Compare buying and renting by net present value
    Npv(NpvArgs),
    /// Run named house/rent growth scenarios (Base, Boom, Crash by default)
    Scenarios(ScenarioArgs),
    /// Sweep the holding horizon and find the break-even year
    HoldingSweep(HoldingSweepArgs),
    /// Sweep house price growth and find the break-even rate
    GrowthSweep(GrowthSweepArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = SimpleLogger::new()
        .with_level(cli.log_level.into())
        .init()
    {
        eprintln!("{}: failed to initialise logging: {}", "warning".yellow().bold(), e);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortization(args) => commands::loan::run_amortization(args),
        Commands::TaxSaving(args) => commands::loan::run_tax_saving(args),
        Commands::Npv(args) => commands::comparison::run_npv(args),
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args),
        Commands::HoldingSweep(args) => commands::scenarios::run_holding_sweep(args),
        Commands::GrowthSweep(args) => commands::scenarios::run_growth_sweep(args),
        Commands::Version => {
            println!("rentbuy {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
