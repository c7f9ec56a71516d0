use clap::{Parser, Subcommand};

mod cmd;
mod core;
mod money;

#[derive(Debug, Parser)]
#[command(name = "taxform")]
#[command(about = "US tax form extraction and federal income tax calculator")]
#[command(version)]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify, extract and validate tax documents
    Process(cmd::process::ProcessCommand),
    /// Calculate federal income tax from tax documents
    Calculate(cmd::calculate::CalculateCommand),
    /// Quick tax estimate from a total income figure
    Estimate(cmd::estimate::EstimateCommand),
    /// Print field dictionaries, output schemas or the default rules
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts = Opts::parse();
    match opts.command {
        Command::Process(process) => process.exec(),
        Command::Calculate(calculate) => calculate.exec(),
        Command::Estimate(estimate) => estimate.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
