//! neurocode CLI — structural code intelligence for Python repositories.
//!
//! Thin dispatch into `neuro_enforce::facade::Project`: owns argument
//! parsing, output-format selection, and process exit codes only.

use clap::Parser;

mod cli_args;
mod commands;

use cli_args::{Cli, Commands, OutputFormat, PlanAction};

fn main() {
    let cli = Cli::parse();

    let formatter: Box<dyn neuro_output::OutputFormatter> = match cli.format {
        OutputFormat::Text => Box::new(neuro_output::human::HumanFormatter),
        OutputFormat::Json => Box::new(neuro_output::json::JsonFormatter),
    };

    let exit_code = match cli.command {
        Commands::Ir { path, check } => commands::ir::run(&*formatter, path, check),
        Commands::Explain { file } => commands::explain::run(&*formatter, file),
        Commands::Check { file } => commands::check::run(&*formatter, file),
        Commands::Query { path, kind, symbol, module } => commands::query::run(&*formatter, path, kind, symbol, module),
        Commands::Embed { path, provider, update } => commands::embed::run(&*formatter, path, provider, update),
        Commands::Search { path, text, like, k, module, provider } => commands::search::run(&*formatter, path, text, like, k, module, provider),
        Commands::Status { path } => commands::status::run(&*formatter, path),
        Commands::Patch { file, fix, strategy, target, dry_run, show_diff, require_fresh_ir, require_target } => {
            commands::patch::run(&*formatter, file, fix, strategy, target, dry_run, show_diff, require_fresh_ir, require_target)
        }
        Commands::PatchHistory { path, limit } => commands::patch_history::run(&*formatter, path, limit),
        Commands::ExplainBundle { file, symbol } => commands::explain_bundle::run(&*formatter, file, symbol),
        Commands::Plan(args) => match args.action {
            Some(PlanAction::Apply { plan_file, dry_run, show_diff }) => commands::plan::run_apply(&*formatter, plan_file, dry_run, show_diff),
            None => match args.file {
                Some(file) => commands::plan::run_build(&*formatter, file, args.symbol),
                None => {
                    eprintln!("[neurocode] plan: requires either a file and --symbol, or `plan apply <plan.json>`");
                    1
                }
            },
        },
    };

    std::process::exit(exit_code);
}
