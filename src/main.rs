use clap::Parser;
use perf_notes::PerfError;
use perf_notes::cli::commands;
use perf_notes::cli::{Cli, Commands};
use perf_notes::logging::init_logging;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {e}");
        // Don't exit, just continue without logging
    }

    let repo = cli.repo.as_deref();

    let result = match &cli.command {
        Commands::Compare(args) => commands::compare::execute(args, cli.json, repo),
        Commands::Fake(args) => commands::fake::execute(args, repo),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e);
    }
}

/// Print the error with an optional recovery hint and exit non-zero.
fn handle_error(err: &PerfError) -> ! {
    eprintln!("error: {err}");
    if let Some(hint) = err.suggestion() {
        eprintln!("hint: {hint}");
    }
    std::process::exit(err.exit_code());
}
