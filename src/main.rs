use clap::Parser;
use std::process;

use docmerge::cli::Cli;
use docmerge::context::RunContext;
use docmerge::error::DocMergeError;
use docmerge::logging;
use docmerge::output;
use docmerge::runner::MergeRunner;

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        if err.is_fatal() {
            eprintln!("Error: {err}");
        } else {
            eprintln!("Error: {:?}", anyhow::Error::new(err));
        }
        process::exit(code);
    }
}

fn run(cli: Cli) -> Result<(), DocMergeError> {
    let config = cli.to_config()?;
    let formatter = output::create_formatter(&config);

    let ctx = RunContext::from_config(&config);
    let runner = MergeRunner::new(&ctx).with_formatter(formatter.clone());

    formatter.info(&format!("Reading manifest {}", ctx.manifest_path.display()));

    if config.dry_run {
        let plan = runner.plan()?;
        output::display_plan(&formatter, &plan);
        return Ok(());
    }

    let summary = runner.run()?;
    output::display_run_summary(&formatter, &summary);

    Ok(())
}
