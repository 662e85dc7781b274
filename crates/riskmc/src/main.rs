use clap::Parser;
use riskmc::cli::{Args, Command};
use riskmc::{commands, init_logging};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match &args.command {
        Command::Risk(risk) => commands::run_risk(risk, &mut out)?,
        Command::Erc(erc) => commands::run_erc(erc, &mut out)?,
        Command::Progressive(progressive) => commands::run_progressive(progressive, &mut out)?,
    }

    tracing::debug!("done");
    Ok(())
}
