mod classifier;
mod cli;
mod config;
mod logging;
mod mapping;
mod model;
mod providers;
mod sync;
mod util;

use anyhow::Result;

use cli::Command;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = cli::parse_args(&args)?;
    let store = invocation.config_store();

    match invocation.command {
        Command::Help => cli::print_help(),
        Command::Init => cli::handle_init(&store)?,
        Command::Sync { user } => {
            let report = cli::handle_sync(&store, user.as_deref()).await?;
            cli::print_report(&report);
        }
        Command::Watch { user, interval } => {
            cli::handle_watch(&store, user.as_deref(), interval).await?;
        }
    }

    Ok(())
}
