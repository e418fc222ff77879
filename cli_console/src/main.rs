use clap::Parser;
use cli_console::{bootstrap, parse_line, resolve_settings, CliError, Command};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Command line arguments for the explorer
#[derive(Parser, Debug)]
#[command(author, version, about = "Browse and manage a bucket as a folder tree", long_about = None)]
struct Args {
    /// Settings file (JSON, `{ "version": 1, "settings": { ... } }`)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override one setting, e.g. `folders.strategy=recursive` (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Log in as this user before reading commands
    #[arg(long, value_name = "EMAIL")]
    admin: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize tracing with default info level if RUST_LOG is not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = resolve_settings(args.config.as_deref(), &args.set).await?;
    let mut handler = bootstrap(settings, args.admin.as_deref()).await?;

    println!("b2_explorer ready; type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match handler.execute(command).await {
            Ok(output) => println!("{}", output),
            Err(message) => eprintln!("{}", message),
        }
    }

    Ok(())
}
