use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, Level};
use userstore::output::render;
use userstore::*;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.userstore/userstore.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Increase output level one (-v) or multiple times (-vv)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease output level one (-q) or multiple times (-qq)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    quiet: u8,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, default_value = "table", global = true)]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tables present when the connection was opened
    Tables,

    /// Show the user table
    Users,

    /// Show the user preference table
    Prefs,

    /// Show users joined with their preferences
    Joined,

    /// Show the effective configuration
    Config,
}

fn log_level(verbose: u8, quiet: u8) -> Level {
    match verbose as i16 - quiet as i16 {
        i16::MIN..=-2 => Level::ERROR,
        -1 => Level::WARN,
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Open a connection, run `f` against it and close it again
fn with_handle<F>(config: &UserstoreConfig, f: F) -> Result<String>
where
    F: FnOnce(&ConnectionHandle) -> Result<String>,
{
    let vars = config.load_env()?;
    let handle = ConnectionHandle::open(config.connection_config(&vars)?)?;
    info!("opened {}", handle);

    let output = f(&handle)?;
    handle.close()?;
    Ok(output)
}

/// Load the user tables and render one of their views
fn with_users<F>(config: &UserstoreConfig, f: F) -> Result<String>
where
    F: FnOnce(&UserTables<'_>) -> serde_json::Result<String>,
{
    with_handle(config, |handle| {
        let users = UserTables::with_row_limit(handle, config.row_limit)?;
        Ok(f(&users)?)
    })
}

fn execute(config: &UserstoreConfig, command: Commands, format: OutputFormat) -> Result<String> {
    match command {
        Commands::Config => Ok(config.summary()),
        Commands::Tables => with_handle(config, |handle| Ok(handle.tables().join("\n"))),
        Commands::Users => with_users(config, |users| render(users.user_df(), format)),
        Commands::Prefs => with_users(config, |users| render(users.pref_df(), format)),
        Commands::Joined => with_users(config, |users| render(&users.df(), format)),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = UserstoreConfig::new(&cli.config)?;
    let output = execute(&config, cli.command, cli.format)?;
    println!("{}", output);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose, cli.quiet))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
