//! `egg-pool` command line client

mod commands;
mod logging;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use logging::{init_logging, LogConfig};
use pool_core::PoolConfig;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_FILE: &str = "egg-pool.toml";

fn cli() -> Command {
    Command::new("egg-pool")
        .version(pool_core::VERSION)
        .about("Browse and contribute to a shared egg pool")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to the TOML config file"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Raise log verbosity (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(Command::new("gallery").about("List every submitted egg, newest first"))
        .subcommand(
            Command::new("lookup")
                .about("Resolve a Pokemon name or dex number")
                .arg(Arg::new("name").required(true).help("Name or dex number")),
        )
        .subcommand(
            Command::new("search")
                .about("Search a reference list")
                .arg(
                    Arg::new("list")
                        .required(true)
                        .value_parser(["pokemon", "moves", "abilities", "items"])
                        .help("Reference list"),
                )
                .arg(Arg::new("query").default_value("").help("Text to match")),
        )
        .subcommand(Command::new("lists").about("Load every reference list and show its size"))
        .subcommand(
            Command::new("submit")
                .about("Add an egg to the pool")
                .arg(
                    Arg::new("trainer")
                        .long("trainer")
                        .required(true)
                        .help("Your trainer name"),
                )
                .arg(
                    Arg::new("pokemon")
                        .long("pokemon")
                        .required(true)
                        .help("Pokemon name or dex number"),
                )
                .arg(Arg::new("nickname").long("nickname").help("Nickname"))
                .arg(Arg::new("ability").long("ability").help("Ability"))
                .arg(Arg::new("item").long("item").help("Held item"))
                .arg(
                    Arg::new("move")
                        .long("move")
                        .action(ArgAction::Append)
                        .help("Move (repeat up to four times)"),
                )
                .arg(Arg::new("message").long("message").help("Message to the recipient")),
        )
        .subcommand(
            Command::new("init-config")
                .about("Print a config file with every default filled in")
                .arg(Arg::new("owner").long("owner").default_value("").help("Repository owner"))
                .arg(Arg::new("repo").long("repo").default_value("").help("Repository name")),
        )
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<PoolConfig> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PoolConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => PoolConfig::load(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("loading {DEFAULT_CONFIG_FILE}"))?,
        None => PoolConfig::new(),
    };
    Ok(config.with_env_overrides())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let verbosity = matches.get_count("verbose");
    init_logging(LogConfig::from_verbosity(verbosity, matches.get_flag("json")));

    let Some((name, args)) = matches.subcommand() else {
        return Ok(());
    };

    if name == "init-config" {
        return commands::init_config(args);
    }

    let config = load_config(&matches)?;
    let pool = pool_core::EggPool::from_config(config)?;

    match name {
        "gallery" => commands::gallery(&pool).await,
        "lookup" => commands::lookup(&pool, args).await,
        "search" => commands::search(&pool, args).await,
        "lists" => commands::lists(&pool).await,
        "submit" => commands::submit(&pool, args).await,
        other => anyhow::bail!("unknown command: {other}"),
    }
}
