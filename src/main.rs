//! acadash CLI - An academic dashboard over a folder of markdown notes.

use acadash::cli::{Cli, Commands, ConfigCommands};
use acadash::commands::{self, Context, Output};
use acadash::config::ConfigOverrides;
use acadash::engine::Clock;
use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let human = cli.human_readable;

    let result = build_context(&cli).and_then(|ctx| run_command(cli.command, &ctx, human));

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Logs go to stderr so JSON on stdout stays parseable.
///
/// `ACADASH_LOG` takes an env-filter directive (default `warn`);
/// `ACADASH_LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ACADASH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if env::var("ACADASH_LOG_FORMAT").is_ok_and(|f| f == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Vault: --vault flag > ACADASH_VAULT env var > current directory.
fn build_context(cli: &Cli) -> Result<Context, acadash::Error> {
    let vault_root = match cli.vault_path {
        Some(ref path) => {
            if !path.is_dir() {
                return Err(acadash::Error::InvalidInput(format!(
                    "vault {} is not a directory",
                    path.display()
                )));
            }
            path.clone()
        }
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    // Watcher events carry absolute paths.
    let vault_root = vault_root.canonicalize().unwrap_or(vault_root);

    let mut overrides = ConfigOverrides::new();
    if let Some(ref path) = cli.config {
        overrides = overrides.with_config_path(path);
    }
    if let Some(ref year) = cli.year {
        overrides = overrides.with_academic_year(year);
    }
    if let Some(language) = cli.lang {
        overrides = overrides.with_language(language);
    }

    let clock = match cli.today {
        Some(ref today) => commands::parse_today(today)?,
        None => Clock::System,
    };

    Ok(Context::new(vault_root)
        .with_overrides(overrides)
        .with_clock(clock))
}

fn run_command(command: Commands, ctx: &Context, human: bool) -> Result<(), acadash::Error> {
    match command {
        Commands::Show { report } => {
            let result = commands::show(ctx, report)?;
            output(&result, human);
        }
        Commands::Watch { delay_ms } => run_watch(ctx, delay_ms, human)?,
        Commands::Doc { path } => {
            let result = commands::doc(ctx, &path)?;
            output(&result, human);
        }
        Commands::Progress { start, end, mini } => {
            let language = ctx.resolve()?.config.language;
            let result = commands::progress(&start, &end, ctx.now(), language, mini);
            output(&result, human);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(ctx)?;
                output(&result, human);
            }
            ConfigCommands::Init { user, force } => {
                let result = commands::config_init(ctx, user, force)?;
                output(&result, human);
            }
        },
    }
    Ok(())
}

fn run_watch(ctx: &Context, delay_ms: Option<u64>, human: bool) -> Result<(), acadash::Error> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| acadash::Error::Other(format!("Failed to create runtime: {}", e)))?
        .block_on(async {
            let shutdown = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            commands::watch(
                ctx,
                delay_ms,
                |result| {
                    if human {
                        println!("{}\n", result.to_human());
                    } else {
                        println!("{}", result.to_json());
                    }
                },
                |notice| {
                    if human {
                        eprintln!("{}", notice);
                    } else {
                        eprintln!("{}", serde_json::json!({ "notice": notice }));
                    }
                },
                shutdown,
            )
            .await
        })
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
