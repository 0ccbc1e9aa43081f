use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use lep_core::{Draft, JsonFileStore, Platform, PlatformConfig, ReportResults};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let ids = || {
        Arg::new("plugins")
            .num_args(0..)
            .help("Plugin ids (defaults to every ready plugin)")
    };

    Command::new("lep")
        .version(lep_core::VERSION)
        .about("Lab report enrichment and generation pipeline")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("JSON store file (overrides configuration)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(Command::new("ready").about("List plugins that hold a draft"))
        .subcommand(
            Command::new("draft")
                .about("Store a draft for a plugin")
                .arg(Arg::new("plugin").required(true).help("Plugin id"))
                .arg(
                    Arg::new("json")
                        .required(true)
                        .help("Draft JSON, or '-' to read stdin"),
                ),
        )
        .subcommand(Command::new("enrich").about("Enrich drafts with generated summaries").arg(ids()))
        .subcommand(
            Command::new("report")
                .about("Generate reports from drafts")
                .arg(ids())
                .arg(
                    Arg::new("debug")
                        .long("debug")
                        .action(ArgAction::SetTrue)
                        .help("Keep drafts after generation"),
                )
                .arg(
                    Arg::new("no-debug")
                        .long("no-debug")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("debug")
                        .help("Delete drafts after generation even if configured to keep them"),
                )
                .arg(
                    Arg::new("sync")
                        .long("sync")
                        .action(ArgAction::SetTrue)
                        .help("Send metadata of successful reports to the lab backend"),
                ),
        )
        .subcommand(
            Command::new("sync")
                .about("Send metadata of stored report results to the lab backend")
                .arg(Arg::new("plugins").num_args(0..).help("Plugin ids (defaults to every registered plugin)")),
        )
        .subcommand(Command::new("logs").about("Print the enrichment audit log"))
        .subcommand(
            Command::new("message")
                .about("Handle one UI message")
                .arg(
                    Arg::new("json")
                        .required(true)
                        .help("Request JSON, or '-' to read stdin"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<PlatformConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PlatformConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => PlatformConfig::new(),
    };
    if let Some(store) = matches.get_one::<PathBuf>("store") {
        config = config.with_store_path(store.clone());
    }
    Ok(config)
}

fn json_arg(args: &ArgMatches) -> Result<Value> {
    let raw = args
        .get_one::<String>("json")
        .context("missing JSON argument")?;
    let text = if raw == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        raw.clone()
    };
    serde_json::from_str(&text).context("parsing JSON argument")
}

async fn plugin_ids(platform: &Platform, args: &ArgMatches) -> Vec<String> {
    match args.get_many::<String>("plugins") {
        Some(ids) => ids.cloned().collect(),
        None => platform.ready_plugins().await,
    }
}

/// `--debug`/`--no-debug` override; neither defers to configuration
fn debug_override(args: &ArgMatches) -> Option<bool> {
    if args.get_flag("debug") {
        Some(true)
    } else if args.get_flag("no-debug") {
        Some(false)
    } else {
        None
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let config = load_config(&matches)?;
    let store = Arc::new(JsonFileStore::new(config.store_path.clone()));
    let platform = Platform::new(config, store);

    match matches.subcommand() {
        Some(("ready", _)) => print_json(&platform.ready_plugins().await)?,
        Some(("draft", args)) => {
            let plugin_id = args
                .get_one::<String>("plugin")
                .context("missing plugin id")?;
            let draft = Draft::from_value(json_arg(args)?).context("draft is not a valid object")?;
            platform.store().save_draft(plugin_id, &draft).await?;
            tracing::info!(plugin_id = %plugin_id, "Draft stored");
        }
        Some(("enrich", args)) => {
            let ids = plugin_ids(&platform, args).await;
            print_json(&platform.enrich_plugins(&ids).await)?;
        }
        Some(("report", args)) => {
            let ids = plugin_ids(&platform, args).await;
            let debug_mode = debug_override(args);
            let results = platform.generate_all_reports(&ids, debug_mode).await;
            if args.get_flag("sync") {
                let statuses = platform.sync_report_metadata(&results).await;
                print_json(&serde_json::json!({ "results": results, "sync": statuses }))?;
            } else {
                print_json(&results)?;
            }
        }
        Some(("sync", args)) => {
            let ids: Vec<String> = match args.get_many::<String>("plugins") {
                Some(ids) => ids.cloned().collect(),
                None => platform.registry().ids().into_iter().map(str::to_string).collect(),
            };
            let mut results = ReportResults::new();
            for id in ids {
                if let Some(result) = platform.store().load_result(&id).await? {
                    results.insert(id, result);
                }
            }
            print_json(&platform.sync_report_metadata(&results).await)?;
        }
        Some(("logs", _)) => print_json(&platform.audit_entries().await)?,
        Some(("message", args)) => {
            let response = platform.handle_message(&json_arg(args)?).await;
            print_json(&response)?;
            if response.is_error() {
                std::process::exit(1);
            }
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn global_options_reach_subcommands() {
        let matches = cli()
            .try_get_matches_from(["lep", "report", "--store", "s.json", "--debug", "medlab"])
            .unwrap();
        let config = load_config(&matches).unwrap();
        assert_eq!(config.store_path, PathBuf::from("s.json"));

        let (_, args) = matches.subcommand().unwrap();
        assert!(args.get_flag("debug"));
        assert_eq!(
            args.get_many::<String>("plugins").unwrap().collect::<Vec<_>>(),
            vec!["medlab"]
        );
    }

    #[test]
    fn debug_override_both_directions() {
        fn report(extra: &[&str]) -> Option<bool> {
            let matches = cli()
                .try_get_matches_from(["lep", "report"].iter().chain(extra))
                .unwrap();
            let (_, args) = matches.subcommand().unwrap();
            debug_override(args)
        }

        assert_eq!(report(&["--debug"]), Some(true));
        assert_eq!(report(&["--no-debug"]), Some(false));
        assert_eq!(report(&[]), None);
        assert!(cli()
            .try_get_matches_from(["lep", "report", "--debug", "--no-debug"])
            .is_err());
    }
}
