//! Persistent directory work-queue CLI.
//!
//! Each `dircursor next <ROOT>` hands out the next unprocessed file under
//! `ROOT` and records it under the state directory, so repeated invocations
//! walk the directory exactly once.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dircursor::adapter::{Adapter, Invocation};
use dircursor::engine::Engine;
use dircursor::exit_codes;
use dircursor::io::config::{DEFAULT_CONFIG_PATH, EngineConfig, load_config, write_config};

#[derive(Parser)]
#[command(
    name = "dircursor",
    version,
    about = "Persistent directory work-queue: one new file per invocation"
)]
struct Cli {
    /// Config file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hand out the next unprocessed item and mark it consumed.
    Next {
        root: String,
        /// Include subdirectories.
        #[arg(short, long)]
        recurse: bool,
        /// Start over from the first item.
        #[arg(long)]
        reset: bool,
        /// Keep a record even if it names a different root.
        #[arg(long)]
        keep_on_root_change: bool,
        /// Print the full output as JSON instead of the status line.
        #[arg(long)]
        json: bool,
    },
    /// Show progress without consuming anything.
    Peek {
        root: String,
        #[arg(short, long)]
        recurse: bool,
    },
    /// Clear progress for a root.
    Reset { root: String },
    /// Delete the progress record for a root.
    Forget { root: String },
    /// Print the progress record path for a root.
    StatePath { root: String },
    /// Write the default config file if missing.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    dircursor::logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = || load_config(&cli.config);
    match cli.command {
        Command::Next {
            root,
            recurse,
            reset,
            keep_on_root_change,
            json,
        } => {
            let cfg = config()?;
            let mut invocation = Invocation {
                root_path: root,
                recurse,
                reset_on_root_change: cfg.reset_on_root_change && !keep_on_root_change,
                reset_requested: reset,
            };
            cmd_next(cfg, &mut invocation, json)
        }
        Command::Peek { root, recurse } => cmd_peek(config()?, &root, recurse),
        Command::Reset { root } => {
            let path = Engine::new(config()?).reset(&root)?;
            println!("reset: {}", path.display());
            Ok(exit_codes::OK)
        }
        Command::Forget { root } => {
            let removed = Engine::new(config()?).forget(&root)?;
            println!("forget: removed={}", removed);
            Ok(exit_codes::OK)
        }
        Command::StatePath { root } => {
            println!("{}", Engine::new(config()?).record_path(&root)?.display());
            Ok(exit_codes::OK)
        }
        Command::Init { force } => cmd_init(&cli.config, force),
    }
}

fn cmd_next(cfg: EngineConfig, invocation: &mut Invocation, json: bool) -> Result<i32> {
    let adapter = Adapter::new(Engine::new(cfg));
    let output = adapter.invoke(invocation);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("serialize output")?
        );
    } else {
        println!("{}", output.status_message);
        if output.has_item {
            println!("{}", output.selected_path);
        }
    }
    Ok(exit_codes::for_reason(output.empty_reason))
}

fn cmd_peek(cfg: EngineConfig, root: &str, recurse: bool) -> Result<i32> {
    let progress = Engine::new(cfg).peek(root, recurse)?;
    println!(
        "peek: root={} processed={} total={} remaining={} exhausted={}",
        progress.root, progress.processed, progress.total, progress.remaining, progress.exhausted
    );
    if let Some(next) = progress.next {
        println!("peek: next={}", next.id);
    }
    Ok(exit_codes::OK)
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if !force && path.exists() {
        println!("init: {} exists", path.display());
        return Ok(exit_codes::OK);
    }
    write_config(path, &EngineConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    println!("init: wrote {}", path.display());
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_next_with_flags() {
        let cli = Cli::parse_from(["dircursor", "next", "/pics", "--recurse", "--reset"]);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(matches!(
            cli.command,
            Command::Next {
                recurse: true,
                reset: true,
                keep_on_root_change: false,
                json: false,
                ..
            }
        ));
    }

    #[test]
    fn parse_global_config_after_subcommand() {
        let cli = Cli::parse_from(["dircursor", "peek", "/pics", "--config", "alt.toml"]);
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        assert!(matches!(cli.command, Command::Peek { recurse: false, .. }));
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["dircursor", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
    }
}
