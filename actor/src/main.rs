//! Command-line front end for the bundled demo actors.
//!
//! Builds a seed state from `--seed` and `--field` arguments, runs one actor
//! through the runtime, and prints the final state as JSON.

mod demo;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

use demo::DemoActor;
use idempotent_actor::io::config::{load_config, write_config};
use idempotent_actor::{Fields, Runtime, RuntimeConfig, State, exit_codes, logging};

#[derive(Parser)]
#[command(
    name = "idempotent-actor",
    version,
    about = "Run composable, self-validating actors against a JSON state"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the bundled actors.
    Actors,
    /// Run one actor and print the resulting state.
    Run {
        /// Actor to run.
        actor: DemoActor,
        /// Seed state as a JSON object.
        #[arg(long)]
        seed: Option<String>,
        /// Extra field as `key=JSON`, merged over the seed. Repeatable.
        #[arg(short, long = "field", value_name = "KEY=JSON")]
        fields: Vec<String>,
        /// Runtime config (TOML). Defaults apply when missing.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Run the actor's recover hook instead of its call hook.
        #[arg(long)]
        recover: bool,
    },
    /// Write a runtime config file for later use with `run --config`.
    Config {
        /// Destination TOML file. Replaced if it exists.
        path: PathBuf,
        /// Maximum nesting of composed actors.
        #[arg(long)]
        max_depth: Option<usize>,
        /// Emit a trace-level state snapshot after each actor.
        #[arg(long)]
        trace_state: bool,
    },
}

fn main() {
    logging::init();
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
    match cli.command {
        Command::Actors => cmd_actors(),
        Command::Run {
            actor,
            seed,
            fields,
            config,
            recover,
        } => cmd_run(actor, seed.as_deref(), &fields, config, recover),
        Command::Config {
            path,
            max_depth,
            trace_state,
        } => cmd_config(&path, max_depth, trace_state),
    }
}

fn cmd_actors() -> Result<i32> {
    for actor in DemoActor::value_variants() {
        let name = actor
            .to_possible_value()
            .map(|value| value.get_name().to_string())
            .unwrap_or_default();
        println!("{name:<12} {}", actor.describe());
    }
    Ok(exit_codes::OK)
}

fn cmd_run(
    actor: DemoActor,
    seed: Option<&str>,
    fields: &[String],
    config: Option<PathBuf>,
    recover: bool,
) -> Result<i32> {
    let config = match config {
        Some(path) => load_config(&path)?,
        None => Default::default(),
    };
    let runtime = Runtime::new(config);
    let seed = parse_seed(seed)?;
    let extra = parse_fields(fields)?;

    let state = actor
        .run(&runtime, seed, extra, recover)
        .context("actor contract violated")?;

    let mut payload = serde_json::to_string_pretty(&state).context("serialize state")?;
    payload.push('\n');
    print!("{payload}");

    Ok(if state.success() {
        exit_codes::OK
    } else {
        exit_codes::FAILED
    })
}

fn cmd_config(path: &Path, max_depth: Option<usize>, trace_state: bool) -> Result<i32> {
    let defaults = RuntimeConfig::default();
    let cfg = RuntimeConfig {
        max_depth: max_depth.unwrap_or(defaults.max_depth),
        trace_state,
    };
    write_config(path, &cfg)?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn parse_seed(raw: Option<&str>) -> Result<State> {
    let Some(raw) = raw else {
        return Ok(State::new());
    };
    match serde_json::from_str::<Value>(raw).context("parse --seed json")? {
        Value::Object(fields) => Ok(State::from(fields)),
        other => Err(anyhow!("--seed must be a JSON object, got {other}")),
    }
}

/// Parse `key=JSON` pairs. Values that are not valid JSON are taken as strings.
fn parse_fields(raw: &[String]) -> Result<Fields> {
    let mut fields = Fields::new();
    for pair in raw {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=JSON, got '{pair}'"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(anyhow!("empty field name in '{pair}'"));
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_run_with_fields() {
        let cli = Cli::parse_from([
            "idempotent-actor",
            "run",
            "greeting",
            "--field",
            "age=25",
            "-f",
            "name=Bob",
            "--recover",
        ]);
        match cli.command {
            Command::Run {
                actor,
                fields,
                recover,
                ..
            } => {
                assert_eq!(actor, DemoActor::Greeting);
                assert_eq!(fields, vec!["age=25", "name=Bob"]);
                assert!(recover);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn config_command_writes_loadable_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("runtime.toml");

        let code = cmd_config(&path, Some(7), true).expect("config");
        assert_eq!(code, exit_codes::OK);

        let cfg = load_config(&path).expect("load");
        assert_eq!(
            cfg,
            RuntimeConfig {
                max_depth: 7,
                trace_state: true,
            }
        );
    }

    #[test]
    fn config_command_rejects_zero_depth() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("runtime.toml");
        assert!(cmd_config(&path, Some(0), false).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn parse_fields_accepts_json_and_bare_strings() {
        let fields =
            parse_fields(&["age=25".to_string(), "name=Bob".to_string()]).expect("fields");
        assert_eq!(fields.get("age"), Some(&json!(25)));
        assert_eq!(fields.get("name"), Some(&json!("Bob")));
    }

    #[test]
    fn parse_fields_rejects_missing_separator() {
        let err = parse_fields(&["age".to_string()]).expect_err("invalid pair");
        assert!(err.to_string().contains("KEY=JSON"));
    }

    #[test]
    fn parse_seed_requires_object() {
        assert!(parse_seed(Some("[1, 2]")).is_err());
        let state = parse_seed(Some(r#"{"age": 3}"#)).expect("seed");
        assert_eq!(state.get_i64("age"), Some(3));
    }
}
