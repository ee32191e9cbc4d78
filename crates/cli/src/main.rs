//! `calcctl` – headless CLI harness for the calculator engine.
//!
//! Drives the same engine a UI shell would, without a window: one-shot
//! commands, key sequences, an interactive prompt, YAML scenarios and a
//! daemon mode.

mod config;
mod logging;
mod serve;

use calc_engine::keys;
use calc_engine::platform::{HeadlessShell, TerminalShell};
use calc_engine::traits::UiShell;
use calc_engine::types::*;
use calc_engine::{AppContext, CalculatorSettings, CommandRegistry, CommandResult};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

// ===========================================================================
// CLI definition
// ===========================================================================

#[derive(Parser)]
#[command(
    name = "calcctl",
    version,
    about = "CLI harness for the calculator engine"
)]
struct Cli {
    /// Extra YAML config file layered over global_config.yaml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke an engine command by name with JSON args.
    Call {
        /// Command name (e.g. "digit", "operator", "equals", "evaluate").
        cmd: String,
        /// JSON args to pass to the command.
        #[arg(long, default_value = "{}")]
        args: String,
        /// Key sequence to press before the command (e.g. "5+3").
        #[arg(long)]
        keys: Option<String>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Directory for artifacts output.
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },

    /// Press a key sequence and print the final display.
    Keys {
        /// Keys such as "12.5<Negate>*4<Enter>".
        sequence: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive calculator; every line is a key sequence.
    Repl,

    /// Run a scripted scenario from a YAML file.
    RunScenario {
        /// Path to the scenario YAML file.
        file: PathBuf,
        /// Directory for artifacts output.
        #[arg(long)]
        artifacts: Option<PathBuf>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start daemon mode over a Unix socket.
    Serve {
        /// Path for the Unix domain socket.
        #[arg(long)]
        socket: PathBuf,
    },

    /// Print the effective configuration.
    Config {
        /// Output as JSON instead of YAML-ish debug text.
        #[arg(long)]
        json: bool,
    },
}

// ===========================================================================
// Main
// ===========================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let app_config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };
    logging::init_logging(&app_config.logging);

    let settings = app_config.calculator.clone();
    let registry = CommandRegistry::new();

    match cli.command {
        Commands::Call {
            cmd,
            args,
            keys,
            json,
            artifacts,
        } => cmd_call(&cmd, &args, keys.as_deref(), json, artifacts, settings, &registry),
        Commands::Keys { sequence, json } => cmd_keys(&sequence, json, settings, &registry),
        Commands::Repl => cmd_repl(settings),
        Commands::RunScenario {
            file,
            artifacts,
            json,
        } => cmd_run_scenario(&file, json, artifacts, settings, &registry),
        Commands::Serve { socket } => serve::run_daemon(socket, settings, registry).await,
        Commands::Config { json } => cmd_config(&app_config, json),
    }
}

fn headless_context(settings: CalculatorSettings) -> AppContext {
    AppContext::new(settings, Box::new(HeadlessShell))
}

// ===========================================================================
// Subcommand implementations
// ===========================================================================

fn cmd_call(
    cmd: &str,
    args_str: &str,
    keys: Option<&str>,
    json: bool,
    artifacts: Option<PathBuf>,
    settings: CalculatorSettings,
    registry: &CommandRegistry,
) {
    let args: serde_json::Value = match serde_json::from_str(args_str) {
        Ok(v) => v,
        Err(e) => {
            let r = result_err(
                "call",
                cmd,
                &new_run_id(),
                0,
                ErrorCode::InvalidInput,
                format!("invalid JSON args: {}", e),
            );
            output_result(&r, json);
            return;
        }
    };

    let mut ctx = headless_context(settings);
    if let Some(seq) = keys {
        let primed = registry.execute("keys", serde_json::json!({ "sequence": seq }), &mut ctx);
        if primed.status != Status::Pass {
            output_result(&primed, json);
            return;
        }
    }

    let result = registry.execute(cmd, args, &mut ctx);
    if let Some(ref dir) = artifacts {
        write_artifacts(dir, &result);
    }
    output_result(&result, json);
}

fn cmd_keys(sequence: &str, json: bool, settings: CalculatorSettings, registry: &CommandRegistry) {
    let mut ctx = headless_context(settings);
    let result = registry.execute(
        "keys",
        serde_json::json!({ "sequence": sequence }),
        &mut ctx,
    );
    output_result(&result, json);
}

fn cmd_repl(settings: CalculatorSettings) {
    let mut ctx = headless_context(settings);
    let mut screen = TerminalShell::stdout();

    println!("Keys: 0-9 . + - * / % ^ = <Enter> <Escape> <Backspace> <Negate>; 'quit' to exit");
    screen.render(&ctx.calculator().view());

    loop {
        let line: String = match dialoguer::Input::new()
            .with_prompt("calc")
            .allow_empty(true)
            .interact_text()
        {
            Ok(l) => l,
            Err(e) => {
                tracing::debug!(error = %e, "prompt closed");
                break;
            }
        };

        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }

        match keys::parse_sequence(line) {
            Ok(seq) => {
                let view = ctx.press_keys(&seq);
                screen.render(&view);
            }
            Err(e) => eprintln!("  {}", e),
        }
    }
}

fn cmd_run_scenario(
    file: &Path,
    json: bool,
    artifacts: Option<PathBuf>,
    settings: CalculatorSettings,
    registry: &CommandRegistry,
) {
    let yaml = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            let r = result_err(
                "run-scenario",
                &file.display().to_string(),
                &new_run_id(),
                0,
                ErrorCode::IoError,
                format!("cannot read scenario file: {}", e),
            );
            output_result(&r, json);
            return;
        }
    };

    let scenario = match calc_engine::scenario::load_scenario(&yaml) {
        Ok(s) => s,
        Err(e) => {
            let r = result_err(
                "run-scenario",
                &file.display().to_string(),
                &new_run_id(),
                0,
                ErrorCode::InvalidInput,
                e,
            );
            output_result(&r, json);
            return;
        }
    };

    let mut ctx = headless_context(settings);
    let scenario_result = calc_engine::scenario::run_scenario(&scenario, &mut ctx, registry);

    if json {
        let j = serde_json::to_string_pretty(&scenario_result).unwrap_or_default();
        println!("{}", j);
    } else {
        println!(
            "Scenario: {}",
            scenario_result.name.as_deref().unwrap_or("<unnamed>")
        );
        println!("Overall: {:?}", scenario_result.overall_status);
        for (i, sr) in scenario_result.step_results.iter().enumerate() {
            println!(
                "  Step {}: {} -> {:?} ({}ms)",
                i, sr.target, sr.status, sr.timing_ms.total
            );
            if let Some(ref err) = sr.error {
                println!("    {} – {}", err.code, err.message);
            }
        }
    }

    if let Some(ref dir) = artifacts {
        let art_dir = dir.join(new_run_id());
        if let Err(e) = std::fs::create_dir_all(&art_dir) {
            eprintln!(
                "warning: failed to create artifacts dir {}: {}",
                art_dir.display(),
                e
            );
        } else {
            let j = serde_json::to_string_pretty(&scenario_result).unwrap_or_default();
            let _ = std::fs::write(art_dir.join("result.json"), j);

            // Write per-step results as events.jsonl
            let mut lines = String::new();
            for sr in &scenario_result.step_results {
                if let Ok(line) = serde_json::to_string(sr) {
                    lines.push_str(&line);
                    lines.push('\n');
                }
            }
            let _ = std::fs::write(art_dir.join("events.jsonl"), lines);
        }
    }

    if scenario_result.overall_status == Status::Fail {
        std::process::exit(1);
    }
}

fn cmd_config(app_config: &config::AppConfig, json: bool) {
    if json {
        let j = serde_json::to_string_pretty(app_config).unwrap_or_default();
        println!("{}", j);
    } else {
        println!("{:#?}", app_config);
    }
}

// ===========================================================================
// Output helpers
// ===========================================================================

fn output_result(result: &CommandResult, json: bool) {
    if json {
        let j = serde_json::to_string_pretty(result).unwrap_or_default();
        println!("{}", j);
    } else {
        print_human(result);
    }

    // Exit with non-zero status on error/fail
    match result.status {
        Status::Pass => {}
        Status::Fail => std::process::exit(1),
        Status::Error => std::process::exit(2),
    }
}

fn print_human(r: &CommandResult) {
    let status_icon = match r.status {
        Status::Pass => "PASS",
        Status::Fail => "FAIL",
        Status::Error => "ERROR",
    };

    println!("[{}] {} {}", status_icon, r.command, r.target);

    if let Some(ref err) = r.error {
        println!("  error:   {} – {}", err.code, err.message);
    }

    if let Some(ref data) = r.data {
        let field = |name: &str| data.get(name).and_then(|v| v.as_str()).map(String::from);
        match (field("history"), field("input")) {
            (Some(history), Some(input)) => {
                println!("  history: {}", history);
                println!("  input:   {}", input);
            }
            _ => {
                if let Ok(s) = serde_json::to_string_pretty(data) {
                    for line in s.lines() {
                        println!("  {}", line);
                    }
                }
            }
        }
    }
}

// ===========================================================================
// Artifact helpers
// ===========================================================================

fn write_artifacts(dir: &Path, result: &CommandResult) {
    let art_dir = dir.join(&result.run_id);
    if let Err(e) = std::fs::create_dir_all(&art_dir) {
        eprintln!(
            "warning: failed to create artifacts dir {}: {}",
            art_dir.display(),
            e
        );
        return;
    }

    let j = serde_json::to_string_pretty(result).unwrap_or_default();
    let _ = std::fs::write(art_dir.join("result.json"), &j);

    // events.jsonl (single event for non-scenario)
    if let Ok(line) = serde_json::to_string(result) {
        let _ = std::fs::write(art_dir.join("events.jsonl"), format!("{}\n", line));
    }
}
