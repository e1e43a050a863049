use std::fs;
use std::path::Path;

use anyhow::Context;
use canvas_diff::{StateChange, StateDiff};
use canvas_sdk::{CanvasAction, CanvasSession, SessionConfig};
use canvas_types::{default_data_for, is_non_empty_state, CardType, RootState, Snapshot};
use colored::Colorize;
use serde_json::{json, Value};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    let format = cli.format;

    match cli.command {
        Command::Merge(args) => cmd_merge(args, config, format),
        Command::Replay(args) => cmd_replay(args, config, format),
        Command::Default(args) => cmd_default(args),
        Command::Check(args) => cmd_check(args, format),
        Command::Apply(args) => cmd_apply(args, config, format),
    }
}

fn cmd_merge(args: MergeArgs, config: SessionConfig, format: OutputFormat) -> anyhow::Result<()> {
    let mut session = CanvasSession::with_state(read_state(&args.cached)?, config);
    let diff = session.ingest(&read_snapshot(&args.incoming)?);
    finish(session.state(), &[diff], args.output.as_deref(), format)
}

fn cmd_replay(args: ReplayArgs, config: SessionConfig, format: OutputFormat) -> anyhow::Result<()> {
    let mut session = CanvasSession::with_state(read_state(&args.initial)?, config);
    let mut diffs = Vec::with_capacity(args.snapshots.len());
    for path in &args.snapshots {
        let diff = session.ingest(&read_snapshot(path)?);
        debug!(snapshot = %path.display(), changes = diff.len(), "replayed");
        diffs.push(diff);
    }
    finish(session.state(), &diffs, args.output.as_deref(), format)
}

fn cmd_apply(args: ApplyArgs, config: SessionConfig, format: OutputFormat) -> anyhow::Result<()> {
    let actions = read_actions(&args.actions)?;
    let mut session = CanvasSession::with_state(read_state(&args.state)?, config);
    let mut diffs = Vec::with_capacity(actions.len());
    for (n, action) in actions.iter().enumerate() {
        let diff = session
            .apply(action)
            .with_context(|| format!("action #{} ({})", n + 1, action.name()))?;
        diffs.push(diff);
    }
    finish(session.state(), &diffs, args.output.as_deref(), format)
}

fn cmd_default(args: DefaultArgs) -> anyhow::Result<()> {
    if CardType::parse(&args.card_type).is_none() {
        eprintln!(
            "{} unknown card type {}, showing the generic payload",
            "warning:".yellow().bold(),
            args.card_type.yellow()
        );
    }
    let data = default_data_for(&args.card_type);
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

fn cmd_check(args: CheckArgs, format: OutputFormat) -> anyhow::Result<()> {
    let value = read_json(&args.state)?;
    let has_content = is_non_empty_state(&value);
    let state: RootState = serde_json::from_value(value)
        .with_context(|| format!("decoding state {}", args.state.display()))?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "has_content": has_content,
                "items": state.items.len(),
                "items_created": state.items_created,
                "plan_steps": state.plan_steps.len(),
            }))?
        ),
        OutputFormat::Text => {
            if has_content {
                println!("{} {} has content", "✓".green().bold(), args.state.display());
            } else {
                println!("{} {} is empty", "·".dimmed(), args.state.display());
            }
            println!("  Items: {} (created: {})", state.items.len().to_string().bold(), state.items_created);
            if let Some(step) = state.current_step() {
                println!("  Plan: {} [{}]", step.title().cyan(), state.plan_status.yellow());
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Input / output
// ---------------------------------------------------------------------------

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Read a cached state. An empty file is the initial canvas.
fn read_state(path: &Path) -> anyhow::Result<RootState> {
    let value = read_json(path)?;
    serde_json::from_value(value).with_context(|| format!("decoding state {}", path.display()))
}

fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let value = read_json(path)?;
    Snapshot::from_value(&value).with_context(|| format!("decoding snapshot {}", path.display()))
}

/// Read one action object or an array of them.
fn read_actions(path: &Path) -> anyhow::Result<Vec<CanvasAction>> {
    let value = read_json(path)?;
    let actions = match value {
        Value::Array(_) => serde_json::from_value::<Vec<CanvasAction>>(value),
        other => serde_json::from_value::<CanvasAction>(other).map(|action| vec![action]),
    };
    actions.with_context(|| format!("decoding actions {}", path.display()))
}

fn finish(
    state: &RootState,
    diffs: &[StateDiff],
    output: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(state)?;
    if let Some(path) = output {
        fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("writing {}", path.display()))?;
    }

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "state": state, "diffs": diffs }))?
        ),
        OutputFormat::Text => {
            for (n, diff) in diffs.iter().enumerate() {
                if diffs.len() > 1 {
                    println!("{} {}", format!("#{}", n + 1).yellow().bold(), diff);
                } else {
                    println!("{}", diff);
                }
                print_changes(diff);
            }
            match output {
                Some(path) => println!("{} Wrote {}", "✓".green().bold(), path.display().to_string().bold()),
                None => println!("{rendered}"),
            }
        }
    }
    Ok(())
}

fn print_changes(diff: &StateDiff) {
    for change in &diff.changes {
        match change {
            StateChange::ItemAdded { id, kind } => println!("  {} {} ({})", "+".green(), id, kind),
            StateChange::ItemRemoved { id, kind } => println!("  {} {} ({})", "-".red(), id, kind),
            StateChange::ItemModified { id, parts } => {
                let parts: Vec<String> = parts.iter().map(ToString::to_string).collect();
                println!("  {} {} [{}]", "~".yellow(), id, parts.join(", "));
            }
            StateChange::FieldChanged { field, old, new } => {
                println!("  {} {}: {} -> {}", "*".cyan(), field, old, new.to_string().bold())
            }
        }
    }
}
