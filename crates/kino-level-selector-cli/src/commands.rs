//! CLI command implementations

use crate::output::{format_view, to_json, OutputFormat};
use crate::script::{self, Session};
use console::style;
use kino_level_selector::{
    CallbackRegistry, Level, LevelSelectorConfig, SelectorTheme, Selection,
};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Load a configuration file, or defaults when none is given
fn load_config(path: Option<&Path>) -> anyhow::Result<LevelSelectorConfig> {
    let registry = CallbackRegistry::with_builtins();
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading selector configuration");
            Ok(LevelSelectorConfig::from_file(path, &registry)?)
        }
        None => Ok(LevelSelectorConfig::default()),
    }
}

/// Replay a scripted session
pub fn simulate(script_path: &Path, config: Option<&Path>, format: &str) -> anyhow::Result<()> {
    let format = OutputFormat::from(format);
    let steps = script::load(script_path)?;
    let mut session = Session::new(load_config(config)?, 360.0)?;

    info!(steps = steps.len(), controller_id = %session.controller().id(), "Replaying session");

    let mut reports = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        let report = session.apply(step)?;
        match format {
            OutputFormat::Json => reports.push(report),
            _ => {
                println!(
                    "{} {}",
                    style(format!("{:>3}.", i + 1)).dim(),
                    style(&report.step).cyan()
                );
                if let Some(outcome) = &report.outcome {
                    println!("     -> {}", outcome);
                }
                println!("{}", format_view(report.view.as_ref(), format));
            }
        }
    }

    if format == OutputFormat::Json {
        println!("{}", to_json(&reports));
    }
    Ok(())
}

/// Render the menu for one level set
pub fn render(
    levels_path: &Path,
    active: Option<i32>,
    config: Option<&Path>,
    height: f64,
    format: &str,
) -> anyhow::Result<()> {
    let format = OutputFormat::from(format);
    let levels: Vec<Level> = serde_json::from_str(&std::fs::read_to_string(levels_path)?)?;
    let mut session = Session::new(load_config(config)?, height)?;

    let mut report = session.apply(&script::Step::Levels { levels })?;
    if let Some(level) = active {
        report = session.apply(&script::Step::Active { level })?;
    }

    if report.view.is_none() {
        eprintln!("Fewer than 2 levels - nothing to choose from");
    }
    println!("{}", format_view(report.view.as_ref(), format));
    if format == OutputFormat::Html {
        println!("<style>\n{}</style>", SelectorTheme::default().stylesheet());
    }
    Ok(())
}

#[derive(Serialize)]
struct ConfigReport {
    title: Option<String>,
    assume_level_changes_will_work: bool,
    labels: usize,
    callbacks: Vec<CallbackReport>,
    valid: bool,
}

#[derive(Serialize)]
struct CallbackReport {
    option: &'static str,
    status: String,
}

/// Check a configuration file. Returns false when a callback option
/// cannot be invoked.
pub fn check_config(path: &Path, format: &str) -> anyhow::Result<bool> {
    let config = load_config(Some(path))?;
    let validation = config.validate();

    let report = ConfigReport {
        title: config.title.clone(),
        assume_level_changes_will_work: config.assume_level_changes_will_work,
        labels: config.labels.len(),
        callbacks: config
            .callback_status()
            .into_iter()
            .map(|(option, status)| CallbackReport { option, status })
            .collect(),
        valid: validation.is_ok(),
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&report)),
        _ => {
            println!("Configuration: {}", path.display());
            println!("  Title: {}", report.title.as_deref().unwrap_or("-"));
            println!("  Assume level changes work: {}", report.assume_level_changes_will_work);
            println!("  Static labels: {}", report.labels);
            for callback in &report.callbacks {
                println!("  {}: {}", callback.option, callback.status);
            }
            match &validation {
                Ok(()) => println!("\n{}", style("OK").green()),
                Err(err) => println!("\n{} [{}] {}", style("INVALID").red(), err.error_code(), err),
            }
            println!(
                "\nKnown callbacks: {}",
                CallbackRegistry::with_builtins().names().join(", ")
            );
            println!("Default selection: {}", Selection::Auto);
        }
    }

    Ok(report.valid)
}

/// Print the menu stylesheet
pub fn stylesheet() {
    print!("{}", SelectorTheme::default().stylesheet());
}
