use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use drivetime_core::error::{ConfigError, PipelineError, StateError};
use drivetime_core::loader::load_dataset;
use drivetime_core::pipeline::{RenderOutput, render_pass};
use drivetime_core::report::{
    OutputFormat, generate_text_summary, render_geojson, render_html, save_report,
};
use drivetime_core::settings::{FileConfig, Overrides, Settings, expand_path};
use drivetime_core::state::AppState;
use drivetime_router::{IsochroneRetriever, IsochroneSource};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const CONFIG_TEMPLATE: &str = r#"# drivetime configuration
#
# Command-line flags and the ORS_API_KEY environment variable take
# precedence over anything set here.

# api_key = "your-openrouteservice-key"
# base_url = "https://api.openrouteservice.org"
# timeout_secs = 30
# default_minutes = 10

# The free OpenRouteService plan allows roughly one isochrone call per second.
[rate_limit]
capacity = 1
refill_ms = 1000
"#;

pub fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

pub fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> Option<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush().ok()?;
    let mut response = String::new();
    match io::stdin().read_line(&mut response) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(response.trim().to_string()),
    }
}

/// Collects provider and duration flags from a subcommand.
pub fn parse_overrides(args: &ArgMatches) -> Overrides {
    Overrides {
        api_key: args.get_one::<String>("api-key").cloned(),
        base_url: args.get_one::<String>("base-url").cloned(),
        timeout_secs: args.get_one::<u64>("timeout").copied(),
        minutes: args.get_one::<u32>("minutes").copied(),
        rate_limit_capacity: args.get_one::<u32>("rate-limit-burst").copied(),
        rate_limit_refill_ms: args.get_one::<u64>("rate-limit-interval").copied(),
    }
}

pub fn load_settings(config_path: &str, overrides: Overrides) -> Result<Settings, ConfigError> {
    let file = FileConfig::load_optional(&expand_path(config_path))?;
    Settings::resolve(file, overrides)
}

pub fn output_format(args: &ArgMatches) -> OutputFormat {
    args.get_one::<String>("format")
        .and_then(|f| OutputFormat::from_str(f))
        .unwrap_or(OutputFormat::Html)
}

pub fn output_path(args: &ArgMatches, format: OutputFormat) -> PathBuf {
    args.get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| default_output_path(format))
}

pub fn default_output_path(format: OutputFormat) -> PathBuf {
    PathBuf::from(format!("drivetime-map.{}", format.extension()))
}

/// Hides the named projects and company locations before the first render.
pub fn apply_hidden<'a>(
    state: &mut AppState,
    projects: impl IntoIterator<Item = &'a String>,
    companies: impl IntoIterator<Item = &'a String>,
) -> Result<(), StateError> {
    for name in projects {
        state.set_project_visible(name, false)?;
    }
    for location in companies {
        state.set_company_visible(location, false)?;
    }
    Ok(())
}

pub fn write_output(output: &RenderOutput, format: OutputFormat, path: &Path) -> Result<()> {
    let content = match format {
        OutputFormat::Html => render_html(&output.map, &output.legend_html)?,
        OutputFormat::GeoJson => serde_json::to_string_pretty(&render_geojson(&output.map))?,
    };
    save_report(&content, path).with_context(|| format!("Failed to write {}", path.display()))
}

/// Prints a failure the way the rest of the CLI does.
pub fn report_error(err: &anyhow::Error) {
    let missing_key = matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingApiKey)
    ) || matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::Config(ConfigError::MissingApiKey))
    );

    if missing_key {
        eprintln!("{} {}", "⚠".yellow().bold(), err.to_string().yellow());
    } else {
        eprintln!("{} {:#}", "✗".red().bold(), err);
    }
}

pub fn handle_init(args: &ArgMatches, config_path: &str) -> Result<()> {
    print_divider();
    println!("{}", "  DRIVETIME INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let force = args.get_flag("force");
    let path = expand_path(config_path);

    if path.exists() && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("Config file already exists:");
        println!("  {} {}", "•".yellow(), path.display().to_string().bright_white());
        println!();

        let response = print_prompt("Overwrite it? [y/N]:").unwrap_or_default().to_lowercase();
        println!();
        if response != "y" && response != "yes" {
            println!("{} Initialization cancelled.", "✗".red().bold());
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} Config written: {}",
        "✓".green().bold(),
        path.display().to_string().bright_white()
    );
    println!(
        "{} Set api_key there or export ORS_API_KEY before rendering.",
        "ℹ".blue()
    );
    Ok(())
}

pub fn handle_check(args: &ArgMatches) -> Result<()> {
    let input = args
        .get_one::<PathBuf>("input")
        .context("--input is required")?;

    let dataset = load_dataset(input).map_err(PipelineError::from)?;
    let state = AppState::from_dataset(dataset, drivetime_core::settings::DEFAULT_MINUTES)
        .map_err(PipelineError::from)?;
    let colors = drivetime_core::colors::assign_colors(state.companies());

    println!("{} {}", "✓".green().bold(), input.display().to_string().bright_white());
    println!();
    println!("{}", "Projects".bold());
    for site in state.projects() {
        println!("  ★ {}  ({}, {})", site.name, site.latitude, site.longitude);
    }
    println!();
    println!("{}", "Company locations".bold());
    for company in state.companies() {
        println!(
            "  • {}  [{}]  ({}, {})",
            company.location, company.group, company.latitude, company.longitude
        );
    }
    println!();
    println!(
        "{} projects, {} company locations, {} companies",
        state.projects().len().to_string().cyan(),
        state.companies().len().to_string().cyan(),
        colors.len().to_string().cyan()
    );
    Ok(())
}

/// Loads the input into fresh state, halting on the first problem.
fn prepare_state(args: &ArgMatches, settings: &Settings) -> Result<AppState, PipelineError> {
    // The credential is checked before any input is read.
    settings.require_api_key()?;

    let input = args
        .get_one::<PathBuf>("input")
        .cloned()
        .unwrap_or_default();
    let dataset = load_dataset(&input)?;
    Ok(AppState::from_dataset(dataset, settings.duration_minutes)?)
}

pub async fn render_and_save<S: IsochroneSource>(
    state: &AppState,
    retriever: &mut IsochroneRetriever<S>,
    format: OutputFormat,
    path: &Path,
    show_progress: bool,
) -> Result<RenderOutput> {
    let output = render_pass(state, retriever, show_progress).await?;
    write_output(&output, format, path)?;
    Ok(output)
}

pub async fn handle_render(args: &ArgMatches, config_path: &str, quiet: bool) -> Result<()> {
    let settings = load_settings(config_path, parse_overrides(args))?;
    let mut state = prepare_state(args, &settings)?;

    apply_hidden(
        &mut state,
        args.get_many::<String>("hide-project").into_iter().flatten(),
        args.get_many::<String>("hide-company").into_iter().flatten(),
    )
    .map_err(PipelineError::from)?;

    let client = settings.build_client().map_err(PipelineError::from)?;
    let mut retriever = IsochroneRetriever::with_policy(client, settings.rate_limit);

    let format = output_format(args);
    let path = output_path(args, format);
    let output = render_and_save(&state, &mut retriever, format, &path, !quiet).await?;

    if !quiet {
        print!("{}", generate_text_summary(&output.map, &output.colors, &output.stats));
        println!();
    }
    println!(
        "{} Map written: {}",
        "✓".green().bold(),
        path.display().to_string().bright_white()
    );
    Ok(())
}

pub async fn handle_session(args: &ArgMatches, config_path: &str) -> Result<()> {
    let settings = load_settings(config_path, parse_overrides(args))?;
    let state = prepare_state(args, &settings)?;

    let client = settings.build_client().map_err(PipelineError::from)?;
    let retriever = IsochroneRetriever::with_policy(client, settings.rate_limit);

    let format = output_format(args);
    let path = output_path(args, format);

    crate::session::run(state, retriever, format, &path).await
}
