// Interactive session: every change re-renders the whole map from current state

use crate::handlers::{print_divider, render_and_save, report_error};
use anyhow::Result;
use colored::Colorize;
use drivetime_core::loader::load_dataset;
use drivetime_core::report::{OutputFormat, generate_text_summary};
use drivetime_core::settings::{MAX_MINUTES, MIN_MINUTES};
use drivetime_core::state::AppState;
use drivetime_router::{IsochroneRetriever, IsochroneSource};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Project,
    Company,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Show(Target, String),
    Hide(Target, String),
    Toggle(Target, String),
    Minutes(u32),
    Reload(PathBuf),
    Render,
    List,
    Cache,
    Help,
    Quit,
    /// A blank line.
    Empty,
}

impl SessionCommand {
    /// Whether the command changes state and so triggers a re-render.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            SessionCommand::Show(..)
                | SessionCommand::Hide(..)
                | SessionCommand::Toggle(..)
                | SessionCommand::Minutes(_)
                | SessionCommand::Reload(_)
        )
    }
}

const HELP: &str = "\
Commands:
  list                          Show projects and company locations with visibility
  toggle project|company <name> Flip visibility
  show project|company <name>   Make visible
  hide project|company <name>   Hide
  minutes <n>                   Change the drive-time radius (1-300)
  reload <path>                 Load a new input file
  render                        Rebuild the map now
  cache                         Show cached drive-time areas
  help                          This text
  quit                          Leave the session";

fn parse_target(line: &str) -> Result<(Target, String), String> {
    let (kind, name) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| "expected 'project <name>' or 'company <name>'".to_string())?;
    let target = match kind.to_lowercase().as_str() {
        "project" | "p" => Target::Project,
        "company" | "c" => Target::Company,
        other => return Err(format!("unknown target '{}': use project or company", other)),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err("missing name".to_string());
    }
    Ok((target, name.to_string()))
}

pub fn parse_session_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));

    match word.to_lowercase().as_str() {
        "show" => parse_target(rest).map(|(t, n)| SessionCommand::Show(t, n)),
        "hide" => parse_target(rest).map(|(t, n)| SessionCommand::Hide(t, n)),
        "toggle" | "t" => parse_target(rest).map(|(t, n)| SessionCommand::Toggle(t, n)),
        "minutes" | "m" => {
            let minutes: u32 = rest
                .parse()
                .map_err(|_| format!("expected a number of minutes, got '{}'", rest))?;
            if !(MIN_MINUTES..=MAX_MINUTES).contains(&minutes) {
                return Err(format!(
                    "drive time must be between {} and {} minutes",
                    MIN_MINUTES, MAX_MINUTES
                ));
            }
            Ok(SessionCommand::Minutes(minutes))
        }
        "reload" if !rest.is_empty() => Ok(SessionCommand::Reload(PathBuf::from(rest))),
        "reload" => Err("expected a path".to_string()),
        "render" | "r" => Ok(SessionCommand::Render),
        "list" | "ls" => Ok(SessionCommand::List),
        "cache" => Ok(SessionCommand::Cache),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
        "" => Ok(SessionCommand::Empty),
        other => Err(format!("unknown command '{}', type 'help'", other)),
    }
}

/// Applies a state-changing command. Non-mutating commands are ignored.
pub fn apply_command(state: &mut AppState, command: &SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Show(Target::Project, name) => state.set_project_visible(name, true)?,
        SessionCommand::Show(Target::Company, name) => state.set_company_visible(name, true)?,
        SessionCommand::Hide(Target::Project, name) => state.set_project_visible(name, false)?,
        SessionCommand::Hide(Target::Company, name) => state.set_company_visible(name, false)?,
        SessionCommand::Toggle(Target::Project, name) => {
            state.toggle_project(name)?;
        }
        SessionCommand::Toggle(Target::Company, name) => {
            state.toggle_company(name)?;
        }
        SessionCommand::Minutes(minutes) => state.set_duration_minutes(*minutes)?,
        SessionCommand::Reload(path) => state.reload(load_dataset(path)?),
        _ => {}
    }
    Ok(())
}

fn print_listing(state: &AppState) {
    println!("{}", "Projects".bold());
    for site in state.projects() {
        let mark = if site.visible { "✓".green() } else { "·".bright_black() };
        println!("  {} {}", mark, site.name);
    }
    println!("{}", "Company locations".bold());
    for company in state.companies() {
        let mark = if state.is_company_visible(&company.location) {
            "✓".green()
        } else {
            "·".bright_black()
        };
        println!("  {} {}  [{}]", mark, company.location, company.group.bright_black());
    }
    println!("Drive time: {} minutes", state.duration_minutes());
}

async fn rerender<S: IsochroneSource>(
    state: &AppState,
    retriever: &mut IsochroneRetriever<S>,
    format: OutputFormat,
    path: &Path,
) {
    match render_and_save(state, retriever, format, path, true).await {
        Ok(output) => {
            print!("{}", generate_text_summary(&output.map, &output.colors, &output.stats));
            println!(
                "{} Map written: {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        Err(e) => report_error(&e),
    }
}

pub async fn run<S: IsochroneSource>(
    mut state: AppState,
    mut retriever: IsochroneRetriever<S>,
    format: OutputFormat,
    path: &Path,
) -> Result<()> {
    print_divider();
    println!("{}", "  DRIVE-TIME SESSION".bright_white().bold());
    print_divider();
    println!("Type 'help' for commands.\n");

    rerender(&state, &mut retriever, format, path).await;

    let stdin = io::stdin();
    loop {
        print!("{} ", "drivetime>".bright_cyan().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match parse_session_command(&line) {
            Ok(SessionCommand::Empty) => continue,
            Ok(command) => command,
            Err(msg) => {
                eprintln!("{} {}", "✗".red().bold(), msg);
                continue;
            }
        };
        debug!("Session command: {:?}", command);

        if command.mutates() {
            match apply_command(&mut state, &command) {
                Ok(()) => rerender(&state, &mut retriever, format, path).await,
                Err(e) => report_error(&e),
            }
            continue;
        }

        match command {
            SessionCommand::Quit => break,
            SessionCommand::Help => println!("{}", HELP),
            SessionCommand::List => print_listing(&state),
            SessionCommand::Cache => {
                let stats = retriever.stats();
                println!(
                    "{} cached areas, {} provider calls, {} cache hits, {} failures",
                    retriever.cache().len().to_string().cyan(),
                    stats.calls,
                    stats.hits,
                    stats.failures
                );
                for key in retriever.cache().keys() {
                    println!(
                        "  ({}, {}) {} min",
                        key.longitude,
                        key.latitude,
                        key.seconds / 60
                    );
                }
            }
            SessionCommand::Render => rerender(&state, &mut retriever, format, path).await,
            _ => {}
        }
    }

    println!("Bye.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivetime_core::model::{CompanyRecord, Dataset, ProjectSite};

    fn state() -> AppState {
        AppState::from_dataset(
            Dataset {
                companies: vec![CompanyRecord {
                    location: "Acme HQ".to_string(),
                    group: "Acme".to_string(),
                    latitude: 40.1,
                    longitude: -74.1,
                }],
                projects: vec![ProjectSite::new("North Bridge", 40.0, -74.0)],
            },
            10,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_toggle_with_spaces_in_name() {
        assert_eq!(
            parse_session_command("toggle project North Bridge"),
            Ok(SessionCommand::Toggle(Target::Project, "North Bridge".to_string()))
        );
        assert_eq!(
            parse_session_command("  hide company   Acme HQ  "),
            Ok(SessionCommand::Hide(Target::Company, "Acme HQ".to_string()))
        );
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_session_command("minutes 15"), Ok(SessionCommand::Minutes(15)));
        assert!(parse_session_command("minutes 0").is_err());
        assert!(parse_session_command("minutes 301").is_err());
        assert!(parse_session_command("minutes ten").is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_session_command("render"), Ok(SessionCommand::Render));
        assert_eq!(parse_session_command("LIST"), Ok(SessionCommand::List));
        assert_eq!(parse_session_command("q"), Ok(SessionCommand::Quit));
        assert_eq!(
            parse_session_command("reload data/sites.xlsx"),
            Ok(SessionCommand::Reload(PathBuf::from("data/sites.xlsx")))
        );
        assert!(parse_session_command("reload").is_err());
        assert!(parse_session_command("dance").is_err());
        assert!(parse_session_command("toggle building X").is_err());
    }

    #[test]
    fn test_blank_line_is_empty_command() {
        assert_eq!(parse_session_command(""), Ok(SessionCommand::Empty));
        assert_eq!(parse_session_command("   \n"), Ok(SessionCommand::Empty));
        assert!(!SessionCommand::Empty.mutates());
    }

    #[test]
    fn test_only_mutations_rerender() {
        assert!(SessionCommand::Minutes(5).mutates());
        assert!(SessionCommand::Toggle(Target::Company, "x".to_string()).mutates());
        assert!(!SessionCommand::List.mutates());
        assert!(!SessionCommand::Cache.mutates());
    }

    #[test]
    fn test_apply_command() {
        let mut state = state();

        apply_command(
            &mut state,
            &SessionCommand::Toggle(Target::Project, "North Bridge".to_string()),
        )
        .unwrap();
        assert_eq!(state.is_project_visible("North Bridge"), Some(false));

        apply_command(&mut state, &SessionCommand::Hide(Target::Company, "Acme HQ".to_string()))
            .unwrap();
        assert!(!state.is_company_visible("Acme HQ"));

        apply_command(&mut state, &SessionCommand::Minutes(25)).unwrap();
        assert_eq!(state.duration_seconds(), 1500);

        let err = apply_command(
            &mut state,
            &SessionCommand::Show(Target::Project, "Nowhere".to_string()),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unknown project 'Nowhere'");
    }
}
