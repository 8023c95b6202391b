use clap::{Arg, ArgAction, arg, command};
use drivetime_core::settings::{DEFAULT_CONFIG_PATH, MAX_MINUTES, MIN_MINUTES};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

fn input_arg() -> Arg {
    arg!(-i --"input" <PATH>)
        .required(true)
        .help("Excel workbook with 'Companies' and 'Projects' sheets, or a directory holding Companies.csv and Projects.csv")
        .value_parser(clap::value_parser!(std::path::PathBuf))
}

/// Arguments shared by every command that talks to the routing provider.
fn provider_args() -> Vec<Arg> {
    vec![
        arg!(-k --"api-key" <KEY>)
            .required(false)
            .env("ORS_API_KEY")
            .hide_env_values(true)
            .help("OpenRouteService API key"),
        arg!(-m --"minutes" <MINUTES>)
            .required(false)
            .help("Drive-time radius in minutes (default: 10, or the config file value)")
            .value_parser(clap::value_parser!(u32).range(MIN_MINUTES as i64..=MAX_MINUTES as i64)),
        arg!(--"base-url" <URL>)
            .required(false)
            .help("Routing provider base URL (default: https://api.openrouteservice.org)"),
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Provider request timeout in seconds")
            .value_parser(clap::value_parser!(u64)),
        arg!(--"rate-limit-burst" <CALLS>)
            .required(false)
            .help("Provider calls allowed back to back before throttling")
            .value_parser(clap::value_parser!(u32).range(1..)),
        arg!(--"rate-limit-interval" <MILLIS>)
            .required(false)
            .help("Milliseconds to restore one provider call (0 disables throttling)")
            .value_parser(clap::value_parser!(u64)),
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Where to write the map (default: drivetime-map.html or drivetime-map.geojson)")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
        arg!(-f --"format" <FORMAT>)
            .required(false)
            .help("Output format: html, geojson")
            .value_parser(["html", "geojson"])
            .default_value("html"),
    ]
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("drivetime")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("drivetime")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v info, -vv debug)")
                .required(false)
                .global(true)
                .action(ArgAction::Count),
        )
        .arg(
            arg!(-c --"config" <PATH>)
                .required(false)
                .global(true)
                .help("Config file location")
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes a config file template")
                .arg(
                    arg!(-f --"force")
                        .help("Overwrite an existing config file without asking")
                        .required(false),
                ),
        )
        .subcommand(
            command!("check")
                .about("Validates an input file and lists what it contains. No API key needed.")
                .arg(input_arg()),
        )
        .subcommand(
            command!("render")
                .about("Fetches drive-time areas for every visible location and writes the map")
                .arg(input_arg())
                .args(provider_args())
                .arg(
                    arg!(--"hide-project" <NAME>)
                        .required(false)
                        .help("Leave a project off the map (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    arg!(--"hide-company" <LOCATION>)
                        .required(false)
                        .help("Leave a company location off the map (repeatable)")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            command!("session")
                .about(
                    "Interactive session: toggle locations and change the drive time, \
                re-rendering the map after every change",
                )
                .arg(input_arg())
                .args(provider_args()),
        )
}
