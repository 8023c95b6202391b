use drivetime::command_argument_builder;
use drivetime::handlers::{
    handle_check, handle_init, handle_render, handle_session, init_tracing, report_error,
};
use drivetime_core::print_banner;
use drivetime_core::settings::DEFAULT_CONFIG_PATH;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    init_tracing(chosen_command.get_count("verbose"));

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    let config_path = chosen_command
        .get_one::<String>("config")
        .cloned()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let result = match chosen_command.subcommand() {
        Some(("init", primary_command)) => handle_init(primary_command, &config_path),
        Some(("check", primary_command)) => handle_check(primary_command),
        Some(("render", primary_command)) => {
            handle_render(primary_command, &config_path, quiet).await
        }
        Some(("session", primary_command)) => handle_session(primary_command, &config_path).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        report_error(&e);
        std::process::exit(1);
    }
}
