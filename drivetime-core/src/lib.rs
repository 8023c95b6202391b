pub mod colors;
pub mod error;
pub mod loader;
pub mod map;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod settings;
pub mod state;

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
    ┌┬┐┬─┐┬┬  ┬┌─┐┌┬┐┬┌┬┐┌─┐
     ││├┬┘│└┐┌┘├┤  │ ││││├┤
    ─┴┘┴└─┴ └┘ └─┘ ┴ ┴┴ ┴└─┘
    "#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "    {} {}\n",
        "drive-time isochrone maps".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
