pub mod commands;
pub mod handlers;
pub mod session;

// Re-export the pieces the binary and integration tests reach for
pub use commands::command_argument_builder;
pub use handlers::{
    apply_hidden, default_output_path, init_tracing, load_settings, report_error, write_output,
};
pub use session::{SessionCommand, Target, apply_command, parse_session_command};
