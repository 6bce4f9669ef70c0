//! CLI entrypoint for the HMI layout editor.

#[path = "hmi-editor/cli.rs"]
mod cli;
#[path = "hmi-editor/layout.rs"]
mod layout;
#[path = "hmi-editor/paint.rs"]
mod paint;
#[path = "hmi-editor/render.rs"]
mod render;
#[path = "hmi-editor/serve.rs"]
mod serve;

use clap::Parser;
use hmi_editor::{logging, EditorConfig};

use cli::{Cli, Command};
use paint::{paint, Tone};

fn main() {
    if let Err(err) = run() {
        eprintln!("{}", paint(format!("Error: {err:#}"), Tone::Failed));
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve { listen: None });
    if let Command::Completions { shell } = command {
        Cli::print_completions(shell);
        return Ok(());
    }

    let config = EditorConfig::discover(cli.config.as_deref())?;
    logging::init(&config.log_level, cli.verbose);

    match command {
        Command::Serve { listen } => serve::run_serve(&config, listen),
        Command::Kinds => layout::run_kinds(),
        Command::Layout { action } => layout::run_layout(&config, action),
        Command::Render {
            telemetry,
            edit,
            out,
        } => render::run_render(&config, telemetry.as_deref(), edit, out.as_deref()),
        Command::Completions { .. } => Ok(()),
    }
}
