//! CLI definitions for hmi-editor.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "hmi-editor",
    version,
    about = "Visual layout editor for HMI dashboards",
    infer_subcommands = true,
    after_help = "Examples:\n  hmi-editor                              # serve the editor\n  hmi-editor layout add level-chamber\n  hmi-editor layout set gate-upstream-1700000000000 --x 40 --scale 0.5\n  hmi-editor render --telemetry values.json --out frame.svg"
)]
pub struct Cli {
    /// Configuration file (defaults to ./hmi-editor.toml when present).
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
    /// Show debug logging.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Writes the completion script for `shell` to stdout.
    pub fn print_completions(shell: Shell) {
        let mut command = Self::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the browser editor (default).
    Serve {
        /// Listen address override, e.g. 127.0.0.1:8090.
        #[arg(long)]
        listen: Option<String>,
    },
    /// List the widget types that can be placed.
    Kinds,
    /// Inspect or edit the saved layout.
    Layout {
        #[command(subcommand)]
        action: LayoutAction,
    },
    /// Render the saved layout to SVG.
    Render {
        /// JSON object of telemetry channel values.
        #[arg(long)]
        telemetry: Option<PathBuf>,
        /// Include edit decorations.
        #[arg(long)]
        edit: bool,
        /// Output file (stdout when omitted).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum LayoutAction {
    /// Print placed widgets.
    Show {
        /// Print the stored JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Place a new widget with its default geometry.
    Add {
        /// Widget type tag (see `hmi-editor kinds`).
        tag: String,
    },
    /// Remove a widget.
    Remove { id: String },
    /// Change properties of a widget.
    Set {
        id: String,
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f64>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        scale: Option<f64>,
        /// true to show, false to hide.
        #[arg(long)]
        visible: Option<bool>,
    },
    /// Lay every widget out on a five-column grid.
    Arrange,
    /// Remove every widget and erase the saved layout.
    Clear,
}
