use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Styled text for a terminal
    #[default]
    Term,
    /// Machine readable JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "clipcanvas",
    bin_name = "clipcanvas",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Paste clipboard content into folder-backed canvases", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Collection folder (default: the configured default collection)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub collection: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputMode::Term, help_heading = "Options")]
    pub output: OutputMode,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List canvases, oldest first
    #[command(alias = "ls", display_order = 1)]
    List,

    /// Show the current canvas, or the one at INDEX
    #[command(alias = "v", display_order = 2)]
    Show { index: Option<usize> },

    /// Move to the next (newer) canvas
    #[command(alias = "n", display_order = 3)]
    Next,

    /// Move to the previous (older) canvas
    #[command(alias = "b", display_order = 4)]
    Back,

    /// Jump to the empty new canvas at the end
    #[command(display_order = 5)]
    First,

    /// Jump to the oldest canvas
    #[command(display_order = 6)]
    Last,

    /// Paste into a new canvas
    #[command(alias = "p", display_order = 10)]
    Paste {
        /// Paste this text instead of the clipboard
        #[arg(long, conflicts_with_all = ["file", "stdin"])]
        text: Option<String>,

        /// Paste these files instead of the clipboard
        #[arg(long, conflicts_with = "stdin")]
        file: Vec<PathBuf>,

        /// Paste piped input instead of the clipboard
        #[arg(long)]
        stdin: bool,
    },

    /// Add a canvas that points at PATH instead of copying it
    #[command(display_order = 11)]
    Link { path: PathBuf },

    /// Delete the canvas at INDEX
    #[command(alias = "rm", display_order = 12)]
    Delete { index: usize },

    /// Re-read the collection folder
    #[command(display_order = 13)]
    Reload,

    /// Report how a file or folder would be shown
    #[command(display_order = 20)]
    Classify { path: PathBuf },

    /// Show the resolved configuration
    #[command(display_order = 30)]
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("clipcanvas").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_naked_invocation() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert_eq!(cli.output, OutputMode::Term);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = parse(&["list", "--output", "json", "-c", "/tmp/clips", "-vv"]);
        assert_eq!(cli.command, Some(Commands::List));
        assert_eq!(cli.output, OutputMode::Json);
        assert_eq!(cli.collection, Some(PathBuf::from("/tmp/clips")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_paste_sources() {
        let cli = parse(&["paste", "--file", "a.png", "--file", "b.png"]);
        assert_eq!(
            cli.command,
            Some(Commands::Paste {
                text: None,
                file: vec![PathBuf::from("a.png"), PathBuf::from("b.png")],
                stdin: false
            })
        );

        let err = Cli::try_parse_from(["clipcanvas", "paste", "--text", "x", "--stdin"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_aliases() {
        assert_eq!(parse(&["b"]).command, Some(Commands::Back));
        assert_eq!(
            parse(&["v", "3"]).command,
            Some(Commands::Show { index: Some(3) })
        );
    }
}
