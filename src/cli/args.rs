//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--no-interactive`: Never prompt
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Print command reports as JSON

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

/// fizz - Keep Fission function declarations consistent
#[derive(Parser, Debug)]
#[command(name = "fizz")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if fizz was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print command results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Interactive unless `--no-interactive`, `--quiet` or `--json` was set,
    /// and only when stdin is a terminal.
    pub fn interactive(&self) -> bool {
        if self.no_interactive || self.quiet || self.json {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List units in the specs directory
    #[command(
        name = "list",
        visible_alias = "ls",
        long_about = "List units in the specs directory.\n\n\
            A unit is listed for every function-<name>.yaml declaration. Names are \
            printed one per line in sorted order."
    )]
    List,

    /// Rename a unit and everything that refers to it
    #[command(
        name = "rename",
        long_about = "Rename a unit and everything that refers to it.\n\n\
            Moves the unit folder, rewrites both packaging scripts and runs the one \
            for this platform, then regenerates the package declaration with the \
            packaging tool and rewrites the function and route declarations under \
            the new name.\n\n\
            There is no rollback. If a step fails, fizz reports which steps were \
            applied so the project can be fixed by hand.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Rename a unit; its route follows the new name (/bar)
    fizz rename foo bar

    # Rename but keep the current route path
    fizz rename foo bar --keep-route

    # Rename and point the route somewhere specific
    fizz rename foo bar --route /api/bar

    # Only touch declarations (folder and scripts already handled)
    fizz rename foo bar --no-folder --no-scripts"
    )]
    Rename {
        /// Current unit name
        old: String,

        /// New unit name
        new: String,

        /// Point the route at this path instead of /<new>
        #[arg(long, value_name = "PATH", conflicts_with = "keep_route")]
        route: Option<String>,

        /// Keep the route's current path
        #[arg(long)]
        keep_route: bool,

        /// Do not move the unit folder
        #[arg(long)]
        no_folder: bool,

        /// Do not patch or run the packaging scripts
        #[arg(long)]
        no_scripts: bool,

        /// Patch the packaging scripts but do not run them
        #[arg(long, conflicts_with = "no_scripts")]
        no_run: bool,
    },

    /// Delete a unit's declarations and folder
    #[command(
        name = "delete",
        long_about = "Delete a unit's declarations and folder.\n\n\
            Removes function-<name>.yaml, route-<name>.yaml and package-<name>.yaml \
            from the specs directory, then removes the unit folder. Anything already \
            gone is skipped, so deleting twice is safe.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Delete with a confirmation prompt
    fizz delete foo

    # Delete without asking (scripts, CI)
    fizz delete foo --force"
    )]
    Delete {
        /// Unit to delete
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change or remove a unit's route
    #[command(name = "route")]
    Route {
        #[command(subcommand)]
        action: RouteAction,
    },

    /// Patch the packaging scripts for a renamed unit
    #[command(
        name = "scripts",
        long_about = "Patch the packaging scripts for a renamed unit.\n\n\
            Rewrites `pushd <old>` and `<old>.zip` to the new name in both packaging \
            scripts, then runs the script for this platform. Declarations are not \
            touched."
    )]
    Scripts {
        /// Current unit name
        old: String,

        /// New unit name
        new: String,

        /// Patch but do not run the script
        #[arg(long)]
        no_run: bool,
    },

    /// List or set configuration values
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for fizz commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    fizz completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    fizz completion zsh >> ~/.zshrc

    # Fish
    fizz completion fish > ~/.config/fish/completions/fizz.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Route subcommands.
#[derive(Subcommand, Debug)]
pub enum RouteAction {
    /// Point a unit's route at a new path
    Rename {
        /// Unit whose route changes
        name: String,
        /// New path; a leading `/` is added if missing
        path: String,
    },
    /// Delete a unit's route declaration
    Delete {
        /// Unit whose route is deleted
        name: String,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Set a project configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List effective configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_rename_flags() {
        let cli = Cli::try_parse_from(["fizz", "rename", "foo", "bar", "--keep-route", "--no-run"])
            .unwrap();
        match cli.command {
            Command::Rename {
                old,
                new,
                keep_route,
                no_run,
                route,
                ..
            } => {
                assert_eq!(old, "foo");
                assert_eq!(new, "bar");
                assert!(keep_route);
                assert!(no_run);
                assert!(route.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn route_and_keep_route_conflict() {
        let result = Cli::try_parse_from([
            "fizz", "rename", "a", "b", "--route", "/x", "--keep-route",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn json_disables_interactive() {
        let cli = Cli::try_parse_from(["fizz", "--json", "list"]).unwrap();
        assert!(!cli.interactive());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["fizz", "route", "delete", "foo", "-q"]).unwrap();
        assert!(cli.quiet);
    }
}
