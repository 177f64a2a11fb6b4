//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Skill tree state engine: unlock propagation, node counting and cross-tree search
#[derive(Parser, Debug)]
#[command(name = "skilltree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory with tree definitions (default: config, then cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub trees_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List trees with node and selection counts
    List,

    /// Show a tree with the state of every skill
    Tree {
        /// Tree id
        tree: String,
    },

    /// Show node counts per tree and in total
    Count,

    /// Show trees containing a skill that matches the term
    Search {
        /// Search term (case-insensitive substring; empty shows all)
        #[arg(default_value = "")]
        term: String,
    },

    /// Spend one point on a skill
    AddPoint {
        /// Tree id
        tree: String,
        /// Skill id
        skill: String,
    },

    /// Take one point back from a skill
    RemovePoint {
        /// Tree id
        tree: String,
        /// Skill id
        skill: String,
    },

    /// Fill a skill up to its maximum points
    Select {
        /// Tree id
        tree: String,
        /// Skill id
        skill: String,
    },

    /// Drop all points of a skill
    Deselect {
        /// Tree id
        tree: String,
        /// Skill id
        skill: String,
    },

    /// Clear all points of one tree, or of all trees
    Reset {
        /// Tree id (all trees if omitted)
        tree: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a config template
    Template,
    /// Show config file locations
    Path,
}
