use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DATABASE_ENV;

#[derive(Parser, Debug)]
#[command(name = "tuxemon-db")]
#[command(version, about = "Load Tuxemon monsters into SQLite, browse them and build teams")]
pub struct Cli {
    /// SQLite database path (or sqlite:// URL)
    #[arg(short, long, global = true, env = DATABASE_ENV)]
    pub database: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the schema
    Init {
        /// Drop every table first
        #[arg(long)]
        reset: bool,
    },

    /// Load a directory of monster JSON files in one transaction
    Load {
        /// Directory containing one JSON document per monster
        data_dir: PathBuf,
    },

    /// List monsters, optionally filtered
    List {
        /// Only monsters with any of these types (comma-separated)
        #[arg(short = 't', long = "type", value_delimiter = ',')]
        types: Option<Vec<String>>,

        /// Only monsters with any of these tags (comma-separated)
        #[arg(short = 'g', long = "tag", value_delimiter = ',')]
        tags: Option<Vec<String>>,

        /// Only monsters with any of these terrains (comma-separated)
        #[arg(short = 'r', long = "terrain", value_delimiter = ',')]
        terrains: Option<Vec<String>>,
    },

    /// Show one monster with moves, evolutions and history
    Show {
        slug: String,
    },

    /// Save, list and load teams
    Team {
        #[command(subcommand)]
        command: TeamCommands,
    },

    /// Interactive browser and team builder
    Browse,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// Save a team of up to six monsters
    Save {
        name: String,

        /// Monster slugs
        #[arg(required = true)]
        members: Vec<String>,
    },

    /// Show the members of a saved team
    Show {
        id: i64,
    },

    /// List saved teams, newest first
    List,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
