use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "roster",
    about = "Roster: a counter and an ordered word list behind an opaque-handle boundary",
    version
)]
pub struct Cli {
    /// Path to roster.toml (defaults to ./roster.toml when present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Identity scheme for new registries: value or synthetic
    #[arg(long, global = true)]
    pub identity: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the demo screen from stdin or a script file
    Demo {
        /// Script with one command per line: inc, reset, add, pop, remove, dup, show,
        /// entries, quit
        #[arg(long)]
        script: Option<String>,

        /// Starting counter value (overrides config)
        #[arg(long)]
        initial: Option<i32>,
    },

    /// Dispatch JSON requests, one per line, printing one response per line
    Dispatch {
        /// File of JSON requests (defaults to stdin)
        #[arg(long)]
        file: Option<String>,
    },

    /// Add words to a fresh registry and print the rendered sentence
    Render {
        /// Words to add, in order
        words: Vec<String>,
    },

    /// List the transport action table
    Actions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drive every transport action through a scratch session and verify the results
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
