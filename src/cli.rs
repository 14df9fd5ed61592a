use clap::{Parser, Subcommand};

/// Ideabox: idea submission portal
#[derive(Parser)]
#[command(name = "ideabox", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind (defaults to IDEABOX_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Triage submitted ideas
    Ideas {
        #[command(subcommand)]
        command: IdeaCommands,
    },
}

#[derive(Subcommand)]
pub enum IdeaCommands {
    /// List every idea in submission order
    List,
    /// Show ideas grouped by priority tier
    Board,
    /// Set the status (Pending, Approved, Rejected)
    Status { id: String, status: String },
    /// Set the priority ("Set Priority", High, Medium, Low)
    Priority { id: String, priority: String },
    /// Replace the administrator comment ("" clears it)
    Comment { id: String, comment: String },
    /// Delete an idea permanently
    Delete { id: String },
}
