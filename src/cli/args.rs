//! CLI argument definitions.

use clap::Parser;

/// Local GitHub-style git repository viewer
#[derive(Parser, Debug)]
#[command(name = "gitview", version, about, after_long_help = r#"EXAMPLES:
  gitview                         Serve the repository containing the cwd
  gitview --path /my/repo         Serve a specific repository
  gitview --port 8080             Use a fixed port instead of auto-select
  gitview --host 0.0.0.0          Bind all interfaces (LAN access)
  gitview --context 5             Five lines of diff context by default
  gitview --log-level debug       Verbose stderr logging

HOW IT WORKS:
  1. Walks upward from --path to find the repository root (.git marker)
  2. Collects a full snapshot: commits, branches, tags, diffs, stats
  3. Serves a JSON API on the chosen port; GET / lists the endpoints
  4. /api/refresh rebuilds the snapshot on demand; ref/path-parameterized
     queries always run fresh read-only git commands
  5. Logging goes to stderr, never into HTTP responses
"#)]
pub struct Args {
    /// Path to the git repository (default: current directory)
    #[arg(long)]
    pub path: Option<String>,

    /// Port to serve on (default: first free port from 7433)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Lines of context in diffs when a request does not override it
    #[arg(long, default_value = "3")]
    pub context: u32,

    /// Log level for stderr output (error, warn, info, debug)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
