//! CLI definition using clap derive.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "opsdeck", about = "operator console for the monitoring backend")]
pub struct Cli {
    /// Backend base URL
    #[arg(
        long,
        env = "OPSDECK_BASE_URL",
        global = true,
        default_value = "http://localhost:8080"
    )]
    pub base_url: String,

    /// State directory for persisted settings (default: XDG state dir)
    #[arg(long, env = "OPSDECK_STATE_DIR", global = true)]
    pub state_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Watch open alerts for a resource, refreshed periodically
    Watch(WatchOpts),
    /// One-shot list of open alerts for a resource
    Alerts(AlertsOpts),
    /// Acknowledge an alert
    Ack(AnnotateOpts),
    /// Resolve an alert
    Resolve(AnnotateOpts),
    /// Show or switch the current persona
    Persona(PersonaOpts),
}

#[derive(clap::Args)]
pub struct WatchOpts {
    /// Resource id to watch
    pub resource: String,

    /// Alert kinds to subscribe, comma-separated
    #[arg(long, value_delimiter = ',', default_value = "jvm,web,url")]
    pub kinds: Vec<String>,

    /// Refresh interval in seconds
    #[arg(long, default_value = "30")]
    pub interval: u64,

    /// Reporting window preset (30m, 1h, 4h, 8h, 12h, 24h, 7d)
    #[arg(long)]
    pub window: Option<String>,
}

#[derive(clap::Args)]
pub struct AlertsOpts {
    /// Resource id to query
    pub resource: String,

    /// Reporting window preset (30m, 1h, 4h, 8h, 12h, 24h, 7d)
    #[arg(long)]
    pub window: Option<String>,
}

#[derive(clap::Args)]
pub struct AnnotateOpts {
    /// Alert id to annotate
    pub alert_id: String,

    /// User recorded on the annotation
    #[arg(long)]
    pub by: String,

    /// Free-form notes
    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(clap::Args)]
pub struct PersonaOpts {
    /// Switch to the persona with this id
    #[arg(long)]
    pub switch: Option<String>,
}
