//! Clap derive structures for the `wgdash` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.
//! Only depends on clap so `build.rs` can render man pages from it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wgdash -- terminal dashboard for wgrest-managed WireGuard servers
#[derive(Debug, Parser)]
#[command(
    name = "wgdash",
    version,
    about = "Manage WireGuard devices and peers through a wgrest server",
    long_about = "A command-line dashboard for wgrest, the REST API for WireGuard.\n\n\
        Lists and edits devices (interfaces) and their peers. When the server\n\
        rejects the access token you are asked for a new one, which is saved\n\
        and used to retry the request.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "WGDASH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// wgrest base URL (overrides profile)
    #[arg(long, short = 'u', env = "WGDASH_URL", global = true)]
    pub url: Option<String>,

    /// Access token (overrides the stored token)
    #[arg(long, env = "WGDASH_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WGDASH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "WGDASH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "WGDASH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Print every failed request as an error notice
    #[arg(long, global = true)]
    pub notify_errors: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage WireGuard devices (interfaces)
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage the peers of a device
    #[command(alias = "p")]
    Peers(PeersArgs),

    /// Open a dashboard view by path (e.g. /devices/wg0)
    Open {
        /// View path
        #[arg(default_value = "/")]
        path: String,
    },

    /// Show wgrest and WireGuard versions
    Version,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List {
        /// Follow pagination and fetch every device
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Show one device
    Get {
        /// Device (interface) name
        name: String,
    },

    /// Create a device
    Create {
        /// Device (interface) name, e.g. wg0
        name: String,

        #[command(flatten)]
        spec: DeviceSpec,
    },

    /// Update a device; only the given fields change
    Update {
        /// Device (interface) name
        name: String,

        #[command(flatten)]
        spec: DeviceSpec,
    },

    /// Delete a device
    #[command(alias = "rm")]
    Delete {
        /// Device (interface) name
        name: String,
    },

    /// Bring the interface up
    Up {
        /// Device (interface) name
        name: String,
    },

    /// Bring the interface down
    Down {
        /// Device (interface) name
        name: String,
    },
}

/// Device fields settable on create and update.
#[derive(Debug, Args)]
pub struct DeviceSpec {
    /// UDP listen port
    #[arg(long)]
    pub listen_port: Option<u16>,

    /// Interface private key (generated by the server when omitted)
    #[arg(long)]
    pub private_key: Option<String>,

    /// Firewall mark
    #[arg(long)]
    pub firewall_mark: Option<u32>,

    /// Interface address in CIDR form (repeatable)
    #[arg(long = "address", value_name = "CIDR")]
    pub addresses: Vec<String>,

    /// DNS server (repeatable)
    #[arg(long)]
    pub dns: Vec<String>,

    /// Interface MTU
    #[arg(long)]
    pub mtu: Option<u32>,

    /// Routing table
    #[arg(long)]
    pub table: Option<String>,

    /// Read the request body from a JSON file; flags override its fields
    #[arg(long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PEERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PeersArgs {
    #[command(subcommand)]
    pub command: PeersCommand,
}

#[derive(Debug, Subcommand)]
pub enum PeersCommand {
    /// List the peers of a device
    #[command(alias = "ls")]
    List {
        /// Device (interface) name
        device: String,

        /// Search by allowed IP
        #[arg(long, short = 'q')]
        query: Option<String>,

        /// Sort field: pub_key, receive_bytes, transmit_bytes, total_bytes,
        /// last_handshake_time; prefix with '-' for descending
        #[arg(long, short = 's', allow_hyphen_values = true)]
        sort: Option<String>,

        /// Zero-based page number
        #[arg(long, default_value = "0")]
        page: u32,

        /// Results per page
        #[arg(long, default_value = "100")]
        per_page: u32,

        /// Follow pagination and fetch every peer
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Show one peer
    Get {
        /// Device (interface) name
        device: String,

        /// Peer public key (standard or URL-safe base64)
        key: String,
    },

    /// Add a peer to a device
    Create {
        /// Device (interface) name
        device: String,

        #[command(flatten)]
        spec: PeerSpec,
    },

    /// Update a peer; only the given fields change
    Update {
        /// Device (interface) name
        device: String,

        /// Peer public key (standard or URL-safe base64)
        key: String,

        #[command(flatten)]
        spec: PeerSpec,
    },

    /// Remove a peer from a device
    #[command(alias = "rm")]
    Delete {
        /// Device (interface) name
        device: String,

        /// Peer public key (standard or URL-safe base64)
        key: String,
    },
}

/// Peer fields settable on create and update.
#[derive(Debug, Args)]
pub struct PeerSpec {
    /// Peer public key (generated by the server when omitted on create)
    #[arg(long)]
    pub public_key: Option<String>,

    /// Peer private key, kept by the server for config export
    #[arg(long)]
    pub private_key: Option<String>,

    /// Preshared key
    #[arg(long)]
    pub preshared_key: Option<String>,

    /// Allowed IP in CIDR form (repeatable)
    #[arg(long = "allowed-ip", value_name = "CIDR")]
    pub allowed_ips: Vec<String>,

    /// Endpoint as host:port
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Persistent keepalive interval, e.g. 25s
    #[arg(long)]
    pub keepalive: Option<String>,

    /// Read the request body from a JSON file; flags override its fields
    #[arg(long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a profile with guided setup
    Init,

    /// Display the current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Store an access token for the active profile
    SetToken {
        /// Token value; prompted for when omitted
        token: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
