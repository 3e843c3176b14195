use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "pveadm")]
#[command(version)]
#[command(about = "Manage Proxmox VE datacenter access control over SSH", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Cluster node to connect to
    #[arg(long, global = true, env = "PVEADM_HOST")]
    pub host: Option<String>,

    /// SSH user on the cluster node
    #[arg(long, global = true, env = "PVEADM_USER")]
    pub user: Option<String>,

    /// Check mode - decide everything but never mutate
    #[arg(short = 'n', long = "check", global = true)]
    pub check: bool,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage datacenter permission ACLs
    #[command(subcommand)]
    Acl(AclCommand),

    /// Manage groups
    #[command(subcommand)]
    Group(GroupCommand),

    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Manage user-specific API tokens
    #[command(subcommand)]
    Token(TokenCommand),

    /// Manage directory storage
    #[command(subcommand)]
    Storage(StorageCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// ACL Commands
// ============================================================================

#[derive(Subcommand)]
pub enum AclCommand {
    /// Grant a role on a path to groups, tokens and/or users
    Apply(AclApplyArgs),

    /// Revoke a role on a path from groups, tokens and/or users
    Remove(AclRemoveArgs),

    /// List all ACL entries
    List,
}

#[derive(Args)]
pub struct AclApplyArgs {
    /// Access control path
    #[arg(long)]
    pub path: String,

    /// Permission role
    #[arg(long = "role")]
    pub roleid: String,

    /// Comma or space separated group names
    #[arg(long)]
    pub groups: Option<String>,

    /// Comma or space separated API tokens (user@realm!token)
    #[arg(long)]
    pub tokens: Option<String>,

    /// Comma or space separated users (user@realm)
    #[arg(long)]
    pub users: Option<String>,

    /// Do not propagate (inherit) the permission to child paths
    #[arg(long)]
    pub no_propagate: bool,
}

#[derive(Args)]
pub struct AclRemoveArgs {
    /// Access control path
    #[arg(long)]
    pub path: String,

    /// Permission role
    #[arg(long = "role")]
    pub roleid: String,

    /// Comma or space separated group names
    #[arg(long)]
    pub groups: Option<String>,

    /// Comma or space separated API tokens (user@realm!token)
    #[arg(long)]
    pub tokens: Option<String>,

    /// Comma or space separated users (user@realm)
    #[arg(long)]
    pub users: Option<String>,
}

// ============================================================================
// Group Commands
// ============================================================================

#[derive(Subcommand)]
pub enum GroupCommand {
    /// Create a group
    Create {
        /// Group name
        group: String,

        /// Description text
        #[arg(long)]
        comment: Option<String>,
    },

    /// Delete a group (even if users are assigned to it)
    Remove {
        /// Group name
        group: String,
    },

    /// List groups
    List,

    /// Show one group with its members
    Show {
        /// Group name
        group: String,
    },
}

// ============================================================================
// User Commands
// ============================================================================

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create a user
    Create(UserCreateArgs),

    /// Delete a user
    Remove {
        /// Full user ID in name@realm format
        userid: String,
    },

    /// List users
    List,
}

#[derive(Args)]
pub struct UserCreateArgs {
    /// Full user ID in name@realm format
    pub userid: String,

    /// Description text
    #[arg(long)]
    pub comment: Option<String>,

    /// Contact e-mail address
    #[arg(long)]
    pub email: Option<String>,

    /// Comma separated list of groups to join
    #[arg(long)]
    pub groups: Option<String>,

    /// First name
    #[arg(long)]
    pub firstname: Option<String>,

    /// Last name
    #[arg(long)]
    pub lastname: Option<String>,
}

// ============================================================================
// Token Commands
// ============================================================================

#[derive(Subcommand)]
pub enum TokenCommand {
    /// Create a user-specific API token (prints the one-time secret)
    Create(TokenCreateArgs),

    /// Delete a user-specific API token
    Remove {
        /// Full user ID in name@realm format
        userid: String,

        /// Token ID
        tokenid: String,
    },

    /// List one user's API tokens
    List {
        /// Full user ID in name@realm format
        userid: String,
    },
}

#[derive(Args)]
pub struct TokenCreateArgs {
    /// Full user ID in name@realm format
    pub userid: String,

    /// Token ID
    pub tokenid: String,

    /// Description text
    #[arg(long)]
    pub comment: Option<String>,

    /// Give the token the full privileges of its user instead of separate ACLs
    #[arg(long)]
    pub no_privsep: bool,

    /// Expiration as seconds since epoch (0 = never)
    #[arg(long, default_value = "0")]
    pub expire: i64,
}

// ============================================================================
// Storage Commands
// ============================================================================

#[derive(Subcommand)]
pub enum StorageCommand {
    /// Create a directory type storage (or converge content/shared drift)
    Create(StorageCreateArgs),

    /// Delete a directory type storage
    Remove {
        /// Storage ID
        storage: String,
    },

    /// List directory type storages
    List,
}

#[derive(Args)]
pub struct StorageCreateArgs {
    /// Storage ID
    pub storage: String,

    /// Filesystem path backing the storage
    #[arg(long)]
    pub path: String,

    /// Comma separated list of allowed content types
    #[arg(long, default_value = "images")]
    pub content: String,

    /// Mark the storage as shared
    #[arg(long)]
    pub shared: bool,
}
