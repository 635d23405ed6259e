//! CLI argument definitions using clap
//!
//! Commands:
//! - cephx-key apply --name <key> --state <state> [--cap scope=perms]...
//! - cephx-key request            (JSON request on stdin)

use clap::{Args, Parser, Subcommand};

use crate::reconcile::DesiredState;

/// cephx-key - idempotent CephX key reconciliation
#[derive(Parser, Debug)]
#[command(name = "cephx-key")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile a key from command-line flags
    Apply(ApplyArgs),

    /// Reconcile a key from a single JSON request read on stdin
    Request {
        /// Validate and report only; execute nothing
        #[arg(long)]
        check: bool,
    },
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Target cluster name
    #[arg(long, default_value = "ceph")]
    pub cluster: String,

    /// Key name, e.g. client.foo (required for every state but 'list')
    #[arg(long)]
    pub name: Option<String>,

    /// Desired state: present, absent, update, info or list
    #[arg(long)]
    pub state: DesiredState,

    /// Capability as scope=expression, e.g. mon='allow r'; repeatable
    #[arg(long = "cap", value_name = "SCOPE=PERMS")]
    pub caps: Vec<String>,

    /// Base64 secret for the key; omitted or empty means generate one
    #[arg(long)]
    pub secret: Option<String>,

    /// Containerization prefix, e.g. 'docker exec ceph-mon'
    #[arg(long)]
    pub containerized: Option<String>,

    /// Validate and report only; execute nothing
    #[arg(long)]
    pub check: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
