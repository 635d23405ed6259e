//! Command composition for the Ceph credential toolchain
//!
//! Builds the ordered `ceph` / `ceph-authtool` invocations for each
//! lifecycle verb. Composition is pure: nothing here touches the process
//! table or the filesystem, so every sequence can be inspected in tests
//! exactly as it would run.

use serde::Serialize;

use crate::caps::{expand_caps, CapTarget, CapabilitySet};
use crate::secret::Secret;

/// Directory holding cluster configuration and transient keyring files
pub const CEPH_CONF_DIR: &str = "/etc/ceph";

/// One external invocation: an ordered argument vector
///
/// When a containerization prefix is configured its tokens are always the
/// leading elements, never interleaved with the tool's own arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandSpec(Vec<String>);

impl CommandSpec {
    /// Build a spec from a complete argument vector; must be non-empty
    pub fn from_argv(argv: Vec<String>) -> Self {
        Self(argv)
    }

    /// The executable token
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    /// Everything after the executable token
    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    /// The full argument vector
    pub fn argv(&self) -> &[String] {
        &self.0
    }

    /// Consume into the full argument vector
    pub fn into_argv(self) -> Vec<String> {
        self.0
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Builds command sequences for one cluster
///
/// Holds the cluster name and the optional containerization prefix; each
/// verb method returns the full ordered sequence to execute.
#[derive(Debug, Clone)]
pub struct Composer {
    cluster: String,
    container_prefix: Vec<String>,
}

impl Composer {
    /// Create a composer for `cluster`
    ///
    /// `containerized` is split on whitespace and prepended to every
    /// composed command, e.g. `"docker exec ceph-mon"`.
    pub fn new(cluster: impl Into<String>, containerized: Option<&str>) -> Self {
        let container_prefix = containerized
            .map(|prefix| prefix.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            cluster: cluster.into(),
            container_prefix,
        }
    }

    /// The cluster this composer targets
    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Deterministic keyring path for a key: `<dir>/<cluster>.<name>.keyring`
    pub fn keyring_path(&self, name: &str) -> String {
        format!("{}/{}.{}.keyring", CEPH_CONF_DIR, self.cluster, name)
    }

    /// Apply the containerization prefix as the outermost tokens
    fn wrap(&self, argv: Vec<String>) -> CommandSpec {
        let mut tokens = self.container_prefix.clone();
        tokens.extend(argv);
        CommandSpec(tokens)
    }

    /// `ceph --cluster <cluster> auth <args...>`
    fn ceph_auth(&self, args: Vec<String>) -> CommandSpec {
        let mut argv = vec![
            "ceph".to_string(),
            "--cluster".to_string(),
            self.cluster.clone(),
            "auth".to_string(),
        ];
        argv.extend(args);

        self.wrap(argv)
    }

    /// `ceph-authtool --create-keyring <path> --name <name> --add-key <secret> [--cap ...]`
    fn authtool_create(&self, name: &str, secret: &Secret, caps: &CapabilitySet) -> CommandSpec {
        let argv = vec![
            "ceph-authtool".to_string(),
            "--create-keyring".to_string(),
            self.keyring_path(name),
            "--name".to_string(),
            name.to_string(),
            "--add-key".to_string(),
            secret.as_str().to_string(),
        ];

        self.wrap(expand_caps(argv, CapTarget::Keyring, caps))
    }

    /// Sequence for creating a key: keyring file first, then import
    ///
    /// The ordering is mandatory; the import reads the file the first
    /// command wrote.
    pub fn create(&self, name: &str, secret: &Secret, caps: &CapabilitySet) -> Vec<CommandSpec> {
        let import = vec![
            "import".to_string(),
            "-i".to_string(),
            self.keyring_path(name),
        ];

        vec![self.authtool_create(name, secret, caps), self.ceph_auth(import)]
    }

    /// Sequence for replacing an existing key's capabilities
    pub fn update(&self, name: &str, caps: &CapabilitySet) -> Vec<CommandSpec> {
        let args = expand_caps(
            vec!["caps".to_string(), name.to_string()],
            CapTarget::Authority,
            caps,
        );

        vec![self.ceph_auth(args)]
    }

    /// Sequence for deleting a key by identity
    pub fn delete(&self, name: &str) -> Vec<CommandSpec> {
        vec![self.ceph_auth(vec!["del".to_string(), name.to_string()])]
    }

    /// Sequence for fetching structured detail about a key
    pub fn info(&self, name: &str) -> Vec<CommandSpec> {
        vec![self.ceph_auth(vec![
            "get".to_string(),
            name.to_string(),
            "-f".to_string(),
            "json".to_string(),
        ])]
    }

    /// Sequence for enumerating all keys in structured form
    pub fn list(&self) -> Vec<CommandSpec> {
        vec![self.ceph_auth(vec![
            "ls".to_string(),
            "-f".to_string(),
            "json".to_string(),
        ])]
    }
}
