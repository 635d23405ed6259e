//! CephX capability expansion
//!
//! A capability set maps a scope name (`mon`, `osd`, `mds`, ...) to a
//! permission expression (`allow r`, `allow rw pool=foo`, ...). The set is
//! kept in a `BTreeMap` so iteration order is deterministic within a
//! process; the authority itself attaches no meaning to the ordering.

use std::collections::BTreeMap;

/// Scope name to permission expression, unique keys, order irrelevant
pub type CapabilitySet = BTreeMap<String, String>;

/// Which external tool the expanded tokens are destined for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapTarget {
    /// `ceph-authtool`: each pair is preceded by a `--cap` flag
    Keyring,
    /// `ceph auth ...`: bare scope/permission pairs
    Authority,
}

/// Append capability tokens for `target` onto an argument vector
pub fn expand_caps(mut args: Vec<String>, target: CapTarget, caps: &CapabilitySet) -> Vec<String> {
    for (scope, perms) in caps {
        if target == CapTarget::Keyring {
            args.push("--cap".to_string());
        }
        args.push(scope.clone());
        args.push(perms.clone());
    }

    args
}
