//! SSH transport: every remote call shells out to
//! `ssh <user>@<host> -- pvesh ...` on a cluster node.
//!
//! Blocking and sequential throughout; timeouts are whatever ssh itself
//! enforces.

use anyhow::{Context, Result, bail};
use log::debug;
use std::process::Command;

/// Connection settings for the target cluster node.
#[derive(Debug, Clone)]
pub struct SshTarget {
    pub host: String,
    pub user: String,
}

impl SshTarget {
    pub fn new(host: &str, user: &str) -> Self {
        Self {
            host: host.to_string(),
            user: user.to_string(),
        }
    }

    fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Run `pvesh` on the target and capture its stdout, trimmed.
    pub fn pvesh(&self, args: &[String]) -> Result<String> {
        let argv = ssh_argv(&self.destination(), args);
        debug!("ssh {}", argv.join(" "));

        let output = Command::new("ssh")
            .args(&argv)
            .output()
            .with_context(|| format!("failed to execute: ssh {}", argv.join(" ")))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("pvesh failed on {}: {}", self.host, stderr.trim());
        }
    }
}

/// Argument vector handed to `ssh`. Batch mode makes a missing key or an
/// unreachable host fail immediately instead of prompting.
fn ssh_argv(destination: &str, pvesh_args: &[String]) -> Vec<String> {
    let mut argv: Vec<String> = vec![
        "-o".to_string(),
        "BatchMode=yes".to_string(),
        destination.to_string(),
        "--".to_string(),
        "pvesh".to_string(),
    ];
    argv.extend(pvesh_args.iter().cloned());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argv_places_pvesh_after_the_destination() {
        let args = vec!["get".to_string(), "/access/acl".to_string()];
        let argv = ssh_argv("root@pve1", &args);
        assert_eq!(
            argv,
            [
                "-o",
                "BatchMode=yes",
                "root@pve1",
                "--",
                "pvesh",
                "get",
                "/access/acl"
            ]
        );
    }

    #[test]
    fn destination_joins_user_and_host() {
        let target = SshTarget::new("192.168.1.21", "automation");
        assert_eq!(target.destination(), "automation@192.168.1.21");
    }
}
