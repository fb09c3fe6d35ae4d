//! Running commands on the hosts taking part in a run.

use std::process::Command;

use anyhow::{bail, Context, Result};

/// Executes a command on a host.
///
/// The recorder only builds commands; whatever knows how to reach the hosts
/// runs them. Closures `Fn(&str, &[String]) -> anyhow::Result<()>` are
/// runners too.
pub trait CommandRunner {
    /// Run `argv` on `host`, failing if it could not be run or exited non-zero.
    fn run(&self, host: &str, argv: &[String]) -> Result<()>;
}

impl<F> CommandRunner for F
where
    F: Fn(&str, &[String]) -> Result<()>,
{
    fn run(&self, host: &str, argv: &[String]) -> Result<()> {
        self(host, argv)
    }
}

/// Runs commands over ssh.
///
/// Arguments are shell-quoted for the remote shell, except those made only
/// of path and glob characters, so archive globs still expand remotely.
#[derive(Debug, Clone)]
pub struct SshRunner {
    program: String,
    options: Vec<String>,
}

impl SshRunner {
    /// Runner using `ssh` in batch mode.
    pub fn new() -> Self {
        Self {
            program: "ssh".to_string(),
            options: vec!["-o".to_string(), "BatchMode=yes".to_string()],
        }
    }

    /// Runner using a different ssh binary and options.
    pub fn with_program(program: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            program: program.into(),
            options,
        }
    }

    /// The command line handed to the remote shell.
    pub fn remote_command(argv: &[String]) -> String {
        argv.iter()
            .map(|arg| shell_quote(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self, host: &str, argv: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        // Options end before the host, so a host can never be read as one
        command
            .args(&self.options)
            .arg("--")
            .arg(host)
            .arg(Self::remote_command(argv));
        command
    }
}

impl Default for SshRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SshRunner {
    fn run(&self, host: &str, argv: &[String]) -> Result<()> {
        let status = self
            .command(host, argv)
            .status()
            .with_context(|| format!("Failed to start {} for {}", self.program, host))?;

        if !status.success() {
            bail!("{} on {} exited with {}", argv.join(" "), host, status);
        }
        Ok(())
    }
}

fn shell_quote(arg: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "_-./*:@+=,".contains(c);
    if !arg.is_empty() && arg.chars().all(safe) {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
