pub mod commands;

use crate::config::Settings;
use crate::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quorumgate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Admission webhook that retires etcd members before their pods are deleted", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        env = "QUORUMGATE_CONFIG",
        help = "YAML configuration file"
    )]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: SettingsArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Serve the admission webhook over HTTPS")]
    Serve,
    #[command(about = "Gracefully remove one pod's store member and delete the pod")]
    Remove {
        #[arg(short, long, help = "Name of the store pod")]
        pod: String,
    },
}

/// Flags that override values from the configuration file.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    #[arg(long, global = true, env = "QUORUMGATE_ADDR", help = "HTTPS listen address")]
    pub addr: Option<String>,

    #[arg(long, global = true, env = "QUORUMGATE_CRT", help = "Certificate file path")]
    pub crt: Option<String>,

    #[arg(long, global = true, env = "QUORUMGATE_KEY", help = "Certificate key path")]
    pub key: Option<String>,

    #[arg(long, global = true, env = "QUORUMGATE_LABEL", help = "Label grouping store replicas")]
    pub label: Option<String>,

    #[arg(long, global = true, env = "QUORUMGATE_ETCD_IMAGE", help = "Store image prefix")]
    pub etcd_image: Option<String>,

    #[arg(long, global = true, env = "QUORUMGATE_PORT_NAME", help = "Store client port name")]
    pub port_name: Option<String>,

    #[arg(
        long,
        global = true,
        env = "QUORUMGATE_TIMEOUT",
        value_parser = parse_timeout,
        help = "Per-call timeout as a duration, e.g. 30s or 1m"
    )]
    pub timeout: Option<u64>,

    #[arg(long, global = true, env = "QUORUMGATE_NAMESPACE", help = "Namespace of the store pods")]
    pub namespace: Option<String>,

    #[arg(long, global = true, help = "Grace period for pod deletion in seconds")]
    pub grace_period: Option<i64>,

    #[arg(long, global = true, help = "Requests from this group are never intercepted")]
    pub reserved_group: Option<String>,
}

/// Parses `30s`, `2m` and the like into whole seconds.
fn parse_timeout(value: &str) -> std::result::Result<u64, String> {
    let duration = humantime::parse_duration(value).map_err(|e| e.to_string())?;
    if duration.subsec_nanos() != 0 {
        return Err(format!("{} is not a whole number of seconds", value));
    }
    Ok(duration.as_secs())
}

impl SettingsArgs {
    pub fn apply(&self, settings: &mut Settings) {
        let strings = [
            (&self.addr, &mut settings.listen_addr),
            (&self.crt, &mut settings.tls_cert),
            (&self.key, &mut settings.tls_key),
            (&self.label, &mut settings.label_key),
            (&self.etcd_image, &mut settings.store_image_prefix),
            (&self.port_name, &mut settings.client_port_name),
            (&self.namespace, &mut settings.namespace),
            (&self.reserved_group, &mut settings.reserved_group),
        ];
        for (flag, field) in strings {
            if let Some(value) = flag {
                *field = value.clone();
            }
        }

        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout;
        }
        if let Some(grace) = self.grace_period {
            settings.grace_period_seconds = grace;
        }
    }
}

impl Cli {
    /// Defaults, then the config file, then flags.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        self.overrides.apply(&mut settings);
        settings.validate()?;
        Ok(settings)
    }
}
