use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use deferral_infrastructure::Snapshot;
use deferral_shared::{telemetry, AppConfig};

mod commands;

use commands::{Command, Host};

#[derive(Parser, Debug)]
#[command(
    name = "deferral-cli",
    version,
    about = "Deferred revenue periods for membership orders"
)]
struct Args {
    /// JSON snapshot with products, orders and membership state
    #[arg(long, default_value = "snapshot.json")]
    snapshot: PathBuf,

    /// Directory holding `default` and `{APP_ENV}` config files
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load_from(&args.config_dir)
        .with_context(|| format!("failed to load configuration from {}", args.config_dir.display()))?;
    let _guard = telemetry::init_telemetry(&config.logging)?;

    info!(
        env = %config.app.env,
        snapshot = %args.snapshot.display(),
        enabled = config.deferral.enabled,
        "deferral-cli starting"
    );

    let snapshot = Snapshot::load(&args.snapshot)
        .with_context(|| format!("failed to load snapshot {}", args.snapshot.display()))?;
    let host = Host::new(snapshot.into_stores(), &config.deferral);

    let mut stdout = io::stdout().lock();
    let mutated = match host.run(args.command, &mut stdout) {
        Ok(mutated) => mutated,
        Err(e) => {
            error!("Command failed: {:#}", e);
            return Err(e);
        }
    };

    if mutated {
        host.snapshot()
            .save(&args.snapshot)
            .with_context(|| format!("failed to write snapshot {}", args.snapshot.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_only_command_given() {
        let args = Args::try_parse_from(["deferral-cli", "order-created", "999"]).unwrap();
        assert_eq!(args.snapshot, PathBuf::from("snapshot.json"));
        assert_eq!(args.config_dir, PathBuf::from("config"));
        assert!(matches!(args.command, Command::OrderCreated { order: 999 }));
    }

    #[test]
    fn test_status_changed_takes_target_status() {
        let args = Args::try_parse_from([
            "deferral-cli",
            "--snapshot",
            "/tmp/s.json",
            "status-changed",
            "999",
            "--to",
            "wc-processing",
        ])
        .unwrap();

        match args.command {
            Command::StatusChanged { order, to, from } => {
                assert_eq!(order, 999);
                assert_eq!(to, "wc-processing");
                assert!(from.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_membership_created_allows_missing_ids() {
        let args = Args::try_parse_from(["deferral-cli", "membership-created", "--order", "999", "--renewal"]).unwrap();
        match args.command {
            Command::MembershipCreated { post, order, product, renewal, upgrade, .. } => {
                assert_eq!((post, order, product), (None, Some(999), None));
                assert!(renewal);
                assert!(!upgrade);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Args::try_parse_from(["deferral-cli"]).is_err());
    }
}
