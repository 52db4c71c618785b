use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use hueloop_core::{proto::BulbAddress, Animator, CycleConfig, Session};
use hueloop_gatttool::{ChildGattTool, GattConfig};

/// Time2 smart bulb hue cycler
///
/// Cycles a Time2 Bluetooth Low Energy light bulb through a rainbow of hues by using the
/// BlueZ gatttool utility. Press Ctrl-C to bring the bulb back to the white mode and quit.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = false)]
struct Cli {
    /// Bulb address, e.g. 5C:31:3E:F2:16:13
    #[arg(value_name = "ADDRESS", required_unless_present = "completions")]
    address: Option<BulbAddress>,
    /// Minimum hue of the cycle
    #[arg(long, default_value_t = 0.0)]
    hue_min: f64,
    /// Maximum hue of the cycle
    #[arg(long, default_value_t = 1.0)]
    hue_max: f64,
    /// Color saturation, 1 is the full color
    #[arg(long, default_value_t = 1.0)]
    saturation: f64,
    /// Color value, 1 is the full brightness
    #[arg(long, default_value_t = 1.0)]
    value: f64,
    /// Time of the full hue cycle
    #[arg(long, default_value_t = 5.0, value_name = "SECONDS")]
    cycle_secs: f64,
    /// Pause between the color updates
    #[arg(long, default_value_t = 50, value_name = "MILLISECONDS")]
    tick_ms: u64,
    /// Local Bluetooth adapter, e.g. hci0
    #[arg(short, long)]
    adapter: Option<String>,
    /// Path to the gatttool executable
    #[arg(long, default_value = "gatttool", value_name = "FILE")]
    gatttool: PathBuf,
    /// How long to wait for the bulb connection
    #[arg(long, default_value_t = 10, value_name = "SECONDS")]
    connect_timeout_secs: u64,
    /// Number of the bulb connection attempts
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    connect_attempts: u32,
    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL", exclusive = true)]
    completions: Option<clap_complete_command::Shell>,
}

impl Cli {
    fn cycle_config(&self) -> anyhow::Result<CycleConfig> {
        let cycle = Duration::try_from_secs_f64(self.cycle_secs).context("Invalid cycle time")?;
        let config = CycleConfig::new(
            self.hue_min,
            self.hue_max,
            self.saturation,
            self.value,
            cycle,
            Duration::from_millis(self.tick_ms),
        )?;
        Ok(config)
    }

    fn gatt_config(&self) -> GattConfig {
        GattConfig {
            program: self.gatttool.clone(),
            adapter: self.adapter.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..GattConfig::default()
        }
    }
}

/// Completes once the user asks to terminate the process.
async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Unable to listen for the interrupt signal: {err}");
        std::future::pending::<()>().await;
    }
    log::info!("Interrupted");
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Some(shell) = &cli.completions {
        shell.generate(&mut Cli::command(), &mut std::io::stdout());
        return Ok(());
    }

    let address = cli.address.context("Bulb address is not specified")?;
    let config = cli.cycle_config()?;

    let tool = ChildGattTool::spawn(cli.gatt_config())
        .with_context(|| format!("Unable to start {}", cli.gatttool.display()))?;
    let mut session = Session::open(tool, address, cli.connect_attempts)
        .await
        .with_context(|| format!("Unable to connect to the bulb {address}"))?;

    log::info!("Press Ctrl-C to quit.");
    let mut animator = Animator::new(config, rand::thread_rng());
    let animation = animator.run(&mut session, interrupted()).await;
    let closed = session.close().await;

    let summary = animation.context("Bulb animation failed")?;
    closed.context("Unable to close the bulb session")?;
    log::info!("Sent {} frames to the {address}", summary.frames_sent);

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::{error::ErrorKind, CommandFactory, Parser};

    use super::Cli;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_single_address() {
        let cli = Cli::try_parse_from(["hueloop", "5C:31:3E:F2:16:13"]).unwrap();
        assert_eq!(cli.address.unwrap().to_string(), "5C:31:3E:F2:16:13");

        let config = cli.cycle_config().unwrap();
        assert_eq!(config, hueloop_core::CycleConfig::default());
    }

    #[test]
    fn test_wrong_arguments_count() {
        let err = Cli::try_parse_from(["hueloop"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_ne!(err.exit_code(), 0);

        let err =
            Cli::try_parse_from(["hueloop", "5C:31:3E:F2:16:13", "5C:31:3E:F2:16:14"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_malformed_address() {
        let err = Cli::try_parse_from(["hueloop", "5C:31:3E"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_invalid_cycle() {
        let cli = Cli::try_parse_from([
            "hueloop",
            "5C:31:3E:F2:16:13",
            "--hue-min",
            "0.8",
            "--hue-max",
            "0.2",
        ])
        .unwrap();
        assert!(cli.cycle_config().is_err());

        let cli = Cli::try_parse_from(["hueloop", "5C:31:3E:F2:16:13", "--cycle-secs=-1"]).unwrap();
        assert!(cli.cycle_config().is_err());
    }

    #[test]
    fn test_gatt_options() {
        let cli = Cli::try_parse_from([
            "hueloop",
            "-a",
            "hci1",
            "--connect-timeout-secs",
            "3",
            "5C:31:3E:F2:16:13",
        ])
        .unwrap();

        let config = cli.gatt_config();
        assert_eq!(config.adapter.as_deref(), Some("hci1"));
        assert_eq!(config.connect_timeout.as_secs(), 3);
        assert_eq!(config.program.to_str(), Some("gatttool"));
    }
}
