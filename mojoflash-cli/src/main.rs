//! mojoflash CLI - Command-line bitstream loader for the Mojo FPGA board.
//!
//! ## Features
//!
//! - Upload a compiled bitstream over the board's serial loader protocol
//! - Serial port discovery with Mojo board auto-detection
//! - Shell completion generation
//! - Environment variable support

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use console::style;
use env_logger::Env;
use log::debug;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

/// Whether stderr is a terminal (set once at startup).
static STDERR_IS_TTY: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Check if emoji/animations should be used (TTY and colors enabled).
fn use_fancy_output() -> bool {
    STDERR_IS_TTY.load(std::sync::atomic::Ordering::Relaxed) && console::colors_enabled_stderr()
}

mod commands;

use commands::{cmd_completions, cmd_list_ports, cmd_upload};

/// mojoflash - upload bitstreams to the Mojo FPGA board.
///
/// Environment variables:
///   MOJOFLASH_DEVICE   - Default serial device (e.g. /dev/ttyACM0)
#[derive(Parser)]
#[command(name = "mojoflash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = "For more information, visit: https://github.com/embmicro/mojoflash")]
struct Cli {
    /// Serial device to use (auto-detected if not specified).
    #[arg(short, long, global = true, env = "MOJOFLASH_DEVICE")]
    device: Option<String>,

    /// Verbose output level (-v, -vv for increasing detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-essential output).
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Upload a bitstream to the board.
    Upload {
        /// Path to the compiled bitstream file.
        bitstream: PathBuf,

        /// Verify the uploaded bitstream (accepted; the loader protocol
        /// has no verify step yet).
        #[arg(long)]
        verify: bool,

        /// Store the bitstream in flash (accepted; the loader protocol
        /// has no flash step yet).
        #[arg(long)]
        flash: bool,
    },

    /// List available serial ports.
    ListPorts {
        /// Output port list as JSON to stdout.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type for completions.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version remain successful; any usage error exits 1,
            // matching the single non-zero status of the loader contract.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        },
    };

    // --- NO_COLOR and TTY detection ---
    let stderr_is_tty = console::Term::stderr().is_term();
    STDERR_IS_TTY.store(stderr_is_tty, std::sync::atomic::Ordering::Relaxed);

    if env::var("NO_COLOR").is_ok() || !stderr_is_tty {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    // Setup logging based on verbosity
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(if cli.verbose >= 2 {
            Some(env_logger::TimestampPrecision::Millis)
        } else {
            None
        })
        .init();

    debug!(
        "mojoflash v{} (verbose level: {})",
        env!("CARGO_PKG_VERSION"),
        cli.verbose
    );

    if let Err(err) = run(&cli) {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Upload {
            bitstream,
            verify,
            flash,
        } => cmd_upload(cli, bitstream, *verify, *flash),
        Commands::ListPorts { json } => {
            cmd_list_ports(*json);
            Ok(())
        },
        Commands::Completions { shell } => {
            cmd_completions(*shell);
            Ok(())
        },
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use clap::CommandFactory;

    // ---- clap validation ----

    #[test]
    fn test_cli_command_is_valid() {
        // Verifies that all derive macros produce a valid clap Command
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_upload() {
        let cli = Cli::try_parse_from([
            "mojoflash",
            "--device",
            "/dev/ttyACM0",
            "upload",
            "top.bin",
        ])
        .unwrap();
        assert_eq!(cli.device.as_deref(), Some("/dev/ttyACM0"));
        if let Commands::Upload {
            bitstream,
            verify,
            flash,
        } = cli.command
        {
            assert_eq!(bitstream.to_str().unwrap(), "top.bin");
            assert!(!verify);
            assert!(!flash);
        } else {
            panic!("Expected Upload command");
        }
    }

    #[test]
    fn test_cli_parse_upload_with_switches() {
        let cli = Cli::try_parse_from(["mojoflash", "upload", "top.bin", "--verify", "--flash"])
            .unwrap();
        if let Commands::Upload { verify, flash, .. } = cli.command {
            assert!(verify);
            assert!(flash);
        } else {
            panic!("Expected Upload command");
        }
    }

    #[test]
    fn test_cli_parse_upload_device_after_subcommand() {
        // -d is global, so it is accepted after the subcommand too
        let cli =
            Cli::try_parse_from(["mojoflash", "upload", "top.bin", "-d", "COM3"]).unwrap();
        assert_eq!(cli.device.as_deref(), Some("COM3"));
    }

    #[test]
    fn test_cli_parse_list_ports() {
        let cli = Cli::try_parse_from(["mojoflash", "list-ports"]).unwrap();
        assert!(matches!(cli.command, Commands::ListPorts { json: false }));
    }

    #[test]
    fn test_cli_parse_list_ports_json() {
        let cli = Cli::try_parse_from(["mojoflash", "list-ports", "--json"]).unwrap();
        if let Commands::ListPorts { json } = cli.command {
            assert!(json);
        } else {
            panic!("Expected ListPorts command");
        }
    }

    #[test]
    fn test_cli_parse_completions() {
        let cli = Cli::try_parse_from(["mojoflash", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions { .. }));
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["mojoflash", "list-ports"]).unwrap();
        assert!(cli.device.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_verbosity_levels() {
        let cli = Cli::try_parse_from(["mojoflash", "-vv", "list-ports"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_missing_subcommand() {
        let result = Cli::try_parse_from(["mojoflash"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_upload_requires_bitstream() {
        let result = Cli::try_parse_from(["mojoflash", "upload"]);
        assert!(result.is_err());
    }
}
