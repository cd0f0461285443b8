//! Upload command implementation.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use mojoflash::{DEFAULT_BAUD, Image, MojoFlasher, UploadOptions, percent_complete};
use std::path::Path;

use crate::{Cli, use_fancy_output};

/// Upload command implementation.
pub(crate) fn cmd_upload(cli: &Cli, bitstream: &Path, verify: bool, flash: bool) -> Result<()> {
    if !cli.quiet {
        eprintln!(
            "{} Loading bitstream {}",
            style("📦").cyan(),
            style(bitstream.display()).bold()
        );
    }

    let mut image = Image::open(bitstream)
        .with_context(|| format!("Failed to load bitstream {}", bitstream.display()))?;

    let device = select_device(cli)?;
    if !cli.quiet {
        eprintln!(
            "{} Using device {} at {} baud",
            style("🔌").cyan(),
            style(&device).bold(),
            DEFAULT_BAUD
        );
    }

    let options = UploadOptions { verify, flash };
    let mut flasher = MojoFlasher::open(&device, options)
        .with_context(|| format!("Failed to open device {device}"))?;

    if !cli.quiet {
        eprintln!("{} Resetting board into loader mode", style("🔄").cyan());
    }

    // Create progress bar
    let pb = if cli.quiet || !use_fancy_output() {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(u64::from(image.len()));
        #[allow(clippy::unwrap_used)] // Static template string
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent_done}% {msg}",
                )
                .unwrap()
                .with_key(
                    "percent_done",
                    |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                        let _ = write!(
                            w,
                            "{:.1}",
                            percent_complete(state.pos(), state.len().unwrap_or(0))
                        );
                    },
                )
                .progress_chars("#>-"),
        );
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb
    };

    let upload_result = flasher.upload(&mut image, |transferred, _total| {
        pb.set_position(transferred);
    });

    if let Err(err) = upload_result {
        pb.abandon();
        flasher.close();
        return Err(err.into());
    }

    flasher.close();
    pb.finish_with_message("done");

    if !cli.quiet {
        eprintln!("\n{} Upload complete", style("🎉").green().bold());
    }

    Ok(())
}

/// Pick the serial device: explicit flag first, auto-detection otherwise.
fn select_device(cli: &Cli) -> Result<String> {
    if let Some(device) = &cli.device {
        return Ok(device.clone());
    }

    let detected = mojoflash::device::auto_detect_port()
        .context("No serial device found; specify one with --device")?;
    Ok(detected.name)
}
