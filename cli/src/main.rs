use anyhow::Context;
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use fatup_convert::{FatupError, UpgradePlan};

#[derive(Parser)]
#[command(name = "fatup")]
#[command(about = "Upgrade a FAT12 volume image to FAT16", long_about = None)]
struct Cli {
    /// Source FAT12 volume image
    input: PathBuf,
    /// Destination for the FAT16 volume image
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let input = File::open(&cli.input)
        .with_context(|| format!("open {} failed", cli.input.display()))?;
    let mut reader = BufReader::new(input);

    // Validate and plan before the destination file exists, so a
    // rejected source leaves nothing behind.
    let plan = match UpgradePlan::prepare(&mut reader) {
        Err(err @ FatupError::AlreadyFat16 { .. }) => {
            anyhow::bail!("{}: {}", cli.input.display(), err)
        }
        result => result.with_context(|| format!("reading {} failed", cli.input.display()))?,
    };

    let output = File::create(&cli.output)
        .with_context(|| format!("open {} failed", cli.output.display()))?;
    let mut writer = BufWriter::new(output);

    plan.run(&mut reader, &mut writer)
        .with_context(|| format!("writing {} failed", cli.output.display()))?;

    info!(
        "{} upgraded to FAT16 at {} ({} sectors)",
        cli.input.display(),
        cli.output.display(),
        plan.boot_record().total_sectors()
    );
    Ok(())
}
