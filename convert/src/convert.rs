// The FAT12 to FAT16 upgrade pipeline.
//
// Split in two phases so callers can validate the source before
// touching the destination: `prepare` consumes only the boot record,
// `run` streams the remaining regions in on-disk order.

use std::io::{Read, Write};

use log::info;

use fatup_core::FatupError;

use crate::boot_sector::BiosParameterBlock;
use crate::constants::{BOOT_RECORD_LEN, FAT16_MIN_CLUSTERS};
use crate::geometry::VolumeGeometry;
use crate::layout::{plan_upgrade, Fat16Layout};
use crate::stream::{copy_exact, zero_fill};
use crate::transcode::transcode_fat;

#[derive(Debug)]
pub struct UpgradePlan {
    boot_record: BiosParameterBlock,
    layout: Fat16Layout,
}

impl UpgradePlan {
    /// Read the source boot record and plan the upgrade.
    ///
    /// Consumes exactly the first `BOOT_RECORD_LEN` bytes of `input`.
    /// Fails without side effects when the source is malformed or its
    /// cluster count already meets the FAT16 minimum.
    pub fn prepare<R: Read + ?Sized>(input: &mut R) -> Result<Self, FatupError> {
        let mut raw = [0u8; BOOT_RECORD_LEN];
        let mut filled = 0;
        while filled < raw.len() {
            let n = input.read(&mut raw[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        let mut boot_record = BiosParameterBlock::decode(&raw[..filled])?;

        let source = VolumeGeometry::from_boot_record(&boot_record)?;
        if source.cluster_count >= FAT16_MIN_CLUSTERS {
            return Err(FatupError::AlreadyFat16 {
                clusters: source.cluster_count,
            });
        }

        info!("FAT12 source volume:");
        info!("  Total sectors: {}", source.total_sectors);
        info!("  Sectors per FAT: {}", boot_record.sectors_per_fat);
        info!("  Cluster count: {}", source.cluster_count);

        let layout = plan_upgrade(&mut boot_record, &source);

        info!("Planned FAT16 volume:");
        info!("  Total sectors: {}", boot_record.total_sectors());
        info!("  Sectors per FAT: {}", boot_record.sectors_per_fat);

        Ok(Self { boot_record, layout })
    }

    /// The rewritten boot record that `run` will emit.
    pub fn boot_record(&self) -> &BiosParameterBlock {
        &self.boot_record
    }

    /// Stream the conversion. `input` must be positioned where
    /// `prepare` left it; `output` receives the complete FAT16 image.
    pub fn run<R, W>(&self, input: &mut R, output: &mut W) -> Result<(), FatupError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let bpb = &self.boot_record;
        let source = &self.layout.source;
        let bytes_per_sector = bpb.bytes_per_sector as u64;

        bpb.encode(output)?;
        copy_exact(
            input,
            output,
            bpb.reserved_sectors as u64 * bytes_per_sector - BOOT_RECORD_LEN as u64,
        )?;

        let src_fat_len = self.layout.source_fat_sectors as u64 * bytes_per_sector;
        let dst_fat_len = bpb.sectors_per_fat as u64 * bytes_per_sector;
        for _ in 0..bpb.num_fats {
            transcode_fat(input, output, bpb.media_descriptor, src_fat_len, dst_fat_len)?;
        }

        copy_exact(
            input,
            output,
            source.root_dir_sectors as u64 * bytes_per_sector,
        )?;
        copy_exact(input, output, source.data_sectors as u64 * bytes_per_sector)?;

        // Extend the data region up to the FAT16 cluster minimum.
        let min_data_sectors = FAT16_MIN_CLUSTERS as u64 * bpb.sectors_per_cluster as u64;
        if min_data_sectors > source.data_sectors as u64 {
            zero_fill(
                output,
                (min_data_sectors - source.data_sectors as u64) * bytes_per_sector,
            )?;
        }

        output.flush()?;
        Ok(())
    }

    pub fn into_boot_record(self) -> BiosParameterBlock {
        self.boot_record
    }
}

/// One-shot conversion of a whole volume image.
pub fn upgrade_image<R, W>(input: &mut R, output: &mut W) -> Result<BiosParameterBlock, FatupError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let plan = UpgradePlan::prepare(input)?;
    plan.run(input, output)?;
    Ok(plan.into_boot_record())
}
