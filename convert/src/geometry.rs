// Derived volume layout for a FAT12/FAT16 boot record.

use log::debug;

use fatup_core::FatupError;

use crate::boot_sector::BiosParameterBlock;
use crate::constants::DIR_ENTRY_SIZE;

/// Sector-granular layout derived from the boot record. All regions are
/// contiguous: reserved sectors, FAT copies, root directory, data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeGeometry {
    pub total_sectors: u32,
    pub root_dir_sectors: u32,
    pub data_start: u32,
    pub data_sectors: u32,
    pub cluster_count: u32,
}

impl VolumeGeometry {
    pub fn from_boot_record(bpb: &BiosParameterBlock) -> Result<Self, FatupError> {
        validate(bpb)?;

        let bytes_per_sector = bpb.bytes_per_sector as u32;
        let total_sectors = bpb.total_sectors();
        let root_dir_sectors = (bpb.root_entries as u32 * DIR_ENTRY_SIZE + bytes_per_sector - 1)
            / bytes_per_sector;
        let data_start = bpb.reserved_sectors as u32
            + bpb.num_fats as u32 * bpb.sectors_per_fat as u32
            + root_dir_sectors;

        if total_sectors < data_start {
            return Err(FatupError::InvalidGeometry(format!(
                "volume of {} sectors is smaller than its metadata ({} sectors)",
                total_sectors, data_start
            )));
        }

        let data_sectors = total_sectors - data_start;
        let cluster_count = data_sectors / bpb.sectors_per_cluster as u32;

        debug!(
            "geometry: {} total sectors, data start {}, {} data sectors, {} clusters",
            total_sectors, data_start, data_sectors, cluster_count
        );

        Ok(Self {
            total_sectors,
            root_dir_sectors,
            data_start,
            data_sectors,
            cluster_count,
        })
    }
}

fn validate(bpb: &BiosParameterBlock) -> Result<(), FatupError> {
    if ![512, 1024, 2048, 4096].contains(&bpb.bytes_per_sector) {
        return Err(FatupError::InvalidGeometry(format!(
            "invalid bytes per sector: {}",
            bpb.bytes_per_sector
        )));
    }

    if !bpb.sectors_per_cluster.is_power_of_two() {
        return Err(FatupError::InvalidGeometry(format!(
            "sectors per cluster not a power of 2: {}",
            bpb.sectors_per_cluster
        )));
    }

    if bpb.num_fats == 0 {
        return Err(FatupError::InvalidGeometry(
            "number of FATs cannot be 0".to_string(),
        ));
    }

    if bpb.sectors_per_fat == 0 {
        return Err(FatupError::InvalidGeometry(
            "sectors per FAT cannot be 0".to_string(),
        ));
    }

    if bpb.reserved_sectors == 0 {
        return Err(FatupError::InvalidGeometry(
            "reserved sector count cannot be 0".to_string(),
        ));
    }

    if bpb.total_sectors_16 == 0 && bpb.total_sectors_32 == 0 {
        return Err(FatupError::InvalidGeometry(
            "total sector count cannot be 0".to_string(),
        ));
    }

    Ok(())
}
