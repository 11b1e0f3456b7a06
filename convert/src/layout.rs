// Plans the FAT16 layout for an eligible FAT12 volume.

use log::debug;

use crate::boot_sector::BiosParameterBlock;
use crate::constants::{FAT16_FS_TYPE, FAT16_MIN_CLUSTERS, MIN_FAT16_ENTRIES};
use crate::geometry::VolumeGeometry;

/// The planning result. The boot record itself is rewritten in place;
/// this carries what the copy phase still needs from the source side.
#[derive(Debug, Clone, Copy)]
pub struct Fat16Layout {
    /// FAT size of the SOURCE volume, in sectors. The destination size
    /// lives in the rewritten boot record and is usually larger.
    pub source_fat_sectors: u16,
    /// Geometry of the source volume, before any growth.
    pub source: VolumeGeometry,
}

/// Rewrite the boot record for FAT16: grow the FAT to hold at least
/// `MIN_FAT16_ENTRIES` 16-bit entries, grow the volume when the data
/// region would otherwise fall short of the FAT16 cluster minimum, and
/// stamp the filesystem type label.
///
/// The FAT is never shrunk and an oversized volume is never truncated;
/// in both cases the surplus is retained.
pub fn plan_upgrade(bpb: &mut BiosParameterBlock, source: &VolumeGeometry) -> Fat16Layout {
    let source_fat_sectors = bpb.sectors_per_fat;
    let bytes_per_sector = bpb.bytes_per_sector as u32;

    let min_fat_sectors = (MIN_FAT16_ENTRIES * 2 + bytes_per_sector - 1) / bytes_per_sector;
    if min_fat_sectors > bpb.sectors_per_fat as u32 {
        bpb.sectors_per_fat = min_fat_sectors as u16;
    }

    let new_data_start = bpb.reserved_sectors as u32
        + bpb.num_fats as u32 * bpb.sectors_per_fat as u32
        + source.root_dir_sectors;
    let min_data_sectors = FAT16_MIN_CLUSTERS * bpb.sectors_per_cluster as u32;
    let min_total_sectors = new_data_start + min_data_sectors;

    if min_total_sectors > source.total_sectors {
        debug!(
            "growing volume from {} to {} sectors",
            source.total_sectors, min_total_sectors
        );
        if min_total_sectors > 0xFFFF {
            bpb.total_sectors_16 = 0;
            bpb.total_sectors_32 = min_total_sectors;
        } else {
            bpb.total_sectors_16 = min_total_sectors as u16;
            bpb.total_sectors_32 = 0;
        }
    }

    bpb.fs_type = FAT16_FS_TYPE;

    Fat16Layout {
        source_fat_sectors,
        source: *source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Small FAT12 volume: 512-byte sectors, 1 sector per cluster,
    // 1 reserved, 2 FATs of 9 sectors, 224 root entries, 10 clusters.
    fn small_bpb() -> BiosParameterBlock {
        BiosParameterBlock {
            jump_boot: [0xEB, 0x3C, 0x90],
            oem_name: *b"mkfs.fat",
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sectors: 1,
            num_fats: 2,
            root_entries: 224,
            total_sectors_16: 43,
            media_descriptor: 0xF8,
            sectors_per_fat: 9,
            sectors_per_track: 18,
            num_heads: 2,
            hidden_sectors: 0,
            total_sectors_32: 0,
            drive_number: 0x80,
            reserved: 0,
            boot_signature: 0x29,
            volume_id: 0,
            volume_label: *b"NO NAME    ",
            fs_type: *b"FAT12   ",
        }
    }

    fn geometry(bpb: &BiosParameterBlock) -> VolumeGeometry {
        VolumeGeometry::from_boot_record(bpb).unwrap()
    }

    #[test]
    fn grows_fat_and_volume_for_small_source() {
        let mut bpb = small_bpb();
        let source = geometry(&bpb);
        assert_eq!(source.cluster_count, 10);

        let layout = plan_upgrade(&mut bpb, &source);

        // ceil(4087 * 2 / 512) = 16 sectors per FAT
        assert_eq!(bpb.sectors_per_fat, 16);
        assert_eq!(layout.source_fat_sectors, 9);

        // 1 reserved + 2 * 16 FAT + 14 root + 4085 clusters
        let expected_total = 1 + 32 + 14 + 4085;
        assert_eq!(bpb.total_sectors_16 as u32, expected_total);
        assert_eq!(bpb.total_sectors_32, 0);
        assert_eq!(&bpb.fs_type, b"FAT16   ");
    }

    #[test]
    fn grown_volume_covers_the_cluster_minimum() {
        let mut bpb = small_bpb();
        let source = geometry(&bpb);
        plan_upgrade(&mut bpb, &source);

        let new_data_start = bpb.reserved_sectors as u32
            + bpb.num_fats as u32 * bpb.sectors_per_fat as u32
            + source.root_dir_sectors;
        assert!(bpb.total_sectors() >= new_data_start + 4085 * bpb.sectors_per_cluster as u32);
    }

    #[test]
    fn spills_into_32_bit_field_past_u16_range() {
        let mut bpb = small_bpb();
        // 32 sectors per cluster forces min_total_sectors well past 0xFFFF.
        bpb.sectors_per_cluster = 32;
        bpb.total_sectors_16 = 0;
        bpb.total_sectors_32 = 1000;
        let source = geometry(&bpb);

        plan_upgrade(&mut bpb, &source);

        assert_eq!(bpb.total_sectors_16, 0);
        let new_data_start = 1 + 2 * 16 + 14;
        assert_eq!(bpb.total_sectors_32, new_data_start + 4085 * 32);
    }

    #[test]
    fn exactly_one_size_field_nonzero_after_planning() {
        for sectors_per_cluster in [1u8, 32] {
            let mut bpb = small_bpb();
            bpb.sectors_per_cluster = sectors_per_cluster;
            let source = geometry(&bpb);
            plan_upgrade(&mut bpb, &source);
            assert!((bpb.total_sectors_16 == 0) != (bpb.total_sectors_32 == 0));
        }
    }

    #[test]
    fn never_shrinks_an_oversized_fat() {
        let mut bpb = small_bpb();
        bpb.sectors_per_fat = 20;
        bpb.total_sectors_16 = 100;
        let source = geometry(&bpb);

        let layout = plan_upgrade(&mut bpb, &source);

        assert_eq!(bpb.sectors_per_fat, 20);
        assert_eq!(layout.source_fat_sectors, 20);
    }

    #[test]
    fn leaves_a_large_enough_volume_untouched() {
        let mut bpb = small_bpb();
        // Room for well over 4085 clusters even after the FAT grows.
        bpb.total_sectors_16 = 6000;
        let source = geometry(&bpb);

        plan_upgrade(&mut bpb, &source);

        assert_eq!(bpb.total_sectors_16, 6000);
        assert_eq!(bpb.total_sectors_32, 0);
        assert_eq!(&bpb.fs_type, b"FAT16   ");
    }

    #[test]
    fn larger_sector_size_needs_fewer_fat_sectors() {
        let mut bpb = small_bpb();
        bpb.bytes_per_sector = 4096;
        bpb.sectors_per_fat = 1;
        bpb.total_sectors_16 = 43;
        let source = geometry(&bpb);

        plan_upgrade(&mut bpb, &source);

        // ceil(4087 * 2 / 4096) = 2 sectors per FAT
        assert_eq!(bpb.sectors_per_fat, 2);
    }
}
