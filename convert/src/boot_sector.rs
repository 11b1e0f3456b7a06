// Explicit codec for the DOS 4.0 extended BIOS parameter block.
//
// The block is decoded field by field at its fixed little-endian layout
// rather than reinterpreted from memory, so the codec is byte-exact on
// any host.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use static_assertions::const_assert_eq;

use fatup_core::FatupError;

use crate::constants::{BOOT_RECORD_LEN, BS_FIL_SYS_TYPE};

// The record ends with the 8-byte filesystem type label.
const_assert_eq!(BOOT_RECORD_LEN, BS_FIL_SYS_TYPE + 8);

/// The first 62 bytes of a FAT12/FAT16 boot sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiosParameterBlock {
    pub jump_boot: [u8; 3],
    pub oem_name: [u8; 8],
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    pub root_entries: u16,
    pub total_sectors_16: u16,
    pub media_descriptor: u8,
    pub sectors_per_fat: u16,
    pub sectors_per_track: u16,
    pub num_heads: u16,
    pub hidden_sectors: u32,
    pub total_sectors_32: u32,
    pub drive_number: u8,
    pub reserved: u8,
    pub boot_signature: u8,
    pub volume_id: u32,
    pub volume_label: [u8; 11],
    pub fs_type: [u8; 8],
}

impl BiosParameterBlock {
    /// Decode the parameter block from the start of a boot sector.
    ///
    /// Only the length is checked here; field plausibility is the
    /// caller's responsibility.
    pub fn decode(raw: &[u8]) -> Result<Self, FatupError> {
        if raw.len() < BOOT_RECORD_LEN {
            return Err(FatupError::TruncatedBootRecord {
                actual: raw.len(),
                expected: BOOT_RECORD_LEN,
            });
        }

        let mut cursor = Cursor::new(raw);
        let mut jump_boot = [0u8; 3];
        cursor.read_exact(&mut jump_boot)?;
        let mut oem_name = [0u8; 8];
        cursor.read_exact(&mut oem_name)?;
        let bytes_per_sector = cursor.read_u16::<LittleEndian>()?;
        let sectors_per_cluster = cursor.read_u8()?;
        let reserved_sectors = cursor.read_u16::<LittleEndian>()?;
        let num_fats = cursor.read_u8()?;
        let root_entries = cursor.read_u16::<LittleEndian>()?;
        let total_sectors_16 = cursor.read_u16::<LittleEndian>()?;
        let media_descriptor = cursor.read_u8()?;
        let sectors_per_fat = cursor.read_u16::<LittleEndian>()?;
        let sectors_per_track = cursor.read_u16::<LittleEndian>()?;
        let num_heads = cursor.read_u16::<LittleEndian>()?;
        let hidden_sectors = cursor.read_u32::<LittleEndian>()?;
        let total_sectors_32 = cursor.read_u32::<LittleEndian>()?;
        let drive_number = cursor.read_u8()?;
        let reserved = cursor.read_u8()?;
        let boot_signature = cursor.read_u8()?;
        let volume_id = cursor.read_u32::<LittleEndian>()?;
        let mut volume_label = [0u8; 11];
        cursor.read_exact(&mut volume_label)?;
        let mut fs_type = [0u8; 8];
        cursor.read_exact(&mut fs_type)?;

        Ok(Self {
            jump_boot,
            oem_name,
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sectors,
            num_fats,
            root_entries,
            total_sectors_16,
            media_descriptor,
            sectors_per_fat,
            sectors_per_track,
            num_heads,
            hidden_sectors,
            total_sectors_32,
            drive_number,
            reserved,
            boot_signature,
            volume_id,
            volume_label,
            fs_type,
        })
    }

    /// Write the parameter block in its exact on-disk encoding.
    pub fn encode<W: Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(&self.jump_boot)?;
        out.write_all(&self.oem_name)?;
        out.write_u16::<LittleEndian>(self.bytes_per_sector)?;
        out.write_u8(self.sectors_per_cluster)?;
        out.write_u16::<LittleEndian>(self.reserved_sectors)?;
        out.write_u8(self.num_fats)?;
        out.write_u16::<LittleEndian>(self.root_entries)?;
        out.write_u16::<LittleEndian>(self.total_sectors_16)?;
        out.write_u8(self.media_descriptor)?;
        out.write_u16::<LittleEndian>(self.sectors_per_fat)?;
        out.write_u16::<LittleEndian>(self.sectors_per_track)?;
        out.write_u16::<LittleEndian>(self.num_heads)?;
        out.write_u32::<LittleEndian>(self.hidden_sectors)?;
        out.write_u32::<LittleEndian>(self.total_sectors_32)?;
        out.write_u8(self.drive_number)?;
        out.write_u8(self.reserved)?;
        out.write_u8(self.boot_signature)?;
        out.write_u32::<LittleEndian>(self.volume_id)?;
        out.write_all(&self.volume_label)?;
        out.write_all(&self.fs_type)?;
        Ok(())
    }

    /// Total sectors from whichever size field is in use.
    pub fn total_sectors(&self) -> u32 {
        if self.total_sectors_16 != 0 {
            self.total_sectors_16 as u32
        } else {
            self.total_sectors_32
        }
    }
}
