// FAT12 to FAT16 volume image conversion engine.

pub mod boot_sector;
pub mod constants;
pub mod convert;
pub mod geometry;
pub mod layout;
pub mod stream;
pub mod transcode;

pub use boot_sector::BiosParameterBlock;
pub use convert::{upgrade_image, UpgradePlan};
pub use fatup_core::FatupError;
pub use geometry::VolumeGeometry;
pub use layout::{plan_upgrade, Fat16Layout};
pub use transcode::transcode_fat;
