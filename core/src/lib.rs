pub mod error;

pub use error::FatupError;
