// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;
pub mod smf;

pub use smf::{read_smf, write_smf, SmfError};
