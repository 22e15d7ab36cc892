pub mod crypto;
pub mod memory;
