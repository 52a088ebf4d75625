/// Keccak and md5 helpers
mod hash;
pub use hash::{id, keccak256, md5, topic};
