pub mod format;
pub mod spark;
