pub mod gap_fill;
pub mod logger;
