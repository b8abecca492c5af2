pub mod build;
pub mod config;
pub mod describe;
pub mod preview;
