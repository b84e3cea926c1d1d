pub mod config;
pub mod meditation;
pub mod noise;
pub mod rhythm;
pub mod session;
