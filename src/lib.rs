pub mod config;
pub mod grid_file;
pub mod verifier;
pub mod workflow;
