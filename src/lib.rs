#![deny(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod dist;
pub mod download;
pub mod errors;
pub mod process;
pub mod readme;
pub mod utils;
