pub mod analyzer;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod git;
pub mod manifest;
pub mod sync;
pub mod ui;

pub use error::{ReleaseTrainError, Result};
