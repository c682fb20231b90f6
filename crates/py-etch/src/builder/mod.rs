//! Builder API for py-etch
//!
//! This module provides the main builder API for generating documentation
//! for a Python package. It's designed to be used from build scripts and
//! the `py-etch` binary alike.

mod etch_builder;

pub use etch_builder::{BuildOutput, EtchBuilder, NavigationStatus};
