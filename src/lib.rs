// src/lib.rs

//! OpenSceneGraph package recipe
//!
//! Evaluates the OpenSceneGraph 3.6.5 recipe for a target platform and
//! cooks it into a package directory with headers, libraries, the license
//! and consumer link metadata.
//!
//! # Architecture
//!
//! - Settings and options: typed platform description plus boolean options
//! - Recipe: pure functions from settings/options to requirements, CMake
//!   definitions and consumer metadata
//! - Kitchen: fetches and verifies the source, drives CMake, and packages
//!   the result in strictly ordered phases

mod error;
pub mod hash;
pub mod options;
pub mod recipe;
pub mod settings;

pub use error::{Error, Result};
pub use options::{OptionDef, OptionSet};
pub use recipe::{Kitchen, KitchenConfig, Recipe};
pub use settings::{Arch, BuildType, Compiler, CompilerKind, Os, Runtime, Settings};
