//! # cmgen - Meta-Build Generator for C++
//!
//! cmgen reads a graph of projects and modules, checks that every dependency
//! in it is legitimate, and writes the `CMakeLists.txt` and
//! `CMakePresets.json` files that build it.
//!
//! ## Features
//!
//! - **Declarative Definitions**: `project.toml`, `module.toml` and `external.toml`
//! - **Checked Dependencies**: visibility, executable targets and condition keys
//!   are validated before anything is generated
//! - **Condition Keys**: targets switch on or off per build mode at configure time
//! - **Build Modes**: one CMake preset per mode, with its own macros and flags
//! - **All-or-nothing Output**: every file is rendered before the first write
//!
//! ## Quick Start
//!
//! ```bash
//! # Generate build files for the project in the current directory
//! cmgen generate .
//!
//! # Configure and build with a preset
//! cmake --preset debug && cmake --build build/debug
//! ```
//!
//! ## Module Organization
//!
//! - [`model`] - Projects, modules, external projects and their dependencies
//! - [`registry`] - Loading, reference resolution and rollback
//! - [`validate`] - Dependency legitimacy rules
//! - [`generator`] - CMake output and cleanup

/// Definition file schema (`project.toml`, `module.toml`, `external.toml`).
pub mod config;

/// Error type shared by the library.
pub mod error;

/// Source path and glob expansion.
pub mod files;

/// Condition keys and their CMake predicate.
pub mod keys;

/// Definition loaders.
pub mod loader;

/// Definition model.
pub mod model;

/// Build file generation.
pub mod generator;

/// Relative path rendering.
pub mod paths;

/// Project registry.
pub mod registry;

/// Project graph visualization.
pub mod tree;

/// Terminal tables.
pub mod ui;

/// Dependency legitimacy checks.
pub mod validate;

pub use error::{GenError, GenResult};
pub use generator::{CmakeGenerator, MakefileGenerator};
pub use loader::{DefinitionLoader, MemoryLoader, TomlLoader};
pub use registry::Registry;
