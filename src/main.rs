//! # cmgen CLI Entry Point
//!
//! This is the main executable for the `cmgen` command-line tool.
//! It parses CLI arguments using clap and routes commands to the library.
//!
//! ## Command Structure
//!
//! - **Output**: `generate`, `clean`
//! - **Inspection**: `tree`, `info`
//! - **Shell**: `completion`

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::{Path, PathBuf};

use cmgen::MakefileGenerator;
use cmgen::TomlLoader;
use cmgen::model::{Definition, ProjectId, Visibility};
use cmgen::paths::rel_slashed;
use cmgen::registry::Registry;
use cmgen::tree;
use cmgen::ui::Table;

#[derive(Parser)]
#[command(name = "cmgen")]
#[command(about = "Generates CMake build files from project and module definitions", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write CMakeLists.txt and CMakePresets.json for a project and its sub-projects
    Generate {
        /// Project directory (containing project.toml)
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Report every project as it is loaded
        #[arg(short, long)]
        verbose: bool,
    },
    /// Remove generated build files and build directories
    Clean {
        /// Project directory (containing project.toml)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Display the project graph
    Tree {
        /// Project directory (containing project.toml)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Show the modules and dependencies of a project
    Info {
        /// Project directory (containing project.toml)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Generate shell completion scripts
    Completion { shell: Shell },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Generate { path, verbose }) => {
            let (registry, root) = load(path, *verbose)?;
            let project = registry.project(root);
            let written = project
                .generator()
                .generate(&registry, root)
                .with_context(|| format!("Failed to generate build files for '{}'", project.name()))?;
            for file in &written {
                println!("{} Generated {}", "✓".green(), file.display());
            }
            Ok(())
        }
        Some(Commands::Clean { path }) => {
            let (registry, root) = load(path, false)?;
            let report = registry
                .project(root)
                .generator()
                .clean(&registry, root)
                .context("Failed to clean project")?;
            report.print();
            if !report.is_clean() {
                anyhow::bail!("{} path(s) could not be removed", report.failures.len());
            }
            Ok(())
        }
        Some(Commands::Tree { path }) => {
            let (registry, root) = load(path, false)?;
            tree::print_tree(&registry, root)?;
            Ok(())
        }
        Some(Commands::Info { path }) => {
            let (registry, root) = load(path, false)?;
            print_info(&registry, root);
            Ok(())
        }
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Loads the project at `path`, resolved against the current directory.
fn load(path: &Path, verbose: bool) -> Result<(Registry, ProjectId)> {
    let dir = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve path {}", path.display()))?;
    let mut registry = Registry::new(TomlLoader::new()).verbose(verbose);
    let root = registry
        .register_or_fetch(&dir)
        .with_context(|| format!("Failed to load project at {}", dir.display()))?;
    Ok((registry, root))
}

fn print_info(registry: &Registry, root: ProjectId) {
    let project = registry.project(root);
    println!("{} ({})", project.name().bold().cyan(), project.path().display());
    println!("{}: {}", "Condition keys".bold(), project.condition_keys());
    println!("{}: C++{}", "Standard".bold(), project.cxx_standard());
    match project.install_dir() {
        Some(dir) => println!("{}: {}", "Install".bold(), dir.display()),
        None => println!("{}: {}", "Install".bold(), "disabled".dimmed()),
    }
    let modes: Vec<&str> = project
        .build_modes()
        .iter()
        .filter_map(|mode| mode.name.as_deref())
        .collect();
    println!("{}: {}", "Build modes".bold(), modes.join(", "));

    println!("\n{}", "Modules:".bold());
    let mut table = Table::new(&["Module", "Kind", "Visibility", "Keys", "Path"]);
    for visibility in [Visibility::Public, Visibility::Private] {
        for module in project.modules().get(visibility) {
            table.add_row(vec![
                module.name().to_string(),
                module.kind().to_string(),
                visibility.keyword().to_lowercase(),
                module.condition_keys().to_string(),
                rel_slashed(module.path(), project.path()),
            ]);
        }
    }
    if table.is_empty() {
        println!("  {} No modules", "!".yellow());
    } else {
        table.print();
    }

    let mut dependencies = Table::new(&["Dependency", "Kind", "Visibility", "Required keys"]);
    for visibility in [Visibility::Public, Visibility::Private] {
        for dependency in project.dependencies().get(visibility) {
            if let Ok(id) = dependency.resolved() {
                dependencies.add_row(vec![
                    registry.project(id).name().to_string(),
                    "project".to_string(),
                    visibility.keyword().to_lowercase(),
                    dependency.required_keys().to_string(),
                ]);
            }
        }
        for dependency in project.external_dependencies().get(visibility) {
            if let Ok(id) = dependency.resolved() {
                dependencies.add_row(vec![
                    registry.external_project(id).name().to_string(),
                    "external".to_string(),
                    visibility.keyword().to_lowercase(),
                    dependency.required_keys().to_string(),
                ]);
            }
        }
    }
    if !dependencies.is_empty() {
        println!("\n{}", "Dependencies:".bold());
        dependencies.print();
    }
}
