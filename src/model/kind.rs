use crate::error::{GenError, GenResult};
use std::fmt;
use std::str::FromStr;

/// What a module builds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryKind {
    StaticLibrary,
    DynamicLibrary,
    /// Header-only target: no artifact, usage requirements only
    Interface,
    /// Terminal target: nothing may link against it
    Executable,
}

impl LibraryKind {
    /// Canonical parse of a user-supplied library kind. Case-insensitive.
    pub fn parse(raw: &str) -> GenResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "static" | "staticlibrary" | "lib" => Ok(LibraryKind::StaticLibrary),
            "dynamic" | "dynamiclibrary" | "shared" | "dll" => Ok(LibraryKind::DynamicLibrary),
            "interface" | "headeronly" => Ok(LibraryKind::Interface),
            "executable" | "exe" => Ok(LibraryKind::Executable),
            _ => Err(GenError::config(format!("unknown library kind '{raw}'"))),
        }
    }

    /// Keyword used in `add_library(<name> <KEYWORD>)`; `None` for executables.
    pub fn cmake_library_type(&self) -> Option<&'static str> {
        match self {
            LibraryKind::StaticLibrary => Some("STATIC"),
            LibraryKind::DynamicLibrary => Some("SHARED"),
            LibraryKind::Interface => Some("INTERFACE"),
            LibraryKind::Executable => None,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, LibraryKind::Interface)
    }
}

impl FromStr for LibraryKind {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LibraryKind::StaticLibrary => "StaticLibrary",
            LibraryKind::DynamicLibrary => "DynamicLibrary",
            LibraryKind::Interface => "Interface",
            LibraryKind::Executable => "Executable",
        };
        f.write_str(name)
    }
}

/// How an external project is brought into the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProjectKind {
    /// Located with `find_package` against its install directory
    #[default]
    Package,
    /// Built in-source with `add_subdirectory`
    Subdirectory,
}

impl ProjectKind {
    /// Canonical parse of a user-supplied project kind. Case-insensitive.
    pub fn parse(raw: &str) -> GenResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "package" => Ok(ProjectKind::Package),
            "subdirectory" => Ok(ProjectKind::Subdirectory),
            _ => Err(GenError::config(format!("unknown project kind '{raw}'"))),
        }
    }
}

impl FromStr for ProjectKind {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKind::Package => f.write_str("Package"),
            ProjectKind::Subdirectory => f.write_str("Subdirectory"),
        }
    }
}

/// Public items are inherited by dependents; private items stay inside the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn keyword(&self) -> &'static str {
        match self {
            Visibility::Public => "PUBLIC",
            Visibility::Private => "PRIVATE",
        }
    }
}
