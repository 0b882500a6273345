//! `CMakePresets.json` rendering.
//!
//! Every build mode becomes one configure preset. The preset's cache variables
//! feed the injection points of the generated `CMakeLists.txt`
//! (`ACTIVATED_KEYS`, `MODE_PATH`, `MODE_MACROS`, `COMPILE_OPTIONS`,
//! `LINK_OPTIONS`).

use crate::error::{GenError, GenResult};
use crate::keys::INSTALL_ALWAYS;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const PRESETS_VERSION: u32 = 3;
const PRESET_GENERATOR: &str = "Ninja";

/// A named build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct BuildMode {
    /// Required; rendering fails without it
    pub name: Option<String>,
    /// `CMAKE_BUILD_TYPE`; defaults to the mode name
    pub cmake_type: Option<String>,
    /// Output sub-path prefixed to every output directory
    pub mode_path: Option<String>,
    /// Activated condition keys; defaults to `InstallAlways`
    pub keys: Option<Vec<String>>,
    #[serde(default)]
    pub macros: Vec<String>,
    #[serde(default)]
    pub compile_options: Vec<String>,
    #[serde(default)]
    pub link_options: Vec<String>,
}

impl BuildMode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_cmake_type(mut self, cmake_type: impl Into<String>) -> Self {
        self.cmake_type = Some(cmake_type.into());
        self
    }

    pub fn with_mode_path(mut self, mode_path: impl Into<String>) -> Self {
        self.mode_path = Some(mode_path.into());
        self
    }

    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_macros<I, S>(mut self, macros: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.macros = macros.into_iter().map(Into::into).collect();
        self
    }

    /// The four modes used when a project declares none.
    pub fn defaults() -> Vec<Self> {
        vec![
            BuildMode::new("Debug").with_keys([INSTALL_ALWAYS, "Shipping", "Release", "Debug"]),
            BuildMode::new("Development")
                .with_cmake_type("RelWithDebInfo")
                .with_keys([INSTALL_ALWAYS, "Shipping", "Release"]),
            BuildMode::new("Release")
                .with_cmake_type("Release")
                .with_mode_path("Release")
                .with_keys([INSTALL_ALWAYS, "Shipping"]),
            BuildMode::new("Mini")
                .with_cmake_type("MinSizeRel")
                .with_mode_path("Mini")
                .with_keys([INSTALL_ALWAYS, "Shipping"]),
        ]
    }

    fn require_name(&self) -> GenResult<&str> {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(GenError::config("a build mode is missing its name")),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PresetFile {
    version: u32,
    configure_presets: Vec<ConfigurePreset>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigurePreset {
    name: String,
    display_name: String,
    description: String,
    generator: &'static str,
    binary_dir: String,
    cache_variables: CacheVariables,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct CacheVariables {
    cmake_build_type: String,
    activated_keys: String,
    compile_options: String,
    link_options: String,
    mode_path: String,
    mode_macros: String,
}

impl ConfigurePreset {
    fn from_mode(mode: &BuildMode) -> GenResult<Self> {
        let name = mode.require_name()?;
        let id = name.to_lowercase();
        let keys = match &mode.keys {
            Some(keys) if !keys.is_empty() => keys.join(";"),
            _ => INSTALL_ALWAYS.to_string(),
        };
        Ok(Self {
            display_name: format!("{name} Build"),
            description: format!("Builds the project in {name} mode."),
            generator: PRESET_GENERATOR,
            binary_dir: format!("${{sourceDir}}/build/{id}"),
            cache_variables: CacheVariables {
                cmake_build_type: mode.cmake_type.clone().unwrap_or_else(|| name.to_string()),
                activated_keys: keys,
                compile_options: mode.compile_options.join(";"),
                link_options: mode.link_options.join(";"),
                mode_path: mode.mode_path.clone().unwrap_or_default(),
                mode_macros: mode.macros.join(";"),
            },
            name: id,
        })
    }
}

/// Renders the preset file for `modes`. An empty mode list renders nothing.
pub fn render_presets(modes: &[BuildMode]) -> GenResult<Option<String>> {
    if modes.is_empty() {
        return Ok(None);
    }

    let mut seen = HashSet::new();
    let mut configure_presets = Vec::with_capacity(modes.len());
    for mode in modes {
        let preset = ConfigurePreset::from_mode(mode)?;
        if !seen.insert(preset.name.clone()) {
            return Err(GenError::config(format!(
                "build mode '{}' is declared more than once",
                preset.name
            )));
        }
        configure_presets.push(preset);
    }

    let file = PresetFile {
        version: PRESETS_VERSION,
        configure_presets,
    };
    let mut json = serde_json::to_string_pretty(&file)
        .map_err(|e| GenError::config(format!("failed to serialize presets: {e}")))?;
    json.push('\n');
    Ok(Some(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_empty_mode_list_renders_nothing() {
        assert_eq!(render_presets(&[]).unwrap(), None);
    }

    #[test]
    fn test_mode_without_name_is_configuration_error() {
        let err = render_presets(&[BuildMode::default()]).unwrap_err();
        assert!(matches!(err, GenError::Configuration(_)));
    }

    #[test]
    fn test_preset_fields() {
        let modes = [BuildMode::new("Release")
            .with_mode_path("Release")
            .with_keys(["InstallAlways", "Shipping"])
            .with_macros(["NDEBUG", "SHIPPING=1"])];
        let json = render_presets(&modes).unwrap().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], 3);
        let preset = &value["configurePresets"][0];
        assert_eq!(preset["name"], "release");
        assert_eq!(preset["displayName"], "Release Build");
        assert_eq!(preset["generator"], "Ninja");
        assert_eq!(preset["binaryDir"], "${sourceDir}/build/release");

        let vars = &preset["cacheVariables"];
        assert_eq!(vars["CMAKE_BUILD_TYPE"], "Release");
        assert_eq!(vars["ACTIVATED_KEYS"], "InstallAlways;Shipping");
        assert_eq!(vars["MODE_PATH"], "Release");
        assert_eq!(vars["MODE_MACROS"], "NDEBUG;SHIPPING=1");
        assert_eq!(vars["COMPILE_OPTIONS"], "");
    }

    #[test]
    fn test_keys_default_to_install_always() {
        let json = render_presets(&[BuildMode::new("Debug")]).unwrap().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let vars = &value["configurePresets"][0]["cacheVariables"];
        assert_eq!(vars["ACTIVATED_KEYS"], "InstallAlways");
        assert_eq!(vars["CMAKE_BUILD_TYPE"], "Debug");
        assert_eq!(vars["MODE_PATH"], "");
    }

    #[test]
    fn test_duplicate_mode_names_rejected_case_insensitively() {
        let modes = [BuildMode::new("Debug"), BuildMode::new("DEBUG")];
        assert!(matches!(
            render_presets(&modes),
            Err(GenError::Configuration(_))
        ));
    }

    #[test]
    fn test_defaults_render_four_presets() {
        let json = render_presets(&BuildMode::defaults()).unwrap().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let names: Vec<_> = value["configurePresets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["debug", "development", "release", "mini"]);
    }
}
