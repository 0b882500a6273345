//! Condition-key activation model.
//!
//! A [`KeySet`] gates whether a project, module or dependency takes part in a
//! build. A target is active when its required keys are exactly the
//! [`INSTALL_ALWAYS`] sentinel, or when they share at least one key with the
//! keys activated by the selected build mode.
//!
//! The same rule exists twice: [`KeySet::is_active`] evaluates it in-process,
//! and [`cmake_predicate`] emits it as a CMake function because the activated
//! set is only known once CMake picks a preset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Sentinel key meaning "always active".
pub const INSTALL_ALWAYS: &str = "InstallAlways";

/// Name of the generated CMake function implementing the activation rule.
pub const PREDICATE_FUNCTION: &str = "check_keys_intersection";

/// Name of the CMake cache variable holding the activated keys.
pub const ACTIVATED_KEYS_VAR: &str = "ACTIVATED_KEYS";

/// An ordered set of condition keys.
///
/// Ordering is lexicographic so that every rendering of a set is stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeySet(BTreeSet<String>);

impl KeySet {
    /// The unconditional `{InstallAlways}` set.
    pub fn always() -> Self {
        Self(BTreeSet::from([INSTALL_ALWAYS.to_string()]))
    }

    /// A set with no keys at all. Only meaningful as an activated set.
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Builds a set from the given keys, falling back to `{InstallAlways}`
    /// when none are given.
    pub fn or_always<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect()).non_empty()
    }

    /// Replaces an empty set with `{InstallAlways}`.
    pub fn non_empty(self) -> Self {
        if self.0.is_empty() { Self::always() } else { self }
    }

    pub fn is_always(&self) -> bool {
        self.0.len() == 1 && self.0.contains(INSTALL_ALWAYS)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Static check used by validation: every key of `self` is declared by `other`.
    pub fn is_subset(&self, other: &KeySet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Dynamic activation rule against the keys of a build mode.
    pub fn is_active(&self, activated: &KeySet) -> bool {
        self.is_always() || !self.0.is_disjoint(&activated.0)
    }

    /// Renders the set as a CMake list (`a;b;c`).
    pub fn to_cmake_list(&self) -> String {
        self.iter().collect::<Vec<_>>().join(";")
    }
}

impl Default for KeySet {
    fn default() -> Self {
        Self::always()
    }
}

impl<S: Into<String>> FromIterator<S> for KeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.iter().collect::<Vec<_>>().join(", "))
    }
}

/// CMake source for the activation predicate, one line per entry.
pub fn cmake_predicate() -> Vec<String> {
    vec![
        format!("function({PREDICATE_FUNCTION} required_keys result_var)"),
        "    set(intersection FALSE)".to_string(),
        format!("    if(\"${{required_keys}}\" STREQUAL \"{INSTALL_ALWAYS}\")"),
        "        set(intersection TRUE)".to_string(),
        "    else()".to_string(),
        "        foreach(key IN LISTS required_keys)".to_string(),
        format!("            if(\"${{key}}\" IN_LIST {ACTIVATED_KEYS_VAR})"),
        "                set(intersection TRUE)".to_string(),
        "                break()".to_string(),
        "            endif()".to_string(),
        "        endforeach()".to_string(),
        "    endif()".to_string(),
        "    set(${result_var} ${intersection} PARENT_SCOPE)".to_string(),
        "endfunction()".to_string(),
    ]
}

/// A call of the predicate storing its result in `var`, followed by the
/// opening of the guarded block.
pub fn cmake_guard(required: &KeySet, var: &str, indent: &str) -> [String; 2] {
    [
        format!(
            "{indent}{PREDICATE_FUNCTION}(\"{}\" {var})",
            required.to_cmake_list()
        ),
        format!("{indent}if({var})"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_is_active_for_any_activated_set() {
        let required = KeySet::always();
        assert!(required.is_active(&KeySet::empty()));
        assert!(required.is_active(&KeySet::from_iter(["Debug"])));
    }

    #[test]
    fn test_activation_is_intersection_not_containment() {
        let required = KeySet::from_iter(["X"]);
        assert!(!required.is_active(&KeySet::from_iter(["Y"])));
        assert!(required.is_active(&KeySet::from_iter(["X", "Y"])));

        let required = KeySet::from_iter(["X", "Z"]);
        assert!(required.is_active(&KeySet::from_iter(["Z"])));
    }

    #[test]
    fn test_sentinel_mixed_with_other_keys_is_not_unconditional() {
        let required = KeySet::from_iter([INSTALL_ALWAYS, "X"]);
        assert!(!required.is_always());
        assert!(!required.is_active(&KeySet::from_iter(["Y"])));
    }

    #[test]
    fn test_or_always_defaults_empty_input() {
        assert_eq!(KeySet::or_always(Vec::<String>::new()), KeySet::always());
        assert_eq!(
            KeySet::or_always(["B", "A"]).to_cmake_list(),
            "A;B".to_string()
        );
    }

    #[test]
    fn test_non_empty_keeps_declared_keys() {
        assert!(KeySet::empty().non_empty().is_always());
        assert_eq!(
            KeySet::from_iter(["Debug"]).non_empty(),
            KeySet::from_iter(["Debug"])
        );
    }

    #[test]
    fn test_subset() {
        let declared = KeySet::from_iter(["A", "B", INSTALL_ALWAYS]);
        assert!(KeySet::always().is_subset(&declared));
        assert!(KeySet::from_iter(["A"]).is_subset(&declared));
        assert!(!KeySet::from_iter(["C"]).is_subset(&declared));
    }

    #[test]
    fn test_cmake_guard_renders_sorted_list() {
        let [call, open] = cmake_guard(&KeySet::from_iter(["Z", "A"]), "ACTIVATE_X", "    ");
        assert_eq!(call, "    check_keys_intersection(\"A;Z\" ACTIVATE_X)");
        assert_eq!(open, "    if(ACTIVATE_X)");
    }

    #[test]
    fn test_display() {
        assert_eq!(KeySet::from_iter(["b", "a"]).to_string(), "{a, b}");
    }
}
