//! Slash-delimited module paths.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::RelocateError;

static ELEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._~+-]+$").expect("element regex compiles"));

/// A syntactically valid module path such as `github.com/org/name`.
///
/// Only the shape is checked; whether the module exists is never asked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct ModulePath(String);

impl ModulePath {
    pub fn parse(raw: &str) -> Result<Self, RelocateError> {
        check_path(raw).map_err(|reason| {
            RelocateError::Usage(format!("invalid module path {raw:?}: {reason}"))
        })?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path element, the default package name at the module root.
    pub fn base_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// True if `import` names a package strictly below this module.
    pub fn is_parent_of(&self, import: &str) -> bool {
        import
            .strip_prefix(self.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Replace this module's prefix in `import` with `dst`, keeping the suffix.
    ///
    /// Returns `None` when `import` is not this module or one of its packages.
    pub fn retarget(&self, import: &str, dst: &ModulePath) -> Option<String> {
        if import == self.as_str() {
            return Some(dst.as_str().to_string());
        }
        if self.is_parent_of(import) {
            return Some(format!("{}{}", dst.as_str(), &import[self.0.len()..]));
        }
        None
    }
}

fn check_path(raw: &str) -> Result<(), String> {
    if raw.is_empty() {
        return Err("empty string".to_string());
    }
    if raw.starts_with('/') {
        return Err("leading slash".to_string());
    }
    if raw.ends_with('/') {
        return Err("trailing slash".to_string());
    }
    for elem in raw.split('/') {
        if elem.is_empty() {
            return Err("double slash".to_string());
        }
        if elem == "." || elem == ".." {
            return Err(format!("invalid path element {elem:?}"));
        }
        if !ELEMENT_RE.is_match(elem) {
            return Err(format!("invalid char in path element {elem:?}"));
        }
        if elem.starts_with('.') || elem.ends_with('.') {
            return Err(format!("leading or trailing dot in path element {elem:?}"));
        }
    }
    Ok(())
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ModulePath {
    type Err = RelocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ModulePath {
    type Error = RelocateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
