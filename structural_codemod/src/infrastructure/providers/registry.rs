// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Provider Registry
//!
//! Owns the language providers and resolves one for an explicit name, a
//! file path, or a set of paths. The registry is built once by the engine
//! handle and shared immutably; tests construct fresh registries for
//! isolation.
//!
//! ## Resolution Rules
//!
//! 1. Explicit name: alias-index lookup, case-insensitive.
//! 2. One file: extension lookup.
//! 3. Many files: extension histogram; a strictly largest count wins,
//!    ties resolve to the earliest-registered provider.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use structural_codemod_domain::services::LanguageProvider;
use structural_codemod_domain::CodemodError;

use super::go_provider::GoProvider;
use super::python_provider::PythonProvider;
use super::rust_provider::RustProvider;

/// Immutable index of language providers.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn LanguageProvider>>,
    by_alias: HashMap<String, usize>,
    by_extension: HashMap<String, usize>,
}

impl ProviderRegistry {
    /// Builds a registry over an explicit provider list. Registration
    /// order is significant: it breaks histogram ties.
    pub fn new(providers: Vec<Arc<dyn LanguageProvider>>) -> Self {
        let mut by_alias = HashMap::new();
        let mut by_extension = HashMap::new();
        for (index, provider) in providers.iter().enumerate() {
            by_alias.entry(provider.language_name().to_lowercase()).or_insert(index);
            for alias in provider.aliases() {
                by_alias.entry(alias.to_lowercase()).or_insert(index);
            }
            for extension in provider.file_extensions() {
                by_extension.entry(extension.to_lowercase()).or_insert(index);
            }
        }
        Self {
            providers,
            by_alias,
            by_extension,
        }
    }

    /// Registry with the built-in providers (Go, Rust, Python).
    pub fn with_builtin_providers() -> Self {
        Self::new(vec![
            Arc::new(GoProvider::new()),
            Arc::new(RustProvider::new()),
            Arc::new(PythonProvider::new()),
        ])
    }

    pub fn providers(&self) -> &[Arc<dyn LanguageProvider>] {
        &self.providers
    }

    /// Resolves by explicit language name or alias.
    pub fn resolve_by_name(&self, name: &str) -> Result<Arc<dyn LanguageProvider>, CodemodError> {
        self.by_alias
            .get(&name.to_lowercase())
            .map(|&i| self.providers[i].clone())
            .ok_or_else(|| {
                CodemodError::LanguageNotFound(format!("no provider for language '{}'", name))
            })
    }

    /// Resolves by a single file path's extension.
    pub fn resolve_by_path(&self, path: &Path) -> Result<Arc<dyn LanguageProvider>, CodemodError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .unwrap_or_default();
        self.by_extension
            .get(&extension)
            .map(|&i| self.providers[i].clone())
            .ok_or_else(|| {
                CodemodError::LanguageNotFound(format!(
                    "no provider for file '{}'",
                    path.display()
                ))
            })
    }

    /// Resolves the dominant language across many files.
    ///
    /// Counts recognized extensions; the one with the strictly largest
    /// count wins. Ties fall back to the earliest-registered provider
    /// among the tied extensions.
    pub fn resolve_for_paths(&self, paths: &[&Path]) -> Result<Arc<dyn LanguageProvider>, CodemodError> {
        match paths {
            [] => Err(CodemodError::LanguageNotFound(
                "no files to infer a language from".to_string(),
            )),
            [single] => self.resolve_by_path(single),
            _ => {
                let mut histogram: HashMap<usize, usize> = HashMap::new();
                for path in paths {
                    if let Ok(provider) = self.resolve_by_path(path) {
                        let index = self
                            .by_alias
                            .get(&provider.language_name().to_lowercase())
                            .copied()
                            .unwrap_or_default();
                        *histogram.entry(index).or_insert(0) += 1;
                    }
                }
                // Max count; earliest-registered provider breaks ties.
                let mut entries: Vec<(usize, usize)> = histogram.into_iter().collect();
                entries.sort_by(|(ia, ca), (ib, cb)| cb.cmp(ca).then(ia.cmp(ib)));
                match entries.first() {
                    Some(&(index, _)) => Ok(self.providers[index].clone()),
                    None => Err(CodemodError::LanguageNotFound(
                        "no recognized extensions among input files".to_string(),
                    )),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::with_builtin_providers()
    }

    #[test]
    fn test_resolve_by_name_and_alias() {
        let r = registry();
        assert_eq!(r.resolve_by_name("go").unwrap().language_name(), "go");
        assert_eq!(r.resolve_by_name("golang").unwrap().language_name(), "go");
        assert_eq!(r.resolve_by_name("PY").unwrap().language_name(), "python");
        assert!(r.resolve_by_name("cobol").is_err());
    }

    #[test]
    fn test_resolve_single_path() {
        let r = registry();
        let path = PathBuf::from("cmd/server/main.go");
        assert_eq!(r.resolve_by_path(&path).unwrap().language_name(), "go");
        assert!(r.resolve_by_path(Path::new("README.md")).is_err());
        assert!(r.resolve_by_path(Path::new("Makefile")).is_err());
    }

    #[test]
    fn test_dominant_language_inference() {
        let r = registry();
        let a = PathBuf::from("a.go");
        let b = PathBuf::from("b.go");
        let c = PathBuf::from("c.py");
        let paths: Vec<&Path> = vec![&a, &b, &c];
        assert_eq!(r.resolve_for_paths(&paths).unwrap().language_name(), "go");
    }

    #[test]
    fn test_tie_breaks_to_first_registered() {
        let r = registry();
        let a = PathBuf::from("a.py");
        let b = PathBuf::from("b.go");
        let paths: Vec<&Path> = vec![&a, &b];
        // Go registers before Python.
        assert_eq!(r.resolve_for_paths(&paths).unwrap().language_name(), "go");
    }

    #[test]
    fn test_no_recognized_extensions() {
        let r = registry();
        let a = PathBuf::from("a.txt");
        let b = PathBuf::from("b.md");
        let paths: Vec<&Path> = vec![&a, &b];
        assert!(r.resolve_for_paths(&paths).is_err());
    }
}
