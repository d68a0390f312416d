//! Template registry for file-based and inline templates.
//!
//! This module provides [`TemplateRegistry`], which maps template names to
//! their content, either held in memory or read from view directories.
//!
//! # Template Names
//!
//! Names are paths relative to their directory, with `/` separators and the
//! extension kept: `views/Hotels/index.html` registered from `views/` resolves
//! as `"Hotels/index.html"`. The format suffix is part of the name because the
//! same action usually has one template per format (`index.html`,
//! `index.json`).
//!
//! Lookups try the exact name first and then fall back to a case-insensitive
//! match, so `"hotels/Index.html"` still finds `Hotels/index.html`.
//!
//! # Collision Handling
//!
//! - Inline templates shadow file templates with the same name (no error)
//! - Two directories providing the same name is an error listing both files
//!
//! # Example
//!
//! ```rust,ignore
//! use contentfor_render::TemplateRegistry;
//!
//! let mut registry = TemplateRegistry::new();
//! registry.add_template_dir("app/views")?;
//! registry.add_inline("errors/500.html", "<h1>{{ Error.title }}</h1>");
//!
//! let content = registry.get_content("Hotels/index.html")?;
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// A template file discovered during directory walking.
///
/// For a file at `/app/views/Hotels/index.html` with root `/app/views`:
///
/// ```rust,ignore
/// TemplateFile {
///     name: "Hotels/index.html".to_string(),
///     absolute_path: PathBuf::from("/app/views/Hotels/index.html"),
///     source_dir: PathBuf::from("/app/views"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Resolution name (e.g., "Hotels/index.html")
    pub name: String,
    /// Absolute path to the template file
    pub absolute_path: PathBuf,
    /// The directory root this file belongs to
    pub source_dir: PathBuf,
}

impl TemplateFile {
    /// Creates a new template file descriptor.
    pub fn new(
        name: impl Into<String>,
        absolute_path: impl Into<PathBuf>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            absolute_path: absolute_path.into(),
            source_dir: source_dir.into(),
        }
    }
}

/// How a template's content is stored or accessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTemplate {
    /// Template content stored directly in memory.
    Inline(String),

    /// Template read from the filesystem on demand.
    File(PathBuf),
}

/// Error type for template registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two template directories contain files that resolve to the same name.
    Collision {
        /// The template name that has conflicting sources
        name: String,
        /// Path to the existing template
        existing_path: PathBuf,
        /// Directory containing the existing template
        existing_dir: PathBuf,
        /// Path to the conflicting template
        conflicting_path: PathBuf,
        /// Directory containing the conflicting template
        conflicting_dir: PathBuf,
    },

    /// Template not found in registry.
    NotFound {
        /// The name that was requested
        name: String,
    },

    /// A template directory is missing or is not a directory.
    DirectoryNotFound {
        path: PathBuf,
    },

    /// Failed to read a template file or walk a directory.
    ReadError {
        /// Path that failed to read
        path: PathBuf,
        /// Error message
        message: String,
    },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Collision {
                name,
                existing_path,
                existing_dir,
                conflicting_path,
                conflicting_dir,
            } => {
                write!(
                    f,
                    "Template collision detected for \"{}\":\n  \
                     - {} (from {})\n  \
                     - {} (from {})",
                    name,
                    existing_path.display(),
                    existing_dir.display(),
                    conflicting_path.display(),
                    conflicting_dir.display()
                )
            }
            RegistryError::NotFound { name } => {
                write!(f, "Template not found: \"{}\"", name)
            }
            RegistryError::DirectoryNotFound { path } => {
                write!(f, "Template directory not found: {}", path.display())
            }
            RegistryError::ReadError { path, message } => {
                write!(
                    f,
                    "Failed to read template \"{}\": {}",
                    path.display(),
                    message
                )
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Registry for template resolution from inline strings and view directories.
///
/// # Resolution Order
///
/// 1. Inline templates
/// 2. File templates from registered directories
/// 3. Case-insensitive match over both
///
/// The registry is not thread-safe for mutation. Build it during startup, then
/// compile it into a [`TemplateSet`](super::TemplateSet) that is shared
/// read-only.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    /// Inline templates (highest priority).
    inline: HashMap<String, String>,

    /// File-based templates (name → path).
    files: HashMap<String, PathBuf>,

    /// Tracks source info for collision detection: name → (path, source_dir).
    sources: HashMap<String, (PathBuf, PathBuf)>,

    /// Lowercased name → canonical name.
    folded: HashMap<String, String>,

    /// Directories walked by `add_template_dir`.
    dirs: Vec<PathBuf>,
}

impl TemplateRegistry {
    /// Creates an empty template registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry from `(name, content)` pairs.
    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        let mut registry = Self::new();
        for (name, content) in entries {
            registry.add_inline(*name, *content);
        }
        registry
    }

    /// Adds an inline template with the given name.
    ///
    /// Inline templates shadow file-based templates with the same name.
    pub fn add_inline(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        self.fold(&name);
        self.inline.insert(name, content.into());
    }

    /// Adds a directory of templates.
    ///
    /// The directory is walked immediately and listed by [`dirs`](Self::dirs).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory doesn't exist, can't be walked, or
    /// provides a name already provided by another directory.
    pub fn add_template_dir<P: AsRef<Path>>(&mut self, path: P) -> Result<(), RegistryError> {
        let path = path.as_ref();
        let files = walk_template_dir(path)?;
        self.add_from_files(files)?;
        self.dirs.push(path.to_path_buf());
        Ok(())
    }

    /// Adds templates discovered from a directory scan.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Collision`] if templates from different
    /// directories resolve to the same name.
    pub fn add_from_files(&mut self, files: Vec<TemplateFile>) -> Result<(), RegistryError> {
        for file in files {
            if let Some((existing_path, existing_dir)) = self.sources.get(&file.name) {
                if existing_dir != &file.source_dir {
                    return Err(RegistryError::Collision {
                        name: file.name.clone(),
                        existing_path: existing_path.clone(),
                        existing_dir: existing_dir.clone(),
                        conflicting_path: file.absolute_path.clone(),
                        conflicting_dir: file.source_dir.clone(),
                    });
                }
                continue;
            }

            self.sources.insert(
                file.name.clone(),
                (file.absolute_path.clone(), file.source_dir.clone()),
            );
            self.fold(&file.name);
            self.files.insert(file.name, file.absolute_path);
        }

        Ok(())
    }

    fn fold(&mut self, name: &str) {
        self.folded
            .entry(name.to_lowercase())
            .or_insert_with(|| name.to_string());
    }

    /// Resolves `name` to the name it is registered under.
    ///
    /// Returns `name` itself for exact matches, the registered spelling for
    /// case-insensitive matches, and `None` otherwise.
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.inline.get_key_value(name) {
            return Some(key.as_str());
        }
        if let Some((key, _)) = self.files.get_key_value(name) {
            return Some(key.as_str());
        }
        self.folded.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Looks up a template by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if the template doesn't exist.
    pub fn get(&self, name: &str) -> Result<ResolvedTemplate, RegistryError> {
        let not_found = || RegistryError::NotFound {
            name: name.to_string(),
        };
        let canonical = self.canonical_name(name).ok_or_else(not_found)?;

        if let Some(content) = self.inline.get(canonical) {
            return Ok(ResolvedTemplate::Inline(content.clone()));
        }
        if let Some(path) = self.files.get(canonical) {
            return Ok(ResolvedTemplate::File(path.clone()));
        }
        Err(not_found())
    }

    /// Gets the content of a template, reading from disk if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is not found or cannot be read from disk.
    pub fn get_content(&self, name: &str) -> Result<String, RegistryError> {
        match self.get(name)? {
            ResolvedTemplate::Inline(content) => Ok(content),
            ResolvedTemplate::File(path) => {
                std::fs::read_to_string(&path).map_err(|e| RegistryError::ReadError {
                    path,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Returns the number of registered templates.
    pub fn len(&self) -> usize {
        self.names().count()
    }

    /// Returns true if no templates are registered.
    pub fn is_empty(&self) -> bool {
        self.inline.is_empty() && self.files.is_empty()
    }

    /// Returns an iterator over all registered template names.
    ///
    /// A name provided both inline and by a file appears once.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inline.keys().map(|s| s.as_str()).chain(
            self.files
                .keys()
                .filter(|name| !self.inline.contains_key(*name))
                .map(|s| s.as_str()),
        )
    }

    /// Returns the directories registered with `add_template_dir`.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

/// Walks a template directory and collects template files.
///
/// Hidden files and directories (names starting with `.`) are skipped.
///
/// # Errors
///
/// Returns an error if the directory doesn't exist or cannot be traversed.
pub fn walk_template_dir(root: impl AsRef<Path>) -> Result<Vec<TemplateFile>, RegistryError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(RegistryError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|e| RegistryError::ReadError {
            path: e.path().unwrap_or(root).to_path_buf(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or_else(|_| entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        files.push(TemplateFile::new(name, entry.path(), root));
    }

    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
