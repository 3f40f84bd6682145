//! INI configuration store
//!
//! The catalog, the legacy catalog, and every map description file share the
//! same shape: named sections of `key=value` pairs, `;`/`#` comments, and the
//! occasional raw block copied between files verbatim. This module owns that
//! shape. Sections keep insertion order so a regenerated catalog is
//! byte-for-byte reproducible.
//!
//! Absent keys and keys stored with an empty value are indistinguishable in
//! the on-disk format; `get` folds both into `None` so callers never branch
//! on the empty-string sentinel.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors when loading or persisting an INI document
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// One line inside a section
#[derive(Debug, Clone, PartialEq)]
enum Line {
    /// A `key=value` pair
    Pair { key: String, value: String },
    /// Anything else worth preserving (comments, bare words)
    Raw(String),
}

impl Line {
    fn render(&self) -> String {
        match self {
            Line::Pair { key, value } => format!("{}={}", key, value),
            Line::Raw(text) => text.clone(),
        }
    }
}

/// A named section of key/value pairs
#[derive(Debug, Clone)]
struct Section {
    name: String,
    lines: Vec<Line>,
}

impl Section {
    fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            Line::Pair { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    fn set(&mut self, key: &str, value: &str) {
        for line in &mut self.lines {
            if let Line::Pair { key: k, value: v } = line {
                if k == key {
                    *v = value.to_string();
                    return;
                }
            }
        }
        self.lines.push(Line::Pair {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
}

/// An ordered INI document
#[derive(Debug, Clone, Default)]
pub struct IniDocument {
    /// Raw lines before the first section header
    preamble: Vec<String>,
    sections: Vec<Section>,
    /// Comment lines appended after the last section
    trailing_comments: Vec<String>,
}

impl IniDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from text
    pub fn parse(content: &str) -> Self {
        let mut doc = Self::new();

        for raw_line in content.lines() {
            let line = raw_line.trim_end();
            let trimmed = line.trim_start();

            if trimmed.is_empty() {
                continue;
            }

            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                let name = trimmed[1..trimmed.len() - 1].to_string();
                doc.sections.push(Section {
                    name,
                    lines: Vec::new(),
                });
                continue;
            }

            let parsed = if trimmed.starts_with(';') || trimmed.starts_with('#') {
                Line::Raw(line.to_string())
            } else if let Some((key, value)) = trimmed.split_once('=') {
                Line::Pair {
                    key: key.trim().to_string(),
                    value: value.trim().to_string(),
                }
            } else {
                Line::Raw(line.to_string())
            };

            match doc.sections.last_mut() {
                Some(section) => section.lines.push(parsed),
                None => doc.preamble.push(line.to_string()),
            }
        }

        doc
    }

    /// Load a document from a file
    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    /// Look up a value. Absent keys and empty values both return `None`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.find_section(section)
            .and_then(|s| s.get(key))
            .filter(|v| !v.is_empty())
    }

    /// Set a value, creating the section if needed
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.section_mut(section).set(key, value);
    }

    /// Whether a section exists and has at least one line
    pub fn has_section(&self, name: &str) -> bool {
        self.find_section(name).is_some_and(|s| !s.lines.is_empty())
    }

    /// The rendered lines of a section, for verbatim block copies
    pub fn raw_section(&self, name: &str) -> Option<Vec<String>> {
        self.find_section(name)
            .filter(|s| !s.lines.is_empty())
            .map(|s| s.lines.iter().map(Line::render).collect())
    }

    /// Replace or create a section from rendered lines
    pub fn set_raw_section(&mut self, name: &str, lines: &[String]) {
        let section = self.section_mut(name);
        section.lines = lines
            .iter()
            .map(|line| {
                let trimmed = line.trim_start();
                if trimmed.starts_with(';') || trimmed.starts_with('#') {
                    Line::Raw(line.clone())
                } else if let Some((key, value)) = trimmed.split_once('=') {
                    Line::Pair {
                        key: key.trim().to_string(),
                        value: value.trim().to_string(),
                    }
                } else {
                    Line::Raw(line.clone())
                }
            })
            .collect();
    }

    /// Append a `; ` comment line after the last section
    pub fn append_trailing_comment(&mut self, text: &str) {
        self.trailing_comments.push(format!("; {}", text));
    }

    /// Render the document to INI text
    pub fn render(&self) -> String {
        let mut out = String::new();

        for line in &self.preamble {
            out.push_str(line);
            out.push('\n');
        }
        if !self.preamble.is_empty() {
            out.push('\n');
        }

        for section in &self.sections {
            out.push_str(&format!("[{}]\n", section.name));
            for line in &section.lines {
                out.push_str(&line.render());
                out.push('\n');
            }
            out.push('\n');
        }

        for comment in &self.trailing_comments {
            out.push_str(comment);
            out.push('\n');
        }

        out
    }

    /// Write the rendered document to a file
    pub fn write_to_file(&self, path: &Path) -> Result<(), StoreError> {
        fs::write(path, self.render()).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn find_section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn section_mut(&mut self, name: &str) -> &mut Section {
        if let Some(pos) = self.sections.iter().position(|s| s.name == name) {
            return &mut self.sections[pos];
        }
        self.sections.push(Section {
            name: name.to_string(),
            lines: Vec::new(),
        });
        self.sections.last_mut().unwrap()
    }
}
