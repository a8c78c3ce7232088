//! Package metadata as seen by the settings inspector.
//!
//! The inspector only needs a handful of facts about a package: its name,
//! the `<export>` entries of its descriptor, where that descriptor lives, and
//! its build type. [`PackageMetadata`] is that capability; [`PackageManifest`]
//! is a lightweight implementation read from a `package.xml`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Descriptor file name of a ROS package.
pub const PACKAGE_XML: &str = "package.xml";

/// Build type assumed when a package does not export one.
pub const DEFAULT_BUILD_TYPE: &str = "catkin";

/// Error type for package metadata
#[derive(Debug, Error)]
pub enum PackageError {
    /// IO error reading the descriptor
    #[error("failed to read package descriptor '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Descriptor has no `<name>` element
    #[error("package descriptor '{0}' does not declare a <name>")]
    MissingName(PathBuf),
    /// No package.xml where one was expected
    #[error("no package.xml found at '{0}'")]
    NotFound(PathBuf),
    /// More than one `build_type` export
    #[error("package '{package}' exports {count} build types, expected at most one")]
    AmbiguousBuildType { package: String, count: usize },
}

/// A single entry of the descriptor's `<export>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub tagname: String,
    pub content: String,
}

impl Export {
    pub fn new(tagname: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tagname: tagname.into(),
            content: content.into(),
        }
    }
}

/// What the settings inspector needs to know about a package.
pub trait PackageMetadata {
    /// Package name, used to fill the default configuration template.
    fn name(&self) -> &str;

    /// Export statements in declaration order.
    fn exports(&self) -> &[Export];

    /// Path of the package descriptor file.
    fn filename(&self) -> &Path;

    /// Declared build type, e.g. `ament_cmake` or `ament_python`.
    fn build_type(&self) -> Result<String, PackageError>;

    fn version(&self) -> Option<&str> {
        None
    }

    fn description(&self) -> Option<&str> {
        None
    }
}

/// Package metadata scanned from a `package.xml`.
///
/// Only the elements the inspector reads are extracted; this is not a
/// validating parser for the package format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub exports: Vec<Export>,
    pub filename: PathBuf,
}

impl PackageManifest {
    /// Read and scan the descriptor at `path`.
    pub fn from_path(path: &Path) -> Result<Self, PackageError> {
        let xml = fs::read_to_string(path).map_err(|source| PackageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_xml(&xml, path)
    }

    /// Scan descriptor text; `filename` is recorded as the descriptor path.
    pub fn from_xml(xml: &str, filename: &Path) -> Result<Self, PackageError> {
        let xml = comment_regex().replace_all(xml, "");

        let name = first_element(&xml, &NAME_RE, "name")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| PackageError::MissingName(filename.to_path_buf()))?;

        let exports = export_block_regex()
            .captures_iter(&xml)
            .flat_map(|caps| scan_children(caps.get(1).map_or("", |m| m.as_str())))
            .collect();

        Ok(Self {
            name,
            version: first_element(&xml, &VERSION_RE, "version"),
            description: first_element(&xml, &DESCRIPTION_RE, "description"),
            exports,
            filename: filename.to_path_buf(),
        })
    }
}

impl PackageMetadata for PackageManifest {
    fn name(&self) -> &str {
        &self.name
    }

    fn exports(&self) -> &[Export] {
        &self.exports
    }

    fn filename(&self) -> &Path {
        &self.filename
    }

    fn build_type(&self) -> Result<String, PackageError> {
        let declared: Vec<&Export> = self
            .exports
            .iter()
            .filter(|e| e.tagname == "build_type")
            .collect();

        match declared.as_slice() {
            [] => Ok(DEFAULT_BUILD_TYPE.to_string()),
            [only] => Ok(only.content.clone()),
            _ => Err(PackageError::AmbiguousBuildType {
                package: self.name.clone(),
                count: declared.len(),
            }),
        }
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Locate the package descriptor for `path`.
///
/// Accepts either a package directory or the descriptor file itself.
pub fn find_package_xml(path: &Path) -> Result<PathBuf, PackageError> {
    let candidate = if path.is_dir() {
        path.join(PACKAGE_XML)
    } else {
        path.to_path_buf()
    };

    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(PackageError::NotFound(path.to_path_buf()))
    }
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex is valid"))
}

fn export_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<export\s*>(.*?)</export\s*>").expect("export regex is valid")
    })
}

fn open_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<([A-Za-z_][\w:.-]*)(?:\s[^>]*?)?(/?)>").expect("open tag regex is valid")
    })
}

static NAME_RE: OnceLock<Regex> = OnceLock::new();
static VERSION_RE: OnceLock<Regex> = OnceLock::new();
static DESCRIPTION_RE: OnceLock<Regex> = OnceLock::new();

/// Text of the first `<tag>` element, trimmed and unescaped.
///
/// `cell` caches the compiled pattern for `tag`.
fn first_element(xml: &str, cell: &'static OnceLock<Regex>, tag: &str) -> Option<String> {
    let re = cell.get_or_init(|| {
        Regex::new(&format!(r"(?s)<{tag}(?:\s[^>]*)?>(.*?)</{tag}\s*>"))
            .expect("element regex is valid")
    });
    re.captures(xml)
        .and_then(|caps| caps.get(1))
        .map(|m| unescape(m.as_str().trim()))
}

/// Direct children of an `<export>` block, in order.
fn scan_children(block: &str) -> Vec<Export> {
    let mut exports = Vec::new();
    let mut pos = 0;

    while let Some(caps) = open_tag_regex().captures_at(block, pos) {
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let tagname = tag.as_str();
        let self_closing = caps.get(2).is_some_and(|m| !m.as_str().is_empty());

        if self_closing {
            exports.push(Export::new(tagname, ""));
            pos = whole.end();
            continue;
        }

        let close = format!("</{tagname}>");
        match block[whole.end()..].find(&close) {
            Some(offset) => {
                let content = &block[whole.end()..whole.end() + offset];
                exports.push(Export::new(tagname, unescape(content.trim())));
                pos = whole.end() + offset + close.len();
            }
            // Unterminated element; nothing after it can be trusted.
            None => break,
        }
    }

    exports
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
