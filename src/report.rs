//! Per-binary offset reports and their textual renderings

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{anyhow, Context, Result};
use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::dwarf::reader::index_file;
use crate::layout::error::IndexFault;
use crate::layout::index::TypeIndex;
use crate::schema::Schema;

/// Value reported for a type or field the binary does not have
pub const NOT_FOUND: i64 = -1;

/// Semantic version of the binary a report was produced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the single `major.minor.patch` triple embedded in `path`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("version pattern is valid")
        });

        let text = path.as_ref().to_string_lossy();
        let mut matches = pattern.captures_iter(&text);
        let (Some(captures), None) = (matches.next(), matches.next()) else {
            return Err(anyhow!("expected exactly one version number in {}", text));
        };

        let part = |i: usize| -> Result<u32> {
            captures[i]
                .parse()
                .with_context(|| format!("version component out of range in {}", text))
        };
        Ok(Self::new(part(1)?, part(2)?, part(3)?))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One labelled output value: an offset, a size, or [`NOT_FOUND`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffsetValue {
    pub label: String,
    pub value: i64,
}

impl OffsetValue {
    fn new(label: String, value: Option<u64>) -> Result<Self, IndexFault> {
        let value = match value {
            Some(value) => i64::try_from(value)
                .map_err(|_| IndexFault::OutOfRange {
                    label: label.clone(),
                    value,
                })?,
            None => NOT_FOUND,
        };

        Ok(Self { label, value })
    }
}

/// Answer every request of `schema` against `index`
///
/// Missing types and fields become [`NOT_FOUND`]; only inconsistent debug
/// information is an error.
pub fn evaluate(index: &TypeIndex, schema: &Schema) -> Result<Vec<OffsetValue>, IndexFault> {
    let mut values = Vec::new();
    for request in schema.requests() {
        let ty = request.resolve(index)?;
        if ty.is_none() {
            debug!("Type {} not found", request.type_name);
        }

        for field in &request.fields {
            let offset = ty.and_then(|ty| ty.field(&field.name)).map(|f| f.offset);
            values.push(OffsetValue::new(field.label_for(request), offset)?);
        }
        if request.want_size {
            values.push(OffsetValue::new(request.size_label(), ty.map(|ty| ty.size()))?);
        }
    }

    Ok(values)
}

/// Offsets extracted from one binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryReport {
    pub version: Version,
    pub path: PathBuf,
    pub values: Vec<OffsetValue>,
}

impl BinaryReport {
    /// Version the binary, index its debug information and evaluate `schema`
    pub fn from_binary<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<Self> {
        let path = path.as_ref();
        let version = Version::from_path(path)?;
        let index = index_file(path)?;
        let values = evaluate(&index, schema)
            .with_context(|| format!("inconsistent debug information in {}", path.display()))?;

        Ok(Self {
            version,
            path: path.to_path_buf(),
            values,
        })
    }
}

/// Order reports newest version first
pub fn sort_reports(reports: &mut [BinaryReport]) {
    reports.sort_by(|a, b| b.version.cmp(&a.version));
}

/// Names used in the generated Go source table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub generator: String,
    pub package: String,
    pub variable: String,
    pub key_type: String,
    pub value_type: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            generator: crate::PKG_NAME.to_string(),
            package: "python".to_string(),
            variable: "pyVersions".to_string(),
            key_type: "Version".to_string(),
            value_type: "UserOffsets".to_string(),
        }
    }
}

/// Go map literal keyed by version
pub struct Table<'a> {
    reports: &'a [BinaryReport],
    options: &'a TableOptions,
}

impl<'a> Table<'a> {
    pub fn new(reports: &'a [BinaryReport], options: &'a TableOptions) -> Self {
        Self { reports, options }
    }
}

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = self.options;
        writeln!(f, "// Code generated by {}. DO NOT EDIT.", options.generator)?;
        writeln!(f, "package {}", options.package)?;
        writeln!(f)?;
        writeln!(
            f,
            "var {} = map[{}]*{}{{",
            options.variable, options.key_type, options.value_type
        )?;

        for report in self.reports {
            let v = report.version;
            writeln!(f, "// {} {}", v, report.path.display())?;
            writeln!(f, "{{{}, {}, {}}}:  {{", v.major, v.minor, v.patch)?;
            for value in &report.values {
                writeln!(f, "  {}:{},", value.label, value.value)?;
            }
            writeln!(f, "}},")?;
        }

        writeln!(f, "}}")
    }
}

/// Render reports as a Go map literal keyed by version
pub fn render_table(reports: &[BinaryReport], options: &TableOptions) -> String {
    Table::new(reports, options).to_string()
}

/// Render reports as pretty-printed JSON
pub fn render_json(reports: &[BinaryReport]) -> Result<String> {
    serde_json::to_string_pretty(reports).context("cannot serialize reports")
}
