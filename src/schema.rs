//! Manifest of the types and fields worth extracting
//!
//! A [`Schema`] is an ordered list of [`TypeRequest`]s. The built-in
//! [`Schema::cpython`] manifest covers what an out-of-process Python stack
//! walker needs; other manifests can be loaded from JSON.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::layout::error::IndexFault;
use crate::layout::index::TypeIndex;
use crate::layout::types::Type;

/// One field to extract from a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRequest {
    pub name: String,
    /// Output label; derived from the type and field names when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldRequest {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: None,
        }
    }

    pub fn labeled(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: Some(label.to_string()),
        }
    }

    /// Label of this field's output value
    pub fn label_for(&self, request: &TypeRequest) -> String {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => format!("{}{}", request.display_name(), camel_case(&self.name)),
        }
    }
}

/// One type to resolve, with the fields to report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRequest {
    /// Structure or typedef name looked up first
    pub type_name: String,
    /// Typedef name tried when `type_name` is not found; also the preferred
    /// base for derived labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretty_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldRequest>,
    /// Also report the type's size
    #[serde(default)]
    pub want_size: bool,
}

impl TypeRequest {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            pretty_name: None,
            fields: Vec::new(),
            want_size: false,
        }
    }

    pub fn pretty(mut self, pretty_name: &str) -> Self {
        self.pretty_name = Some(pretty_name.to_string());
        self
    }

    pub fn field(mut self, name: &str, label: &str) -> Self {
        self.fields.push(FieldRequest::labeled(name, label));
        self
    }

    pub fn with_size(mut self) -> Self {
        self.want_size = true;
        self
    }

    /// Name used to derive labels, e.g. `_typeobject`/`PyTypeObject` gives
    /// `PyTypeObject` and `_Py_tss_t` gives `PyTssT`
    pub fn display_name(&self) -> String {
        let name = match self.pretty_name.as_deref() {
            Some(pretty) if !pretty.is_empty() => pretty,
            _ => self.type_name.as_str(),
        };
        camel_case(name)
    }

    /// Label of the size value
    pub fn size_label(&self) -> String {
        format!("{}Size", self.display_name())
    }

    /// Resolve the requested type, trying `type_name` before `pretty_name`
    pub fn resolve<'i>(&self, index: &'i TypeIndex) -> Result<Option<&'i Type>, IndexFault> {
        if let Some(ty) = index.resolve_preferring_alias(&self.type_name)? {
            return Ok(Some(ty));
        }

        match self.pretty_name.as_deref() {
            Some(pretty) => index.resolve_preferring_alias(pretty),
            None => Ok(None),
        }
    }
}

/// Ordered list of type requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    requests: Vec<TypeRequest>,
}

impl Schema {
    pub fn new(requests: Vec<TypeRequest>) -> Self {
        Self { requests }
    }

    pub fn requests(&self) -> &[TypeRequest] {
        &self.requests
    }

    /// Parse a JSON array of type requests
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid schema")
    }

    /// Load a JSON schema file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read schema {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("cannot load schema {}", path.display()))
    }

    /// CPython interpreter structures used for stack unwinding
    pub fn cpython() -> Self {
        Self::new(vec![
            TypeRequest::new("PyVarObject").field("ob_size", "PyVarObject_ob_size"),
            TypeRequest::new("PyObject").field("ob_type", "PyObject_ob_type"),
            TypeRequest::new("_typeobject")
                .pretty("PyTypeObject")
                .field("tp_name", "PyTypeObject_tp_name"),
            TypeRequest::new("PyThreadState")
                .field("frame", "PyThreadState_frame")
                .field("cframe", "PyThreadState_cframe")
                .field("current_frame", "PyThreadState_current_frame"),
            TypeRequest::new("_PyCFrame").field("current_frame", "PyCFrame_current_frame"),
            TypeRequest::new("_frame")
                .pretty("PyFrameObject")
                .field("f_back", "PyFrameObject_f_back")
                .field("f_code", "PyFrameObject_f_code")
                .field("f_localsplus", "PyFrameObject_f_localsplus"),
            TypeRequest::new("PyCodeObject")
                .field("co_filename", "PyCodeObject_co_filename")
                .field("co_name", "PyCodeObject_co_name")
                .field("co_varnames", "PyCodeObject_co_varnames")
                .field("co_localsplusnames", "PyCodeObject_co_localsplusnames"),
            TypeRequest::new("PyTupleObject").field("ob_item", "PyTupleObject_ob_item"),
            TypeRequest::new("_PyInterpreterFrame")
                .field("f_code", "PyInterpreterFrame_f_code")
                .field("f_executable", "PyInterpreterFrame_f_executable")
                .field("previous", "PyInterpreterFrame_previous")
                .field("localsplus", "PyInterpreterFrame_localsplus")
                .field("owner", "PyInterpreterFrame_owner"),
            TypeRequest::new("_PyRuntimeState")
                .field("gilstate", "PyRuntimeState_gilstate")
                .field("autoTSSkey", "PyRuntimeState_autoTSSkey"),
            TypeRequest::new("_gilstate_runtime_state")
                .field("autoTSSkey", "Gilstate_runtime_state_autoTSSkey"),
            TypeRequest::new("_Py_tss_t")
                .field("_is_initialized", "PyTssT_is_initialized")
                .field("_key", "PyTssT_key")
                .with_size(),
            TypeRequest::new("PyASCIIObject")
                .pretty("PyASCIIObject")
                .with_size(),
            TypeRequest::new("PyCompactUnicodeObject")
                .pretty("PyCompactUnicodeObject")
                .with_size(),
        ])
    }
}

/// `_gilstate_runtime_state` -> `GilstateRuntimeState`
///
/// One leading underscore is dropped; every `_`-separated part gets an
/// upper-case first letter.
pub fn camel_case(name: &str) -> String {
    let name = name.strip_prefix('_').unwrap_or(name);
    let mut out = String::with_capacity(name.len());
    for part in name.split('_') {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
