//! Loading instruction descriptors from JSON or YAML.

use std::fs;
use std::path::Path;

use framejoin_operators::InstructionDescriptor;

use crate::ExecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Json,
    Yaml,
}

impl DescriptorFormat {
    /// `.json` is JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DescriptorFormat::Json,
            _ => DescriptorFormat::Yaml,
        }
    }
}

pub fn parse_descriptor(
    text: &str,
    format: DescriptorFormat,
) -> Result<InstructionDescriptor, ExecError> {
    match format {
        DescriptorFormat::Json => {
            serde_json::from_str(text).map_err(|e| ExecError::Descriptor(e.to_string()))
        }
        DescriptorFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|e| ExecError::Descriptor(e.to_string()))
        }
    }
}

pub fn load_descriptor(path: &Path) -> Result<InstructionDescriptor, ExecError> {
    let text = fs::read_to_string(path).map_err(|source| ExecError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_descriptor(&text, DescriptorFormat::from_path(path))
}
