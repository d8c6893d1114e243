use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::compiler::core::ToDocument;

pub const JSON_INDENT: usize = 4;

/// JSON text output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitOptions {
    #[serde(default = "default_indent")]
    pub indent: usize,
    /// Single-line output, `indent` is ignored.
    #[serde(default)]
    pub compact: bool,
}

fn default_indent() -> usize {
    JSON_INDENT
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            compact: false,
        }
    }
}

impl EmitOptions {
    pub fn compact() -> Self {
        Self {
            compact: true,
            ..Self::default()
        }
    }
}

/// Renders any model value as JSON text with sorted keys.
pub fn to_json<T: ToDocument + ?Sized>(value: &T, options: &EmitOptions) -> serde_json::Result<String> {
    let document = value.to_document();
    if options.compact {
        return serde_json::to_string(&document);
    }

    let indent = vec![b' '; options.indent];
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
    document.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(serde_json::Error::custom)
}
