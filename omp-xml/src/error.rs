use std::str::Utf8Error;

/// A response that could not be parsed or lacks something the caller needs.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// The bytes are not UTF-8.
    #[error("response is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),
    /// The tokenizer rejected the input.
    #[error("malformed XML: {0}")]
    Malformed(#[from] quick_xml::Error),
    /// Tags do not nest.
    #[error("malformed XML: {0}")]
    Unbalanced(String),
    /// An element the caller requires is absent.
    #[error("missing element <{0}>")]
    MissingElement(String),
    /// An attribute the caller requires is absent.
    #[error("<{element}> has no `{attribute}` attribute")]
    MissingAttribute {
        /// Element that was inspected.
        element:   String,
        /// Attribute that was expected.
        attribute: String,
    },
    /// A value is present but cannot be interpreted.
    #[error("<{element}> has an invalid {what}: {value:?}")]
    InvalidValue {
        /// Element holding the value.
        element: String,
        /// Which part of the element (attribute name, "text", …).
        what:    String,
        /// The offending value, possibly shortened.
        value:   String,
    },
}
