use std::fmt;

use crate::{Element, XmlError};

/// The `status` / `status_text` pair every `*_response` element carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    /// HTTP-like code; 2xx is success.
    pub code: u16,
    /// Human-readable explanation, if the server sent one.
    pub text: Option<String>,
}

impl Status {
    /// Read the status of a response element.
    ///
    /// A missing or non-numeric `status` is a parse failure, not a protocol
    /// failure.
    pub fn of(element: &Element) -> Result<Self, XmlError> {
        Ok(Self {
            code: element.parse_attr("status")?,
            text: element.attr("status_text").map(str::to_owned),
        })
    }

    /// `true` for codes in 200..=299.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(text) = &self.text {
            write!(f, " ({text})")?;
        }
        Ok(())
    }
}
