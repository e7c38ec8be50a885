//! Request fragment builders.

use std::fmt;

use quick_xml::escape::escape;

/// A serialized piece of OMP request XML.
///
/// Fragments concatenate: the authentication envelope and an operation are
/// sent back to back in one write.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Fragment(String);

impl Fragment {
    /// An empty fragment.
    pub fn empty() -> Self { Self(String::new()) }

    /// Wrap XML that is already serialized. The caller vouches for it.
    pub fn raw(xml: impl Into<String>) -> Self { Self(xml.into()) }

    /// Append `other` after this fragment.
    pub fn then(mut self, other: &Fragment) -> Self {
        self.0.push_str(&other.0);
        self
    }

    /// Wrap this fragment as the only content of a `<name>` element.
    pub fn wrapped_in(&self, name: &str) -> Self {
        Self(format!("<{name}>{}</{name}>", self.0))
    }

    /// `true` for the empty fragment.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    /// The serialized XML.
    pub fn as_str(&self) -> &str { &self.0 }
    /// The serialized XML as wire bytes.
    pub fn as_bytes(&self) -> &[u8] { self.0.as_bytes() }
    /// Unwrap into the serialized XML.
    pub fn into_string(self) -> String { self.0 }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fragment({:?})", self.0)
    }
}

impl AsRef<str> for Fragment {
    fn as_ref(&self) -> &str { &self.0 }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

fn push_text_child(out: &mut String, name: &str, text: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    out.push_str(&escape(text));
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// `<name a="1" b="2"/>`: an element with attributes and nothing inside.
///
/// Used for reads, deletes and task control keyed by identifiers.
pub fn attributed_element(name: &str, attrs: &[(&str, &str)]) -> Fragment {
    let mut out = String::with_capacity(name.len() + 3 + attrs.len() * 24);
    out.push('<');
    out.push_str(name);
    for (key, value) in attrs {
        push_attr(&mut out, key, value);
    }
    out.push_str("/>");
    Fragment(out)
}

/// `<name><a>1</a><b>2</b></name>`: named children holding plain text.
pub fn element_with_children(name: &str, children: &[(&str, &str)]) -> Fragment {
    mixed_element(name, children, "", &[])
}

/// Text children followed by children that carry a single `attr` attribute.
///
/// `mixed_element("create_task", &[("name", "t")], "id", &[("target", "7")])`
/// yields `<create_task><name>t</name><target id="7"/></create_task>`.
pub fn mixed_element(
    name:       &str,
    children:   &[(&str, &str)],
    attr:       &str,
    attributed: &[(&str, &str)],
) -> Fragment {
    let mut out = String::new();
    out.push('<');
    out.push_str(name);
    out.push('>');
    for (child, text) in children {
        push_text_child(&mut out, child, text);
    }
    for (child, value) in attributed {
        out.push('<');
        out.push_str(child);
        push_attr(&mut out, attr, value);
        out.push_str("/>");
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
    Fragment(out)
}
