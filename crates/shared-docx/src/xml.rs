//! Namespace-aware helpers over `quick-xml`

use quick_xml::events::BytesStart;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

/// WordprocessingML main namespaces (transitional and strict)
const WORDML_NAMESPACES: [&[u8]; 2] = [
    b"http://schemas.openxmlformats.org/wordprocessingml/2006/main",
    b"http://purl.oclc.org/ooxml/wordprocessingml/main",
];

pub(crate) fn is_wordml(resolved: &ResolveResult) -> bool {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => WORDML_NAMESPACES.iter().any(|w| *w == *ns),
        _ => false,
    }
}

/// Value of a WordprocessingML attribute such as `w:author`
///
/// Unprefixed attributes with the same local name are accepted too.
pub(crate) fn wordml_attr<R>(
    reader: &NsReader<R>,
    element: &BytesStart,
    name: &str,
) -> Result<Option<String>, quick_xml::Error> {
    for attr in element.attributes() {
        let attr = attr?;
        let (ns, local) = reader.resolve_attribute(attr.key);
        let ns_ok = is_wordml(&ns) || matches!(ns, ResolveResult::Unbound);
        if ns_ok && local.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Value of an unqualified attribute (package relationship parts)
pub(crate) fn plain_attr(
    element: &BytesStart,
    name: &str,
) -> Result<Option<String>, quick_xml::Error> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Failure while streaming a part
#[derive(Debug)]
pub(crate) enum ScanError {
    Xml(quick_xml::Error),
    Unbalanced(usize),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Xml(e) => write!(f, "{}", e),
            ScanError::Unbalanced(open) => {
                write!(f, "unexpected end of part with {} unclosed element(s)", open)
            }
        }
    }
}

impl From<quick_xml::Error> for ScanError {
    fn from(e: quick_xml::Error) -> Self {
        ScanError::Xml(e)
    }
}
