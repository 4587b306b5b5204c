// Downloading and parsing the results of one municipality.

use crate::volby::http::Transport;
use crate::volby::*;

pub const CODE_PLACEHOLDER: &str = "{code}";
// printf-style placeholder, as found in older configurations.
const LEGACY_PLACEHOLDER: &str = "%s";

pub fn has_placeholder(template: &str) -> bool {
    template.contains(CODE_PLACEHOLDER) || template.contains(LEGACY_PLACEHOLDER)
}

pub fn results_url(template: &str, code: &MunicipalityCode) -> String {
    if template.contains(CODE_PLACEHOLDER) {
        template.replace(CODE_PLACEHOLDER, code.as_str())
    } else {
        template.replacen(LEGACY_PLACEHOLDER, code.as_str(), 1)
    }
}

/// Fetches the result document of a municipality and returns its root element.
pub fn fetch_results(
    transport: &dyn Transport,
    template: &str,
    code: &MunicipalityCode,
) -> Result<Element, ItemError> {
    let url = results_url(template, code);
    debug!("fetch_results: {}: {}", code, url);
    let body = transport
        .get(&url)
        .context(DownloadSnafu { code: code.clone() })?;
    let text = std::str::from_utf8(&body).context(EncodingSnafu { code: code.clone() })?;
    parse_results(text).context(ParsingXmlSnafu { code: code.clone() })
}

pub fn parse_results(text: &str) -> Result<Element, roxmltree::Error> {
    let doc = roxmltree::Document::parse(text)?;
    Ok(to_element(doc.root_element()))
}

fn to_element(node: roxmltree::Node) -> Element {
    let mut element = Element::new(node.tag_name().name());
    for attr in node.attributes() {
        element.attributes.insert(attr.name(), attr.value());
    }
    element.children = node
        .children()
        .filter(|n| n.is_element())
        .map(to_element)
        .collect();
    element
}
