pub use crate::config::*;

/// A builder for assembling result trees by hand.
///
/// ```
/// use result_flattening::builder::ElementBuilder;
///
/// let party = ElementBuilder::new("VOLEBNI_STRANA")
///     .attr("VSTRANA", "7")
///     .child(ElementBuilder::new("ZASTUPITEL").attr("JMENO", "Jan").build())
///     .build();
///
/// assert_eq!(party.attributes.get("VSTRANA"), Some("7"));
/// assert_eq!(party.children.len(), 1);
/// ```
pub struct ElementBuilder {
    _element: Element,
}

impl ElementBuilder {
    pub fn new(name: &str) -> ElementBuilder {
        ElementBuilder {
            _element: Element::new(name),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> ElementBuilder {
        self._element.attributes.insert(name, value);
        self
    }

    pub fn attrs(mut self, attributes: &[(&str, &str)]) -> ElementBuilder {
        for (name, value) in attributes {
            self._element.attributes.insert(name, value);
        }
        self
    }

    pub fn child(mut self, child: Element) -> ElementBuilder {
        self._element.children.push(child);
        self
    }

    pub fn children(mut self, children: Vec<Element>) -> ElementBuilder {
        self._element.children.extend(children);
        self
    }

    pub fn build(self) -> Element {
        self._element
    }
}
