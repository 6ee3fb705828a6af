//! Selector matching for the in-memory document.
//!
//! Parsing and matching are done by servo's `selectors` crate using the
//! selector implementation from `scraper`; [`ElementRef`] adapts a
//! [`Document`] node to the crate's `Element` trait.

use super::{Document, Dom, NodeId};
use crate::error::{DialogError, DialogResult};
use cssparser::{Parser as CssParser, ParserInput};
use scraper::error::SelectorErrorKind;
use scraper::selector::{CssLocalName, NonTSPseudoClass, PseudoElement, Simple};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::{self, ElementSelectorFlags, MatchingContext};
use selectors::parser::{self, ParseRelative, SelectorImpl, SelectorParseErrorKind};
use selectors::{Element, OpaqueElement};
use std::str::FromStr;

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone)]
pub struct SelectorList {
    source: String,
    selectors: parser::SelectorList<Simple>,
}

struct SelectorParser;

impl<'i> parser::Parser<'i> for SelectorParser {
    type Impl = Simple;
    type Error = SelectorParseErrorKind<'i>;
}

impl SelectorList {
    /// Parse a selector list.
    pub fn parse(source: &str) -> DialogResult<Self> {
        let mut input = ParserInput::new(source);
        let mut css = CssParser::new(&mut input);
        let selectors = parser::SelectorList::parse(&SelectorParser, &mut css, ParseRelative::No)
            .map_err(|err| DialogError::InvalidSelector {
                selector: source.to_string(),
                reason: SelectorErrorKind::from(err).to_string(),
            })?;
        Ok(Self {
            source: source.to_string(),
            selectors,
        })
    }

    /// The selector text this list was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `node` is an element matching any selector in the list.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(element) = ElementRef::wrap(doc, node) else {
            return false;
        };
        let mut nth_index_cache = Default::default();
        let mut context = MatchingContext::new(
            matching::MatchingMode::Normal,
            None,
            &mut nth_index_cache,
            matching::QuirksMode::NoQuirks,
            matching::NeedsSelectorFlags::No,
            matching::IgnoreNthChildForInvalidation::No,
        );
        matching::matches_selector_list(&self.selectors, &element, &mut context)
    }
}

impl FromStr for SelectorList {
    type Err = DialogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An element of a [`Document`], as seen by the selector matcher.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> ElementRef<'a> {
    /// `None` unless `id` is a live element.
    pub(crate) fn wrap(doc: &'a Document, id: NodeId) -> Option<Self> {
        doc.is_element(id).then_some(Self { doc, id })
    }

    fn siblings(&self) -> &'a [NodeId] {
        match self.doc.parent(self.id) {
            Some(parent) => self.doc.children(parent),
            None => &[],
        }
    }

    fn position(&self) -> Option<usize> {
        self.siblings().iter().position(|id| *id == self.id)
    }
}

impl Element for ElementRef<'_> {
    type Impl = Simple;

    fn opaque(&self) -> OpaqueElement {
        self.doc
            .opaque(self.id)
            .unwrap_or_else(|| OpaqueElement::new(self.doc))
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.doc.parent(self.id)?;
        Self::wrap(self.doc, parent)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let position = self.position()?;
        self.siblings()[..position]
            .iter()
            .rev()
            .find_map(|id| Self::wrap(self.doc, *id))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let position = self.position()?;
        self.siblings()[position + 1..]
            .iter()
            .find_map(|id| Self::wrap(self.doc, *id))
    }

    fn first_element_child(&self) -> Option<Self> {
        self.doc
            .children(self.id)
            .iter()
            .find_map(|id| Self::wrap(self.doc, *id))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &<Simple as SelectorImpl>::BorrowedLocalName) -> bool {
        let name: &str = &local_name.0;
        self.doc.tag_name(self.id).as_deref() == Some(name)
    }

    fn has_namespace(&self, ns: &<Simple as SelectorImpl>::BorrowedNamespaceUrl) -> bool {
        let ns: &str = ns;
        ns == "http://www.w3.org/1999/xhtml"
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.doc.tag_name(self.id) == other.doc.tag_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&<Simple as SelectorImpl>::NamespaceUrl>,
        local_name: &<Simple as SelectorImpl>::LocalName,
        operation: &AttrSelectorOperation<&<Simple as SelectorImpl>::AttrValue>,
    ) -> bool {
        if let NamespaceConstraint::Specific(url) = ns {
            if !url.is_empty() {
                return false;
            }
        }
        let name: &str = &local_name.0;
        self.doc
            .attribute(self.id, name)
            .is_some_and(|value| operation.eval_str(&value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        _pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        false
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        false
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        false
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.doc
            .attribute(self.id, "id")
            .is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.doc
            .classes(self.id)
            .iter()
            .any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.doc.children(self.id).iter().all(|child| {
            !self.doc.is_element(*child) && self.doc.text(*child).is_none_or(str::is_empty)
        })
    }

    fn is_root(&self) -> bool {
        self.doc.parent(self.id).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors() {
        for bad in ["", "  ", ".", "#", "div,", "a > ", "a >> b", "[=x]", "div:nope"] {
            let result = SelectorList::parse(bad);
            assert!(
                matches!(result, Err(DialogError::InvalidSelector { .. })),
                "{:?} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_compound_matching() {
        let mut doc = Document::new();
        let body = doc.body_element();
        let div = doc.create_element(body, "div").unwrap();
        doc.set_attribute(div, "id", "confirm");
        doc.set_attribute(div, "data-dialog", "");
        doc.add_class(div, "dialog");
        doc.add_class(div, "wide");

        let hit = |s: &str| SelectorList::parse(s).unwrap().matches(&doc, div);
        assert!(hit("div"));
        assert!(hit("*"));
        assert!(hit("#confirm"));
        assert!(hit(".dialog.wide"));
        assert!(hit("div#confirm.dialog[data-dialog]"));
        assert!(hit("[id=confirm]"));
        assert!(hit("[id='confirm']"));
        assert!(hit("[class~=wide]"));
        assert!(!hit("span"));
        assert!(!hit(".dialog.narrow"));
        assert!(!hit("[data-dialog-target]"));
        assert!(hit("span, .wide"));
    }

    #[test]
    fn test_combinators() {
        let mut doc = Document::new();
        let body = doc.body_element();
        let section = doc.create_element(body, "section").unwrap();
        doc.add_class(section, "page");
        let wrapper = doc.create_element(section, "div").unwrap();
        let button = doc.create_element(wrapper, "button").unwrap();

        let hit = |s: &str| SelectorList::parse(s).unwrap().matches(&doc, button);
        assert!(hit(".page button"));
        assert!(hit("body .page div > button"));
        assert!(hit("div>button"));
        assert!(hit("html > body button"));
        assert!(!hit(".page > button"));
        assert!(!hit("button .page"));
    }

    #[test]
    fn test_siblings_and_structure() {
        let mut doc = Document::new();
        let body = doc.body_element();
        let header = doc.create_element(body, "header").unwrap();
        doc.create_text(body, "between").unwrap();
        let dialog = doc.create_element(body, "div").unwrap();
        let empty = doc.create_element(dialog, "span").unwrap();

        let hit = |s: &str, node| SelectorList::parse(s).unwrap().matches(&doc, node);
        assert!(hit("header + div", dialog));
        assert!(hit("header ~ div", dialog));
        assert!(hit(":first-child", header));
        assert!(!hit(":first-child", dialog));
        assert!(hit("div:not(.open)", dialog));
        assert!(hit("span:empty", empty));
        assert!(!hit("div:empty", dialog));
        assert!(hit(":root", doc.document_element()));
    }

    #[test]
    fn test_text_nodes_never_match() {
        let mut doc = Document::new();
        let body = doc.body_element();
        let text = doc.create_text(body, "hello").unwrap();
        assert!(!SelectorList::parse("*").unwrap().matches(&doc, text));
        assert!(ElementRef::wrap(&doc, text).is_none());
    }
}
