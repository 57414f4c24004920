//! CSS selector subset for the simulated DOM.
//!
//! Supported: type and universal selectors, `#id`, `.class`, `[attr]`,
//! `[attr=value]`, `:not(<compound>, ...)`, the descendant (whitespace) and
//! child (`>`) combinators, and comma-separated selector lists.

use super::dom::{Document, NodeId};
use crate::result::{ProbeError, ProbeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    not: Vec<Compound>,
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let el = doc.element(node);
        if let Some(tag) = &self.tag {
            if !el.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        let attrs_ok = self.attrs.iter().all(|cond| match (&cond.value, el.attr(&cond.name)) {
            (None, found) => found.is_some(),
            (Some(expected), Some(found)) => expected == found,
            (Some(_), None) => false,
        });
        attrs_ok && !self.not.iter().any(|inner| inner.matches(doc, node))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    /// Relation to the part on the left; `None` for the leftmost part
    combinator: Option<Combinator>,
    compound: Compound,
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Vec<Part>>,
}

impl Selector {
    /// Parse a selector list
    pub fn parse(source: &str) -> ProbeResult<Self> {
        let mut parser = Parser {
            chars: source.chars().collect(),
            pos: 0,
            source,
        };
        let alternatives = parser.selector_list()?;
        parser.skip_whitespace();
        if let Some(c) = parser.peek() {
            return Err(parser.error(format!("unexpected '{c}'")));
        }
        Ok(Self { alternatives })
    }

    /// Whether `node` matches any alternative
    #[must_use]
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|parts| !parts.is_empty() && matches_from(doc, node, parts, parts.len() - 1))
    }
}

/// Right-to-left match with backtracking over descendant combinators
fn matches_from(doc: &Document, node: NodeId, parts: &[Part], idx: usize) -> bool {
    let part = &parts[idx];
    if !part.compound.matches(doc, node) {
        return false;
    }
    if idx == 0 {
        return true;
    }
    match part.combinator.unwrap_or(Combinator::Descendant) {
        Combinator::Child => doc
            .parent(node)
            .is_some_and(|p| matches_from(doc, p, parts, idx - 1)),
        Combinator::Descendant => doc
            .ancestors(node)
            .any(|a| matches_from(doc, a, parts, idx - 1)),
    }
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn error(&self, message: impl Into<String>) -> ProbeError {
        ProbeError::InvalidSelector {
            selector: self.source.to_string(),
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn expect(&mut self, expected: char) -> ProbeResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    fn selector_list(&mut self) -> ProbeResult<Vec<Vec<Part>>> {
        let mut list = vec![self.complex()?];
        loop {
            self.skip_whitespace();
            if self.peek() != Some(',') {
                return Ok(list);
            }
            self.pos += 1;
            list.push(self.complex()?);
        }
    }

    fn complex(&mut self) -> ProbeResult<Vec<Part>> {
        self.skip_whitespace();
        let mut parts = vec![Part {
            combinator: None,
            compound: self.compound()?,
        }];
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                None | Some(',' | ')') => break,
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected '{c}'"))),
            };
            parts.push(Part {
                combinator: Some(combinator),
                compound: self.compound()?,
            });
        }
        Ok(parts)
    }

    fn compound(&mut self) -> ProbeResult<Compound> {
        let mut compound = Compound::default();
        let start = self.pos;
        loop {
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                }
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    let pseudo = self.ident()?;
                    if pseudo != "not" {
                        return Err(self.error(format!("unsupported pseudo-class ':{pseudo}'")));
                    }
                    self.expect('(')?;
                    loop {
                        self.skip_whitespace();
                        compound.not.push(self.compound()?);
                        self.skip_whitespace();
                        match self.bump() {
                            Some(',') => {}
                            Some(')') => break,
                            _ => return Err(self.error("unterminated :not(")),
                        }
                    }
                }
                Some(c) if self.pos == start && is_ident_char(c) => {
                    compound.tag = Some(self.ident()?.to_ascii_lowercase());
                }
                _ => break,
            }
        }
        if self.pos == start {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected a selector, found '{c}'")),
                None => self.error("expected a selector"),
            });
        }
        Ok(compound)
    }

    fn ident(&mut self) -> ProbeResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attribute(&mut self) -> ProbeResult<AttrCondition> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();
        let value = if self.peek() == Some('=') {
            self.pos += 1;
            self.skip_whitespace();
            Some(match self.peek() {
                Some(quote @ ('"' | '\'')) => {
                    self.pos += 1;
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c != quote) {
                        self.pos += 1;
                    }
                    let value: String = self.chars[start..self.pos].iter().collect();
                    self.expect(quote)?;
                    value
                }
                _ => self.ident()?,
            })
        } else {
            None
        };
        self.skip_whitespace();
        self.expect(']')?;
        Ok(AttrCondition { name, value })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::sim::dom::Element;

    struct Fixture {
        doc: Document,
        panel: NodeId,
        heading: NodeId,
        row: NodeId,
        text: NodeId,
        empty: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new();
        let panel = doc.append(
            doc.body(),
            Element::new("div").with_id("panel").with_class("panel"),
        );
        let heading = doc.append(panel, Element::new("p").with_class("panel-heading"));
        let row = doc.append(
            panel,
            Element::new("div").with_class("panel-block todo-item"),
        );
        let text = doc.append(
            row,
            Element::new("span")
                .with_class("mr-auto toggle")
                .with_attr("data-state", "open"),
        );
        let empty = doc.append(
            panel,
            Element::new("div").with_class("panel-block todo-item has-text-danger"),
        );
        Fixture {
            doc,
            panel,
            heading,
            row,
            text,
            empty,
        }
    }

    fn select(f: &Fixture, sel: &str) -> Vec<NodeId> {
        f.doc.query_all(None, &Selector::parse(sel).unwrap())
    }

    mod matching_tests {
        use super::*;

        #[test]
        fn test_id_class_and_tag() {
            let f = fixture();
            assert_eq!(select(&f, "#panel"), vec![f.panel]);
            assert_eq!(select(&f, ".panel-heading"), vec![f.heading]);
            assert_eq!(select(&f, "span"), vec![f.text]);
            assert_eq!(select(&f, "div.panel#panel"), vec![f.panel]);
        }

        #[test]
        fn test_not_excludes_danger_rows() {
            let f = fixture();
            assert_eq!(select(&f, ".todo-item"), vec![f.row, f.empty]);
            assert_eq!(select(&f, ".todo-item:not(.has-text-danger)"), vec![f.row]);
        }

        #[test]
        fn test_child_and_descendant_combinators() {
            let f = fixture();
            assert_eq!(select(&f, ".panel > .has-text-danger"), vec![f.empty]);
            assert_eq!(select(&f, "#panel .mr-auto"), vec![f.text]);
            assert!(select(&f, ".panel > .mr-auto").is_empty());
            assert_eq!(select(&f, "body .panel > .todo-item span"), vec![f.text]);
        }

        #[test]
        fn test_attributes() {
            let f = fixture();
            assert_eq!(select(&f, "[data-state]"), vec![f.text]);
            assert_eq!(select(&f, "[data-state=\"open\"]"), vec![f.text]);
            assert_eq!(select(&f, "[data-state=open]"), vec![f.text]);
            assert!(select(&f, "[data-state='closed']").is_empty());
        }

        #[test]
        fn test_selector_list() {
            let f = fixture();
            assert_eq!(select(&f, ".panel-heading, .mr-auto"), vec![f.heading, f.text]);
        }

        #[test]
        fn test_scoped_query() {
            let f = fixture();
            let sel = Selector::parse(".toggle").unwrap();
            assert_eq!(f.doc.query_all(Some(f.row), &sel), vec![f.text]);
            assert!(f.doc.query_all(Some(f.empty), &sel).is_empty());
        }
    }

    mod parse_error_tests {
        use super::*;

        #[test]
        fn test_rejects_garbage() {
            for bad in ["", ".", "#", "div >", "a:hover", "[x", ":not(.a", "a!"] {
                let err = Selector::parse(bad).unwrap_err();
                assert!(
                    matches!(err, ProbeError::InvalidSelector { .. }),
                    "{bad:?} gave {err}"
                );
            }
        }
    }
}
