// The grammar model built by the parser and consumed by the emitter

use std::collections::HashMap;
use std::fmt;

/// How many times an element may match.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Quantifier {
    One,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl Quantifier {
    /// The suffix as written in grammar notation, empty for a plain element.
    pub fn suffix(&self) -> &'static str {
        match self {
            Quantifier::One => "",
            Quantifier::ZeroOrOne => "?",
            Quantifier::ZeroOrMore => "*",
            Quantifier::OneOrMore => "+",
        }
    }
}

/// Per-rule flag shaping how the emitted parser builds its tree. A rule
/// without a modifier contributes a node named after itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Modifier {
    /// Match but contribute nothing to the tree.
    Discard,
    /// Collapse the matched region into a single span at the call site.
    Inline,
    /// Contribute the rule's children directly to the caller's node.
    Mergeup,
}

impl Modifier {
    pub fn from_keyword(word: &str) -> Option<Modifier> {
        match word {
            "discard" => Some(Modifier::Discard),
            "inline" => Some(Modifier::Inline),
            "mergeup" => Some(Modifier::Mergeup),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Modifier::Discard => "discard",
            Modifier::Inline => "inline",
            Modifier::Mergeup => "mergeup",
        }
    }
}

#[derive(Eq, Debug, PartialEq)]
pub struct Element<'i> {
    pub kind: ElementKind<'i>,
    pub quantifier: Quantifier,
}

/// The atom of an alternate. Leaf variants keep the raw source slices so the
/// notation can be reproduced exactly.
#[derive(Eq, Debug, PartialEq)]
pub enum ElementKind<'i> {
    /// Reference to another rule by name.
    Name(&'i str),
    /// Literal string; the slice includes the surrounding quotes.
    Literal(&'i str),
    /// Bracket expression matching a single code point.
    Class(CharClass<'i>),
    /// Parenthesized sub-grammar.
    Group(Vec<Alternate<'i>>),
}

/// One branch of an alternation: a sequence of elements that must all match.
#[derive(Eq, Debug, PartialEq)]
pub struct Alternate<'i> {
    pub elements: Vec<Element<'i>>,
}

#[derive(Eq, Debug, PartialEq)]
pub struct CharClass<'i> {
    /// Leading unescaped `^`: the whole class is negated.
    pub negated: bool,
    pub ranges: Vec<ClassRange<'i>>,
}

/// A single character, or a pair forming an inclusive range. The character
/// tokens are source slices and may be escape forms.
#[derive(Eq, Debug, PartialEq)]
pub struct ClassRange<'i> {
    /// Leading unescaped `!`: this range is subtracted from the class.
    pub negated: bool,
    pub lo: &'i str,
    pub hi: Option<&'i str>,
}

#[derive(Eq, Debug, PartialEq)]
pub struct Rule<'i> {
    pub name: &'i str,
    pub modifier: Option<Modifier>,
    pub alternates: Vec<Alternate<'i>>,
}

/// Rules in the order they were parsed, with lookup by name. The first rule
/// is the root: the entry point of the grammar and of the emitted parser.
#[derive(Debug, Default)]
pub struct Grammar<'i> {
    rules: Vec<Rule<'i>>,
    index: HashMap<&'i str, usize>,
}

impl<'i> Grammar<'i> {
    pub fn new() -> Grammar<'i> {
        Grammar {
            rules: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a rule, preserving insertion order. Returns false (and leaves the
    /// grammar unchanged) if a rule with the same name is already present.
    pub fn insert(&mut self, rule: Rule<'i>) -> bool {
        if self
            .index
            .contains_key(rule.name)
        {
            return false;
        }
        self.index
            .insert(rule.name, self.rules.len());
        self.rules
            .push(rule);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index
            .contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Rule<'i>> {
        self.index
            .get(name)
            .map(|&i| &self.rules[i])
    }

    /// The first rule parsed, if any.
    pub fn root(&self) -> Option<&Rule<'i>> {
        self.rules
            .first()
    }

    pub fn len(&self) -> usize {
        self.rules
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules
            .is_empty()
    }

    /// Iterate rules in insertion order, root first.
    pub fn iter(&self) -> impl Iterator<Item = &Rule<'i>> {
        self.rules
            .iter()
    }
}

// Display implementations reproduce the grammar notation; re-parsing the
// output of Display yields a structurally equal model.

impl fmt::Display for Rule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(modifier) = self.modifier {
            write!(f, " {}", modifier.keyword())?;
        }
        write!(f, " :")?;
        format_alternates(f, &self.alternates)?;
        write!(f, " ;")
    }
}

impl fmt::Display for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ElementKind::Name(name) => write!(f, "{}", name)?,
            ElementKind::Literal(raw) => write!(f, "{}", raw)?,
            ElementKind::Class(class) => write!(f, "{}", class)?,
            ElementKind::Group(alternates) => {
                write!(f, "(")?;
                format_alternates(f, alternates)?;
                write!(f, " )")?;
            }
        }
        write!(f, "{}", self.quantifier.suffix())
    }
}

impl fmt::Display for CharClass<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        if self.negated {
            write!(f, "^")?;
        }
        for range in &self.ranges {
            if range.negated {
                write!(f, "!")?;
            }
            write!(f, "{}", range.lo)?;
            if let Some(hi) = range.hi {
                write!(f, "-{}", hi)?;
            }
        }
        write!(f, "]")
    }
}

impl fmt::Display for Alternate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self
            .elements
            .iter()
            .enumerate()
        {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

fn format_alternates(f: &mut fmt::Formatter<'_>, alternates: &[Alternate<'_>]) -> fmt::Result {
    for (i, alternate) in alternates
        .iter()
        .enumerate()
    {
        if i > 0 {
            write!(f, " |")?;
        }
        write!(f, " {}", alternate)?;
    }
    Ok(())
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn modifier_keywords() {
        assert_eq!(Modifier::from_keyword("discard"), Some(Modifier::Discard));
        assert_eq!(Modifier::from_keyword("inline"), Some(Modifier::Inline));
        assert_eq!(Modifier::from_keyword("mergeup"), Some(Modifier::Mergeup));
        assert_eq!(Modifier::from_keyword("verbatim"), None);
        assert_eq!(Modifier::from_keyword(""), None);
    }

    #[test]
    fn insertion_order_and_root() {
        let mut grammar = Grammar::new();
        assert!(grammar.insert(Rule {
            name: "top",
            modifier: None,
            alternates: vec![],
        }));
        assert!(grammar.insert(Rule {
            name: "leaf",
            modifier: None,
            alternates: vec![],
        }));

        assert_eq!(
            grammar
                .root()
                .map(|rule| rule.name),
            Some("top")
        );

        let names: Vec<&str> = grammar
            .iter()
            .map(|rule| rule.name)
            .collect();
        assert_eq!(names, vec!["top", "leaf"]);
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut grammar = Grammar::new();
        assert!(grammar.insert(Rule {
            name: "r",
            modifier: None,
            alternates: vec![],
        }));
        assert!(!grammar.insert(Rule {
            name: "r",
            modifier: Some(Modifier::Discard),
            alternates: vec![],
        }));
        assert_eq!(grammar.len(), 1);
        assert_eq!(
            grammar
                .get("r")
                .and_then(|rule| rule.modifier),
            None
        );
    }

    #[test]
    fn display_reproduces_notation() {
        let rule = Rule {
            name: "num",
            modifier: Some(Modifier::Inline),
            alternates: vec![Alternate {
                elements: vec![Element {
                    kind: ElementKind::Class(CharClass {
                        negated: false,
                        ranges: vec![ClassRange {
                            negated: false,
                            lo: "0",
                            hi: Some("9"),
                        }],
                    }),
                    quantifier: Quantifier::OneOrMore,
                }],
            }],
        };

        assert_eq!(rule.to_string(), "num inline : [0-9]+ ;");
    }

    #[test]
    fn display_groups_and_alternations() {
        let rule = Rule {
            name: "r",
            modifier: None,
            alternates: vec![
                Alternate {
                    elements: vec![
                        Element {
                            kind: ElementKind::Literal("\"a\""),
                            quantifier: Quantifier::One,
                        },
                        Element {
                            kind: ElementKind::Group(vec![
                                Alternate {
                                    elements: vec![Element {
                                        kind: ElementKind::Name("x"),
                                        quantifier: Quantifier::ZeroOrOne,
                                    }],
                                },
                                Alternate {
                                    elements: vec![Element {
                                        kind: ElementKind::Name("y"),
                                        quantifier: Quantifier::One,
                                    }],
                                },
                            ]),
                            quantifier: Quantifier::ZeroOrMore,
                        },
                    ],
                },
                Alternate {
                    elements: vec![Element {
                        kind: ElementKind::Literal("\"b\""),
                        quantifier: Quantifier::One,
                    }],
                },
            ],
        };

        assert_eq!(rule.to_string(), r#"r : "a" ( x? | y )* | "b" ;"#);
    }
}
