//! Reference and reachability checks over a parsed grammar.
//!
//! Character class well-formedness is enforced while parsing; what remains
//! is the rule graph: every referenced name must exist, and every rule must
//! be reachable from the root.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::grammar::{Alternate, ElementKind, Grammar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError<'i> {
    UndefinedRule(&'i str),
    UnreachableRule(&'i str),
}

impl<'i> fmt::Display for CheckError<'i> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::UndefinedRule(name) => write!(f, "undefined rule '{}'", name),
            CheckError::UnreachableRule(name) => write!(f, "unreachable rule '{}'", name),
        }
    }
}

/// Walk the reference graph breadth-first from the root rule. Undefined
/// references are reported once per name; rules the walk never reaches are
/// reported afterwards, in grammar order.
pub fn check<'g, 'i>(grammar: &'g Grammar<'i>) -> Result<(), Vec<CheckError<'i>>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();

    if let Some(root) = grammar.root() {
        seen.insert(root.name);
        queue.push_back(root.name);
    }

    while let Some(name) = queue.pop_front() {
        let rule = match grammar.get(name) {
            Some(rule) => rule,
            None => {
                errors.push(CheckError::UndefinedRule(name));
                continue;
            }
        };
        for alternate in &rule.alternates {
            collect_references(alternate, &mut seen, &mut queue);
        }
    }

    for rule in grammar.iter() {
        if !seen.contains(rule.name) {
            errors.push(CheckError::UnreachableRule(rule.name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn collect_references<'i>(
    alternate: &Alternate<'i>,
    seen: &mut HashSet<&'i str>,
    queue: &mut VecDeque<&'i str>,
) {
    for element in &alternate.elements {
        match &element.kind {
            ElementKind::Name(name) => {
                if seen.insert(name) {
                    queue.push_back(name);
                }
            }
            ElementKind::Group(alternates) => {
                for alternate in alternates {
                    collect_references(alternate, seen, queue);
                }
            }
            ElementKind::Literal(_) | ElementKind::Class(_) => {}
        }
    }
}
