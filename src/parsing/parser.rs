use tracing::debug;

use crate::grammar::*;
use crate::parsing::decode::{decode_any, utf8_decode};

/// Characters that must be backslash-escaped inside a character class.
const RESERVED: &[u8] = b"!-[\\]^";

/// Characters accepted after a backslash, besides the u/U unicode forms.
const ESCAPES: &[u8] = b"!\"-[\\]^abfnrtv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsingError<'i> {
    Expected(usize, &'static str),
    EmptyGrammar(usize),
    DuplicateRule(usize, &'i str),
    InvalidModifier(usize, &'i str),
    TrailingBar(usize),
    InvalidRange(usize, &'i str, &'i str),
    ReservedCharacter(usize, char),
}

impl<'i> ParsingError<'i> {
    pub fn offset(&self) -> usize {
        match self {
            ParsingError::Expected(offset, _) => *offset,
            ParsingError::EmptyGrammar(offset) => *offset,
            ParsingError::DuplicateRule(offset, _) => *offset,
            ParsingError::InvalidModifier(offset, _) => *offset,
            ParsingError::TrailingBar(offset) => *offset,
            ParsingError::InvalidRange(offset, _, _) => *offset,
            ParsingError::ReservedCharacter(offset, _) => *offset,
        }
    }

    pub fn message(&self) -> (String, String) {
        match self {
            ParsingError::Expected(_, value) => (
                format!("Expected {}", value),
                format!(
                    "The parser was looking for {} but found something else.",
                    value
                ),
            ),
            ParsingError::EmptyGrammar(_) => (
                "Empty grammar".to_string(),
                "A grammar must define at least one rule. The first rule is the \
                 entry point of the generated parser."
                    .to_string(),
            ),
            ParsingError::DuplicateRule(_, name) => (
                format!("duplicate rule name '{}'", name),
                r#"
Every rule in a grammar must have a distinct name. Merge the bodies into a
single rule using alternation instead:

    value : number | string ;
                "#
                .trim_ascii()
                .to_string(),
            ),
            ParsingError::InvalidModifier(_, word) => (
                format!("Invalid rule modifier '{}'", word),
                r#"
The only modifiers allowed between a rule's name and the ':' are:

    discard     match but add nothing to the syntax tree
    inline      collapse the matched region into a single node
    mergeup     hoist the rule's children into the caller's node
                "#
                .trim_ascii()
                .to_string(),
            ),
            ParsingError::TrailingBar(_) => (
                "Trailing '|'".to_string(),
                "Each '|' must be followed by another alternate. Remove the \
                 final '|' or add the missing alternate."
                    .to_string(),
            ),
            ParsingError::InvalidRange(_, lo, hi) => (
                format!("invalid range [{}-{}]: '{}' is not < '{}'", lo, hi, lo, hi),
                "In a character class range the first character must decode to \
                 a strictly smaller code point than the second."
                    .to_string(),
            ),
            ParsingError::ReservedCharacter(_, ch) => (
                format!("Reserved character '{}'", ch),
                r#"
The characters

    ! - [ \ ] ^

have special meaning inside a character class and must be backslash-escaped
to be matched literally, as in [\!\-] or [a\^].
                "#
                .trim_ascii()
                .to_string(),
            ),
        }
    }
}

/// The parser's position: byte offset plus the 1-based line and column kept
/// alongside it. Copied on save, assigned back on restore; never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub pos: usize,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug)]
pub struct Parser<'i> {
    source: &'i str,
    pos: usize,
    line: u32,
    col: u32,
}

impl<'i> Parser<'i> {
    pub fn new(content: &'i str) -> Parser<'i> {
        Parser {
            source: content,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    /// rules : ws (comment ws)* rule+ ;
    pub fn parse_grammar(&mut self) -> Result<Grammar<'i>, ParsingError<'i>> {
        debug!("parsing grammar, {} bytes", self.source.len());

        let mut grammar = Grammar::new();

        self.take_whitespace();
        self.take_comments();

        while !self.is_finished() {
            self.read_rule(&mut grammar)?;
        }

        if grammar.is_empty() {
            return Err(ParsingError::EmptyGrammar(self.pos));
        }

        debug!("parsed {} rules", grammar.len());
        Ok(grammar)
    }

    /// rule : ws id ws (discard|inline|mergeup)? ws ":" ws alts ws ";" ws (comment ws)* ;
    pub fn read_rule(&mut self, grammar: &mut Grammar<'i>) -> Result<(), ParsingError<'i>> {
        self.take_whitespace();

        let start = self.pos;
        let name = match self.take_identifier() {
            Some(name) => name,
            None => return Err(ParsingError::Expected(self.pos, "a rule name")),
        };

        // the first rule parsed is the root of the grammar
        if grammar.contains(name) {
            return Err(ParsingError::DuplicateRule(start, name));
        }

        self.take_whitespace();

        let mut modifier = None;
        let saved = self.checkpoint();
        if let Some(word) = self.take_identifier() {
            match Modifier::from_keyword(word) {
                Some(found) => modifier = Some(found),
                None => return Err(ParsingError::InvalidModifier(saved.pos, word)),
            }
            self.take_whitespace();
        }

        self.require(b':', "':' after the rule name")?;
        self.take_whitespace();

        let alternates = match self.read_alternates()? {
            Some(alternates) => alternates,
            None => return Err(ParsingError::Expected(self.pos, "at least one alternate")),
        };

        self.take_whitespace();
        self.require(b';', "';' closing the rule")?;

        grammar.insert(Rule {
            name,
            modifier,
            alternates,
        });

        self.take_whitespace();
        self.take_comments();
        Ok(())
    }

    /// alts : alt (ws "|" ws alt)* ;
    pub fn read_alternates(&mut self) -> Result<Option<Vec<Alternate<'i>>>, ParsingError<'i>> {
        let mut alternates = Vec::new();
        loop {
            match self.read_alternate()? {
                Some(alternate) => alternates.push(alternate),
                None if alternates.is_empty() => return Ok(None),
                None => return Err(ParsingError::TrailingBar(self.pos)),
            }

            self.take_whitespace();
            if self.current() == Some(b'|') {
                self.step();
                self.take_whitespace();
                continue;
            }
            break;
        }
        Ok(Some(alternates))
    }

    /// alt : elem (ws elem)* ;
    fn read_alternate(&mut self) -> Result<Option<Alternate<'i>>, ParsingError<'i>> {
        let mut elements = Vec::new();
        while let Some(element) = self.read_element()? {
            elements.push(element);
            self.take_whitespace();
        }
        if elements.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Alternate { elements }))
        }
    }

    /// elem : (group | id | ch_class | string) [?*+]? ;
    pub fn read_element(&mut self) -> Result<Option<Element<'i>>, ParsingError<'i>> {
        let kind = if let Some(alternates) = self.read_group()? {
            ElementKind::Group(alternates)
        } else if let Some(name) = self.take_identifier() {
            ElementKind::Name(name)
        } else if let Some(class) = self.read_class()? {
            ElementKind::Class(class)
        } else if let Some(raw) = self.take_string() {
            ElementKind::Literal(raw)
        } else {
            return Ok(None);
        };

        self.take_whitespace();
        let quantifier = match self.current() {
            Some(b'?') => {
                self.step();
                Quantifier::ZeroOrOne
            }
            Some(b'*') => {
                self.step();
                Quantifier::ZeroOrMore
            }
            Some(b'+') => {
                self.step();
                Quantifier::OneOrMore
            }
            _ => Quantifier::One,
        };

        Ok(Some(Element { kind, quantifier }))
    }

    /// group : "(" ws alts ws ")" ;
    fn read_group(&mut self) -> Result<Option<Vec<Alternate<'i>>>, ParsingError<'i>> {
        if self.current() != Some(b'(') {
            return Ok(None);
        }
        let saved = self.checkpoint();
        self.step();
        self.take_whitespace();

        let alternates = match self.read_alternates()? {
            Some(alternates) => alternates,
            None => {
                self.restore(saved);
                return Ok(None);
            }
        };

        self.take_whitespace();
        if self.current() != Some(b')') {
            self.restore(saved);
            return Ok(None);
        }
        self.step();
        Ok(Some(alternates))
    }

    /// string : "\"" char* "\"" ;
    ///
    /// A backslash escapes exactly one byte, which is carried into the
    /// literal verbatim. The returned slice keeps the surrounding quotes.
    pub fn take_string(&mut self) -> Option<&'i str> {
        if self.current() != Some(b'"') {
            return None;
        }
        let saved = self.checkpoint();
        self.step();

        let mut escaped = false;
        while let Some(byte) = self.current() {
            if byte < 0x20 {
                break;
            }
            if escaped {
                escaped = false;
                self.step();
                continue;
            }
            match byte {
                b'\\' => {
                    escaped = true;
                    self.step();
                }
                b'"' => {
                    self.step();
                    return Some(&self.source[saved.pos..self.pos]);
                }
                _ => self.step(),
            }
        }

        // ran off the end (or into a control character) without a close quote
        self.restore(saved);
        None
    }

    /// ch_class : "[" "^"? ("!"? ch_class_range)+ "]" ;
    pub fn read_class(&mut self) -> Result<Option<CharClass<'i>>, ParsingError<'i>> {
        if self.current() != Some(b'[') {
            return Ok(None);
        }
        let saved = self.checkpoint();
        self.step();

        let mut negated = false;
        if self.current() == Some(b'^') {
            negated = true;
            self.step();
        }

        let mut ranges = Vec::new();
        match self.read_class_range()? {
            Some(range) => ranges.push(range),
            None => {
                self.restore(saved);
                return Ok(None);
            }
        }
        loop {
            if self.current() == Some(b']') {
                break;
            }
            let mark = self.checkpoint();
            match self.read_class_range()? {
                Some(range) => ranges.push(range),
                None => {
                    self.restore(mark);
                    break;
                }
            }
        }

        if self.current() != Some(b']') {
            self.restore(saved);
            return Ok(None);
        }
        self.step();
        Ok(Some(CharClass { negated, ranges }))
    }

    /// ch_class_range : "!"? char ("-" char)? ;
    fn read_class_range(&mut self) -> Result<Option<ClassRange<'i>>, ParsingError<'i>> {
        let saved = self.checkpoint();

        let mut negated = false;
        if self.current() == Some(b'!') {
            negated = true;
            self.step();
        }

        let lo = match self.read_class_char()? {
            Some(token) => token,
            None => {
                self.restore(saved);
                return Ok(None);
            }
        };

        if self.current() != Some(b'-') {
            return Ok(Some(ClassRange {
                negated,
                lo,
                hi: None,
            }));
        }
        self.step();

        // cannot end with a trailing '-'
        if self.current() == Some(b']') {
            self.restore(saved);
            return Ok(None);
        }

        let hi = match self.read_class_char()? {
            Some(token) => token,
            None => {
                self.restore(saved);
                return Ok(None);
            }
        };

        if let (Some((low, _)), Some((high, _))) = (decode_any(lo), decode_any(hi)) {
            if low >= high {
                return Err(ParsingError::InvalidRange(saved.pos, lo, hi));
            }
        }

        Ok(Some(ClassRange {
            negated,
            lo,
            hi: Some(hi),
        }))
    }

    /// char : one code point, as a raw UTF-8 sequence or an escape form
    fn read_class_char(&mut self) -> Result<Option<&'i str>, ParsingError<'i>> {
        let start = self.pos;
        let byte = match self.current() {
            Some(byte) => byte,
            None => return Ok(None),
        };
        if byte < 0x20 {
            return Ok(None);
        }

        if byte == b'\\' {
            let rest = &self.source.as_bytes()[self.pos..];
            let next = match rest.get(1) {
                Some(&next) => next,
                None => return Ok(None),
            };
            let length = if ESCAPES.contains(&next) {
                2
            } else if next == b'u' && hex_run(rest, 2, 4) {
                6
            } else if next == b'U' && rest.get(2..4) == Some(b"00".as_slice()) && hex_run(rest, 4, 6)
            {
                10
            } else {
                return Ok(None);
            };
            let token = &self.source[start..start + length];
            // the escape must also decode to a valid code point
            if decode_any(token).is_none() {
                return Ok(None);
            }
            self.advance(length);
            return Ok(Some(token));
        }

        if byte < 0x80 {
            if RESERVED.contains(&byte) {
                // a closing bracket just ends the class; the rest are errors
                if byte == b']' {
                    return Ok(None);
                }
                return Err(ParsingError::ReservedCharacter(self.pos, byte as char));
            }
            self.step();
            return Ok(Some(&self.source[start..self.pos]));
        }

        match utf8_decode(&self.source.as_bytes()[self.pos..]) {
            Some((_, length)) => {
                self.advance(length);
                Ok(Some(&self.source[start..self.pos]))
            }
            None => Ok(None),
        }
    }

    /// id : [A-Za-z][0-9A-Za-z_]* ;
    pub fn take_identifier(&mut self) -> Option<&'i str> {
        let start = self.pos;
        match self.current() {
            Some(byte) if byte.is_ascii_alphabetic() => self.step(),
            _ => return None,
        }
        while let Some(byte) = self.current() {
            if byte == b'_' || byte.is_ascii_alphanumeric() {
                self.step();
            } else {
                break;
            }
        }
        Some(&self.source[start..self.pos])
    }

    /// ws : [ \t\r\n]* ;
    pub fn take_whitespace(&mut self) {
        while let Some(byte) = self.current() {
            match byte {
                b' ' | b'\t' | b'\r' | b'\n' => self.step(),
                _ => break,
            }
        }
    }

    /// comment : "#" running to end of line ; repeated, whitespace between
    pub fn take_comments(&mut self) {
        while self.current() == Some(b'#') {
            while let Some(byte) = self.current() {
                if byte == b'\r' || byte == b'\n' {
                    break;
                }
                self.step();
            }
            self.take_whitespace();
        }
    }

    fn require(&mut self, byte: u8, label: &'static str) -> Result<(), ParsingError<'i>> {
        if self.current() == Some(byte) {
            self.step();
            Ok(())
        } else {
            Err(ParsingError::Expected(self.pos, label))
        }
    }

    fn checkpoint(&self) -> Cursor {
        Cursor {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    fn restore(&mut self, saved: Cursor) {
        self.pos = saved.pos;
        self.line = saved.line;
        self.col = saved.col;
    }

    fn is_finished(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn current(&self) -> Option<u8> {
        self.source
            .as_bytes()
            .get(self.pos)
            .copied()
    }

    /// Advance one byte. Newlines bump the line and reset the column; a
    /// carriage return is consumed without advancing the column.
    fn step(&mut self) {
        let byte = self.source.as_bytes()[self.pos];
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if byte != b'\r' {
            self.col += 1;
        }
    }

    fn advance(&mut self, count: usize) {
        for _ in 0..count {
            self.step();
        }
    }
}

/// True when `count` hex digits start at `from` in `bytes`.
fn hex_run(bytes: &[u8], from: usize, count: usize) -> bool {
    match bytes.get(from..from + count) {
        Some(run) => run
            .iter()
            .all(|byte| byte.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn cursor_restored_on_failed_string() {
        let mut input = Parser::new("\"never closed");
        let before = (input.pos(), input.line(), input.col());
        assert_eq!(input.take_string(), None);
        assert_eq!((input.pos(), input.line(), input.col()), before);
    }

    #[test]
    fn cursor_restored_on_failed_class() {
        let mut input = Parser::new("[a-z");
        let before = (input.pos(), input.line(), input.col());
        assert_eq!(input.read_class(), Ok(None));
        assert_eq!((input.pos(), input.line(), input.col()), before);
    }

    #[test]
    fn line_and_column_tracking() {
        let mut input = Parser::new("ab\r\ncd : ;");
        input.take_identifier();
        assert_eq!((input.line(), input.col()), (1, 3));
        input.take_whitespace();
        // the \r does not advance the column, the \n starts line 2
        assert_eq!((input.line(), input.col()), (2, 1));
        input.take_identifier();
        assert_eq!((input.line(), input.col()), (2, 3));
    }

    #[test]
    fn comments_are_skipped() {
        let mut input = Parser::new("# heading\n  # another\nword");
        input.take_whitespace();
        input.take_comments();
        assert_eq!(input.take_identifier(), Some("word"));
    }
}
