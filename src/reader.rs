use std::borrow::Cow;
use std::io::{self, BufRead, BufReader, Read};

use log::{debug, warn};

use crate::grammar::{Grammar, Rule};
use crate::lexer::{RuleLexer, Step};
use crate::utils::{ReadError, Result};

/// Decodes a buffered reader into characters, one line at a time.
///
/// Invalid UTF-8 is replaced with U+FFFD rather than failing the read.
#[derive(Debug)]
pub struct CharSource<R> {
    inner: R,
    bytes: Vec<u8>,
    line: String,
    pos: usize,
}

impl<R: BufRead> CharSource<R> {
    pub fn new(inner: R) -> Self {
        CharSource {
            inner,
            bytes: Vec::new(),
            line: String::new(),
            pos: 0,
        }
    }
}

impl<R: BufRead> Iterator for CharSource<R> {
    type Item = io::Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.line.len() {
            self.bytes.clear();
            self.line.clear();
            self.pos = 0;
            match self.inner.read_until(b'\n', &mut self.bytes) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => return Some(Err(err)),
            }
            self.line = match String::from_utf8_lossy(&self.bytes) {
                Cow::Borrowed(text) => text.to_string(),
                Cow::Owned(text) => {
                    warn!("replaced invalid UTF-8 in {:?}", text.trim_end());
                    text
                }
            };
        }
        let ch = self.line[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(Ok(ch))
    }
}

/// The result of reading a single rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleRead {
    Rule(Rule),
    /// A blank or comment line
    Blank,
    /// Only whitespace remained before the end of input
    Eof,
}

/// Read the next rule, starting at the given 1-based line.
///
/// Also returns the number of lines consumed so the caller can keep count.
pub fn read_rule<R: BufRead>(source: &mut CharSource<R>, line: usize) -> Result<(RuleRead, usize)> {
    let mut lexer = RuleLexer::new(line);

    for ch in source.by_ref() {
        match lexer.feed(ch?)? {
            Step::Continue => {}
            Step::Blank => return Ok((RuleRead::Blank, lexer.line() - line)),
            Step::Complete => {
                let rule = lexer.take_rule();
                return Ok((RuleRead::Rule(rule), lexer.line() - line));
            }
        }
    }

    let read = match lexer.finish()? {
        Some(rule) => RuleRead::Rule(rule),
        None => RuleRead::Eof,
    };
    Ok((read, lexer.line() - line))
}

/// Read an entire grammar until the end of input.
///
/// Rule references are not checked; a rule may be referenced but never
/// defined. On failure the rules read so far are returned along with the
/// error.
pub fn read_grammar<R: Read>(reader: R) -> std::result::Result<Grammar, ReadError> {
    let mut source = CharSource::new(BufReader::new(reader));
    let mut grammar = Grammar::new();
    let mut line = 1;

    loop {
        match read_rule(&mut source, line) {
            Ok((RuleRead::Eof, _)) => {
                debug!("read {} rules over {} lines", grammar.len(), line - 1);
                return Ok(grammar);
            }
            Ok((RuleRead::Blank, consumed)) => line += consumed,
            Ok((RuleRead::Rule(rule), consumed)) => {
                if grammar.has_rule(&rule.name) {
                    debug!(
                        "rule <{}> at line {} is shadowed by an earlier definition",
                        rule.name, line
                    );
                }
                debug!(
                    "read rule <{}> with {} alternatives",
                    rule.name,
                    rule.alternatives.len()
                );
                line += consumed;
                grammar.push(rule);
            }
            Err(error) => {
                debug!("stopped reading grammar after {} rules: {}", grammar.len(), error);
                return Err(ReadError {
                    error,
                    partial: grammar,
                });
            }
        }
    }
}
