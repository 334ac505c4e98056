//! A character-at-a-time state machine that reads one BNF rule.
//!
//! A rule looks like `<name> ::= <ref> "text" | 'raw' <other>`. The machine
//! is fed characters until it reports [`Step::Complete`], after which the
//! rule is taken with [`RuleLexer::take_rule`]. A newline that arrives while
//! the current alternative is still empty (right after `::=` or a `|`) does
//! not end the rule, which is how definitions continue onto the next line.

use std::fmt;
use std::mem;

use crate::escape::unescape;
use crate::grammar::{Alternative, Rule, Token};
use crate::utils::{GrammarError, Result, SyntaxError};

/// Where the lexer is within a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Skipping whitespace before the rule starts
    PreSpace,
    /// Inside a `#` comment line
    Comment,
    /// Between `<` and `>` of the rule name
    Name,
    /// Between the rule name and `::=`
    NameSpace,
    /// Saw the first `:`
    Colon,
    /// Saw `::`
    Equal,
    /// Between tokens of an alternative
    ExprSpace,
    /// Inside a `<...>` reference
    ExprToken,
    /// Inside a `"..."` literal
    ExprStr,
    /// Right after a backslash in a `"..."` literal
    ExprStrEscaped,
    /// Inside a `'...'` literal
    ExprRaw,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            State::PreSpace => "start of rule",
            State::Comment => "comment",
            State::Name => "rule name",
            State::NameSpace => "space after rule name",
            State::Colon | State::Equal => "'::='",
            State::ExprSpace => "expression",
            State::ExprToken => "rule reference",
            State::ExprStr => "string literal",
            State::ExprStrEscaped => "string escape",
            State::ExprRaw => "raw literal",
        };
        f.write_str(what)
    }
}

/// Outcome of feeding one character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The rule is not finished yet
    Continue,
    /// The line was blank or a comment; no rule was produced
    Blank,
    /// A full rule was read and can be taken
    Complete,
}

#[derive(Debug)]
pub struct RuleLexer {
    state: State,
    line: usize,
    content_line: usize,
    /// Line of the dangling `|` or `::=` the current alternative continues from
    open_line: Option<usize>,
    name: String,
    alternatives: Vec<Alternative>,
    current: Vec<Token>,
    buf: String,
}

impl RuleLexer {
    /// Create a lexer whose first character sits on the given 1-based line
    pub fn new(line: usize) -> Self {
        RuleLexer {
            state: State::PreSpace,
            line,
            content_line: line,
            open_line: None,
            name: String::new(),
            alternatives: Vec::new(),
            current: Vec::new(),
            buf: String::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The line of the next character to be fed
    pub fn line(&self) -> usize {
        self.line
    }

    /// Feed the next character of the input.
    ///
    /// Errors carry the line of the offending character, unless the current
    /// alternative was continued from an earlier line, in which case they
    /// carry the line that left the rule open.
    pub fn feed(&mut self, ch: char) -> Result<Step> {
        if !ch.is_whitespace() {
            self.content_line = self.line;
        }
        let step = self.transition(ch).map_err(|cause| GrammarError::Syntax {
            line: self.open_line.unwrap_or(self.line),
            cause,
        })?;
        if ch == '\n' {
            self.line += 1;
        }
        Ok(step)
    }

    /// Signal the end of input.
    ///
    /// Returns `None` when nothing but whitespace and comments was seen,
    /// meaning the stream is exhausted. Otherwise the input is treated as if
    /// it ended with a newline, and a rule that is still incomplete after it
    /// is an unexpected end of input.
    pub fn finish(&mut self) -> Result<Option<Rule>> {
        if matches!(self.state, State::PreSpace | State::Comment) {
            return Ok(None);
        }
        let content_line = self.content_line;
        match self.feed('\n')? {
            Step::Complete => Ok(Some(self.take_rule())),
            _ => Err(GrammarError::Syntax {
                line: self.open_line.unwrap_or(content_line),
                cause: SyntaxError::UnexpectedEof,
            }),
        }
    }

    /// Take the completed rule, leaving the lexer ready for a new one
    pub fn take_rule(&mut self) -> Rule {
        self.state = State::PreSpace;
        self.buf.clear();
        self.current.clear();
        self.open_line = None;
        Rule::new(mem::take(&mut self.name), mem::take(&mut self.alternatives))
    }

    fn close_alternative(&mut self) {
        self.open_line = None;
        let tokens = mem::take(&mut self.current);
        self.alternatives.push(Alternative::new(tokens));
    }

    fn transition(&mut self, ch: char) -> std::result::Result<Step, SyntaxError> {
        use State::*;

        match self.state {
            PreSpace => match ch {
                '\n' => return Ok(Step::Blank),
                '#' => self.state = Comment,
                '<' => self.state = Name,
                c if c.is_whitespace() => {}
                c => {
                    return Err(SyntaxError::Expected {
                        expected: '<',
                        found: c,
                        state: PreSpace,
                    });
                }
            },
            Comment => {
                if ch == '\n' {
                    self.state = PreSpace;
                    return Ok(Step::Blank);
                }
            }
            Name => match ch {
                '>' if self.name.is_empty() => return Err(SyntaxError::EmptyName),
                '>' => self.state = NameSpace,
                '\n' => return Err(SyntaxError::Unexpected { found: ch, state: Name }),
                c => self.name.push(c),
            },
            NameSpace => match ch {
                ':' => self.state = Colon,
                c if c.is_whitespace() => {}
                c => {
                    return Err(SyntaxError::Expected {
                        expected: ':',
                        found: c,
                        state: NameSpace,
                    });
                }
            },
            Colon => {
                if ch != ':' {
                    return Err(SyntaxError::Expected {
                        expected: ':',
                        found: ch,
                        state: Colon,
                    });
                }
                self.state = Equal;
            }
            Equal => {
                if ch != '=' {
                    return Err(SyntaxError::Expected {
                        expected: '=',
                        found: ch,
                        state: Equal,
                    });
                }
                self.state = ExprSpace;
            }
            ExprSpace => match ch {
                '\n' if !self.current.is_empty() => {
                    self.close_alternative();
                    return Ok(Step::Complete);
                }
                '\n' => {
                    self.open_line.get_or_insert(self.content_line);
                }
                '|' if self.current.is_empty() => return Err(SyntaxError::EmptyOption),
                '|' => self.close_alternative(),
                '"' => self.state = ExprStr,
                '\'' => self.state = ExprRaw,
                '<' => self.state = ExprToken,
                c if c.is_whitespace() => {}
                c => return Err(SyntaxError::Unexpected { found: c, state: ExprSpace }),
            },
            ExprToken => match ch {
                '>' if self.buf.is_empty() => return Err(SyntaxError::EmptyReference),
                '>' => {
                    self.current.push(Token::RuleRef(mem::take(&mut self.buf)));
                    self.state = ExprSpace;
                }
                '\n' => return Err(SyntaxError::Unexpected { found: ch, state: ExprToken }),
                c => self.buf.push(c),
            },
            ExprStr => match ch {
                '"' => {
                    let text = unescape(&self.buf)?;
                    self.buf.clear();
                    self.current.push(Token::Literal(text));
                    self.state = ExprSpace;
                }
                '\n' => return Err(SyntaxError::NewlineInLiteral),
                '\\' => {
                    self.buf.push(ch);
                    self.state = ExprStrEscaped;
                }
                c => self.buf.push(c),
            },
            ExprStrEscaped => {
                if ch == '\n' {
                    return Err(SyntaxError::NewlineInLiteral);
                }
                self.buf.push(ch);
                self.state = ExprStr;
            }
            ExprRaw => match ch {
                '\'' => {
                    self.current.push(Token::Literal(mem::take(&mut self.buf)));
                    self.state = ExprSpace;
                }
                '\n' => return Err(SyntaxError::NewlineInLiteral),
                c => self.buf.push(c),
            },
        }

        Ok(Step::Continue)
    }
}
