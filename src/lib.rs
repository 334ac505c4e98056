//! bnf-sample reads grammars written in a line-oriented BNF notation and
//! generates random strings from them.
//!
//! A grammar is a list of rules, one per line:
//!
//! ```text
//! <greeting> ::= "Hello, " <subject> "!" | 'Hi'
//! <subject>  ::= "world" |
//!                "Rust programmers"
//! ```
//!
//! Tokens are `<rule>` references, double-quoted literals with backslash
//! escapes, or single-quoted raw literals. A line ending in `|` continues on
//! the next line. Blank lines and lines starting with `#` are skipped.
//!
//! # Example
//!
//! ```rust
//! use bnf_sample::{Grammar, sample};
//!
//! let grammar: Grammar = r#"
//! <greeting> ::= "Hello, " <subject>
//! <subject> ::= "world" | "Rust"
//! "#
//! .parse()
//! .unwrap();
//!
//! let text = sample(&grammar, "greeting").unwrap();
//! assert!(text == "Hello, world" || text == "Hello, Rust");
//! ```

pub mod escape;
pub mod grammar;
pub mod lexer;
pub mod reader;
pub mod sampler;
pub mod utils;

pub use grammar::{Alternative, Grammar, GrammarBuilder, Rule, Token};
pub use reader::{read_grammar, read_rule};
pub use sampler::{Sampler, SamplerConfig, sample, sample_first};
pub use utils::{GrammarError, ReadError, Result, SyntaxError};
