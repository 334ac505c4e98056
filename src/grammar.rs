use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::escape::escape;
use crate::reader::read_grammar;
use crate::utils::{GrammarError, Result};

/// A single token in an alternative, either a rule reference or literal text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    /// A reference to another rule by name
    RuleRef(String),
    /// Raw text emitted verbatim
    Literal(String),
}

impl Token {
    pub fn rule_ref(name: impl Into<String>) -> Self {
        Token::RuleRef(name.into())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Token::Literal(text.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::RuleRef(name) => write!(f, "<{}>", name),
            Token::Literal(text) => write!(f, "\"{}\"", escape(text)),
        }
    }
}

/// One way of expanding a rule: its tokens are concatenated in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alternative {
    pub tokens: Vec<Token>,
}

impl Alternative {
    pub fn new(tokens: Vec<Token>) -> Self {
        Alternative { tokens }
    }
}

impl From<Vec<Token>> for Alternative {
    fn from(tokens: Vec<Token>) -> Self {
        Alternative::new(tokens)
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

/// A named rule with its alternatives, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub alternatives: Vec<Alternative>,
}

impl Rule {
    pub fn new(name: impl Into<String>, alternatives: Vec<Alternative>) -> Self {
        Rule {
            name: name.into(),
            alternatives,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> ::= ", self.name)?;
        for (i, alt) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", alt)?;
        }
        Ok(())
    }
}

/// An ordered list of rules.
///
/// Rule names need not be unique. Lookups return the first rule with a
/// matching name, so later definitions are shadowed. By convention the first
/// rule is the start rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grammar {
    rules: Vec<Rule>,
}

impl Grammar {
    /// Create a new empty grammar
    pub fn new() -> Self {
        Grammar { rules: Vec::new() }
    }

    /// Read a grammar from a file, discarding any partially read rules on error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(GrammarError::Io)?;
        Ok(read_grammar(file)?)
    }

    /// Find the first rule with the given name
    pub fn lookup(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Check if the grammar defines a rule with the given name
    pub fn has_rule(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// The default start rule
    pub fn first(&self) -> Option<&Rule> {
        self.rules.first()
    }

    /// Append a rule, keeping any earlier rule with the same name in front of it
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Add an alternative to the rule `name`, creating the rule if needed.
    ///
    /// Elements written as `<name>` become rule references, everything else
    /// is literal text.
    pub fn add_rule(&mut self, name: &str, elements: Vec<&str>) -> Result<&mut Self> {
        let alternative = Self::parse_elements(name, elements)?;

        match self.rules.iter_mut().find(|rule| rule.name == name) {
            Some(rule) => rule.alternatives.push(alternative),
            None => self.rules.push(Rule::new(name, vec![alternative])),
        }

        Ok(self)
    }

    fn parse_elements(name: &str, elements: Vec<&str>) -> Result<Alternative> {
        if elements.is_empty() {
            return Err(GrammarError::NoExpansions(name.to_string()));
        }

        let tokens = elements
            .into_iter()
            .map(|element| {
                match element.strip_prefix('<').and_then(|e| e.strip_suffix('>')) {
                    Some(reference) if !reference.is_empty() => Token::rule_ref(reference),
                    _ => Token::literal(element),
                }
            })
            .collect();

        Ok(Alternative::new(tokens))
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", rule)?;
        }
        Ok(())
    }
}

impl FromStr for Grammar {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(read_grammar(s.as_bytes())?)
    }
}

impl FromIterator<Rule> for Grammar {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Grammar {
            rules: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Grammar {
    type Item = Rule;
    type IntoIter = std::vec::IntoIter<Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a Grammar {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Builder for constructing Grammar instances
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    grammar: Grammar,
    error: Option<GrammarError>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        GrammarBuilder::default()
    }

    /// Add an alternative to a rule; see [`Grammar::add_rule`]
    pub fn add_rule(mut self, name: &str, elements: &[&str]) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.grammar.add_rule(name, elements.to_vec()) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Build the grammar, reporting the first rule that could not be added
    pub fn build(self) -> Result<Grammar> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.grammar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_grammar() -> Grammar {
        vec![
            Rule::new(
                "greeting",
                vec![
                    Alternative::new(vec![Token::literal("Hello, "), Token::rule_ref("subject")]),
                    Alternative::new(vec![Token::literal("Hi")]),
                ],
            ),
            Rule::new("subject", vec![vec![Token::literal("world")].into()]),
            Rule::new("subject", vec![vec![Token::literal("shadowed")].into()]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::rule_ref("expr").to_string(), "<expr>");
        assert_eq!(Token::literal("a \"b\"\n").to_string(), r#""a \"b\"\n""#);
    }

    #[test]
    fn test_grammar_display() {
        assert_eq!(
            sample_grammar().to_string(),
            "<greeting> ::= \"Hello, \" <subject> | \"Hi\"\n\
             <subject> ::= \"world\"\n\
             <subject> ::= \"shadowed\""
        );
        assert_eq!(Grammar::new().to_string(), "");
    }

    #[test]
    fn test_lookup_first_wins() {
        let grammar = sample_grammar();
        let subject = grammar.lookup("subject").unwrap();
        assert_eq!(subject.alternatives[0].tokens, vec![Token::literal("world")]);
        assert!(grammar.lookup("missing").is_none());
        assert!(grammar.has_rule("greeting"));
        assert_eq!(grammar.first().map(|r| r.name.as_str()), Some("greeting"));
        assert_eq!(grammar.len(), 3);
    }

    #[test]
    fn test_add_rule_merges_alternatives() {
        let mut grammar = Grammar::new();
        grammar.add_rule("start", vec!["Hello ", "<subject>"]).unwrap();
        grammar.add_rule("subject", vec!["world"]).unwrap();
        grammar.add_rule("subject", vec!["Rust"]).unwrap();

        assert_eq!(grammar.len(), 2);
        assert_eq!(
            grammar.to_string(),
            "<start> ::= \"Hello \" <subject>\n<subject> ::= \"world\" | \"Rust\""
        );
    }

    #[test]
    fn test_add_rule_literal_angle_brackets() {
        let mut grammar = Grammar::new();
        grammar.add_rule("cmp", vec!["<", "<>", ">"]).unwrap();
        let alt = &grammar.rules()[0].alternatives[0];
        assert_eq!(
            alt.tokens,
            vec![Token::literal("<"), Token::literal("<>"), Token::literal(">")]
        );
    }

    #[test]
    fn test_grammar_builder() {
        let grammar = GrammarBuilder::new()
            .add_rule("greeting", &["Hello ", "<subject>"])
            .add_rule("subject", &["world"])
            .build()
            .unwrap();
        assert_eq!(grammar.len(), 2);

        let err = GrammarBuilder::new()
            .add_rule("ok", &["x"])
            .add_rule("broken", &[])
            .build()
            .unwrap_err();
        assert!(matches!(err, GrammarError::NoExpansions(ref n) if n == "broken"));
    }

    #[test]
    fn test_json_shape() {
        let grammar: Grammar = vec![Rule::new(
            "a",
            vec![vec![Token::rule_ref("b"), Token::literal("x")].into()],
        )]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&grammar).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"a","alternatives":[[{"RuleRef":"b"},{"Literal":"x"}]]}]"#
        );
        let back: Grammar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grammar);
    }
}
