use log::trace;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::grammar::{Grammar, Token};
use crate::utils::{GrammarError, OptionExt, Result};

/// Configuration options for sampling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Maximum nesting of rule expansions below the start rule.
    ///
    /// `None` places no bound: a grammar whose rules always expand into
    /// themselves will then recurse until the stack is exhausted.
    pub max_depth: Option<usize>,
}

/// Expands rules of a borrowed grammar into random strings
#[derive(Debug, Clone)]
pub struct Sampler<'g> {
    grammar: &'g Grammar,
    config: SamplerConfig,
}

impl<'g> Sampler<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, SamplerConfig::default())
    }

    pub fn with_config(grammar: &'g Grammar, config: SamplerConfig) -> Self {
        Sampler { grammar, config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Generate one string starting from the rule `start`.
    ///
    /// Each expansion picks one alternative uniformly at random. The first
    /// failure anywhere in the expansion aborts the whole sample.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, start: &str) -> Result<String> {
        let mut out = String::new();
        self.expand(rng, start, 0, &mut out)?;
        Ok(out)
    }

    /// Generate one string starting from the grammar's first rule
    pub fn sample_first<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
        let start = self.grammar.first().ok_or(GrammarError::EmptyGrammar)?;
        self.sample(rng, &start.name)
    }

    fn expand<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        name: &str,
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        if let Some(limit) = self.config.max_depth {
            if depth > limit {
                return Err(GrammarError::DepthExceeded {
                    rule: name.to_string(),
                    limit,
                });
            }
        }

        let rule = self.grammar.lookup(name).or_unresolved(name)?;
        let alternative = rule
            .alternatives
            .choose(rng)
            .ok_or_else(|| GrammarError::NoExpansions(name.to_string()))?;
        trace!("expanding <{}> at depth {}: {}", name, depth, alternative);

        for token in &alternative.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::RuleRef(reference) => self.expand(rng, reference, depth + 1, out)?,
            }
        }
        Ok(())
    }
}

/// Sample `start` from `grammar` using the thread-local RNG
pub fn sample(grammar: &Grammar, start: &str) -> Result<String> {
    Sampler::new(grammar).sample(&mut rand::thread_rng(), start)
}

/// Sample the first rule of `grammar` using the thread-local RNG
pub fn sample_first(grammar: &Grammar) -> Result<String> {
    Sampler::new(grammar).sample_first(&mut rand::thread_rng())
}
