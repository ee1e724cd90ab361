// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Output normalization for deterministic comparison.
//!
//! Two implementations of the same test runner print the same results with
//! different timing figures and different indentation. Normalization removes
//! exactly that noise, as an ordered list of named passes:
//!
//! 1. `elapsed-time` removes `<digits>ms` and `<digits> ms` tokens. Timings
//!    differ between runs and between implementations.
//! 2. `layout-whitespace` removes every newline and every run of two or more
//!    whitespace characters. Reporters indent and wrap differently.
//!
//! After the passes, leading and trailing whitespace is trimmed. Extra passes
//! from configuration run after the built-in ones.

use regex::bytes::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// `123ms`, `123 ms`
static ELAPSED_TIME_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[0-9]+ ?ms").ok());

/// A newline, or any run of two or more whitespace characters
static LAYOUT_WHITESPACE_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\n|\s{2,}").ok());

/// Leading or trailing whitespace
static TRIM_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\A\s+|\s+\z").ok());

/// Rounds that change the output without shortening it before giving up.
/// Built-in passes only delete bytes, so they never produce such a round.
const MAX_STALLED_ROUNDS: usize = 32;

/// One named substitution applied to captured output
#[derive(Clone, Debug)]
pub struct NormalizationPass {
    name: Cow<'static, str>,
    intent: Cow<'static, str>,
    regex: Regex,
    replacement: Vec<u8>,
}

impl NormalizationPass {
    /// Compile a pass from a pattern. The replacement is literal.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        intent: impl Into<Cow<'static, str>>,
        pattern: &str,
        replacement: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            intent: intent.into(),
            regex: Regex::new(pattern)?,
            replacement: replacement.as_bytes().to_vec(),
        })
    }

    /// The built-in passes, in the order they run.
    pub fn builtin() -> Vec<NormalizationPass> {
        let specs: [(&LazyLock<Option<Regex>>, &'static str, &'static str); 2] = [
            (
                &ELAPSED_TIME_REGEX,
                "elapsed-time",
                "timing figures vary between runs and implementations",
            ),
            (
                &LAYOUT_WHITESPACE_REGEX,
                "layout-whitespace",
                "reporters differ in indentation and line wrapping",
            ),
        ];

        specs
            .into_iter()
            .filter_map(|(regex, name, intent)| {
                regex.as_ref().map(|regex| NormalizationPass {
                    name: Cow::Borrowed(name),
                    intent: Cow::Borrowed(intent),
                    regex: regex.clone(),
                    replacement: Vec::new(),
                })
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Replace every match in `input`.
    pub fn apply<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]> {
        self.regex
            .replace_all(input, regex::bytes::NoExpand(self.replacement.as_slice()))
    }
}

/// Ordered set of normalization passes.
#[derive(Clone, Debug)]
pub struct Normalizer {
    passes: Vec<NormalizationPass>,
}

impl Normalizer {
    /// Built-in passes only.
    pub fn standard() -> Self {
        Self {
            passes: NormalizationPass::builtin(),
        }
    }

    /// Append a pass; it runs after every pass already present.
    pub fn with_pass(mut self, pass: NormalizationPass) -> Self {
        self.passes.push(pass);
        self
    }

    pub fn passes(&self) -> &[NormalizationPass] {
        &self.passes
    }

    /// Produce the normalized form of `raw`. `raw` itself is left untouched.
    ///
    /// Removing a match can splice together a new one (`1m3mss` becomes
    /// `1ms`), so the pipeline is repeated until the output stops changing.
    /// This makes `normalize(normalize(x)) == normalize(x)` hold for all input.
    pub fn normalize(&self, raw: &[u8]) -> Vec<u8> {
        let mut current = self.apply_once(raw);
        let mut stalled = 0;
        loop {
            let next = self.apply_once(&current);
            if next == current {
                return current;
            }
            // A shrinking round always makes progress; only non-shrinking
            // rounds from configured passes can cycle or grow forever.
            if next.len() >= current.len() {
                stalled += 1;
                if stalled == MAX_STALLED_ROUNDS {
                    tracing::warn!(
                        event = "normalize_unsettled",
                        stalled_rounds = MAX_STALLED_ROUNDS,
                        len = next.len(),
                        "normalization passes did not reach a fixed point"
                    );
                    return next;
                }
            }
            current = next;
        }
    }

    /// Convenience wrapper for text.
    pub fn normalize_str(&self, raw: &str) -> String {
        String::from_utf8_lossy(&self.normalize(raw.as_bytes())).into_owned()
    }

    fn apply_once(&self, input: &[u8]) -> Vec<u8> {
        let mut buf = self
            .passes
            .iter()
            .fold(input.to_vec(), |acc, pass| pass.apply(&acc).into_owned());
        if let Some(trim) = TRIM_REGEX.as_ref() {
            buf = trim.replace_all(&buf, &b""[..]).into_owned();
        }
        buf
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
