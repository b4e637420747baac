//! Wire selection patterns.
//!
//! A pattern has the shape `[!][<module-glob>/]<matcher>` where the matcher
//! is `w:<glob>` (wire name), `a:<name>[=<value>]` (wire attribute), a bare
//! wire-name glob, or empty (every wire of the matched modules). Globs
//! support `*` and `?`.
//!
//! Patterns are applied in order and the last matching pattern decides. A
//! list whose first pattern subtracts starts from everything selected.

use crate::module::Module;
use crate::wire::Wire;
use clkmap_common::Interner;

/// Errors produced while parsing a selection pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// The pattern text is empty.
    #[error("empty selection pattern")]
    Empty,
    /// An `a:` matcher has no attribute name.
    #[error("selection pattern '{0}' names no attribute")]
    MissingAttribute(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum WireMatcher {
    Any,
    Name(String),
    Attr { name: String, value: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectPattern {
    negate: bool,
    module: Option<String>,
    matcher: WireMatcher,
}

impl SelectPattern {
    fn parse(text: &str) -> Result<Self, SelectionError> {
        let trimmed = text.trim();
        let (negate, rest) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if rest.is_empty() {
            return Err(SelectionError::Empty);
        }
        let has_kind = rest.starts_with("w:") || rest.starts_with("a:");
        let (module, body) = match rest.split_once('/') {
            Some((module, body)) if !has_kind => (Some(module.to_string()), body),
            _ => (None, rest),
        };
        let matcher = if let Some(glob) = body.strip_prefix("w:") {
            WireMatcher::Name(glob.to_string())
        } else if let Some(attr) = body.strip_prefix("a:") {
            let (name, value) = match attr.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (attr, None),
            };
            if name.is_empty() {
                return Err(SelectionError::MissingAttribute(text.to_string()));
            }
            WireMatcher::Attr {
                name: name.to_string(),
                value,
            }
        } else if body.is_empty() {
            WireMatcher::Any
        } else {
            WireMatcher::Name(body.to_string())
        };
        Ok(Self {
            negate,
            module,
            matcher,
        })
    }

    fn matches_module(&self, module: &Module, interner: &Interner) -> bool {
        self.module
            .as_deref()
            .map_or(true, |glob| glob_match(glob, interner.resolve(module.name)))
    }

    fn matches(&self, module: &Module, wire: &Wire, interner: &Interner) -> bool {
        if !self.matches_module(module, interner) {
            return false;
        }
        match &self.matcher {
            WireMatcher::Any => true,
            WireMatcher::Name(glob) => glob_match(glob, interner.resolve(wire.name)),
            WireMatcher::Attr { name, value } => {
                match (wire.attributes.get_named(interner, name), value) {
                    (None, _) => false,
                    (Some(_), None) => true,
                    (Some(actual), Some(expected)) => actual.matches_text(expected),
                }
            }
        }
    }
}

/// A predicate over (module, wire) pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    patterns: Vec<SelectPattern>,
}

impl Selection {
    /// Selects every wire of every module.
    pub fn all() -> Self {
        Self::default()
    }

    /// Parses a list of patterns. An empty list selects everything.
    pub fn parse<S: AsRef<str>>(patterns: &[S]) -> Result<Self, SelectionError> {
        let patterns = patterns
            .iter()
            .map(|p| SelectPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns `true` if the selection was given as explicit patterns.
    pub fn is_explicit(&self) -> bool {
        !self.patterns.is_empty()
    }

    /// Returns `true` if `wire` of `module` is selected.
    pub fn selects_wire(&self, module: &Module, wire: &Wire, interner: &Interner) -> bool {
        let Some(first) = self.patterns.first() else {
            return true;
        };
        let mut selected = first.negate;
        for pattern in &self.patterns {
            if pattern.matches(module, wire, interner) {
                selected = !pattern.negate;
            }
        }
        selected
    }

    /// Returns `true` if at least one wire of `module` is selected.
    pub fn selects_module(&self, module: &Module, interner: &Interner) -> bool {
        if !self.is_explicit() {
            return true;
        }
        module
            .wires
            .values()
            .any(|wire| self.selects_wire(module, wire, interner))
    }
}

/// Matches `text` against a glob with `*` (any run) and `?` (one character).
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}
