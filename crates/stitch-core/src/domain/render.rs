//! Placeholder substitution and the fragment tree it renders.

use crate::domain::error::DomainError;
use std::fmt;

// ── TemplateRenderer ─────────────────────────────────────────────────────────

/// Pure `$Token$` substitution.
///
/// Tokens are applied left to right over the list, each to the output of the
/// previous one: a value inserted by an early token may itself contain a later
/// token and will be expanded. Values are inserted verbatim.
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn render(template: &str, tokens: &[&str], values: &[&str]) -> Result<String, DomainError> {
        if template.trim().is_empty() {
            return Err(arity(template, "template is empty"));
        }
        if tokens.is_empty() {
            return Err(arity(template, "no tokens were given"));
        }
        if tokens.len() != values.len() {
            return Err(arity(
                template,
                &format!("{} tokens but {} values", tokens.len(), values.len()),
            ));
        }

        let rendered = tokens
            .iter()
            .zip(values)
            .fold(template.to_string(), |acc, (token, value)| {
                acc.replace(token, value)
            });

        Ok(rendered.trim().to_string())
    }
}

fn arity(template: &str, reason: &str) -> DomainError {
    let head: String = template.trim().chars().take(40).collect();
    DomainError::TemplateArity {
        template: head,
        reason: reason.to_string(),
    }
}

// ── TemplateId ───────────────────────────────────────────────────────────────

/// Slash-separated template identifier, e.g. `server/forms/class`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ── Fragment ─────────────────────────────────────────────────────────────────

/// A piece of output text, possibly still to be rendered.
///
/// Planners build these trees without touching the template library; the
/// application layer resolves `Template` nodes by loading and rendering them,
/// depth first.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Literal text, inserted as-is.
    Text(String),
    /// A library template rendered with its own token map.
    Template { id: TemplateId, tokens: TokenMap },
    /// Resolved parts joined by `separator`; empty when there are no parts.
    Join {
        parts: Vec<Fragment>,
        separator: String,
    },
    /// `inner` with `prefix` put in front of every non-blank line.
    Indent { prefix: String, inner: Box<Fragment> },
}

impl Fragment {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn template(id: impl Into<TemplateId>, tokens: TokenMap) -> Self {
        Self::Template {
            id: id.into(),
            tokens,
        }
    }

    pub fn join(parts: Vec<Fragment>, separator: impl Into<String>) -> Self {
        Self::Join {
            parts,
            separator: separator.into(),
        }
    }

    pub fn indent(prefix: impl Into<String>, inner: Fragment) -> Self {
        Self::Indent {
            prefix: prefix.into(),
            inner: Box::new(inner),
        }
    }

    /// Every template id this fragment refers to, nested ones included.
    pub fn template_ids(&self) -> Vec<&TemplateId> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids<'a>(&'a self, out: &mut Vec<&'a TemplateId>) {
        match self {
            Self::Text(_) => {}
            Self::Template { id, tokens } => {
                out.push(id);
                for (_, value) in tokens.iter() {
                    value.collect_ids(out);
                }
            }
            Self::Join { parts, .. } => {
                for part in parts {
                    part.collect_ids(out);
                }
            }
            Self::Indent { inner, .. } => inner.collect_ids(out),
        }
    }
}

impl From<String> for Fragment {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Fragment {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Put `prefix` in front of every non-blank line of `text`.
pub fn indent_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── TokenMap ─────────────────────────────────────────────────────────────────

/// Ordered token to value list. Order is substitution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenMap(Vec<(String, Fragment)>);

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `token` (written with its `$` delimiters).
    pub fn with(mut self, token: impl Into<String>, value: impl Into<Fragment>) -> Self {
        self.0.push((token.into(), value.into()));
        self
    }

    pub fn push(&mut self, token: impl Into<String>, value: impl Into<Fragment>) {
        self.0.push((token.into(), value.into()));
    }

    /// Prepend pairs so that they are substituted before this map's own.
    pub fn extend_front(mut self, front: TokenMap) -> Self {
        let mut pairs = front.0;
        pairs.append(&mut self.0);
        Self(pairs)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fragment)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
