//! Turns a planned [`Fragment`] tree into text.

use tracing::trace;

use crate::application::ports::TemplateLibrary;
use crate::domain::{DomainError, Fragment, TemplateId, TemplateRenderer, TokenMap, indent_lines};
use crate::error::StitchResult;

/// Loads and renders the templates a fragment refers to, depth first.
pub struct FragmentResolver<'a> {
    library: &'a dyn TemplateLibrary,
}

impl<'a> FragmentResolver<'a> {
    pub fn new(library: &'a dyn TemplateLibrary) -> Self {
        Self { library }
    }

    pub fn resolve(&self, fragment: &Fragment) -> StitchResult<String> {
        match fragment {
            Fragment::Text(text) => Ok(text.clone()),
            Fragment::Template { id, tokens } => self.render(id, tokens),
            Fragment::Join { parts, separator } => {
                let parts = parts
                    .iter()
                    .map(|p| self.resolve(p))
                    .collect::<StitchResult<Vec<_>>>()?;
                Ok(parts.join(separator))
            }
            Fragment::Indent { prefix, inner } => {
                Ok(indent_lines(&self.resolve(inner)?, prefix))
            }
        }
    }

    fn render(&self, id: &TemplateId, tokens: &TokenMap) -> StitchResult<String> {
        let body = self.library.load_template(id)?;
        trace!(template = %id, tokens = tokens.len(), "Rendering template");

        if tokens.is_empty() {
            let body = body.trim();
            if body.is_empty() {
                return Err(DomainError::TemplateArity {
                    template: id.to_string(),
                    reason: "template is empty".into(),
                }
                .into());
            }
            return Ok(body.to_string());
        }

        let mut names = Vec::with_capacity(tokens.len());
        let mut values = Vec::with_capacity(tokens.len());
        for (name, value) in tokens.iter() {
            names.push(name);
            values.push(self.resolve(value)?);
        }
        let values: Vec<&str> = values.iter().map(String::as_str).collect();

        TemplateRenderer::render(&body, &names, &values).map_err(|e| match e {
            DomainError::TemplateArity { reason, .. } => DomainError::TemplateArity {
                template: id.to_string(),
                reason,
            }
            .into(),
            other => other.into(),
        })
    }
}
