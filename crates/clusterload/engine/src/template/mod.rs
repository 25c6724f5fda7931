//! Template collaborator
//!
//! Object templates are YAML documents with minijinja placeholders:
//!
//! ```yaml
//! apiVersion: apps/v1
//! kind: Deployment
//! metadata:
//!   name: {{ Name }}
//!   labels:
//!     replica: "{{ Index }}"
//! spec:
//!   replicas: {{ Replicas }}
//! ```
//!
//! A parameterized render is strict: a placeholder without a value is an
//! error. A raw render drops every `{{ ... }}` expression and renders the rest
//! leniently, which keeps enough of the document to recover its kind and API
//! group even when an expression could not be evaluated without parameters.

pub mod file;
pub mod memory;

pub use file::FileTemplateProvider;
pub use memory::InMemoryTemplateProvider;

use clusterload_types::{Object, TemplateFillMap};
use minijinja::{Environment, UndefinedBehavior};
use thiserror::Error;

/// Errors raised while turning a template into an object
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template {0} not found")]
    NotFound(String),

    #[error("IO error reading template {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template render error: {0}")]
    Render(#[from] minijinja::Error),

    #[error("rendered template is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("rendered template is not a mapping")]
    NotAnObject,

    #[error("rendered object has no kind")]
    MissingKind,
}

/// Turns template paths into objects
pub trait TemplateProvider: Send + Sync {
    /// Render with every placeholder substituted from `mapping`.
    fn template_to_object(
        &self,
        path: &str,
        mapping: &TemplateFillMap,
    ) -> Result<Object, TemplateError>;

    /// Render without parameters, for identity (kind/group) only.
    fn raw_to_object(&self, path: &str) -> Result<Object, TemplateError>;
}

/// Shared strict/lenient minijinja environments
pub struct TemplateRenderer {
    strict: Environment<'static>,
    lenient: Environment<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut strict = Environment::new();
        strict.set_undefined_behavior(UndefinedBehavior::Strict);

        let mut lenient = Environment::new();
        lenient.set_undefined_behavior(UndefinedBehavior::Lenient);

        Self { strict, lenient }
    }

    pub fn render(&self, source: &str, mapping: &TemplateFillMap) -> Result<Object, TemplateError> {
        let text = self.strict.render_str(source, mapping)?;
        parse_object(&text)
    }

    pub fn render_raw(&self, source: &str) -> Result<Object, TemplateError> {
        let stripped = blank_expressions(source);
        let text = self.lenient.render_str(&stripped, minijinja::context! {})?;
        parse_object(&text)
    }
}

/// Removes every closed `{{ ... }}` span. An unclosed span is kept verbatim.
fn blank_expressions(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &rest[start + 2 + len + 2..];
    }
    out.push_str(rest);
    out
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer").finish_non_exhaustive()
    }
}

fn parse_object(text: &str) -> Result<Object, TemplateError> {
    let value: serde_json::Value = serde_yaml::from_str(text)?;
    let object = Object::from_value(value).ok_or(TemplateError::NotAnObject)?;
    if object.kind().is_empty() {
        return Err(TemplateError::MissingKind);
    }
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const DEPLOYMENT: &str = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: {{ Name }}\nspec:\n  replicas: {{ Replicas }}\n";

    fn mapping(pairs: &[(&str, Value)]) -> TemplateFillMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_render_substitutes() {
        let renderer = TemplateRenderer::new();
        let object = renderer
            .render(
                DEPLOYMENT,
                &mapping(&[("Name", Value::from("web-0")), ("Replicas", Value::from(3))]),
            )
            .unwrap();

        assert_eq!(object.name(), Some("web-0"));
        assert_eq!(object.as_map()["spec"]["replicas"], Value::from(3));
    }

    #[test]
    fn test_render_missing_key_fails() {
        let renderer = TemplateRenderer::new();
        let err = renderer
            .render(DEPLOYMENT, &mapping(&[("Name", Value::from("web-0"))]))
            .unwrap_err();
        assert!(matches!(err, TemplateError::Render(_)));
    }

    #[test]
    fn test_raw_render_keeps_identity() {
        let renderer = TemplateRenderer::new();
        let object = renderer.render_raw(DEPLOYMENT).unwrap();
        let gvk = object.group_version_kind();
        assert_eq!(gvk.kind, "Deployment");
        assert_eq!(gvk.group, "apps");
    }

    #[test]
    fn test_raw_render_ignores_expressions() {
        let renderer = TemplateRenderer::new();
        let source = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: {{ Name | lower }}\nspec:\n  replicas: {{ Replicas * 2 }}\n";

        let object = renderer.render_raw(source).unwrap();
        let gvk = object.group_version_kind();
        assert_eq!(gvk.kind, "Deployment");
        assert_eq!(gvk.group, "apps");
    }

    #[test]
    fn test_blank_expressions() {
        assert_eq!(blank_expressions("a: {{ X * 2 }}\nb: {{Y}}"), "a: \nb: ");
        assert_eq!(blank_expressions("{%- if true %}k{% endif %}"), "{%- if true %}k{% endif %}");
        assert_eq!(blank_expressions("a: {{ open"), "a: {{ open");
    }

    #[test]
    fn test_missing_kind_rejected() {
        let renderer = TemplateRenderer::new();
        let err = renderer.render_raw("apiVersion: v1\ndata: {}\n").unwrap_err();
        assert!(matches!(err, TemplateError::MissingKind));
    }

    #[test]
    fn test_scalar_document_rejected() {
        let renderer = TemplateRenderer::new();
        let err = renderer.render_raw("just a string").unwrap_err();
        assert!(matches!(err, TemplateError::NotAnObject));
    }
}
