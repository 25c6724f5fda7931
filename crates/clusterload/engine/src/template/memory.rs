//! Templates registered in memory

use super::{TemplateError, TemplateProvider, TemplateRenderer};
use clusterload_types::{Object, TemplateFillMap};
use dashmap::DashMap;

/// Template provider backed by a map of path to source
#[derive(Debug, Default)]
pub struct InMemoryTemplateProvider {
    templates: DashMap<String, String>,
    renderer: TemplateRenderer,
}

impl InMemoryTemplateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn insert(&self, path: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(path.into(), source.into());
    }

    fn source(&self, path: &str) -> Result<String, TemplateError> {
        self.templates
            .get(path)
            .map(|s| s.clone())
            .ok_or_else(|| TemplateError::NotFound(path.to_string()))
    }
}

impl TemplateProvider for InMemoryTemplateProvider {
    fn template_to_object(
        &self,
        path: &str,
        mapping: &TemplateFillMap,
    ) -> Result<Object, TemplateError> {
        let source = self.source(path)?;
        self.renderer.render(&source, mapping)
    }

    fn raw_to_object(&self, path: &str) -> Result<Object, TemplateError> {
        let source = self.source(path)?;
        self.renderer.render_raw(&source)
    }
}
