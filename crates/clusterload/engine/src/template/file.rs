//! Templates read from disk

use super::{TemplateError, TemplateProvider, TemplateRenderer};
use clusterload_types::{Object, TemplateFillMap};
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Reads templates relative to a base directory, caching each file after
/// the first read.
#[derive(Debug)]
pub struct FileTemplateProvider {
    base_dir: PathBuf,
    cache: DashMap<String, Arc<str>>,
    renderer: TemplateRenderer,
}

impl FileTemplateProvider {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            cache: DashMap::new(),
            renderer: TemplateRenderer::new(),
        }
    }

    fn source(&self, path: &str) -> Result<Arc<str>, TemplateError> {
        if let Some(cached) = self.cache.get(path) {
            return Ok(cached.clone());
        }

        let full_path = self.base_dir.join(path);
        let contents = std::fs::read_to_string(&full_path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                TemplateError::NotFound(full_path.display().to_string())
            } else {
                TemplateError::Io {
                    path: full_path.display().to_string(),
                    source,
                }
            }
        })?;

        let contents: Arc<str> = Arc::from(contents);
        self.cache.insert(path.to_string(), contents.clone());
        Ok(contents)
    }
}

impl TemplateProvider for FileTemplateProvider {
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
