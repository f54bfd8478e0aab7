use super::points_for;
use crate::engine::{RuleCategory, RuleDef, RuleInstance};
use crate::repo::{Outcome, RepositoryCache};
use futures_util::future::BoxFuture;
use std::sync::Arc;

pub const MODEL_FILES: &str = "model_files";

/// Extensions of UML and other modeling tool files.
const EXTENSIONS: &[&str] = &[".uml", ".xmi", ".ebm", ".eap", ".puml"];

pub fn definition(limits: Arc<[u32]>) -> RuleDef {
    RuleDef::new(MODEL_FILES, RuleCategory::Mandatory, move |_| {
        Ok(Box::new(ModelFiles {
            limits: Arc::clone(&limits),
        }) as Box<dyn RuleInstance>)
    })
}

struct ModelFiles {
    limits: Arc<[u32]>,
}

fn is_model_file(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    EXTENSIONS.iter().any(|ext| name.len() > ext.len() && name.ends_with(ext))
}

impl RuleInstance for ModelFiles {
    fn execute<'a>(&'a mut self, cache: &'a mut RepositoryCache) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            match cache.structure().await {
                Ok(tree) => {
                    let count = tree.files().filter(|f| is_model_file(f.name())).count();
                    Outcome::Points(points_for(count, &self.limits))
                }
                Err(e) => e.into(),
            }
        })
    }
}
