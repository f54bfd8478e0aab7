use super::points_for;
use crate::engine::{RuleCategory, RuleDef, RuleInstance};
use crate::repo::{Outcome, RepositoryCache};
use futures_util::future::BoxFuture;
use ohno::bail;
use std::sync::Arc;

const LOG_TARGET: &str = "     rules";

pub const KEYWORDS: &str = "keywords";

const TEXT_EXTENSIONS: &[&str] = &[".md", ".markdown", ".txt", ".rst", ".adoc"];

/// The keywords rule. Setting it up fails when there is nothing to search for.
pub fn definition(keywords: Arc<[Arc<str>]>, limits: Arc<[u32]>) -> RuleDef {
    RuleDef::new(KEYWORDS, RuleCategory::Mandatory, move |_| {
        if keywords.iter().all(|k| k.trim().is_empty()) {
            bail!("no keywords are configured");
        }

        Ok(Box::new(Keywords {
            needles: keywords
                .iter()
                .filter(|k| !k.trim().is_empty())
                .map(|k| k.to_lowercase())
                .collect(),
            limits: Arc::clone(&limits),
        }) as Box<dyn RuleInstance>)
    })
}

/// Searches the repository's text files for keywords, ignoring case.
struct Keywords {
    needles: Vec<String>,
    limits: Arc<[u32]>,
}

fn is_text_file(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    TEXT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

impl Keywords {
    /// Number of keywords occurring in `content`.
    fn matches(&self, content: &str) -> usize {
        let content = content.to_lowercase();
        self.needles.iter().filter(|needle| content.contains(needle.as_str())).count()
    }
}

impl RuleInstance for Keywords {
    fn execute<'a>(&'a mut self, cache: &'a mut RepositoryCache) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let tree = match cache.structure().await {
                Ok(tree) => tree,
                Err(e) => return e.into(),
            };

            let paths: Vec<String> = tree.files().filter(|f| is_text_file(f.name())).map(|f| f.path.clone()).collect();
            if paths.is_empty() {
                return Outcome::inapplicable("No text files found");
            }

            let files = match cache.files(paths).await {
                Ok(files) => files,
                Err(e) => return e.into(),
            };

            let count: usize = files.values().map(|content| self.matches(content)).sum();
            log::debug!(target: LOG_TARGET, "Found {count} keyword matches in {} text files of '{}'", files.len(), cache.id());

            Outcome::Points(points_for(count, &self.limits))
        })
    }
}
