//! The default scoring rules
//!
//! Three mandatory rules look at the repository's layout and text files, a fourth at the
//! owner's other repositories; one quality rule looks at its popularity. Rules that count something turn the count into points
//! through a list of limits: every limit reached is worth one point.

mod doc_folder;
mod keywords;
mod model_files;
mod owner_repos;
mod stargazers;

pub use doc_folder::DOC_FOLDER;
pub use keywords::KEYWORDS;
pub use model_files::MODEL_FILES;
pub use owner_repos::OWNER_REPOS;
pub use stargazers::STARGAZERS;

use crate::engine::RuleRegistry;
use std::sync::Arc;

/// Inputs of the default rules.
#[derive(Debug, Clone)]
pub struct RuleSettings {
    pub keywords: Vec<String>,
    pub keyword_limits: Vec<u32>,
    pub doc_folder_limits: Vec<u32>,
    pub model_file_limits: Vec<u32>,
    pub owner_repo_limits: Vec<u32>,
}

/// Number of `limits` that `count` reaches.
#[must_use]
pub fn points_for(count: usize, limits: &[u32]) -> u32 {
    let reached = limits
        .iter()
        .filter(|&&limit| usize::try_from(limit).is_ok_and(|limit| limit <= count))
        .count();
    u32::try_from(reached).unwrap_or(u32::MAX)
}

/// The registry of the default rules, mandatory ones first.
#[must_use]
pub fn default_rules(settings: &RuleSettings) -> RuleRegistry {
    RuleRegistry::new()
        .with(doc_folder::definition(Arc::from(settings.doc_folder_limits.as_slice())))
        .with(model_files::definition(Arc::from(settings.model_file_limits.as_slice())))
        .with(keywords::definition(
            settings.keywords.iter().map(|k| Arc::from(k.as_str())).collect(),
            Arc::from(settings.keyword_limits.as_slice()),
        ))
        .with(owner_repos::definition(Arc::from(settings.owner_repo_limits.as_slice())))
        .with(stargazers::definition())
}
