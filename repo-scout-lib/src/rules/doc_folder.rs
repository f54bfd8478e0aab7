use super::points_for;
use crate::engine::{RuleCategory, RuleDef, RuleInstance};
use crate::repo::{Outcome, RepositoryCache};
use futures_util::future::BoxFuture;
use std::sync::Arc;

const LOG_TARGET: &str = "     rules";

pub const DOC_FOLDER: &str = "doc_folder";

const FOLDER_NAMES: &[&str] = &["doc", "docs", "documentation", "documentations"];

pub fn definition(limits: Arc<[u32]>) -> RuleDef {
    RuleDef::new(DOC_FOLDER, RuleCategory::Mandatory, move |_| {
        Ok(Box::new(DocFolder {
            limits: Arc::clone(&limits),
        }) as Box<dyn RuleInstance>)
    })
}

/// Counts documentation directories.
struct DocFolder {
    limits: Arc<[u32]>,
}

fn is_doc_folder(name: &str) -> bool {
    FOLDER_NAMES.iter().any(|candidate| name.eq_ignore_ascii_case(candidate))
}

impl RuleInstance for DocFolder {
    fn execute<'a>(&'a mut self, cache: &'a mut RepositoryCache) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let tree = match cache.structure().await {
                Ok(tree) => tree,
                Err(e) => return e.into(),
            };

            let found: Vec<_> = tree.directories().filter(|d| is_doc_folder(d.name())).collect();
            if let Some(last) = found.last() {
                log::debug!(target: LOG_TARGET, "Found {} documentation folders in '{}', e.g. '{}'", found.len(), cache.id(), last.path);
            }

            Outcome::Points(points_for(found.len(), &self.limits))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Tree, TreeEntry};
    use crate::repo::RepoId;
    use crate::testing::{FakeRemote, test_context};

    async fn evaluate(tree: Tree, limits: &[u32]) -> Outcome {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default().with_structure(tree));
        let mut cache = RepositoryCache::new(RepoId::new("o", "r"), test_context(remote, dir.path()));

        let rule = definition(Arc::from(limits));
        let mut instance = rule.instantiate(cache.id()).unwrap();
        instance.execute(&mut cache).await
    }

    #[test]
    fn test_folder_names() {
        assert!(is_doc_folder("docs"));
        assert!(is_doc_folder("Documentation"));
        assert!(!is_doc_folder("docker"));
        assert!(!is_doc_folder("src"));
    }

    #[tokio::test]
    async fn test_counts_nested_documentation_folders() {
        let tree: Tree = [
            TreeEntry::directory("docs"),
            TreeEntry::directory("sub"),
            TreeEntry::directory("sub/doc"),
            TreeEntry::directory("docker"),
            TreeEntry::file("docs/readme.md"),
            TreeEntry::file("documentation"),
        ]
        .into_iter()
        .collect();

        assert_eq!(evaluate(tree.clone(), &[1, 2, 5]).await, Outcome::Points(2));
        assert_eq!(evaluate(tree, &[3]).await, Outcome::Points(0));
    }

    #[tokio::test]
    async fn test_empty_repository() {
        assert_eq!(evaluate(Tree::default(), &[1]).await, Outcome::Points(0));
    }
}
