use crate::engine::{RuleCategory, RuleDef, RuleInstance};
use crate::repo::{Outcome, RepositoryCache};
use futures_util::future::BoxFuture;
use ohno::bail;
use std::sync::Arc;

const LOG_TARGET: &str = "     rules";

pub const OWNER_REPOS: &str = "owner_repos";

const DOC_MARKERS: &[&str] = &["documentations", "documentation", "docs", "doc"];

/// Number of characters two repository names must share as a prefix to count as related.
const SHARED_PREFIX: usize = 3;

/// The sibling documentation repository rule. `limits` holds the points for an
/// unrelated, a similarly named and a same-named documentation repository, in that order.
pub fn definition(limits: Arc<[u32]>) -> RuleDef {
    RuleDef::new(OWNER_REPOS, RuleCategory::Mandatory, move |_| {
        let &[unrelated, similar, same] = &*limits else {
            bail!("owner_repo_limits needs exactly 3 values, got {}", limits.len());
        };

        Ok(Box::new(OwnerRepos { unrelated, similar, same }) as Box<dyn RuleInstance>)
    })
}

/// Looks for documentation repositories next to the evaluated one.
struct OwnerRepos {
    unrelated: u32,
    similar: u32,
    same: u32,
}

fn is_doc_repo(name: &str) -> bool {
    let name = name.to_lowercase();
    DOC_MARKERS.iter().any(|marker| name.contains(marker))
}

fn shares_prefix(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.to_lowercase().chars().take(SHARED_PREFIX).collect();
    let b: Vec<char> = b.to_lowercase().chars().take(SHARED_PREFIX).collect();
    a.len() == SHARED_PREFIX && a == b
}

impl OwnerRepos {
    /// Points `sibling` earns for a repository named `name`.
    fn points(&self, name: &str, sibling: &str) -> u32 {
        if sibling.eq_ignore_ascii_case(name) || !is_doc_repo(sibling) {
            0
        } else if sibling.to_lowercase().contains(&name.to_lowercase()) {
            self.same
        } else if shares_prefix(name, sibling) {
            self.similar
        } else {
            self.unrelated
        }
    }
}

impl RuleInstance for OwnerRepos {
    fn execute<'a>(&'a mut self, cache: &'a mut RepositoryCache) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let siblings = match cache.owner_repos().await {
                Ok(names) => names,
                Err(e) => return e.into(),
            };

            let name = cache.id().name().to_string();
            let best = siblings.iter().map(|sibling| (sibling, self.points(&name, sibling))).max_by_key(|(_, points)| *points);

            match best {
                Some((sibling, points)) if points > 0 => {
                    log::debug!(target: LOG_TARGET, "'{}' has documentation repository '{sibling}'", cache.id());
                    Outcome::Points(points)
                }
                _ => Outcome::Points(0),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::RepoId;
    use crate::testing::{FakeRemote, test_context};

    fn rule() -> OwnerRepos {
        OwnerRepos {
            unrelated: 1,
            similar: 2,
            same: 3,
        }
    }

    async fn evaluate(name: &str, siblings: &[&str]) -> Outcome {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default().with_owner_repos(siblings));
        let mut cache = RepositoryCache::new(RepoId::new("octo", name), test_context(remote, dir.path()));

        let mut instance = definition(Arc::from([1, 2, 3].as_slice())).instantiate(cache.id()).unwrap();
        instance.execute(&mut cache).await
    }

    #[test]
    fn test_doc_repo_names() {
        assert!(is_doc_repo("widget-docs"));
        assert!(is_doc_repo("Documentation"));
        assert!(is_doc_repo("doctor"));
        assert!(!is_doc_repo("widget"));
    }

    #[test]
    fn test_points_per_relation() {
        let rule = rule();
        assert_eq!(rule.points("widget", "widget-docs"), 3);
        assert_eq!(rule.points("widget", "WIDGET-Documentation"), 3);
        assert_eq!(rule.points("widget", "wid-doc"), 2);
        assert_eq!(rule.points("widget", "handbook-docs"), 1);
        assert_eq!(rule.points("widget", "gadget"), 0);
    }

    #[test]
    fn test_repository_does_not_count_itself() {
        assert_eq!(rule().points("docs", "docs"), 0);
        assert_eq!(rule().points("docs", "Docs"), 0);
    }

    #[test]
    fn test_short_names_share_no_prefix() {
        assert!(!shares_prefix("ab", "ab-docs"));
        assert!(shares_prefix("Widget", "wid"));
    }

    #[tokio::test]
    async fn test_best_sibling_wins() {
        let outcome = evaluate("widget", &["widget", "notes-docs", "widget-docs", "wid-doc"]).await;
        assert_eq!(outcome, Outcome::Points(3));
    }

    #[tokio::test]
    async fn test_no_documentation_sibling() {
        assert_eq!(evaluate("widget", &["widget", "gadget"]).await, Outcome::Points(0));
    }

    #[tokio::test]
    async fn test_unlisted_owner_is_inapplicable() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let mut cache = RepositoryCache::new(RepoId::new("octo", "widget"), test_context(remote, dir.path()));

        let mut instance = definition(Arc::from([1, 2, 3].as_slice())).instantiate(cache.id()).unwrap();
        assert!(instance.execute(&mut cache).await.reason().is_some());
    }

    #[test]
    fn test_wrong_number_of_limits_fails_instantiation() {
        let rule = definition(Arc::from([1, 2].as_slice()));
        assert!(rule.instantiate(&RepoId::new("o", "r")).is_none());
        assert!(rule.is_disabled());
    }
}
