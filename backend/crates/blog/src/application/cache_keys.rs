//! Cache key layout

use std::collections::BTreeMap;

use crate::domain::repository::PublicPostQuery;

/// Stable key for a public list page: sorted `k=v` pairs joined by `&`.
pub fn list_cache_key(query: &PublicPostQuery) -> String {
    let mut params = BTreeMap::new();
    params.insert("author", query.author.map(|a| a.to_string()).unwrap_or_default());
    params.insert("category", query.category.clone().unwrap_or_default());
    params.insert("ordering", query.ordering.as_str().to_string());
    params.insert("page", query.page.page().to_string());
    params.insert("page_size", query.page.page_size().to_string());
    params.insert("q", query.q.clone().unwrap_or_default());
    params.insert("tag", query.tag.clone().unwrap_or_default());

    let parts: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("blogs:list:{}", parts.join("&"))
}

pub fn detail_cache_key(slug: &str) -> String {
    format!("blogs:detail:{slug}")
}

/// Dedup marker for one anonymous reaction
pub fn anon_reaction_key(session: &str, post_id: &impl std::fmt::Display, kind: &str) -> String {
    format!("anon:{session}:{post_id}:{kind}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::PostOrdering;
    use kernel::pagination::PageRequest;

    fn query(ordering: PostOrdering) -> PublicPostQuery {
        PublicPostQuery {
            category: Some("rust".to_string()),
            tag: None,
            author: None,
            q: None,
            ordering,
            page: PageRequest::new(None, None),
        }
    }

    #[test]
    fn test_list_key_is_sorted() {
        assert_eq!(
            list_cache_key(&query(PostOrdering::NewestFirst)),
            "blogs:list:author=&category=rust&ordering=-published_at&page=1&page_size=10&q=&tag="
        );
    }

    #[test]
    fn test_bogus_ordering_shares_default_key() {
        let bogus = query(PostOrdering::resolve(Some("bogus"), false));
        let default = query(PostOrdering::resolve(Some("-published_at"), false));
        assert_eq!(list_cache_key(&bogus), list_cache_key(&default));
    }

    #[test]
    fn test_detail_key() {
        assert_eq!(detail_cache_key("hello-world"), "blogs:detail:hello-world");
    }
}
