//! Offset pagination over the secrets collection

use std::collections::HashSet;

use url::Url;

use super::{ApiResult, ListSecretsOptions, SecretsManagerApi};
use crate::models::{PageLink, Secret};

/// Walks the pages of `GET /api/v2/secrets`, following each page's `next` link
pub struct SecretsPager<'a> {
    client: &'a dyn SecretsManagerApi,
    options: ListSecretsOptions,
    has_next: bool,
    pages_fetched: usize,
    visited: HashSet<i64>,
}

impl<'a> SecretsPager<'a> {
    pub fn new(client: &'a dyn SecretsManagerApi, options: ListSecretsOptions) -> Self {
        let visited = HashSet::from([options.offset.unwrap_or(0)]);
        Self {
            client,
            options,
            has_next: true,
            pages_fetched: 0,
            visited,
        }
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Fetch the next page. Returns an empty list once the collection is exhausted.
    pub async fn next_page(&mut self) -> ApiResult<Vec<Secret>> {
        if !self.has_next {
            return Ok(Vec::new());
        }

        let page = self.client.list_secrets(&self.options).await?;
        self.pages_fetched += 1;

        // A link back to an offset already fetched ends the walk
        let next_offset = page.next.as_ref().and_then(offset_of);
        match next_offset {
            Some(offset) if !page.secrets.is_empty() && self.visited.insert(offset) => {
                self.options.offset = Some(offset);
            }
            _ => self.has_next = false,
        }

        Ok(page.secrets)
    }

    /// Drain every remaining page, preserving service order
    pub async fn all(&mut self) -> ApiResult<Vec<Secret>> {
        let mut secrets = Vec::new();
        while self.has_next {
            let page = self.next_page().await?;
            secrets.extend(page);
        }
        log::debug!(
            "Collected {} secrets over {} page(s)",
            secrets.len(),
            self.pages_fetched
        );
        Ok(secrets)
    }
}

/// The `offset` query parameter of a page link. Relative links are accepted.
pub fn offset_of(link: &PageLink) -> Option<i64> {
    let url = match Url::parse(&link.href) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse("http://localhost/").ok()?.join(&link.href).ok()?
        }
        Err(_) => return None,
    };
    url.query_pairs()
        .find(|(key, _)| key == "offset")
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSecretsManager;

    fn link(href: &str) -> PageLink {
        PageLink {
            href: href.to_string(),
        }
    }

    #[test]
    fn offset_is_read_from_absolute_and_relative_links() {
        assert_eq!(
            offset_of(&link(
                "https://sm.example.com/api/v2/secrets?limit=200&offset=400"
            )),
            Some(400)
        );
        assert_eq!(offset_of(&link("/api/v2/secrets?offset=10&limit=10")), Some(10));
        assert_eq!(offset_of(&link("/api/v2/secrets?limit=10")), None);
        assert_eq!(offset_of(&link("/api/v2/secrets?offset=ten")), None);
    }

    #[tokio::test]
    async fn all_collects_every_page_in_order() {
        let fake = FakeSecretsManager::new();
        for i in 0..7 {
            fake.insert_public_certificate(&format!("cert-{}", i));
        }

        let mut pager = SecretsPager::new(&fake, ListSecretsOptions::default().with_limit(3));
        let secrets = pager.all().await.unwrap();

        let names: Vec<_> = secrets
            .iter()
            .filter_map(|s| s.common().name.clone())
            .collect();
        assert_eq!(
            names,
            (0..7).map(|i| format!("cert-{}", i)).collect::<Vec<_>>()
        );
        assert_eq!(pager.pages_fetched(), 3);
        assert!(!pager.has_next());
    }

    #[tokio::test]
    async fn empty_collection_is_a_single_request() {
        let fake = FakeSecretsManager::new();
        let mut pager = SecretsPager::new(&fake, ListSecretsOptions::default().with_limit(5));

        assert!(pager.all().await.unwrap().is_empty());
        assert_eq!(pager.pages_fetched(), 1);
        assert!(pager.next_page().await.unwrap().is_empty());
        assert_eq!(pager.pages_fetched(), 1);
    }

    #[tokio::test]
    async fn cyclic_next_links_end_the_walk() {
        let fake = FakeSecretsManager::new();
        for i in 0..4 {
            fake.insert_public_certificate(&format!("cert-{}", i));
        }
        fake.wrap_next_links();

        let mut pager = SecretsPager::new(&fake, ListSecretsOptions::default().with_limit(2));
        let secrets = pager.all().await.unwrap();
        assert_eq!(secrets.len(), 4);
        assert_eq!(pager.pages_fetched(), 2);
        assert_eq!(fake.list_calls(), 2);
    }

    #[tokio::test]
    async fn page_errors_stop_the_walk() {
        let fake = FakeSecretsManager::new();
        fake.insert_public_certificate("ok");
        fake.insert_raw_secret(serde_json::json!({"type": "quantum_key", "name": "odd"}));

        let mut pager = SecretsPager::new(&fake, ListSecretsOptions::default().with_limit(10));
        let err = pager.all().await.unwrap_err();
        assert!(err.is_unrecognized_subtype());
    }
}
