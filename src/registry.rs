//! Endpoint registry: the user-editable mapping from endpoint identifier
//! to URL template.
//!
//! Every template must contain the query marker exactly once; this is
//! validated on load and on edit, never at dispatch time. The registry
//! persists as a JSON object. Entries are kept sorted by identifier so
//! that dispatch order is deterministic regardless of file layout.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::DispatchError;
use crate::template::QUERY_MARKER;

/// Ordered mapping from endpoint identifier to URL template.
///
/// Read-only to the dispatch loop during a batch; mutations go through
/// the edit lease on [`crate::dispatch::Dispatcher`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointRegistry {
    entries: BTreeMap<String, String>,
}

impl EndpointRegistry {
    /// Build a registry from identifier/template pairs, validating each
    /// template.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Registry`] if any template does not
    /// contain the query marker exactly once, or if an identifier is
    /// duplicated.
    pub fn from_pairs<I, S, T>(pairs: I) -> Result<Self, DispatchError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut entries = BTreeMap::new();
        for (id, template) in pairs {
            let id = id.into();
            let template = template.into();
            validate_template(&id, &template)?;
            if entries.insert(id.clone(), template).is_some() {
                return Err(DispatchError::Registry(format!(
                    "duplicate endpoint identifier \"{id}\""
                )));
            }
        }
        Ok(Self { entries })
    }

    /// The built-in default registry of ~140 endpoints spanning general,
    /// image, video, news, academic, social, shopping, and Q&A providers.
    pub fn defaults() -> Self {
        Self {
            entries: DEFAULT_ENDPOINTS
                .iter()
                .map(|(id, template)| ((*id).to_string(), (*template).to_string()))
                .collect(),
        }
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no endpoints.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the template for an endpoint identifier.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    /// Iterate endpoints in registry (lexicographic identifier) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(id, template)| (id.as_str(), template.as_str()))
    }

    /// Insert or replace an endpoint, validating the template first.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Registry`] if the template does not
    /// contain the query marker exactly once.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<(), DispatchError> {
        let id = id.into();
        let template = template.into();
        validate_template(&id, &template)?;
        self.entries.insert(id, template);
        Ok(())
    }

    /// Remove an endpoint, returning its template if it was registered.
    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.entries.remove(id)
    }

    /// Load and validate a registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Registry`] if the file cannot be read,
    /// is not a JSON object of strings, or any template fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DispatchError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DispatchError::Registry(format!("cannot read {}: {e}", path.display()))
        })?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
            DispatchError::Registry(format!("cannot parse {}: {e}", path.display()))
        })?;
        for (id, template) in &entries {
            validate_template(id, template)?;
        }
        Ok(Self { entries })
    }

    /// Persist the registry as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Registry`] if serialization or the write
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DispatchError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            DispatchError::Registry(format!("cannot serialize registry: {e}"))
        })?;
        std::fs::write(path, json).map_err(|e| {
            DispatchError::Registry(format!("cannot write {}: {e}", path.display()))
        })
    }

    /// Load a registry, substituting and persisting the built-in defaults
    /// when the file is absent or invalid.
    ///
    /// The substitution is logged at warn level; a failed persist of the
    /// defaults is logged but does not prevent the in-memory defaults
    /// from being returned.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(registry) => registry,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "registry unusable, substituting defaults");
                let defaults = Self::defaults();
                if let Err(save_err) = defaults.save(path) {
                    tracing::warn!(error = %save_err, "could not persist default registry");
                }
                defaults
            }
        }
    }
}

/// Check that a template carries the query marker exactly once.
fn validate_template(id: &str, template: &str) -> Result<(), DispatchError> {
    match template.matches(QUERY_MARKER).count() {
        1 => Ok(()),
        0 => Err(DispatchError::Registry(format!(
            "endpoint \"{id}\": template \"{template}\" lacks the {QUERY_MARKER} marker"
        ))),
        n => Err(DispatchError::Registry(format!(
            "endpoint \"{id}\": template contains {n} {QUERY_MARKER} markers, expected 1"
        ))),
    }
}

/// Built-in default endpoint mapping, grouped by category in source order.
/// The core never interprets identifiers; grouping is a reading aid only.
const DEFAULT_ENDPOINTS: &[(&str, &str)] = &[
    // General web search
    ("google", "https://www.google.com/search?q={query}"),
    ("bing", "https://www.bing.com/search?q={query}"),
    ("yahoo", "https://search.yahoo.com/search?p={query}"),
    ("duckduckgo", "https://duckduckgo.com/html/?q={query}"),
    ("brave", "https://search.brave.com/search?q={query}"),
    ("ecosia", "https://www.ecosia.org/search?q={query}"),
    ("startpage", "https://www.startpage.com/sp/search?q={query}"),
    ("yandex", "https://yandex.com/search/?text={query}"),
    ("baidu", "https://www.baidu.com/s?wd={query}"),
    ("naver", "https://search.naver.com/search.naver?query={query}"),
    ("ask", "https://www.ask.com/web?q={query}"),
    ("aol", "https://search.aol.com/aol/search?q={query}"),
    ("dogpile", "https://www.dogpile.com/search?q={query}"),
    ("excite", "https://www.excite.com/search/web?q={query}"),
    ("info", "https://www.info.com/search?q={query}"),
    ("lycos", "https://search.lycos.com/?q={query}"),
    ("metacrawler", "https://www.metacrawler.com/metacrawler/search?q={query}"),
    ("msn", "https://www.msn.com/en-us/search?q={query}"),
    ("mojeek", "https://www.mojeek.com/search?q={query}"),
    ("petal", "https://petalsearch.com/search?q={query}"),
    ("qwant", "https://www.qwant.com/?q={query}"),
    ("rambler", "https://nova.rambler.ru/search?query={query}"),
    ("searchcom", "https://www.search.com/search?q={query}"),
    ("searx", "https://searx.be/search?q={query}"),
    ("seznam", "https://search.seznam.cz/?q={query}"),
    ("sogou", "https://www.sogou.com/web?query={query}"),
    ("swisscows", "https://swisscows.com/en/web?query={query}"),
    ("teoma", "https://search.teoma.com/search?q={query}"),
    ("walla", "https://walla.co.il/?q={query}"),
    ("webcrawler", "https://www.webcrawler.com/serp?q={query}"),
    ("wolframalpha", "https://www.wolframalpha.com/input/?i={query}"),
    ("zapmeta", "https://www.zapmeta.com/web?q={query}"),
    ("gibiru", "https://gibiru.com/results.html?q={query}"),
    ("presearch", "https://presearch.com/search?q={query}"),
    ("goo", "https://search.goo.ne.jp/web.jsp?MT={query}"),
    ("192com", "https://www.192.com/search/people?q={query}"),
    ("abacho", "https://www.abacho.com/search.php?q={query}"),
    ("accoona", "https://www.accoona.com/search.php?q={query}"),
    ("acoon", "https://www.acoon.com/search.php?q={query}"),
    ("adalta", "https://www.adalta.com/search?q={query}"),
    ("adfind", "https://www.adfind.com/search?q={query}"),
    ("aeiwi", "https://www.aeiwi.com/search?q={query}"),
    ("alltheweb", "https://www.alltheweb.com/search?q={query}"),
    ("ansearch", "https://www.ansearch.com/search?q={query}"),
    ("arianna", "https://www.arianna.it/search?q={query}"),
    ("arios", "https://www.arios.com/search?q={query}"),
    ("auone", "https://auone.jp/search?q={query}"),
    ("avivo", "https://www.avivo.com/search?q={query}"),
    ("azekon", "https://www.azekon.com/search?q={query}"),
    ("beekio", "https://beek.io/?s={query}"),
    ("befun", "https://www.befun.com/search?q={query}"),
    ("biglobe", "https://search.biglobe.ne.jp/q/{query}"),
    ("blitzsuche", "https://www.blitzsuche.de/start.php?q={query}"),
    ("bluewin", "https://www.bluewin.ch/fr/search.html?q={query}"),
    ("boardreader", "https://boardreader.com/s/{query}"),
    ("brainboost", "https://www.brainboost.com/search?q={query}"),
    ("business", "https://www.business.com/directory/search/?q={query}"),
    ("centrata", "https://www.centrata.com/search?q={query}"),
    ("chacha", "https://www.chacha.com/search?q={query}"),
    ("cluuz", "https://www.cluuz.com/search?q={query}"),
    ("cosmos", "https://www.cosmos.com.my/search?q={query}"),
    ("crawler", "https://www.crawler.com/search?q={query}"),
    // Image search
    ("google-images", "https://www.google.com/search?tbm=isch&q={query}"),
    ("bing-images", "https://www.bing.com/images/search?q={query}"),
    ("yandex-images", "https://yandex.com/images/search?text={query}"),
    ("flickr", "https://www.flickr.com/search/?text={query}"),
    ("unsplash", "https://unsplash.com/s/photos/{query}"),
    ("pixabay", "https://pixabay.com/images/search/{query}/"),
    ("pexels", "https://www.pexels.com/search/{query}/"),
    ("shutterstock", "https://www.shutterstock.com/search/{query}"),
    ("gettyimages", "https://www.gettyimages.com/photos/{query}"),
    ("freeimages", "https://www.freeimages.com/search/{query}"),
    ("openverse", "https://openverse.org/search/?q={query}"),
    ("giphy", "https://giphy.com/search/{query}"),
    // Video search
    ("youtube", "https://www.youtube.com/results?search_query={query}"),
    ("vimeo", "https://vimeo.com/search?q={query}"),
    ("dailymotion", "https://www.dailymotion.com/search/{query}"),
    ("twitch", "https://www.twitch.tv/search?term={query}"),
    ("rumble", "https://rumble.com/search/all?q={query}"),
    ("bitchute", "https://www.bitchute.com/search/?query={query}"),
    ("odysee", "https://odysee.com/$/search?q={query}"),
    ("metacafe", "https://www.metacafe.com/topics/{query}/"),
    ("veoh", "https://www.veoh.com/find/?query={query}"),
    ("bing-videos", "https://www.bing.com/videos/search?q={query}"),
    // News search
    ("google-news", "https://news.google.com/search?q={query}"),
    ("bing-news", "https://www.bing.com/news/search?q={query}"),
    ("yahoo-news", "https://news.search.yahoo.com/search?p={query}"),
    ("reuters", "https://www.reuters.com/site-search/?query={query}"),
    ("bbc", "https://www.bbc.co.uk/search?q={query}"),
    ("guardian", "https://www.theguardian.com/search?q={query}"),
    ("nytimes", "https://www.nytimes.com/search?query={query}"),
    ("aljazeera", "https://www.aljazeera.com/search/{query}"),
    ("apnews", "https://apnews.com/search?q={query}"),
    ("cnn", "https://edition.cnn.com/search?q={query}"),
    ("euronews", "https://www.euronews.com/search?query={query}"),
    ("dw", "https://www.dw.com/search/?searchNavigationWord={query}"),
    ("france24", "https://www.france24.com/en/search/?q={query}"),
    // Academic search
    ("google-scholar", "https://scholar.google.com/scholar?q={query}"),
    ("semanticscholar", "https://www.semanticscholar.org/search?q={query}"),
    ("pubmed", "https://pubmed.ncbi.nlm.nih.gov/?term={query}"),
    ("arxiv", "https://arxiv.org/abs/{query}"),
    ("arxiv-search", "https://arxiv.org/list?searchtype=all&query={query}"),
    ("core", "https://core.ac.uk/search?q={query}"),
    ("base", "https://www.base-search.net/Search/Results?lookfor={query}"),
    ("doaj", "https://doaj.org/search/articles?source=%7B%22query%22%3A%7B%22query_string%22%3A%7B%22query%22%3A%22{query}%22%7D%7D%7D"),
    ("eric", "https://eric.ed.gov/?q={query}"),
    ("jstor", "https://www.jstor.org/action/doBasicSearch?Query={query}"),
    ("sciencedirect", "https://www.sciencedirect.com/search?qs={query}"),
    ("springer", "https://link.springer.com/search?query={query}"),
    ("ssrn", "https://www.ssrn.com/index.cfm/en/search/?term={query}"),
    // Social search
    ("reddit", "https://www.reddit.com/search/?q={query}"),
    ("twitter", "https://twitter.com/search?q={query}"),
    ("facebook", "https://www.facebook.com/search/top?q={query}"),
    ("instagram", "https://www.instagram.com/explore/tags/{query}/"),
    ("tiktok", "https://www.tiktok.com/search?q={query}"),
    ("pinterest", "https://www.pinterest.com/search/pins/?q={query}"),
    ("tumblr", "https://www.tumblr.com/search/{query}"),
    ("linkedin", "https://www.linkedin.com/search/results/all/?keywords={query}"),
    ("mastodon", "https://mastodon.social/search?q={query}"),
    ("vk", "https://vk.com/search?c%5Bq%5D={query}"),
    ("flipboard", "https://flipboard.com/search/{query}"),
    // Shopping search
    ("amazon", "https://www.amazon.com/s?k={query}"),
    ("ebay", "https://www.ebay.com/sch/i.html?_nkw={query}"),
    ("etsy", "https://www.etsy.com/search?q={query}"),
    ("aliexpress", "https://www.aliexpress.com/wholesale?SearchText={query}"),
    ("walmart", "https://www.walmart.com/search?q={query}"),
    ("target", "https://www.target.com/s?searchTerm={query}"),
    ("bestbuy", "https://www.bestbuy.com/site/searchpage.jsp?st={query}"),
    ("newegg", "https://www.newegg.com/p/pl?d={query}"),
    ("rakuten", "https://search.rakuten.co.jp/search/mall/{query}/"),
    ("wish", "https://www.wish.com/search/{query}"),
    // Q&A search
    ("quora", "https://www.quora.com/search?q={query}"),
    ("stackoverflow", "https://stackoverflow.com/search?q={query}"),
    ("stackexchange", "https://stackexchange.com/search?q={query}"),
    ("superuser", "https://superuser.com/search?q={query}"),
    ("askubuntu", "https://askubuntu.com/search?q={query}"),
    ("serverfault", "https://serverfault.com/search?q={query}"),
    ("answers", "https://www.answers.com/search?q={query}"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_is_large_and_valid() {
        let registry = EndpointRegistry::defaults();
        assert!(
            registry.len() >= 130,
            "expected ~140 default endpoints, got {}",
            registry.len()
        );
        for (id, template) in registry.iter() {
            validate_template(id, template).expect("default entry should validate");
        }
    }

    #[test]
    fn default_identifiers_are_unique() {
        use std::collections::HashSet;
        let ids: HashSet<&str> = DEFAULT_ENDPOINTS.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids.len(), DEFAULT_ENDPOINTS.len());
    }

    #[test]
    fn from_pairs_accepts_valid_templates() {
        let registry = EndpointRegistry::from_pairs([
            ("alpha", "https://a.test/s?q={query}"),
            ("beta", "https://b.test/find/{query}"),
        ])
        .expect("should build");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("alpha"), Some("https://a.test/s?q={query}"));
    }

    #[test]
    fn missing_marker_fails_validation() {
        let err = EndpointRegistry::from_pairs([("alpha", "https://a.test/s?q=fixed")])
            .unwrap_err();
        assert!(matches!(err, DispatchError::Registry(_)));
        assert!(err.to_string().contains("alpha"));
    }

    #[test]
    fn duplicated_marker_fails_validation() {
        let err =
            EndpointRegistry::from_pairs([("alpha", "https://a.test/{query}?q={query}")])
                .unwrap_err();
        assert!(err.to_string().contains("2"));
    }

    #[test]
    fn duplicate_identifier_fails() {
        let err = EndpointRegistry::from_pairs([
            ("alpha", "https://a.test/s?q={query}"),
            ("alpha", "https://other.test/s?q={query}"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn iteration_order_is_sorted_by_identifier() {
        let registry = EndpointRegistry::from_pairs([
            ("zeta", "https://z.test/?q={query}"),
            ("alpha", "https://a.test/?q={query}"),
            ("mid", "https://m.test/?q={query}"),
        ])
        .expect("should build");
        let ids: Vec<&str> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn insert_validates_and_replaces() {
        let mut registry = EndpointRegistry::default();
        registry
            .insert("alpha", "https://a.test/?q={query}")
            .expect("valid insert");
        assert!(registry.insert("alpha", "https://a.test/broken").is_err());
        registry
            .insert("alpha", "https://a.test/v2?q={query}")
            .expect("replace");
        assert_eq!(registry.get("alpha"), Some("https://a.test/v2?q={query}"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_returns_template() {
        let mut registry =
            EndpointRegistry::from_pairs([("alpha", "https://a.test/?q={query}")])
                .expect("should build");
        assert_eq!(
            registry.remove("alpha"),
            Some("https://a.test/?q={query}".to_string())
        );
        assert!(registry.is_empty());
        assert_eq!(registry.remove("alpha"), None);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("registry.json");
        let registry = EndpointRegistry::from_pairs([
            ("alpha", "https://a.test/?q={query}"),
            ("beta", "https://b.test/?q={query}"),
        ])
        .expect("should build");
        registry.save(&path).expect("save");
        let loaded = EndpointRegistry::load(&path).expect("load");
        assert_eq!(loaded, registry);
    }

    #[test]
    fn load_rejects_file_with_invalid_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("registry.json");
        std::fs::write(&path, r#"{"alpha": "https://a.test/no-marker"}"#).expect("write");
        let err = EndpointRegistry::load(&path).unwrap_err();
        assert!(matches!(err, DispatchError::Registry(_)));
    }

    #[test]
    fn load_or_default_substitutes_and_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("registry.json");
        let registry = EndpointRegistry::load_or_default(&path);
        assert_eq!(registry, EndpointRegistry::defaults());
        // Defaults were persisted; a second load reads them back.
        let reloaded = EndpointRegistry::load(&path).expect("persisted defaults should load");
        assert_eq!(reloaded, registry);
    }

    #[test]
    fn load_or_default_keeps_valid_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("registry.json");
        std::fs::write(&path, r#"{"alpha": "https://a.test/?q={query}"}"#).expect("write");
        let registry = EndpointRegistry::load_or_default(&path);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("alpha"), Some("https://a.test/?q={query}"));
    }
}
