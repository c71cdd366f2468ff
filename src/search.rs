//! Keyword site search.
//!
//! The query is lower-cased and trimmed, then matched against the ordered
//! [`SearchRoute`] table by substring; the first route with a hit wins.

use crate::config::{SearchConfig, SearchRoute};

/// Shown when the search box is blank.
pub const EMPTY_QUERY_NOTICE: &str = "Please enter a search term.";
/// Shown when no route matches.
pub const NO_RESULTS_NOTICE: &str =
    "No results found. Try searching for Marvel, DC, or MonsterVerse.";

/// Result of one search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Go to `url` (the route's page under the site root).
    Navigate { destination: String, url: String },
    NoResults,
    EmptyQuery,
}

impl SearchOutcome {
    /// User-facing notice, if this outcome needs one.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            SearchOutcome::Navigate { .. } => None,
            SearchOutcome::NoResults => Some(NO_RESULTS_NOTICE),
            SearchOutcome::EmptyQuery => Some(EMPTY_QUERY_NOTICE),
        }
    }
}

/// Resolve `query` against the configured routes.
pub fn search(config: &SearchConfig, query: &str) -> SearchOutcome {
    let clean = query.trim().to_lowercase();
    if clean.is_empty() {
        return SearchOutcome::EmptyQuery;
    }

    match find_route(&config.routes, &clean) {
        Some(route) => {
            log::info!("search: {clean:?} → {}", route.name);
            SearchOutcome::Navigate {
                destination: route.name.clone(),
                url: join_url(&config.site_root, &route.page),
            }
        }
        None => {
            log::debug!("search: no route for {clean:?}");
            SearchOutcome::NoResults
        }
    }
}

fn find_route<'a>(routes: &'a [SearchRoute], clean: &str) -> Option<&'a SearchRoute> {
    routes.iter().find(|route| {
        route
            .keywords
            .iter()
            .any(|keyword| clean.contains(keyword.to_lowercase().as_str()))
    })
}

fn join_url(root: &str, page: &str) -> String {
    if root.is_empty() {
        page.to_string()
    } else {
        format!("{}/{}", root.trim_end_matches('/'), page.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination(query: &str) -> Option<String> {
        match search(&SearchConfig::default(), query) {
            SearchOutcome::Navigate { destination, .. } => Some(destination),
            _ => None,
        }
    }

    #[test]
    fn marvel_query_goes_to_marvel() {
        assert_eq!(destination("I love Marvel movies").as_deref(), Some("Marvel"));
    }

    #[test]
    fn godzilla_query_goes_to_monsterverse() {
        assert_eq!(
            destination("Godzilla vs Kong").as_deref(),
            Some("MonsterVerse")
        );
    }

    #[test]
    fn dc_query_goes_to_dc() {
        assert_eq!(destination("  DC comics ").as_deref(), Some("DC"));
    }

    #[test]
    fn earlier_route_wins() {
        assert_eq!(destination("marvel vs dc").as_deref(), Some("Marvel"));
    }

    #[test]
    fn unknown_query_has_no_results() {
        let outcome = search(&SearchConfig::default(), "xyz");
        assert_eq!(outcome, SearchOutcome::NoResults);
        assert_eq!(outcome.notice(), Some(NO_RESULTS_NOTICE));
    }

    #[test]
    fn blank_query_asks_for_a_term() {
        let outcome = search(&SearchConfig::default(), "   ");
        assert_eq!(outcome, SearchOutcome::EmptyQuery);
        assert_eq!(outcome.notice(), Some(EMPTY_QUERY_NOTICE));
    }

    #[test]
    fn url_joins_site_root_and_page() {
        let config = SearchConfig {
            site_root: "https://friday.example/site/".into(),
            ..SearchConfig::default()
        };
        assert_eq!(
            search(&config, "kong"),
            SearchOutcome::Navigate {
                destination: "MonsterVerse".into(),
                url: "https://friday.example/site/monstervers.html".into(),
            }
        );
    }
}
