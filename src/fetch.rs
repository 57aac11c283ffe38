//! Page retrieval, record extraction and the pagination driver.

use std::collections::HashSet;

use anyhow::{Context, Result};
use itertools::Itertools;
use lazy_regex::regex;
use ureq::Agent;

use crate::{
    data::{Category, Item, Rating, State, MAX_RATING},
    expr::TagExpr,
    stats::Aggregator,
};

/// Catalog page size. A page with fewer records than this is the
/// last page of its listing; the catalog has no explicit end marker.
pub const ITEMS_PER_PAGE: usize = 24;

/// Transport seam for one page of one listing. HTTP in real runs,
/// canned data in tests.
pub trait PageFetcher {
    fn fetch(
        &self,
        category: Category,
        state: State,
        page: u32,
    ) -> Result<Vec<Item>>;
}

pub struct HttpFetcher {
    agent: Agent,
    base_url: String,
    username: String,
}

impl HttpFetcher {
    pub fn new(username: impl Into<String>) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(std::time::Duration::from_secs(30)))
            .build();
        HttpFetcher {
            agent: Agent::new_with_config(config),
            base_url: "https://bgm.tv".into(),
            username: username.into(),
        }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(
        &self,
        category: Category,
        state: State,
        page: u32,
    ) -> Result<Vec<Item>> {
        let url = format!(
            "{}/{}/list/{}/{}?page={}",
            self.base_url, category, self.username, state, page
        );
        let body = self
            .agent
            .get(&url)
            .call()
            .with_context(|| format!("failed to fetch {url}"))?
            .body_mut()
            .read_to_string()
            .with_context(|| format!("failed to read {url}"))?;
        Ok(extract_items(&body))
    }
}

/// Pull item records out of a listing page, in catalog order. Each
/// record is a `<li id="item_...">` block; the score sits in a
/// `sstars{n} starsinfo` class and the tags in the collect-info tip
/// line after the tag marker. An unrated block scores 0.
pub fn extract_items(page: &str) -> Vec<Item> {
    let starts: Vec<usize> = regex!(r#"<li id="item_\d+""#)
        .find_iter(page)
        .map(|m| m.start())
        .collect();

    let mut items = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(page.len());
        items.push(extract_item(&page[start..end]));
    }
    items
}

fn extract_item(block: &str) -> Item {
    let score = regex!(r"sstars(\d+) starsinfo")
        .captures(block)
        .and_then(|c| c[1].parse::<Rating>().ok())
        .filter(|&r| (1..=MAX_RATING).contains(&r))
        .unwrap_or(0);
    let tags = regex!(r"标签: ([^<]*)")
        .captures(block)
        .map(|c| {
            c[1].split_whitespace().map(str::to_string).collect()
        })
        .unwrap_or_default();
    Item { score, tags }
}

/// Walk every (category, state) listing page by page, filter each
/// record through the compiled predicate and feed accepted records
/// into the shared aggregator. Any fetch failure aborts the whole
/// run; there are no retries and no partial results.
pub fn collect_items(
    fetcher: &impl PageFetcher,
    categories: &[Category],
    states: &[State],
    filter: &TagExpr,
    agg: &mut Aggregator,
) -> Result<()> {
    for (&category, &state) in categories.iter().cartesian_product(states)
    {
        log::info!("fetching {category}/{state}");
        for page in 1.. {
            let items = fetcher.fetch(category, state, page)?;
            let count = items.len();
            log::info!("  page {page}: {count} records");

            for item in &items {
                let tags: HashSet<String> = item
                    .tags
                    .iter()
                    .map(|t| t.to_lowercase())
                    .collect();
                if filter.matches(&tags) {
                    agg.accumulate(item);
                }
            }

            // A short page ends the listing. A listing sized at an
            // exact multiple of the page size costs one trailing
            // empty fetch before this triggers.
            if count < ITEMS_PER_PAGE {
                break;
            }
        }
    }
    Ok(())
}
