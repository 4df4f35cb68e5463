//! In-memory browser and pattern fakes shared by the integration tests.

#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use pagesift::extraction::pattern::{PatternError, PatternMatcher, PatternSource};
use pagesift::renderer::{
    BrowserLauncher, NavigationResult, RenderContext, Renderer, SelectorMatch,
};
use pagesift::traversal::TraversalSettings;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Where a page's "next" selector points.
#[derive(Debug, Clone)]
pub enum NextLink {
    /// The selector matches nothing.
    Missing,
    /// The selector matches an element without the attribute.
    NoHref,
    Href(String),
}

#[derive(Debug, Clone)]
pub struct FakePage {
    pub html: String,
    pub next: NextLink,
}

impl FakePage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            next: NextLink::Missing,
        }
    }

    pub fn next(mut self, href: &str) -> Self {
        self.next = NextLink::Href(href.to_string());
        self
    }

    pub fn next_without_href(mut self) -> Self {
        self.next = NextLink::NoHref;
        self
    }
}

/// Counters and history recorded across every browser the site hands out.
#[derive(Debug, Default)]
pub struct SiteLog {
    pub launches: usize,
    pub shutdowns: usize,
    pub contexts_opened: usize,
    pub contexts_closed: usize,
    pub navigations: Vec<String>,
    pub selector_queries: usize,
}

/// A fake web: addresses mapped to pages. Unknown addresses fail to load.
#[derive(Clone, Default)]
pub struct FakeSite {
    pages: Arc<HashMap<String, FakePage>>,
    pub log: Arc<Mutex<SiteLog>>,
    fail_launch: bool,
    fail_context: bool,
    fail_selector: bool,
}

impl FakeSite {
    pub fn new(pages: Vec<(&str, FakePage)>) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|(url, page)| (url.to_string(), page))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub fn failing_context(mut self) -> Self {
        self.fail_context = true;
        self
    }

    pub fn failing_selector(mut self) -> Self {
        self.fail_selector = true;
        self
    }

    pub fn context(&self) -> FakeContext {
        self.log.lock().unwrap().contexts_opened += 1;
        FakeContext {
            site: self.clone(),
            current: None,
        }
    }

    pub fn navigations(&self) -> Vec<String> {
        self.log.lock().unwrap().navigations.clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeSite {
    async fn launch(&self) -> Result<Box<dyn Renderer>> {
        if self.fail_launch {
            bail!("no browser binary");
        }
        self.log.lock().unwrap().launches += 1;
        Ok(Box::new(FakeRenderer { site: self.clone() }))
    }
}

pub struct FakeRenderer {
    site: FakeSite,
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        if self.site.fail_context {
            bail!("target crashed");
        }
        Ok(Box::new(self.site.context()))
    }

    async fn shutdown(self: Box<Self>) -> Result<()> {
        self.site.log.lock().unwrap().shutdowns += 1;
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        let log = self.site.log.lock().unwrap();
        log.contexts_opened - log.contexts_closed
    }
}

pub struct FakeContext {
    site: FakeSite,
    current: Option<FakePage>,
}

#[async_trait]
impl RenderContext for FakeContext {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        self.site.log.lock().unwrap().navigations.push(url.to_string());
        match self.site.pages.get(url) {
            Some(page) => {
                self.current = Some(page.clone());
                Ok(NavigationResult {
                    final_url: url.to_string(),
                    load_time_ms: 1,
                })
            }
            None => {
                self.current = None;
                Err(anyhow!("net::ERR_NAME_NOT_RESOLVED"))
            }
        }
    }

    async fn get_html(&self) -> Result<String> {
        self.current
            .as_ref()
            .map(|p| p.html.clone())
            .ok_or_else(|| anyhow!("no document"))
    }

    async fn first_match(&self, _selector: &str, _attribute: &str) -> Result<SelectorMatch> {
        self.site.log.lock().unwrap().selector_queries += 1;
        if self.site.fail_selector {
            bail!("DOMException: not a valid selector");
        }
        Ok(match self.current.as_ref().map(|p| &p.next) {
            None | Some(NextLink::Missing) => SelectorMatch::Missing,
            Some(NextLink::NoHref) => SelectorMatch::Found { attribute: None },
            Some(NextLink::Href(href)) => SelectorMatch::Found {
                attribute: Some(href.clone()),
            },
        })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.site.log.lock().unwrap().contexts_closed += 1;
        Ok(())
    }
}

/// A matcher that returns a fixed list on every page.
pub struct FixedMatcher(pub Vec<String>);

impl PatternMatcher for FixedMatcher {
    fn similar(&self, _html: &str, _page_url: &str) -> Result<Vec<String>, PatternError> {
        Ok(self.0.clone())
    }
}

/// A matcher that fails on every page.
pub struct FailingMatcher;

impl PatternMatcher for FailingMatcher {
    fn similar(&self, _html: &str, _page_url: &str) -> Result<Vec<String>, PatternError> {
        Err(PatternError::Matcher("selector path no longer exists".to_string()))
    }
}

/// Pattern source handing out fake matchers; chosen seeds fail to train.
#[derive(Default)]
pub struct FakePatterns {
    pub learned: Vec<String>,
    pub failing_matcher: bool,
    pub untrainable: HashSet<String>,
    pub trained: Mutex<Vec<String>>,
}

#[async_trait]
impl PatternSource for FakePatterns {
    async fn train(
        &self,
        seed_url: &str,
        _wanted: &[String],
    ) -> Result<Box<dyn PatternMatcher>, PatternError> {
        self.trained.lock().unwrap().push(seed_url.to_string());
        if self.untrainable.contains(seed_url) {
            return Err(PatternError::TrainingFetch {
                url: seed_url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        if self.failing_matcher {
            Ok(Box::new(FailingMatcher))
        } else {
            Ok(Box::new(FixedMatcher(self.learned.clone())))
        }
    }
}

pub fn settings(selector: Option<&str>) -> TraversalSettings {
    TraversalSettings {
        pagination_selector: selector.map(String::from),
        settle: Duration::ZERO,
        navigation_timeout_ms: 1000,
        per_page_limit: 10,
    }
}

pub fn headlines(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("<h2>{prefix} headline {i}</h2>"))
        .collect::<Vec<_>>()
        .join("\n")
}
