//! Example-trained structural extractor.
//!
//! Training takes a page's markup and a list of wanted strings. Every element
//! whose text (or `href`/`src`, resolved against the page address) equals a
//! wanted string contributes a [`PatternRule`]: the chain of tag names and
//! class lists from the document root down to that element. Matching walks a
//! new document and returns the text (or attribute) of every element whose
//! chain equals a learned rule.
//!
//! Rules are learned from the seed page only. Later pages whose structure
//! differs simply yield nothing.
//!
//! Like the heuristics, everything that touches `scraper` is synchronous
//! (its types are `!Send`); the async [`PatternSource`] only performs the
//! training fetch before handing markup to [`LearnedPattern::build`].

use crate::acquisition::http_client::HttpClient;
use async_trait::async_trait;
use indexmap::IndexSet;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Attributes whose values can be learned as targets.
const LEARNABLE_ATTRIBUTES: [&str; 2] = ["href", "src"];

/// Failures of pattern training or matching.
#[derive(thiserror::Error, Debug)]
pub enum PatternError {
    /// The seed page could not be fetched for training.
    #[error("training fetch of {url} failed: {message}")]
    TrainingFetch { url: String, message: String },

    /// A matcher failed on a page.
    #[error("{0}")]
    Matcher(String),
}

/// Trains a matcher for one seed.
#[async_trait]
pub trait PatternSource: Send + Sync {
    async fn train(
        &self,
        seed_url: &str,
        wanted: &[String],
    ) -> Result<Box<dyn PatternMatcher>, PatternError>;
}

/// A trained extractor applied to each rendered page.
pub trait PatternMatcher: Send + Sync {
    /// Fragments of `html` structurally similar to the training examples.
    fn similar(&self, html: &str, page_url: &str) -> Result<Vec<String>, PatternError>;
}

/// One level of an element's ancestry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    pub tag: String,
    /// Sorted class names.
    pub classes: Vec<String>,
}

/// What a rule reads from a matching element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Text,
    Attribute(String),
}

/// A learned root-to-element path and the value it reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternRule {
    pub path: Vec<PathSegment>,
    pub target: Target,
}

/// The set of rules learned from one training page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearnedPattern {
    rules: Vec<PatternRule>,
}

impl LearnedPattern {
    /// Learn rules from `html` for every wanted string found in it.
    pub fn build(html: &str, page_url: &str, wanted: &[String]) -> Self {
        let wanted: IndexSet<String> = wanted
            .iter()
            .map(|w| normalize(w))
            .filter(|w| !w.is_empty())
            .collect();
        if wanted.is_empty() {
            return Self::default();
        }

        let document = Html::parse_document(html);
        let base = url::Url::parse(page_url).ok();
        let mut rules: IndexSet<PatternRule> = IndexSet::new();

        for el in elements(&document) {
            let text = normalize(&el.text().collect::<String>());
            if wanted.contains(&text) && !has_child_with_text(&el, &text) {
                rules.insert(PatternRule {
                    path: path_of(&el),
                    target: Target::Text,
                });
            }

            for attr in LEARNABLE_ATTRIBUTES {
                let Some(raw) = el.value().attr(attr) else {
                    continue;
                };
                let raw = raw.trim();
                if raw.is_empty() {
                    continue;
                }
                let resolved = resolve(base.as_ref(), raw);
                if wanted.contains(raw) || wanted.contains(&resolved) {
                    rules.insert(PatternRule {
                        path: path_of(&el),
                        target: Target::Attribute(attr.to_string()),
                    });
                }
            }
        }

        debug!("learned {} rules from {page_url}", rules.len());
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply the learned rules to `html`. Document order, deduplicated.
    pub fn extract(&self, html: &str, page_url: &str) -> Vec<String> {
        if self.rules.is_empty() {
            return Vec::new();
        }

        let document = Html::parse_document(html);
        let base = url::Url::parse(page_url).ok();
        let mut found: IndexSet<String> = IndexSet::new();

        for el in elements(&document) {
            let tag = el.value().name();
            // Cheap pre-filter before building the full path.
            if !self
                .rules
                .iter()
                .any(|r| r.path.last().is_some_and(|s| s.tag == tag))
            {
                continue;
            }
            let path = path_of(&el);
            for rule in self.rules.iter().filter(|r| r.path == path) {
                let value = match &rule.target {
                    Target::Text => el.text().collect::<String>().trim().to_string(),
                    Target::Attribute(name) => el
                        .value()
                        .attr(name)
                        .map(|v| resolve(base.as_ref(), v.trim()))
                        .unwrap_or_default(),
                };
                if !value.is_empty() {
                    found.insert(value);
                }
            }
        }

        found.into_iter().collect()
    }
}

impl PatternMatcher for LearnedPattern {
    fn similar(&self, html: &str, page_url: &str) -> Result<Vec<String>, PatternError> {
        Ok(self.extract(html, page_url))
    }
}

/// Trains on the seed's static markup fetched over plain HTTP.
pub struct HttpPatternSource {
    client: HttpClient,
}

impl HttpPatternSource {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PatternSource for HttpPatternSource {
    async fn train(
        &self,
        seed_url: &str,
        wanted: &[String],
    ) -> Result<Box<dyn PatternMatcher>, PatternError> {
        let resp = self
            .client
            .get(seed_url)
            .await
            .map_err(|e| PatternError::TrainingFetch {
                url: seed_url.to_string(),
                message: format!("{e:#}"),
            })?;
        if !(200..300).contains(&resp.status) {
            warn!("training page {seed_url} returned HTTP {}", resp.status);
        }

        let pattern = LearnedPattern::build(&resp.body, &resp.final_url, wanted);
        if pattern.is_empty() {
            warn!("none of the {} examples were found on {seed_url}", wanted.len());
        }
        Ok(Box::new(pattern))
    }
}

fn elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
}

fn has_child_with_text(el: &ElementRef<'_>, text: &str) -> bool {
    el.children()
        .filter_map(ElementRef::wrap)
        .any(|child| normalize(&child.text().collect::<String>()) == text)
}

fn path_of(el: &ElementRef<'_>) -> Vec<PathSegment> {
    let mut path: Vec<PathSegment> = el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .map(|a| segment(&a))
        .collect();
    path.reverse();
    path.push(segment(el));
    path
}

fn segment(el: &ElementRef<'_>) -> PathSegment {
    let mut classes: Vec<String> = el.value().classes().map(String::from).collect();
    classes.sort();
    PathSegment {
        tag: el.value().name().to_string(),
        classes,
    }
}

/// Collapse internal whitespace and trim.
fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn resolve(base: Option<&url::Url>, raw: &str) -> String {
    base.and_then(|b| b.join(raw).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| raw.to_string())
}
