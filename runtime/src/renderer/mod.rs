//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `BrowserLauncher`, `Renderer` and `RenderContext` traits that
//! abstract over the browser engine (currently Chromium via chromiumoxide).
//! A harvest launches one renderer per seed and opens a single context on it.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// Outcome of looking up the first element matching a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorMatch {
    /// Nothing on the page matches.
    Missing,
    /// The first match, with the requested attribute if present.
    Found { attribute: Option<String> },
}

/// Starts browser engines.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a fresh browser engine.
    async fn launch(&self) -> Result<Box<dyn Renderer>>;
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(self: Box<Self>) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Get the full page HTML.
    async fn get_html(&self) -> Result<String>;
    /// Look up the first element matching `selector` and read `attribute`.
    async fn first_match(&self, selector: &str, attribute: &str) -> Result<SelectorMatch>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}
