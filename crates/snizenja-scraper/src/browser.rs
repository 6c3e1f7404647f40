//! Headless Chrome wrapper for the stores whose listings only render via
//! JavaScript or a "load more" control.
//!
//! Instances are store-scoped: opened at the start of a store's list pass
//! and explicitly closed — including on the error path — before the next
//! store starts, which bounds peak memory to one browser.

use std::time::Duration;

use chromiumoxide::browser::{Browser as ChromeBrowser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;

use crate::error::ScraperError;
use crate::pass::DelayPolicy;

/// A launched headless Chrome instance plus its CDP event-handler task.
pub struct Browser {
    browser: ChromeBrowser,
    handler_task: tokio::task::JoinHandle<()>,
}

impl Browser {
    /// Launches headless Chrome. `chrome_executable` overrides binary
    /// discovery when set.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] if the browser cannot be
    /// configured or launched.
    pub async fn launch(chrome_executable: Option<&str>) -> Result<Self, ScraperError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--mute-audio")
            .window_size(1920, 1080);
        if let Some(path) = chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| ScraperError::Browser(format!("browser config: {e}")))?;

        let (browser, mut handler) = ChromeBrowser::launch(config)
            .await
            .map_err(|e| ScraperError::Browser(format!("launch: {e}")))?;

        // The handler stream must be drained for the CDP connection to make
        // progress; individual event errors are not fatal.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    continue;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Navigates to `url` and waits for the initial load.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] on navigation failure.
    pub async fn open(&self, url: &str) -> Result<BrowserPage, ScraperError> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| ScraperError::Browser(format!("open {url}: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| ScraperError::Browser(format!("navigate {url}: {e}")))?;
        Ok(BrowserPage { page })
    }

    /// Closes the browser and reaps the child process. Must be called on
    /// every path; dropping without closing leaks a Chrome process until
    /// the handler task dies.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "browser close failed");
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!(error = %e, "browser wait failed");
        }
        self.handler_task.abort();
    }
}

/// One open tab.
pub struct BrowserPage {
    page: Page,
}

impl BrowserPage {
    /// Returns the current rendered HTML of the page.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] if content cannot be read.
    pub async fn content(&self) -> Result<String, ScraperError> {
        self.page
            .content()
            .await
            .map_err(|e| ScraperError::Browser(format!("content: {e}")))
    }

    /// Clicks the first element matching `selector` if present. Returns
    /// `false` without error when the element is gone — the usual
    /// "load more exhausted" signal.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] if the click itself fails.
    pub async fn click_if_present(&self, selector: &str) -> Result<bool, ScraperError> {
        let Ok(element) = self.page.find_element(selector).await else {
            return Ok(false);
        };
        element
            .click()
            .await
            .map_err(|e| ScraperError::Browser(format!("click {selector}: {e}")))?;
        Ok(true)
    }

    /// Counts elements matching `selector` in the live DOM.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] if evaluation fails.
    pub async fn count(&self, selector: &str) -> Result<usize, ScraperError> {
        let expr = format!("document.querySelectorAll('{selector}').length");
        let value = self
            .page
            .evaluate(expr)
            .await
            .map_err(|e| ScraperError::Browser(format!("count {selector}: {e}")))?;
        value
            .into_value::<usize>()
            .map_err(|e| ScraperError::Browser(format!("count {selector}: {e}")))
    }

    /// Repeatedly activates a "load more" control until it disappears, the
    /// page stops growing, or `max_clicks` is reached (the safety valve
    /// against a changed site looping forever).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] if a click or count fails.
    pub async fn load_all(
        &self,
        button_selector: &str,
        card_selector: &str,
        max_clicks: usize,
        delay: DelayPolicy,
    ) -> Result<(), ScraperError> {
        let mut previous = self.count(card_selector).await?;

        for click in 0..max_clicks {
            if !self.click_if_present(button_selector).await? {
                tracing::debug!(clicks = click, "load-more control gone");
                return Ok(());
            }

            delay.pause().await;
            // Give the site's XHR a moment beyond the politeness delay.
            tokio::time::sleep(Duration::from_millis(250)).await;

            let current = self.count(card_selector).await?;
            if current <= previous {
                tracing::debug!(clicks = click, cards = current, "page stopped growing");
                return Ok(());
            }
            previous = current;
        }

        tracing::warn!(max_clicks, "load-more ceiling reached");
        Ok(())
    }
}
