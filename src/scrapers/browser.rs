use crate::config::{SelectorConfig, Timeouts};
use crate::error::{ScrapeError, StepOutcome};
use crate::scrapers::traits::PageSource;
use crate::scrapers::types::{SettleState, SettleTracker};
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::fmt::Display;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Renders accordion listing pages in headless Chrome
#[derive(Debug, Clone)]
pub struct BrowserPageSource {
    selectors: SelectorConfig,
    timeouts: Timeouts,
    user_agent: String,
    debug_dir: Option<PathBuf>,
}

impl BrowserPageSource {
    pub fn new(
        selectors: SelectorConfig,
        timeouts: Timeouts,
        user_agent: impl Into<String>,
        debug_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            selectors,
            timeouts,
            user_agent: user_agent.into(),
            debug_dir,
        }
    }

    /// Launch Chrome, render `url`, and shut Chrome down again.
    ///
    /// The browser lives only inside this call; dropping it kills the
    /// Chrome process, so every return path releases it.
    fn render(&self, url: &str) -> Result<String, ScrapeError> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((1920, 1080)))
            .idle_browser_timeout(self.timeouts.listing().max(Duration::from_secs(30)) * 2)
            .build()
            .map_err(browser_err("failed to build launch options"))?;

        let browser = Browser::new(options).map_err(browser_err("failed to launch Chrome"))?;
        let result = self.drive(&browser, url);
        drop(browser);
        debug!("Chrome closed");
        result
    }

    fn drive(&self, browser: &Browser, url: &str) -> Result<String, ScrapeError> {
        // Open a tab
        let tab = browser.new_tab().map_err(browser_err("failed to open tab"))?;
        tab.set_default_timeout(self.timeouts.listing());

        if let Err(e) = tab.set_user_agent(&self.user_agent, None, None) {
            warn!("Could not set user agent: {}", e);
        }

        // Navigate to listing page
        info!("Navigating to URL: {}", url);
        tab.navigate_to(url).map_err(browser_err("navigation failed"))?;
        if let Err(e) = tab.wait_until_navigated() {
            warn!("Page did not report navigation complete: {}", e);
        }

        // Accept cookies if present, open availability if needed
        log_step("Cookie consent", &self.dismiss_consent(&tab));
        log_step("Availability view", &self.open_availability(&tab));

        // Wait for floor plans to load
        let listing = &self.selectors.floor_plan_item;
        tab.wait_for_element_with_custom_timeout(listing, self.timeouts.listing())
            .map_err(|_| ScrapeError::RenderTimeout {
                selector: listing.clone(),
                waited: self.timeouts.listing(),
            })?;

        // Expand all floor plans
        let expanded = self.expand_floor_plans(&tab);
        self.wait_for_rows(&tab, self.timeouts.final_settle());
        info!(
            "Expanded {} floor plans, {} unit rows on page",
            expanded,
            self.unit_row_count(&tab)
        );

        // Capture expanded HTML
        let html = tab
            .get_content()
            .map_err(browser_err("failed to read page content"))?;
        self.capture_diagnostics(&tab, &html);

        Ok(html)
    }

    fn dismiss_consent(&self, tab: &Tab) -> StepOutcome {
        let button = match tab.wait_for_element_with_custom_timeout(
            &self.selectors.consent_button,
            self.timeouts.consent(),
        ) {
            Ok(button) => button,
            Err(_) => return StepOutcome::NotApplicable,
        };

        match button.click() {
            Ok(_) => StepOutcome::Succeeded,
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    }

    /// Click the "Availability" link unless floor plans are already showing.
    fn open_availability(&self, tab: &Tab) -> StepOutcome {
        let script = format!(
            r#"(() => {{
                if (document.querySelector({list})) return "present";
                const link = Array.from(document.querySelectorAll("a"))
                    .find(a => a.textContent.trim() === {text});
                if (!link) return "missing";
                link.click();
                return "clicked";
            }})()"#,
            list = js_string(&self.selectors.floor_plan_item),
            text = js_string(&self.selectors.availability_link_text),
        );

        let outcome = match tab.evaluate(&script, false) {
            Ok(result) => result.value,
            Err(e) => return StepOutcome::Failed(e.to_string()),
        };

        match outcome.as_ref().and_then(|v| v.as_str()) {
            Some("clicked") => {
                if let Err(e) = tab.wait_until_navigated() {
                    debug!("No navigation after availability click: {}", e);
                }
                StepOutcome::Succeeded
            }
            Some(_) => StepOutcome::NotApplicable,
            None => StepOutcome::Failed("availability check returned no value".to_string()),
        }
    }

    /// Click every floor-plan trigger so its unit rows get injected.
    fn expand_floor_plans(&self, tab: &Tab) -> usize {
        let triggers = match tab.find_elements(&self.selectors.expand_trigger) {
            Ok(triggers) => triggers,
            Err(e) => {
                warn!("No floor plan triggers found: {}", e);
                return 0;
            }
        };
        info!("Found {} floor plans", triggers.len());

        let mut expanded = 0;
        for (idx, trigger) in triggers.iter().enumerate() {
            match trigger.click() {
                Ok(_) => {
                    expanded += 1;
                    self.wait_for_rows(tab, self.timeouts.expansion_settle());
                }
                Err(e) => warn!("Could not click floor plan {}: {}", idx, e),
            }
        }
        expanded
    }

    /// Poll the unit-row count until it settles or `bound` passes.
    fn wait_for_rows(&self, tab: &Tab, bound: Duration) {
        let started = Instant::now();
        let mut tracker = SettleTracker::new(self.unit_row_count(tab), bound);

        loop {
            thread::sleep(self.timeouts.poll_interval());
            match tracker.observe(self.unit_row_count(tab), started.elapsed()) {
                SettleState::Waiting => continue,
                SettleState::Stable => {
                    debug!("Unit rows settled after {:?}", started.elapsed());
                    break;
                }
                SettleState::TimedOut => {
                    debug!("Settle bound of {:?} reached", bound);
                    break;
                }
            }
        }
    }

    fn unit_row_count(&self, tab: &Tab) -> u64 {
        let script = format!(
            "document.querySelectorAll({}).length",
            js_string(&self.selectors.unit_row)
        );
        tab.evaluate(&script, false)
            .ok()
            .and_then(|result| result.value)
            .and_then(|value| value.as_u64())
            .unwrap_or(0)
    }

    /// Save the rendered HTML and a screenshot. Failures are only logged.
    fn capture_diagnostics(&self, tab: &Tab, html: &str) {
        let Some(dir) = &self.debug_dir else {
            return;
        };
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("Could not create debug directory {}: {}", dir.display(), e);
            return;
        }

        let html_path = dir.join("page.html");
        match std::fs::write(&html_path, html) {
            Ok(()) => info!("Saved page HTML to {} ({} bytes)", html_path.display(), html.len()),
            Err(e) => warn!("Could not save page HTML: {}", e),
        }

        let png_path = dir.join("page.png");
        let screenshot = tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| e.to_string())
            .and_then(|data| std::fs::write(&png_path, data).map_err(|e| e.to_string()));
        match screenshot {
            Ok(()) => info!("Saved screenshot to {}", png_path.display()),
            Err(e) => warn!("Could not save screenshot: {}", e),
        }
    }
}

#[async_trait]
impl PageSource for BrowserPageSource {
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        let source = self.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || source.render(&url))
            .await
            .map_err(|e| ScrapeError::Browser(format!("render task failed: {e}")))?
    }

    fn source_name(&self) -> &'static str {
        "headless-chrome"
    }
}

fn log_step(step: &str, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Succeeded => info!("{}: done", step),
        StepOutcome::NotApplicable => info!("{}: not needed", step),
        StepOutcome::Failed(reason) => info!("{}: skipped after error ({})", step, reason),
    }
}

fn browser_err<E: Display>(context: &'static str) -> impl FnOnce(E) -> ScrapeError {
    move |e| ScrapeError::Browser(format!("{context}: {e}"))
}

/// Quote `value` as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes_quotes() {
        assert_eq!(js_string("Availability"), "\"Availability\"");
        assert_eq!(
            js_string(r#"a[data-x="1"]"#),
            r#""a[data-x=\"1\"]""#
        );
    }

    #[test]
    fn test_browser_err_keeps_context() {
        let err = browser_err("failed to launch Chrome")("no binary");
        assert_eq!(err.to_string(), "browser error: failed to launch Chrome: no binary");
    }
}
