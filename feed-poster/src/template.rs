use crate::types::{Account, PosterError, RenderableArticle, Result, DEFAULT_FORMAT};
use handlebars::Handlebars;
use tracing::{debug, info, warn};

/// Compiled render templates, one per feed, keyed by the feed's source URL.
pub struct TemplateRegistry {
    templates: Handlebars<'static>,
}

impl TemplateRegistry {
    /// Compile every feed template of every account.
    ///
    /// Also fills in the default format for feeds that leave it blank. Any
    /// template that fails to compile fails the whole registry.
    pub fn compile(accounts: &mut [Account]) -> Result<Self> {
        let mut templates = Handlebars::new();
        templates.set_strict_mode(true);
        // Output is posted as-is, not embedded in HTML.
        templates.register_escape_fn(handlebars::no_escape);

        for account in accounts.iter_mut() {
            for feed in account.feeds.iter_mut() {
                if templates.has_template(&feed.url) {
                    warn!("Template for [{}] registered more than once; the last one wins", feed.url);
                }
                templates
                    .register_template_string(&feed.url, &feed.template)
                    .map_err(|e| PosterError::TemplateCompile {
                        template: feed.template.clone(),
                        source: Box::new(e),
                    })?;

                if feed.format.trim().is_empty() {
                    feed.format = DEFAULT_FORMAT.to_string();
                }
                debug!(
                    "Compiled template for [{}] (account {}, format {}, jitter {:?})",
                    feed.url, account.name, feed.format, feed.time_jitter
                );
            }
        }

        info!("Compiled {} template(s)", templates.get_templates().len());
        Ok(Self { templates })
    }

    pub fn contains(&self, feed_url: &str) -> bool {
        self.templates.has_template(feed_url)
    }

    /// Execute the template registered for `feed_url` against `article`.
    pub fn render(&self, feed_url: &str, article: &RenderableArticle) -> Result<String> {
        if !self.contains(feed_url) {
            return Err(PosterError::TemplateNotFound(feed_url.to_string()));
        }

        self.templates
            .render(feed_url, article)
            .map_err(|e| PosterError::TemplateRender {
                feed_url: feed_url.to_string(),
                source: Box::new(e),
            })
    }
}
