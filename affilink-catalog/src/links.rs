//! Outbound URL construction.
//!
//! The affiliate path template is parsed once into segments, so formatting
//! a URL never fails.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Path appended to the base URL for affiliate links (SliceWP layout).
pub const DEFAULT_AFFILIATE_TEMPLATE: &str = "/slicewp_affiliate/{affiliate_id}/{slug}/";

pub const DEFAULT_BASE_URL: &str = "https://entremotivator.com";

const AFFILIATE_ID: &str = "affiliate_id";
const SLUG: &str = "slug";

/// Link settings as they appear in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub base_url: String,
    pub affiliate_path_template: String,
    /// Commission percentage written into the affiliate program export.
    pub commission_rate: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            affiliate_path_template: DEFAULT_AFFILIATE_TEMPLATE.to_string(),
            commission_rate: 10.0,
        }
    }
}

impl LinkConfig {
    pub fn formatter(&self) -> Result<LinkFormatter, ConfigError> {
        LinkFormatter::new(&self.base_url, &self.affiliate_path_template)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    AffiliateId,
    Slug,
}

/// Builds direct and affiliate URLs for a slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFormatter {
    base: String,
    template: Vec<Segment>,
}

impl LinkFormatter {
    /// Validate the base URL and parse the affiliate template.
    ///
    /// The template must contain exactly the placeholders `{affiliate_id}`
    /// and `{slug}`. A leading `/` is added when missing.
    pub fn new(base_url: &str, affiliate_path_template: &str) -> Result<Self, ConfigError> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        let mut template = parse_template(affiliate_path_template.trim())?;
        if !template.contains(&Segment::Slug) {
            return Err(ConfigError::MissingPlaceholder(SLUG));
        }
        if !template.contains(&Segment::AffiliateId) {
            return Err(ConfigError::MissingPlaceholder(AFFILIATE_ID));
        }
        match template.first_mut() {
            Some(Segment::Literal(lit)) if lit.starts_with('/') => {}
            Some(Segment::Literal(lit)) => lit.insert(0, '/'),
            _ => template.insert(0, Segment::Literal("/".to_string())),
        }

        Ok(Self {
            base: base.to_string(),
            template,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `<base>/<slug>/`
    pub fn direct_url(&self, slug: &str) -> String {
        direct_url(&self.base, slug)
    }

    /// Affiliate URL for `slug`. An empty affiliate id yields the direct URL.
    pub fn affiliate_url(&self, affiliate_id: &str, slug: &str) -> String {
        let affiliate_id = affiliate_id.trim();
        if affiliate_id.is_empty() {
            return self.direct_url(slug);
        }
        self.render(Some(affiliate_id), slug)
    }

    /// Affiliate URL with the `{affiliate_id}` placeholder left in place,
    /// for export to tools that substitute it themselves.
    pub fn affiliate_template(&self, slug: &str) -> String {
        self.render(None, slug)
    }

    fn render(&self, affiliate_id: Option<&str>, slug: &str) -> String {
        let mut url = self.base.clone();
        for segment in &self.template {
            match segment {
                Segment::Literal(lit) => url.push_str(lit),
                Segment::Slug => url.push_str(slug),
                Segment::AffiliateId => match affiliate_id {
                    Some(id) => url.push_str(id),
                    None => {
                        url.push('{');
                        url.push_str(AFFILIATE_ID);
                        url.push('}');
                    }
                },
            }
        }
        url
    }
}

/// `base + "/" + slug + "/"`, ignoring trailing slashes on `base`.
pub fn direct_url(base: &str, slug: &str) -> String {
    format!("{}/{}/", base.trim_end_matches('/'), slug)
}

/// One-shot affiliate URL. Prefer building a [`LinkFormatter`] once.
pub fn affiliate_url(
    base: &str,
    affiliate_path_template: &str,
    affiliate_id: &str,
    slug: &str,
) -> Result<String, ConfigError> {
    Ok(LinkFormatter::new(base, affiliate_path_template)?.affiliate_url(affiliate_id, slug))
}

fn parse_template(template: &str) -> Result<Vec<Segment>, ConfigError> {
    let unbalanced = || ConfigError::UnbalancedBrace(template.to_string());
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => return Err(unbalanced()),
                        Some(c) => name.push(c),
                    }
                }
                let segment = match name.trim() {
                    AFFILIATE_ID => Segment::AffiliateId,
                    SLUG => Segment::Slug,
                    _ => return Err(ConfigError::UnknownPlaceholder(name)),
                };
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(segment);
            }
            '}' => return Err(unbalanced()),
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
