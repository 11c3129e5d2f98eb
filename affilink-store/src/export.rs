//! Read-only exports of outbound links for report and plugin collaborators.

use std::io::Write;

use affilink_catalog::{LinkFormatter, Table};
use serde::Serialize;

/// One exported link row. Field names double as CSV headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    /// The affiliate id used, or `Direct` when none was given.
    pub affiliate_id: String,
    pub direct_url: String,
    pub affiliate_url: String,
}

/// Links for every record that has a slug, in table order.
pub fn export_links(table: &Table, links: &LinkFormatter, affiliate_id: &str) -> Vec<LinkRow> {
    let affiliate_id = affiliate_id.trim();
    let label = if affiliate_id.is_empty() {
        "Direct"
    } else {
        affiliate_id
    };
    table
        .iter()
        .filter_map(|record| {
            let slug = record.slug.as_deref()?;
            Some(LinkRow {
                id: record.id.clone(),
                name: record.name.clone(),
                slug: slug.to_string(),
                affiliate_id: label.to_string(),
                direct_url: links.direct_url(slug),
                affiliate_url: links.affiliate_url(affiliate_id, slug),
            })
        })
        .collect()
}

/// Write link rows as CSV with a header row.
pub fn write_links_csv<W: Write>(rows: &[LinkRow], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        writer.write_record([
            "id",
            "name",
            "slug",
            "affiliate_id",
            "direct_url",
            "affiliate_url",
        ])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

// ── Affiliate program config ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramProduct {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub direct_url: String,
    /// Affiliate URL with a literal `{affiliate_id}` placeholder.
    pub affiliate_url_template: String,
    pub commission_rate: f64,
}

/// Product list handed to the affiliate plugin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramConfig {
    pub plugin: String,
    pub base_url: String,
    pub commission_rate: f64,
    pub products: Vec<ProgramProduct>,
}

pub fn program_config(table: &Table, links: &LinkFormatter, commission_rate: f64) -> ProgramConfig {
    let products = table
        .iter()
        .filter_map(|record| {
            let slug = record.slug.as_deref()?;
            let name = if record.name.is_empty() {
                "Unnamed Product".to_string()
            } else {
                record.name.clone()
            };
            Some(ProgramProduct {
                id: record.id.clone(),
                name,
                slug: slug.to_string(),
                direct_url: links.direct_url(slug),
                affiliate_url_template: links.affiliate_template(slug),
                commission_rate,
            })
        })
        .collect();

    ProgramConfig {
        plugin: "SliceWP".to_string(),
        base_url: links.base_url().to_string(),
        commission_rate,
        products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use affilink_catalog::Record;
    use affilink_catalog::links::DEFAULT_AFFILIATE_TEMPLATE;

    fn sample() -> (Table, LinkFormatter) {
        let table = Table::from_records([
            Record::new("1").with_name("Widget").with_slug("widget"),
            Record::new("2").with_name("No Slug"),
            Record::new("3").with_slug("gadget"),
        ])
        .unwrap();
        let links = LinkFormatter::new("https://shop.example", DEFAULT_AFFILIATE_TEMPLATE).unwrap();
        (table, links)
    }

    #[test]
    fn test_export_links_skips_missing_slugs() {
        let (table, links) = sample();
        let rows = export_links(&table, &links, "42");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "1");
        assert_eq!(rows[0].direct_url, "https://shop.example/widget/");
        assert_eq!(
            rows[0].affiliate_url,
            "https://shop.example/slicewp_affiliate/42/widget/"
        );
        assert_eq!(rows[1].id, "3");
    }

    #[test]
    fn test_export_links_direct() {
        let (table, links) = sample();
        let rows = export_links(&table, &links, "");
        assert_eq!(rows[0].affiliate_id, "Direct");
        assert_eq!(rows[0].affiliate_url, rows[0].direct_url);
    }

    #[test]
    fn test_write_links_csv() {
        let (table, links) = sample();
        let rows = export_links(&table, &links, "42");
        let mut out = Vec::new();
        write_links_csv(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,name,slug,affiliate_id,direct_url,affiliate_url")
        );
        assert_eq!(
            lines.next(),
            Some("1,Widget,widget,42,https://shop.example/widget/,https://shop.example/slicewp_affiliate/42/widget/")
        );
    }

    #[test]
    fn test_program_config() {
        let (table, links) = sample();
        let config = program_config(&table, &links, 12.5);
        assert_eq!(config.products.len(), 2);
        assert_eq!(config.products[1].name, "Unnamed Product");
        assert_eq!(
            config.products[0].affiliate_url_template,
            "https://shop.example/slicewp_affiliate/{affiliate_id}/widget/"
        );
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["plugin"], "SliceWP");
        assert_eq!(json["commission_rate"], 12.5);
    }
}
