//! HTML pages rendered with minijinja.

use minijinja::{context, Environment, Value};

use crate::record::FileRecord;
use crate::Result;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");
const LANDING_TEMPLATE: &str = include_str!("../../templates/dl.html");

/// Page renderer holding the compiled templates.
///
/// Template names end in `.html`, so minijinja escapes every value.
#[derive(Debug)]
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    /// Compile the embedded templates.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)?;
        env.add_template("dl.html", LANDING_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Render the upload form, with an optional "your link" banner.
    ///
    /// The link comes from the query string, so anything but an absolute
    /// http(s) URL is dropped before it can reach an `href`.
    pub fn index(&self, success: bool, link: Option<&str>, max_size: u64) -> Result<String> {
        let link = link.filter(|link| is_http_link(link));
        let template = self.env.get_template("index.html")?;
        Ok(template.render(context! {
            success => success,
            link => link,
            max_size => format_size(max_size),
        })?)
    }

    /// Render the landing page for a shared file.
    ///
    /// `download_url` is inserted verbatim and must be built from a validated id.
    pub fn landing(&self, record: &FileRecord, download_url: &str) -> Result<String> {
        let template = self.env.get_template("dl.html")?;
        Ok(template.render(context! {
            name => &record.original_name,
            size => format_size(record.size_bytes),
            created => record.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            views => record.view_count,
            downloads => record.download_count,
            earnings => format!("{:.2}", record.earnings),
            download_url => Value::from_safe_string(download_url.to_string()),
        })?)
    }
}

fn is_http_link(link: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        link.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Format file size for display.
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.1} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.1} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.1} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}
