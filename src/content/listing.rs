//! HTML index pages for directories without an `index.html`.

use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;
use tera::{Context as TeraContext, Tera};

const TEMPLATE_NAME: &str = "listing.html";

const LISTING_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Index of {{ name }}</title>
<style>
body { background-color: #f5f5f5; font-family: monospace; }
a, a:active { text-decoration: none; color: #1a4fd6; }
a:hover, a:focus { text-decoration: underline; }
table { margin-left: 12px; border-collapse: collapse; }
th, td { text-align: left; padding: 2px 14px 2px 0; }
div.list { background-color: #fff; border-top: 1px solid #646464; border-bottom: 1px solid #646464; padding: 10px 0 14px; }
</style>
</head>
<body>
<h2>Index of {{ name }}</h2>
<div class="list">
<table>
<thead><tr><th>Name</th><th>Type</th><th>Options</th></tr></thead>
<tbody>
<tr><td><a href="../">Parent Directory</a>/</td><td>Directory</td><td></td></tr>
{% for dir in subdirectories %}<tr><td><a href="{{ dir | urlencode }}/">{{ dir }}/</a></td><td>Directory</td><td></td></tr>
{% endfor %}{% for file in files %}<tr><td><a href="{{ file | urlencode }}">{{ file }}</a></td><td>&nbsp;</td><td><a href="{{ file | urlencode }}?dl">Download</a></td></tr>
{% endfor %}</tbody>
</table>
</div>
</body>
</html>
"#;

/// Visible immediate children of one directory, in directory-read order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    pub name: String,
    pub subdirectories: Vec<String>,
    pub files: Vec<String>,
}

impl DirectoryListing {
    /// Reads `dir` without recursing. Entries whose names start with `.` are skipped.
    pub async fn read(dir: &Path, name: &str) -> std::io::Result<Self> {
        let mut listing = Self {
            name: name.to_string(),
            ..Self::default()
        };
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if file_name.starts_with('.') {
                continue;
            }
            let is_dir = entry
                .file_type()
                .await
                .map(|file_type| file_type.is_dir())
                .unwrap_or(false);
            if is_dir {
                listing.subdirectories.push(file_name);
            } else {
                listing.files.push(file_name);
            }
        }
        Ok(listing)
    }

    pub fn render(&self) -> Result<String, String> {
        let engine = listing_engine()?;
        let context = TeraContext::from_serialize(self).map_err(|e| e.to_string())?;
        engine
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| format!("{:?}", e))
    }
}

fn listing_engine() -> Result<&'static Tera, String> {
    static ENGINE: OnceLock<Result<Tera, String>> = OnceLock::new();
    ENGINE
        .get_or_init(|| {
            let mut tera = Tera::default();
            tera.add_raw_template(TEMPLATE_NAME, LISTING_TEMPLATE)
                .map_err(|e| e.to_string())?;
            Ok(tera)
        })
        .as_ref()
        .map_err(Clone::clone)
}

#[cfg(test)]
#[path = "tests/listing_tests.rs"]
mod tests;
