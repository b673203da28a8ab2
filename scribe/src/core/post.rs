//! Post naming and rendering: metadata header plus validated article.

use chrono::NaiveDate;

/// Metadata written at the top of every post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostHeader {
    pub title: String,
    pub date: NaiveDate,
    pub category: String,
}

impl PostHeader {
    pub fn new(phase: &str, topic: &str, date: NaiveDate) -> Self {
        Self {
            title: title_case(topic),
            date,
            category: category_slug(phase),
        }
    }

    /// Render as YAML front matter. String values are double-quoted.
    pub fn render(&self) -> String {
        format!(
            "---\ntitle: \"{}\"\ndate: {}\ncategory: \"{}\"\n---\n",
            escape_double_quoted(&self.title),
            iso_date(self.date),
            escape_double_quoted(&self.category)
        )
    }
}

/// Upper-case the first character of each whitespace-separated word.
///
/// The remainder of each word is left untouched so acronyms survive.
pub fn title_case(topic: &str) -> String {
    topic
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Phase name lower-cased with spaces replaced by hyphens.
pub fn category_slug(phase: &str) -> String {
    phase.replace(' ', "-").to_lowercase()
}

/// `{ISO date}-{topic, spaces to hyphens, lower-cased}.md`
pub fn post_filename(date: NaiveDate, topic: &str) -> String {
    format!("{}-{}.md", iso_date(date), topic.replace(' ', "-").to_lowercase())
}

/// Header followed by the article body.
pub fn render_post(header: &PostHeader, article: &str) -> String {
    let mut buf = header.render();
    buf.push('\n');
    buf.push_str(article.trim_start_matches('\n'));
    if !buf.ends_with('\n') {
        buf.push('\n');
    }
    buf
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Escape for a YAML double-quoted scalar.
fn escape_double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}
