use chrono::{DateTime, FixedOffset};

/// A blog post ready to be rendered as front-matter markdown.
///
/// Instances are built once per successful run and never mutated afterwards;
/// the writer refuses to touch existing files, so a post on disk is final.
#[derive(Debug, Clone)]
pub struct BlogPost {
    pub title: String,
    /// Publication timestamp; rendered as RFC 3339 with its UTC offset
    pub date: DateTime<FixedOffset>,
    /// 1-3 entries required by the front-matter contract
    pub categories: Vec<String>,
    /// 3-10 entries required by the front-matter contract
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub body: String,
}
