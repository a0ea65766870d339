//! # Post Writer
//!
//! Renders a [`BlogPost`] as a front-matter markdown document and writes it
//! under a `YYYY/MM/DD/` partition. The full document is assembled in memory
//! and created with `create_new`, so a run either produces a complete file at
//! a path nothing else owns, or touches nothing at all.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{ValidationError, WriteError};
use crate::models::BlogPost;
use crate::utils::slugify;

pub struct PostWriter {
    root: PathBuf,
}

impl PostWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Validate, render and create the post file.
    ///
    /// An existing file at the derived path is a [`WriteError::Collision`];
    /// previously written content is never replaced.
    pub fn write(&self, post: &BlogPost) -> Result<PathBuf, WriteError> {
        validate_front_matter(post)?;
        let document = render_document(post);

        let dir = self.root.join(post.date.format("%Y/%m/%d").to_string());
        fs::create_dir_all(&dir)?;
        let path = dir.join(file_name(post));

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(WriteError::Collision(path));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(document.as_bytes())?;
        Ok(path)
    }

    /// Path the next write for this post would use
    pub fn target_path(&self, post: &BlogPost) -> PathBuf {
        self.root
            .join(post.date.format("%Y/%m/%d").to_string())
            .join(file_name(post))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Time-of-day prefix keeps same-day runs from colliding with each other
fn file_name(post: &BlogPost) -> String {
    format!(
        "{}-{}.md",
        post.date.format("%H%M%S"),
        slugify(&post.title)
    )
}

/// Required front-matter fields must be present and within bounds before
/// anything touches the filesystem
pub fn validate_front_matter(post: &BlogPost) -> Result<(), ValidationError> {
    if post.title.trim().is_empty() {
        return Err(ValidationError("title must not be empty".to_string()));
    }
    if post.categories.is_empty() || post.categories.len() > 3 {
        return Err(ValidationError(format!(
            "categories must have 1-3 entries, got {}",
            post.categories.len()
        )));
    }
    if post.categories.iter().any(|c| c.trim().is_empty()) {
        return Err(ValidationError("categories must not contain empty entries".to_string()));
    }
    if post.tags.len() < 3 || post.tags.len() > 10 {
        return Err(ValidationError(format!(
            "tags must have 3-10 entries, got {}",
            post.tags.len()
        )));
    }
    if post.tags.iter().any(|t| t.trim().is_empty()) {
        return Err(ValidationError("tags must not contain empty entries".to_string()));
    }
    if post.body.trim().is_empty() {
        return Err(ValidationError("body must not be empty".to_string()));
    }
    Ok(())
}

/// Render the complete document: YAML front matter block, blank line, body
pub fn render_document(post: &BlogPost) -> String {
    let mut doc = String::with_capacity(post.body.len() + 512);
    doc.push_str("---\n");
    doc.push_str(&format!("title: \"{}\"\n", escape_yaml(&post.title)));
    doc.push_str(&format!("date: {}\n", post.date.to_rfc3339()));
    doc.push_str(&format!("categories: {}\n", yaml_list(&post.categories)));
    doc.push_str(&format!("tags: {}\n", yaml_list(&post.tags)));
    if let Some(description) = &post.description {
        doc.push_str(&format!("description: \"{}\"\n", escape_yaml(description)));
    }
    if let Some(keywords) = &post.keywords {
        doc.push_str(&format!("keywords: \"{}\"\n", escape_yaml(keywords)));
    }
    if let Some(author) = &post.author {
        doc.push_str(&format!("author: \"{}\"\n", escape_yaml(author)));
    }
    if let Some(image) = &post.image {
        doc.push_str(&format!("image: \"{}\"\n", escape_yaml(image)));
    }
    doc.push_str("---\n\n");
    doc.push_str(post.body.trim_end());
    doc.push('\n');
    doc
}

fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn yaml_list(items: &[String]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|i| format!("\"{}\"", escape_yaml(i)))
        .collect();
    format!("[{}]", quoted.join(", "))
}
