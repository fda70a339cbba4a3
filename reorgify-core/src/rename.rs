use crate::plan::Operation;
use crate::walk::{entry_name, list_dir};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Truncation limits applied while expanding a naming template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateOptions {
    /// The `description` field is cut to this many characters before
    /// substitution.
    pub max_description_len: usize,
    /// The expanded name is cut to this many characters, preserving the
    /// extension.
    pub max_name_len: usize,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            max_description_len: 50,
            max_name_len: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Field(String),
}

/// A naming template with `{field}` placeholders, e.g.
/// `"{index}_{stem} - {description}"`.
///
/// Built-in fields come from the item itself (`name`, `stem`, `ext`,
/// `parent`, `index`, `date`, `size`); callers may supply additional
/// fields such as `description` per item. An unknown field expands to the
/// empty string.
#[derive(Debug, Clone)]
pub struct RenameTemplate {
    raw: String,
    parts: Vec<Part>,
}

impl RenameTemplate {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    if chars.peek() == Some(&'{') {
                        chars.next();
                        literal.push('{');
                        continue;
                    }
                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) if c.is_alphanumeric() || c == '_' => field.push(c),
                            Some(c) => {
                                return Err(anyhow!(
                                    "invalid character '{c}' in template field of '{raw}'"
                                ))
                            },
                            None => return Err(anyhow!("unclosed '{{' in template '{raw}'")),
                        }
                    }
                    if field.is_empty() {
                        return Err(anyhow!("empty field in template '{raw}'"));
                    }
                    parts.push(Part::Field(field));
                },
                '}' => {
                    if chars.peek() == Some(&'}') {
                        chars.next();
                    }
                    literal.push('}');
                },
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }
        if parts.is_empty() {
            return Err(anyhow!("empty rename template"));
        }
        Ok(Self {
            raw: raw.to_string(),
            parts,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    fn expand(&self, fields: &BTreeMap<String, String>, opts: &TemplateOptions) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(lit) => out.push_str(lit),
                Part::Field(name) => {
                    if let Some(value) = fields.get(name) {
                        if name == "description" {
                            out.push_str(&truncate_chars(value, opts.max_description_len));
                        } else {
                            out.push_str(value);
                        }
                    }
                },
            }
        }
        out
    }
}

/// Per-item metadata keyed by the item's current file name.
pub type MetadataMap = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Default)]
pub struct RenameOutcome {
    pub ops: Vec<Operation>,
    pub total: usize,
    /// Items whose expansion produced their current name.
    pub unchanged: usize,
}

/// Plan renames for the given paths. A directory contributes its immediate
/// file children in name order; a file contributes itself. Identity renames
/// are dropped.
pub fn plan_renames(
    paths: &[PathBuf],
    template: &RenameTemplate,
    opts: &TemplateOptions,
    metadata: &MetadataMap,
    keywords: &[String],
) -> Result<RenameOutcome> {
    let mut items = Vec::new();
    for path in paths {
        if path.is_dir() {
            let listing = list_dir(path, keywords)?;
            items.extend(listing.files);
        } else {
            items.push(path.clone());
        }
    }

    let mut outcome = RenameOutcome::default();
    for (index, item) in items.iter().enumerate() {
        outcome.total += 1;
        let fields = item_fields(item, index + 1, metadata);
        let expanded = template.expand(&fields, opts);
        if expanded.trim().is_empty() {
            // Every referenced field was absent; leave the item alone.
            outcome.unchanged += 1;
            continue;
        }
        let new_name = finalize_name(&expanded, item, opts);
        if new_name == entry_name(item) {
            outcome.unchanged += 1;
            continue;
        }
        let parent = item.parent().unwrap_or_else(|| Path::new(""));
        outcome
            .ops
            .push(Operation::moving(item, parent.join(new_name)));
    }
    Ok(outcome)
}

fn item_fields(item: &Path, index: usize, metadata: &MetadataMap) -> BTreeMap<String, String> {
    let name = entry_name(item);
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), name.clone());
    fields.insert(
        "stem".to_string(),
        item.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    fields.insert(
        "ext".to_string(),
        item.extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    fields.insert(
        "parent".to_string(),
        item.parent().map(entry_name).unwrap_or_default(),
    );
    fields.insert("index".to_string(), index.to_string());
    if let Ok(meta) = item.metadata() {
        fields.insert("size".to_string(), meta.len().to_string());
        if let Ok(modified) = meta.modified() {
            let local: DateTime<Local> = modified.into();
            fields.insert("date".to_string(), local.format("%Y%m%d").to_string());
        }
    }
    if let Some(extra) = metadata.get(&name) {
        for (k, v) in extra {
            fields.insert(k.clone(), v.clone());
        }
    }
    fields
}

/// Sanitize separators, reattach the extension when the template dropped
/// it, and cut to the maximum length with the extension preserved.
fn finalize_name(expanded: &str, item: &Path, opts: &TemplateOptions) -> String {
    let mut name: String = expanded
        .trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();

    let ext = item
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !ext.is_empty() && !name.to_lowercase().ends_with(&format!(".{}", ext.to_lowercase())) {
        name.push('.');
        name.push_str(&ext);
    }

    if name.chars().count() <= opts.max_name_len {
        return name;
    }
    if ext.is_empty() {
        return truncate_chars(&name, opts.max_name_len);
    }
    let suffix = format!(".{ext}");
    let keep = opts.max_name_len.saturating_sub(suffix.chars().count()).max(1);
    let stem: String = name
        .chars()
        .take(name.chars().count() - suffix.chars().count())
        .collect();
    format!("{}{}", truncate_chars(&stem, keep), suffix)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
