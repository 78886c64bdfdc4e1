//! Knowledge document loading and filename-based categorization.

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// One loaded knowledge document.
#[derive(Debug, Clone)]
pub struct KnowledgeDoc {
    /// File name the content came from.
    pub source: String,
    pub category: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct CategoryRuleFile {
    #[serde(default, rename = "rule")]
    rules: Vec<CategoryRule>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryRule {
    category: String,
    keywords: Vec<String>,
}

/// Maps file names to knowledge categories by keyword. Rules are checked
/// in order; the first keyword hit wins.
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<(String, Vec<String>)>,
}

impl Categorizer {
    /// The built-in rule table, matching the categories the tactical
    /// prompts reference.
    pub fn builtin() -> Self {
        let rules = [
            ("tactics", &["tactic", "战术", "条令", "战法"][..]),
            ("radar_manual", &["radar", "雷达"]),
            ("ew_manual", &["jam", "干扰", "电子战", "ecm"]),
            ("weapon_manual", &["weapon", "武器", "弹药", "导弹"]),
            ("comm_manual", &["comm", "通信", "数据链"]),
            ("historical_case", &["case", "案例", "历史"]),
            ("flight_manual", &["flight", "飞行", "航路", "空域"]),
        ];
        Self {
            rules: rules
                .iter()
                .map(|(category, keywords)| {
                    (
                        category.to_string(),
                        keywords.iter().map(|k| k.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Load rules from a TOML file (`[[rule]]` entries with `category` and
    /// `keywords`). Falls back to the built-in table when the file is
    /// missing or malformed.
    pub fn from_file(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Category table unreadable, using builtin");
                return Self::builtin();
            }
        };
        match toml::from_str::<CategoryRuleFile>(&content) {
            Ok(file) if !file.rules.is_empty() => Self {
                rules: file
                    .rules
                    .into_iter()
                    .map(|r| (r.category, r.keywords))
                    .collect(),
            },
            Ok(_) => Self::builtin(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Category table malformed, using builtin");
                Self::builtin()
            }
        }
    }

    pub fn categorize(&self, filename: &str) -> String {
        let name = filename.to_lowercase();
        for (category, keywords) in &self.rules {
            if keywords.iter().any(|kw| name.contains(kw.as_str())) {
                return category.clone();
            }
        }
        "general".to_string()
    }
}

/// Load all `.md` and `.json` documents under `dir`, in file-name order.
///
/// JSON files hold arrays of `{content, category}` items; items without a
/// `content` field contribute their whole JSON text, items without a
/// `category` land in `general`. A missing directory is an empty corpus,
/// not an error; individual unreadable files are skipped with a warning.
pub fn load_documents(dir: &Path, categorizer: &Categorizer) -> Vec<KnowledgeDoc> {
    let mut docs = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => {
            warn!(dir = %dir.display(), "Knowledge directory does not exist");
            return docs;
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    for path in paths {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext {
            "md" => match std::fs::read_to_string(&path) {
                Ok(content) => {
                    debug!(file = %name, "Loaded knowledge document");
                    docs.push(KnowledgeDoc {
                        category: categorizer.categorize(&name),
                        source: name,
                        content,
                    });
                }
                Err(e) => warn!(file = %name, error = %e, "Failed to load document"),
            },
            "json" => match std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|c| {
                    serde_json::from_str::<serde_json::Value>(&c).map_err(|e| e.to_string())
                }) {
                Ok(serde_json::Value::Array(items)) => {
                    for item in items {
                        let content = item
                            .get("content")
                            .and_then(|v| v.as_str())
                            .map(str::to_string)
                            .unwrap_or_else(|| item.to_string());
                        let category = item
                            .get("category")
                            .and_then(|v| v.as_str())
                            .unwrap_or("general")
                            .to_string();
                        docs.push(KnowledgeDoc {
                            source: name.clone(),
                            category,
                            content,
                        });
                    }
                    debug!(file = %name, "Loaded knowledge document");
                }
                Ok(_) => warn!(file = %name, "JSON knowledge file is not an array, skipped"),
                Err(e) => warn!(file = %name, error = %e, "Failed to load document"),
            },
            _ => {}
        }
    }

    docs
}
