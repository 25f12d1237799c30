//! The static item catalog and detail-step templates.
//!
//! Loaded once from TOML, read-only thereafter:
//!
//! ```toml
//! [[section]]
//! id = "otc"
//! title = "Over the counter"
//!
//! [[item]]
//! id = "ibuprofen"
//! section = "otc"
//! title = "Ibuprofen"
//! has-detail = true
//!
//! [[detail]]
//! item = "ibuprofen"
//! dosage-prompt = "What dose do you take?"
//! schedule-prompt = "When do you take it?"
//! ```
//!
//! Validation failures here are shipped defects: the flow never starts
//! with a bad catalog.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::model::{Item, Section};

/// Fatal configuration errors. No retry — fix the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate item identifier: {0}")]
    DuplicateItem(String),

    #[error("duplicate section identifier: {0}")]
    DuplicateSection(String),

    #[error("item {item} references unknown section {section}")]
    UnknownSection { item: String, section: String },

    #[error("item {0} has a detail step but no detail template")]
    MissingDetailTemplate(String),

    #[error("detail template for unknown item: {0}")]
    UnknownTemplateItem(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = core::result::Result<T, CatalogError>;

/// Prompts shown by an item's detail step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DetailTemplate {
    /// Item this template belongs to.
    pub item: String,

    /// Prompt for the dosage field.
    pub dosage_prompt: String,

    /// Prompt for the weekly schedule picker.
    pub schedule_prompt: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "section")]
    sections: Vec<Section>,

    #[serde(rename = "item")]
    items: Vec<Item>,

    #[serde(default, rename = "detail")]
    details: Vec<DetailTemplate>,
}

/// The configuration collaborator: items, sections, and detail
/// templates. Construction validates; an existing `Catalog` is sound.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    sections: Vec<Section>,
    details: Vec<DetailTemplate>,
}

impl Catalog {
    /// Builds a validated catalog from parts.
    pub fn new(
        items: Vec<Item>,
        sections: Vec<Section>,
        details: Vec<DetailTemplate>,
    ) -> Result<Self> {
        validate(&items, &sections, &details)?;
        Ok(Self {
            items,
            sections,
            details,
        })
    }

    /// Loads and validates a catalog from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parses and validates a catalog from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::new(file.items, file.sections, file.details)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn detail_template(&self, item_id: &str) -> Option<&DetailTemplate> {
        self.details.iter().find(|d| d.item == item_id)
    }

    /// Items in catalog order for one selection-UI bucket; `None` is the
    /// unsectioned bucket.
    pub fn items_in_section(&self, section_id: Option<&str>) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|i| i.section.as_deref() == section_id)
            .collect()
    }
}

fn validate(items: &[Item], sections: &[Section], details: &[DetailTemplate]) -> Result<()> {
    for (index, item) in items.iter().enumerate() {
        if items[..index].iter().any(|other| other.id == item.id) {
            return Err(CatalogError::DuplicateItem(item.id.clone()));
        }
        if let Some(section) = &item.section {
            if !sections.iter().any(|s| &s.id == section) {
                return Err(CatalogError::UnknownSection {
                    item: item.id.clone(),
                    section: section.clone(),
                });
            }
        }
        if item.has_detail && !details.iter().any(|d| d.item == item.id) {
            return Err(CatalogError::MissingDetailTemplate(item.id.clone()));
        }
    }
    for (index, section) in sections.iter().enumerate() {
        if sections[..index].iter().any(|other| other.id == section.id) {
            return Err(CatalogError::DuplicateSection(section.id.clone()));
        }
    }
    for detail in details {
        if !items.iter().any(|i| i.id == detail.item) {
            return Err(CatalogError::UnknownTemplateItem(detail.item.clone()));
        }
    }
    Ok(())
}
