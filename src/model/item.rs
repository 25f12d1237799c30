//! Catalog entries: the tracked items a participant can select.

use serde::Deserialize;

/// An immutable catalog entry — something the participant can monitor,
/// e.g. a medication. Loaded once, read-only.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Item {
    /// Stable identifier, unique across the catalog.
    pub id: String,

    /// Section the item is grouped under in the selection UI, if any.
    #[serde(default)]
    pub section: Option<String>,

    /// Display text.
    pub title: String,

    /// Abbreviated display text for tight layouts.
    #[serde(default)]
    pub short_title: Option<String>,

    /// Whether selecting this item requires a follow-up detail step
    /// (dosage, weekly schedule).
    #[serde(default)]
    pub has_detail: bool,

    /// Whether selecting this item deselects every other item
    /// (e.g. "None of the above").
    #[serde(default)]
    pub exclusive: bool,
}

/// An optional grouping used only for selection-UI bucketing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Section {
    pub id: String,
    pub title: String,
}
