//! Block palette: the searchable, collapsible catalog of layer definitions,
//! and the drag payload that carries a block onto the canvas.
//!
//! A block reaches the canvas two ways. A click hands the engine the block's
//! type and catalog defaults directly. A drag serializes the same data into
//! two string slots of the platform drag channel at drag start; the canvas
//! decodes them at drop. Decoding never fails hard: a missing or garbled
//! configuration degrades to an empty one.

#[cfg(test)]
#[path = "palette_test.rs"]
mod palette_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::layer::{LayerKind, attr};

/// A block the palette offers.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDefinition {
    /// Layer type created by this block.
    pub kind: LayerKind,
    /// Name shown in the palette, also used as the node label on click.
    pub display_name: &'static str,
    /// Icon identifier from the design-system icon set.
    pub icon: &'static str,
}

impl BlockDefinition {
    /// Configuration attached to a palette click: catalog defaults plus the
    /// display name as label.
    #[must_use]
    pub fn click_config(&self) -> Map<String, Value> {
        let mut config = self.kind.catalog_defaults();
        config.insert(attr::LABEL.to_owned(), Value::from(self.display_name));
        config
    }

    /// Payload written into the drag channel at drag start.
    #[must_use]
    pub fn drag_payload(&self) -> DragPayload {
        DragPayload {
            kind: self.kind.as_str().to_owned(),
            config: Some(Value::Object(self.kind.catalog_defaults()).to_string()),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.display_name.to_lowercase().contains(needle) || self.kind.as_str().to_lowercase().contains(needle)
    }
}

/// A named, collapsible group of blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteSection {
    pub title: &'static str,
    pub icon: &'static str,
    pub items: &'static [BlockDefinition],
}

const fn block(kind: LayerKind, display_name: &'static str, icon: &'static str) -> BlockDefinition {
    BlockDefinition { kind, display_name, icon }
}

/// The full catalog, in display order.
pub static CATALOG: &[PaletteSection] = &[
    PaletteSection {
        title: "Input",
        icon: "box",
        items: &[
            block(LayerKind::Input, "Input Layer", "layers"),
            block(LayerKind::Embedding, "Embedding", "code"),
            block(LayerKind::ImageInput, "Image Input", "image"),
        ],
    },
    PaletteSection {
        title: "Core Layers",
        icon: "cpu",
        items: &[
            block(LayerKind::Dense, "Dense Layer", "square"),
            block(LayerKind::Conv2D, "Conv2D", "cpu"),
            block(LayerKind::Lstm, "LSTM", "repeat"),
            block(LayerKind::Gru, "GRU", "git-branch"),
        ],
    },
    PaletteSection {
        title: "Pooling & Norm",
        icon: "bar-chart",
        items: &[
            block(LayerKind::MaxPooling2D, "MaxPooling2D", "minus-square"),
            block(LayerKind::AveragePooling2D, "AveragePooling2D", "divide-square"),
            block(LayerKind::BatchNormalization, "BatchNormalization", "bar-chart"),
            block(LayerKind::LayerNormalization, "LayerNormalization", "bar-chart-2"),
        ],
    },
    PaletteSection {
        title: "Activations",
        icon: "zap",
        items: &[
            block(LayerKind::Relu, "ReLU", "zap"),
            block(LayerKind::Sigmoid, "Sigmoid", "sigma"),
            block(LayerKind::Tanh, "Tanh", "trending-up"),
            block(LayerKind::Softmax, "Softmax", "circle"),
            block(LayerKind::Dropout, "Dropout", "cloud-rain"),
            block(LayerKind::Regularization, "L1/L2 Regularization", "shield"),
        ],
    },
    PaletteSection {
        title: "Outputs",
        icon: "file-output",
        items: &[
            block(LayerKind::Output, "Output Layer", "file-output"),
            block(LayerKind::Classification, "Classification", "tag"),
            block(LayerKind::Regression, "Regression", "trending-down"),
        ],
    },
    PaletteSection {
        title: "Operations",
        icon: "folder-tree",
        items: &[
            block(LayerKind::Concatenate, "Concatenate", "combine"),
            block(LayerKind::Add, "Add", "plus"),
            block(LayerKind::Flatten, "Flatten", "minus"),
            block(LayerKind::Reshape, "Reshape", "crop"),
        ],
    },
];

/// Sections expanded before the user touches anything.
pub const INITIALLY_OPEN: [&str; 2] = ["Input", "Core Layers"];

/// Look up the catalog entry for `kind`.
#[must_use]
pub fn find_block(kind: &LayerKind) -> Option<&'static BlockDefinition> {
    CATALOG
        .iter()
        .flat_map(|section| section.items.iter())
        .find(|block| &block.kind == kind)
}

/// A section after search filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleSection {
    pub section: &'static PaletteSection,
    /// Items surviving the filter.
    pub items: Vec<&'static BlockDefinition>,
    /// Whether the section renders expanded.
    pub open: bool,
}

/// Palette view state: search query and which sections are expanded.
#[derive(Debug, Clone)]
pub struct Palette {
    query: String,
    open_sections: Vec<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self { query: String::new(), open_sections: INITIALLY_OPEN.iter().map(|s| (*s).to_owned()).collect() }
    }
}

impl Palette {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Whether `title` renders expanded. Any non-empty query forces it open.
    #[must_use]
    pub fn is_open(&self, title: &str) -> bool {
        !self.query.is_empty() || self.open_sections.iter().any(|t| t == title)
    }

    pub fn set_section_open(&mut self, title: &str, open: bool) {
        self.open_sections.retain(|t| t != title);
        if open {
            self.open_sections.push(title.to_owned());
        }
    }

    pub fn toggle_section(&mut self, title: &str) {
        let open = self.open_sections.iter().any(|t| t == title);
        self.set_section_open(title, !open);
    }

    /// Sections to render under the current query.
    ///
    /// An item survives if its display name or type contains the query
    /// (case-insensitive). A section survives if any item survives or its
    /// own title matches; in the latter case it may render with no items.
    #[must_use]
    pub fn visible_sections(&self) -> Vec<VisibleSection> {
        let needle = self.query.to_lowercase();
        CATALOG
            .iter()
            .filter_map(|section| {
                let items: Vec<&'static BlockDefinition> =
                    section.items.iter().filter(|item| item.matches(&needle)).collect();
                if items.is_empty() && !section.title.to_lowercase().contains(&needle) {
                    return None;
                }
                Some(VisibleSection { section, items, open: self.is_open(section.title) })
            })
            .collect()
    }
}

/// The two strings a palette drag carries through the platform drag channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DragPayload {
    /// Bare layer type name.
    #[serde(rename = "type")]
    pub kind: String,
    /// JSON-encoded default configuration, if the channel carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
}

impl DragPayload {
    /// Decode the payload into a layer kind and configuration.
    ///
    /// Returns `None` when the type slot is empty (the drop is ignored). A
    /// missing, unparsable or non-object configuration becomes an empty map.
    #[must_use]
    pub fn decode(&self) -> Option<(LayerKind, Map<String, Value>)> {
        if self.kind.is_empty() {
            return None;
        }
        let config = match self.config.as_deref().map(str::trim) {
            None | Some("") => Map::new(),
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                Ok(other) => {
                    log::warn!("drag config is not an object ({other}); using defaults");
                    Map::new()
                }
                Err(e) => {
                    log::warn!("drag config is not valid JSON ({e}); using defaults");
                    Map::new()
                }
            },
        };
        Some((LayerKind::from(self.kind.as_str()), config))
    }
}
