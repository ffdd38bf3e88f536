//! Shared constants for the canvas crate.

// ── Training ────────────────────────────────────────────────────

/// Fixed delay between starting a simulated training run and marking every
/// layer as trained.
pub const TRAINING_DELAY_MS: u32 = 2000;

// ── Drag and drop ───────────────────────────────────────────────

/// Drag-data format carrying the bare layer type name.
pub const DRAG_TYPE_FORMAT: &str = "application/reactflow";

/// Drag-data format carrying the JSON-encoded default configuration.
pub const DRAG_CONFIG_FORMAT: &str = "application/json";

// ── Ids and naming ──────────────────────────────────────────────

/// Prefix for node ids minted by the store counter.
pub const NODE_ID_PREFIX: &str = "node-";

/// File name prefix for exported model documents.
pub const EXPORT_FILE_PREFIX: &str = "deepblocks-model-";

// ── Placement ───────────────────────────────────────────────────

/// Side length of the square area used for click-placed nodes.
pub const PLACEMENT_EXTENT: f64 = 400.0;

/// Offset applied to a duplicated node relative to its source.
pub const DUPLICATE_OFFSET: f64 = 40.0;

// ── Notices ─────────────────────────────────────────────────────

pub const EXPORT_NOTICE: &str = "Model exported successfully!";
pub const TRAINING_NOTICE: &str = "Model training completed!";
