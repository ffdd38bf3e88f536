//! Graph editing engine for the DeepBlocks neural-network designer.
//!
//! This crate is compiled to WebAssembly and runs in the browser next to the
//! diagramming surface, which owns rendering, pan/zoom and hit-testing and
//! reports user gestures as callbacks. The crate owns everything those
//! gestures mean: the node and edge lists, selection, the properties form,
//! palette drag payloads, the export document and the simulated training run.
//! The same core runs natively for tests and for the headless `deepblocks`
//! host.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Testable [`engine::EngineCore`] and the host [`engine::Action`]s |
//! | [`doc`] | Nodes, edges and the [`doc::GraphStore`] |
//! | [`layer`] | Layer kinds, enumerations and catalog defaults |
//! | [`palette`] | Block catalog, search, and drag payloads |
//! | [`properties`] | Per-type form fields, input coercion, panel snapshot |
//! | [`selection`] | Selection state machine and derived chrome |
//! | [`input`] | Rendering-surface callback contract |
//! | [`export`] | Model export document |
//! | [`render`] | Kind → visual template table |
//! | [`geom`] | Position and size value types |
//! | [`web`] | `wasm-bindgen` binding: drag channel, download, training timer |
//! | [`consts`] | Shared constants (delays, drag formats, placement) |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod export;
pub mod geom;
pub mod input;
pub mod layer;
pub mod palette;
pub mod properties;
pub mod render;
pub mod selection;
pub mod web;
