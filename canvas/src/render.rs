//! Per-kind presentation lookup.
//!
//! The rendering surface draws each node with one visual template chosen by
//! layer kind. The mapping lives here as a flat table instead of per-kind
//! node implementations, along with the accent color used for the kind's dot
//! in the type selector.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use serde::{Deserialize, Serialize};

use crate::layer::LayerKind;

/// Visual template a node is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderTemplate {
    /// Source blocks (input, embedding, image input).
    InputLayer,
    /// Trainable layers (dense, convolution, recurrent).
    CoreLayer,
    /// Pooling and normalization.
    PoolingLayer,
    /// Activations, dropout and regularization.
    ActivationLayer,
    /// Heads (output, classification, regression).
    OutputLayer,
    /// Graph operations (add, concatenate, flatten, reshape).
    OperationLayer,
    /// Anything the table doesn't know about.
    Default,
}

impl RenderTemplate {
    /// Template for `kind`.
    #[must_use]
    pub fn for_kind(kind: &LayerKind) -> Self {
        match kind {
            LayerKind::Input | LayerKind::Embedding | LayerKind::ImageInput => Self::InputLayer,
            LayerKind::Dense | LayerKind::Conv2D | LayerKind::Lstm | LayerKind::Gru => Self::CoreLayer,
            LayerKind::MaxPooling2D
            | LayerKind::AveragePooling2D
            | LayerKind::BatchNormalization
            | LayerKind::LayerNormalization => Self::PoolingLayer,
            LayerKind::Relu
            | LayerKind::Sigmoid
            | LayerKind::Tanh
            | LayerKind::Softmax
            | LayerKind::Dropout
            | LayerKind::Regularization => Self::ActivationLayer,
            LayerKind::Output | LayerKind::Classification | LayerKind::Regression => Self::OutputLayer,
            LayerKind::Concatenate | LayerKind::Add | LayerKind::Flatten | LayerKind::Reshape => {
                Self::OperationLayer
            }
            LayerKind::Custom(_) => Self::Default,
        }
    }
}

/// Accent color for `kind` in the type selector.
#[must_use]
pub fn accent_color(kind: &LayerKind) -> &'static str {
    match kind {
        LayerKind::Input => "green",
        LayerKind::Dense => "blue",
        LayerKind::Conv2D => "purple",
        _ => "gray",
    }
}
