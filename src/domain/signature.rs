// ============================================================
// Layer 3 — Structural Signatures
// ============================================================
// A StructuralSignature describes a model's shape: how many
// input features it consumes, how many output features it
// produces, and the ordered list of layers in between.
//
// The cache uses signatures for two decisions:
//   1. compatibility — can this candidate be evaluated against
//      the current problem at all? (feature counts must match)
//   2. exact reuse   — is the candidate literally the same
//      architecture, so its weights can be used as-is?
//
// Equality is defined over typed layer descriptors, never over
// a printed representation of the model: two architectures are
// "the same" exactly when their descriptor lists are equal.

use serde::{Deserialize, Serialize};

/// Pointwise nonlinearity placed between linear layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Tanh,
    Relu,
    Sigmoid,
}

/// One entry in the ordered layer list of a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerDescriptor {
    Linear {
        in_features: usize,
        out_features: usize,
    },
    Activation(Activation),
}

/// Architecture-level shape of a model. Derived, never stored:
/// a persisted entry rebuilds its signature from its model spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralSignature {
    pub in_features: usize,
    pub out_features: usize,
    pub layers: Vec<LayerDescriptor>,
}

impl StructuralSignature {
    /// Signature of a strictly sequential MLP: linear layers given by
    /// consecutive `layer_sizes` pairs, with `activation` between each
    /// pair of linears (none after the last).
    ///
    /// `layer_sizes` must have at least two entries — enforced where
    /// model configs are validated, assumed here.
    pub fn sequential(layer_sizes: &[usize], activation: Activation) -> Self {
        let n_linear = layer_sizes.len() - 1;
        let mut layers = Vec::with_capacity(2 * n_linear - 1);
        for (i, pair) in layer_sizes.windows(2).enumerate() {
            layers.push(LayerDescriptor::Linear {
                in_features: pair[0],
                out_features: pair[1],
            });
            if i + 1 < n_linear {
                layers.push(LayerDescriptor::Activation(activation));
            }
        }
        Self {
            in_features: layer_sizes[0],
            out_features: layer_sizes[layer_sizes.len() - 1],
            layers,
        }
    }

    /// Compatibility test used by the selector: a candidate is worth
    /// evaluating when its input and output feature counts match the
    /// target's. Inner layers are free to differ — that is what the
    /// regression adapter is for.
    pub fn compatible_with(&self, other: &StructuralSignature) -> bool {
        self.in_features == other.in_features && self.out_features == other.out_features
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_interleaves_activations() {
        let sig = StructuralSignature::sequential(&[2, 16, 1], Activation::Tanh);
        assert_eq!(sig.in_features, 2);
        assert_eq!(sig.out_features, 1);
        assert_eq!(
            sig.layers,
            vec![
                LayerDescriptor::Linear { in_features: 2, out_features: 16 },
                LayerDescriptor::Activation(Activation::Tanh),
                LayerDescriptor::Linear { in_features: 16, out_features: 1 },
            ]
        );
    }

    #[test]
    fn compatibility_ignores_hidden_layers() {
        let a = StructuralSignature::sequential(&[2, 16, 1], Activation::Tanh);
        let b = StructuralSignature::sequential(&[2, 64, 64, 1], Activation::Relu);
        assert!(a.compatible_with(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn feature_count_mismatch_is_incompatible() {
        let a = StructuralSignature::sequential(&[2, 16, 1], Activation::Tanh);
        let b = StructuralSignature::sequential(&[3, 16, 1], Activation::Tanh);
        assert!(!a.compatible_with(&b));
    }

    #[test]
    fn same_sizes_different_activation_are_not_equal() {
        // Differently-activated nets compute different functions even
        // with identical layer sizes — they must not exact-reuse.
        let a = StructuralSignature::sequential(&[1, 8, 1], Activation::Tanh);
        let b = StructuralSignature::sequential(&[1, 8, 1], Activation::Sigmoid);
        assert!(a.compatible_with(&b));
        assert_ne!(a, b);
    }
}
