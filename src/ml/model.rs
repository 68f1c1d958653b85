// ============================================================
// Layer 5 — Sequential MLP
// ============================================================
// The trainable function representation the cache works with:
// a strictly sequential stack of linear layers with a single
// pointwise nonlinearity between consecutive layers.
//
// Sizes are carried alongside the layers (as non-trainable
// state) so a model can always report its structural signature
// and reproduce its own config for persistence — a stored entry
// must deserialize into a model whose parameter shapes match its
// own signature.

use burn::{
    module::Ignored,
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::{activation, TensorData},
};
use rand::Rng;

use crate::domain::signature::{Activation, StructuralSignature};

impl Activation {
    /// Apply the nonlinearity to a batch of row vectors.
    pub fn apply<B: Backend>(self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            Activation::Tanh => activation::tanh(x),
            Activation::Relu => activation::relu(x),
            Activation::Sigmoid => activation::sigmoid(x),
        }
    }
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct MlpConfig {
    /// Feature counts from input to output, e.g. [1, 32, 32, 1].
    pub layer_sizes: Vec<usize>,

    /// Nonlinearity between consecutive linear layers.
    #[config(default = "Activation::Tanh")]
    pub activation: Activation,
}

impl MlpConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        assert!(
            self.layer_sizes.len() >= 2,
            "an MLP needs at least an input and an output size"
        );
        let layers = self
            .layer_sizes
            .windows(2)
            .map(|pair| LinearConfig::new(pair[0], pair[1]).init(device))
            .collect();
        Mlp {
            layers,
            activation: Ignored(self.activation),
            layer_sizes: Ignored(self.layer_sizes.clone()),
        }
    }
}

/// Strictly sequential linear-layer model.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    pub layers: Vec<Linear<B>>,
    pub activation: Ignored<Activation>,
    pub layer_sizes: Ignored<Vec<usize>>,
}

impl<B: Backend> Mlp<B> {
    /// points: [n_points, in_features] → values: [n_points, out_features]
    pub fn forward(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let n = self.layers.len();
        let mut x = points;
        for (i, layer) in self.layers.iter().enumerate() {
            x = layer.forward(x);
            // no activation after the output layer
            if i + 1 < n {
                x = self.activation.0.apply(x);
            }
        }
        x
    }

    pub fn in_features(&self) -> usize {
        self.layer_sizes.0[0]
    }

    pub fn out_features(&self) -> usize {
        self.layer_sizes.0[self.layer_sizes.0.len() - 1]
    }

    /// Architecture-level shape, used for compatibility filtering and
    /// the exact-reuse decision.
    pub fn signature(&self) -> StructuralSignature {
        StructuralSignature::sequential(&self.layer_sizes.0, self.activation.0)
    }

    /// Config that rebuilds this architecture (persisted with each entry).
    pub fn config(&self) -> MlpConfig {
        MlpConfig::new(self.layer_sizes.0.clone()).with_activation(self.activation.0)
    }

    /// Add a bounded symmetric random perturbation to every weight and
    /// bias: each scalar moves by a uniform draw from [-eps, eps].
    ///
    /// Applied after warm-start adaptation so that an exact cache hit
    /// does not replay an identical previously-converged optimum.
    /// Parameter shapes are unchanged; `eps <= 0` is a no-op.
    pub fn randomize<R: Rng + ?Sized>(mut self, eps: f64, rng: &mut R) -> Self {
        if eps <= 0.0 {
            return self;
        }
        self.layers = self
            .layers
            .into_iter()
            .map(|mut layer| {
                layer.weight = layer.weight.map(|w| {
                    let noise = uniform_noise(&w, eps, rng);
                    w + noise
                });
                layer.bias = layer.bias.map(|bias| {
                    bias.map(|b| {
                        let noise = uniform_noise(&b, eps, rng);
                        b + noise
                    })
                });
                layer
            })
            .collect();
        self
    }
}

/// Uniform noise in [-eps, eps] with the same shape and device as `t`,
/// drawn from the injected rng so tests can seed it.
fn uniform_noise<B: Backend, const D: usize, R: Rng + ?Sized>(
    t: &Tensor<B, D>,
    eps: f64,
    rng: &mut R,
) -> Tensor<B, D> {
    let shape = t.dims();
    let n: usize = shape.iter().product();
    let values: Vec<f32> = (0..n).map(|_| rng.gen_range(-eps..=eps) as f32).collect();
    Tensor::from_data(TensorData::new(values, shape), &t.device())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    type B = burn::backend::NdArray;

    #[test]
    fn forward_shape_matches_config() {
        let device = Default::default();
        let model = MlpConfig::new(vec![2, 8, 3]).init::<B>(&device);
        let points = Tensor::<B, 2>::zeros([5, 2], &device);
        assert_eq!(model.forward(points).dims(), [5, 3]);
        assert_eq!(model.in_features(), 2);
        assert_eq!(model.out_features(), 3);
    }

    #[test]
    fn signature_round_trips_through_config() {
        let device = Default::default();
        let config = MlpConfig::new(vec![1, 16, 16, 1]).with_activation(Activation::Sigmoid);
        let model = config.init::<B>(&device);
        assert_eq!(model.config().layer_sizes, vec![1, 16, 16, 1]);
        assert_eq!(
            model.signature(),
            model.config().init::<B>(&device).signature()
        );
    }

    #[test]
    fn zero_eps_randomize_is_identity() {
        let device = Default::default();
        let model = MlpConfig::new(vec![1, 4, 1]).init::<B>(&device);
        let before: Vec<f32> = model.layers[0].weight.val().to_data().to_vec().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let model = model.randomize(0.0, &mut rng);
        let after: Vec<f32> = model.layers[0].weight.val().to_data().to_vec().unwrap();
        assert_eq!(before, after);
    }
}
