//! Weighted binary cross-entropy loss over predicted probabilities.
//!
//! Expects inputs already mapped to `[0, 1]` (typically sigmoid outputs).
//! The unreduced loss is:
//! ```text
//! L = -pos_weight * t * ln(p) - (1 - t) * ln(1 - p)
//! ```
//! optionally scaled by an elementwise weight tensor. Both logarithm
//! arguments, `p` and `1 - p`, are clamped below by `eps` so saturated
//! probabilities cannot produce `ln(0)`.

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    nn::loss::Reduction,
    tensor::{Tensor, backend::Backend},
};

/// Configuration for creating a [Weighted BCE loss](WeightedBCELoss).
#[derive(Config, Debug)]
pub struct WeightedBCELossConfig {
    /// Multiplier for the positive-target term, trading off false negatives
    /// against false positives. Default: 1.0
    #[config(default = 1.0)]
    pub pos_weight: f64,

    /// Lower bound applied to both `ln` arguments. Default: 1e-8
    #[config(default = 1e-8)]
    pub eps: f64,
}

impl WeightedBCELossConfig {
    /// Initialize [Weighted BCE loss](WeightedBCELoss).
    pub fn init(&self) -> WeightedBCELoss {
        self.assertions();
        WeightedBCELoss {
            pos_weight: self.pos_weight,
            eps: self.eps,
        }
    }

    fn assertions(&self) {
        assert!(
            self.pos_weight > 0.0,
            "Positive-class weight for WeightedBCELoss must be positive, got {}",
            self.pos_weight
        );
        assert!(
            self.eps > 0.0 && self.eps < 0.5,
            "Epsilon for WeightedBCELoss must be in (0, 0.5), got {}",
            self.eps
        );
    }
}

/// Weighted binary cross-entropy loss.
///
/// Takes predicted probabilities (not logits), one-hot-like targets of the
/// same shape, and an optional elementwise weight tensor. Supports batch
/// processing and reduction options.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct WeightedBCELoss {
    /// Multiplier for the positive-target term.
    pub pos_weight: f64,
    /// Clamp bound protecting the logarithms.
    pub eps: f64,
}

impl Default for WeightedBCELoss {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for WeightedBCELoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content
            .add("pos_weight", &self.pos_weight)
            .add("eps", &self.eps)
            .optional()
    }
}

impl WeightedBCELoss {
    /// Create a new weighted BCE loss with default configuration.
    pub fn new() -> Self {
        WeightedBCELossConfig::new().init()
    }

    /// Compute the criterion on the input tensor with reduction.
    ///
    /// # Shapes
    ///
    /// - probabilities: `[...dims]` (values in `[0, 1]`)
    /// - targets: `[...dims]` (same shape as probabilities)
    /// - weight: `[...dims]` (broadcastable to the loss shape)
    /// - output: `[1]`
    pub fn forward<const D: usize, B: Backend>(
        &self,
        probabilities: Tensor<B, D>,
        targets: Tensor<B, D>,
        weight: Option<Tensor<B, D>>,
        reduction: Reduction,
    ) -> Tensor<B, 1> {
        let loss = self.forward_no_reduction(probabilities, targets, weight);
        match reduction {
            Reduction::Mean | Reduction::Auto => loss.mean(),
            Reduction::Sum => loss.sum(),
        }
    }

    /// Compute the criterion on the input tensor without reduction.
    ///
    /// # Shapes
    ///
    /// - probabilities: `[...dims]` (values in `[0, 1]`)
    /// - targets: `[...dims]` (same shape as probabilities)
    /// - weight: `[...dims]` (broadcastable to the loss shape)
    /// - output: `[...dims]` (same shape as input)
    pub fn forward_no_reduction<const D: usize, B: Backend>(
        &self,
        probabilities: Tensor<B, D>,
        targets: Tensor<B, D>,
        weight: Option<Tensor<B, D>>,
    ) -> Tensor<B, D> {
        self.assertions(&probabilities, &targets);

        // Clamp each log argument from below; clamping probabilities to
        // 1 - eps would be lost to f32 rounding for small eps.
        let log_p = probabilities.clone().clamp_min(self.eps).log();
        let log_one_minus_p = (Tensor::ones_like(&probabilities) - probabilities)
            .clamp_min(self.eps)
            .log();

        let positive = targets.clone().mul_scalar(self.pos_weight) * log_p;
        let negative = (Tensor::ones_like(&targets) - targets) * log_one_minus_p;
        let loss = -(positive + negative);

        match weight {
            Some(weight) => loss * weight,
            None => loss,
        }
    }

    fn assertions<const D: usize, B: Backend>(
        &self,
        probabilities: &Tensor<B, D>,
        targets: &Tensor<B, D>,
    ) {
        let pred_dims = probabilities.dims();
        let target_dims = targets.dims();
        assert_eq!(
            pred_dims, target_dims,
            "Shape of predictions ({pred_dims:?}) must match targets ({target_dims:?})"
        );
    }
}
