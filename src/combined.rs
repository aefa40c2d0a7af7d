//! Composite BCE + Dice losses operating on raw logits.
//!
//! Two sibling combinations used for binary segmentation training:
//!
//! - [`WBCEDiceLoss`]: weighted BCE on sigmoid probabilities plus a scaled
//!   Dice term.
//! - [`BCEDiceLoss`]: numerically stable fused sigmoid+BCE on the raw logits
//!   plus a scaled Dice term.
//!
//! Both compute `bce + alpha * dice` with `alpha` fixed at construction.

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    nn::loss::Reduction,
    tensor::{Tensor, activation::sigmoid, backend::Backend},
};

use crate::{
    bce::{WeightedBCELoss, WeightedBCELossConfig},
    dice::{DiceLoss, DiceLossConfig},
};

/// Configuration for creating a [Weighted BCE + Dice loss](WBCEDiceLoss).
#[derive(Config, Debug)]
pub struct WBCEDiceLossConfig {
    /// Scaling factor for the Dice term. Default: 0.5
    #[config(default = 0.5)]
    pub alpha: f64,

    /// Positive-class weight forwarded to the BCE term. Default: 1.0
    #[config(default = 1.0)]
    pub pos_weight: f64,
}

impl WBCEDiceLossConfig {
    /// Initialize [Weighted BCE + Dice loss](WBCEDiceLoss).
    pub fn init(&self) -> WBCEDiceLoss {
        self.assertions();
        WBCEDiceLoss {
            alpha: self.alpha,
            bce: WeightedBCELossConfig::new()
                .with_pos_weight(self.pos_weight)
                .init(),
            dice: DiceLossConfig::new().init(),
        }
    }

    fn assertions(&self) {
        assert!(
            self.alpha >= 0.0,
            "Alpha for WBCEDiceLoss must be non-negative, got {}",
            self.alpha
        );
    }
}

/// Weighted BCE + Dice loss.
///
/// Applies sigmoid to the logits, then combines the weighted BCE of the
/// resulting probabilities with a Dice overlap term.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct WBCEDiceLoss {
    /// Scaling factor for the Dice term.
    pub alpha: f64,
    /// Weighted BCE term.
    pub bce: WeightedBCELoss,
    /// Dice overlap term.
    pub dice: DiceLoss,
}

impl Default for WBCEDiceLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for WBCEDiceLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content
            .add("alpha", &self.alpha)
            .add("bce", &self.bce)
            .add("dice", &self.dice)
            .optional()
    }
}

impl WBCEDiceLoss {
    /// Create a new weighted BCE + Dice loss with default configuration.
    pub fn new() -> Self {
        WBCEDiceLossConfig::new().init()
    }

    /// Compute the combined criterion on raw logits.
    ///
    /// # Shapes
    ///
    /// - logits: `[...dims]`
    /// - targets: `[...dims]` (same shape as logits)
    /// - weight: `[...dims]` (elementwise BCE weight, broadcastable)
    /// - output: `[1]`
    pub fn forward<const D: usize, B: Backend>(
        &self,
        logits: Tensor<B, D>,
        targets: Tensor<B, D>,
        weight: Option<Tensor<B, D>>,
    ) -> Tensor<B, 1> {
        self.assertions(&logits, &targets);

        let probabilities = sigmoid(logits);
        let dice = self.dice.forward(probabilities.clone(), targets.clone());
        let bce = self.bce.forward(probabilities, targets, weight, Reduction::Mean);

        bce + dice.mul_scalar(self.alpha)
    }

    fn assertions<const D: usize, B: Backend>(
        &self,
        logits: &Tensor<B, D>,
        targets: &Tensor<B, D>,
    ) {
        let pred_dims = logits.dims();
        let target_dims = targets.dims();
        assert_eq!(
            pred_dims, target_dims,
            "Shape of predictions ({pred_dims:?}) must match targets ({target_dims:?})"
        );
    }
}

/// Configuration for creating a [BCE + Dice loss](BCEDiceLoss).
#[derive(Config, Debug)]
pub struct BCEDiceLossConfig {
    /// Scaling factor for the Dice term. Default: 0.5
    #[config(default = 0.5)]
    pub alpha: f64,
}

impl BCEDiceLossConfig {
    /// Initialize [BCE + Dice loss](BCEDiceLoss).
    pub fn init(&self) -> BCEDiceLoss {
        self.assertions();
        BCEDiceLoss {
            alpha: self.alpha,
            dice: DiceLossConfig::new().init(),
        }
    }

    fn assertions(&self) {
        assert!(
            self.alpha >= 0.0,
            "Alpha for BCEDiceLoss must be non-negative, got {}",
            self.alpha
        );
    }
}

/// BCE + Dice loss.
///
/// The BCE term is computed directly on the raw logits with the fused
/// sigmoid+BCE formulation, which stays stable for large-magnitude logits;
/// the Dice term uses the sigmoid probabilities.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct BCEDiceLoss {
    /// Scaling factor for the Dice term.
    pub alpha: f64,
    /// Dice overlap term.
    pub dice: DiceLoss,
}

impl Default for BCEDiceLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for BCEDiceLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content
            .add("alpha", &self.alpha)
            .add("dice", &self.dice)
            .optional()
    }
}

impl BCEDiceLoss {
    /// Create a new BCE + Dice loss with default configuration.
    pub fn new() -> Self {
        BCEDiceLossConfig::new().init()
    }

    /// Compute the combined criterion on raw logits.
    ///
    /// # Shapes
    ///
    /// - logits: `[...dims]`
    /// - targets: `[...dims]` (same shape as logits)
    /// - output: `[1]`
    pub fn forward<const D: usize, B: Backend>(
        &self,
        logits: Tensor<B, D>,
        targets: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        self.assertions(&logits, &targets);

        let bce = self.bce_with_logits(logits.clone(), targets.clone());
        let probabilities = sigmoid(logits);
        let dice = self.dice.forward(probabilities, targets);

        bce + dice.mul_scalar(self.alpha)
    }

    /// Mean-reduced BCE on raw logits.
    ///
    /// Uses the stable form `max(x, 0) - x*t + ln(1 + exp(-|x|))` instead of
    /// sigmoid followed by separate logarithms.
    fn bce_with_logits<const D: usize, B: Backend>(
        &self,
        logits: Tensor<B, D>,
        targets: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        let term1 = logits.clone().clamp_min(0.0) - logits.clone() * targets;
        let term2 = (-logits.abs()).exp().add_scalar(1.0).log();

        (term1 + term2).mean()
    }

    fn assertions<const D: usize, B: Backend>(
        &self,
        logits: &Tensor<B, D>,
        targets: &Tensor<B, D>,
    ) {
        let pred_dims = logits.dims();
        let target_dims = targets.dims();
        assert_eq!(
            pred_dims, target_dims,
            "Shape of predictions ({pred_dims:?}) must match targets ({target_dims:?})"
        );
    }
}
