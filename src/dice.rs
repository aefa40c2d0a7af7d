//! Dice loss for overlap-based segmentation training.
//!
//! Both tensors are flattened in element order and compared as sets:
//! ```text
//! dice = (2 * sum(p * t) + smooth) / (sum(p) + sum(t) + smooth)
//! Loss = 1 - dice
//! ```
//! The smoothing constant keeps the ratio defined when both sums are zero,
//! so two empty masks score a perfect overlap.

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    tensor::{Tensor, backend::Backend},
};

/// Configuration for creating a [Dice loss](DiceLoss).
#[derive(Config, Debug)]
pub struct DiceLossConfig {
    /// Smoothing constant guarding the division. Default: 1e-8
    #[config(default = 1e-8)]
    pub smooth: f64,
}

impl DiceLossConfig {
    /// Initialize [Dice loss](DiceLoss).
    pub fn init(&self) -> DiceLoss {
        self.assertions();
        DiceLoss {
            smooth: self.smooth,
        }
    }

    fn assertions(&self) {
        assert!(
            self.smooth > 0.0,
            "Smoothing constant for DiceLoss must be positive, got {}",
            self.smooth
        );
    }
}

/// Dice-coefficient loss.
///
/// Accepts tensors of any rank; predictions and targets only need to agree
/// on their total element count since both are flattened before comparison.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct DiceLoss {
    /// Smoothing constant guarding the division.
    pub smooth: f64,
}

impl Default for DiceLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for DiceLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content.add("smooth", &self.smooth).optional()
    }
}

impl DiceLoss {
    /// Create a new Dice loss with default configuration.
    pub fn new() -> Self {
        DiceLossConfig::new().init()
    }

    /// Compute the criterion on the input tensor.
    ///
    /// # Shapes
    ///
    /// - predictions: `[...dims]` (values in `[0, 1]`)
    /// - targets: `[...dims]` (same element count as predictions)
    /// - output: `[1]`
    pub fn forward<const D: usize, B: Backend>(
        &self,
        predictions: Tensor<B, D>,
        targets: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        self.assertions(&predictions, &targets);

        let pred_flat: Tensor<B, 1> = predictions.reshape([-1]);
        let target_flat: Tensor<B, 1> = targets.reshape([-1]);

        let intersection = (pred_flat.clone() * target_flat.clone()).sum();
        let denominator = pred_flat.sum() + target_flat.sum();

        let dice = intersection.mul_scalar(2.0).add_scalar(self.smooth)
            / denominator.add_scalar(self.smooth);

        Tensor::ones_like(&dice) - dice
    }

    fn assertions<const D: usize, B: Backend>(
        &self,
        predictions: &Tensor<B, D>,
        targets: &Tensor<B, D>,
    ) {
        let pred_elems = predictions.shape().num_elements();
        let target_elems = targets.shape().num_elements();
        assert_eq!(
            pred_elems, target_elems,
            "Predictions ({pred_elems} elements) must have the same element count as targets ({target_elems} elements)"
        );
    }
}

#[cfg(test)]
mod tests {
    use burn::tensor::{TensorData, Tolerance, cast::ToElement};

    use super::*;
    use crate::tests::TestBackend;

    #[test]
    fn dice_loss_perfect_overlap_returns_zero() {
        let device = Default::default();
        let loss = DiceLoss::new();

        let mask = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[1.0, 0.0], [1.0, 1.0]]),
            &device,
        );

        let result = loss.forward(mask.clone(), mask);

        let expected = TensorData::from([0.0_f32]);
        result
            .into_data()
            .assert_approx_eq::<f32>(&expected, Tolerance::absolute(1e-6));
    }

    #[test]
    fn dice_loss_disjoint_masks_returns_one() {
        let device = Default::default();
        let loss = DiceLoss::new();

        let predictions = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[1.0, 1.0], [0.0, 0.0]]),
            &device,
        );
        let targets = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[0.0, 0.0], [1.0, 1.0]]),
            &device,
        );

        let result = loss.forward(predictions, targets);

        let expected = TensorData::from([1.0_f32]);
        result
            .into_data()
            .assert_approx_eq::<f32>(&expected, Tolerance::absolute(1e-6));
    }

    #[test]
    fn dice_loss_partial_overlap_computes_correct_value() {
        let device = Default::default();
        let loss = DiceLoss::new();

        // intersection = 1, sums = 2 + 2, dice = 2/4, loss = 0.5
        let predictions = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[1.0, 1.0], [0.0, 0.0]]),
            &device,
        );
        let targets = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[1.0, 0.0], [1.0, 0.0]]),
            &device,
        );

        let result = loss.forward(predictions, targets);

        let expected = TensorData::from([0.5_f32]);
        result
            .into_data()
            .assert_approx_eq::<f32>(&expected, Tolerance::relative(1e-6));
    }

    #[test]
    fn dice_loss_all_zero_masks_handled_by_smoothing() {
        let device = Default::default();
        let loss = DiceLoss::new();

        let predictions = Tensor::<TestBackend, 2>::zeros([2, 2], &device);
        let targets = Tensor::<TestBackend, 2>::zeros([2, 2], &device);

        let result = loss.forward(predictions, targets);
        let value = result.into_scalar().to_f64();

        // smooth/smooth = 1, so the loss is exactly 0 instead of 0/0
        assert!(value.abs() < 1e-6, "Empty masks must score zero loss");
    }

    #[test]
    fn dice_loss_accepts_higher_rank_tensors() {
        let device = Default::default();
        let loss = DiceLoss::new();

        let predictions = Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device);
        let targets = Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device);

        let result = loss.forward(predictions, targets);

        let expected = TensorData::from([0.0_f32]);
        result
            .into_data()
            .assert_approx_eq::<f32>(&expected, Tolerance::absolute(1e-6));
    }

    #[test]
    #[should_panic = "must have the same element count"]
    fn dice_loss_mismatched_element_counts_panics() {
        let device = Default::default();
        let loss = DiceLoss::new();

        let predictions = Tensor::<TestBackend, 2>::ones([2, 3], &device);
        let targets = Tensor::<TestBackend, 2>::ones([2, 2], &device);

        let _result = loss.forward(predictions, targets);
    }

    #[test]
    #[should_panic = "Smoothing constant for DiceLoss must be positive"]
    fn dice_loss_config_negative_smooth_panics() {
        let _loss = DiceLossConfig::new().with_smooth(-1e-8).init();
    }

    #[test]
    fn dice_loss_display_shows_smooth_parameter() {
        let loss = DiceLossConfig::new().with_smooth(1e-6).init();

        assert_eq!(format!("{loss}"), "DiceLoss {smooth: 0.000001}");
    }
}
