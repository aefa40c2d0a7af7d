//! Segmentation loss functions for the Burn deep learning framework.
//!
//! This crate provides binary cross-entropy and Dice-overlap losses for
//! binary segmentation training, plus the two composite losses built from
//! them. All losses are backend-agnostic Burn modules configured through the
//! `Config` derive.
//!
//! ## Loss Functions
//!
//! - **[`WeightedBCELoss`]**: binary cross-entropy over sigmoid
//!   probabilities with a positive-class weight and an optional elementwise
//!   weight tensor
//! - **[`DiceLoss`]**: overlap loss based on the Dice coefficient
//! - **[`WBCEDiceLoss`]**: weighted BCE + scaled Dice on raw logits
//! - **[`BCEDiceLoss`]**: numerically stable fused BCE + scaled Dice on raw
//!   logits
//!
//! ## Usage Example
//!
//! ```rust
//! use seg_loss_burn::{BCEDiceLoss, WBCEDiceLossConfig};
//!
//! let wbce_dice = WBCEDiceLossConfig::new()
//!     .with_alpha(0.5)
//!     .with_pos_weight(2.0)
//!     .init();
//!
//! let bce_dice = BCEDiceLoss::new();
//! ```
//!
//! The caller owns the training loop: it supplies prediction and target
//! tensors (with gradient tracking enabled as needed) and backpropagates
//! through the returned scalar.

mod bce;
mod combined;
mod dice;

pub use bce::{WeightedBCELoss, WeightedBCELossConfig};
pub use combined::{BCEDiceLoss, BCEDiceLossConfig, WBCEDiceLoss, WBCEDiceLossConfig};
pub use dice::{DiceLoss, DiceLossConfig};

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    pub type TestBackend = NdArray;
}
