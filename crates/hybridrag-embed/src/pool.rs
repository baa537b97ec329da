use anyhow::{ensure, Context, Result};
use candle_core::Tensor;

/// Mean of the unmasked token states, scaled to unit length.
///
/// `hidden` is `[batch, tokens, width]`, `attention_mask` is `[batch, tokens]`
/// (any dtype, 1 for real tokens); the result is `[batch, width]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, _, width) = hidden.dims3().context("hidden states must be [batch, tokens, width]")?;
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    // all-padding rows divide by a tiny count instead of zero
    let counts = mask.sum(1)?.clamp(1e-9f32, f32::MAX)?;
    let mean = summed.broadcast_div(&counts)?;
    let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12f32, f32::MAX)?;
    let pooled = mean.broadcast_div(&norm)?;
    ensure!(pooled.dims() == [batch, width], "pooled shape mismatch: {:?}", pooled.dims());
    Ok(pooled)
}
