use anyhow::{bail, Result};
use candle_core::{DType, Tensor};

/// Mean of the hidden states over unmasked tokens: `[B,T,H]` x `[B,T]` -> `[B,H]`.
pub fn masked_mean(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let dims = hidden.dims();
    if dims.len() != 3 { bail!("hidden shape must be [B,T,H], got {:?}", dims); }
    let (batch, hidden_dim) = (dims[0], dims[2]);

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let masked = hidden.broadcast_mul(&mask.unsqueeze(2)?)?;
    let sum = masked.sum(1)?;
    let lengths = mask.sum_keepdim(1)?;
    let mean = sum.broadcast_div(&lengths)?;
    if mean.dims() != [batch, hidden_dim].as_slice() { bail!("pooled shape mismatch: {:?}", mean.dims()); }
    Ok(mean)
}

/// Row-wise L2 normalisation of a `[B,H]` tensor.
pub fn l2_normalize(embeddings: &Tensor) -> Result<Tensor> {
    let eps_val = match embeddings.dtype() { DType::F16 => 1e-6f32, _ => 1e-12f32 };
    let eps = Tensor::new(&[eps_val], embeddings.device())?.to_dtype(embeddings.dtype())?.unsqueeze(0)?;
    let norm = embeddings.sqr()?.sum_keepdim(1)?.sqrt()?;
    let norm = norm.broadcast_add(&eps)?;
    Ok(embeddings.broadcast_div(&norm)?)
}
