//! Sentence-transformer embeddings through ONNX Runtime
//!
//! Runs all-MiniLM-L6-v2 exported to ONNX. The model directory holds
//! `model.onnx` and the HuggingFace `tokenizer.json`. Token embeddings are
//! mean-pooled under the attention mask, then L2-normalized.
//!
//! The runtime itself is behind the `onnx-embeddings` feature; pooling is
//! plain arithmetic and always compiled.

#![cfg_attr(not(feature = "onnx-embeddings"), allow(dead_code))]

use crate::embedding::EmbeddingError;

/// Output dimension of all-MiniLM-L6-v2
pub const MINILM_DIMENSION: usize = 384;

/// Weights file expected in the model directory
pub const MODEL_FILE: &str = "model.onnx";

/// Tokenizer definition expected in the model directory
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Mean-pool `[seq_len, dimension]` token states under `attention_mask`,
/// then scale to unit length.
pub(crate) fn mean_pool(
    token_states: &[f32],
    attention_mask: &[i64],
    dimension: usize,
) -> Result<Vec<f32>, EmbeddingError> {
    if token_states.len() < attention_mask.len() * dimension {
        return Err(EmbeddingError::InferenceFailed(format!(
            "Output holds {} values, expected {} tokens x {}",
            token_states.len(),
            attention_mask.len(),
            dimension
        )));
    }

    let mut pooled = vec![0.0f32; dimension];
    let mut mask_sum = 0.0f32;

    for (token_idx, &mask) in attention_mask.iter().enumerate() {
        let weight = mask as f32;
        mask_sum += weight;
        let offset = token_idx * dimension;
        for (dim_idx, value) in pooled.iter_mut().enumerate() {
            *value += token_states[offset + dim_idx] * weight;
        }
    }

    if mask_sum > 0.0 {
        for value in &mut pooled {
            *value /= mask_sum;
        }
    }

    let norm: f32 = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return Err(EmbeddingError::InferenceFailed(
            "Pooled embedding is all zeros".to_string(),
        ));
    }
    for value in &mut pooled {
        *value /= norm;
    }

    Ok(pooled)
}

#[cfg(feature = "onnx-embeddings")]
mod runtime {
    use super::{mean_pool, MINILM_DIMENSION, MODEL_FILE, TOKENIZER_FILE};
    use crate::embedding::{EmbeddingError, EmbeddingModel};
    use ort::session::Session;
    use std::path::Path;
    use std::sync::Mutex;
    use tracing::info;

    /// all-MiniLM-L6-v2 on ONNX Runtime
    ///
    /// `Session::run` needs `&mut self`, so the session sits behind a mutex
    /// and concurrent callers take turns.
    pub struct OnnxEmbedder {
        session: Mutex<Session>,
        tokenizer: tokenizers::Tokenizer,
    }

    impl OnnxEmbedder {
        /// Load `model.onnx` and `tokenizer.json` from `model_dir`
        pub fn load(model_dir: &Path) -> Result<Self, EmbeddingError> {
            let model_path = model_dir.join(MODEL_FILE);
            let tokenizer_path = model_dir.join(TOKENIZER_FILE);

            for path in [&model_path, &tokenizer_path] {
                if !path.exists() {
                    return Err(EmbeddingError::ModelNotFound(path.to_path_buf()));
                }
            }

            let session = Session::builder()
                .map_err(|e: ort::Error| EmbeddingError::ModelInit(e.to_string()))?
                .with_intra_threads(2)
                .map_err(|e: ort::Error| EmbeddingError::ModelInit(e.to_string()))?
                .commit_from_file(&model_path)
                .map_err(|e: ort::Error| {
                    EmbeddingError::ModelInit(format!("ONNX load failed: {e}"))
                })?;

            let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| EmbeddingError::ModelInit(format!("Tokenizer load failed: {e}")))?;

            info!("ONNX embedder loaded from {}", model_dir.display());

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
            })
        }

        fn infer(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            use ort::value::TensorRef;

            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::InferenceFailed(format!("Tokenization: {e}")))?;

            let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            let attention_mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();
            let token_type_ids: Vec<i64> =
                encoding.get_type_ids().iter().map(|&t| t as i64).collect();
            let seq_len = input_ids.len();

            let ids = ndarray::Array2::from_shape_vec((1, seq_len), input_ids)
                .map_err(|e| EmbeddingError::InferenceFailed(e.to_string()))?;
            let mask = ndarray::Array2::from_shape_vec((1, seq_len), attention_mask.clone())
                .map_err(|e| EmbeddingError::InferenceFailed(e.to_string()))?;
            let types = ndarray::Array2::from_shape_vec((1, seq_len), token_type_ids)
                .map_err(|e| EmbeddingError::InferenceFailed(e.to_string()))?;

            let ids = TensorRef::from_array_view(&ids)
                .map_err(|e| EmbeddingError::InferenceFailed(e.to_string()))?;
            let mask = TensorRef::from_array_view(&mask)
                .map_err(|e| EmbeddingError::InferenceFailed(e.to_string()))?;
            let types = TensorRef::from_array_view(&types)
                .map_err(|e| EmbeddingError::InferenceFailed(e.to_string()))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| EmbeddingError::InferenceFailed("Session lock poisoned".to_string()))?;

            let outputs = session
                .run(ort::inputs![ids, mask, types])
                .map_err(|e| EmbeddingError::InferenceFailed(format!("ONNX inference: {e}")))?;

            // [1, seq_len, 384]
            let (shape, token_states) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| EmbeddingError::InferenceFailed(format!("Output extraction: {e}")))?;

            if shape.len() != 3 || shape[2] as usize != MINILM_DIMENSION {
                return Err(EmbeddingError::InferenceFailed(format!(
                    "Unexpected output shape {shape:?}, expected [1, {seq_len}, {MINILM_DIMENSION}]"
                )));
            }

            mean_pool(token_states, &attention_mask, MINILM_DIMENSION)
        }
    }

    impl EmbeddingModel for OnnxEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            if text.trim().is_empty() {
                return Err(EmbeddingError::InvalidInput(
                    "Empty text cannot be embedded".to_string(),
                ));
            }
            self.infer(text)
        }

        fn dimension(&self) -> usize {
            MINILM_DIMENSION
        }
    }

}

#[cfg(feature = "onnx-embeddings")]
pub use runtime::OnnxEmbedder;
