//! Local legal-text classifier on ONNX Runtime.
//!
//! Expects a sequence-classification model exported with two output logits
//! (index 0 non-legal, index 1 legal). The model directory must contain
//! `model.onnx` and `tokenizer.json`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::backend::{Classifier, ClassifierOutput, LegalLabel};

/// Token limit of BERT-family classifiers.
const MAX_TOKENS: usize = 512;

struct Inner {
    session: Session,
    tokenizer: Tokenizer,
}

/// ONNX sequence classifier. Inference runs on the blocking thread pool.
#[derive(Clone)]
pub struct OnnxClassifier {
    inner: Arc<Mutex<Inner>>,
}

impl OnnxClassifier {
    /// Load a model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        info!(model = %model_path.display(), "loaded classifier model");
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner { session, tokenizer })),
        })
    }

    fn classify_blocking(inner: &Mutex<Inner>, text: &str) -> anyhow::Result<ClassifierOutput> {
        let mut guard = inner
            .lock()
            .map_err(|_| anyhow::anyhow!("classifier state poisoned"))?;
        let Inner { session, tokenizer } = &mut *guard;

        let encoding = tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let to_i64 = |v: &[u32]| v.iter().map(|&x| x as i64).collect::<Vec<_>>();
        let seq_len = encoding.get_ids().len();
        let shape = [1i64, seq_len as i64];

        let ids = Tensor::from_array((shape, to_i64(encoding.get_ids()).into_boxed_slice()))?;
        let mask = Tensor::from_array((
            shape,
            to_i64(encoding.get_attention_mask()).into_boxed_slice(),
        ))?;
        let types = Tensor::from_array((shape, to_i64(encoding.get_type_ids()).into_boxed_slice()))?;

        let outputs = session.run(ort::inputs![
            "input_ids" => ids,
            "attention_mask" => mask,
            "token_type_ids" => types,
        ])?;

        let (output_shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(logits.len() == 2, "expected 2 logits, got shape {dims:?}");

        let probs = softmax(logits);
        debug!(tokens = seq_len, p_legal = probs[1], "classifier inference");
        Ok(output_from_probs(&probs))
    }
}

#[async_trait]
impl Classifier for OnnxClassifier {
    async fn classify(&self, text: &str) -> anyhow::Result<ClassifierOutput> {
        let inner = self.inner.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || Self::classify_blocking(&inner, &text)).await?
    }
}

fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&l| (l as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn output_from_probs(probs: &[f64]) -> ClassifierOutput {
    if probs[1] > probs[0] {
        ClassifierOutput::new(LegalLabel::Legal, probs[1])
    } else {
        ClassifierOutput::new(LegalLabel::NonLegal, probs[0])
    }
}
