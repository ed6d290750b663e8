// ============================================================
// Layer 5 — Attention Feature-Interaction Model
// ============================================================
// Input:  feature indices [batch, field]
// Output: one click logit per example, plus attention maps
//
//   indices ─► Embedding ─► (× √E) ─► Linear(E→A) ─► Dropout
//                                           │
//                   ┌───────────────────────┘
//                   ▼
//        num_block × [ MultiHeadAttention → +residual → LayerNorm ]
//                   │
//                   ▼
//        attention pooling over fields:
//          w = softmax_f( v · tanh(W h_f) )     (W: A→pool_filter_size)
//          p = Σ_f w_f h_f
//                   │
//                   ▼
//              Linear(A→1) ─► logit
//
// Attention maps returned per batch, one row per example:
//   attn_1 — first block's weights, mean over heads, F×F flattened
//   attn_2 — last block's weights, same shape
//   attn_3 — mean over all blocks, same shape
//   attn_k — pooling weights w, F columns
//
// Reference: Vaswani et al. (2017) Attention Is All You Need
//            Song et al. (2019) AutoInt

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{sigmoid, softmax},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct CtrAttentionConfig {
    pub feature_size: usize,
    #[config(default = 8)]
    pub embedding_size: usize,
    #[config(default = 2)]
    pub num_block: usize,
    #[config(default = 8)]
    pub num_head: usize,
    #[config(default = 128)]
    pub attention_size: usize,
    #[config(default = 64)]
    pub pool_filter_size: usize,
    #[config(default = 0.1)]
    pub dropout_rate: f64,
    #[config(default = true)]
    pub scale_embedding: bool,
}

impl CtrAttentionConfig {
    /// `num_block` must be at least 1 and `attention_size` divisible by `num_head`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> CtrAttentionModel<B> {
        let embedding  = EmbeddingConfig::new(self.feature_size, self.embedding_size).init(device);
        let projection = LinearConfig::new(self.embedding_size, self.attention_size).init(device);
        let blocks: Vec<AttentionBlock<B>> = (0..self.num_block)
            .map(|_| self.build_block(device))
            .collect();
        let pool_hidden = LinearConfig::new(self.attention_size, self.pool_filter_size).init(device);
        let pool_score  = LinearConfig::new(self.pool_filter_size, 1)
            .with_bias(false)
            .init(device);
        let output  = LinearConfig::new(self.attention_size, 1).init(device);
        let dropout = DropoutConfig::new(self.dropout_rate).init();

        let embedding_scale = if self.scale_embedding {
            (self.embedding_size as f64).sqrt()
        } else {
            1.0
        };

        CtrAttentionModel {
            embedding, projection, blocks,
            pool_hidden, pool_score, output, dropout,
            embedding_scale,
            attention_size: self.attention_size,
        }
    }

    fn build_block<B: Backend>(&self, device: &B::Device) -> AttentionBlock<B> {
        let self_attn = MultiHeadAttentionConfig::new(self.attention_size, self.num_head)
            .with_dropout(self.dropout_rate)
            .init(device);
        let norm    = LayerNormConfig::new(self.attention_size).init(device);
        let dropout = DropoutConfig::new(self.dropout_rate).init();
        AttentionBlock { self_attn, norm, dropout }
    }
}

#[derive(Module, Debug)]
pub struct AttentionBlock<B: Backend> {
    pub self_attn: MultiHeadAttention<B>,
    pub norm:      LayerNorm<B>,
    pub dropout:   Dropout,
}

impl<B: Backend> AttentionBlock<B> {
    /// x: [batch, field, A] → ([batch, field, A], weights [batch, head, field, field])
    pub fn forward(&self, x: Tensor<B, 3>) -> (Tensor<B, 3>, Tensor<B, 4>) {
        let out = self.self_attn.forward(MhaInput::self_attn(x.clone()));
        let x = self.norm.forward(x + self.dropout.forward(out.context));
        (x, out.weights)
    }
}

#[derive(Module, Debug)]
pub struct CtrAttentionModel<B: Backend> {
    pub embedding:       Embedding<B>,
    pub projection:      Linear<B>,
    pub blocks:          Vec<AttentionBlock<B>>,
    pub pool_hidden:     Linear<B>,
    pub pool_score:      Linear<B>,
    pub output:          Linear<B>,
    pub dropout:         Dropout,
    pub embedding_scale: f64,
    pub attention_size:  usize,
}

pub struct CtrForward<B: Backend> {
    /// [batch]
    pub logits:    Tensor<B, 1>,
    /// attn_1, attn_2, attn_3, attn_k, each [batch, cols]
    pub attention: [Tensor<B, 2>; 4],
}

pub struct CtrLoss<B: Backend> {
    pub overall:      Tensor<B, 1>,
    pub mean_logloss: Tensor<B, 1>,
    pub reg_loss:     Tensor<B, 1>,
    /// sigmoid scores [batch]
    pub probs:        Tensor<B, 1>,
}

/// Logits plus the raw weights the attention maps are built from.
struct Encoded<B: Backend> {
    logits:        Tensor<B, 1>,
    /// per block, head-averaged: [batch, field, field]
    block_weights: Vec<Tensor<B, 3>>,
    /// [batch, field]
    pool_weights:  Tensor<B, 2>,
}

impl<B: Backend> CtrAttentionModel<B> {
    pub fn forward(&self, indices: Tensor<B, 2, Int>) -> CtrForward<B> {
        let [batch_size, field_size] = indices.dims();
        let Encoded { logits, block_weights, pool_weights } = self.encode(indices);

        let flat = |t: Tensor<B, 3>| t.reshape([batch_size, field_size * field_size]);
        let first = flat(block_weights[0].clone());
        let last  = flat(block_weights[block_weights.len() - 1].clone());
        let mean  = flat(
            Tensor::stack::<4>(block_weights, 0)
                .mean_dim(0)
                .reshape([batch_size, field_size, field_size]),
        );

        CtrForward {
            logits,
            attention: [first, last, mean, pool_weights],
        }
    }

    fn encode(&self, indices: Tensor<B, 2, Int>) -> Encoded<B> {
        let [batch_size, field_size] = indices.dims();

        let emb = self.embedding.forward(indices).mul_scalar(self.embedding_scale);
        let mut x = self.dropout.forward(self.projection.forward(emb)); // [batch, field, A]

        // head-averaged weights per block: [batch, field, field]
        let mut block_weights = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            let (next, weights) = block.forward(x);
            x = next;
            block_weights.push(
                weights.mean_dim(1).reshape([batch_size, field_size, field_size]),
            );
        }

        let scores = self
            .pool_score
            .forward(self.pool_hidden.forward(x.clone()).tanh())
            .reshape([batch_size, field_size]);
        let pool_weights = softmax(scores, 1); // [batch, field]
        let pooled = (x * pool_weights.clone().unsqueeze_dim::<3>(2))
            .sum_dim(1)
            .reshape([batch_size, self.attention_size]);

        let logits = self.output.forward(pooled).reshape([batch_size]);

        Encoded { logits, block_weights, pool_weights }
    }

    /// Forward pass plus the loss terms. Attention maps are not assembled.
    ///
    ///   logloss_i    = max(z,0) − z·y + ln(1 + e^(−|z|))
    ///   mean_logloss = mean_i logloss_i
    ///   reg_loss     = regularization_weight · ‖E‖²
    ///   overall      = mean_logloss + reg_loss
    pub fn forward_loss(
        &self,
        indices:               Tensor<B, 2, Int>,
        labels:                Tensor<B, 1>,
        regularization_weight: f64,
    ) -> CtrLoss<B> {
        let logits = self.encode(indices).logits;
        let mean_logloss = binary_logloss(logits.clone(), labels).mean();
        let reg_loss = self
            .embedding
            .weight
            .val()
            .powf_scalar(2.0)
            .sum()
            .mul_scalar(regularization_weight);
        let overall = mean_logloss.clone() + reg_loss.clone();

        CtrLoss {
            overall,
            mean_logloss,
            reg_loss,
            probs: sigmoid(logits),
        }
    }
}

/// Numerically stable binary cross-entropy on logits, per example.
pub fn binary_logloss<B: Backend>(logits: Tensor<B, 1>, labels: Tensor<B, 1>) -> Tensor<B, 1> {
    logits.clone().clamp_min(0.0) - logits.clone() * labels + logits.abs().neg().exp().log1p()
}
