use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation,
};

use crate::ml::encoder::TextEncoder;
use crate::ml::error::ModelError;
use crate::ml::similarity;

/// Number of pairwise features fed to the classifier head
pub const PAIR_FEATURES: usize = 4;

/// Number of output classes (not duplicate / duplicate)
pub const NUM_CLASSES: usize = 2;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct PairClassifierConfig {
    pub vocab_size: usize,
    pub embed_dim:  usize,
    #[config(default = "vec![3, 4, 5]")]
    pub kernel_sizes: Vec<usize>,
    #[config(default = 100)]
    pub kernel_num: usize,
    #[config(default = 100)]
    pub hidden_size: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
    /// Token id used for padding; ignored by the Jaccard feature
    #[config(default = 0)]
    pub padding_idx: usize,
}

impl PairClassifierConfig {
    /// Reject configurations the model cannot be built from.
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |msg: String| Err(ModelError::InvalidConfig(msg));

        if self.vocab_size == 0 {
            return invalid("vocab_size must be > 0".into());
        }
        if self.embed_dim == 0 {
            return invalid("embed_dim must be > 0".into());
        }
        if self.kernel_sizes.is_empty() {
            return invalid("at least one kernel size is required".into());
        }
        if self.kernel_sizes.contains(&0) {
            return invalid(format!("kernel sizes must be > 0, got {:?}", self.kernel_sizes));
        }
        if self.kernel_num == 0 {
            return invalid("kernel_num must be > 0".into());
        }
        if self.hidden_size == 0 {
            return invalid("hidden_size must be > 0".into());
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return invalid(format!("dropout must be in [0, 1), got {}", self.dropout));
        }
        if self.padding_idx >= self.vocab_size {
            return invalid(format!(
                "padding_idx {} is outside the vocabulary ({})",
                self.padding_idx, self.vocab_size
            ));
        }
        Ok(())
    }

    /// Shortest sequence the encoder accepts
    pub fn min_seq_len(&self) -> usize {
        self.kernel_sizes.iter().copied().max().unwrap_or(0)
    }

    /// Build a randomly initialised model.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<PairClassifier<B>, ModelError> {
        self.validate()?;

        let encoder = TextEncoder::new(
            self.vocab_size, self.embed_dim, &self.kernel_sizes, self.kernel_num, device,
        );
        let fc1 = LinearConfig::new(PAIR_FEATURES, self.hidden_size).init(device);
        let fc2 = LinearConfig::new(self.hidden_size, self.hidden_size).init(device);
        let fc3 = LinearConfig::new(self.hidden_size, self.hidden_size).init(device);
        let fc4 = LinearConfig::new(self.hidden_size, NUM_CLASSES).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();

        Ok(PairClassifier {
            encoder, fc1, fc2, fc3, fc4, dropout,
            padding_idx: self.padding_idx,
        })
    }

    /// Compare every weight of a loaded model with the shapes this config
    /// builds. `load_record` itself accepts any shape.
    pub fn check_weights<B: Backend>(&self, model: &PairClassifier<B>) -> Result<(), ModelError> {
        let check = |param: String, expected: Vec<usize>, found: Vec<usize>| {
            if expected == found {
                Ok(())
            } else {
                Err(ModelError::WeightShape { param, expected, found })
            }
        };

        let encoder = &model.encoder;
        check(
            "encoder.embedding.weight".into(),
            vec![self.vocab_size, self.embed_dim],
            encoder.embedding.weight.val().dims().to_vec(),
        )?;
        check(
            "encoder.convs".into(),
            vec![self.kernel_sizes.len()],
            vec![encoder.convs.len()],
        )?;
        for (i, (conv, &k)) in encoder.convs.iter().zip(&self.kernel_sizes).enumerate() {
            check(
                format!("encoder.convs.{i}.weight"),
                vec![self.kernel_num, 1, k, self.embed_dim],
                conv.weight.val().dims().to_vec(),
            )?;
        }

        let hidden = self.hidden_size;
        let linears = [
            ("fc1", &model.fc1, [PAIR_FEATURES, hidden]),
            ("fc2", &model.fc2, [hidden, hidden]),
            ("fc3", &model.fc3, [hidden, hidden]),
            ("fc4", &model.fc4, [hidden, NUM_CLASSES]),
        ];
        for (name, linear, expected) in linears {
            check(format!("{name}.weight"), expected.to_vec(), linear.weight.val().dims().to_vec())?;
        }
        Ok(())
    }

    /// Build a model whose embedding table starts from `weights`
    /// ([vocab_size, embed_dim]).
    pub fn init_with_embeddings<B: Backend>(
        &self,
        device:  &B::Device,
        weights: Tensor<B, 2>,
    ) -> Result<PairClassifier<B>, ModelError> {
        self.validate()?;
        let expected = [self.vocab_size, self.embed_dim];
        let found    = weights.dims();
        if found != expected {
            return Err(ModelError::PretrainedShape { expected, found });
        }

        let mut model = self.init(device)?;
        model.encoder = model.encoder.with_embedding_weights(weights);
        Ok(model)
    }
}

#[derive(Module, Debug)]
pub struct PairClassifier<B: Backend> {
    /// Shared between both questions of a pair
    pub encoder:     TextEncoder<B>,
    pub fc1:         Linear<B>,
    pub fc2:         Linear<B>,
    pub fc3:         Linear<B>,
    pub fc4:         Linear<B>,
    pub dropout:     Dropout,
    pub padding_idx: usize,
}

#[derive(Debug)]
pub struct PairOutput<B: Backend> {
    /// Mean cross-entropy over the batch — shape [1]
    pub loss:   Tensor<B, 1>,
    /// Raw class scores — shape [batch, 2]
    pub logits: Tensor<B, 2>,
}

impl<B: Backend> PairClassifier<B> {
    /// question1: [batch, len1], question2: [batch, len2] → logits: [batch, 2]
    pub fn forward(
        &self,
        question1: Tensor<B, 2, Int>,
        question2: Tensor<B, 2, Int>,
    ) -> Result<Tensor<B, 2>, ModelError> {
        let [batch1, _] = question1.dims();
        let [batch2, _] = question2.dims();
        if batch1 != batch2 {
            return Err(ModelError::BatchSizeMismatch { question1: batch1, question2: batch2 });
        }
        self.check_device("question1", &question1)?;
        self.check_device("question2", &question2)?;

        let jaccard = similarity::jaccard_batch(
            &question1, &question2, Some(self.padding_idx as i64),
        );

        // Same encoder, same parameters, for both sides
        let e1 = self.encoder.forward(question1)?;
        let e2 = self.encoder.forward(question2)?;

        let dot      = similarity::dot_product(e1.clone(), e2.clone());
        let distance = similarity::euclidean_distance(e1.clone(), e2.clone());
        let cosine   = similarity::cosine_similarity(e1, e2);

        let features = Tensor::cat(vec![dot, distance, jaccard, cosine], 1); // [batch, 4]

        let x = activation::relu(self.dropout.forward(self.fc1.forward(features)));
        let x = activation::relu(self.dropout.forward(self.fc2.forward(x)));
        let x = activation::relu(self.dropout.forward(self.fc3.forward(x)));
        Ok(self.fc4.forward(x))
    }

    /// Forward pass plus cross-entropy (log-softmax + NLL) against 0/1 labels.
    pub fn forward_classification(
        &self,
        question1: Tensor<B, 2, Int>,
        question2: Tensor<B, 2, Int>,
        labels:    Tensor<B, 1, Int>,
    ) -> Result<PairOutput<B>, ModelError> {
        let [expected, _] = question1.dims();
        let [found]       = labels.dims();
        if expected != found {
            return Err(ModelError::LabelCountMismatch { expected, found });
        }

        let logits = self.forward(question1, question2)?;
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), labels);

        Ok(PairOutput { loss, logits })
    }

    fn check_device(&self, tensor: &'static str, tokens: &Tensor<B, 2, Int>) -> Result<(), ModelError> {
        let expected = self.encoder.device();
        let found    = tokens.device();
        if found != expected {
            return Err(ModelError::DeviceMismatch {
                tensor,
                expected: format!("{expected:?}"),
                found:    format!("{found:?}"),
            });
        }
        Ok(())
    }
}
