// ============================================================
// Layer 4 — CTR Data Loader
// ============================================================
// Reads a dataset directory and serves batches.
//
// Directory layout:
//   <data_dir>/<dataset>/
//     train.txt   ← required
//     valid.txt   ← optional (carved out of train.txt if absent)
//     test.txt    ← required
//
// Line format (whitespace separated, '#' starts a comment line):
//   <label> <idx_1> <idx_2> ... <idx_F>
//
//   1 3 17 204 1021
//   0 5 17 198 1500
//
// Every line of every split must have the same number of
// indices; that number is the field size. The feature size
// is the largest index seen anywhere plus one.
//
// Training batches come from a per-epoch shuffled order and
// the last batch of an epoch may be partial. Validation and
// test batches follow file order.
//
// Reference: Rust Book §8 (Collections)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use burn::data::dataset::Dataset;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::{fs, path::Path};

use crate::data::dataset::{CtrDataset, CtrSample};
use crate::data::splitter::split_train_val;
use crate::domain::batch::{Batch, EvalSplit};
use crate::domain::traits::BatchSource;

#[derive(Debug)]
pub struct CtrDataLoader {
    train:        CtrDataset,
    valid:        CtrDataset,
    test:         CtrDataset,
    batch_size:   usize,
    field_size:   usize,
    feature_size: usize,

    // training-epoch state
    order:        Vec<usize>,
    cursor:       usize,
    batch_index:  usize,
    has_next:     bool,
    rng:          StdRng,
}

impl CtrDataLoader {
    /// Load `<data_dir>/<dataset>/{train,valid,test}.txt`.
    pub fn from_dir(
        data_dir:            impl AsRef<Path>,
        dataset:             &str,
        batch_size:          usize,
        validation_fraction: f64,
        seed:                u64,
    ) -> Result<Self> {
        let dir = data_dir.as_ref().join(dataset);
        tracing::info!("Loading dataset '{}' from '{}'", dataset, dir.display());

        let train = parse_split(&dir.join("train.txt"))?;
        let test  = parse_split(&dir.join("test.txt"))?;

        let valid_path = dir.join("valid.txt");
        let (train, valid) = if valid_path.exists() {
            (train, parse_split(&valid_path)?)
        } else {
            tracing::info!(
                "No valid.txt; holding out {:.0}% of training rows",
                validation_fraction * 100.0
            );
            split_train_val(train, 1.0 - validation_fraction, seed)
        };

        Self::from_splits(train, valid, test, batch_size, seed)
    }

    pub fn from_splits(
        train:      Vec<CtrSample>,
        valid:      Vec<CtrSample>,
        test:       Vec<CtrSample>,
        batch_size: usize,
        seed:       u64,
    ) -> Result<Self> {
        anyhow::ensure!(batch_size > 0, "batch size must be positive");
        anyhow::ensure!(!train.is_empty(), "training split is empty");

        let field_size = train[0].indices.len();
        anyhow::ensure!(field_size > 0, "examples have no feature indices");

        for (name, split) in [("train", &train), ("valid", &valid), ("test", &test)] {
            if let Some(pos) = split.iter().position(|s| s.indices.len() != field_size) {
                anyhow::bail!(
                    "{name} example {pos} has {} fields, expected {field_size}",
                    split[pos].indices.len()
                );
            }
        }

        let feature_size = train
            .iter()
            .chain(&valid)
            .chain(&test)
            .filter_map(CtrSample::max_index)
            .max()
            .map_or(0, |m| m as usize + 1);

        tracing::info!(
            "Loaded {} train / {} valid / {} test rows, field_size={}, feature_size={}",
            train.len(), valid.len(), test.len(), field_size, feature_size
        );

        let order = (0..train.len()).collect();
        Ok(Self {
            train: CtrDataset::new(train),
            valid: CtrDataset::new(valid),
            test:  CtrDataset::new(test),
            batch_size,
            field_size,
            feature_size,
            order,
            cursor:      0,
            batch_index: 0,
            has_next:    false,
            rng:         StdRng::seed_from_u64(seed),
        })
    }

    pub fn split_len(&self, split: EvalSplit) -> usize {
        match split {
            EvalSplit::Validation => self.valid.len(),
            EvalSplit::Test       => self.test.len(),
        }
    }

    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    fn gather(&self, dataset: &CtrDataset, rows: &[usize]) -> Batch {
        let mut indices = Vec::with_capacity(rows.len() * self.field_size);
        let mut labels  = Vec::with_capacity(rows.len());
        for sample in rows.iter().filter_map(|&i| dataset.get(i)) {
            indices.extend_from_slice(&sample.indices);
            labels.push(sample.label);
        }
        Batch::new(indices, labels, self.field_size)
    }
}

impl BatchSource for CtrDataLoader {
    fn start_epoch(&mut self) {
        self.order.shuffle(&mut self.rng);
        self.cursor      = 0;
        self.batch_index = 0;
        self.has_next    = !self.order.is_empty();
    }

    fn has_next(&self) -> bool {
        self.has_next
    }

    fn next_train_batch(&mut self) -> Option<Batch> {
        if !self.has_next {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let batch = self.gather(&self.train, &self.order[self.cursor..end]);

        self.cursor = end;
        self.batch_index += 1;
        if self.cursor >= self.order.len() {
            self.has_next = false;
        }
        Some(batch)
    }

    fn batch_index(&self) -> usize {
        self.batch_index
    }

    fn eval_batches(&self, split: EvalSplit) -> Box<dyn Iterator<Item = Batch> + '_> {
        let dataset = match split {
            EvalSplit::Validation => &self.valid,
            EvalSplit::Test       => &self.test,
        };
        let rows: Vec<usize> = (0..dataset.len()).collect();
        let batches: Vec<Vec<usize>> = rows.chunks(self.batch_size).map(<[usize]>::to_vec).collect();
        Box::new(batches.into_iter().map(move |chunk| self.gather(dataset, &chunk)))
    }

    fn field_size(&self) -> usize {
        self.field_size
    }

    fn feature_size(&self) -> usize {
        self.feature_size
    }
}

/// Parse one split file into samples.
pub fn parse_split(path: &Path) -> Result<Vec<CtrSample>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;

    let mut samples: Vec<CtrSample> = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let sample = parse_line(line)
            .with_context(|| format!("{}:{}", path.display(), line_no + 1))?;
        if let Some(first) = samples.first() {
            let expected = first.indices.len();
            anyhow::ensure!(
                sample.indices.len() == expected,
                "{}:{}: expected {} fields, found {}",
                path.display(), line_no + 1, expected, sample.indices.len()
            );
        }
        samples.push(sample);
    }
    Ok(samples)
}

fn parse_line(line: &str) -> Result<CtrSample> {
    let mut tokens = line.split_whitespace();

    let label_tok = tokens.next().context("missing label")?;
    let label: f32 = label_tok
        .parse()
        .with_context(|| format!("bad label '{label_tok}'"))?;
    anyhow::ensure!(label == 0.0 || label == 1.0, "label must be 0 or 1, got {label_tok}");

    let indices = tokens
        .map(|t| t.parse::<u32>().with_context(|| format!("bad feature index '{t}'")))
        .collect::<Result<Vec<_>>>()?;

    Ok(CtrSample::new(indices, label))
}
