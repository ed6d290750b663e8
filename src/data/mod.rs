// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the text files on disk and the tensors
// the model consumes:
//
//   <data_dir>/<dataset>/{train,valid,test}.txt
//       │
//       ▼
//   CtrDataLoader    → parses rows, checks field counts,
//       │              serves shuffled training batches and
//       │              in-order evaluation batches
//       ▼
//   CtrDataset       → implements Burn's Dataset trait
//       │
//       ▼
//   CtrBatcher       → turns a Batch into Int/Float tensors
//
// The loader is the only BatchSource used outside tests.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads the split files and implements BatchSource
pub mod loader;

/// Implements Burn's Dataset trait for CTR samples
pub mod dataset;

/// Converts domain batches into tensors on a device
pub mod batcher;

/// Seeded train/validation split
pub mod splitter;
