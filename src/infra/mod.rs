// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Every file the system produces goes through this layer.
// Together these modules make up the artifact writer:
//
//   layout.rs      — The fixed, trial-identified file locations
//                    and the folder tree that holds them
//
//   performance.rs — The append-only .pref performance log,
//                    opened once per run and closed on drop
//
//   checkpoint.rs  — Model checkpoints keyed by global step,
//                    keeping only the 10 most recent, plus the
//                    run-config snapshot used by `evaluate`
//
//   telemetry.rs   — One JSON summary line per training batch,
//                    keyed by global step
//
//   export.rs      — Attention maps written as comma-delimited
//                    numeric matrices
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Rust Book §12 (I/O and File Handling)

/// Paths for one (dataset, trial) run and folder-tree creation
pub mod layout;

/// Trial performance log (.pref)
pub mod performance;

/// Checkpoint saving with bounded retention
pub mod checkpoint;

/// Per-step telemetry event stream
pub mod telemetry;

/// Attention-map CSV export
pub mod export;
