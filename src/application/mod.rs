// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Wires the other layers together for one command. No model
// math and no file formats live here, only the order in which
// things happen.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// `train`: one full trial
pub mod train_use_case;

// `evaluate`: score a saved checkpoint
pub mod evaluate_use_case;
