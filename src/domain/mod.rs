// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits describing what the system
// works with: batches of sparse categorical features, the
// outputs of one model step, and attention maps.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// The two traits in traits.rs are the seams the training
// orchestrator is written against. The burn model and the
// text-file loader implement them; tests implement them with
// in-memory fixtures.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One batch of (feature indices, labels)
pub mod batch;

// Row-major attention matrices and their concatenation policy
pub mod attention;

// BatchSource and CtrModel seams plus the per-step output records
pub mod traits;
