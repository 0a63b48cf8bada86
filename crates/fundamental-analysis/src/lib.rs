//! Statement assembly from company facts, plus the fundamental metrics
//! computed over it.

pub mod assembler;
pub mod metrics;
pub mod normalizer;
pub mod ratios;
pub mod registry;
pub mod resolver;

pub use assembler::{assemble, StatementAssembler};
pub use metrics::*;
pub use normalizer::{normalize, ExpectedUnit, Normalizer, NormalizerConfig, StatementRequest};
pub use ratios::DerivedRatios;
pub use registry::{default_registry, ConceptSpec};
pub use resolver::{resolve, resolve_tag};
