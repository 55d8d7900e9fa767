//! Application use cases / business logic

pub mod generate;
pub mod normalize;
pub mod pipeline;
pub mod validate;

pub use generate::{GenerateWithRetry, GenerationError, RetryPolicy};
pub use normalize::{NormalizedPost, NormalizeError, normalize, repair_markdown};
pub use pipeline::{FeedSpec, FetchMode, Pipeline, PipelineConfig};
pub use validate::{LanguageValidator, ValidatorConfig, Verdict};
