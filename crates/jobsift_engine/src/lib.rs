//! Jobsift engine: IO pipeline for pulling job listings out of raw email.
mod debug;
mod error;
mod extract;
mod model;
mod pipeline;
mod prompt;
mod resolve;

pub use debug::{
    artifact_filename, ensure_inspection_dir, AtomicFileWriter, DebugSink, PersistError,
};
pub use error::EngineError;
pub use extract::{strip_default_xmlns, ExtractionStats, StructuralLinkExtractor};
pub use model::{parse_listings, ModelAssistedExtractor, ModelClient, OpenAiClient};
pub use pipeline::{ListingExtractor, ModelPipeline, ModelRunSettings, StructuralPipeline};
pub use prompt::{prompt_overhead, render_batch_prompt, PROMPT_HEADER};
pub use resolve::{RedirectResolver, ResolveSettings};
