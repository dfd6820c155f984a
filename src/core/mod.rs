pub mod audio;
pub mod splice;
pub mod storage;
pub mod tts;

// Re-export commonly used types for convenience
pub use audio::{AudioError, AudioResult, AudioSegment, SampleDepth};

pub use splice::{
    Placeholder, PlaceholderSplicer, SpliceError, SpliceResult, parse_placeholders,
    validate_and_sort,
};

pub use storage::{ArtifactStore, ExpirySweeper, StorageError, StorageResult};

pub use tts::{
    HttpSynthesizer, SynthesisError, SynthesisOptions, SynthesisResult, Synthesizer,
    create_synthesizer,
};
