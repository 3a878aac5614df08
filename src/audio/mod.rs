pub mod convert;
pub mod error;
pub mod file;
pub mod scratch;

pub use convert::{downmix_to_mono, encode_wav, resample_linear};
pub use error::AudioError;
pub use file::{AudioFile, CapturedAudio};
pub use scratch::{decode_capture, ScratchFile};
