// Job settings edited on the configuration step
//
// Both settings types are plain values. Edits go through `apply`, which
// returns a new value instead of mutating in place:
// - VoiceSettings: speed/volume/pitch/voice/emotion
// - SubtitleSettings: visibility, preset and style fields

pub mod subtitle;
pub mod voice;

pub use subtitle::*;
pub use voice::*;
