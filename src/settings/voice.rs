use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_SPEED: f64 = 0.5;
pub const MAX_SPEED: f64 = 2.0;
pub const MIN_VOLUME: f64 = 0.0;
pub const MAX_VOLUME: f64 = 100.0;
pub const MIN_PITCH: i32 = -10;
pub const MAX_PITCH: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VoiceId {
    #[default]
    #[serde(rename = "female_warm")]
    FemaleWarm,
    #[serde(rename = "male_deep")]
    MaleDeep,
    #[serde(rename = "child_cheerful")]
    ChildCheerful,
    #[serde(rename = "robot_neutral")]
    RobotNeutral,
    #[serde(rename = "male-qn-qingse")]
    MaleQnQingse,
    #[serde(rename = "male-qn-jingying")]
    MaleQnJingying,
    #[serde(rename = "female-shaonv")]
    FemaleShaonv,
    #[serde(rename = "female-yujie")]
    FemaleYujie,
    #[serde(rename = "presenter_male")]
    PresenterMale,
    #[serde(rename = "presenter_female")]
    PresenterFemale,
    #[serde(rename = "audiobook_male_1")]
    AudiobookMale1,
    #[serde(rename = "audiobook_female_1")]
    AudiobookFemale1,
}

impl VoiceId {
    /// Voices offered in the simple picker.
    pub const STANDARD: [VoiceId; 4] = [
        VoiceId::FemaleWarm,
        VoiceId::MaleDeep,
        VoiceId::ChildCheerful,
        VoiceId::RobotNeutral,
    ];

    /// Voices offered once custom parameters are enabled.
    pub const CUSTOM: [VoiceId; 8] = [
        VoiceId::MaleQnQingse,
        VoiceId::MaleQnJingying,
        VoiceId::FemaleShaonv,
        VoiceId::FemaleYujie,
        VoiceId::PresenterMale,
        VoiceId::PresenterFemale,
        VoiceId::AudiobookMale1,
        VoiceId::AudiobookFemale1,
    ];

    pub fn all() -> impl Iterator<Item = VoiceId> {
        Self::STANDARD.into_iter().chain(Self::CUSTOM)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FemaleWarm => "female_warm",
            Self::MaleDeep => "male_deep",
            Self::ChildCheerful => "child_cheerful",
            Self::RobotNeutral => "robot_neutral",
            Self::MaleQnQingse => "male-qn-qingse",
            Self::MaleQnJingying => "male-qn-jingying",
            Self::FemaleShaonv => "female-shaonv",
            Self::FemaleYujie => "female-yujie",
            Self::PresenterMale => "presenter_male",
            Self::PresenterFemale => "presenter_female",
            Self::AudiobookMale1 => "audiobook_male_1",
            Self::AudiobookFemale1 => "audiobook_female_1",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FemaleWarm => "Warm female (default)",
            Self::MaleDeep => "Deep male",
            Self::ChildCheerful => "Cheerful child",
            Self::RobotNeutral => "Neutral robot",
            Self::MaleQnQingse => "Young male student",
            Self::MaleQnJingying => "Professional male",
            Self::FemaleShaonv => "Lively girl",
            Self::FemaleYujie => "Mature female",
            Self::PresenterMale => "Male presenter",
            Self::PresenterFemale => "Female presenter",
            Self::AudiobookMale1 => "Audiobook male",
            Self::AudiobookFemale1 => "Audiobook female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().find(|voice| voice.as_str() == s)
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
    Calm,
    Fluent,
}

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Disgusted,
        Emotion::Surprised,
        Emotion::Calm,
        Emotion::Fluent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Fearful => "fearful",
            Self::Disgusted => "disgusted",
            Self::Surprised => "surprised",
            Self::Calm => "calm",
            Self::Fluent => "fluent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|emotion| emotion.as_str() == s)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// Speech rate multiplier (0.5 to 2.0)
    pub speed: f64,
    /// Output volume (0 to 100)
    pub volume: f64,
    /// Pitch shift (-10 to 10)
    pub pitch: i32,
    pub voice_id: VoiceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            volume: MAX_VOLUME,
            pitch: 0,
            voice_id: VoiceId::FemaleWarm,
            emotion: Some(Emotion::Calm),
        }
    }
}

/// A single field-level edit of [`VoiceSettings`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoiceUpdate {
    Speed(f64),
    Volume(f64),
    Pitch(i32),
    Voice(VoiceId),
    Emotion(Option<Emotion>),
}

impl VoiceUpdate {
    /// Whether this edit changes an input of the duration analysis.
    pub fn affects_duration(&self) -> bool {
        matches!(self, Self::Speed(_))
    }
}

impl VoiceSettings {
    /// Return a copy with `update` applied, clamped to the control ranges.
    pub fn apply(&self, update: VoiceUpdate) -> Self {
        let mut next = self.clone();
        match update {
            VoiceUpdate::Speed(speed) => {
                next.speed = if speed.is_finite() {
                    speed.clamp(MIN_SPEED, MAX_SPEED)
                } else {
                    self.speed
                };
            }
            VoiceUpdate::Volume(volume) => {
                next.volume = if volume.is_finite() {
                    volume.clamp(MIN_VOLUME, MAX_VOLUME)
                } else {
                    self.volume
                };
            }
            VoiceUpdate::Pitch(pitch) => next.pitch = pitch.clamp(MIN_PITCH, MAX_PITCH),
            VoiceUpdate::Voice(voice_id) => next.voice_id = voice_id,
            VoiceUpdate::Emotion(emotion) => next.emotion = emotion,
        }
        next
    }
}
