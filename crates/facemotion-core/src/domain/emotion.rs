//! The seven FER2013 emotion classes.

/// An emotion label, in FER2013 dataset order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Emotion {
    /// Class id 0.
    Angry = 0,
    /// Class id 1.
    Disgust = 1,
    /// Class id 2.
    Fear = 2,
    /// Class id 3.
    Happy = 3,
    /// Class id 4.
    Sad = 4,
    /// Class id 5.
    Surprise = 5,
    /// Class id 6.
    Neutral = 6,
}

impl Emotion {
    /// All classes in dataset order.
    pub const ALL: [Self; 7] = [
        Self::Angry,
        Self::Disgust,
        Self::Fear,
        Self::Happy,
        Self::Sad,
        Self::Surprise,
        Self::Neutral,
    ];

    /// Class names in dataset order, matching the `emotion_name` output column.
    pub const NAMES: [&'static str; 7] = [
        "angry",
        "disgust",
        "fear",
        "happy",
        "sad",
        "surprise",
        "neutral",
    ];

    /// Maps a FER2013 numeric label to an emotion.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    /// Returns the FER2013 numeric label.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Returns the lowercase English name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for emotion in Emotion::ALL {
            assert_eq!(Emotion::from_id(emotion.id()), Some(emotion));
        }
    }

    #[test]
    fn test_out_of_range_id() {
        assert_eq!(Emotion::from_id(7), None);
        assert_eq!(Emotion::from_id(255), None);
    }

    #[test]
    fn test_names_match_dataset_order() {
        assert_eq!(Emotion::Angry.name(), "angry");
        assert_eq!(Emotion::Happy.name(), "happy");
        assert_eq!(Emotion::Neutral.name(), "neutral");
        assert_eq!(Emotion::NAMES.len(), Emotion::ALL.len());
    }
}
