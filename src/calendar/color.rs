use serde::{Deserialize, Serialize};

/// Event colors used for mirrored copies, named after the Google Calendar
/// palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorTag {
    Flamingo,
    Tangerine,
    Blueberry,
    Basil,
}

impl ColorTag {
    pub fn color_id(&self) -> &'static str {
        match self {
            ColorTag::Flamingo => "4",
            ColorTag::Tangerine => "6",
            ColorTag::Blueberry => "9",
            ColorTag::Basil => "10",
        }
    }

    pub fn from_color_id(id: &str) -> Option<Self> {
        match id {
            "4" => Some(ColorTag::Flamingo),
            "6" => Some(ColorTag::Tangerine),
            "9" => Some(ColorTag::Blueberry),
            "10" => Some(ColorTag::Basil),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorTag::Flamingo => "flamingo",
            ColorTag::Tangerine => "tangerine",
            ColorTag::Blueberry => "blueberry",
            ColorTag::Basil => "basil",
        }
    }
}
