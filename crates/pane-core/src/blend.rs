/// Blend state a sprite batch is opened with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Source replaces destination, alpha included.
    Opaque,
    /// Premultiplied source-over.
    #[default]
    AlphaBlend,
    Additive,
    /// Straight (non-premultiplied) source-over.
    NonPremultiplied,
}

impl BlendMode {
    /// Parse a level-data blend name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "opaque" => Some(Self::Opaque),
            "alphablend" => Some(Self::AlphaBlend),
            "additive" => Some(Self::Additive),
            "nonpremultiplied" => Some(Self::NonPremultiplied),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Opaque => "opaque",
            Self::AlphaBlend => "alphablend",
            Self::Additive => "additive",
            Self::NonPremultiplied => "nonpremultiplied",
        }
    }
}
