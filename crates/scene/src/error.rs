use std::fmt;

/// Scene model construction failure. The owning renderer responds by
/// retaining its previous scene; a failed construction is never rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Focus point is non-finite or outside the geodetic domain.
    InvalidFocus,
    /// Resolution is non-finite or not positive.
    InvalidResolution,
    /// The composed forward transform could not be inverted.
    NonInvertibleTransform,
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFocus => write!(f, "focus point is invalid"),
            Self::InvalidResolution => write!(f, "resolution must be finite and positive"),
            Self::NonInvertibleTransform => write!(f, "scene transform is not invertible"),
        }
    }
}

impl std::error::Error for SceneError {}
