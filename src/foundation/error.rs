pub type GifTextResult<T> = Result<T, GifTextError>;

/// Error kinds surfaced by the caption-to-GIF pipeline.
///
/// Per-frame `Decode`/`Render`/`Segmentation` failures are folded into holes by the frame
/// processor; they only reach the caller through a strict hole policy or direct API use.
#[derive(thiserror::Error, Debug)]
pub enum GifTextError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("segmentation error: {0}")]
    Segmentation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Stage classification of a [`GifTextError`], for reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    Segmentation,
    Render,
    Encode,
    Config,
    Io,
    Cancelled,
    Other,
}

impl ErrorKind {
    pub fn stage(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::Segmentation => "segmentation",
            Self::Render => "render",
            Self::Encode => "encode",
            Self::Config => "config",
            Self::Io => "io",
            Self::Cancelled => "process",
            Self::Other => "internal",
        }
    }
}

impl GifTextError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn segmentation(msg: impl Into<String>) -> Self {
        Self::Segmentation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Rebuild an error of the given kind. `Other` keeps only the message.
    pub fn of_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match kind {
            ErrorKind::Decode => Self::Decode(msg),
            ErrorKind::Segmentation => Self::Segmentation(msg),
            ErrorKind::Render => Self::Render(msg),
            ErrorKind::Encode => Self::Encode(msg),
            ErrorKind::Config => Self::Config(msg),
            ErrorKind::Io => Self::Io(msg),
            ErrorKind::Cancelled => Self::Cancelled(msg),
            ErrorKind::Other => Self::Other(anyhow::anyhow!(msg)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) => ErrorKind::Decode,
            Self::Segmentation(_) => ErrorKind::Segmentation,
            Self::Render(_) => ErrorKind::Render,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
