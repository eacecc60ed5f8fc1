use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Where the pixels of an image object come from
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageSource {
    /// Encoded image bytes held in memory (what an upload produces)
    Embedded(Arc<Vec<u8>>),
    /// A remote or data URL the surrounding application resolves
    Url(String),
}

// Custom Debug implementation so snapshots don't dump whole files into logs
impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::Embedded(bytes) => f
                .debug_tuple("Embedded")
                .field(&format!("<{} bytes>", bytes.len()))
                .finish(),
            ImageSource::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

impl ImageSource {
    pub fn embedded_bytes(&self) -> Option<&[u8]> {
        match self {
            ImageSource::Embedded(bytes) => Some(bytes.as_slice()),
            ImageSource::Url(_) => None,
        }
    }
}

/// Kind-specific data of an image object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub source: ImageSource,
    /// Pixel dimensions of the decoded source
    pub natural_size: [u32; 2],
}

impl ImageData {
    pub fn new(source: ImageSource, natural_size: [u32; 2]) -> Self {
        Self {
            source,
            natural_size,
        }
    }
}
