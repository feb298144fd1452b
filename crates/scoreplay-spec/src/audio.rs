//! Audio formats and the embeddable `<audio>` tag.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Format of a rendered audio artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// OGG/Vorbis, written directly by the synthesizer.
    Ogg,
    /// MP3, transcoded from the OGG file.
    #[default]
    Mp3,
}

impl AudioFormat {
    /// MIME type used in the `data:` URI.
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Mp3 => "audio/mpeg",
        }
    }

    /// File name inside the render's working directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            AudioFormat::Ogg => "out.ogg",
            AudioFormat::Mp3 => "out.mp3",
        }
    }

    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Ogg => "ogg",
            AudioFormat::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ogg" => Ok(AudioFormat::Ogg),
            "mp3" => Ok(AudioFormat::Mp3),
            other => Err(format!("unknown audio format '{}'", other)),
        }
    }
}

/// Base64 audio payload ready to embed in HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTag {
    /// Format of the encoded bytes.
    pub format: AudioFormat,
    /// Standard base64 (with padding) of the audio file.
    pub base64: String,
}

impl AudioTag {
    /// Encodes `bytes` as a tag of the given format.
    pub fn from_bytes(format: AudioFormat, bytes: &[u8]) -> Self {
        Self {
            format,
            base64: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Decodes the payload back into raw audio bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.base64)
    }

    /// The `data:` URI carried in the `src` attribute.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.base64)
    }

    /// Renders the `<audio>` element.
    pub fn to_html(&self) -> String {
        format!(
            "<audio controls type=\"{}\" src=\"{}\"></audio>",
            self.format.mime_type(),
            self.data_uri()
        )
    }
}
