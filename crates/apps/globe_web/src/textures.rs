use std::io::Cursor;

use gloo_net::http::Request;

/// Which material slot an image feeds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureKind {
    Color,
    Bump,
    Specular,
}

impl TextureKind {
    pub const ALL: [TextureKind; 3] = [TextureKind::Color, TextureKind::Bump, TextureKind::Specular];

    pub fn label(self) -> &'static str {
        match self {
            TextureKind::Color => "color",
            TextureKind::Bump => "bump",
            TextureKind::Specular => "specular",
        }
    }

    /// Color data is authored in sRGB; the height and mask maps are linear.
    pub fn is_srgb(self) -> bool {
        matches!(self, TextureKind::Color)
    }
}

#[derive(Debug)]
pub enum TextureError {
    Fetch { url: String, reason: String },
    Status { url: String, status: u16 },
    Decode { reason: String },
}

impl std::fmt::Display for TextureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureError::Fetch { url, reason } => write!(f, "fetching {url} failed: {reason}"),
            TextureError::Status { url, status } => {
                write!(f, "fetching {url} returned HTTP {status}")
            }
            TextureError::Decode { reason } => write!(f, "image decode failed: {reason}"),
        }
    }
}

impl std::error::Error for TextureError {}

/// Tightly packed RGBA8 pixels, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    /// Single-pixel stand-in used until the real image arrives.
    pub fn placeholder(kind: TextureKind) -> Self {
        let pixel = match kind {
            TextureKind::Color => [255, 255, 255, 255],
            // Mid-grey height: flat, no bump.
            TextureKind::Bump => [128, 128, 128, 255],
            TextureKind::Specular => [0, 0, 0, 255],
        };
        Self {
            width: 1,
            height: 1,
            pixels: pixel.to_vec(),
        }
    }
}

pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, TextureError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| TextureError::Decode {
            reason: e.to_string(),
        })?;
    let decoded = reader.decode().map_err(|e| TextureError::Decode {
        reason: e.to_string(),
    })?;
    let rgba = decoded.into_rgba8();
    Ok(RgbaImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, TextureError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| TextureError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    if !resp.ok() {
        return Err(TextureError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    resp.binary().await.map_err(|e| TextureError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

pub async fn load_texture(url: &str) -> Result<RgbaImage, TextureError> {
    let bytes = fetch_bytes(url).await?;
    let image = decode_rgba(&bytes)?;
    tracing::debug!(url, width = image.width, height = image.height, "texture decoded");
    Ok(image)
}
