use serde::{Deserialize, Serialize};

/// Image-generation tool the enhanced prompt is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetTool {
    Midjourney,
    StableDiffusion,
    Dalle,
    Flux,
    Leonardo,
    Generic,
}

impl TargetTool {
    /// Unknown keys fall back to `Generic`.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "midjourney" | "mj" => TargetTool::Midjourney,
            "stable-diffusion" | "stablediffusion" | "sd" | "sdxl" => TargetTool::StableDiffusion,
            "dalle" | "dall-e" | "dall-e-3" => TargetTool::Dalle,
            "flux" => TargetTool::Flux,
            "leonardo" => TargetTool::Leonardo,
            _ => TargetTool::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetTool::Midjourney => "midjourney",
            TargetTool::StableDiffusion => "stable-diffusion",
            TargetTool::Dalle => "dalle",
            TargetTool::Flux => "flux",
            TargetTool::Leonardo => "leonardo",
            TargetTool::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtStyle {
    None,
    Photorealistic,
    Cinematic,
    Anime,
    DigitalArt,
    OilPainting,
    Watercolor,
    PixelArt,
    #[serde(rename = "3d-render")]
    Render3d,
    VectorLogo,
    Comic,
    Sketch,
}

impl ArtStyle {
    /// Unknown keys fall back to `None`, which contributes no style text.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "photorealistic" | "photo" => ArtStyle::Photorealistic,
            "cinematic" => ArtStyle::Cinematic,
            "anime" => ArtStyle::Anime,
            "digital-art" => ArtStyle::DigitalArt,
            "oil-painting" => ArtStyle::OilPainting,
            "watercolor" => ArtStyle::Watercolor,
            "pixel-art" => ArtStyle::PixelArt,
            "3d-render" => ArtStyle::Render3d,
            "vector-logo" | "logo" => ArtStyle::VectorLogo,
            "comic" => ArtStyle::Comic,
            "sketch" => ArtStyle::Sketch,
            _ => ArtStyle::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtStyle::None => "none",
            ArtStyle::Photorealistic => "photorealistic",
            ArtStyle::Cinematic => "cinematic",
            ArtStyle::Anime => "anime",
            ArtStyle::DigitalArt => "digital-art",
            ArtStyle::OilPainting => "oil-painting",
            ArtStyle::Watercolor => "watercolor",
            ArtStyle::PixelArt => "pixel-art",
            ArtStyle::Render3d => "3d-render",
            ArtStyle::VectorLogo => "vector-logo",
            ArtStyle::Comic => "comic",
            ArtStyle::Sketch => "sketch",
        }
    }
}

/// How closely the enhanced prompt should follow the reference image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalyzeMode {
    #[default]
    Recreate,
    StyleOnly,
}

impl AnalyzeMode {
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "style-only" | "style_only" | "style" => AnalyzeMode::StyleOnly,
            _ => AnalyzeMode::Recreate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzeMode::Recreate => "recreate",
            AnalyzeMode::StyleOnly => "style-only",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Text flow input (`POST /api/enhance`).
#[derive(Debug, Clone)]
pub struct TextEnhanceRequest {
    pub idea: String,
    pub target: TargetTool,
    pub art_style: ArtStyle,
}

/// Image flow input (`POST /api/analyze`).
#[derive(Debug, Clone)]
pub struct ImageEnhanceRequest {
    pub idea: Option<String>,
    pub target: TargetTool,
    pub art_style: ArtStyle,
    pub mode: AnalyzeMode,
    pub image: ReferenceImage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_degrade_to_defaults() {
        assert_eq!(TargetTool::from_key("paint-o-matic"), TargetTool::Generic);
        assert_eq!(ArtStyle::from_key("baroque-glitch"), ArtStyle::None);
        assert_eq!(AnalyzeMode::from_key(""), AnalyzeMode::Recreate);
    }

    #[test]
    fn keys_round_trip_through_as_str() {
        for style in [ArtStyle::VectorLogo, ArtStyle::Render3d, ArtStyle::PixelArt] {
            assert_eq!(ArtStyle::from_key(style.as_str()), style);
        }
        assert_eq!(TargetTool::from_key(" Midjourney "), TargetTool::Midjourney);
        assert_eq!(AnalyzeMode::from_key("style-only"), AnalyzeMode::StyleOnly);
    }
}
