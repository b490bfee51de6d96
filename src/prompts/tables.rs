use crate::models::{AnalyzeMode, ArtStyle, TargetTool};

/// Terms appended to every negative prompt. Shared by both flows; it never
/// lists "logo" or "text" so logo and typography styles stay usable.
pub const BASELINE_NEGATIVE: &[&str] = &[
    "blurry",
    "low quality",
    "lowres",
    "jpeg artifacts",
    "watermark",
    "signature",
    "deformed",
    "bad anatomy",
    "extra fingers",
    "cropped",
];

pub fn target_guidance(target: TargetTool) -> &'static str {
    match target {
        TargetTool::Midjourney => {
            "Target: Midjourney. Write comma-separated visual phrases, strongest subject first. \
             Put the preferred aspect ratio in params.aspectRatio instead of appending --ar flags."
        }
        TargetTool::StableDiffusion => {
            "Target: Stable Diffusion. Use weighted keyword phrases, quality tags, and a thorough \
             negative prompt."
        }
        TargetTool::Dalle => {
            "Target: DALL-E. Write natural, descriptive sentences. Avoid keyword stuffing and \
             parameter syntax."
        }
        TargetTool::Flux => {
            "Target: Flux. Write precise natural-language descriptions with explicit composition, \
             lighting and materials."
        }
        TargetTool::Leonardo => {
            "Target: Leonardo. Mix short descriptive sentences with style keywords."
        }
        TargetTool::Generic => {
            "Target: any modern image generator. Use clear descriptive language that works across \
             tools."
        }
    }
}

/// Empty for `ArtStyle::None`.
pub fn style_description(style: ArtStyle) -> &'static str {
    match style {
        ArtStyle::None => "",
        ArtStyle::Photorealistic => {
            "Photorealistic photography: real camera, lens and lighting details, natural skin and \
             material textures."
        }
        ArtStyle::Cinematic => {
            "Cinematic film still: dramatic lighting, anamorphic framing, color graded, shallow \
             depth of field."
        }
        ArtStyle::Anime => {
            "Anime illustration: clean line art, cel shading, expressive characters, vibrant palette."
        }
        ArtStyle::DigitalArt => {
            "Digital painting: polished concept-art finish, painterly brushwork, rich lighting."
        }
        ArtStyle::OilPainting => {
            "Oil painting: visible brush strokes, canvas texture, classical color harmony."
        }
        ArtStyle::Watercolor => {
            "Watercolor: soft washes, paper grain, gentle bleeding edges, airy composition."
        }
        ArtStyle::PixelArt => {
            "Pixel art: limited palette, crisp pixel grid, retro game aesthetic."
        }
        ArtStyle::Render3d => {
            "3D render: physically based materials, global illumination, studio lighting."
        }
        ArtStyle::VectorLogo => {
            "Flat vector logo: simple geometric shapes, bold silhouette, limited flat colors, \
             plain background, scalable and legible at small sizes."
        }
        ArtStyle::Comic => {
            "Comic book art: inked outlines, halftone shading, dynamic panels and poses."
        }
        ArtStyle::Sketch => {
            "Pencil sketch: graphite lines, cross-hatching, unfinished paper texture."
        }
    }
}

/// Canonical negative phrases for a style, merged into every result.
pub fn style_negatives(style: ArtStyle) -> &'static [&'static str] {
    match style {
        ArtStyle::None => &[],
        ArtStyle::Photorealistic => &["cartoon", "illustration", "painting", "plastic skin"],
        ArtStyle::Cinematic => &["flat lighting", "overexposed", "amateur snapshot"],
        ArtStyle::Anime => &["photorealistic", "3d render", "western cartoon"],
        ArtStyle::DigitalArt => &["photo", "noisy", "muddy colors"],
        ArtStyle::OilPainting => &["photo", "digital smoothness", "flat colors"],
        ArtStyle::Watercolor => &["hard edges", "photo", "oversaturated"],
        ArtStyle::PixelArt => &["anti-aliasing", "smooth gradients", "photorealistic"],
        ArtStyle::Render3d => &["flat shading", "hand drawn", "sketch"],
        ArtStyle::VectorLogo => &[
            "3d render",
            "photorealistic",
            "gradients",
            "complex background",
            "tiny details",
        ],
        ArtStyle::Comic => &["photorealistic", "3d render", "washed out colors"],
        ArtStyle::Sketch => &["color", "photorealistic", "digital painting"],
    }
}

/// Prose guidance about what the negative prompt should cover.
pub fn negative_guidance(style: ArtStyle) -> String {
    let style_terms = style_negatives(style);
    let mut guidance = String::from(
        "Negative prompt: list things to avoid as comma-separated terms, for example ",
    );
    guidance.push_str(&BASELINE_NEGATIVE[..4].join(", "));
    if !style_terms.is_empty() {
        guidance.push_str(". For this style also avoid ");
        guidance.push_str(&style_terms.join(", "));
    }
    guidance.push('.');
    guidance
}

pub fn mode_rules(mode: AnalyzeMode) -> &'static str {
    match mode {
        AnalyzeMode::Recreate => {
            "Mode: recreate. Describe the reference image faithfully: subject, pose, composition, \
             camera angle, lighting, palette and background. The prompts must reproduce the same \
             scene as closely as possible."
        }
        AnalyzeMode::StyleOnly => {
            "Mode: style-only. Extract only the visual style of the reference image: medium, \
             palette, lighting, texture and mood. Do not describe its subject; apply the style to \
             the user's idea instead."
        }
    }
}
