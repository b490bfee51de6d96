pub mod tables;

use crate::models::{AnalyzeMode, ArtStyle, TargetTool};

const TASK_PREAMBLE: &str = "You are an expert prompt engineer for AI image generators. \
Rewrite the user's idea into three prompt variants of increasing detail and one negative prompt.";

const OUTPUT_CONTRACT: &str = "Respond with JSON only, no Markdown, using exactly these keys: \
{\"clean\": string, \"detailed\": string, \"extreme\": string, \"negative\": string, \
\"params\": {\"aspectRatio\": string, \"notes\": string}}. \
\"clean\" is one concise sentence, \"detailed\" adds composition, lighting and materials, \
\"extreme\" is maximally rich. Put a suggested aspect ratio such as 16:9 in params.aspectRatio.";

const IMAGE_PREAMBLE: &str = "A reference image is attached. Study it before writing.";

/// Builds the instruction sent to the model for the text flow.
pub fn build_text_prompt(target: TargetTool, style: ArtStyle, idea: &str) -> String {
    assemble(target, style, None, Some(idea))
}

/// Builds the instruction for the image flow; `idea` is optional there.
pub fn build_image_prompt(
    target: TargetTool,
    style: ArtStyle,
    mode: AnalyzeMode,
    idea: Option<&str>,
) -> String {
    assemble(target, style, Some(mode), idea)
}

fn assemble(
    target: TargetTool,
    style: ArtStyle,
    mode: Option<AnalyzeMode>,
    idea: Option<&str>,
) -> String {
    let mut sections: Vec<String> = vec![TASK_PREAMBLE.to_string()];
    if mode.is_some() {
        sections.push(IMAGE_PREAMBLE.to_string());
    }
    sections.push(OUTPUT_CONTRACT.to_string());
    sections.push(tables::target_guidance(target).to_string());

    let description = tables::style_description(style);
    if !description.is_empty() {
        sections.push(format!("Art style: {}", description));
    }
    sections.push(tables::negative_guidance(style));

    if let Some(mode) = mode {
        sections.push(tables::mode_rules(mode).to_string());
    }

    match idea.filter(|idea| !idea.trim().is_empty()) {
        Some(idea) => sections.push(format!("User idea:\n{}", idea)),
        None => sections.push("User idea: none given, rely on the reference image.".to_string()),
    }

    sections.join("\n\n")
}
