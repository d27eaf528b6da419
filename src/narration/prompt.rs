//! Prompt templates for story expansion and narration

use crate::catalog::{FolkStory, Language};

/// Instructions for expanding a story summary into a long-form narration
#[must_use]
pub fn analysis_prompt(story: &FolkStory) -> String {
    format!(
        "You are an expert Indian cultural storyteller. Expand this story into a detailed, \
         immersive, and atmospheric long-form narration (roughly 500-700 words).\n\
         \n\
         Story: {title}\n\
         Region: {region}\n\
         Summary: {summary}\n\
         \n\
         Requirements:\n\
         1. Use rich, descriptive language to paint the setting.\n\
         2. Include internal monologues and dialogue where appropriate.\n\
         3. Maintain strict cultural authenticity to the {region} region.\n\
         4. Provide the result in a single cohesive block of text with paragraph breaks (\\n\\n).\n\
         \n\
         Also provide metadata:\n\
         - Predominant emotion\n\
         - Intensity (1-10)\n\
         - Cultural nuances\n\
         - Historical context\n\
         - Regional significance.",
        title = story.title,
        region = story.region,
        summary = story.summary,
    )
}

/// Instructions for the speech model
///
/// English narrations keep an Indian English voice; other languages are
/// translated first.
#[must_use]
pub fn speech_prompt(text: &str, language: Language) -> String {
    match language {
        Language::English => format!(
            "Narrate the following story in Indian English. Use a warm, authentic Indian accent \
             with expressive storytelling tones. Ensure clear pronunciation of Indian names and \
             terms. Text: {text}"
        ),
        other => format!(
            "Translate the following story into {other} and narrate it with a warm, authentic, \
             and expressive voice specific to {other} speakers. Text: {text}"
        ),
    }
}
