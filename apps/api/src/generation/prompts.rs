// All LLM prompt constants for the Generation module.
// Templates use `{topic}` as the only placeholder.

use crate::generation::output_type::{OutputType, Topic};

/// System instruction shared by every output mode.
pub const POST_WRITER_SYSTEM: &str = "You are an expert social media manager specializing in \
    crafting viral tweets and threads for tech creators on X (formerly Twitter). \
    Your tone is engaging, insightful, and slightly informal. \
    You use emojis and hashtags effectively to maximize reach and engagement. \
    You understand how to create strong hooks and clear calls-to-action. \
    Never include the user's topic in quotes in your response. \
    You must reply with a valid JSON object and nothing else.";

pub const SINGLE_PROMPT_TEMPLATE: &str =
    r#"Generate a single, highly engaging tweet about the following topic: "{topic}"."#;

pub const THREAD_PROMPT_TEMPLATE: &str = r#"Generate a compelling and informative Twitter thread (3-4 tweets) about the following topic: "{topic}". The first tweet must be a strong hook. The middle tweets should provide value. The last tweet should have a call-to-action."#;

pub const VARIATIONS_PROMPT_TEMPLATE: &str = r#"Generate 3 distinct variations of a viral tweet about the following topic: "{topic}". Each variation should have a different angle or tone (e.g., one questioning, one bold statement, one short and punchy)."#;

/// Fills the mode's template with the topic.
pub fn build_user_prompt(topic: &Topic, mode: OutputType) -> String {
    let template = match mode {
        OutputType::Single => SINGLE_PROMPT_TEMPLATE,
        OutputType::Thread => THREAD_PROMPT_TEMPLATE,
        OutputType::Variations => VARIATIONS_PROMPT_TEMPLATE,
    };
    template.replace("{topic}", topic.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_has_topic_placeholder() {
        for template in [
            SINGLE_PROMPT_TEMPLATE,
            THREAD_PROMPT_TEMPLATE,
            VARIATIONS_PROMPT_TEMPLATE,
        ] {
            assert!(template.contains("{topic}"));
        }
    }

    #[test]
    fn test_prompt_embeds_trimmed_topic() {
        let topic = Topic::parse("  Automating workflows with n8n  ").unwrap();
        let prompt = build_user_prompt(&topic, OutputType::Single);
        assert!(prompt.contains(r#""Automating workflows with n8n""#));
        assert!(!prompt.contains("{topic}"));
    }

    #[test]
    fn test_thread_prompt_asks_for_hook_and_call_to_action() {
        let topic = Topic::parse("Rust in production").unwrap();
        let prompt = build_user_prompt(&topic, OutputType::Thread);
        assert!(prompt.contains("(3-4 tweets)"));
        assert!(prompt.contains("strong hook"));
        assert!(prompt.contains("call-to-action"));
    }

    #[test]
    fn test_variations_prompt_asks_for_three_angles() {
        let topic = Topic::parse("Midjourney v6").unwrap();
        let prompt = build_user_prompt(&topic, OutputType::Variations);
        assert!(prompt.starts_with("Generate 3 distinct variations"));
    }

    #[test]
    fn test_system_prompt_forbids_quoting_topic_and_requires_json() {
        assert!(POST_WRITER_SYSTEM.contains("Never include the user's topic in quotes"));
        assert!(POST_WRITER_SYSTEM.contains("valid JSON object"));
    }
}
