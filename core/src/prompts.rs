use crate::corrections::Correction;
use crate::scenarios::ScenarioDefinition;
use crate::turns::{Speaker, Turn};

/// How many trailing turns go into a chat prompt as context.
pub const HISTORY_WINDOW: usize = 6;

/// Prompt for the next in-character reply.
///
/// `recent` is the trailing window of the transcript as it was before the new
/// utterance; user turns are labeled `User`, everything else with the
/// scenario's role.
pub fn chat_prompt(scenario: &ScenarioDefinition, recent: &[Turn], utterance: &str) -> String {
    let history = recent
        .iter()
        .map(|turn| format!("{}: {}", speaker_label(turn.speaker, scenario.role), turn.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{instruction}\n\nCurrent Conversation History:\n{history}\n\nUser: {utterance}\n{role}:",
        instruction = scenario.instruction_text,
        role = scenario.role,
    )
}

fn speaker_label(speaker: Speaker, role: &str) -> &str {
    match speaker {
        Speaker::User => "User",
        Speaker::Assistant | Speaker::Annotation => role,
    }
}

/// Whole transcript as `<speaker>: <text>` lines.
pub fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker.as_str(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn analysis_prompt(turns: &[Turn]) -> String {
    format!(
        r#"Analyze the following English conversation.
Provide:
1. Session Summary (2 sentences max).
2. Repetitive mistakes.
3. Major strength.
4. Area for improvement.

Format as JSON:
{{
    "summary": "...",
    "mistakes": ["..."],
    "strength": "...",
    "improvement": "..."
}}

Conversation:
{}"#,
        render_transcript(turns)
    )
}

pub fn explanation_prompt(correction: &Correction) -> String {
    let original = if correction.original_utterance.trim().is_empty() {
        "N/A"
    } else {
        correction.original_utterance.as_str()
    };

    format!(
        "You are an expert English tutor. The user made a mistake in a roleplay conversation.\n\
         Original Sentence (User Mistake): \"{original}\"\n\
         Correction Provided: \"{}\"\n\
         Brief Reason Given: \"{}\"\n\n\
         Please provide a detailed, easy-to-understand explanation of the grammar rule behind this mistake.\n\
         Explain WHY the original sentence was incorrect and HOW to use the rule correctly.\n\
         Keep the tone educational, encouraging, and clear.",
        correction.corrected_text, correction.reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios;

    fn correction(original: &str) -> Correction {
        Correction {
            original_utterance: original.to_string(),
            corrected_text: "I have been there.".to_string(),
            reason: "Present perfect.".to_string(),
            example: None,
        }
    }

    #[test]
    fn chat_prompt_layout() {
        let scenario = scenarios::find("coffee_shop").unwrap();
        let recent = vec![
            Turn::assistant("What can I get you?"),
            Turn::user("One tea please"),
            Turn::annotation(correction("I been there")),
        ];

        let prompt = chat_prompt(scenario, &recent, "And a muffin");

        assert!(prompt.starts_with(scenario.instruction_text));
        assert!(prompt.contains(
            "Barista: What can I get you?\nUser: One tea please\nBarista: I have been there."
        ));
        assert!(prompt.ends_with("User: And a muffin\nBarista:"));
    }

    #[test]
    fn chat_prompt_with_empty_history() {
        let scenario = scenarios::find("train_sim").unwrap();
        let prompt = chat_prompt(scenario, &[], "Hello");
        assert!(prompt.contains("Current Conversation History:\n\n\nUser: Hello\nStation Master:"));
    }

    #[test]
    fn transcript_lines_use_speaker_names() {
        let turns = vec![Turn::assistant("Hi"), Turn::user("Hello")];
        assert_eq!(render_transcript(&turns), "assistant: Hi\nuser: Hello");
    }

    #[test]
    fn analysis_prompt_names_all_four_fields() {
        let prompt = analysis_prompt(&[Turn::user("I goes home")]);
        for field in ["\"summary\"", "\"mistakes\"", "\"strength\"", "\"improvement\""] {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.ends_with("Conversation:\nuser: I goes home"));
    }

    #[test]
    fn explanation_prompt_falls_back_when_original_is_unknown() {
        assert!(explanation_prompt(&correction("")).contains("(User Mistake): \"N/A\""));
        let prompt = explanation_prompt(&correction("I been there"));
        assert!(prompt.contains("(User Mistake): \"I been there\""));
        assert!(prompt.contains("Correction Provided: \"I have been there.\""));
        assert!(prompt.contains("Brief Reason Given: \"Present perfect.\""));
    }
}
