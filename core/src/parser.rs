//! Splits raw model output into the in-character reply and an optional
//! correction.
//!
//! The model is instructed to emit corrections as a single line:
//!
//! ```text
//! Correction: <corrected sentence> | Reason: <why> | Example: <similar sentence>
//! <in-character reply>
//! ```
//!
//! Nothing about that is guaranteed, so every branch degrades to best-effort
//! text instead of failing.

use crate::corrections::{Correction, CorrectionRecord};

pub const CORRECTION_MARKER: &str = "Correction:";
pub const REASON_PREFIX: &str = "Reason:";
pub const EXAMPLE_PREFIX: &str = "Example:";
pub const FIELD_DELIMITER: char = '|';

pub const DEFAULT_REASON: &str = "Grammar adjustment.";
pub const EMPTY_REPLY_PLACEHOLDER: &str = "…";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTurnResult {
    pub reply_text: String,
    pub correction: Option<CorrectionRecord>,
}

/// Parses one model reply. `original_utterance` is the user text that prompted it.
pub fn parse_model_output(raw: &str, original_utterance: &str) -> ParsedTurnResult {
    let Some((preamble, remainder)) = raw.split_once(CORRECTION_MARKER) else {
        return ParsedTurnResult {
            reply_text: non_empty_or_placeholder(raw.trim()),
            correction: None,
        };
    };

    let (block, continuation) = remainder.split_once('\n').unwrap_or((remainder, ""));
    let correction = parse_correction_block(block, original_utterance);

    let reply_text = [continuation.trim(), preamble.trim()]
        .into_iter()
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(EMPTY_REPLY_PLACEHOLDER)
        .to_string();

    ParsedTurnResult {
        reply_text,
        correction: Some(CorrectionRecord::new(correction)),
    }
}

/// Parses the pipe-delimited line that follows the marker. Field 0 is the
/// corrected sentence; the rest are looked up by prefix, so their order and
/// any unknown extras do not matter.
pub fn parse_correction_block(block: &str, original_utterance: &str) -> Correction {
    let fields: Vec<&str> = block.split(FIELD_DELIMITER).collect();
    let corrected_text = fields.first().map(|f| f.trim()).unwrap_or_default();
    let extra = fields.get(1..).unwrap_or_default();

    if corrected_text.is_empty() {
        tracing::debug!("correction marker present with an empty corrected sentence");
    }

    let reason = match prefixed_field(extra, REASON_PREFIX) {
        Some(reason) => reason.to_string(),
        None => {
            tracing::debug!("correction block has no reason field, using default");
            DEFAULT_REASON.to_string()
        }
    };

    Correction {
        original_utterance: original_utterance.to_string(),
        corrected_text: corrected_text.to_string(),
        reason,
        example: prefixed_field(extra, EXAMPLE_PREFIX).map(str::to_string),
    }
}

/// Writes a correction back into block form. `parse_correction_block` on the
/// result gives the same correction back, up to surrounding whitespace.
pub fn render_correction_block(correction: &Correction) -> String {
    let mut block = format!(
        "{CORRECTION_MARKER} {} {FIELD_DELIMITER} {REASON_PREFIX} {}",
        correction.corrected_text, correction.reason
    );
    if let Some(example) = &correction.example {
        block.push_str(&format!(" {FIELD_DELIMITER} {EXAMPLE_PREFIX} {example}"));
    }
    block
}

/// First field that starts with `prefix` after trimming, with the prefix stripped.
fn prefixed_field<'a>(fields: &[&'a str], prefix: &str) -> Option<&'a str> {
    fields
        .iter()
        .copied()
        .find_map(|field| field.trim().strip_prefix(prefix))
        .map(str::trim)
}

fn non_empty_or_placeholder(text: &str) -> String {
    if text.is_empty() {
        EMPTY_REPLY_PLACEHOLDER.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn correction_of(result: &ParsedTurnResult) -> &Correction {
        &result
            .correction
            .as_ref()
            .expect("expected a correction")
            .correction
    }

    #[test]
    fn plain_reply_passes_through_trimmed() {
        let result = parse_model_output("  Sure, one latte coming up!\n", "A latte please");
        assert_eq!(result.reply_text, "Sure, one latte coming up!");
        assert!(result.correction.is_none());
    }

    #[test]
    fn full_block_with_continuation() {
        let raw = "Hi! Correction: I go there. | Reason: Wrong tense. | Example: I went there.\nGreat, see you soon!";
        let result = parse_model_output(raw, "I goed there");

        assert_eq!(result.reply_text, "Great, see you soon!");
        let correction = correction_of(&result);
        assert_eq!(correction.corrected_text, "I go there.");
        assert_eq!(correction.reason, "Wrong tense.");
        assert_eq!(correction.example.as_deref(), Some("I went there."));
        assert_eq!(correction.original_utterance, "I goed there");
    }

    #[test]
    fn missing_example_is_absent_not_empty() {
        let raw = "Correction: I am tired. | Reason: Missing verb.\nLet's sit down.";
        let result = parse_model_output(raw, "I tired");
        assert_eq!(correction_of(&result).example, None);
    }

    #[test]
    fn empty_example_field_is_kept_as_empty() {
        let raw = "Correction: I am tired. | Reason: Missing verb. | Example:\nLet's sit down.";
        let result = parse_model_output(raw, "I tired");
        assert_eq!(correction_of(&result).example.as_deref(), Some(""));
    }

    #[test]
    fn missing_reason_falls_back_to_default() {
        let raw = "Correction: She doesn't like tea. | Example: He doesn't drink milk.\nNo problem!";
        let result = parse_model_output(raw, "She don't like tea");
        assert_eq!(correction_of(&result).reason, DEFAULT_REASON);
    }

    #[test]
    fn fields_are_found_by_prefix_in_any_order() {
        let raw = "Correction: I went home. | Mood: calm | Example: I walked home. | Reason: Past tense.\nOk!";
        let correction = correction_of(&parse_model_output(raw, "I go home yesterday")).clone();
        assert_eq!(correction.reason, "Past tense.");
        assert_eq!(correction.example.as_deref(), Some("I walked home."));
    }

    #[test]
    fn reason_in_first_field_is_not_scanned() {
        let raw = "Correction: Reason: odd | Example: x\nHi";
        let correction = correction_of(&parse_model_output(raw, "u")).clone();
        assert_eq!(correction.corrected_text, "Reason: odd");
        assert_eq!(correction.reason, DEFAULT_REASON);
    }

    #[test]
    fn empty_continuation_falls_back_to_preamble() {
        let raw = "Nice to meet you! Correction: I am from Spain. | Reason: Verb.\n   \n";
        let result = parse_model_output(raw, "I from Spain");
        assert_eq!(result.reply_text, "Nice to meet you!");
    }

    #[test]
    fn no_continuation_and_no_preamble_uses_placeholder() {
        let result = parse_model_output("Correction: I am here. | Reason: Verb.", "I here");
        assert_eq!(result.reply_text, EMPTY_REPLY_PLACEHOLDER);
        assert!(result.correction.is_some());
    }

    #[test]
    fn bare_marker_yields_empty_corrected_sentence() {
        let result = parse_model_output("Correction:", "anything");
        let correction = correction_of(&result);
        assert_eq!(correction.corrected_text, "");
        assert_eq!(correction.reason, DEFAULT_REASON);
        assert_eq!(correction.example, None);
        assert_eq!(result.reply_text, EMPTY_REPLY_PLACEHOLDER);
    }

    #[test]
    fn empty_output_yields_placeholder_and_no_correction() {
        let result = parse_model_output("", "hello");
        assert_eq!(result.reply_text, EMPTY_REPLY_PLACEHOLDER);
        assert!(result.correction.is_none());

        let result = parse_model_output(" \n\t ", "hello");
        assert_eq!(result.reply_text, EMPTY_REPLY_PLACEHOLDER);
    }

    #[test]
    fn only_the_first_marker_splits() {
        let raw = "Correction: I like it. | Reason: Verb form.\nSure! Correction: is a big word.";
        let result = parse_model_output(raw, "I liking it");
        assert_eq!(correction_of(&result).corrected_text, "I like it.");
        assert_eq!(result.reply_text, "Sure! Correction: is a big word.");
    }

    #[test]
    fn continuation_keeps_its_inner_lines() {
        let raw = "Correction: Two coffees. | Reason: Plural.\n*Scene: Counter*\n\nAnything else?";
        let result = parse_model_output(raw, "Two coffee");
        assert_eq!(result.reply_text, "*Scene: Counter*\n\nAnything else?");
    }

    #[test]
    fn crlf_line_endings_are_trimmed_away() {
        let raw = "Correction: I am ready. | Reason: Verb. | Example: We are ready.\r\nGreat.\r\n";
        let result = parse_model_output(raw, "I ready");
        assert_eq!(correction_of(&result).example.as_deref(), Some("We are ready."));
        assert_eq!(result.reply_text, "Great.");
    }

    #[test]
    fn render_omits_absent_example() {
        let block = render_correction_block(&Correction {
            original_utterance: String::new(),
            corrected_text: "I am here.".to_string(),
            reason: "Verb.".to_string(),
            example: None,
        });
        assert_eq!(block, "Correction: I am here. | Reason: Verb.");
    }

    fn sentence() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 .,'?!-]{0,40}".prop_map(|s| s.trim().to_string())
    }

    proptest! {
        #[test]
        fn marker_free_output_is_returned_trimmed(raw in "[^C]{0,120}") {
            let result = parse_model_output(&raw, "x");
            prop_assert!(result.correction.is_none());
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                prop_assert_eq!(result.reply_text, EMPTY_REPLY_PLACEHOLDER);
            } else {
                prop_assert_eq!(result.reply_text, trimmed);
            }
        }

        #[test]
        fn later_markers_never_split_again(reply in sentence(), tail in sentence()) {
            let raw = format!("Correction: Fixed. | Reason: R.\n{reply} Correction: {tail}");
            let result = parse_model_output(&raw, "x");
            prop_assert_eq!(&result.correction.unwrap().correction.corrected_text, "Fixed.");
            let expected = format!("{reply} Correction: {tail}").trim().to_string();
            prop_assert_eq!(result.reply_text, expected);
        }

        #[test]
        fn rendered_block_parses_back(
            corrected in sentence(),
            reason in sentence(),
            example in proptest::option::of(sentence()),
            reply in sentence(),
        ) {
            let correction = Correction {
                original_utterance: "user said this".to_string(),
                corrected_text: corrected,
                reason,
                example,
            };
            let raw = format!("{}\n{reply}", render_correction_block(&correction));
            let result = parse_model_output(&raw, "user said this");
            prop_assert_eq!(&result.correction.unwrap().correction, &correction);
        }
    }
}
