/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text: send it as the next utterance.
    Say(String),
    /// Empty line: send whatever is in the draft.
    SendDraft,
    Help,
    Scenarios,
    Scenario(String),
    Corrections,
    Explain(usize),
    Close,
    Report,
    Voice,
    Transcript,
    Quit,
    Usage(&'static str),
    Unknown(String),
}

pub const HELP: &str = "\
Type a message and press Enter to reply in character.
  /scenarios          list scenarios
  /scenario <id>      switch scenario (starts over)
  /corrections        show logged corrections, newest first
  /explain <n>        explain correction n from /corrections
  /close              close the explanation
  /report             analyze the session so far
  /voice              start or stop dictation; the next line becomes the draft
  /transcript         print the whole conversation
  /quit               leave
An empty line sends the current draft.";

pub fn parse(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::SendDraft;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Say(line.to_string());
    };

    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map(|(name, arg)| (name, arg.trim()))
        .unwrap_or((rest, ""));

    match name {
        "help" | "?" => Command::Help,
        "scenarios" => Command::Scenarios,
        "scenario" if arg.is_empty() => Command::Usage("/scenario <id>"),
        "scenario" => Command::Scenario(arg.to_string()),
        "corrections" => Command::Corrections,
        "explain" => match arg.parse::<usize>() {
            Ok(position) if position > 0 => Command::Explain(position),
            _ => Command::Usage("/explain <n>  (n from /corrections, starting at 1)"),
        },
        "close" => Command::Close,
        "report" => Command::Report,
        "voice" => Command::Voice,
        "transcript" => Command::Transcript,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_said_verbatim() {
        assert_eq!(parse("I want a coffee"), Command::Say("I want a coffee".to_string()));
    }

    #[test]
    fn blank_line_sends_the_draft() {
        assert_eq!(parse(""), Command::SendDraft);
        assert_eq!(parse("   "), Command::SendDraft);
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(parse("/scenario  train_sim "), Command::Scenario("train_sim".to_string()));
        assert_eq!(parse("/explain 2"), Command::Explain(2));
        assert!(matches!(parse("/explain"), Command::Usage(_)));
        assert!(matches!(parse("/explain 0"), Command::Usage(_)));
        assert!(matches!(parse("/explain two"), Command::Usage(_)));
        assert!(matches!(parse("/scenario"), Command::Usage(_)));
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("/report"), Command::Report);
        assert_eq!(parse("/voice"), Command::Voice);
        assert_eq!(parse("/exit"), Command::Quit);
        assert_eq!(parse("/dance"), Command::Unknown("dance".to_string()));
    }
}
