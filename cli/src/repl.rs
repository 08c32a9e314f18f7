use fluency_core::render;
use fluency_core::scenarios::{self, ScenarioCategory};
use fluency_core::session::{
    AnalysisCompletion, ChatCompletion, ExplanationCompletion, ExplanationPanel, Session,
};
use fluency_core::voice::VoiceState;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{self, Command, HELP};
use crate::controller::{Controller, Update};
use crate::gemini::TextGenerator;

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive loop. Input lines and request completions are handled as they
/// arrive, so a slow reply never blocks typing the next message.
pub async fn run<G: TextGenerator>(mut controller: Controller<G>) -> i32 {
    print_banner(controller.session());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if handle_line(&mut controller, &line) == Flow::Quit {
                        return 0;
                    }
                }
                Ok(None) => return 0,
                Err(err) => {
                    tracing::error!(error = %err, "failed to read input");
                    return 1;
                }
            },
            Some(update) = controller.next_update() => {
                print_update(controller.session(), update);
            }
        }
    }
}

fn handle_line<G: TextGenerator>(controller: &mut Controller<G>, line: &str) -> Flow {
    let command = commands::parse(line);

    // While dictating, the next line of text stands in for the recognized
    // speech. Blank lines keep listening; slash commands still work.
    if controller.session().voice_state() == VoiceState::Listening {
        match &command {
            Command::SendDraft => return Flow::Continue,
            Command::Say(text) => {
                if controller.session_mut().voice_recognized(text.trim()) {
                    println!("Draft: {}  (press Enter to send)", controller.session().draft());
                }
                return Flow::Continue;
            }
            _ => {}
        }
    }

    match command {
        Command::Say(text) => report(controller.send_message(&text).map(|_| ())),
        Command::SendDraft => {
            if !controller.session().draft().is_empty() {
                report(controller.send_draft().map(|_| ()));
            }
        }
        Command::Help => println!("{HELP}"),
        Command::Scenarios => print_scenarios(controller.session()),
        Command::Scenario(id) => match controller.session_mut().select_scenario(&id) {
            Ok(_) => print_banner(controller.session()),
            Err(err) => print_error(&err),
        },
        Command::Corrections => print_corrections(controller.session()),
        Command::Explain(position) => match controller.request_explanation(position) {
            Ok(_) => println!("Explaining correction {position}..."),
            Err(err) => print_error(&err),
        },
        Command::Close => controller.session_mut().close_explanation(),
        Command::Report => match controller.request_analysis() {
            Ok(_) => println!("Analyzing your session..."),
            Err(err) => print_error(&err),
        },
        Command::Voice => match controller.session_mut().toggle_voice() {
            Ok(VoiceState::Listening) => println!("Listening... type what you say."),
            Ok(_) => {
                controller.session_mut().voice_ended();
                println!("Stopped listening.");
            }
            Err(err) => print_error(&err),
        },
        Command::Transcript => print_transcript(controller.session()),
        Command::Quit => return Flow::Quit,
        Command::Usage(usage) => println!("Usage: {usage}"),
        Command::Unknown(name) => println!("Unknown command /{name}. Try /help."),
    }
    Flow::Continue
}

fn report(result: Result<(), fluency_core::Error>) {
    if let Err(err) = result {
        print_error(&err);
    }
}

fn print_error(err: &fluency_core::Error) {
    let report = err.report();
    tracing::debug!(code = %report.error, "action rejected");
    match report.docs_hint {
        Some(hint) => println!("! {} ({hint})", report.message),
        None => println!("! {}", report.message),
    }
}

fn print_update(session: &Session, update: Update) {
    let role = session.scenario().role;
    match update {
        Update::Chat(ChatCompletion::Applied { turns, .. }) => {
            for turn in &turns {
                println!("{}", render::render_turn(turn, role));
            }
        }
        Update::Analysis(AnalysisCompletion::Ready(report)) => {
            println!("--- Session report ---");
            println!("{}", render::render_report(&report));
            println!("Session Errors: {}", session.ledger().len());
        }
        Update::Analysis(AnalysisCompletion::Failed(err)) => println!("!! {err}"),
        Update::Explanation(ExplanationCompletion::Ready(text)) => {
            if let ExplanationPanel::Ready { record, .. } = session.explanation() {
                println!("--- Why \"{}\"? ---", record.correction.corrected_text);
            }
            println!("{text}");
            println!("(/close to dismiss)");
        }
        Update::Chat(ChatCompletion::Stale)
        | Update::Analysis(AnalysisCompletion::Stale)
        | Update::Explanation(ExplanationCompletion::Stale) => {}
    }
}

fn print_banner(session: &Session) {
    let scenario = session.scenario();
    println!(
        "== {} {} | {} | you are talking to: {} ==",
        scenario.icon, scenario.title, scenario.difficulty, scenario.role
    );
    println!("(/help for commands)");
    for turn in session.transcript().turns() {
        println!("{}", render::render_turn(turn, scenario.role));
    }
}

fn print_scenarios(session: &Session) {
    for category in [ScenarioCategory::Roleplay, ScenarioCategory::Simulation] {
        println!("{}", category.label());
        for scenario in scenarios::by_category(category) {
            let active = scenario.id == session.scenario().id;
            println!("  {}", render::render_scenario(scenario, active));
        }
    }
}

fn print_corrections(session: &Session) {
    let ledger = session.ledger();
    println!("Session Errors: {}", ledger.len());
    for (index, record) in ledger.newest_first().enumerate() {
        println!("{}", render::render_ledger_entry(index + 1, record));
    }
}

fn print_transcript(session: &Session) {
    let role = session.scenario().role;
    for turn in session.transcript().turns() {
        println!("{}", render::render_turn(turn, role));
    }
    let in_flight = session.chats_in_flight();
    if in_flight > 0 {
        println!("({role} is typing... {in_flight} pending)");
    }
    if session.is_analyzing() {
        println!("(analysis in progress)");
    }
}

#[cfg(test)]
mod tests {
    use fluency_core::scenarios;

    use super::*;
    use crate::gemini::TutorError;

    struct Silent;

    impl TextGenerator for Silent {
        async fn generate(&self, _prompt: &str) -> Result<Option<String>, TutorError> {
            Ok(None)
        }
    }

    fn controller(voice_supported: bool) -> Controller<Silent> {
        Controller::new(Session::new(scenarios::default_scenario(), voice_supported), Silent)
    }

    #[test]
    fn dictated_line_fills_the_draft() {
        let mut controller = controller(true);
        handle_line(&mut controller, "/voice");
        assert_eq!(controller.session().voice_state(), VoiceState::Listening);

        assert_eq!(handle_line(&mut controller, "  A flat white please "), Flow::Continue);
        assert_eq!(controller.session().draft(), "A flat white please");
        assert_eq!(controller.session().voice_state(), VoiceState::Idle);
        assert_eq!(controller.session().transcript().len(), 1);
    }

    #[test]
    fn blank_line_keeps_listening() {
        let mut controller = controller(true);
        handle_line(&mut controller, "/voice");

        assert_eq!(handle_line(&mut controller, "   "), Flow::Continue);
        assert_eq!(controller.session().voice_state(), VoiceState::Listening);
        assert_eq!(controller.session().draft(), "");
    }

    #[test]
    fn commands_still_work_while_listening() {
        let mut controller = controller(true);
        handle_line(&mut controller, "/voice");

        handle_line(&mut controller, "/scenario train_sim");
        assert_eq!(controller.session().scenario().id, "train_sim");
        assert_eq!(handle_line(&mut controller, "/quit"), Flow::Quit);
        assert_eq!(controller.session().draft(), "");
    }

    #[test]
    fn voice_toggle_is_refused_when_unsupported() {
        let mut controller = controller(false);
        assert_eq!(handle_line(&mut controller, "/voice"), Flow::Continue);
        assert_eq!(controller.session().voice_state(), VoiceState::Unsupported);
    }
}
