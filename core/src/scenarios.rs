use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioCategory {
    /// Short single-role conversation
    Roleplay,
    /// Multi-stage journey with scene transitions
    Simulation,
}

impl ScenarioCategory {
    pub fn label(self) -> &'static str {
        match self {
            ScenarioCategory::Roleplay => "Quick Roleplay",
            ScenarioCategory::Simulation => "Immersive Sims",
        }
    }
}

/// A configured conversation context. Immutable; lives for the whole program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioDefinition {
    pub id: &'static str,
    pub category: ScenarioCategory,
    pub title: &'static str,
    /// Name the model speaks as; also the speaker label for its turns in prompts.
    pub role: &'static str,
    pub icon: &'static str,
    pub difficulty: &'static str,
    pub description: &'static str,
    /// Behavioral contract for the model, including the correction block format.
    pub instruction_text: &'static str,
    /// First assistant turn of a fresh session.
    pub intro_message: &'static str,
}

static SCENARIOS: [ScenarioDefinition; 5] = [
    ScenarioDefinition {
        id: "coffee_shop",
        category: ScenarioCategory::Roleplay,
        title: "The Coffee Shop",
        role: "Barista",
        icon: "☕",
        difficulty: "Beginner",
        description: "Order a drink and a snack.",
        instruction_text: "You are a friendly barista at a busy coffee shop in London. Keep your responses short (1-2 sentences). If the user makes a grammar mistake, YOU MUST output a special block: 'Correction: [Correct Sentence] | Reason: [Brief explanation of error] | Example: [A similar correct sentence]'. Then, on a new line, reply naturally to the roleplay.",
        intro_message: "Hi there! Welcome to the cafe. What can I get started for you today?",
    },
    ScenarioDefinition {
        id: "job_interview",
        category: ScenarioCategory::Roleplay,
        title: "Job Interview",
        role: "Hiring Manager",
        icon: "💼",
        difficulty: "Advanced",
        description: "Answer questions about your experience.",
        instruction_text: "You are a professional hiring manager. Be polite but formal. If the user makes a grammar mistake, YOU MUST output a special block: 'Correction: [Correct Sentence] | Reason: [Brief explanation] | Example: [A similar correct sentence]'. Then, on a new line, ask the next interview question.",
        intro_message: "Good morning. Thank you for coming in. Tell me a little bit about yourself.",
    },
    ScenarioDefinition {
        id: "new_friend",
        category: ScenarioCategory::Roleplay,
        title: "Meeting a Friend",
        role: "New Friend",
        icon: "👋",
        difficulty: "Intermediate",
        description: "Casual conversation at a park.",
        instruction_text: "You are a new friend meeting the user at a park. Be casual. If the user makes a grammar mistake, YOU MUST output a special block: 'Correction: [Correct Sentence] | Reason: [Brief explanation] | Example: [A similar correct sentence]'. Then, on a new line, reply naturally.",
        intro_message: "Hey! Nice to meet you. I love this park, do you come here often?",
    },
    ScenarioDefinition {
        id: "airport_sim",
        category: ScenarioCategory::Simulation,
        title: "Full Airport Journey",
        role: "Airport Staff (Multiple)",
        icon: "✈",
        difficulty: "Intermediate",
        description: "Check-in -> Security -> Boarding -> Flight.",
        instruction_text: "You are the narrator and various staff members of an airport simulation. Guide the user through these 4 distinct stages. Start at Stage 1. \n\nStage 1: Check-in Desk. Act as the agent asking for passport and bags.\nStage 2: Security Check. Act as the officer asking to empty pockets/remove shoes.\nStage 3: Gate Boarding. Act as the gate agent calling group numbers.\nStage 4: In-Flight. Act as the flight attendant offering meals.\n\nOnly move to the next stage when the user successfully completes the interaction. Signal the transition by writing '*Scene: [New Location]*' in bold. If the user makes a grammar mistake, YOU MUST output a special block: 'Correction: [Correct Sentence] | Reason: [Brief explanation] | Example: [Example]'. Then reply as the character.",
        intro_message: "Welcome to Heathrow Airport! *Scene: Check-in Desk*. \n\nGood morning. Where are you flying to today, and may I see your passport?",
    },
    ScenarioDefinition {
        id: "train_sim",
        category: ScenarioCategory::Simulation,
        title: "Train Adventure",
        role: "Station Master",
        icon: "TR",
        difficulty: "Beginner",
        description: "Ticket Window -> Platform -> Onboard.",
        instruction_text: "You are guiding the user through a train journey. \n\nStage 1: Ticket Window. Act as the seller. Ask destination and class (First/Second).\nStage 2: Finding the Platform. Act as a helper/conductor directing them.\nStage 3: Onboard. Act as the ticket inspector checking tickets.\n\nMove through stages naturally. Signal transitions with '*Scene: [New Location]*'. If the user makes a grammar mistake, YOU MUST output a special block: 'Correction: [Correct Sentence] | Reason: [Brief explanation] | Example: [Example]'.",
        intro_message: "Welcome to Grand Central Station. *Scene: Ticket Window*. \n\nHello! How can I help you? Where are you planning to travel today?",
    },
];

pub fn all() -> &'static [ScenarioDefinition] {
    &SCENARIOS
}

pub fn by_category(category: ScenarioCategory) -> impl Iterator<Item = &'static ScenarioDefinition> {
    SCENARIOS.iter().filter(move |s| s.category == category)
}

pub fn find(id: &str) -> Result<&'static ScenarioDefinition, Error> {
    SCENARIOS
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| Error::UnknownScenario(id.to_string()))
}

/// The scenario a fresh session starts in.
pub fn default_scenario() -> &'static ScenarioDefinition {
    &SCENARIOS[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CORRECTION_MARKER;

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = all().iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }

    #[test]
    fn every_instruction_mandates_the_correction_block() {
        for scenario in all() {
            assert!(
                scenario.instruction_text.contains(CORRECTION_MARKER),
                "{} does not mention the marker",
                scenario.id
            );
            assert!(scenario.instruction_text.contains("Reason:"));
            assert!(scenario.instruction_text.contains("Example:"));
        }
    }

    #[test]
    fn categories_split_the_catalog() {
        assert_eq!(by_category(ScenarioCategory::Roleplay).count(), 3);
        assert_eq!(by_category(ScenarioCategory::Simulation).count(), 2);
    }

    #[test]
    fn default_is_the_first_roleplay() {
        let first = by_category(ScenarioCategory::Roleplay).next().unwrap();
        assert_eq!(default_scenario(), first);
        assert_eq!(default_scenario().id, "coffee_shop");
    }

    #[test]
    fn find_rejects_unknown_ids() {
        assert_eq!(find("train_sim").unwrap().role, "Station Master");
        let err = find("moon_base").unwrap_err();
        assert!(matches!(err, Error::UnknownScenario(id) if id == "moon_base"));
    }
}
