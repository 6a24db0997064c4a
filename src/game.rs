//! Adventure turn state
//!
//! The client round-trips the full story history on every call; this module
//! validates that history, replays it as a chat conversation, and enforces
//! the structured reply contract and the server-side turn cap.

use crate::models::Message;
use crate::{prompts, Error, Result};
use serde::{Deserialize, Serialize};

/// Three parallel ordered sequences of past turns, owned by the caller.
///
/// `scenarios` and `questions` always have equal length; `choices` lags by
/// the answer the player has not given yet.
#[derive(Debug, Clone)]
pub struct History {
    pub scenarios: Vec<String>,
    pub questions: Vec<String>,
    pub choices: Vec<String>,
}

impl History {
    pub fn from_parts(
        scenarios: Vec<String>,
        questions: Vec<String>,
        choices: Vec<String>,
    ) -> Result<Self> {
        if scenarios.len() != questions.len() {
            return Err(Error::InvalidRequest(format!(
                "History length mismatch: {} scenarios but {} questions",
                scenarios.len(),
                questions.len()
            )));
        }
        if choices.len() > scenarios.len() {
            return Err(Error::InvalidRequest(format!(
                "History has {} choices for {} scenarios",
                choices.len(),
                scenarios.len()
            )));
        }

        Ok(Self {
            scenarios,
            questions,
            choices,
        })
    }

    /// Record the player's latest answer.
    pub fn record_choice(&mut self, choice: String) {
        self.choices.push(choice);
    }

    pub fn completed_turns(&self) -> usize {
        self.scenarios.len()
    }

    /// Reject histories past the configured bound before replaying them.
    pub fn check_capacity(&self, max_history_turns: usize) -> Result<()> {
        if self.completed_turns() > max_history_turns {
            return Err(Error::InvalidRequest(format!(
                "History of {} turns exceeds the limit of {}",
                self.completed_turns(),
                max_history_turns
            )));
        }
        Ok(())
    }

    /// Reconstruct the full dialogue for the model: the fixed system and
    /// kickoff messages, then each prior turn as two assistant messages
    /// (scenario, question) and one user message (choice), in original
    /// order. When the upcoming turn is the last one permitted, a forced
    /// ending instruction is appended.
    pub fn replay_messages(&self, max_turns: usize) -> Result<Vec<Message>> {
        if self.choices.len() != self.scenarios.len() {
            return Err(Error::InvalidRequest(format!(
                "No choice recorded for turn {}",
                self.choices.len() + 1
            )));
        }

        let kickoff = prompts::render(
            prompts::TURN_KICKOFF,
            &[("max_turns", &max_turns.to_string())],
        );

        let mut messages = Vec::with_capacity(2 + 3 * self.completed_turns() + 1);
        messages.push(Message::system(prompts::TURN_SYSTEM));
        messages.push(Message::user(kickoff));

        for i in 0..self.completed_turns() {
            messages.push(Message::assistant(self.scenarios[i].clone()));
            messages.push(Message::assistant(self.questions[i].clone()));
            messages.push(Message::user(self.choices[i].clone()));
        }

        if self.completed_turns() + 1 >= max_turns {
            messages.push(Message::user(prompts::FINAL_TURN));
        }

        Ok(messages)
    }

    /// Fold the model's reply into the history. Once the story reaches
    /// `max_turns` scenarios the question and choices are cleared regardless
    /// of what the model produced, so termination does not depend on model
    /// compliance.
    pub fn finish_turn(&mut self, mut reply: TurnReply, max_turns: usize) -> TurnReply {
        if self.completed_turns() + 1 >= max_turns {
            reply.question.clear();
            reply.choices.clear();
        }

        self.scenarios.push(reply.scenario.clone());
        self.questions.push(reply.question.clone());
        reply
    }
}

/// Structured turn reply the model is contracted to emit.
///
/// All three keys must be present; `question` and `choices` are empty only
/// on a terminal turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReply {
    pub scenario: String,
    pub question: String,
    pub choices: Vec<String>,
}

impl TurnReply {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| {
            tracing::error!("Model reply violated the turn contract: {}\nBody: {}", e, raw);
            Error::Schema(format!("Model reply does not match the turn contract: {}", e))
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.question.is_empty() && self.choices.is_empty()
    }
}
