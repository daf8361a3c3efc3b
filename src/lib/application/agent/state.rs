use super::models::{AgentOutcome, AgentStep};
use crate::application::analysis::{Reduction, reduce_rows};
use crate::application::tooling::NormalizedResult;
use crate::domain::Intent;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Start,
    AwaitingToolResult,
    Reasoning,
    Done,
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub intent: Intent,
    pub arguments: Value,
    pub result: NormalizedResult,
    pub reduction: Reduction,
}

/// Private to one loop invocation.
#[derive(Debug)]
pub struct LoopState {
    pub round: usize,
    pub phase: LoopPhase,
    pub history: Vec<HistoryEntry>,
    pub original: Intent,
    pub current: Intent,
    answer: Option<String>,
    note: Option<String>,
    complete: bool,
}

impl LoopState {
    pub fn new(intent: Intent) -> Self {
        Self {
            round: 0,
            phase: LoopPhase::Start,
            history: Vec::new(),
            original: intent.clone(),
            current: intent,
            answer: None,
            note: None,
            complete: false,
        }
    }

    pub fn record(&mut self, intent: Intent, arguments: Value, result: NormalizedResult) {
        let reduction = reduce_rows(&intent.instruction, &result.rows());
        self.round += 1;
        self.history.push(HistoryEntry {
            intent,
            arguments,
            result,
            reduction,
        });
    }

    pub fn conclude(&mut self, answer: String) {
        self.answer = Some(answer);
        self.complete = true;
        self.phase = LoopPhase::Done;
    }

    /// Ends the loop with an answer assembled from what was retrieved so far.
    pub fn conclude_partial(&mut self, note: String) {
        self.answer = Some(self.partial_answer());
        self.note = Some(note);
        self.complete = false;
        self.phase = LoopPhase::Done;
    }

    pub fn partial_answer(&self) -> String {
        if self.history.is_empty() {
            return "No data was retrieved.".to_string();
        }
        let mut lines = vec![format!(
            "Partial answer for \"{}\" based on the data retrieved so far:",
            self.original.instruction
        )];
        for entry in &self.history {
            lines.push(format!(
                "- {} ({}): {}",
                entry.intent.entity,
                entry.result.operation,
                entry.reduction.digest()
            ));
        }
        lines.join("\n")
    }

    pub fn steps(&self) -> Vec<AgentStep> {
        self.history
            .iter()
            .enumerate()
            .map(|(i, entry)| AgentStep {
                round: i + 1,
                entity: entry.intent.entity.to_string(),
                instruction: entry.intent.instruction.clone(),
                operation: entry.result.operation.clone(),
                used_fallback: entry.result.used_fallback,
                shape: entry.result.shape,
                arguments: entry.arguments.clone(),
                digest: entry.reduction.digest(),
            })
            .collect()
    }

    pub fn into_outcome(self) -> AgentOutcome {
        let steps = self.steps();
        let answer = match self.answer {
            Some(answer) => answer,
            None => self.partial_answer(),
        };
        AgentOutcome {
            answer,
            complete: self.complete,
            rounds: self.round,
            note: self.note,
            steps,
        }
    }
}
