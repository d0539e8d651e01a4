/// Response parsing
///
/// Splits a completion into its labelled sections. Anything before the first
/// label is ignored; a response with no labels at all becomes the explanation.

use crate::ai::prompts::Action;
use serde::Serialize;

const SECTIONS: &[&str] = &[
    "EXPLANATION:",
    "COMMAND:",
    "ALTERNATIVES:",
    "SAFETY:",
    "BREAKDOWN:",
    "BEHAVIOR:",
];

/// Structured answer from the assistant
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Advice {
    pub explanation: String,
    pub command: Option<String>,
    pub alternatives: Option<String>,
    pub safety: Option<String>,
    pub breakdown: Option<String>,
    pub behavior: Option<String>,
    pub raw: String,
}

impl Advice {
    /// Parse a raw completion
    pub fn parse(raw: &str) -> Self {
        let mut advice = Advice {
            raw: raw.to_string(),
            ..Default::default()
        };

        let mut current: Option<&str> = None;
        let mut content: Vec<&str> = Vec::new();

        for line in raw.lines() {
            let line = line.trim();

            match SECTIONS.iter().copied().find(|label| line.starts_with(label)) {
                Some(label) => {
                    if let Some(prev) = current {
                        advice.set_section(prev, &content);
                    }
                    current = Some(label);
                    content = vec![line[label.len()..].trim()];
                }
                None if current.is_some() => content.push(line),
                None => {}
            }
        }

        match current {
            Some(prev) => advice.set_section(prev, &content),
            None => advice.explanation = raw.trim().to_string(),
        }

        advice
    }

    fn set_section(&mut self, label: &str, lines: &[&str]) {
        let text = lines.join("\n").trim().to_string();
        let value = if text.is_empty() { None } else { Some(text) };

        match label {
            "EXPLANATION:" => self.explanation = value.unwrap_or_default(),
            "COMMAND:" => {
                self.command = value
                    .map(|c| strip_code_fence(&c))
                    .filter(|c| !c.is_empty())
            }
            "ALTERNATIVES:" => self.alternatives = value,
            "SAFETY:" => self.safety = value,
            "BREAKDOWN:" => self.breakdown = value,
            "BEHAVIOR:" => self.behavior = value,
            _ => {}
        }
    }

    /// Labelled sections worth printing for an action, in display order
    pub fn sections_for(&self, action: Action) -> Vec<(&'static str, &str)> {
        let candidates: Vec<(&'static str, &Option<String>)> = match action {
            Action::Explain => vec![
                ("Breakdown", &self.breakdown),
                ("Behavior", &self.behavior),
                ("Safety", &self.safety),
            ],
            Action::Suggest => vec![
                ("Alternatives", &self.alternatives),
                ("Safety", &self.safety),
            ],
            Action::Fix => vec![("Safety", &self.safety)],
            Action::Ask => vec![],
        };

        candidates
            .into_iter()
            .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
            .collect()
    }
}

/// Strip markdown fences or inline backticks around a command
pub fn strip_code_fence(command: &str) -> String {
    let command = command.trim();

    if command.starts_with("```") && command.ends_with("```") && command.len() >= 6 {
        let lines: Vec<&str> = command.lines().collect();
        if lines.len() > 2 {
            return lines[1..lines.len() - 1].join("\n").trim().to_string();
        }
        return command.replace("```", "").trim().to_string();
    }

    if command.len() >= 2 && command.starts_with('`') && command.ends_with('`') {
        let inner = &command[1..command.len() - 1];
        if !inner.contains('`') {
            return inner.trim().to_string();
        }
    }

    command.to_string()
}
