//! Prompt synthesis.
//!
//! Turns a classified example into the instruction string sent to the model
//! plus the expected answer to score against. Prompts for choice and math
//! formats instruct the model to wrap its answer in the `<<X>>` delimiter;
//! the extractor in `extract.rs` matches the same wrapper, so the two sides
//! must change together.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::model::{Example, QuestionFormat};
use crate::rubric::{self, Requirement};

/// What a correct response must contain, by format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpectedAnswer {
    /// A single choice letter (A-D).
    Label(String),
    /// A numeric answer, kept as the dataset's source string and parsed at
    /// comparison time.
    Number(String),
    /// A conjunction of free-form requirements.
    Rubric(Vec<Requirement>),
}

impl ExpectedAnswer {
    /// Display form for log entries.
    pub fn display(&self) -> String {
        match self {
            ExpectedAnswer::Label(label) => label.clone(),
            ExpectedAnswer::Number(n) => n.clone(),
            ExpectedAnswer::Rubric(reqs) => reqs
                .iter()
                .map(Requirement::describe)
                .collect::<Vec<_>>()
                .join(" AND "),
        }
    }
}

/// The synthesized prompt for one example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedPrompt {
    pub prompt: String,
    pub expected: ExpectedAnswer,
    pub format: QuestionFormat,
    pub choices: Vec<String>,
}

/// Build the prompt and expected answer for one example.
///
/// Pure: calling this twice on the same example yields identical output.
/// Records matching no known format, or matching one but missing the field
/// the expected answer is derived from, fail with
/// [`EvalError::UnsupportedExample`].
pub fn synthesize(example: &Example) -> Result<SynthesizedPrompt, EvalError> {
    let format = QuestionFormat::detect(example).ok_or(EvalError::UnsupportedExample)?;

    match format {
        QuestionFormat::TruthfulQa => {
            let question = example.question().ok_or(EvalError::UnsupportedExample)?;
            let choices = example.choice_list().ok_or(EvalError::UnsupportedExample)?;
            let gold = example.gold_index().ok_or(EvalError::UnsupportedExample)?;
            let expected = index_letter(gold as usize)?;
            Ok(SynthesizedPrompt {
                prompt: choice_prompt(question, &choices),
                expected: ExpectedAnswer::Label(expected.to_string()),
                format,
                choices,
            })
        }
        QuestionFormat::Arc => {
            let question = example.question().ok_or(EvalError::UnsupportedExample)?;
            let mut choices = example
                .choice_text_list()
                .ok_or(EvalError::UnsupportedExample)?;
            choices.truncate(4);
            let key = example.answer_key().ok_or(EvalError::UnsupportedExample)?;
            Ok(SynthesizedPrompt {
                prompt: choice_prompt(question, &choices),
                expected: ExpectedAnswer::Label(key.to_string()),
                format,
                choices,
            })
        }
        QuestionFormat::MathQa => {
            let question = example.question().ok_or(EvalError::UnsupportedExample)?;
            let answer = example.answer_text().ok_or(EvalError::UnsupportedExample)?;
            Ok(SynthesizedPrompt {
                prompt: math_prompt(question),
                expected: ExpectedAnswer::Number(answer),
                format,
                choices: Vec::new(),
            })
        }
        QuestionFormat::MultipleChoice => {
            let question = example.question().ok_or(EvalError::UnsupportedExample)?;
            let choices = example.choice_list().ok_or(EvalError::UnsupportedExample)?;
            let answer = example.answer_index().ok_or(EvalError::UnsupportedExample)?;
            let expected = index_letter(answer as usize)?;
            Ok(SynthesizedPrompt {
                prompt: choice_prompt(question, &choices),
                expected: ExpectedAnswer::Label(expected.to_string()),
                format,
                choices,
            })
        }
        QuestionFormat::FreeForm => {
            let prompt = example
                .prompt_text()
                .ok_or(EvalError::UnsupportedExample)?
                .to_string();
            Ok(SynthesizedPrompt {
                prompt,
                expected: ExpectedAnswer::Rubric(rubric::requirements_for(example)),
                format,
                choices: Vec::new(),
            })
        }
    }
}

/// Zero-based choice index to its letter label (0 -> A).
fn index_letter(index: usize) -> Result<char, EvalError> {
    if index >= 26 {
        return Err(EvalError::UnsupportedExample);
    }
    Ok((b'A' + index as u8) as char)
}

fn choice_prompt(question: &str, choices: &[String]) -> String {
    let mut prompt = String::from(
        "Answer the following multiple choice question. Reply with only the letter \
         of the correct answer wrapped as <<X>>, for example <<A>>.\n\n",
    );
    let _ = write!(prompt, "Question: {question}\nChoices:\n");
    for (i, choice) in choices.iter().enumerate() {
        let label = (b'A' + i as u8) as char;
        let _ = writeln!(prompt, "{label}) {choice}");
    }
    prompt.push_str("Answer:");
    prompt
}

fn math_prompt(question: &str) -> String {
    format!(
        "Solve the following problem. Reply with only the final numeric answer \
         wrapped as <<n>>, for example <<42>>.\n\nQuestion: {question}\nAnswer:"
    )
}
