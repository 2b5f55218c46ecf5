//! Interactive consultation loop.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::consultation::{BackNavigation, Consultation, ConsultationState};
use crate::engine::InferenceEngine;
use crate::error::{AppResult, ConsultationError};
use crate::model::Answer;
use crate::trace::text::{render_history, render_outcome, render_trace, Palette};
use crate::trace::Tone;

const PROMPT: &str = "[y]es [n]o [u]nknown   b = back, r = restart, q = quit";
const COMPLETED_PROMPT: &str = "r = restart, q = quit";

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Answer(Answer),
    Back,
    Restart,
    Quit,
}

/// Parse a line of input. `None` for anything unrecognized.
pub fn parse_input(line: &str) -> Option<Input> {
    match line.trim().to_lowercase().as_str() {
        "b" | "back" => Some(Input::Back),
        "r" | "restart" | "reset" => Some(Input::Restart),
        "q" | "quit" | "exit" => Some(Input::Quit),
        other => other.parse::<Answer>().ok().map(Input::Answer),
    }
}

/// Run a consultation until the user quits or input ends.
///
/// Engine failures are reported and the loop keeps going; only I/O errors
/// on the terminal end it early.
pub async fn run_consultation<E, R, W>(
    consultation: &Consultation<E>,
    input: R,
    out: &mut W,
    palette: &Palette,
) -> AppResult<()>
where
    E: InferenceEngine,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    start_session(consultation, out, palette).await?;

    loop {
        let state = consultation.snapshot().await;
        render_screen(&state, out, palette)?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let Some(input) = parse_input(&line) else {
            writeln!(out, "{}", palette.paint("Unrecognized input.", Tone::Warning))?;
            continue;
        };
        debug!(input = ?input, "User input");

        match input {
            Input::Answer(answer) => {
                if let Err(e) = consultation.answer(answer).await {
                    report_error(&e, out, palette)?;
                }
            }
            Input::Back => match consultation.go_back().await {
                BackNavigation::NothingToUndo => {
                    writeln!(out, "Nothing to go back to yet.")?;
                }
                BackNavigation::RestartedFromBeginning => {
                    writeln!(
                        out,
                        "{}",
                        palette.paint(
                            "Going back restarts the consultation from the first question.",
                            Tone::Warning
                        )
                    )?;
                    start_session(consultation, out, palette).await?;
                }
            },
            Input::Restart => {
                consultation.reset().await;
                start_session(consultation, out, palette).await?;
            }
            Input::Quit => break,
        }
    }

    Ok(())
}

async fn start_session<E: InferenceEngine, W: Write>(
    consultation: &Consultation<E>,
    out: &mut W,
    palette: &Palette,
) -> AppResult<()> {
    if let Err(e) = consultation.start().await {
        report_error(&e, out, palette)?;
        writeln!(out, "Enter r to try again.")?;
    }
    Ok(())
}

fn report_error<W: Write>(
    error: &ConsultationError,
    out: &mut W,
    palette: &Palette,
) -> std::io::Result<()> {
    writeln!(out, "{}", palette.paint(&error.to_string(), Tone::Negative))
}

fn render_screen<W: Write>(
    state: &ConsultationState,
    out: &mut W,
    palette: &Palette,
) -> std::io::Result<()> {
    writeln!(out)?;
    write!(out, "{}", render_trace(&state.trace(), palette))?;
    writeln!(out)?;

    if let Some(outcome) = state.outcome() {
        write!(out, "{}", render_outcome(outcome, state.history(), palette))?;
        writeln!(out, "\n{}", palette.paint(COMPLETED_PROMPT, Tone::Muted))?;
        return out.flush();
    }

    if !state.history().is_empty() {
        write!(out, "{}", render_history(state.history(), palette))?;
    }

    if let Some(ctx) = state.detail_context() {
        writeln!(
            out,
            "{}",
            palette.paint(
                &format!(
                    "You were unsure about \"{}\". A few narrower questions follow.",
                    ctx.original_question
                ),
                Tone::Warning
            )
        )?;
    }

    if let Some(question) = state.pending_question() {
        let number = state.history().len() + 1;
        writeln!(out, "\nQ{}: {}", number, palette.paint(question, Tone::Highlight))?;
        writeln!(out, "{}", palette.paint(PROMPT, Tone::Muted))?;
        write!(out, "> ")?;
    }

    out.flush()
}
