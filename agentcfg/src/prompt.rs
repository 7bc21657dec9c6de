use std::io::{self, BufRead, StdinLock, Stdout, Write};

use anyhow::{bail, Result};

/// Interactive prompt engine for the wizard
///
/// Renders a question, optionally with a numbered menu of valid answers, and
/// blocks on one line of input at a time. The reader and writer are generic
/// so tests can script input and capture output without a terminal.
pub struct Prompter<R, W> {
  reader: R,
  writer: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
  /// Prompter attached to the process stdin/stdout
  pub fn new() -> Self {
    Self {
      reader: io::stdin().lock(),
      writer: io::stdout(),
    }
  }
}

impl Default for Prompter<StdinLock<'static>, Stdout> {
  fn default() -> Self {
    Self::new()
  }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
  pub fn with_io(reader: R, writer: W) -> Self {
    Self { reader, writer }
  }

  /// One line from the operator, with the trailing newline removed
  ///
  /// A closed input stream is an error: the wizard cannot continue without
  /// an answer, so the caller gets to abort instead of spinning on EOF
  fn read_answer(&mut self) -> Result<String> {
    let mut line = String::new();
    if self.reader.read_line(&mut line)? == 0 {
      bail!("Input stream closed while waiting for an answer");
    }
    if line.ends_with('\n') {
      line.pop();
      if line.ends_with('\r') {
        line.pop();
      }
    }
    Ok(line)
  }

  /// Ask a question until one of `valid_values` is selected
  ///
  /// With a non-empty `valid_values`, the entries are displayed as a 1-based
  /// numbered menu and the answer is the entry whose number the operator
  /// typed; an empty line selects `default_option`. Invalid input re-prompts
  /// until a valid selection is made. With an empty `valid_values`, the
  /// question alone is displayed and the first line read is returned as-is,
  /// including the empty string.
  ///
  /// `default_option` starts from 1; 0 means no default (an empty line is
  /// then rejected like any other invalid input)
  pub fn choice(&mut self, question: &str, default_option: usize, valid_values: &[&str]) -> Result<String> {
    if !valid_values.is_empty() && default_option > valid_values.len() {
      bail!(
        "Default option {default_option} is out of range for {} valid values",
        valid_values.len()
      );
    }

    loop {
      if valid_values.is_empty() {
        write!(self.writer, "{question}\n\r")?;
      } else {
        let mut options = String::new();
        for (i, value) in valid_values.iter().enumerate() {
          options.push_str(&format!("{}. {value}\n", i + 1));
        }
        write!(self.writer, "{question}\n{options}default choice: [{default_option}]:\n\r")?;
      }
      self.writer.flush()?;

      let answer = self.read_answer()?;
      if valid_values.is_empty() {
        return Ok(answer);
      }

      let option = match answer.is_empty() {
        true => Some(default_option),
        false => answer.parse::<usize>().ok(),
      };
      match option {
        Some(option) if (1..=valid_values.len()).contains(&option) => {
          return Ok(valid_values[option - 1].to_string())
        }
        _ => {
          write!(
            self.writer,
            "The value {answer} is not valid to this question.\nPlease retry to answer:\n"
          )?;
          self.writer.flush()?;
        }
      }
    }
  }

  /// Yes/no question defaulting to "yes" on an empty line
  pub fn yes(&mut self, question: &str) -> Result<bool> {
    let answer = self.choice(question, 1, &["yes", "no"])?;
    Ok(answer == "yes")
  }

  /// Yes/no question defaulting to "no" on an empty line
  ///
  /// Like [`yes`](Self::yes) this reports whether the operator answered
  /// "yes"; only the default differs. Callers branching on the return value
  /// should read it as "explicitly confirmed"
  pub fn no(&mut self, question: &str) -> Result<bool> {
    let answer = self.choice(question, 2, &["yes", "no"])?;
    Ok(answer == "yes")
  }

  /// Free-text question, returning the raw input line
  pub fn ask(&mut self, question: &str) -> Result<String> {
    self.choice(question, 0, &[])
  }

  /// Free-text question returning `default_value` on an empty line
  ///
  /// Single-shot: any non-empty input is accepted verbatim, no validation
  pub fn ask_with_default(&mut self, question: &str, default_value: &str) -> Result<String> {
    write!(self.writer, "{question}\ndefault choice: [{default_value}]\n\r")?;
    self.writer.flush()?;

    let answer = self.read_answer()?;
    match answer.is_empty() {
      true => Ok(default_value.to_string()),
      false => Ok(answer),
    }
  }

  /// Hold the terminal open until the operator acknowledges
  ///
  /// A closed input stream is tolerated here - the process is exiting anyway
  pub fn enter_to_exit(&mut self) -> Result<()> {
    writeln!(self.writer, "Please press Enter to exit...")?;
    self.writer.flush()?;
    let _ = self.read_answer();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use rstest::*;

  use super::*;

  fn scripted(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
    Prompter::with_io(Cursor::new(input.as_bytes().to_vec()), Vec::new())
  }

  fn output<R>(prompter: &Prompter<R, Vec<u8>>) -> String {
    String::from_utf8(prompter.writer.clone()).unwrap()
  }

  #[test]
  fn it_returns_the_default_on_empty_input() {
    let mut prompter = scripted("\n");
    let answer = prompter.choice("Keep the defaults?", 2, &["yes", "no"]).unwrap();
    assert_eq!(answer, "no");
  }

  #[rstest]
  #[case("1\n", "alpha")]
  #[case("2\n", "beta")]
  #[case("3\n", "gamma")]
  fn it_translates_menu_indices(#[case] input: &str, #[case] expected: &str) {
    let mut prompter = scripted(input);
    let answer = prompter.choice("Pick one", 1, &["alpha", "beta", "gamma"]).unwrap();
    assert_eq!(answer, expected);
  }

  #[test]
  fn it_retries_until_a_valid_selection() {
    let mut prompter = scripted("abc\n0\n99\n2\n");
    let answer = prompter.choice("Continue?", 1, &["yes", "no"]).unwrap();
    assert_eq!(answer, "no");

    let rejections = output(&prompter)
      .matches("is not valid to this question")
      .count();
    assert_eq!(rejections, 3);
  }

  #[test]
  fn it_names_the_rejected_input() {
    let mut prompter = scripted("abc\n1\n");
    prompter.choice("Continue?", 1, &["yes", "no"]).unwrap();
    assert!(output(&prompter).contains("The value abc is not valid to this question.\nPlease retry to answer:\n"));
  }

  #[test]
  fn it_renders_the_menu_exactly() {
    let mut prompter = scripted("1\n");
    prompter.choice("Do you want to continue?", 1, &["yes", "no"]).unwrap();
    assert_eq!(
      output(&prompter),
      "Do you want to continue?\n1. yes\n2. no\ndefault choice: [1]:\n\r"
    );
  }

  #[test]
  fn it_renders_a_bare_question_in_free_text_mode() {
    let mut prompter = scripted("anything\n");
    prompter.ask("What is the instance name?").unwrap();
    assert_eq!(output(&prompter), "What is the instance name?\n\r");
  }

  #[test]
  fn it_passes_free_text_through_unchanged() {
    let mut prompter = scripted("  spaced answer \n");
    let answer = prompter.ask("Say something").unwrap();
    assert_eq!(answer, "  spaced answer ");
  }

  #[test]
  fn it_returns_the_empty_string_in_free_text_mode() {
    let mut prompter = scripted("\n");
    let answer = prompter.ask("Say something").unwrap();
    assert_eq!(answer, "");
  }

  #[test]
  fn it_rejects_an_out_of_range_default() {
    let mut prompter = scripted("1\n");
    let result = prompter.choice("Pick one", 3, &["yes", "no"]);
    assert!(result.is_err());
  }

  #[test]
  fn it_rejects_empty_input_when_no_default_is_set() {
    // default_option 0 with a menu means the operator must pick explicitly
    let mut prompter = scripted("\n1\n");
    let answer = prompter.choice("Pick one", 0, &["alpha", "beta"]).unwrap();
    assert_eq!(answer, "alpha");
    assert!(output(&prompter).contains("is not valid to this question"));
  }

  #[test]
  fn it_errors_when_the_input_stream_is_closed() {
    let mut prompter = scripted("");
    let result = prompter.ask("Anyone there?");
    assert!(result.is_err());
  }

  #[test]
  fn it_strips_carriage_returns_from_answers() {
    let mut prompter = scripted("2\r\n");
    let answer = prompter.choice("Continue?", 1, &["yes", "no"]).unwrap();
    assert_eq!(answer, "no");
  }

  #[rstest]
  #[case("\n", true)]
  #[case("1\n", true)]
  #[case("2\n", false)]
  fn it_defaults_yes_to_yes(#[case] input: &str, #[case] expected: bool) {
    let mut prompter = scripted(input);
    assert_eq!(prompter.yes("Proceed?").unwrap(), expected);
  }

  #[rstest]
  #[case("\n", false)]
  #[case("1\n", true)]
  #[case("2\n", false)]
  fn it_defaults_no_to_no(#[case] input: &str, #[case] expected: bool) {
    let mut prompter = scripted(input);
    assert_eq!(prompter.no("Proceed?").unwrap(), expected);
  }

  #[test]
  fn it_falls_back_to_the_default_answer() {
    let mut prompter = scripted("\n");
    let answer = prompter.ask_with_default("Which region?", "us-east-1").unwrap();
    assert_eq!(answer, "us-east-1");
  }

  #[test]
  fn it_accepts_any_non_empty_answer_verbatim() {
    let mut prompter = scripted("custom \n");
    let answer = prompter.ask_with_default("Which region?", "us-east-1").unwrap();
    assert_eq!(answer, "custom ");
  }

  #[test]
  fn it_renders_the_default_annotation_without_a_colon() {
    let mut prompter = scripted("\n");
    prompter.ask_with_default("Which region?", "us-east-1").unwrap();
    assert_eq!(output(&prompter), "Which region?\ndefault choice: [us-east-1]\n\r");
  }

  #[test]
  fn it_tolerates_eof_on_exit() {
    let mut prompter = scripted("");
    prompter.enter_to_exit().unwrap();
    assert_eq!(output(&prompter), "Please press Enter to exit...\n");
  }
}
