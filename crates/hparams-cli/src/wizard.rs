//! # Interactive Hyperparameters
//!
//! [`ParamsWizard`] walks the fields of a blueprint in name order and asks
//! for a value for each one the set does not hold yet:
//!
//! - a typed field reads a scalar of the declared kind, re-asking until the
//!   input parses;
//! - a literal field has one valid value and is filled in without asking;
//! - a class field picks a class by index, then offers the class's
//!   defaulted constructor parameters for override.
//!
//! Overrides are answered as sibling fields, which is where nested defaults
//! are read from. An empty line skips a field or ends the override loop.
//! End of input before the walk is over is an error.

use std::io::{self, BufRead, Stdout, Write};

use hparams_core::{ClassRef, Scalar, ScalarKind, Value};
use hparams_schema::Constraint;
use hparams_set::HyperParameters;

/// Terminal wizard over any line reader and writer.
pub struct ParamsWizard<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ParamsWizard<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Ask for every declared field `params` does not hold yet.
    ///
    /// Answers come back in the order they were given, a class's overrides
    /// directly after the class.
    pub fn run(&mut self, params: &HyperParameters) -> io::Result<Vec<(String, Value)>> {
        let blueprint = params.blueprint().read().clone();
        let mut answers = Vec::new();
        for (name, constraint) in blueprint.fields() {
            if params.contains(name) {
                continue;
            }
            writeln!(self.output, ">>> Choose {name} <<<")?;
            match constraint {
                Constraint::ScalarValue(literal) => {
                    writeln!(self.output, "{name} = {literal}")?;
                    answers.push((name.to_string(), Value::Scalar(literal.clone())));
                }
                Constraint::ScalarType(kind) => {
                    if let Some(scalar) = self.ask_scalar(*kind, None)? {
                        answers.push((name.to_string(), Value::Scalar(scalar)));
                    }
                }
                Constraint::ClassSet(classes) => {
                    if let Some(class) = self.pick_class(classes)? {
                        let overrides = self.override_defaults(&class)?;
                        answers.push((name.to_string(), Value::Class(class)));
                        answers.extend(overrides);
                    }
                }
            }
        }
        Ok(answers)
    }

    fn read_line(&mut self) -> io::Result<String> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended before every field was answered",
            ));
        }
        Ok(line.trim().to_string())
    }

    fn ask_scalar(&mut self, kind: ScalarKind, default: Option<&Scalar>) -> io::Result<Option<Scalar>> {
        match default {
            Some(default) => write!(self.output, "Enter a value of type {kind} [default: {default}]: ")?,
            None => write!(self.output, "Enter a value of type {kind}: ")?,
        }
        loop {
            let line = self.read_line()?;
            if line.is_empty() {
                return Ok(None);
            }
            match Scalar::parse(kind, &line) {
                Some(scalar) => return Ok(Some(scalar)),
                None => write!(self.output, "Please enter a value of type {kind}: ")?,
            }
        }
    }

    fn pick_class(&mut self, classes: &[ClassRef]) -> io::Result<Option<ClassRef>> {
        for (index, class) in classes.iter().enumerate() {
            writeln!(self.output, "  {index}: {} ({})", class.qualifier(), class.summary())?;
        }
        write!(self.output, "Pick an index: ")?;
        loop {
            let line = self.read_line()?;
            if line.is_empty() {
                return Ok(None);
            }
            match line.parse::<usize>().ok().and_then(|index| classes.get(index)) {
                Some(class) => return Ok(Some(class.clone())),
                None => write!(self.output, "Please pick an index below {}: ", classes.len())?,
            }
        }
    }

    fn override_defaults(&mut self, class: &ClassRef) -> io::Result<Vec<(String, Value)>> {
        let defaulted: Vec<(&str, &Scalar)> = class
            .parameters()
            .iter()
            .filter_map(|p| p.default.as_ref().map(|d| (p.name.as_str(), d)))
            .collect();
        if defaulted.is_empty() {
            return Ok(Vec::new());
        }
        writeln!(self.output, "Parameters of {}:", class.name())?;
        for (index, (name, default)) in defaulted.iter().enumerate() {
            writeln!(self.output, "  {index}: {name} [default: {default}]")?;
        }

        let mut overrides: Vec<(String, Value)> = Vec::new();
        loop {
            write!(self.output, "Parameter to override (index), or ENTER to continue: ")?;
            let line = self.read_line()?;
            if line.is_empty() {
                break;
            }
            let Some(&(name, default)) = line.parse::<usize>().ok().and_then(|i| defaulted.get(i)) else {
                writeln!(self.output, "Not a parameter index: {line}")?;
                continue;
            };
            if let Some(scalar) = self.ask_scalar(default.kind(), Some(default))? {
                overrides.retain(|(n, _)| n != name);
                overrides.push((name.to_string(), Value::Scalar(scalar)));
            }
        }
        Ok(overrides)
    }
}

impl ParamsWizard<io::StdinLock<'static>, Stdout> {
    /// Prompt on the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use hparams_core::{ClassDescriptor, ClassRegistry, Parameter};
    use hparams_schema::{Blueprint, FieldInput};
    use hparams_set::{share, SharedBlueprint};

    fn blueprint() -> (SharedBlueprint, ClassRef) {
        let mut reg = ClassRegistry::new();
        let sgd = reg
            .register(
                ClassDescriptor::new("torch.optim.sgd", "SGD")
                    .with_doc("Stochastic gradient descent.")
                    .with_params([
                        Parameter::required("params"),
                        Parameter::optional("lr", 0.01),
                        Parameter::optional("nesterov", false),
                    ]),
            )
            .unwrap();
        let reg = Arc::new(reg);
        let blueprint = Blueprint::build(
            "train",
            reg,
            vec![
                ("epochs", FieldInput::of_type(ScalarKind::Int)),
                ("mode", FieldInput::literal("train")),
                ("optimizer", FieldInput::classes([sgd.clone()])),
            ],
        )
        .unwrap();
        (share(blueprint), sgd)
    }

    fn run(params: &HyperParameters, input: &str) -> (io::Result<Vec<(String, Value)>>, String) {
        let mut wizard = ParamsWizard::new(Cursor::new(input.as_bytes().to_vec()), Vec::<u8>::new());
        let answers = wizard.run(params);
        let (_, output) = wizard.into_inner();
        (answers, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_walks_every_field_and_collects_overrides() {
        let (shared, sgd) = blueprint();
        let params = HyperParameters::new("run", shared);
        let (answers, output) = run(&params, "ten\n12\n3\n0\n0\nfast\n0.1\n1\ntrue\n\n");
        assert_eq!(
            answers.unwrap(),
            vec![
                ("epochs".to_string(), Value::from(12)),
                ("mode".to_string(), Value::from("train")),
                ("optimizer".to_string(), Value::from(sgd)),
                ("lr".to_string(), Value::from(0.1)),
                ("nesterov".to_string(), Value::from(true)),
            ]
        );
        assert!(output.contains(">>> Choose epochs <<<"));
        assert!(output.contains("Please enter a value of type int"));
        assert!(output.contains("mode = \"train\""));
        assert!(output.contains("  0: torch.optim.sgd.SGD (Stochastic gradient descent.)"));
        assert!(output.contains("Please pick an index below 1"));
        assert!(output.contains("  0: lr [default: 0.01]"));
        assert!(output.contains("Please enter a value of type float"));
    }

    #[test]
    fn test_skips_fields_already_set_and_empty_answers() {
        let (shared, _) = blueprint();
        let mut params = HyperParameters::new("run", shared);
        params.set_field("epochs", 5).unwrap();
        params.set_field("mode", "train").unwrap();
        let (answers, output) = run(&params, "\n");
        assert!(answers.unwrap().is_empty());
        assert!(!output.contains("Choose epochs"));
        assert!(output.contains(">>> Choose optimizer <<<"));
    }

    #[test]
    fn test_repeated_override_keeps_last_answer() {
        let (shared, _) = blueprint();
        let mut params = HyperParameters::new("run", shared);
        params.set_field("epochs", 5).unwrap();
        let (answers, output) = run(&params, "0\n7\n0\n0.2\n0\n0.3\n\n");
        let answers = answers.unwrap();
        assert_eq!(answers.iter().filter(|(n, _)| n == "lr").count(), 1);
        assert_eq!(answers.last(), Some(&("lr".to_string(), Value::from(0.3))));
        assert!(output.contains("Not a parameter index: 7"));
    }

    #[test]
    fn test_end_of_input_is_an_error() {
        let (shared, _) = blueprint();
        let params = HyperParameters::new("run", shared);
        let (answers, _) = run(&params, "3\n");
        assert_eq!(answers.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }
}
