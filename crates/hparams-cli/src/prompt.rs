//! # Interactive Curation
//!
//! [`PromptCurator`] lists a catalog on a terminal and asks which entries to
//! ignore. Indices are entered comma-separated, over as many lines as
//! needed; `x` or end of input finishes. Everything not ignored is retained.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io::{self, BufRead, Stdout, Write};

use hparams_core::{Candidate, Curator};

/// Terminal curator over any line reader and writer.
pub struct PromptCurator<R, W> {
    io: RefCell<(R, W)>,
}

impl<R: BufRead, W: Write> PromptCurator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: RefCell::new((input, output)),
        }
    }

    /// Give back the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        self.io.into_inner()
    }

    fn prompt(&self, namespace: &str, candidates: &[Candidate]) -> io::Result<BTreeSet<usize>> {
        let mut streams = self.io.borrow_mut();
        let (input, output) = &mut *streams;

        writeln!(output, "Catalog {namespace}:")?;
        for candidate in candidates {
            writeln!(output, "  {candidate}")?;
        }

        let mut ignored = BTreeSet::new();
        loop {
            write!(output, "Indices to ignore (comma-separated, 'x' to finish): ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();
            if line.eq_ignore_ascii_case("x") {
                break;
            }
            for token in line.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                match token.parse::<usize>() {
                    Ok(index) if index < candidates.len() => {
                        ignored.insert(index);
                    }
                    Ok(index) => writeln!(output, "Could not remove index {index}")?,
                    Err(_) => writeln!(output, "Not an index: {token}")?,
                }
            }
        }
        Ok(ignored)
    }
}

impl PromptCurator<io::StdinLock<'static>, Stdout> {
    /// Prompt on the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Curator for PromptCurator<R, W> {
    fn curate(&self, namespace: &str, candidates: &[Candidate]) -> Vec<usize> {
        let ignored = match self.prompt(namespace, candidates) {
            Ok(ignored) => ignored,
            Err(e) => {
                tracing::warn!(namespace, error = %e, "prompt failed, keeping the whole catalog");
                BTreeSet::new()
            }
        };
        candidates
            .iter()
            .map(|c| c.index)
            .filter(|i| !ignored.contains(i))
            .collect()
    }
}
