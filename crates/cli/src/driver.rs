// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module feeds the input lines to the classifier and writes the result.

use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;
use thiserror::Error;
use warnjuicer_iterator::LogLines;

/// A user provided input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    Path(PathBuf),
}

impl Input {
    pub fn from_string(s: String) -> Input {
        if s == "-" {
            Input::Stdin
        } else {
            Input::Path(s.into())
        }
    }
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Input::Stdin => write!(f, "<stdin>"),
            Input::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}: cannot open", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{input}: read failed")]
    Read {
        input: Input,
        source: std::io::Error,
    },

    #[error("write failed")]
    Write(#[source] std::io::Error),
}

impl Error {
    /// The output was closed by the reader, e.g. when piping to `head`.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Error::Write(e) if e.kind() == ErrorKind::BrokenPipe)
    }
}

/// Classify every line of the reader, returns the number of lines.
#[tracing::instrument(level = "debug", skip(reader, out))]
pub fn filter_reader<R: Read, W: Write>(
    input: &Input,
    reader: R,
    out: &mut W,
) -> Result<usize, Error> {
    let mut lines = LogLines::new(reader);
    for line in lines.by_ref() {
        let (line, _) = line.map_err(|source| Error::Read {
            input: input.clone(),
            source,
        })?;
        let tag = warnjuicer_rules::classify_bytes(&line);
        out.write_all(&tag)
            .and_then(|_| out.write_all(b"\n"))
            .map_err(Error::Write)?;
    }
    Ok(lines.line_count())
}

/// Open the input and classify its lines.
pub fn filter<W: Write>(input: &Input, out: &mut W) -> Result<usize, Error> {
    match input {
        Input::Stdin => filter_reader(input, std::io::stdin().lock(), out),
        Input::Path(path) => {
            tracing::debug!(path = ?path, "Reading file");
            let file = std::fs::File::open(path).map_err(|source| Error::Open {
                path: path.clone(),
                source,
            })?;
            filter_reader(input, file, out)
        }
    }
}

/// Process the inputs in order, returns the total number of lines.
pub fn filter_all<W: Write>(inputs: &[Input], out: &mut W) -> Result<usize, Error> {
    let mut total = 0;
    for input in inputs {
        let count = filter(input, out)?;
        tracing::debug!(%input, count, "Processed");
        total += count;
    }
    Ok(total)
}
