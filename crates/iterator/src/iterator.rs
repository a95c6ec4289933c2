// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This library provides a LogLines iterator for the [warnjuicer](https://github.com/warnjuicer/warnjuicer) project.
//!
//! The goals of this iterator are:
//!
//! - Work with any Read object, such as stdin or a file.
//! - Constant memory usage by using zero copy [Bytes] slices.
//! - Yield exactly one item per input line, whatever its length or encoding.
//! - Strip the line terminator (`\n` or `\r\n`).
//!
//! Here is an example usage:
//!
//! ```rust
//! use warnjuicer_iterator::LogLines;
//! // Create a test in-memory reader.
//! let reader = std::io::Cursor::new("first\r\nsecond\n\nlast");
//!
//! // Creates the iterator and unwrap error for assert_eq!.
//! let mut lines_iter = LogLines::new(reader).map(|l| l.unwrap());
//! assert_eq!(lines_iter.next(), Some(("first".into(), 1)));
//! assert_eq!(lines_iter.next(), Some(("second".into(), 2)));
//! assert_eq!(lines_iter.next(), Some(("".into(), 3)));
//! assert_eq!(lines_iter.next(), Some(("last".into(), 4)));
//! assert_eq!(lines_iter.next(), None);
//! ```
//!
//! You can zero-copy convert a [Bytes] to [&str] using: `std::str::from_utf8(&bytes[..])`.

use bytes::{Buf, Bytes, BytesMut};
use std::io::{ErrorKind, Read, Result};

#[derive(Clone, Copy, Debug, PartialEq)]
enum State {
    // We reached the end of the reader, or it failed.
    EoF,
    // We are processing the lines.
    Scanning,
}

/// The LogLines struct holds a single buffer to store the read data and it yields immutable memory slice.
///
// Here is the main sequence diagram:
//
//     ⭩- the buffer starts here.
// A: [                          ]          < the buffer is empty, we read a chunk.
// B: [aaaaaaaaaaaa\nbbbbb\nccccc]          < there is a line separator.
// C:  ╰-----------⮡ next slice
// D:               ⭨
// B: [              bbbbb\nccccc]
// C:                ╰----⮡ next slice
// D:                      ⭨
// E: [                     ccccc]          < the line is incomplete.
// F:       ⭩ we reserve more space and move the left-overs at the begining of the buffer.
// G: [ccccc                           ]    < we read another chunk after the left-overs.
// B: [ccccccc\r\ndddd\neeeeeee        ]
// C:  ╰------⮡ next slice, the '\r' is dropped
// D:                  ⭨
// B: [                  dddd\neeeeeee        ]
// C:                    ╰---⮡ next slice
// E: [                        eeeeeee        ]
// H: [eeeeeee                                ]    < we reach the end of file.
// H   ╰------⮡ the last slice
//
// Long lines are never discarded: the buffer grows until the separator is found.
pub struct LogLines<R: Read> {
    reader: R,
    buf: BytesMut,
    state: State,
    line_count: usize,
    chunk_size: usize,
}

/// Logline is a tuple (content, line number).
pub type LogLine = (Bytes, usize);

impl<R: Read> Iterator for LogLines<R> {
    type Item = Result<LogLine>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::EoF => None,
            State::Scanning => self.get_slice(),
        }
    }
}

impl<R: Read> LogLines<R> {
    /// Creates a new LogLines.
    pub fn new(reader: R) -> LogLines<R> {
        LogLines::with_chunk_size(reader, 8192)
    }

    /// Creates a new LogLines reading `chunk_size` bytes at a time.
    pub fn with_chunk_size(reader: R, chunk_size: usize) -> LogLines<R> {
        let chunk_size = chunk_size.max(1);
        LogLines {
            reader,
            chunk_size,
            state: State::Scanning,
            buf: BytesMut::with_capacity(chunk_size),
            line_count: 0,
        }
    }

    /// The number of lines yielded so far.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    // Find the next line in the buffer, reading more data when needed
    fn get_slice(&mut self) -> Option<Result<LogLine>> {
        // The number of bytes known to not contain a separator.
        let mut scanned = 0;
        loop {
            if let Some(offset) = self.buf[scanned..].iter().position(|c| *c == b'\n') {
                // Step B: We found the end of the line, we can return it now.
                // Step C: split_to() creates a new zero copy reference to the buffer.
                let line = self.buf.split_to(scanned + offset);
                // Step D: advance the starting position after the separator.
                self.buf.advance(1);
                return Some(Ok(self.make_line(line)));
            }

            // Step E: We haven't found the end of the line, we need more data.
            scanned = self.buf.len();
            match self.read_chunk() {
                Ok(true) => continue,

                // Step H: We reached the end of the reader, but we have left-overs.
                Ok(false) if !self.buf.is_empty() => {
                    self.state = State::EoF;
                    let line = self.buf.split();
                    return Some(Ok(self.make_line(line)));
                }

                // We reached the end of the reader, this is the end.
                Ok(false) => {
                    self.state = State::EoF;
                    return None;
                }

                // There was a reading error, we return it.
                Err(e) => {
                    self.state = State::EoF;
                    return Some(Err(e));
                }
            }
        }
    }

    // Append a chunk to the buffer, returns false at the end of the reader
    fn read_chunk(&mut self) -> Result<bool> {
        let pos = self.buf.len();
        // Step F: reserve() will attempt to reclaim space in the buffer.
        self.buf.reserve(self.chunk_size);
        // When pos is at 0, we are at Step A, otherwise this is Step G
        self.buf.resize(pos + self.chunk_size, 0);
        loop {
            match self.reader.read(&mut self.buf[pos..]) {
                Ok(n) => {
                    self.buf.truncate(pos + n);
                    return Ok(n > 0);
                }
                // The read was interrupted by a signal, try again.
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(pos);
                    return Err(e);
                }
            }
        }
    }

    // Drop the carriage return and increase the line count
    fn make_line(&mut self, mut line: BytesMut) -> LogLine {
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        self.line_count += 1;
        (line.freeze(), self.line_count)
    }
}
