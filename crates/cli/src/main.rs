// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module is the entrypoint of the warnjuicer command line.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;

mod driver;

use driver::Input;

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Cli {
    #[clap(
        help = "Log files to summarize, read the standard input when empty or `-`",
        value_name = "FILE"
    )]
    files: Vec<String>,
}

impl Cli {
    fn run(self) -> Result<()> {
        let inputs = if self.files.is_empty() {
            vec![Input::Stdin]
        } else {
            self.files.into_iter().map(Input::from_string).collect()
        };

        let stdout = std::io::stdout();
        let mut out = std::io::BufWriter::new(stdout.lock());
        let result = driver::filter_all(&inputs, &mut out);
        // Flush the lines processed before a failure.
        let flushed = out.flush().map_err(driver::Error::Write);

        match result.and_then(|count| flushed.map(|_| count)) {
            Ok(count) => {
                tracing::debug!(count, "Completed");
                Ok(())
            }
            Err(e) if e.is_broken_pipe() => {
                tracing::debug!("Output closed");
                Ok(())
            }
            Err(e) => Err(e).context("Could not summarize the warnings"),
        }
    }
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let logger = tracing_subscriber::Registry::default();

    // The standard output is reserved for the summary.
    match std::env::var_os("WARNJUICER_LOG") {
        None => {
            // Default WARN stderr logger
            logger
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .compact()
                        .with_filter(tracing_subscriber::filter::LevelFilter::WARN),
                )
                .init();
        }
        Some(_level) => {
            // Tracing spans
            logger
                .with(
                    tracing_tree::HierarchicalLayer::new(1)
                        .with_writer(std::io::stderr)
                        .with_targets(true)
                        .with_bracketed_fields(true)
                        .with_filter(tracing_subscriber::filter::EnvFilter::from_env(
                            "WARNJUICER_LOG",
                        )),
                )
                .init();
        }
    };

    Cli::parse().run()
}
