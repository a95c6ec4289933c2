// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! This library provides the line classifier of the [warnjuicer](https://github.com/warnjuicer/warnjuicer) project.
//!
//! The goal is to replace known JVM and JOL warning messages with short stable tags
//! (e.g. the `A Java agent has been loaded dynamically (/tmp/jolAgent42.jar)` notice is converted to `WARN1`),
//! so that build logs can be diffed without the incidental noise.
//!
//! The main function is [classify]. Lines that do not match any rule are returned unchanged:
//!
//! ```rust
//! # use warnjuicer_rules::classify;
//! assert_eq!(
//!     classify("WARNING: A Java agent has been loaded dynamically (/tmp/jolAgent8364.jar)"),
//!     "WARN1"
//! );
//! assert_eq!(
//!     classify("WARNING: Please consider reporting this to the maintainers of org.example.Foo"),
//!     "WARN-report-org.example.Foo"
//! );
//! assert_eq!(classify("Ran 42 tests."), "Ran 42 tests.");
//! ```
//!
//! The rules are searched anywhere in the line, in a fixed order, and the first match wins.
//! Use [classify_bytes] when the input may not be valid UTF-8.

use lazy_static::lazy_static;
use regex::bytes::Regex;
use std::borrow::Cow;

/// The replacement of a matched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// The line is replaced with this literal.
    Literal(&'static str),
    /// The line is replaced with this prefix followed by the first capture group.
    Capture(&'static str),
}

impl Tag {
    /// Render the tag with the text captured by the rule.
    pub fn render(&self, capture: &[u8]) -> Cow<'static, [u8]> {
        match self {
            Tag::Literal(tag) => Cow::Borrowed(tag.as_bytes()),
            Tag::Capture(prefix) => {
                let mut tag = Vec::with_capacity(prefix.len() + capture.len());
                tag.extend_from_slice(prefix.as_bytes());
                tag.extend_from_slice(capture);
                Cow::Owned(tag)
            }
        }
    }

    fn render_str(&self, capture: &[u8]) -> Cow<'static, str> {
        match self {
            Tag::Literal(tag) => Cow::Borrowed(tag),
            Tag::Capture(prefix) => {
                Cow::Owned(format!("{}{}", prefix, String::from_utf8_lossy(capture)))
            }
        }
    }
}

/// A known warning message.
#[derive(Debug)]
pub struct Rule {
    /// A short identifier, used in debug logs.
    pub name: &'static str,
    /// The tag emitted in place of the matched line.
    pub tag: Tag,
    regex: Regex,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, tag: Tag) -> Rule {
        Rule {
            name,
            tag,
            regex: Regex::new(pattern).unwrap(),
        }
    }

    /// The rule regular expression.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Search the rule in the line, returns the captured text.
    /// The capture is empty for [Tag::Literal] rules.
    pub fn find<'a>(&self, line: &'a [u8]) -> Option<&'a [u8]> {
        match self.tag {
            Tag::Literal(_) => self.regex.find(line).map(|_| &line[..0]),
            Tag::Capture(_) => self
                .regex
                .captures(line)
                .map(|caps| caps.get(1).map_or(&line[..0], |m| m.as_bytes())),
        }
    }

    /// Returns the rendered tag when the line matches.
    pub fn apply(&self, line: &[u8]) -> Option<Cow<'static, [u8]>> {
        self.find(line).map(|capture| self.tag.render(capture))
    }
}

lazy_static! {
    static ref RULES: Vec<Rule> = vec![
        // JDK dynamic agent notices, printed when JOL attaches itself.
        Rule::new(
            "agent-loaded",
            r"WARNING: A Java agent has been loaded dynamically \(/tmp/jolAgent\d+.jar\)",
            Tag::Literal("WARN1"),
        ),
        Rule::new(
            "enable-dynamic-agent-loading",
            r"WARNING: If a serviceability tool is in use, please run with -XX:\+EnableDynamicAgentLoading to hide this warning",
            Tag::Literal("WARN2"),
        ),
        Rule::new(
            "instrument-trace-usage",
            r"WARNING: If a serviceability tool is not in use, please run with -Djdk.instrument.traceUsage for more information",
            Tag::Literal("WARN3"),
        ),
        Rule::new(
            "dynamic-agent-disallowed",
            r"WARNING: Dynamic loading of agents will be disallowed by default in a future release",
            Tag::Literal("WARN4"),
        ),
        Rule::new(
            "sa-narrow-oop-base",
            r"# WARNING: Unable to attach Serviceability Agent. sun.jvm.hotspot.memory.Universe.getNarrowOopBase\(\)",
            Tag::Literal("WARN5"),
        ),
        // sun.misc.Unsafe deprecation
        Rule::new(
            "unsafe-deprecated",
            r"WARNING: A terminally deprecated method in sun.misc.Unsafe has been called",
            Tag::Literal("WARN6"),
        ),
        Rule::new(
            "unsafe-array-base-offset-called",
            r"WARNING: sun.misc.Unsafe::arrayBaseOffset has been called by org.openjdk.jol.vm.HotspotUnsafe \(file:.*.m2/repository/org/openjdk/jol/jol-core/0.9/jol-core-0.9.jar\)",
            Tag::Literal("WARN-Unsafe::arrayBaseOffset-called"),
        ),
        Rule::new(
            "report-to-maintainers",
            r"WARNING: Please consider reporting this to the maintainers of (.*)",
            Tag::Capture("WARN-report-"),
        ),
        Rule::new(
            "unsafe-array-base-offset-removed",
            r"WARNING: sun.misc.Unsafe::arrayBaseOffset will be removed in a future release",
            Tag::Literal("WARN-Unsafe::arrayBaseOffset-will-be-removed"),
        ),
        // Clojure reflection warnings, the lt one is pinned to its source position.
        Rule::new(
            "boxed-math-divide",
            r"Boxed math warning, cljol/ubergraph_extras.clj:\d+:\d+ - call: public static java.lang.Number clojure.lang.Numbers.divide\(java.lang.Object,long\).",
            Tag::Literal("WARN-BoxedMath1"),
        ),
        Rule::new(
            "boxed-math-lt",
            r"Boxed math warning, cljol/ubergraph_extras.clj:128:9 - call: public static boolean clojure.lang.Numbers.lt\(long,java.lang.Object\).",
            Tag::Literal("WARN-BoxedMath2"),
        ),
        // JOL attach failures
        Rule::new(
            "instrumentation-attach-failed",
            r"# WARNING: Unable to get Instrumentation. Dynamic Attach failed. You may add this JAR as -javaagent manually, or supply -Djdk.attach.allowAttachSelf",
            Tag::Literal("WARN7"),
        ),
        // The unescaped `|` makes this an alternation, either half is enough.
        Rule::new(
            "sa-escalated-privileges",
            r"# WARNING: Unable to attach Serviceability Agent. You can try again with escalated privileges. Two options: a\) use -Djol.tryWithSudo=true to try with sudo; b\) echo 0 | sudo tee /proc/sys/kernel/yama/ptrace_scope",
            Tag::Literal("WARN8"),
        ),
        // JDK 9-16 illegal access notices
        Rule::new(
            "illegal-reflective-access",
            r"WARNING: An illegal reflective access operation has occurred",
            Tag::Literal("WARN9"),
        ),
        Rule::new(
            "illegal-reflective-access-by-object-utils",
            r"WARNING: Illegal reflective access by org.openjdk.jol.util.ObjectUtils \(file:.*/.m2/repository/org/openjdk/jol/jol-core/0.9/jol-core-0.9.jar\) to field (.*)",
            Tag::Capture("WARN10-"),
        ),
        Rule::new(
            "illegal-access-warn",
            r"WARNING: Use --illegal-access=warn to enable warnings of further illegal reflective access operations",
            Tag::Literal("WARN11"),
        ),
        Rule::new(
            "illegal-access-denied",
            r"WARNING: All illegal access operations will be denied in a future release",
            Tag::Literal("WARN12"),
        ),
    ];
}

/// The ordered rule set.
pub fn rules() -> &'static [Rule] {
    RULES.as_slice()
}

/// Returns the first rule matching the line, and its capture.
fn lookup(line: &[u8]) -> Option<(&'static Rule, &[u8])> {
    RULES
        .iter()
        .find_map(|rule| rule.find(line).map(|capture| (rule, capture)))
}

/// Returns the first rule matching the line.
pub fn matching_rule(line: &[u8]) -> Option<&'static Rule> {
    lookup(line).map(|(rule, _)| rule)
}

/// The classifier entry point for raw bytes. The line must not contain its terminator.
pub fn classify_bytes(line: &[u8]) -> Cow<'_, [u8]> {
    match lookup(line) {
        Some((rule, capture)) => {
            tracing::trace!(rule = rule.name, "matched");
            rule.tag.render(capture)
        }
        None => Cow::Borrowed(line),
    }
}

/// The classifier entry point. The line must not contain its terminator.
pub fn classify(line: &str) -> Cow<'_, str> {
    match lookup(line.as_bytes()) {
        Some((rule, capture)) => {
            tracing::trace!(rule = rule.name, "matched");
            rule.tag.render_str(capture)
        }
        None => Cow::Borrowed(line),
    }
}

/// Helper macro to write short tests. `tag_eq!("a", "b")` is `assert_eq!(classify("a"), "b")`
#[macro_export]
macro_rules! tag_eq {
    ($line:expr,$tag:expr) => {
        assert_eq!($crate::classify($line), $tag, "classify({:?})", $line)
    };
}
