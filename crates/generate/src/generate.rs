// Copyright (C) 2022 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! Build log generator
//!
//! The main function is [gen_lines], it yields a deterministic mix of random noise
//! and known warning messages, together with the tag the classifier should produce:
//!
//! ```rust
//! # use warnjuicer_generate::{gen_lines, GenLine};
//! let lines: Vec<GenLine> = gen_lines().take(100).collect();
//! assert!(lines.iter().any(|l| l.tag.is_some()));
//! assert!(lines.iter().any(|l| l.tag.is_none()));
//! ```

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const SEED: u64 = 42;

/// Sample warning lines, with their expected tag.
pub const WARNINGS: &[(&str, &str)] = &[
    (
        "WARNING: A Java agent has been loaded dynamically (/tmp/jolAgent{N}.jar)",
        "WARN1",
    ),
    (
        "WARNING: If a serviceability tool is in use, please run with -XX:+EnableDynamicAgentLoading to hide this warning",
        "WARN2",
    ),
    (
        "WARNING: If a serviceability tool is not in use, please run with -Djdk.instrument.traceUsage for more information",
        "WARN3",
    ),
    (
        "WARNING: Dynamic loading of agents will be disallowed by default in a future release",
        "WARN4",
    ),
    (
        "# WARNING: Unable to attach Serviceability Agent. sun.jvm.hotspot.memory.Universe.getNarrowOopBase()",
        "WARN5",
    ),
    (
        "WARNING: A terminally deprecated method in sun.misc.Unsafe has been called",
        "WARN6",
    ),
    (
        "WARNING: sun.misc.Unsafe::arrayBaseOffset has been called by org.openjdk.jol.vm.HotspotUnsafe (file:/home/user{N}/.m2/repository/org/openjdk/jol/jol-core/0.9/jol-core-0.9.jar)",
        "WARN-Unsafe::arrayBaseOffset-called",
    ),
    (
        "WARNING: Please consider reporting this to the maintainers of class org.openjdk.jol.vm.HotspotUnsafe",
        "WARN-report-class org.openjdk.jol.vm.HotspotUnsafe",
    ),
    (
        "WARNING: sun.misc.Unsafe::arrayBaseOffset will be removed in a future release",
        "WARN-Unsafe::arrayBaseOffset-will-be-removed",
    ),
    (
        "Boxed math warning, cljol/ubergraph_extras.clj:{N}:{N} - call: public static java.lang.Number clojure.lang.Numbers.divide(java.lang.Object,long).",
        "WARN-BoxedMath1",
    ),
    (
        "Boxed math warning, cljol/ubergraph_extras.clj:128:9 - call: public static boolean clojure.lang.Numbers.lt(long,java.lang.Object).",
        "WARN-BoxedMath2",
    ),
    (
        "# WARNING: Unable to get Instrumentation. Dynamic Attach failed. You may add this JAR as -javaagent manually, or supply -Djdk.attach.allowAttachSelf",
        "WARN7",
    ),
    (
        "# WARNING: Unable to attach Serviceability Agent. You can try again with escalated privileges. Two options: a) use -Djol.tryWithSudo=true to try with sudo; b) echo 0 | sudo tee /proc/sys/kernel/yama/ptrace_scope",
        "WARN8",
    ),
    (
        "WARNING: An illegal reflective access operation has occurred",
        "WARN9",
    ),
    (
        "WARNING: Illegal reflective access by org.openjdk.jol.util.ObjectUtils (file:/home/user{N}/.m2/repository/org/openjdk/jol/jol-core/0.9/jol-core-0.9.jar) to field java.lang.String.value",
        "WARN10-java.lang.String.value",
    ),
    (
        "WARNING: Use --illegal-access=warn to enable warnings of further illegal reflective access operations",
        "WARN11",
    ),
    (
        "WARNING: All illegal access operations will be denied in a future release",
        "WARN12",
    ),
];

/// A generated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenLine {
    /// The log line.
    pub line: String,
    /// The expected tag, None for noise that must pass through.
    pub tag: Option<&'static str>,
}

fn fixed_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(SEED)
}

// Noise never contains the `WARNING: ` marker, so it can't match a rule.
fn gen_noise(rng: &mut impl Rng) -> String {
    let mut result = String::with_capacity(256);
    for _ in 0..rng.random_range(0..10) {
        let word_size = rng.random_range(2..18);
        let word: String = rng
            .sample_iter(&rand::distr::Alphanumeric)
            .take(word_size)
            .map(char::from)
            .collect();
        result.push_str(&word);
        result.push(' ');
    }
    result.pop();
    result
}

fn gen_warning(rng: &mut impl Rng) -> GenLine {
    let (template, tag) = WARNINGS[rng.random_range(0..WARNINGS.len())];
    let mut line = String::with_capacity(template.len() + 16);
    for (idx, part) in template.split("{N}").enumerate() {
        if idx > 0 {
            line.push_str(&rng.random_range(1..100_000u32).to_string());
        }
        line.push_str(part);
    }
    GenLine {
        line,
        tag: Some(tag),
    }
}

fn gen_line(rng: &mut impl Rng) -> GenLine {
    if rng.random_bool(0.3) {
        gen_warning(rng)
    } else {
        GenLine {
            line: gen_noise(rng),
            tag: None,
        }
    }
}

struct RandomLine {
    rng: ChaCha8Rng,
}

impl Iterator for RandomLine {
    type Item = GenLine;

    fn next(&mut self) -> Option<Self::Item> {
        Some(gen_line(&mut self.rng))
    }
}

/// An infinite, reproducible, stream of build log lines.
pub fn gen_lines() -> impl Iterator<Item = GenLine> {
    RandomLine { rng: fixed_rng() }
}

/// The expected classifier output for a given line.
pub fn expected(line: &GenLine) -> &str {
    line.tag.unwrap_or(line.line.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_lines_is_reproducible() {
        let first = gen_lines().take(50).collect::<Vec<GenLine>>();
        let second = gen_lines().take(50).collect::<Vec<GenLine>>();
        assert_eq!(first, second);
    }

    #[test]
    fn test_gen_noise() {
        let mut rng = fixed_rng();
        for _ in 0..200 {
            let noise = gen_noise(&mut rng);
            assert!(!noise.contains("WARNING: "));
            assert!(!noise.contains('\n'));
        }
    }

    #[test]
    fn test_gen_warning() {
        let mut rng = fixed_rng();
        for _ in 0..200 {
            let warning = gen_warning(&mut rng);
            assert!(!warning.line.contains("{N}"));
            assert!(warning.tag.is_some());
        }
    }

    #[test]
    fn test_every_warning_is_generated() {
        let tags = gen_lines()
            .take(2000)
            .filter_map(|l| l.tag)
            .collect::<std::collections::HashSet<_>>();
        assert_eq!(tags.len(), WARNINGS.len());
    }

    #[test]
    fn test_expected() {
        let noise = GenLine {
            line: "noise".into(),
            tag: None,
        };
        assert_eq!(expected(&noise), "noise");
    }
}
