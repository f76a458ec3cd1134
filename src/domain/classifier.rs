//! Line classifier: decides which node a (de-indented) line declares.

use regex::Regex;
use tracing::instrument;

use crate::domain::options::{OptionTable, OptionValue};
use crate::domain::tree::{NodeKind, SEQUENCE_AWARE};

/// Why a line produced no node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyLine,
    Comment,
}

/// Outcome of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Skip(SkipReason),
    Node(NodeKind, OptionTable),
    Unrecognized,
}

enum Matcher {
    Skip(SkipReason),
    Node(NodeKind),
}

/// Ordered first-match-wins classifier.
pub struct LineClassifier {
    rules: Vec<(Regex, Matcher)>,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LineClassifier {
    pub fn new() -> Self {
        let table: [(&str, Matcher); 10] = [
            (r"^[ \t]*$", Matcher::Skip(SkipReason::EmptyLine)),
            (r"^#", Matcher::Skip(SkipReason::Comment)),
            (r"^(supDomain|domainGroup) *:", Matcher::Node(NodeKind::GroupDomain)),
            (r"^domain *:", Matcher::Node(NodeKind::Domain)),
            (r"^.+=", Matcher::Node(NodeKind::Path)),
            (
                r"^(supConf|confGroup|confType) *:",
                Matcher::Node(NodeKind::GroupConfiguration),
            ),
            (r"^conf *:", Matcher::Node(NodeKind::Configuration)),
            (r"^(ANY|ALL)", Matcher::Node(NodeKind::Operator)),
            (
                r"^[a-zA-Z0-9_.]+ +(Is|IsNot|Includes|Excludes) +[a-zA-Z0-9_.]+",
                Matcher::Node(NodeKind::Rule),
            ),
            (r"^component *:", Matcher::Node(NodeKind::GroupPath)),
        ];
        let rules = table
            .into_iter()
            .map(|(pattern, matcher)| {
                (
                    Regex::new(pattern).expect("classifier patterns are valid"),
                    matcher,
                )
            })
            .collect();
        Self { rules }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn classify(&self, line: &str) -> LineClass {
        for (regex, matcher) in &self.rules {
            if regex.is_match(line) {
                return match matcher {
                    Matcher::Skip(reason) => LineClass::Skip(*reason),
                    Matcher::Node(kind) => LineClass::Node(*kind, extract_options(*kind, line)),
                };
            }
        }
        LineClass::Unrecognized
    }
}

/// Variants introduced by a `keyword:` prefix.
fn is_tagged(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::GroupDomain
            | NodeKind::Domain
            | NodeKind::GroupConfiguration
            | NodeKind::Configuration
            | NodeKind::GroupPath
    )
}

fn delimiter(kind: NodeKind) -> char {
    match kind {
        NodeKind::Path => '=',
        _ => ' ',
    }
}

/// Re-parse a line into the declared option fields of `kind`.
pub fn extract_options(kind: NodeKind, line: &str) -> OptionTable {
    let mut text = line.trim();
    if is_tagged(kind) {
        text = text.split_once(':').map_or(text, |(_, rest)| rest).trim();
    }

    let names = kind.option_names();
    let mut values: Vec<OptionValue> = text
        .splitn(names.len(), delimiter(kind))
        .map(|part| OptionValue::from(part.trim()))
        .collect();

    if kind.is_domain_like() {
        let aware = values.get(1).is_some_and(|v| v.as_str() == SEQUENCE_AWARE);
        values.truncate(1);
        values.push(OptionValue::Flag(aware));
    }
    while values.len() < names.len() {
        values.push(OptionValue::Text(String::new()));
    }

    OptionTable::from_pairs(names, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", LineClass::Skip(SkipReason::EmptyLine))]
    #[case("  \t ", LineClass::Skip(SkipReason::EmptyLine))]
    #[case("# a comment", LineClass::Skip(SkipReason::Comment))]
    #[case("what is this", LineClass::Unrecognized)]
    fn test_classify_non_nodes(#[case] line: &str, #[case] expected: LineClass) {
        assert_eq!(LineClassifier::new().classify(line), expected);
    }

    #[rstest]
    #[case("supDomain: Audio", NodeKind::GroupDomain)]
    #[case("domainGroup : Audio", NodeKind::GroupDomain)]
    #[case("domain: Routing", NodeKind::Domain)]
    #[case("/sys/volume = 12", NodeKind::Path)]
    #[case("confType: Mode", NodeKind::GroupConfiguration)]
    #[case("supConf: Mode", NodeKind::GroupConfiguration)]
    #[case("confGroup: Mode", NodeKind::GroupConfiguration)]
    #[case("conf: Speaker", NodeKind::Configuration)]
    #[case("ANY", NodeKind::Operator)]
    #[case("ALL", NodeKind::Operator)]
    #[case("Mode Is InCall", NodeKind::Rule)]
    #[case("Devices Excludes Headset", NodeKind::Rule)]
    #[case("component: /sys", NodeKind::GroupPath)]
    fn test_classify_node_kinds(#[case] line: &str, #[case] expected: NodeKind) {
        match LineClassifier::new().classify(line) {
            LineClass::Node(kind, _) => assert_eq!(kind, expected),
            other => panic!("unexpected {other:?} for {line:?}"),
        }
    }

    #[test]
    fn test_first_match_wins_path_before_configuration() {
        // a keyword line containing '=' is a path, the path matcher comes first
        match LineClassifier::new().classify("conf: a=b") {
            LineClass::Node(kind, options) => {
                assert_eq!(kind, NodeKind::Path);
                assert_eq!(options.get("Name"), "conf: a");
                assert_eq!(options.get("value"), "b");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(
            LineClassifier::new().classify("Domain: X"),
            LineClass::Unrecognized
        );
    }

    #[test]
    fn test_extract_domain_sequence_awareness() {
        let aware = extract_options(NodeKind::Domain, "domain: D sequenceAware");
        assert_eq!(aware.name(), "D");
        assert_eq!(aware.value(SEQUENCE_AWARE), Some(&OptionValue::Flag(true)));

        let plain = extract_options(NodeKind::Domain, "domain: D");
        assert_eq!(plain.value(SEQUENCE_AWARE), Some(&OptionValue::Flag(false)));

        let other = extract_options(NodeKind::Domain, "domain: D something");
        assert!(!other.flag(SEQUENCE_AWARE));
    }

    #[test]
    fn test_extract_rule_fields() {
        let rule = extract_options(NodeKind::Rule, "Mode Is Ring Tone");
        assert_eq!(rule.get("criterion"), "Mode");
        assert_eq!(rule.get("type"), "Is");
        assert_eq!(rule.get("element"), "Ring Tone");
    }

    #[test]
    fn test_extract_path_splits_on_first_equal_sign() {
        let path = extract_options(NodeKind::Path, "  /a/b =  x=y ");
        assert_eq!(path.name(), "/a/b");
        assert_eq!(path.get("value"), "x=y");
    }

    #[test]
    fn test_extract_fills_missing_trailing_values() {
        let path = extract_options(NodeKind::Path, "/a =");
        assert_eq!(path.len(), 2);
        assert_eq!(path.get("value"), "");
    }
}
