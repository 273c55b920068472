//! Editorial policy rule set.
//!
//! The policy is versioned, author-declared data: banned-word rules with
//! rationales, pronoun rules, moralizing phrases, tracked sentence endings,
//! a term-consistency dictionary, and whitelist markers. It ships with a
//! built-in rule set and can be replaced wholesale by an external TOML,
//! YAML, or JSON file, so policy changes never touch validator control flow.
//!
//! Rules are declared once and compiled once per run; validators only ever
//! read the compiled form.

use aho_corasick::AhoCorasick;
use camino::Utf8Path;
use figment::Figment;
use figment::providers::{Format, Json, Toml, Yaml};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};
use crate::report::RuleKind;

/// A banned-word or pronoun rule.
///
/// Exceptions are part of the rule itself: a match is suppressed only when
/// one of the listed strings is directly adjacent to it. A legitimate
/// compound elsewhere in the document never excuses a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRule {
    /// Regex pattern matched against each narrative line.
    pub pattern: String,
    /// Why this expression is banned, with suggested replacements.
    pub rationale: String,
    /// Strings that, immediately before a match, suppress it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_preceded_by: Vec<String>,
    /// Strings that, immediately after a match, suppress it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_followed_by: Vec<String>,
}

/// One entry of the term-consistency dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    /// Surface form of the term.
    pub term: String,
    /// The only reading accepted inside a parenthetical annotation.
    pub reading: String,
}

/// The full editorial policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy revision, bumped whenever the rule data changes.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Banned words and expressions.
    #[serde(default)]
    pub banned: Vec<WordRule>,
    /// Generic pronouns that must be replaced with specific names.
    #[serde(default)]
    pub pronouns: Vec<WordRule>,
    /// Phrases that signal moralizing in narrator lines.
    #[serde(default)]
    pub moralizing: Vec<String>,
    /// Sentence-final forms tracked for consecutive repetition.
    #[serde(default)]
    pub endings: Vec<String>,
    /// Term-consistency dictionary.
    #[serde(default)]
    pub terms: Vec<TermEntry>,
    /// Markers that whitelist a whole line wherever they appear in it.
    #[serde(default)]
    pub whitelist: Vec<String>,
}

const fn default_version() -> u32 {
    1
}

fn rule(pattern: &str, rationale: &str) -> WordRule {
    WordRule {
        pattern: pattern.to_string(),
        rationale: rationale.to_string(),
        not_preceded_by: Vec::new(),
        not_followed_by: Vec::new(),
    }
}

impl Policy {
    /// The built-in rule set.
    pub fn builtin() -> Self {
        Self {
            version: 1,
            banned: vec![
                // Death references carry the highest demonetization risk.
                WordRule {
                    pattern: "死".to_string(),
                    rationale: "'死' (direct death reference). Use '悲劇', '帰らぬ人', '命を落とす'."
                        .to_string(),
                    not_preceded_by: vec!["必".to_string()],
                    not_followed_by: ["守", "角", "球", "力", "闘", "去"]
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                },
                rule("死亡", "'死亡'. Use '帰らぬ人', '命が失われた'."),
                rule("死体", "'死体'. Use '遺体', 'なきがら'."),
                rule(
                    "遺体",
                    "'遺体' (avoid in title/thumbnail). Use '発見', '姿'. Script OK if respectful.",
                ),
                rule("全滅", "'全滅'. Use '誰ひとり戻らない', '壊滅'."),
                rule("即死", "'即死'. Use 'その瞬間に意識を失う'."),
                rule("殺す", "'殺す'. Use '奪う', '手にかける'."),
                rule("殺人", "'殺人'. Use '事件', '犯行'."),
                rule("殺害", "'殺害'. Use '命を奪う'."),
                rule("刺す", "'刺す'."),
                rule("殴る", "'殴る'."),
                rule("暴行", "'暴行'."),
                rule("発狂", "'発狂'. Use '錯乱', 'パニック'."),
                rule("狂う", "'狂う'. Use '常軌を逸する'."),
                rule("子供の死", "'子供の死'. Use '小さな命が失われる'."),
            ],
            pronouns: vec![
                WordRule {
                    pattern: "彼".to_string(),
                    rationale: "'彼' (generic he). Use a specific name.".to_string(),
                    not_preceded_by: Vec::new(),
                    not_followed_by: vec!["女".to_string()],
                },
                rule("彼女", "'彼女' (generic she). Use a specific name."),
                rule("彼ら", "'彼ら' (generic they). Use '選手たち', '村人たち'."),
                rule("あいつ", "'あいつ'. Use a name."),
                rule("こいつ", "'こいつ'. Use a name."),
                rule("やつ", "'やつ'. Use a name."),
            ],
            moralizing: [
                "学ぶべき",
                "教訓",
                "社会の闇",
                "警鐘",
                "私たち",
                "現代社会",
                "考えるべき",
                "知るべき",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            endings: ["でした", "ました", "だ", "ある", "いる"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            terms: vec![
                TermEntry {
                    term: "白銀".to_string(),
                    reading: "はくぎん".to_string(),
                },
                TermEntry {
                    term: "景泰".to_string(),
                    reading: "ケイタイ".to_string(),
                },
            ],
            whitelist: ["【制作メモ】", "<!-- SAFETY_OVERRIDE -->", "[BGM:", "[SEQ:"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Load a policy from an external file, detecting format from the
    /// extension. The loaded policy replaces the built-in set entirely.
    pub fn from_file(path: &Utf8Path) -> PolicyResult<Self> {
        let figment = match path.extension() {
            Some("toml") => Figment::from(Toml::file_exact(path.as_str())),
            Some("yaml" | "yml") => Figment::from(Yaml::file_exact(path.as_str())),
            Some("json") => Figment::from(Json::file_exact(path.as_str())),
            _ => {
                return Err(PolicyError::UnsupportedFormat {
                    path: path.to_string(),
                });
            }
        };
        let policy: Self = figment.extract().map_err(Box::new)?;
        tracing::info!(version = policy.version, path = %path, "policy loaded");
        Ok(policy)
    }

    /// Compile the policy for matching. Invalid patterns are an error,
    /// never a silently skipped rule.
    pub fn compile(&self) -> PolicyResult<CompiledPolicy> {
        let mut rules = Vec::with_capacity(self.banned.len() + self.pronouns.len());
        for word_rule in &self.banned {
            rules.push(CompiledRule::new(word_rule, RuleKind::BannedWord)?);
        }
        for word_rule in &self.pronouns {
            rules.push(CompiledRule::new(word_rule, RuleKind::Pronoun)?);
        }

        let ending = if self.endings.is_empty() {
            None
        } else {
            let alternation = self
                .endings
                .iter()
                .map(|e| regex::escape(e))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!("({alternation})[。、]?$");
            Some(Regex::new(&pattern).map_err(|source| PolicyError::InvalidPattern {
                pattern,
                source,
            })?)
        };

        let terms = self
            .terms
            .iter()
            .map(|entry| {
                let pattern = format!("{}[（(](.+?)[）)]", regex::escape(&entry.term));
                let annotation =
                    Regex::new(&pattern).map_err(|source| PolicyError::InvalidPattern {
                        pattern,
                        source,
                    })?;
                Ok(CompiledTerm {
                    term: entry.term.clone(),
                    reading: entry.reading.clone(),
                    annotation,
                })
            })
            .collect::<PolicyResult<Vec<_>>>()?;

        Ok(CompiledPolicy {
            version: self.version,
            rules,
            moralizing: self.moralizing.clone(),
            moralizing_ac: AhoCorasick::new(&self.moralizing)?,
            ending,
            terms,
            whitelist_ac: AhoCorasick::new(&self.whitelist)?,
        })
    }
}

/// A [`WordRule`] with its pattern compiled.
#[derive(Debug)]
pub(crate) struct CompiledRule {
    pub(crate) regex: Regex,
    pub(crate) kind: RuleKind,
    pub(crate) rationale: String,
    not_preceded_by: Vec<String>,
    not_followed_by: Vec<String>,
}

impl CompiledRule {
    fn new(rule: &WordRule, kind: RuleKind) -> PolicyResult<Self> {
        let regex = Regex::new(&rule.pattern).map_err(|source| PolicyError::InvalidPattern {
            pattern: rule.pattern.clone(),
            source,
        })?;
        Ok(Self {
            regex,
            kind,
            rationale: rule.rationale.clone(),
            not_preceded_by: rule.not_preceded_by.clone(),
            not_followed_by: rule.not_followed_by.clone(),
        })
    }

    /// Whether a declared exception suppresses the match at `start..end`.
    ///
    /// Only strings directly adjacent to the match count.
    pub(crate) fn exception_at(&self, line: &str, start: usize, end: usize) -> bool {
        self.not_preceded_by
            .iter()
            .any(|p| line[..start].ends_with(p.as_str()))
            || self
                .not_followed_by
                .iter()
                .any(|f| line[end..].starts_with(f.as_str()))
    }
}

/// A [`TermEntry`] with its annotation extractor compiled.
#[derive(Debug)]
pub(crate) struct CompiledTerm {
    pub(crate) term: String,
    pub(crate) reading: String,
    /// Captures the parenthetical reading directly after the term.
    pub(crate) annotation: Regex,
}

/// A [`Policy`] compiled for matching. Read-only for the lifetime of a run.
#[derive(Debug)]
pub struct CompiledPolicy {
    /// Revision of the source policy.
    pub version: u32,
    pub(crate) rules: Vec<CompiledRule>,
    pub(crate) moralizing: Vec<String>,
    pub(crate) moralizing_ac: AhoCorasick,
    pub(crate) ending: Option<Regex>,
    pub(crate) terms: Vec<CompiledTerm>,
    whitelist_ac: AhoCorasick,
}

impl CompiledPolicy {
    /// Whether the raw line carries a whitelist marker anywhere in it.
    pub fn is_whitelisted(&self, line: &str) -> bool {
        self.whitelist_ac.is_match(line)
    }

    /// Number of banned-word and pronoun rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of term-consistency entries.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_policy_compiles() {
        let compiled = Policy::builtin().compile().unwrap();
        assert!(compiled.rule_count() > 15);
        assert_eq!(compiled.term_count(), 2);
        assert!(compiled.ending.is_some());
    }

    #[test]
    fn exception_requires_adjacency() {
        let rule = WordRule {
            pattern: "死".to_string(),
            rationale: String::new(),
            not_preceded_by: vec!["必".to_string()],
            not_followed_by: vec!["守".to_string()],
        };
        let compiled = CompiledRule::new(&rule, RuleKind::BannedWord).unwrap();

        let line = "必死に走った";
        let m = compiled.regex.find(line).unwrap();
        assert!(compiled.exception_at(line, m.start(), m.end()));

        // The compound appearing elsewhere does not excuse a later match.
        let line = "必死の形相、そして死が訪れた";
        let last = compiled.regex.find_iter(line).last().unwrap();
        assert!(!compiled.exception_at(line, last.start(), last.end()));
    }

    #[test]
    fn whitelist_matches_anywhere_in_line() {
        let compiled = Policy::builtin().compile().unwrap();
        assert!(compiled.is_whitelisted("  【制作メモ】殺すシーンの演出について"));
        assert!(compiled.is_whitelisted("effect <!-- SAFETY_OVERRIDE --> here"));
        assert!(!compiled.is_whitelisted("彼は走った"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let mut policy = Policy::builtin();
        policy.banned.push(rule("([unclosed", "broken"));
        let err = policy.compile().unwrap_err();
        assert!(matches!(err, PolicyError::InvalidPattern { .. }));
    }

    #[test]
    fn loads_external_toml_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
version = 7

[[banned]]
pattern = "禁止"
rationale = "test rule"
not_followed_by = ["語"]

[[terms]]
term = "白銀"
reading = "はくぎん"
"#
        )
        .unwrap();

        let path = camino::Utf8PathBuf::from_path_buf(path).unwrap();
        let policy = Policy::from_file(&path).unwrap();
        assert_eq!(policy.version, 7);
        assert_eq!(policy.banned.len(), 1);
        assert!(policy.pronouns.is_empty());
        assert_eq!(policy.terms[0].reading, "はくぎん");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = Policy::from_file(Utf8Path::new("policy.ini")).unwrap_err();
        assert!(matches!(err, PolicyError::UnsupportedFormat { .. }));
    }
}
