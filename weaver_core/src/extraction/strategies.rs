//! Name detection strategies.
//!
//! Each strategy is a pure function from text to candidates and knows nothing
//! about the others; the aggregator fuses their output.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use weaver_model::DetectionMethod;

use super::tokenizer::{
    clean_word, count_mentions, has_title, is_common_first_name, is_common_verb, is_initial,
    is_lead_word, is_name_continuation, is_potential_name, is_title, is_valid_full_name,
    read_name, split_sentences, split_words,
};

/// A name proposed by one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    /// Strategy-level confidence, before the shared mention boost.
    pub confidence: f32,
    /// Strategy-local mention count; the aggregator replaces it with a
    /// whole-text recount.
    pub mention_count: u32,
    pub method: DetectionMethod,
}

impl Candidate {
    fn new(name: impl Into<String>, confidence: f32, mention_count: u32, method: DetectionMethod) -> Self {
        Self {
            name: name.into(),
            confidence,
            mention_count,
            method,
        }
    }
}

/// Confidence assigned to speaker attributions.
pub const DIALOGUE_CONFIDENCE: f32 = 0.8;

/// Confidence assigned to sentence subjects.
pub const SUBJECT_CONFIDENCE: f32 = 0.7;

const SPEECH_VERBS: &str = "said|whispered|shouted|exclaimed|asked|replied|muttered|added|continued";

const NAME_RUN: &str = r"[A-Z][a-zA-Z.'-]*(?:\s+[A-Z][a-zA-Z.'-]*)*";

// Patterns are constant; expect() only fires on a typo in them.
static QUOTE_THEN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"["\x{{201C}}][^"\x{{201C}}\x{{201D}}]+["\x{{201D}}][^.!?"\x{{201C}}]*?\b(?i:{SPEECH_VERBS})\s+\b(?P<name>{NAME_RUN})"#
    ))
    .expect("Invalid regex: quote-then-name attribution")
});

static NAME_THEN_QUOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"\b(?P<name>{NAME_RUN})\s+(?i:{SPEECH_VERBS})\b[^.!?"\x{{201C}}]*["\x{{201C}}][^"\x{{201C}}\x{{201D}}]+["\x{{201D}}]"#
    ))
    .expect("Invalid regex: name-then-quote attribution")
});

/// Confidence for a capitalized run, from its shape and its whole-text
/// mention count.
pub fn name_confidence(name: &str, word_count: usize, mentions: u32) -> f32 {
    let mut confidence: f32 = 0.5;

    if word_count > 1 {
        confidence += 0.2;
    }
    if has_title(name) {
        confidence += 0.1;
    }
    if is_common_first_name(name) {
        confidence += 0.15;
    }

    confidence += (mentions as f32 * 0.08).min(0.3);

    if word_count == 1 && name.chars().count() < 3 {
        confidence -= 0.3;
    }

    confidence.clamp(0.1, 0.95)
}

/// Strategy 1: runs of capitalized words within each sentence.
pub fn capitalized_sequences(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut counted: HashMap<String, u32> = HashMap::new();

    for sentence in split_sentences(text) {
        let words = split_words(sentence);
        let mut i = 0;
        while i < words.len() {
            match read_name(&words, i) {
                Some((name, consumed)) => {
                    if is_valid_full_name(&name) {
                        let mentions = *counted
                            .entry(name.clone())
                            .or_insert_with(|| count_mentions(text, &name));
                        let confidence = name_confidence(&name, consumed, mentions);
                        candidates.push(Candidate::new(
                            name,
                            confidence,
                            mentions,
                            DetectionMethod::CapitalizedSequence,
                        ));
                    }
                    i += consumed;
                }
                None => i += 1,
            }
        }
    }

    candidates
}

/// Strategy 2: speakers attributed around quoted speech, in both
/// `"...", said Name` and `Name said, "..."` orders.
pub fn dialogue_attributions(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    let orders = [
        (&*QUOTE_THEN_NAME, SpeakerSide::AfterVerb),
        (&*NAME_THEN_QUOTE, SpeakerSide::BeforeVerb),
    ];
    for (pattern, side) in orders {
        for caps in pattern.captures_iter(text) {
            let Some(raw) = caps.name("name") else {
                continue;
            };
            if let Some(name) = trim_speaker(raw.as_str(), side) {
                candidates.push(Candidate::new(
                    name,
                    DIALOGUE_CONFIDENCE,
                    1,
                    DetectionMethod::DialogueAttribution,
                ));
            }
        }
    }

    candidates
}

/// Where the speaker run sits relative to the speech verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpeakerSide {
    /// `"...", said Name`
    AfterVerb,
    /// `Name said, "..."`
    BeforeVerb,
}

/// Cut a captured speaker run down to the name itself.
///
/// A run may cross a sentence end ("Martinez. Tom"); only the sentence
/// touching the verb names the speaker. Leading stopwords ("Then Mary") are
/// dropped.
fn trim_speaker(raw: &str, side: SpeakerSide) -> Option<String> {
    let mut segments: Vec<Vec<&str>> = vec![Vec::new()];

    for token in raw.split_whitespace() {
        let word = clean_word(token);
        if let Some(current) = segments.last_mut() {
            current.push(token);
        }
        if token.ends_with('.') && !is_title(word) && !is_initial(word) {
            segments.push(Vec::new());
        }
    }

    let segment = match side {
        SpeakerSide::AfterVerb => segments.first(),
        SpeakerSide::BeforeVerb => segments.iter().rev().find(|s| !s.is_empty()),
    }?;

    let parts: Vec<&str> = segment
        .iter()
        .copied()
        .skip_while(|token| {
            let word = clean_word(token);
            !is_potential_name(word) && !is_title(word)
        })
        .collect();

    let joined = parts.join(" ");
    let name = clean_word(&joined);
    is_valid_full_name(name).then(|| name.to_string())
}

/// Strategy 3: a name-shaped subject opening a sentence.
///
/// One discourse marker ("Suddenly") may precede the subject. The subject is a
/// single name word, kept only when another name word or a common verb
/// follows it. A title is taken together with the word after it.
pub fn sentence_subjects(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for sentence in split_sentences(text) {
        if sentence.chars().count() < 5 {
            continue;
        }
        let words = split_words(sentence);
        if words.len() < 3 {
            continue;
        }

        let start = usize::from(is_lead_word(clean_word(words[0])));
        let Some(first) = words.get(start).map(|w| clean_word(w)) else {
            continue;
        };

        let name = if is_title(first) {
            // read_name only opens on a title when a name word follows it
            match read_name(&words, start) {
                Some((run, _)) => run.split(' ').take(2).collect::<Vec<_>>().join(" "),
                None => continue,
            }
        } else if is_potential_name(first) {
            let qualifies = words.get(start + 1).is_some_and(|next| {
                let next = clean_word(next);
                is_name_continuation(next) || is_common_verb(next)
            });
            if !qualifies {
                continue;
            }
            first.to_string()
        } else {
            continue;
        };

        if is_valid_full_name(&name) {
            candidates.push(Candidate::new(
                name,
                SUBJECT_CONFIDENCE,
                1,
                DetectionMethod::SentenceSubject,
            ));
        }
    }

    candidates
}

/// Strategy 4: standalone capitalized tokens seen at least twice.
pub fn repeated_proper_nouns(text: &str) -> Vec<Candidate> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u32> = HashMap::new();

    for raw in text.split_whitespace() {
        let word = clean_word(raw);
        if !is_potential_name(word) || !is_valid_full_name(word) {
            continue;
        }
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|word| {
            let count = counts[word];
            (count >= 2).then(|| {
                let confidence = (0.3 + count as f32 * 0.1).min(0.9);
                Candidate::new(word, confidence, count, DetectionMethod::RepeatedProperNoun)
            })
        })
        .collect()
}

/// Run every strategy in a fixed order.
pub fn all_candidates(text: &str) -> Vec<Candidate> {
    let mut candidates = capitalized_sequences(text);
    candidates.extend(dialogue_attributions(text));
    candidates.extend(sentence_subjects(text));
    candidates.extend(repeated_proper_nouns(text));
    candidates
}
