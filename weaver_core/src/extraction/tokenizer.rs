//! Text normalization for name detection.
//!
//! Splits prose into sentences and words, strips punctuation, and classifies
//! capitalization against fixed English lexicons. Everything here is pure.

use regex::Regex;

/// Lowercase words that never form part of a name.
const EXCLUDED_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "as",
    "is", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
    "could", "should", "may", "might", "must", "can", "i", "you", "he", "she", "it", "we", "they",
    "this", "that", "these", "those", "here", "there", "when", "where", "why", "how", "what",
    "which", "who", "whom", "whose", "if", "then", "else", "while", "until", "though", "although",
    "because", "since", "so", "thus", "therefore", "however", "nevertheless", "nonetheless", "yes",
    "no", "not", "very", "just", "only", "all", "some", "any", "every", "each", "both", "either",
    "neither",
];

/// Capitalized words that open sentences but are not names.
const NON_NAME_WORDS: &[&str] = &[
    "The", "A", "An", "And", "But", "Or", "For", "Nor", "So", "Yet", "As", "Suddenly", "Meanwhile",
    "However", "Therefore", "Nevertheless", "Additionally", "Fortunately", "Unfortunately",
    "Importantly", "Interestingly",
];

/// Discourse markers that may precede a sentence subject.
pub const LEAD_WORDS: &[&str] = &[
    "Suddenly",
    "Meanwhile",
    "However",
    "Therefore",
    "Nevertheless",
    "Additionally",
];

/// Honorifics that prefix a name.
const TITLES: &[&str] = &[
    "dr", "mr", "mrs", "ms", "prof", "professor", "captain", "doctor", "sir", "lord", "lady",
];

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &["dr", "mr", "mrs", "ms", "prof", "st", "jr", "sr"];

const COMMON_FIRST_NAMES: &[&str] = &[
    "john", "jane", "mary", "james", "sarah", "michael", "emily", "david", "lisa", "robert",
    "susan", "william", "karen", "richard", "nancy", "charles", "betty", "thomas", "helen",
    "christopher", "sandra",
];

const COMMON_VERBS: &[&str] = &[
    "said", "says", "went", "came", "saw", "looked", "walked", "ran", "stood", "sat", "spoke",
    "told", "asked", "replied", "thought", "felt", "knew", "wanted", "needed", "took", "gave",
    "made",
];

const STRIP_CHARS: &[char] = &[
    '.', ',', '!', '?', ';', ':', '"', '\'', '(', ')', '\u{201c}', '\u{201d}', '\u{2018}',
    '\u{2019}',
];

/// Split text into trimmed, non-empty sentences.
///
/// Runs of `.`, `!`, and `?` end a sentence, except a lone period after a
/// title abbreviation ("Dr.") or a single-letter initial ("J.").
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }

        let mut end = i + c.len_utf8();
        let mut run_len = 1;
        while let Some(&(j, next)) = chars.peek() {
            if !is_terminator(next) {
                break;
            }
            end = j + next.len_utf8();
            run_len += 1;
            chars.next();
        }

        if c == '.' && run_len == 1 && is_abbreviation(last_word(&text[start..i]), &text[end..]) {
            continue;
        }

        push_trimmed(&mut sentences, &text[start..i]);
        start = end;
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, piece: &'a str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

fn last_word(s: &str) -> &str {
    s.split_whitespace()
        .last()
        .unwrap_or("")
        .trim_start_matches(STRIP_CHARS)
}

/// Whether the period after `word` belongs to it rather than ending the
/// sentence.
///
/// Title abbreviations always keep their period. A single capital counts as
/// an initial only when it is not a stopword ("I", "A") and the next word
/// continues a name.
fn is_abbreviation(word: &str, rest: &str) -> bool {
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            c.is_uppercase()
                && !is_excluded_word(&word.to_lowercase())
                && rest
                    .split_whitespace()
                    .next()
                    .is_some_and(|next| is_name_continuation(clean_word(next)))
        }
        (Some(_), Some(_)) => ABBREVIATIONS.contains(&word.to_lowercase().as_str()),
        _ => false,
    }
}

/// Split a sentence into raw whitespace-separated words.
pub fn split_words(sentence: &str) -> Vec<&str> {
    sentence.split_whitespace().collect()
}

/// Strip leading and trailing punctuation and quotes.
pub fn clean_word(word: &str) -> &str {
    word.trim_matches(STRIP_CHARS)
}

/// Check if the word starts with an uppercase letter.
pub fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// Check a lowercase word against the stopword lexicon.
pub fn is_excluded_word(lower: &str) -> bool {
    EXCLUDED_WORDS.contains(&lower)
}

/// Check a word against the sentence-opener lexicon.
pub fn is_common_non_name(word: &str) -> bool {
    NON_NAME_WORDS.contains(&word)
}

/// Check if a cleaned word is an honorific ("Dr", "Captain").
pub fn is_title(word: &str) -> bool {
    let bare = word.trim_end_matches('.');
    TITLES.contains(&bare.to_lowercase().as_str())
}

/// Check if a word is a single capital letter, optionally followed by a period.
pub fn is_initial(word: &str) -> bool {
    let mut chars = word.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(c), None, None) => c.is_ascii_uppercase(),
        (Some(c), Some('.'), None) => c.is_ascii_uppercase(),
        _ => false,
    }
}

fn is_stop_token(word: &str) -> bool {
    is_excluded_word(&word.to_lowercase()) || is_common_non_name(word)
}

/// Check if a cleaned word can open a name.
pub fn is_potential_name(word: &str) -> bool {
    word.chars().count() >= 2 && is_capitalized(word) && !is_stop_token(word) && !is_title(word)
}

/// Check if a cleaned word can extend a name that is already open.
///
/// Capitalized non-stopwords, initials, and hyphenated pairs such as
/// "Smith-Jones" all qualify.
pub fn is_name_continuation(word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    (is_capitalized(word) && !is_stop_token(word)) || is_initial(word)
}

/// Check that no word of a full name is a stopword and it is not a bare title.
pub fn is_valid_full_name(name: &str) -> bool {
    if name.chars().count() < 2 {
        return false;
    }
    let words: Vec<&str> = name.split(' ').collect();
    if words.len() == 1 && is_title(words[0]) {
        return false;
    }
    words.iter().all(|w| !is_stop_token(w))
}

/// Check if the name starts with an honorific followed by `.` or a space.
pub fn has_title(name: &str) -> bool {
    let lower = name.to_lowercase();
    TITLES.iter().any(|title| {
        lower
            .strip_prefix(title)
            .is_some_and(|rest| rest.starts_with('.') || rest.starts_with(' '))
    })
}

/// Check if the first token of a name is a common English first name.
pub fn is_common_first_name(name: &str) -> bool {
    name.split(' ')
        .next()
        .is_some_and(|first| COMMON_FIRST_NAMES.contains(&first.to_lowercase().as_str()))
}

/// Check if a word is one of the common narrative verbs.
pub fn is_common_verb(word: &str) -> bool {
    COMMON_VERBS.contains(&word.to_lowercase().as_str())
}

/// Check if a word is a permitted discourse lead-in.
pub fn is_lead_word(word: &str) -> bool {
    LEAD_WORDS.contains(&word)
}

/// Count case-insensitive whole-word occurrences of `name` in `text`.
///
/// Word boundaries are only required on sides where the name ends in a word
/// character, so "John F." still matches before a space.
pub fn count_mentions(text: &str, name: &str) -> u32 {
    if name.is_empty() {
        return 0;
    }
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';
    let head = if name.starts_with(is_word_char) { r"\b" } else { "" };
    let tail = if name.ends_with(is_word_char) { r"\b" } else { "" };

    Regex::new(&format!(r"(?i){head}{}{tail}", regex::escape(name)))
        .map(|re| re.find_iter(text).count() as u32)
        .unwrap_or(0)
}

/// Read a name starting at `words[start]`.
///
/// A name opens on a potential-name word, or on a title ("Dr.") directly
/// followed by a continuation word; the title keeps its period. It extends
/// while words are continuations and stops after a word carrying trailing
/// punctuation, since commas and quotes separate names in a list.
///
/// Returns the name and the number of words consumed.
pub fn read_name(words: &[&str], start: usize) -> Option<(String, usize)> {
    let raw = *words.get(start)?;
    let first = clean_word(raw);

    let mut parts: Vec<String> = Vec::new();
    let mut idx = start;

    if is_title(first) {
        let next = words.get(start + 1).map(|w| clean_word(w))?;
        if !is_name_continuation(next) || ends_run(raw, first) {
            return None;
        }
        parts.push(keep_period(raw, first));
        idx += 1;
    } else if !is_potential_name(first) {
        return None;
    }

    loop {
        let raw = words[idx];
        let word = clean_word(raw);
        if is_initial(word) {
            parts.push(keep_period(raw, word));
        } else {
            parts.push(word.to_string());
        }
        idx += 1;

        if ends_run(raw, word) {
            break;
        }
        match words.get(idx) {
            Some(next) if is_name_continuation(clean_word(next)) => {}
            _ => break,
        }
    }

    Some((parts.join(" "), idx - start))
}

/// The cleaned word, with its period restored when `raw` carries one
/// ("Dr.", "J.").
fn keep_period(raw: &str, cleaned: &str) -> String {
    let dotted = format!("{cleaned}.");
    if raw.trim_start_matches(STRIP_CHARS).starts_with(&dotted) {
        dotted
    } else {
        cleaned.to_string()
    }
}

/// Whether trailing punctuation on `raw` closes the name it belongs to.
///
/// Periods after titles and initials do not.
fn ends_run(raw: &str, cleaned: &str) -> bool {
    let tail = raw.trim_start_matches(STRIP_CHARS);
    let Some(rest) = tail.strip_prefix(cleaned) else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    !(rest == "." && (is_title(cleaned) || is_initial(cleaned)))
}
