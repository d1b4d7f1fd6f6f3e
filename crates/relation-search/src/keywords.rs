//! Keyword extraction and intro snippets for cluster display.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Number of keywords attached to a cluster.
pub const DEFAULT_KEYWORD_LIMIT: usize = 4;
/// Intros longer than this are cut for display.
pub const SNIPPET_MAX_CHARS: usize = 150;

const SNIPPET_KEEP_CHARS: usize = 147;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{L}\p{N}\s]").expect("NON_WORD is a compile-time constant")
});

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // English
        "and", "the", "for", "with", "that", "this", "you", "your", "but", "are", "have", "has",
        "i", "im", "me", "we", "our", "us", "to", "of", "in", "on", "at", "is", "it", "be", "a",
        "an", "my", "by",
        // Korean particles and fillers
        "또", "그리고", "하지만", "그러나", "저는", "제가", "우리", "나", "있는", "하고",
        "하고있습니다", "합니다", "이에요", "입니다", "에서", "으로", "에게", "그리고요", "또한",
    ]
    .into_iter()
    .collect()
});

/// Most frequent tokens in `text`, at most `limit`.
///
/// Lower-cases, replaces anything that is not a letter, digit or whitespace
/// with a space, drops single-character tokens and stop words. Equal counts
/// keep first-seen order.
pub fn extract_top_keywords(text: &str, limit: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, " ");

    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in cleaned.split_whitespace() {
        if token.chars().count() <= 1 || STOP_WORDS.contains(token) {
            continue;
        }
        let count = counts.entry(token).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    // stable sort keeps first-seen order for ties
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.into_iter().take(limit).map(str::to_string).collect()
}

/// Trimmed intro, cut to 147 characters plus `...` when longer than 150.
pub fn intro_snippet(intro: &str) -> String {
    let intro = intro.trim();
    if intro.chars().count() > SNIPPET_MAX_CHARS {
        let cut: String = intro.chars().take(SNIPPET_KEEP_CHARS).collect();
        format!("{cut}...")
    } else {
        intro.to_string()
    }
}
