//! Shallow lexical helpers: tokens, overlap ratios, snippets, hosts.

use std::collections::HashSet;

use url::Url;

/// Snippets never exceed this many characters, ellipsis included.
pub const SNIPPET_MAX_CHARS: usize = 150;

const ELLIPSIS: &str = "...";

const POSITIVE_WORDS: &[&str] = &[
	"good", "great", "excellent", "useful", "helpful", "love", "best", "clear", "insightful",
	"interesting", "recommended", "solid", "elegant", "fast", "reliable",
];

const NEGATIVE_WORDS: &[&str] = &[
	"bad", "poor", "wrong", "broken", "confusing", "slow", "outdated", "misleading", "hate",
	"worst", "buggy", "flawed", "unreliable", "deprecated", "useless",
];

/// Lowercased alphanumeric tokens strictly longer than `min_len` characters, in order.
pub fn tokens(text: &str, min_len: usize) -> Vec<String> {
	text.split(|c: char| !c.is_alphanumeric())
		.filter(|t| t.chars().count() > min_len)
		.map(str::to_lowercase)
		.collect()
}

pub fn token_set(text: &str, min_len: usize, cap: Option<usize>) -> HashSet<String> {
	let all = tokens(text, min_len);
	match cap {
		Some(cap) => all.into_iter().take(cap).collect(),
		None => all.into_iter().collect(),
	}
}

/// |a ∩ b| / |a ∪ b|, zero when both are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
	let union = a.union(b).count();
	if union == 0 {
		return 0.0;
	}
	a.intersection(b).count() as f64 / union as f64
}

/// Share of `query` tokens that appear in `haystack`.
pub fn coverage(query: &HashSet<String>, haystack: &HashSet<String>) -> f64 {
	if query.is_empty() {
		return 0.0;
	}
	query.intersection(haystack).count() as f64 / query.len() as f64
}

pub fn truncate_snippet(text: &str) -> String {
	let text = text.trim();
	if text.chars().count() <= SNIPPET_MAX_CHARS {
		return text.to_string();
	}
	let keep = SNIPPET_MAX_CHARS - ELLIPSIS.len();
	let mut out: String = text.chars().take(keep).collect();
	out.truncate(out.trim_end().len());
	out.push_str(ELLIPSIS);
	out
}

/// Host of `raw` without a leading `www.`; `"unknown"` when it does not parse.
pub fn normalize_host(raw: &str) -> String {
	Url::parse(raw.trim())
		.ok()
		.and_then(|url| url.host_str().map(str::to_lowercase))
		.map(|host| host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
		.filter(|host| !host.is_empty())
		.unwrap_or_else(|| "unknown".to_string())
}

/// Word-list polarity in [-1, 1]; zero when no polar word occurs.
pub fn lexical_sentiment(text: &str) -> f64 {
	let (mut pos, mut neg) = (0usize, 0usize);
	for token in tokens(text, 1) {
		if POSITIVE_WORDS.contains(&token.as_str()) {
			pos += 1;
		} else if NEGATIVE_WORDS.contains(&token.as_str()) {
			neg += 1;
		}
	}
	if pos + neg == 0 {
		return 0.0;
	}
	(pos as f64 - neg as f64) / (pos + neg) as f64
}
