//! Ranking-pass prompt construction.

use verity_search::SourceItem;

use crate::types::{MAX_SUPPORTING_SOURCES, Quote, Verdict};

/// Domains the model must never cite as evidence.
pub const SOCIAL_MEDIA_DOMAINS: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "tiktok.com",
    "reddit.com",
    "youtube.com",
    "threads.net",
    "pinterest.com",
    "linkedin.com",
];

/// Build the single prompt sent for the ranking pass.
///
/// The prompt carries the literal quote, every candidate (url, title,
/// snippet), the four evaluation rules, the six allowed verdict labels,
/// and the exact JSON shape expected back.
pub fn build_ranking_prompt(quote: &Quote, candidates: &[SourceItem]) -> String {
    let mut prompt = String::from(
        "You are a meticulous, neutral fact-checker. A user wants to know whether the following quote is accurate.\n\n",
    );
    prompt.push_str(&format!("QUOTE:\n\"{}\"\n\n", quote.as_str()));

    prompt.push_str(&format!("CANDIDATE SOURCES ({}):\n", candidates.len()));
    for (index, item) in candidates.iter().enumerate() {
        prompt.push_str(&format!(
            "[{}] URL: {}\n    Title: {}\n    Snippet: {}\n",
            index + 1,
            item.url,
            item.title,
            item.snippet
        ));
    }

    let labels: Vec<String> = Verdict::all()
        .iter()
        .map(|v| format!("\"{}\"", v.label()))
        .collect();
    prompt.push_str(&format!(
        r#"
TASK:
1. Restate the single falsifiable claim made by the quote.
2. Evaluate the candidate sources using these rules:
   a. Relevance: keep only sources that directly address this specific claim; discard sources that merely share keywords.
   b. Credibility: prefer established news agencies, fact-checking organisations, and academic or research institutions; rank them highest.
   c. Bias: penalise sources with sensational, partisan, or emotionally loaded framing.
   d. Exclusion: never use social media content. Sources from these domains must not appear: {domains}.
3. Decide a verdict using exactly one of: {labels}.
4. Rank up to {MAX_SUPPORTING_SOURCES} supporting sources, rank 1 being the strongest evidence. Only use URLs from the candidate list.

OUTPUT:
Respond with one JSON object and nothing else: no markdown, no code fences, no commentary. Use this shape:
{{"quoteClaim": "<the falsifiable claim>", "finalVerdict": {{"verdict": "<one verdict label>", "summary": "<two or three neutral sentences>"}}, "supportingSources": [{{"rank": 1, "sourceUrl": "<url>", "title": "<page title>", "reasoning": "<why this source is relevant and credible>"}}]}}
"#,
        domains = SOCIAL_MEDIA_DOMAINS.join(", "),
        labels = labels.join(", "),
    ));

    prompt
}
