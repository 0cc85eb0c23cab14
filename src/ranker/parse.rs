//! Extraction and validation of the ranking pass's reply.
//!
//! The reply is untrusted free text that may wrap the JSON object in prose
//! or code fences. The object is taken to span from the first `{` to the
//! last `}`; anything that fails strict decoding is rejected whole.

use serde::{Deserialize, Deserializer};

use super::prompt::SOCIAL_MEDIA_DOMAINS;
use crate::error::{Result, VerityError};
use crate::types::{MAX_SUPPORTING_SOURCES, RankedSource, Verdict, VerdictResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRanking {
    quote_claim: String,
    final_verdict: RawFinalVerdict,
    #[serde(default)]
    supporting_sources: Option<Vec<RawRankedSource>>,
}

#[derive(Debug, Deserialize)]
struct RawFinalVerdict {
    verdict: String,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRankedSource {
    #[serde(default, deserialize_with = "lenient_rank")]
    rank: Option<i64>,
    #[serde(default)]
    source_url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    reasoning: String,
}

/// Accept `1` and `"1"`; anything else becomes `None`.
fn lenient_rank<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<i64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Slice the candidate JSON object out of free text.
///
/// # Errors
///
/// [`VerityError::Parse`] when there is no `{`, no `}`, or the last `}`
/// comes before the first `{`.
pub fn extract_json_object(raw: &str) -> Result<&str> {
    let start = raw
        .find('{')
        .ok_or_else(|| VerityError::Parse("parse failure: no '{' in response".into()))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| VerityError::Parse("parse failure: no '}' in response".into()))?;
    if end < start {
        return Err(VerityError::Parse(
            "parse failure: closing brace precedes opening brace".into(),
        ));
    }
    Ok(&raw[start..=end])
}

/// Decode and validate a ranking reply into a [`VerdictResult`].
///
/// Failures are logged together with the raw reply.
///
/// # Errors
///
/// [`VerityError::Parse`] for missing braces, invalid JSON, missing
/// `quoteClaim`/`finalVerdict`, or a verdict outside the six labels.
pub fn parse_ranking_response(raw: &str) -> Result<VerdictResult> {
    let result = decode(raw);
    if let Err(ref err) = result {
        tracing::warn!(error = %err, raw = %raw, "could not parse ranking response");
    }
    result
}

fn decode(raw: &str) -> Result<VerdictResult> {
    let object = extract_json_object(raw)?;
    let ranking: RawRanking = serde_json::from_str(object)
        .map_err(|e| VerityError::Parse(format!("parse failure: {e}")))?;

    let verdict = Verdict::from_label(&ranking.final_verdict.verdict).ok_or_else(|| {
        VerityError::Parse(format!(
            "parse failure: unknown verdict label {:?}",
            ranking.final_verdict.verdict
        ))
    })?;

    Ok(VerdictResult {
        quote_claim: ranking.quote_claim.trim().to_string(),
        verdict,
        summary: ranking.final_verdict.summary.trim().to_string(),
        supporting_sources: normalize_sources(ranking.supporting_sources.unwrap_or_default()),
    })
}

/// Keep sources with a usable url and an in-range, unique rank.
///
/// Entries are sorted by the model's rank; for a repeated rank the first
/// occurrence wins. Social-media URLs are dropped even if the model cited
/// them. Survivors are then renumbered `1..=n` in that order so ranks stay
/// contiguous.
fn normalize_sources(raw: Vec<RawRankedSource>) -> Vec<RankedSource> {
    let max_rank = MAX_SUPPORTING_SOURCES as i64;
    let mut sources: Vec<RankedSource> = raw
        .into_iter()
        .filter_map(|s| {
            let rank = s.rank.filter(|r| (1..=max_rank).contains(r))?;
            let url = s.source_url.trim();
            if url.is_empty() || is_social_media(url) {
                return None;
            }
            Some(RankedSource {
                rank: u8::try_from(rank).ok()?,
                source_url: url.to_string(),
                title: s
                    .title
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
                reasoning: s.reasoning.trim().to_string(),
            })
        })
        .collect();

    sources.sort_by_key(|s| s.rank);
    sources.dedup_by_key(|s| s.rank);
    sources.truncate(MAX_SUPPORTING_SOURCES);
    for (position, source) in (1u8..).zip(sources.iter_mut()) {
        source.rank = position;
    }
    sources
}

fn is_social_media(raw_url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(raw_url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    SOCIAL_MEDIA_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_surrounding_prose() {
        let raw = r#"Here is the result: {"quoteClaim":"x","finalVerdict":{"verdict":"False","summary":"s"}} thanks"#;
        assert_eq!(
            extract_json_object(raw).expect("object"),
            r#"{"quoteClaim":"x","finalVerdict":{"verdict":"False","summary":"s"}}"#
        );
    }

    #[test]
    fn prose_wrapped_response_decodes() {
        let raw = r#"Here is the result: {"quoteClaim":"x","finalVerdict":{"verdict":"False","summary":"Not true."}} thanks"#;
        let result = parse_ranking_response(raw).expect("should parse");
        assert_eq!(result.quote_claim, "x");
        assert_eq!(result.verdict, Verdict::False);
        assert_eq!(result.summary, "Not true.");
        assert!(result.supporting_sources.is_empty());
    }

    #[test]
    fn bare_object_decodes() {
        let raw = r#"{"quoteClaim":"c","finalVerdict":{"verdict":"Factual","summary":"ok"},"supportingSources":[{"rank":1,"sourceUrl":"https://apnews.com/a","title":"AP","reasoning":"wire"}]}"#;
        let result = parse_ranking_response(raw).expect("should parse");
        assert_eq!(result.verdict, Verdict::Factual);
        assert_eq!(result.supporting_sources.len(), 1);
        assert_eq!(result.supporting_sources[0].title.as_deref(), Some("AP"));
    }

    #[test]
    fn code_fenced_object_decodes() {
        let raw = "```json\n{\"quoteClaim\":\"c\",\"finalVerdict\":{\"verdict\":\"Mostly False\",\"summary\":\"s\"}}\n```";
        let result = parse_ranking_response(raw).expect("should parse");
        assert_eq!(result.verdict, Verdict::MostlyFalse);
    }

    #[test]
    fn no_opening_brace_is_parse_failure() {
        let err = parse_ranking_response("I could not find any sources.").unwrap_err();
        assert_eq!(err.code(), "PARSE_FAILURE");
        assert_eq!(err.user_message(), "parse failure");
    }

    #[test]
    fn no_closing_brace_is_parse_failure() {
        let err = extract_json_object(r#"{"quoteClaim": "x""#).unwrap_err();
        assert!(matches!(err, VerityError::Parse(_)));
    }

    #[test]
    fn inverted_braces_are_parse_failure() {
        let err = extract_json_object("} nothing here {").unwrap_err();
        assert!(err.to_string().contains("precedes"));
    }

    #[test]
    fn malformed_json_is_parse_failure() {
        let err = parse_ranking_response(r#"{"quoteClaim": "x", "finalVerdict": }"#).unwrap_err();
        assert!(matches!(err, VerityError::Parse(_)));
    }

    #[test]
    fn missing_required_keys_is_parse_failure() {
        let err = parse_ranking_response(r#"{"quoteClaim": "x"}"#).unwrap_err();
        assert!(err.to_string().contains("finalVerdict"));

        let err = parse_ranking_response(r#"{"finalVerdict": {"verdict": "False"}}"#).unwrap_err();
        assert!(err.to_string().contains("quoteClaim"));
    }

    #[test]
    fn unknown_verdict_is_rejected() {
        let raw = r#"{"quoteClaim":"x","finalVerdict":{"verdict":"Half True","summary":"s"}}"#;
        let err = parse_ranking_response(raw).unwrap_err();
        assert!(err.to_string().contains("Half True"));
    }

    #[test]
    fn verdict_label_formatting_is_tolerated() {
        let raw = r#"{"quoteClaim":"x","finalVerdict":{"verdict":"misleading / lacks context","summary":"s"}}"#;
        let result = parse_ranking_response(raw).expect("should parse");
        assert_eq!(result.verdict, Verdict::MisleadingLacksContext);
    }

    fn source_json(rank: &str, url: &str) -> String {
        format!(r#"{{"rank":{rank},"sourceUrl":"{url}","reasoning":"r"}}"#)
    }

    fn ranks_of(result: &VerdictResult) -> Vec<u8> {
        result.supporting_sources.iter().map(|s| s.rank).collect()
    }

    fn with_sources(sources: &[String]) -> String {
        format!(
            r#"{{"quoteClaim":"x","finalVerdict":{{"verdict":"False","summary":"s"}},"supportingSources":[{}]}}"#,
            sources.join(",")
        )
    }

    #[test]
    fn sources_are_sorted_by_model_rank() {
        let raw = with_sources(&[
            source_json("3", "https://c.org"),
            source_json("1", "https://a.org"),
            source_json("2", "https://b.org"),
        ]);
        let result = parse_ranking_response(&raw).expect("should parse");
        let ranks: Vec<u8> = result.supporting_sources.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(result.supporting_sources[0].source_url, "https://a.org");
    }

    #[test]
    fn out_of_range_and_duplicate_ranks_are_dropped() {
        let raw = with_sources(&[
            source_json("0", "https://zero.org"),
            source_json("11", "https://eleven.org"),
            source_json("2", "https://first-two.org"),
            source_json("2", "https://second-two.org"),
            source_json("-1", "https://neg.org"),
        ]);
        let result = parse_ranking_response(&raw).expect("should parse");
        assert_eq!(result.supporting_sources.len(), 1);
        assert_eq!(result.supporting_sources[0].source_url, "https://first-two.org");
        assert_eq!(ranks_of(&result), vec![1]);
    }

    #[test]
    fn string_ranks_are_accepted() {
        let raw = with_sources(&[
            source_json("\"4\"", "https://four.org"),
            source_json("\"2\"", "https://two.org"),
        ]);
        let result = parse_ranking_response(&raw).expect("should parse");
        assert_eq!(result.supporting_sources[0].source_url, "https://two.org");
        assert_eq!(ranks_of(&result), vec![1, 2]);
    }

    #[test]
    fn at_most_ten_sources_survive() {
        let sources: Vec<String> = (1..=14)
            .map(|i| source_json(&i.to_string(), &format!("https://s{i}.org")))
            .collect();
        let result = parse_ranking_response(&with_sources(&sources)).expect("should parse");
        assert_eq!(ranks_of(&result), (1..=10).collect::<Vec<u8>>());
        assert_eq!(result.supporting_sources[9].source_url, "https://s10.org");
    }

    #[test]
    fn social_media_sources_are_dropped() {
        let raw = with_sources(&[
            source_json("1", "https://www.facebook.com/post/1"),
            source_json("2", "https://x.com/user/status/2"),
            source_json("3", "https://www.bbc.co.uk/news/3"),
        ]);
        let result = parse_ranking_response(&raw).expect("should parse");
        assert_eq!(result.supporting_sources.len(), 1);
        assert_eq!(result.supporting_sources[0].source_url, "https://www.bbc.co.uk/news/3");
        assert_eq!(ranks_of(&result), vec![1]);
    }

    #[test]
    fn ranks_stay_contiguous_after_filtering() {
        let raw = with_sources(&[
            source_json("1", "https://www.facebook.com/post/1"),
            source_json("2", "https://apnews.com/a"),
            source_json("2", "https://reuters.com/b"),
            source_json("4", "https://bbc.com/c"),
        ]);
        let result = parse_ranking_response(&raw).expect("should parse");
        let urls: Vec<&str> = result
            .supporting_sources
            .iter()
            .map(|s| s.source_url.as_str())
            .collect();
        assert_eq!(urls, vec!["https://apnews.com/a", "https://bbc.com/c"]);
        assert_eq!(ranks_of(&result), vec![1, 2]);
    }

    #[test]
    fn empty_titles_become_none_and_blank_urls_are_dropped() {
        let raw = with_sources(&[
            r#"{"rank":1,"sourceUrl":"https://a.org","title":"  ","reasoning":"r"}"#.to_string(),
            r#"{"rank":2,"sourceUrl":"  ","reasoning":"r"}"#.to_string(),
        ]);
        let result = parse_ranking_response(&raw).expect("should parse");
        assert_eq!(result.supporting_sources.len(), 1);
        assert_eq!(result.supporting_sources[0].title, None);
    }

    #[test]
    fn null_sources_are_treated_as_empty() {
        let raw = r#"{"quoteClaim":"x","finalVerdict":{"verdict":"Unverifiable","summary":""},"supportingSources":null}"#;
        let result = parse_ranking_response(raw).expect("should parse");
        assert!(result.supporting_sources.is_empty());
    }

    #[test]
    fn lookalike_domains_are_not_social_media() {
        assert!(!is_social_media("https://notfacebook.com/a"));
        assert!(is_social_media("https://m.facebook.com/a"));
        assert!(!is_social_media("not a url"));
    }
}
