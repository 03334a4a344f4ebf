use crate::candidate::Candidate;
use crate::rules::TierRules;
use url::Url;

/// Characters the downstream platform reserves for a shortened `http://`
/// link appended to a post.
pub const HTTP_URL_RESERVATION: usize = 23;
/// Reservation for `https://` links (two characters longer on the wire).
pub const HTTPS_URL_RESERVATION: usize = 25;

/// Result of validating one attempt's candidate set.
#[derive(Debug)]
pub struct ValidationOutcome {
    pub accepted: Vec<Candidate>,
    pub rejections: Vec<String>,
}

impl ValidationOutcome {
    /// A set is valid only when it holds exactly the required count. A
    /// superset or subset fails the whole attempt; nothing is truncated or
    /// padded.
    pub fn satisfies(&self, required_count: usize) -> bool {
        self.accepted.len() == required_count
    }
}

/// Characters to reserve for the source link, if any. Unknown schemes get
/// the `http` reservation.
pub fn url_reservation(source_url: Option<&str>) -> usize {
    let Some(source_url) = source_url else {
        return 0;
    };
    match Url::parse(source_url) {
        Ok(url) if url.scheme() == "https" => HTTPS_URL_RESERVATION,
        _ => HTTP_URL_RESERVATION,
    }
}

/// Filter candidates against the tier's constraints. Acceptance is
/// per-candidate; the caller decides whether the surviving set satisfies
/// the required count. Rejection reasons are kept for attempt diagnostics.
pub fn validate_candidates(
    candidates: Vec<Candidate>,
    rules: &TierRules,
    source_url: Option<&str>,
) -> ValidationOutcome {
    let reservation = url_reservation(source_url);
    let max_chars = rules.max_chars as usize;

    let mut accepted = Vec::with_capacity(candidates.len());
    let mut rejections = Vec::new();

    for candidate in candidates {
        let effective_len = candidate.char_len + reservation;
        if effective_len > max_chars {
            rejections.push(format!(
                "{:?}: effective length {effective_len} exceeds {max_chars}",
                candidate.text
            ));
            continue;
        }

        let hashtag_count = candidate.hashtags.len();
        if !rules.hashtag_policy.allowed && hashtag_count > 0 {
            rejections.push(format!(
                "{:?}: hashtags not allowed for this tier ({hashtag_count} found)",
                candidate.text
            ));
            continue;
        }
        if let Some(max_count) = rules.hashtag_policy.max_count {
            if hashtag_count > max_count as usize {
                rejections.push(format!(
                    "{:?}: {hashtag_count} hashtags exceed limit of {max_count}",
                    candidate.text
                ));
                continue;
            }
        }

        accepted.push(candidate);
    }

    ValidationOutcome {
        accepted,
        rejections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::HashtagPolicy;

    fn tier(max_chars: u32, allowed: bool, max_count: Option<u32>) -> TierRules {
        TierRules {
            base_prompt_template: "${count} posts".into(),
            max_chars,
            hashtag_policy: HashtagPolicy { allowed, max_count },
            token_budget: 300,
            examples: Vec::new(),
            post_count: 3,
        }
    }

    fn candidates(texts: &[&str]) -> Vec<Candidate> {
        texts.iter().map(|text| Candidate::new(*text)).collect()
    }

    #[test]
    fn url_reservation_distinguishes_schemes() {
        assert_eq!(url_reservation(None), 0);
        assert_eq!(url_reservation(Some("http://example.com/a")), 23);
        assert_eq!(url_reservation(Some("https://example.com/a")), 25);
        // Scheme not determinable: default to the http reservation.
        assert_eq!(url_reservation(Some("example.com/a")), 23);
    }

    #[test]
    fn https_reservation_pushes_long_candidate_over_limit() {
        let rules = tier(280, true, None);
        let long = "x".repeat(260);

        let with_url = validate_candidates(
            candidates(&[&long]),
            &rules,
            Some("https://example.com/post"),
        );
        assert!(with_url.accepted.is_empty());
        assert!(with_url.rejections[0].contains("285 exceeds 280"));

        let without_url = validate_candidates(candidates(&[&long]), &rules, None);
        assert_eq!(without_url.accepted.len(), 1);
    }

    #[test]
    fn hashtags_rejected_when_disallowed() {
        let rules = tier(280, false, None);
        let outcome = validate_candidates(
            candidates(&["Hello world #fun", "Second post", "Third post"]),
            &rules,
            None,
        );
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.rejections.len(), 1);
        assert!(outcome.rejections[0].contains("hashtags not allowed"));
        assert!(!outcome.satisfies(3));
    }

    #[test]
    fn hashtag_count_bound_enforced_regardless_of_length() {
        let rules = tier(280, true, Some(2));
        let outcome = validate_candidates(
            candidates(&["Short #a #b #c", "Fine #a #b"]),
            &rules,
            None,
        );
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].text, "Fine #a #b");
        assert!(outcome.rejections[0].contains("3 hashtags exceed limit of 2"));
    }

    #[test]
    fn exact_count_satisfies_but_superset_does_not() {
        let rules = tier(280, true, None);
        let three = validate_candidates(candidates(&["a", "b", "c"]), &rules, None);
        assert!(three.satisfies(3));

        let four = validate_candidates(candidates(&["a", "b", "c", "d"]), &rules, None);
        assert!(!four.satisfies(3));
        // The extra candidate is not silently dropped.
        assert_eq!(four.accepted.len(), 4);
    }

    #[test]
    fn length_at_exact_boundary_accepted() {
        let rules = tier(10, true, None);
        let outcome = validate_candidates(candidates(&["0123456789"]), &rules, None);
        assert_eq!(outcome.accepted.len(), 1);

        let over = validate_candidates(candidates(&["0123456789a"]), &rules, None);
        assert!(over.accepted.is_empty());
    }

    #[test]
    fn order_of_accepted_candidates_preserved() {
        let rules = tier(280, false, None);
        let outcome = validate_candidates(
            candidates(&["first", "bad #tag", "second", "third"]),
            &rules,
            None,
        );
        let texts: Vec<&str> = outcome.accepted.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }
}
