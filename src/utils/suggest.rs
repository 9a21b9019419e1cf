/// Lowercased alphanumerics only, so `video-id`, `videoId` and `video_id` compare equal.
fn fold(value: &str) -> Vec<char> {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn edit_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }
    row[b.len()]
}

fn contains(haystack: &[char], needle: &[char]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

fn distance(input: &[char], candidate: &[char]) -> usize {
    if input == candidate {
        return 0;
    }
    if contains(input, candidate) || contains(candidate, input) {
        return 1;
    }
    edit_distance(input, candidate)
}

fn tolerance(len: usize) -> usize {
    match len {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        _ => (len * 35 / 100).max(3),
    }
}

/// Closest candidates to `input`, best first, at most `limit` of them.
pub fn suggest(input: &str, candidates: &[String], limit: usize) -> Vec<String> {
    let folded = fold(input);
    if folded.is_empty() {
        return Vec::new();
    }
    let allowed = tolerance(folded.len());

    let mut scored: Vec<(usize, &String)> = candidates
        .iter()
        .filter_map(|candidate| {
            let other = fold(candidate);
            if other.is_empty() {
                return None;
            }
            let score = distance(&folded, &other);
            (score <= allowed).then_some((score, candidate))
        })
        .collect();
    scored.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.len().cmp(&b.1.len()))
            .then_with(|| a.1.cmp(b.1))
    });
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(limit.max(1))
        .map(|(_, candidate)| candidate.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn near_misses_are_found() {
        let tools = names(&["search_videos", "search_channels", "video_details", "my_channel"]);
        assert_eq!(suggest("search_video", &tools, 3), vec!["search_videos".to_string()]);
        assert_eq!(suggest("videoDetails", &tools, 3), vec!["video_details".to_string()]);
        assert_eq!(suggest("mychanel", &tools, 1), vec!["my_channel".to_string()]);
    }

    #[test]
    fn unrelated_input_yields_nothing() {
        let tools = names(&["like_video", "watch_history"]);
        assert!(suggest("zzzzzzzzzzzz", &tools, 3).is_empty());
        assert!(suggest("  ", &tools, 3).is_empty());
    }

    #[test]
    fn edit_distance_basics() {
        let a: Vec<char> = "kitten".chars().collect();
        let b: Vec<char> = "sitting".chars().collect();
        assert_eq!(edit_distance(&a, &b), 3);
        assert_eq!(edit_distance(&a, &[]), 6);
    }
}
