//! Templated advice derived from a keyword analysis

/// CVs with fewer words than this are flagged as short.
pub const MIN_CV_WORDS: usize = 100;

/// CVs with more words than this are flagged as long.
pub const MAX_CV_WORDS: usize = 1000;

/// How many skills a single recommendation lists.
pub const MAX_LISTED_SKILLS: usize = 5;

/// Build the ordered recommendation list: score band, missing skills,
/// CV length, matching skills.
pub fn generate_recommendations(
    match_score: u8,
    matching_skills: &[String],
    missing_skills: &[String],
    cv: &str,
) -> Vec<String> {
    let mut recommendations: Vec<String> = score_band_messages(match_score)
        .iter()
        .map(|s| s.to_string())
        .collect();

    if !missing_skills.is_empty() && missing_skills.len() <= MAX_LISTED_SKILLS {
        recommendations.push(format!("📚 Priority skills to learn: {}", missing_skills.join(", ")));
    } else if missing_skills.len() > MAX_LISTED_SKILLS {
        recommendations.push(format!(
            "📚 Top skills to focus on: {}",
            missing_skills[..MAX_LISTED_SKILLS].join(", ")
        ));
    }

    let word_count = count_words(cv);
    if word_count < MIN_CV_WORDS {
        recommendations.push(
            "✍️ Your CV seems short. Add more details about your experience and accomplishments.".to_string(),
        );
    } else if word_count > MAX_CV_WORDS {
        recommendations.push(
            "📄 Your CV is quite detailed. Consider condensing it for better readability.".to_string(),
        );
    }

    if !matching_skills.is_empty() {
        let listed = &matching_skills[..matching_skills.len().min(MAX_LISTED_SKILLS)];
        recommendations.push(format!(
            "✅ Highlight these matching skills prominently: {}",
            listed.join(", ")
        ));
    }

    recommendations
}

fn score_band_messages(match_score: u8) -> [&'static str; 2] {
    match match_score {
        80..=u8::MAX => [
            "🎉 Excellent match! Your CV aligns very well with this job posting.",
            "📝 Consider tailoring your cover letter to highlight your matching skills.",
        ],
        60..=79 => [
            "👍 Good match! You have many of the required skills.",
            "📚 Consider gaining experience in the missing skills to improve your chances.",
        ],
        40..=59 => [
            "🤔 Partial match. You have some relevant skills but are missing key requirements.",
            "💡 Focus on acquiring the missing technical skills through courses or projects.",
        ],
        _ => [
            "⚠️ Low match. This position may require significant skill development.",
            "🎯 Consider roles that better match your current skill set, or invest time in learning the required skills.",
        ],
    }
}

/// Whitespace-separated word count.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_recommendation_ordering() {
        let recs = generate_recommendations(85, &skills(&["react", "node"]), &skills(&["go"]), &words(50));

        assert_eq!(recs.len(), 5);
        assert!(recs[0].contains("Excellent match"));
        assert!(recs[1].contains("cover letter"));
        assert_eq!(recs[2], "📚 Priority skills to learn: go");
        assert!(recs[3].contains("CV seems short"));
        assert_eq!(recs[4], "✅ Highlight these matching skills prominently: react, node");
    }

    #[test]
    fn test_score_bands() {
        let cv = words(500);
        assert!(generate_recommendations(80, &[], &[], &cv)[0].contains("Excellent match"));
        assert!(generate_recommendations(79, &[], &[], &cv)[0].contains("Good match"));
        assert!(generate_recommendations(60, &[], &[], &cv)[0].contains("Good match"));
        assert!(generate_recommendations(59, &[], &[], &cv)[0].contains("Partial match"));
        assert!(generate_recommendations(40, &[], &[], &cv)[0].contains("Partial match"));
        assert!(generate_recommendations(39, &[], &[], &cv)[0].contains("Low match"));
        assert!(generate_recommendations(0, &[], &[], &cv)[0].contains("Low match"));
    }

    #[test]
    fn test_many_missing_skills_are_capped() {
        let missing = skills(&["a", "b", "c", "d", "e", "f", "g"]);
        let recs = generate_recommendations(10, &[], &missing, &words(500));

        assert_eq!(recs.len(), 3);
        assert_eq!(recs[2], "📚 Top skills to focus on: a, b, c, d, e");
    }

    #[test]
    fn test_exactly_five_missing_uses_priority_wording() {
        let missing = skills(&["a", "b", "c", "d", "e"]);
        let recs = generate_recommendations(10, &[], &missing, &words(500));
        assert_eq!(recs[2], "📚 Priority skills to learn: a, b, c, d, e");
    }

    #[test]
    fn test_cv_length_limits() {
        let short = generate_recommendations(50, &[], &[], &words(99));
        assert!(short.iter().any(|r| r.contains("CV seems short")));

        let boundary_low = generate_recommendations(50, &[], &[], &words(100));
        assert_eq!(boundary_low.len(), 2);

        let boundary_high = generate_recommendations(50, &[], &[], &words(1000));
        assert_eq!(boundary_high.len(), 2);

        let long = generate_recommendations(50, &[], &[], &words(1001));
        assert!(long.iter().any(|r| r.contains("quite detailed")));
    }

    #[test]
    fn test_matching_skills_are_capped() {
        let matching = skills(&["a", "b", "c", "d", "e", "f"]);
        let recs = generate_recommendations(100, &matching, &[], &words(500));
        assert_eq!(
            recs.last().map(String::as_str),
            Some("✅ Highlight these matching skills prominently: a, b, c, d, e")
        );
    }

    #[test]
    fn test_word_count_ignores_extra_whitespace() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t "), 0);
        assert_eq!(count_words("  one\ttwo\n\nthree  "), 3);
    }
}
