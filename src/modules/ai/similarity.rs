use uuid::Uuid;

use super::client::DuplicateMatch;

/// Cosine similarity in [-1, 1].
///
/// Returns `None` when the vectors are not comparable: different lengths,
/// empty, or either one has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    Some(score.clamp(-1.0, 1.0) as f32)
}

/// Score every candidate against `query` and keep those above `threshold`,
/// best first.
pub fn rank_by_similarity<'a, I>(
    query: &[f32],
    candidates: I,
    threshold: f32,
) -> Vec<DuplicateMatch>
where
    I: IntoIterator<Item = (Uuid, &'a [f32])>,
{
    let scored = candidates
        .into_iter()
        .filter_map(|(id, embedding)| {
            cosine_similarity(query, embedding).map(|score| DuplicateMatch { id, score })
        })
        .collect();

    retain_and_rank(scored, threshold)
}

/// Drop matches at or below `threshold` and sort descending by score.
/// Equal scores keep their input order.
pub fn retain_and_rank(mut matches: Vec<DuplicateMatch>, threshold: f32) -> Vec<DuplicateMatch> {
    matches.retain(|m| m.score.is_finite() && m.score > threshold);
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches
}
