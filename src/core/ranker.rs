use crate::models::Candidate;

/// Order eligible candidates by composite score, best (lowest) first.
///
/// Stable sort: candidates with equal scores keep the order they arrived in
/// from the fetcher.
pub fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Pick the best-scoring candidate out of the eligible list.
///
/// Returns `None` when the list is empty; the orchestrator maps that to its
/// empty-result error.
pub fn select_best(mut candidates: Vec<Candidate>) -> Option<Candidate> {
    rank(&mut candidates);
    candidates.into_iter().next()
}
