use super::ScoredContributor;

/// Orders by descending score and assigns ranks `1..=N`; ties keep input order.
pub(super) fn assign_ranks(mut contributors: Vec<ScoredContributor>) -> Vec<ScoredContributor> {
    contributors.sort_by(|left, right| right.score.total_cmp(&left.score));
    for (index, contributor) in contributors.iter_mut().enumerate() {
        contributor.rank = index + 1;
    }
    contributors
}
