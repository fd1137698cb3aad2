use rand::Rng;

/// How many of the weakest knowledge points a remediation assignment targets.
pub(crate) const WEAK_POINT_COUNT: usize = 3;

#[derive(Debug, Clone)]
pub(crate) struct KnowledgePointMastery {
    pub(crate) knowledge_point: String,
    pub(crate) mastery_score: f64,
}

/// The (at most) three knowledge points with the lowest mastery, ascending.
pub(crate) fn weakest_points(mastery: &[KnowledgePointMastery]) -> Vec<String> {
    let mut sorted: Vec<&KnowledgePointMastery> = mastery.iter().collect();
    sorted.sort_by(|a, b| {
        a.mastery_score
            .partial_cmp(&b.mastery_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.knowledge_point.cmp(&b.knowledge_point))
    });
    sorted.into_iter().take(WEAK_POINT_COUNT).map(|p| p.knowledge_point.clone()).collect()
}

/// Uniform draw of `amount` items without replacement. Callers must check
/// the candidate pool is large enough first.
pub(crate) fn draw_without_replacement<T>(
    items: Vec<T>,
    amount: usize,
    rng: &mut impl Rng,
) -> Vec<T> {
    let indices = rand::seq::index::sample(rng, items.len(), amount.min(items.len()));
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    // sample() yields distinct indices, so every slot is taken at most once.
    indices.into_iter().filter_map(|index| slots[index].take()).collect()
}

pub(crate) fn default_title(weak_points: &[String]) -> String {
    format!("Knowledge reinforcement - {}", weak_points.join(", "))
}

pub(crate) fn default_description(weak_points: &[String]) -> String {
    format!("This practice set targets the following knowledge points: {}", weak_points.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn mastery(pairs: &[(&str, f64)]) -> Vec<KnowledgePointMastery> {
        pairs
            .iter()
            .map(|(name, score)| KnowledgePointMastery {
                knowledge_point: name.to_string(),
                mastery_score: *score,
            })
            .collect()
    }

    #[test]
    fn weakest_points_takes_three_lowest_ascending() {
        let points = mastery(&[
            ("stoichiometry", 0.9),
            ("redox", 0.2),
            ("kinetics", 0.5),
            ("equilibrium", 0.1),
            ("acids", 0.4),
        ]);
        assert_eq!(weakest_points(&points), vec!["equilibrium", "redox", "acids"]);
    }

    #[test]
    fn weakest_points_with_fewer_than_three_inputs() {
        let points = mastery(&[("redox", 0.7), ("kinetics", 0.3)]);
        assert_eq!(weakest_points(&points), vec!["kinetics", "redox"]);
    }

    #[test]
    fn weakest_points_breaks_ties_by_name() {
        let points = mastery(&[("b", 0.5), ("a", 0.5), ("c", 0.5), ("d", 0.5)]);
        assert_eq!(weakest_points(&points), vec!["a", "b", "c"]);
    }

    #[test]
    fn draw_returns_exact_count_of_distinct_items() {
        let mut rng = rand::thread_rng();
        let items: Vec<i32> = (0..20).collect();
        let drawn = draw_without_replacement(items, 5, &mut rng);

        assert_eq!(drawn.len(), 5);
        let distinct: HashSet<i32> = drawn.iter().copied().collect();
        assert_eq!(distinct.len(), 5);
        assert!(drawn.iter().all(|item| (0..20).contains(item)));
    }

    #[test]
    fn draw_of_full_pool_is_a_permutation() {
        let mut rng = rand::thread_rng();
        let drawn = draw_without_replacement(vec![1, 2, 3], 3, &mut rng);
        let mut sorted = drawn.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3]);
    }

    #[test]
    fn default_texts_name_the_weak_points() {
        let weak = vec!["redox".to_string(), "kinetics".to_string()];
        assert_eq!(default_title(&weak), "Knowledge reinforcement - redox, kinetics");
        assert!(default_description(&weak).contains("redox, kinetics"));
    }
}
