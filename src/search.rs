use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::model::{NodeIndex, SessionGraph};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub node: NodeIndex,
    pub score: i64,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Nodes whose name or id fuzzily matches `query`, best first.
pub fn search_nodes(graph: &SessionGraph, query: &str) -> Vec<SearchHit> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut hits = graph
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(node, record)| {
            let by_name = (!record.name.is_empty())
                .then(|| fuzzy_match_score(&matcher, &record.name, query))
                .flatten();
            let by_id = fuzzy_match_score(&matcher, &record.id, query);
            by_name.max(by_id).map(|score| SearchHit { node, score })
        })
        .collect::<Vec<_>>();

    hits.sort_by(|a, b| b.score.cmp(&a.score).then(a.node.cmp(&b.node)));
    hits
}
