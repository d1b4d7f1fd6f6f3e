//! Facet ranking and cross-facet merge.

use crate::similarity::cosine_similarity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Default number of recommendations per facet.
pub const DEFAULT_PICK_LIMIT: usize = 4;

/// One of the three independent embedding channels of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    /// Free-form self introduction
    Intro,
    /// Work / occupation
    Work,
    /// Hobbies / interests
    Hobby,
}

impl Facet {
    /// All facets in display order.
    pub const ALL: [Facet; 3] = [Facet::Intro, Facet::Work, Facet::Hobby];

    /// Lowercase name, as used in vector metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            Facet::Intro => "intro",
            Facet::Work => "work",
            Facet::Hobby => "hobby",
        }
    }

    /// Vector index id for a profile's facet: `{profile_id}:{facet}`.
    pub fn vector_id(self, profile_id: &str) -> String {
        format!("{}:{}", profile_id, self.as_str())
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Facet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intro" => Ok(Facet::Intro),
            "work" => Ok(Facet::Work),
            "hobby" => Ok(Facet::Hobby),
            other => Err(format!("unknown facet: {other}")),
        }
    }
}

/// A ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    /// Candidate profile
    pub profile_id: String,
    /// Cosine similarity to the query
    pub similarity: f32,
    /// `1 - similarity`
    pub distance: f32,
}

impl ScoredMatch {
    /// Build a match from a similarity value.
    pub fn new(profile_id: impl Into<String>, similarity: f32) -> Self {
        Self {
            profile_id: profile_id.into(),
            similarity,
            distance: 1.0 - similarity,
        }
    }
}

/// Rank candidates by cosine similarity to `query`, best first.
///
/// Skips the `exclude` profile and any candidate whose similarity is
/// undefined. Ties keep candidate order.
pub fn rank<'a, I>(
    query: &[f32],
    candidates: I,
    exclude: Option<&str>,
    limit: usize,
) -> Vec<ScoredMatch>
where
    I: IntoIterator<Item = (&'a str, &'a [f32])>,
{
    let mut skipped = 0usize;
    let mut scored: Vec<ScoredMatch> = candidates
        .into_iter()
        .filter(|(id, _)| Some(*id) != exclude)
        .filter_map(|(id, vector)| match cosine_similarity(query, vector) {
            Some(sim) => Some(ScoredMatch::new(id, sim)),
            None => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        debug!(skipped, "Skipped candidates with undefined similarity");
    }

    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(limit);
    scored
}

/// Per-facet ranked lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetMatches {
    /// Matches by intro embedding
    pub intro: Vec<ScoredMatch>,
    /// Matches by work embedding
    pub work: Vec<ScoredMatch>,
    /// Matches by hobby embedding
    pub hobby: Vec<ScoredMatch>,
}

impl FacetMatches {
    /// Ranked list for one facet.
    pub fn get(&self, facet: Facet) -> &[ScoredMatch] {
        match facet {
            Facet::Intro => &self.intro,
            Facet::Work => &self.work,
            Facet::Hobby => &self.hobby,
        }
    }

    /// Mutable ranked list for one facet.
    pub fn get_mut(&mut self, facet: Facet) -> &mut Vec<ScoredMatch> {
        match facet {
            Facet::Intro => &mut self.intro,
            Facet::Work => &mut self.work,
            Facet::Hobby => &mut self.hobby,
        }
    }

    /// Whether every facet came back empty.
    pub fn is_empty(&self) -> bool {
        Facet::ALL.iter().all(|&f| self.get(f).is_empty())
    }
}

/// A profile matched on one or more facets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedMatch {
    /// Candidate profile
    pub profile_id: String,
    /// Best similarity across matched facets
    pub similarity: f32,
    /// `1 - similarity`
    pub distance: f32,
    /// Facets that matched, in intro/work/hobby order
    pub facets: Vec<Facet>,
}

/// Merge facet lists: per profile the maximum similarity, tagged with every
/// facet it appeared in. Sorted by similarity descending.
pub fn merge_facets(matches: &FacetMatches) -> Vec<MergedMatch> {
    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, MergedMatch> = HashMap::new();

    for facet in Facet::ALL {
        for m in matches.get(facet) {
            match merged.get_mut(&m.profile_id) {
                Some(existing) => {
                    if m.similarity > existing.similarity {
                        existing.similarity = m.similarity;
                        existing.distance = m.distance;
                    }
                    if !existing.facets.contains(&facet) {
                        existing.facets.push(facet);
                    }
                }
                None => {
                    order.push(m.profile_id.clone());
                    merged.insert(
                        m.profile_id.clone(),
                        MergedMatch {
                            profile_id: m.profile_id.clone(),
                            similarity: m.similarity,
                            distance: m.distance,
                            facets: vec![facet],
                        },
                    );
                }
            }
        }
    }

    let mut out: Vec<MergedMatch> = order
        .into_iter()
        .filter_map(|id| merged.remove(&id))
        .collect();
    out.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<(String, Vec<f32>)> {
        vec![
            ("me".into(), vec![1.0, 0.0]),
            ("close".into(), vec![0.9, 0.1]),
            ("far".into(), vec![-1.0, 0.2]),
            ("zero".into(), vec![0.0, 0.0]),
            ("short".into(), vec![1.0]),
            ("mid".into(), vec![0.5, 0.5]),
        ]
    }

    fn as_refs(c: &[(String, Vec<f32>)]) -> Vec<(&str, &[f32])> {
        c.iter().map(|(id, v)| (id.as_str(), v.as_slice())).collect()
    }

    #[test]
    fn test_rank_orders_and_excludes() {
        let c = candidates();
        let ranked = rank(&[1.0, 0.0], as_refs(&c), Some("me"), 10);
        let ids: Vec<_> = ranked.iter().map(|m| m.profile_id.as_str()).collect();
        assert_eq!(ids, ["close", "mid", "far"]);
        assert!(ranked.iter().all(|m| m.similarity.is_finite()));
        assert!((ranked[0].distance - (1.0 - ranked[0].similarity)).abs() < 1e-6);
    }

    #[test]
    fn test_rank_limit() {
        let c = candidates();
        let ranked = rank(&[1.0, 0.0], as_refs(&c), None, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].profile_id, "me");
    }

    #[test]
    fn test_rank_skips_other_lengths() {
        let mut c = candidates();
        c.push(("wide".into(), vec![1.0, 0.0, 0.0]));
        let ranked = rank(&[1.0, 0.0], as_refs(&c), None, 10);
        assert_eq!(ranked.len(), c.len() - 1);
        assert!(ranked.iter().all(|m| m.profile_id != "wide"));
    }

    #[test]
    fn test_zero_query_yields_nothing() {
        let c = candidates();
        assert!(rank(&[0.0, 0.0], as_refs(&c), None, 10).is_empty());
    }

    #[test]
    fn test_merge_takes_max_and_tags_facets() {
        let matches = FacetMatches {
            intro: vec![ScoredMatch::new("a", 0.5), ScoredMatch::new("b", 0.4)],
            work: vec![ScoredMatch::new("a", 0.9)],
            hobby: vec![ScoredMatch::new("c", 0.7), ScoredMatch::new("a", 0.1)],
        };
        let merged = merge_facets(&matches);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].profile_id, "a");
        assert!((merged[0].similarity - 0.9).abs() < 1e-6);
        assert_eq!(merged[0].facets, vec![Facet::Intro, Facet::Work, Facet::Hobby]);
        assert_eq!(merged[1].profile_id, "c");
        assert_eq!(merged[1].facets, vec![Facet::Hobby]);
        assert_eq!(merged[2].profile_id, "b");
    }

    #[test]
    fn test_facet_ids() {
        assert_eq!(Facet::Work.vector_id("p1"), "p1:work");
        assert_eq!("hobby".parse::<Facet>().unwrap(), Facet::Hobby);
        assert!("bio".parse::<Facet>().is_err());
    }
}
