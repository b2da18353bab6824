//! Structural motif membership over the surviving edge set.

use std::collections::{HashMap, HashSet};

use super::spec::Motif;
use crate::graph::Edge;

const HUB_DEGREE: usize = 3;

pub(crate) struct MotifIndex<'a> {
	neighbours: HashMap<&'a str, HashSet<&'a str>>,
	directed: HashSet<(&'a str, &'a str)>,
}

impl<'a> MotifIndex<'a> {
	pub(crate) fn new(edges: &[&'a Edge]) -> Self {
		let mut neighbours: HashMap<&str, HashSet<&str>> = HashMap::new();
		let mut directed = HashSet::new();
		for &edge in edges {
			let (s, t) = (edge.source.as_str(), edge.target.as_str());
			neighbours.entry(s).or_default().insert(t);
			neighbours.entry(t).or_default().insert(s);
			directed.insert((s, t));
		}
		Self {
			neighbours,
			directed,
		}
	}

	fn degree(&self, id: &str) -> usize {
		self.neighbours.get(id).map_or(0, HashSet::len)
	}

	pub(crate) fn matches(&self, edge: &Edge, motif: Motif) -> bool {
		let (s, t) = (edge.source.as_str(), edge.target.as_str());
		match motif {
			Motif::Hub => self.degree(s) >= HUB_DEGREE || self.degree(t) >= HUB_DEGREE,
			Motif::Reciprocal => self.directed.contains(&(t, s)),
			Motif::Triangle => match (self.neighbours.get(s), self.neighbours.get(t)) {
				(Some(a), Some(b)) => a.iter().any(|n| *n != s && *n != t && b.contains(n)),
				_ => false,
			},
		}
	}

	pub(crate) fn matches_any(&self, edge: &Edge, motifs: &[Motif]) -> bool {
		motifs.is_empty() || motifs.iter().any(|m| self.matches(edge, *m))
	}
}
