use ahash::AHashSet;
use sopagrami_common::VertexId;

/// Partial assignment of pattern vertices to data vertices.
pub(crate) struct State {
    mapping: Vec<Option<VertexId>>,
    used: AHashSet<VertexId>,
    placed: usize,
}

impl State {
    pub(crate) fn new(pattern_vertices: usize) -> Self {
        Self {
            mapping: vec![None; pattern_vertices],
            used: AHashSet::with_capacity(pattern_vertices),
            placed: 0,
        }
    }

    pub(crate) fn mapped_to(&self, p: usize) -> Option<VertexId> {
        self.mapping[p]
    }

    pub(crate) fn is_used(&self, d: VertexId) -> bool {
        self.used.contains(&d)
    }

    #[contracts::debug_requires(self.mapped_to(p).is_none())]
    #[contracts::debug_requires(!self.is_used(d))]
    #[contracts::debug_ensures(self.mapped_to(p) == Some(d) && self.is_used(d))]
    pub(crate) fn map(&mut self, p: usize, d: VertexId) {
        self.mapping[p] = Some(d);
        self.used.insert(d);
        self.placed += 1;
    }

    #[contracts::debug_requires(self.mapped_to(p) == Some(d))]
    #[contracts::debug_ensures(self.mapped_to(p).is_none() && !self.is_used(d))]
    pub(crate) fn unmap(&mut self, p: usize, d: VertexId) {
        self.mapping[p] = None;
        self.used.remove(&d);
        self.placed -= 1;
    }

    pub(crate) fn done(&self) -> bool {
        self.placed == self.mapping.len()
    }

    /// Full mapping; only meaningful once [`done`](Self::done) holds.
    #[contracts::debug_requires(self.done())]
    pub(crate) fn images(&self) -> Vec<VertexId> {
        self.mapping.iter().map(|d| d.unwrap_or(VertexId::MAX)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_and_unmap_round_trip() {
        let mut st = State::new(2);
        st.map(0, 7);
        assert!(st.is_used(7));
        assert!(!st.done());
        st.map(1, 3);
        assert!(st.done());
        assert_eq!(st.images(), vec![7, 3]);
        st.unmap(0, 7);
        assert!(!st.is_used(7));
        assert_eq!(st.mapped_to(0), None);
    }
}
