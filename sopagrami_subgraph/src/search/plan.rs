use std::cmp::Reverse;

use super::Constraint;

/// One level of the backtracking search.
#[derive(Clone, Debug)]
pub(crate) struct PlanStep {
    /// Pattern vertex placed at this level.
    pub vertex: usize,
    /// Constraint to an already placed vertex whose image's adjacency
    /// supplies the candidates. `None` for the first level.
    pub anchor: Option<Constraint>,
    /// Remaining constraints to already placed vertices.
    pub checks: Vec<Constraint>,
}

/// Vertex order for one search.
#[derive(Clone, Debug)]
pub struct SearchPlan {
    pub(crate) steps: Vec<PlanStep>,
}

impl SearchPlan {
    /// Pattern vertices in placement order.
    pub fn order(&self) -> impl Iterator<Item = usize> + '_ {
        self.steps.iter().map(|s| s.vertex)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Build a plan over `constraints` (per pattern vertex) given the current
    /// domain sizes.
    ///
    /// The start is `first`, or else the vertex with the smallest domain
    /// (ties: higher degree, then lower id). Each later level takes an
    /// unplaced vertex adjacent to the placed set with the smallest domain
    /// (ties: more placed neighbours, then lower id).
    pub(crate) fn build(
        constraints: &[Vec<Constraint>],
        domain_sizes: &[usize],
        first: Option<usize>,
    ) -> Self {
        let k = constraints.len();
        let mut placed = vec![false; k];
        let mut steps = Vec::with_capacity(k);

        let start = first.filter(|&f| f < k).or_else(|| {
            (0..k).min_by_key(|&v| (domain_sizes[v], Reverse(constraints[v].len()), v))
        });
        let Some(start) = start else {
            return Self { steps };
        };
        placed[start] = true;
        steps.push(PlanStep {
            vertex: start,
            anchor: None,
            checks: Vec::new(),
        });

        while steps.len() < k {
            let placed_neighbours =
                |v: usize| constraints[v].iter().filter(|c| placed[c.other]).count();

            let next = (0..k)
                .filter(|&v| !placed[v] && placed_neighbours(v) > 0)
                .min_by_key(|&v| (domain_sizes[v], Reverse(placed_neighbours(v)), v))
                .or_else(|| (0..k).find(|&v| !placed[v]));
            let Some(next) = next else {
                break;
            };

            let mut towards_placed: Vec<Constraint> = constraints[next]
                .iter()
                .filter(|c| placed[c.other])
                .copied()
                .collect();
            let anchor = (!towards_placed.is_empty()).then(|| towards_placed.remove(0));

            placed[next] = true;
            steps.push(PlanStep {
                vertex: next,
                anchor,
                checks: towards_placed,
            });
        }

        Self { steps }
    }
}
