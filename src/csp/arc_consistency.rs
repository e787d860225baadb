//! AC-3 propagation of overlap constraints.
//!
//! A pair of crossing variables `(x, y)` is arc consistent when every word left in `x`'s
//! domain has at least one word in `y`'s domain carrying the same letter at the crossing
//! cell. `ac3` keeps revising arcs until that holds for every arc or some domain empties.

use super::DomainStore;
use crate::crossword::{Crossword, VariableId};
use log::{debug, trace};
use std::collections::{HashSet, VecDeque};

/// A directed constraint: revise the first variable against the second
pub type DirectedArc = (VariableId, VariableId);

/// Make `x` arc consistent with `y`, returning whether `x`'s domain shrank
pub fn revise(crossword: &Crossword, domains: &mut DomainStore, x: VariableId, y: VariableId) -> bool {
    let Some((i, j)) = crossword.overlap(x, y) else {
        return false;
    };

    let supported: HashSet<u8> = domains
        .domain(y)
        .iter()
        .filter_map(|word| word.as_bytes().get(j).copied())
        .collect();

    let unsupported: Vec<String> = domains
        .domain(x)
        .iter()
        .filter(|word| {
            word.as_bytes()
                .get(i)
                .map_or(true, |letter| !supported.contains(letter))
        })
        .cloned()
        .collect();

    if unsupported.is_empty() {
        return false;
    }

    trace!("Revising {} against {}: removing {:?}", x, y, unsupported);
    domains.remove_all(x, &unsupported);
    true
}

/// Enforce arc consistency starting from `initial_arcs`, or from every arc of the crossword
/// when none are given. Returns `false` as soon as a domain becomes empty.
pub fn ac3(crossword: &Crossword, domains: &mut DomainStore, initial_arcs: Option<Vec<DirectedArc>>) -> bool {
    let mut queue: VecDeque<DirectedArc> = match initial_arcs {
        Some(arcs) => arcs.into(),
        None => crossword.arcs().into(),
    };

    let size_before = domains.total_size();
    let mut revisions = 0usize;

    while let Some((x, y)) = queue.pop_front() {
        if !revise(crossword, domains, x, y) {
            continue;
        }
        revisions += 1;

        if domains.size(x) == 0 {
            debug!(
                "AC-3 emptied the domain of {} after {} revisions",
                crossword.variable(x),
                revisions
            );
            return false;
        }

        queue.extend(
            crossword
                .neighbors(x)
                .iter()
                .filter(|&&z| z != y)
                .map(|&z| (z, x)),
        );
    }

    debug!(
        "AC-3 converged after {} revisions, removing {} candidates",
        revisions,
        size_before - domains.total_size()
    );
    true
}
