use crate::parsers::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    Simple,
    Complex,
}

impl Topology {
    pub fn is_simple(self) -> bool {
        self == Topology::Simple
    }
}

///
/// Add the node votes of one way. End nodes vote once, inner nodes twice:
/// in a ring built from several ways the second vote for an end node comes
/// from the neighbouring way.
///
fn add_votes(nodes: &[NodeId], votes: &mut Vec<NodeId>) {
    if let (Some(first), Some(last)) = (nodes.first(), nodes.last()) {
        votes.push(*first);
        votes.push(*last);
    }
    if nodes.len() > 2 {
        for node in &nodes[1..nodes.len() - 1] {
            votes.push(*node);
            votes.push(*node);
        }
    }
}

/// True if every id in the sorted votes occurs exactly twice.
fn votes_pair_off(sorted: &[NodeId]) -> bool {
    if sorted.len() % 2 != 0 {
        return false;
    }

    let mut rest = sorted;
    while let Some(first) = rest.first() {
        let run = rest.iter().take_while(|node| *node == first).count();
        if run != 2 {
            return false;
        }
        rest = &rest[run..];
    }
    true
}

///
/// Decide without assembling rings whether the node references of the
/// given ways can only close into disjoint rings that neither branch nor
/// touch.
///
/// Ways with fewer than two nodes, or an empty way list, are complex.
///
pub fn classify_topology<'a, I>(member_ways: I) -> Topology
where
    I: IntoIterator<Item = &'a [NodeId]>,
{
    let mut votes = Vec::new();
    let mut num_ways = 0;

    for nodes in member_ways {
        if nodes.len() < 2 {
            return Topology::Complex;
        }
        add_votes(nodes, &mut votes);
        num_ways += 1;
    }

    if num_ways == 0 {
        return Topology::Complex;
    }

    votes.sort_unstable();
    if votes_pair_off(&votes) {
        Topology::Simple
    } else {
        Topology::Complex
    }
}
