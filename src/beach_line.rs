//! The beach line: arcs are the leaves of an [`AvlTree`], breakpoints its
//! internal nodes. An in-order walk alternates arc, breakpoint, arc, ...
//! from left to right, and each breakpoint separates the arcs directly
//! before and after it.

use crate::{
    avl::{AvlTree, NodeId},
    dcel::HalfEdgeId,
    points::{SiteId, Sites},
    queue::QueueHandle,
    shape::Point,
    utils::breakpoint_x,
    Float,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arc {
    pub site: SiteId,
    /// pending circle event predicting where the arc disappears
    pub circle: Option<QueueHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoint {
    pub left: SiteId,
    pub right: SiteId,
    /// half-edge traced by the breakpoint, with the face of `right` on its
    /// left; it ends where the breakpoint dies
    pub edge: HalfEdgeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeachNode {
    Arc(Arc),
    Breakpoint(Breakpoint),
}

/// Arcs around a split point, left to right
#[derive(Debug, Clone, Copy)]
pub struct Split {
    pub left: NodeId,
    pub middle: NodeId,
    pub right: NodeId,
}

/// An arc with both neighbours, as needed by a circle event
#[derive(Debug, Clone, Copy)]
pub struct Neighborhood {
    pub left_arc: NodeId,
    pub left_breakpoint: NodeId,
    pub right_breakpoint: NodeId,
    pub right_arc: NodeId,
}

#[derive(Default)]
pub struct BeachLine {
    tree: AvlTree<BeachNode>,
}

impl BeachLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Room for the beach line of `sites` sites, which never exceeds `4n` nodes.
    pub fn with_capacity(sites: usize) -> Self {
        Self {
            tree: AvlTree::with_capacity(4 * sites, Default::default()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// tree height, for monitoring
    pub fn height(&self) -> i32 {
        self.tree.height()
    }

    pub fn arc(&self, id: NodeId) -> Option<&Arc> {
        match self.tree.get(id)? {
            BeachNode::Arc(arc) => Some(arc),
            BeachNode::Breakpoint(_) => None,
        }
    }

    pub fn arc_mut(&mut self, id: NodeId) -> Option<&mut Arc> {
        match self.tree.get_mut(id)? {
            BeachNode::Arc(arc) => Some(arc),
            BeachNode::Breakpoint(_) => None,
        }
    }

    pub fn breakpoint(&self, id: NodeId) -> Option<&Breakpoint> {
        match self.tree.get(id)? {
            BeachNode::Breakpoint(bp) => Some(bp),
            BeachNode::Arc(_) => None,
        }
    }

    pub fn generation(&self, id: NodeId) -> Option<u32> {
        self.tree.generation(id)
    }

    /// Whether `id` still names the arc it named at `generation`
    pub fn is_current_arc(&self, id: NodeId, generation: u32) -> bool {
        self.tree.is_current(id, generation) && self.arc(id).is_some()
    }

    /// Start the beach line with a single arc.
    pub fn init(&mut self, site: SiteId) -> Option<NodeId> {
        self.tree
            .insert_root(BeachNode::Arc(Arc { site, circle: None }))
            .ok()
    }

    /// Find the arc right above `point`, with the sweep line at `point.y`.
    /// A point exactly below a breakpoint belongs to the arc on its right.
    pub fn locate_arc(&self, point: Point, sites: &Sites) -> Option<(NodeId, Arc)> {
        let mut node = self.tree.root()?;
        loop {
            match self.tree.get(node)? {
                BeachNode::Arc(arc) => return Some((node, *arc)),
                BeachNode::Breakpoint(bp) => {
                    let x = breakpoint_x(sites.point(bp.left), sites.point(bp.right), point.y);
                    node = if point.x < x {
                        self.tree.left(node)?
                    } else {
                        self.tree.right(node)?
                    };
                }
            }
        }
    }

    pub fn prev_breakpoint(&self, arc: NodeId) -> Option<NodeId> {
        self.tree.predecessor(arc)
    }

    pub fn next_breakpoint(&self, arc: NodeId) -> Option<NodeId> {
        self.tree.successor(arc)
    }

    pub fn prev_arc(&self, arc: NodeId) -> Option<NodeId> {
        self.tree.predecessor(self.prev_breakpoint(arc)?)
    }

    pub fn next_arc(&self, arc: NodeId) -> Option<NodeId> {
        self.tree.successor(self.next_breakpoint(arc)?)
    }

    /// Both neighbours of a live arc, `None` when it sits at either end.
    pub fn neighborhood(&self, arc: NodeId) -> Option<Neighborhood> {
        self.arc(arc)?;
        let left_breakpoint = self.prev_breakpoint(arc)?;
        let right_breakpoint = self.next_breakpoint(arc)?;
        Some(Neighborhood {
            left_arc: self.tree.predecessor(left_breakpoint)?,
            left_breakpoint,
            right_breakpoint,
            right_arc: self.tree.successor(right_breakpoint)?,
        })
    }

    /// Replace `arc` by `[copy, new arc of site, copy]`. `left_edge` and
    /// `right_edge` are traced by the two new breakpoints.
    ///
    /// The old arc is released, so events naming it turn stale.
    pub fn split(
        &mut self,
        arc: NodeId,
        site: SiteId,
        left_edge: HalfEdgeId,
        right_edge: HalfEdgeId,
    ) -> Option<Split> {
        let old = *self.arc(arc)?;

        // two single level splices keep the rotations local
        let left = self.new_arc(old.site);
        let tmp = self.new_arc(site);
        let bp = self.tree.make_node(
            BeachNode::Breakpoint(Breakpoint {
                left: old.site,
                right: site,
                edge: left_edge,
            }),
            Some(left),
            Some(tmp),
        );
        self.tree.replace_leaf(arc, bp)?;

        let middle = self.new_arc(site);
        let right = self.new_arc(old.site);
        let bp = self.tree.make_node(
            BeachNode::Breakpoint(Breakpoint {
                left: site,
                right: old.site,
                edge: right_edge,
            }),
            Some(middle),
            Some(right),
        );
        self.tree.replace_leaf(tmp, bp)?;

        Some(Split {
            left,
            middle,
            right,
        })
    }

    /// Put a new arc of `site` right of `arc`, separated by a breakpoint
    /// tracing `edge`. Used while the first sites share the same y, when no
    /// arc has grown a parabola yet. Returns `(copy of arc, new arc)`.
    pub fn append(&mut self, arc: NodeId, site: SiteId, edge: HalfEdgeId) -> Option<(NodeId, NodeId)> {
        let old = *self.arc(arc)?;
        let left = self.new_arc(old.site);
        let right = self.new_arc(site);
        let bp = self.tree.make_node(
            BeachNode::Breakpoint(Breakpoint {
                left: old.site,
                right: site,
                edge,
            }),
            Some(left),
            Some(right),
        );
        self.tree.replace_leaf(arc, bp)?;
        Some((left, right))
    }

    /// Take `arc` out of the beach line. Its two breakpoints collapse into
    /// one, which becomes `merged`. Returns the surviving breakpoint node.
    pub fn remove_arc(&mut self, arc: NodeId, merged: Breakpoint) -> Option<NodeId> {
        let hood = self.neighborhood(arc)?;
        let parent = self.tree.parent(arc)?;

        // the parent goes with the leaf, the other breakpoint is an ancestor
        let survivor = if parent == hood.left_breakpoint {
            hood.right_breakpoint
        } else {
            hood.left_breakpoint
        };
        self.tree.collapse_leaf(arc)?;

        if let Some(BeachNode::Breakpoint(bp)) = self.tree.get_mut(survivor) {
            *bp = merged;
        }
        Some(survivor)
    }

    /// Arcs, left to right
    pub fn arcs(&self) -> impl Iterator<Item = (NodeId, &Arc)> {
        self.tree.iter().filter_map(|(id, node)| match node {
            BeachNode::Arc(arc) => Some((id, arc)),
            BeachNode::Breakpoint(_) => None,
        })
    }

    /// Breakpoints, left to right
    pub fn breakpoints(&self) -> impl Iterator<Item = (NodeId, &Breakpoint)> {
        self.tree.iter().filter_map(|(id, node)| match node {
            BeachNode::Breakpoint(bp) => Some((id, bp)),
            BeachNode::Arc(_) => None,
        })
    }

    /// Check the tree, the arc/breakpoint alternation, that breakpoints name
    /// their neighbouring arcs, and that they are sorted at `sweep_y`.
    pub fn verify(&self, sites: &Sites, sweep_y: Float, tolerance: Float) -> bool {
        if !self.tree.verify() {
            return false;
        }

        let nodes = self.tree.iter().map(|(_, n)| *n).collect::<Vec<_>>();
        if nodes.is_empty() {
            return true;
        }
        if nodes.len() % 2 == 0 {
            return false;
        }

        let mut last_x = Float::NEG_INFINITY;
        for (i, node) in nodes.iter().enumerate() {
            match (i % 2, node) {
                (0, BeachNode::Arc(_)) => {}
                (1, BeachNode::Breakpoint(bp)) => {
                    let (BeachNode::Arc(l), BeachNode::Arc(r)) = (nodes[i - 1], nodes[i + 1]) else {
                        return false;
                    };
                    if l.site != bp.left || r.site != bp.right {
                        return false;
                    }
                    let x = breakpoint_x(sites.point(bp.left), sites.point(bp.right), sweep_y);
                    if x < last_x - tolerance {
                        return false;
                    }
                    last_x = last_x.max(x);
                }
                _ => return false,
            }
        }
        true
    }

    fn new_arc(&mut self, site: SiteId) -> NodeId {
        self.tree
            .make_node(BeachNode::Arc(Arc { site, circle: None }), None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites() -> Sites {
        Sites::new(vec![
            Point::new(0., 10.),
            Point::new(-4., 6.),
            Point::new(5., 4.),
            Point::new(1., 2.),
        ])
        .unwrap()
    }

    fn site_sequence(beach_line: &BeachLine) -> Vec<u32> {
        beach_line.arcs().map(|(_, a)| a.site.as_u32()).collect()
    }

    #[test]
    fn test_split_and_locate() {
        let sites = sites();
        let mut beach_line = BeachLine::new();
        let (s0, s1, s2) = (SiteId(0), SiteId(1), SiteId(2));

        let root = beach_line.init(s0).unwrap();
        assert_eq!(beach_line.locate_arc(sites.point(s1), &sites).unwrap().0, root);
        assert!(beach_line.init(s1).is_none());

        let split = beach_line
            .split(root, s1, HalfEdgeId::from_index(0), HalfEdgeId::from_index(1))
            .unwrap();
        assert_eq!(site_sequence(&beach_line), vec![0, 1, 0]);
        assert!(beach_line.verify(&sites, 6., 1e-9));
        assert!(beach_line.arc(root).is_none());
        assert_eq!(beach_line.prev_arc(split.middle), Some(split.left));
        assert_eq!(beach_line.next_arc(split.middle), Some(split.right));
        assert_eq!(beach_line.prev_arc(split.left), None);

        // (5, 4) lies right of both breakpoints at y = 4
        let (arc, above) = beach_line.locate_arc(sites.point(s2), &sites).unwrap();
        assert_eq!(arc, split.right);
        assert_eq!(above.site, s0);
        beach_line
            .split(arc, s2, HalfEdgeId::from_index(2), HalfEdgeId::from_index(3))
            .unwrap();
        assert_eq!(site_sequence(&beach_line), vec![0, 1, 0, 2, 0]);
        assert!(beach_line.verify(&sites, 4., 1e-9));

        // each breakpoint keeps the half-edge with its right site's face
        let traced = beach_line
            .breakpoints()
            .map(|(_, bp)| (bp.left.as_u32(), bp.right.as_u32(), bp.edge.as_usize()))
            .collect::<Vec<_>>();
        assert_eq!(traced, vec![(0, 1, 0), (1, 0, 1), (0, 2, 2), (2, 0, 3)]);

        let hood = beach_line.neighborhood(split.middle).unwrap();
        assert_eq!(
            beach_line.breakpoint(hood.left_breakpoint).unwrap().right,
            s1
        );
        assert_eq!(beach_line.arc(hood.right_arc).unwrap().site, s0);
    }

    #[test]
    fn test_remove_arc() {
        let sites = sites();
        let mut beach_line = BeachLine::new();
        let (s0, s1, s2) = (SiteId(0), SiteId(1), SiteId(2));
        let root = beach_line.init(s0).unwrap();
        let first = beach_line
            .split(root, s1, HalfEdgeId::from_index(0), HalfEdgeId::from_index(1))
            .unwrap();
        let second = beach_line
            .split(first.right, s2, HalfEdgeId::from_index(2), HalfEdgeId::from_index(3))
            .unwrap();
        let generation = beach_line.generation(second.left).unwrap();

        // the s0 arc between s1 and s2 disappears
        let merged = Breakpoint {
            left: s1,
            right: s2,
            edge: HalfEdgeId::from_index(4),
        };
        let survivor = beach_line.remove_arc(second.left, merged).unwrap();
        assert_eq!(beach_line.breakpoint(survivor), Some(&merged));
        assert_eq!(site_sequence(&beach_line), vec![0, 1, 2, 0]);
        assert!(!beach_line.is_current_arc(second.left, generation));
        assert_eq!(beach_line.next_arc(first.middle), Some(second.middle));
        assert!(beach_line.verify(&sites, 0., 1e-6));

        // end arcs have no neighborhood, nothing changes
        assert!(beach_line.remove_arc(first.left, merged).is_none());
        assert_eq!(site_sequence(&beach_line), vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_append_on_top_row() {
        let sites = Sites::new(vec![
            Point::new(0., 0.),
            Point::new(2., 0.),
            Point::new(5., 0.),
        ])
        .unwrap();
        let mut beach_line = BeachLine::new();
        let mut last = beach_line.init(SiteId(0)).unwrap();
        for id in 1..3 {
            let site = SiteId(id);
            let (arc, _) = beach_line.locate_arc(sites.point(site), &sites).unwrap();
            assert_eq!(arc, last);
            let (_, right) = beach_line
                .append(arc, site, HalfEdgeId::from_index(id as usize))
                .unwrap();
            last = right;
        }
        assert_eq!(site_sequence(&beach_line), vec![0, 1, 2]);
        assert!(beach_line.verify(&sites, 0., 0.));
        assert!(beach_line.verify(&sites, -3., 1e-9));
    }

    #[test]
    fn test_many_splits_stay_balanced() {
        // sites on a descending diagonal always hit the rightmost arc
        let points = (0..200)
            .map(|i| Point::new(i as Float, -(i as Float)))
            .collect::<Vec<_>>();
        let sites = Sites::new(points).unwrap();
        let mut beach_line = BeachLine::new();
        beach_line.init(SiteId(0)).unwrap();
        for id in 1..200u32 {
            let site = SiteId(id);
            let p = sites.point(site);
            let (arc, _) = beach_line.locate_arc(p, &sites).unwrap();
            let edge = HalfEdgeId::from_index(2 * id as usize);
            beach_line
                .split(arc, site, edge, HalfEdgeId::from_index(2 * id as usize + 1))
                .unwrap();
            assert!(beach_line.verify(&sites, p.y, 1e-6));
        }
        assert_eq!(beach_line.arcs().count(), 2 * 200 - 1);
        assert!(beach_line.height() <= 2 * ((4 * 200) as Float).log2().ceil() as i32);
    }
}
