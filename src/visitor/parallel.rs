use crate::{
    ast::Node,
    visitor::{VisitAction, VisitInfo, Visitor},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Lane {
    Active,
    /// Skipping the subtree of a node entered this many levels above.
    Skipping(usize),
    Stopped,
}

/// Runs several visitors in lockstep over a single walk.
///
/// Each visitor skips and stops on its own: a visitor skipping a node is not
/// called for anything below it, while the others still are. When a visitor
/// asks for an edit, that edit is applied and the remaining visitors are not
/// called for that node. The walk skips a subtree only when every visitor
/// skips it, and stops once every visitor stopped.
pub struct ParallelVisitor<V> {
    visitors: Vec<V>,
    lanes: Vec<Lane>,
}

impl<V> ParallelVisitor<V> {
    /// Composes the given visitors, called in the given order.
    pub fn new(visitors: Vec<V>) -> Self {
        let lanes = vec![Lane::Active; visitors.len()];
        Self { visitors, lanes }
    }

    /// Gives the visitors back.
    pub fn into_inner(self) -> Vec<V> {
        self.visitors
    }

    fn all(&self, f: impl Fn(Lane) -> bool) -> bool {
        self.lanes.iter().all(|l| f(*l))
    }

    /// Reverts lane bookkeeping for a node that will not be left.
    fn undo_enter(&mut self, bumped: &[usize], skipped: &[usize]) {
        for &i in bumped {
            if let Lane::Skipping(depth) = &mut self.lanes[i] {
                *depth -= 1;
            }
        }
        for &i in skipped {
            self.lanes[i] = Lane::Active;
        }
    }
}

impl<C, V: Visitor<C>> Visitor<C> for ParallelVisitor<V> {
    fn enter(&mut self, cx: &mut C, node: &Node, info: &VisitInfo<'_>) -> VisitAction {
        let mut bumped = Vec::new();
        let mut skipped = Vec::new();
        let mut edit = None;

        for (i, visitor) in self.visitors.iter_mut().enumerate() {
            match &mut self.lanes[i] {
                Lane::Stopped => {}
                Lane::Skipping(depth) => {
                    *depth += 1;
                    bumped.push(i);
                }
                Lane::Active if edit.is_some() => {}
                lane @ Lane::Active => match visitor.enter(cx, node, info) {
                    VisitAction::Continue => {}
                    VisitAction::Skip => {
                        *lane = Lane::Skipping(0);
                        skipped.push(i);
                    }
                    VisitAction::Stop => *lane = Lane::Stopped,
                    action @ (VisitAction::Replace(_) | VisitAction::Delete) => edit = Some(action),
                },
            }
        }

        match edit {
            Some(VisitAction::Delete) => {
                self.undo_enter(&bumped, &skipped);
                VisitAction::Delete
            }
            Some(action) => action,
            None if self.all(|l| l == Lane::Stopped) => VisitAction::Stop,
            None if self.all(|l| l != Lane::Active) => {
                self.undo_enter(&bumped, &skipped);
                VisitAction::Skip
            }
            None => VisitAction::Continue,
        }
    }

    fn leave(&mut self, cx: &mut C, node: &Node, info: &VisitInfo<'_>) -> VisitAction {
        let mut edit = None;

        for (i, visitor) in self.visitors.iter_mut().enumerate() {
            match &mut self.lanes[i] {
                Lane::Stopped => {}
                lane @ Lane::Skipping(0) => *lane = Lane::Active,
                Lane::Skipping(depth) => *depth -= 1,
                Lane::Active if edit.is_some() => {}
                lane @ Lane::Active => match visitor.leave(cx, node, info) {
                    VisitAction::Continue | VisitAction::Skip => {}
                    VisitAction::Stop => *lane = Lane::Stopped,
                    action @ (VisitAction::Replace(_) | VisitAction::Delete) => edit = Some(action),
                },
            }
        }

        match edit {
            Some(action) => action,
            None if self.all(|l| l == Lane::Stopped) => VisitAction::Stop,
            None => VisitAction::Continue,
        }
    }
}
