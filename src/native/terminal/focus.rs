//! Tab order over focusable controls.

use crate::native::control::ControlTree;
use crate::native::Handle;

/// Focusable controls of one window in depth-first order, with a cursor.
///
/// Rebuilt whenever the control tree changes. Focus survives a rebuild if the
/// focused control is still present.
#[derive(Debug, Default)]
pub struct FocusChain {
    nodes: Vec<Handle>,
    current: Option<usize>,
}

impl FocusChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, tree: &ControlTree, root: Option<Handle>) {
        let old = self.current();
        self.nodes.clear();
        self.current = None;
        let Some(root) = root else {
            return;
        };
        for id in tree.walk_depth_first(root) {
            if tree.get(id).is_ok_and(|c| c.state.is_focusable()) {
                self.nodes.push(id);
            }
        }
        if let Some(old) = old {
            self.current = self.nodes.iter().position(|&n| n == old);
        }
    }

    pub fn current(&self) -> Option<Handle> {
        self.current.and_then(|i| self.nodes.get(i).copied())
    }

    /// Move forward, wrapping.
    pub fn focus_next(&mut self) -> Option<Handle> {
        if self.nodes.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(i) => (i + 1) % self.nodes.len(),
            None => 0,
        };
        self.current = Some(next);
        self.current()
    }

    /// Move backward, wrapping.
    pub fn focus_previous(&mut self) -> Option<Handle> {
        if self.nodes.is_empty() {
            return None;
        }
        let prev = match self.current {
            Some(0) | None => self.nodes.len() - 1,
            Some(i) => i - 1,
        };
        self.current = Some(prev);
        self.current()
    }

    /// Focus `id` if it is in the chain.
    pub fn focus(&mut self, id: Handle) -> bool {
        match self.nodes.iter().position(|&n| n == id) {
            Some(pos) => {
                self.current = Some(pos);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::control::ControlState;

    fn tree() -> (ControlTree, Handle, Handle, Handle) {
        let mut tree = ControlTree::new();
        let root = tree.insert_root(ControlState::Window {
            title: "W".into(),
            visible: true,
            size: None,
            resizable: true,
        });
        tree.insert_child(root, ControlState::Label { text: "l".into() })
            .unwrap();
        let a = tree
            .insert_child(root, ControlState::Button { text: "a".into() })
            .unwrap();
        let b = tree
            .insert_child(
                root,
                ControlState::CheckBox {
                    text: "b".into(),
                    checked: false,
                },
            )
            .unwrap();
        (tree, root, a, b)
    }

    #[test]
    fn skips_unfocusable_controls() {
        let (tree, root, a, b) = tree();
        let mut chain = FocusChain::new();
        chain.rebuild(&tree, Some(root));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.focus_next(), Some(a));
        assert_eq!(chain.focus_next(), Some(b));
        assert_eq!(chain.focus_next(), Some(a));
    }

    #[test]
    fn previous_wraps_from_start() {
        let (tree, root, _a, b) = tree();
        let mut chain = FocusChain::new();
        chain.rebuild(&tree, Some(root));
        assert_eq!(chain.focus_previous(), Some(b));
    }

    #[test]
    fn rebuild_keeps_focus_when_possible() {
        let (mut tree, root, a, b) = tree();
        let mut chain = FocusChain::new();
        chain.rebuild(&tree, Some(root));
        assert!(chain.focus(b));
        chain.rebuild(&tree, Some(root));
        assert_eq!(chain.current(), Some(b));

        tree.remove(b);
        chain.rebuild(&tree, Some(root));
        assert_eq!(chain.current(), None);
        assert!(chain.focus(a));
    }

    #[test]
    fn no_root_means_empty_chain() {
        let (tree, _, _, _) = tree();
        let mut chain = FocusChain::new();
        chain.rebuild(&tree, None);
        assert!(chain.is_empty());
        assert_eq!(chain.focus_next(), None);
    }
}
