//! Lexical scope stack.
//!
//! Frames are small, so each one is a vector searched linearly; this also
//! keeps iteration order equal to declaration order. The analyzer keeps a
//! `ScopeStack<Type>` and the generator an independent `ScopeStack<i64>` of
//! array lower bounds.

#[derive(Debug, Clone)]
pub struct ScopeStack<V> {
    frames: Vec<Vec<(String, V)>>,
}

impl<V> ScopeStack<V> {
    /// A stack holding only the global frame.
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Vec::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(Vec::new());
    }

    /// Drop the innermost frame. The global frame is never popped.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind `name` in the innermost frame.
    ///
    /// Returns `false` and leaves the frame untouched when the name is
    /// already bound in that same frame. Shadowing an outer frame is fine.
    #[must_use]
    pub fn declare(&mut self, name: impl Into<String>, value: V) -> bool {
        let name = name.into();
        let Some(frame) = self.frames.last_mut() else {
            return false;
        };
        if frame.iter().any(|(n, _)| *n == name) {
            return false;
        }
        frame.push((name, value));
        true
    }

    /// Innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&V> {
        self.frames.iter().rev().find_map(|frame| {
            frame
                .iter()
                .find_map(|(n, v)| if n == name { Some(v) } else { None })
        })
    }
}

impl<V> Default for ScopeStack<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_in_same_frame() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.declare("x", 1));
        assert!(!scopes.declare("x", 2));
        assert_eq!(scopes.lookup("x"), Some(&1));
    }

    #[test]
    fn inner_frame_shadows_outer() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.declare("x", 1));
        scopes.push();
        assert!(scopes.declare("x", 2));
        assert_eq!(scopes.lookup("x"), Some(&2));
        scopes.pop();
        assert_eq!(scopes.lookup("x"), Some(&1));
    }

    #[test]
    fn lookup_falls_back_to_outer_frames() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.declare("g", 'g'));
        scopes.push();
        assert!(scopes.declare("l", 'l'));
        assert_eq!(scopes.lookup("g"), Some(&'g'));
        assert_eq!(scopes.lookup("l"), Some(&'l'));
        assert_eq!(scopes.lookup("missing"), None);
        scopes.pop();
        assert_eq!(scopes.lookup("l"), None);
    }

    #[test]
    fn global_frame_survives_extra_pops() {
        let mut scopes: ScopeStack<i64> = ScopeStack::new();
        scopes.pop();
        scopes.pop();
        assert_eq!(scopes.depth(), 1);
        assert!(scopes.declare("a", 0));
    }
}
