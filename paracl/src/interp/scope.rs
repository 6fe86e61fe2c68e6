//! Scope stack for the interpreter
//!
//! Frames live in a single `Vec`, index 0 being the global frame. A function
//! call records the index of its parameter frame as a call base: while the
//! call is active, lookups see only the frames from that base upward plus the
//! global frame. The caller's frames stay on the stack untouched and become
//! visible again once the call returns.

use super::Value;
use std::collections::HashMap;

/// Bindings of one frame
pub type Frame = HashMap<String, Value>;

/// Stack-based scope management for the interpreter
#[derive(Debug)]
pub struct ScopeStack {
    /// Stack of frames, index 0 is global
    scopes: Vec<Frame>,
    /// Index of the parameter frame of each active call, innermost last
    calls: Vec<usize>,
}

impl ScopeStack {
    /// Create a new scope stack with an empty global frame
    pub fn new() -> Self {
        ScopeStack {
            scopes: vec![Frame::new()],
            calls: Vec::new(),
        }
    }

    /// First frame visible above the global one
    fn base(&self) -> usize {
        self.calls.last().copied().unwrap_or(1)
    }

    /// Index of the frame binding `name`, searching the visible chain
    /// innermost first and the global frame last
    fn find(&self, name: &str) -> Option<usize> {
        (self.base()..self.scopes.len())
            .rev()
            .chain(std::iter::once(0))
            .find(|&i| self.scopes[i].contains_key(name))
    }

    /// Push a block frame
    pub fn push_frame(&mut self) {
        self.scopes.push(Frame::new());
    }

    /// Pop the innermost block frame
    pub fn pop_frame(&mut self) {
        debug_assert!(
            self.scopes.len() > self.calls.last().map_or(1, |base| base + 1),
            "pop_frame without a matching push_frame"
        );
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Start a call whose only visible frames are `params` and the global one
    pub fn enter_call(&mut self, params: Frame) {
        self.calls.push(self.scopes.len());
        self.scopes.push(params);
    }

    /// End the innermost call, dropping its parameter and block frames
    pub fn leave_call(&mut self) {
        if let Some(base) = self.calls.pop() {
            self.scopes.truncate(base);
        }
    }

    /// Number of active calls
    pub fn call_depth(&self) -> usize {
        self.calls.len()
    }

    /// Total number of frames, global included
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Look up a variable in the visible chain
    pub fn resolve(&self, name: &str) -> Option<Value> {
        self.find(name).and_then(|i| self.scopes[i].get(name).copied())
    }

    /// Overwrite the nearest visible binding of `name`, or create it in the
    /// innermost frame
    pub fn assign(&mut self, name: &str, value: Value) {
        match self.find(name) {
            Some(i) => {
                self.scopes[i].insert(name.to_string(), value);
            }
            None => self.insert(name.to_string(), value),
        }
    }

    /// Define a variable in the innermost frame only
    pub fn insert(&mut self, name: String, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    /// Define a variable in the global frame
    pub fn define_global(&mut self, name: String, value: Value) {
        self.scopes[0].insert(name, value);
    }

    /// Check if a variable is visible
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Bindings of the global frame
    pub fn globals(&self) -> &Frame {
        &self.scopes[0]
    }

    /// Drop every frame and call above the global frame, keeping globals
    pub fn unwind(&mut self) {
        self.scopes.truncate(1);
        self.calls.clear();
    }

    /// Clear everything, leaving an empty global frame
    pub fn reset(&mut self) {
        self.unwind();
        self.scopes[0].clear();
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, i64)]) -> Frame {
        pairs
            .iter()
            .map(|(name, n)| (name.to_string(), Value::Int(*n)))
            .collect()
    }

    #[test]
    fn test_assign_at_top_level_is_global() {
        let mut stack = ScopeStack::new();
        stack.assign("x", Value::Int(42));
        assert_eq!(stack.resolve("x"), Some(Value::Int(42)));
        assert_eq!(stack.globals().get("x"), Some(&Value::Int(42)));
        assert_eq!(stack.resolve("y"), None);
    }

    #[test]
    fn test_block_frame_push_pop() {
        let mut stack = ScopeStack::new();
        stack.assign("x", Value::Int(1));

        stack.push_frame();
        stack.assign("y", Value::Int(2));
        assert_eq!(stack.resolve("x"), Some(Value::Int(1)));
        assert_eq!(stack.resolve("y"), Some(Value::Int(2)));

        stack.pop_frame();
        assert_eq!(stack.resolve("x"), Some(Value::Int(1)));
        assert_eq!(stack.resolve("y"), None);
    }

    #[test]
    fn test_assign_updates_outer_binding() {
        let mut stack = ScopeStack::new();
        stack.assign("x", Value::Int(1));

        stack.push_frame();
        stack.assign("x", Value::Int(99));
        stack.pop_frame();

        assert_eq!(stack.resolve("x"), Some(Value::Int(99)));
    }

    #[test]
    fn test_insert_shadows() {
        let mut stack = ScopeStack::new();
        stack.assign("x", Value::Int(1));

        stack.push_frame();
        stack.insert("x".to_string(), Value::Int(2));
        assert_eq!(stack.resolve("x"), Some(Value::Int(2)));

        stack.assign("x", Value::Int(3));
        stack.pop_frame();
        assert_eq!(stack.resolve("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_undefined_binding_is_not_unbound() {
        let mut stack = ScopeStack::new();
        stack.assign("u", Value::Undefined);
        assert_eq!(stack.resolve("u"), Some(Value::Undefined));
        assert!(stack.contains("u"));
        assert!(!stack.contains("v"));
    }

    #[test]
    fn test_call_hides_caller_locals() {
        let mut stack = ScopeStack::new();
        stack.assign("g", Value::Int(1));
        stack.push_frame();
        stack.assign("local", Value::Int(2));

        stack.enter_call(params(&[("p", 3)]));
        assert_eq!(stack.resolve("g"), Some(Value::Int(1)));
        assert_eq!(stack.resolve("p"), Some(Value::Int(3)));
        assert_eq!(stack.resolve("local"), None);
        stack.leave_call();

        assert_eq!(stack.resolve("local"), Some(Value::Int(2)));
        assert_eq!(stack.resolve("p"), None);
    }

    #[test]
    fn test_assign_in_call_creates_in_param_frame() {
        let mut stack = ScopeStack::new();
        stack.push_frame();
        stack.assign("t", Value::Int(1));

        stack.enter_call(Frame::new());
        stack.assign("t", Value::Int(5));
        assert_eq!(stack.resolve("t"), Some(Value::Int(5)));
        stack.leave_call();

        assert_eq!(stack.resolve("t"), Some(Value::Int(1)));
        assert!(!stack.globals().contains_key("t"));
    }

    #[test]
    fn test_assign_in_call_updates_global() {
        let mut stack = ScopeStack::new();
        stack.assign("counter", Value::Int(0));

        stack.enter_call(Frame::new());
        stack.assign("counter", Value::Int(1));
        stack.leave_call();

        assert_eq!(stack.resolve("counter"), Some(Value::Int(1)));
    }

    #[test]
    fn test_parameter_shadows_global() {
        let mut stack = ScopeStack::new();
        stack.assign("x", Value::Int(10));

        stack.enter_call(params(&[("x", 1)]));
        stack.assign("x", Value::Int(2));
        assert_eq!(stack.resolve("x"), Some(Value::Int(2)));
        stack.leave_call();

        assert_eq!(stack.resolve("x"), Some(Value::Int(10)));
    }

    #[test]
    fn test_nested_calls_are_isolated() {
        let mut stack = ScopeStack::new();
        stack.enter_call(params(&[("n", 3)]));
        stack.enter_call(params(&[("n", 2)]));
        assert_eq!(stack.call_depth(), 2);
        assert_eq!(stack.resolve("n"), Some(Value::Int(2)));
        stack.leave_call();
        assert_eq!(stack.resolve("n"), Some(Value::Int(3)));
        stack.leave_call();
        assert_eq!(stack.call_depth(), 0);
        assert_eq!(stack.resolve("n"), None);
    }

    #[test]
    fn test_leave_call_drops_block_frames() {
        let mut stack = ScopeStack::new();
        stack.enter_call(Frame::new());
        stack.push_frame();
        stack.push_frame();
        assert_eq!(stack.depth(), 4);
        stack.leave_call();
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_define_global_from_call() {
        let mut stack = ScopeStack::new();
        stack.enter_call(Frame::new());
        stack.push_frame();
        stack.define_global("f".to_string(), Value::Int(7));
        stack.leave_call();
        assert_eq!(stack.resolve("f"), Some(Value::Int(7)));
    }

    #[test]
    fn test_unwind_keeps_globals() {
        let mut stack = ScopeStack::new();
        stack.assign("x", Value::Int(1));
        stack.push_frame();
        stack.enter_call(Frame::new());

        stack.unwind();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.call_depth(), 0);
        assert_eq!(stack.resolve("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_reset() {
        let mut stack = ScopeStack::new();
        stack.assign("x", Value::Int(1));
        stack.push_frame();
        stack.assign("y", Value::Int(2));

        stack.reset();
        assert_eq!(stack.depth(), 1);
        assert!(!stack.contains("x"));
        assert!(!stack.contains("y"));

        stack.assign("z", Value::Int(3));
        assert_eq!(stack.resolve("z"), Some(Value::Int(3)));
    }

    #[test]
    fn test_deep_recursion_frames() {
        let mut stack = ScopeStack::new();
        for i in 0..1000 {
            stack.enter_call(params(&[("n", i)]));
        }
        assert_eq!(stack.call_depth(), 1000);
        assert_eq!(stack.resolve("n"), Some(Value::Int(999)));
        for _ in 0..1000 {
            stack.leave_call();
        }
        assert_eq!(stack.depth(), 1);
    }
}
