use crate::error::{Error, Result};
use serde_json::Value;

/// Name or positional index under which a finished frame merges into its
/// parent node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Label {
    Name(String),
    Index(usize),
}

impl Label {
    fn into_name(self) -> String {
        match self {
            Label::Name(name) => name,
            Label::Index(index) => index.to_string(),
        }
    }
}

#[derive(Debug)]
struct Frame {
    label: Label,
    node: Value,
}

/// Stack of in-progress document nodes mirroring the recursive field
/// traversal. The top frame is the node that scalar and container strategies
/// currently target; the stack holds at least the root frame for the whole
/// lifetime of a session.
#[derive(Debug)]
pub(crate) struct Context {
    stack: Vec<Frame>,
}

impl Context {
    pub fn with_root(node: Value) -> Self {
        Self {
            stack: vec![Frame {
                label: Label::Name(String::new()),
                node,
            }],
        }
    }

    pub fn push(&mut self, label: Label, node: Value) {
        self.stack.push(Frame { label, node });
    }

    pub fn current(&self) -> &Value {
        &self.stack.last().expect("cursor stack is empty").node
    }

    pub fn current_mut(&mut self) -> &mut Value {
        &mut self.stack.last_mut().expect("cursor stack is empty").node
    }

    /// Removes the top frame and merges its finished node into the parent,
    /// under the frame's label for objects or appended for arrays.
    pub fn pop_merge(&mut self) -> Result<()> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| Error::Message("cursor stack underflow".to_owned()))?;
        match self.current_mut() {
            Value::Object(fields) => {
                fields.insert(frame.label.into_name(), frame.node);
                Ok(())
            }
            Value::Array(items) => {
                items.push(frame.node);
                Ok(())
            }
            node => Err(Error::TypeMismatch(
                "container",
                crate::document::kind_name(node),
            )),
        }
    }

    /// Removes the top frame without touching the parent. Used on decode and
    /// on any encode error path, so an aborted session never leaves a
    /// partially merged document.
    pub fn pop_discard(&mut self) {
        self.stack.pop();
    }

    /// Writes a finished scalar node directly into the current frame, with no
    /// push/pop bracket.
    pub fn put(&mut self, label: Label, node: Value) -> Result<()> {
        match self.current_mut() {
            Value::Object(fields) => {
                fields.insert(label.into_name(), node);
                Ok(())
            }
            Value::Array(items) => {
                items.push(node);
                Ok(())
            }
            parent => Err(Error::TypeMismatch(
                "container",
                crate::document::kind_name(parent),
            )),
        }
    }

    /// Finishes a session, returning the root node.
    pub fn into_root(mut self) -> Result<Value> {
        match self.stack.pop() {
            Some(frame) if self.stack.is_empty() => Ok(frame.node),
            _ => Err(Error::Message(
                "cursor stack unbalanced at end of session".to_owned(),
            )),
        }
    }
}
