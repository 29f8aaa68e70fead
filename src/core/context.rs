//! Traversal context of one conversion, and the policy applied when a record cannot be
//! built.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::error::MapperError;
use crate::core::property::PropertyDescriptor;

/// One hop from the conversion root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Where the conversion started, e.g. the resource path of a bean.
    Root(&'a str),
    Property(&'a str),
    Index(usize),
    Key(&'a str),
}

/// Append-only chain of segments. Children borrow their parent, nothing is mutated.
#[derive(Debug, Clone, Copy)]
pub struct MappingContext<'a> {
    parent: Option<&'a MappingContext<'a>>,
    segment: Segment<'a>,
}

impl MappingContext<'static> {
    pub fn root() -> Self {
        Self {
            parent: None,
            segment: Segment::Root(""),
        }
    }
}

impl<'a> MappingContext<'a> {
    pub fn at(path: &'a str) -> Self {
        Self {
            parent: None,
            segment: Segment::Root(path),
        }
    }

    pub fn child(&'a self, segment: Segment<'a>) -> MappingContext<'a> {
        MappingContext {
            parent: Some(self),
            segment,
        }
    }

    pub fn segment(&self) -> Segment<'a> {
        self.segment
    }

    pub fn parent(&self) -> Option<&'a MappingContext<'a>> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.parent.map_or(0, |p| p.depth() + 1)
    }

    /// Dotted rendering of the chain, with `[i]` for sequence elements.
    pub fn path(&self) -> String {
        let mut segments = Vec::with_capacity(self.depth() + 1);
        let mut current = Some(self);
        while let Some(ctx) = current {
            segments.push(ctx.segment);
            current = ctx.parent;
        }

        let mut path = String::new();
        for segment in segments.into_iter().rev() {
            match segment {
                Segment::Root(root) => path.push_str(root),
                Segment::Property(name) | Segment::Key(name) => {
                    if !path.is_empty() {
                        path.push('.');
                    }
                    path.push_str(name);
                }
                Segment::Index(i) => {
                    path.push('[');
                    path.push_str(&i.to_string());
                    path.push(']');
                }
            }
        }
        path
    }
}

impl fmt::Display for MappingContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Called when a record field has neither a convertible value nor a default.
///
/// Returning `Ok` lets the record collapse to absent; returning an error aborts the whole
/// conversion call with it.
pub trait MappingErrorHandler: Send + Sync {
    fn handle(&self, property: &PropertyDescriptor, context: &MappingContext<'_>) -> Result<(), MapperError>;
}

impl<H: MappingErrorHandler + ?Sized> MappingErrorHandler for Arc<H> {
    fn handle(&self, property: &PropertyDescriptor, context: &MappingContext<'_>) -> Result<(), MapperError> {
        (**self).handle(property, context)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentErrorHandler;

impl MappingErrorHandler for SilentErrorHandler {
    fn handle(&self, property: &PropertyDescriptor, context: &MappingContext<'_>) -> Result<(), MapperError> {
        debug!(property = property.name(), path = %context, "record field has no value, record is absent");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StrictErrorHandler;

impl MappingErrorHandler for StrictErrorHandler {
    fn handle(&self, property: &PropertyDescriptor, context: &MappingContext<'_>) -> Result<(), MapperError> {
        warn!(property = property.name(), path = %context, "record field has no value");
        Err(MapperError::RecordFieldMissing {
            property: property.name().to_string(),
            path: context.path(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_renders_properties_keys_and_indexes() {
        let root = MappingContext::at("settings");
        let commands = root.child(Segment::Property("commands"));
        let save = commands.child(Segment::Key("save"));
        let args = save.child(Segment::Property("arguments"));
        let second = args.child(Segment::Index(1));

        assert_eq!(second.path(), "settings.commands.save.arguments[1]");
        assert_eq!(second.depth(), 4);
        assert_eq!(root.path(), "settings");
    }

    #[test]
    fn children_leave_parents_untouched() {
        let root = MappingContext::root();
        let a = root.child(Segment::Property("a"));
        let b = root.child(Segment::Property("b"));

        assert_eq!(a.path(), "a");
        assert_eq!(b.path(), "b");
        assert_eq!(root.path(), "");
        assert_eq!(a.parent().map(MappingContext::depth), Some(0));
    }
}
