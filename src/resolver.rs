//! Selector resolution.
//!
//! A [`Resolver`] navigates a [`Selector`] through a datum and reports the
//! value found there, or absence. The evaluator only talks to this trait, so
//! hosts with their own data representation can plug in a resolver of their
//! own; [`PathResolver`] covers [`Value`].

use std::{borrow::Cow, fmt, sync::Arc};

use crate::{
    ast::{PathSegment, Selector},
    value::Value,
};

/// Error type returned by value hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Transforms values reached while resolving a selector.
///
/// Called with the segment just stepped through and the value found there.
/// `Ok(Some(v))` replaces the value, `Ok(None)` keeps it as is, and an error
/// aborts the evaluation.
pub type ValueHook =
    Arc<dyn Fn(&PathSegment, &Value) -> Result<Option<Value>, HookError> + Send + Sync>;

/// Wraps a closure as a [`ValueHook`].
pub fn hook<F>(f: F) -> ValueHook
where
    F: Fn(&PathSegment, &Value) -> Result<Option<Value>, HookError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Options a resolver receives with every lookup.
#[derive(Clone, Copy)]
pub struct ResolveOptions<'a> {
    /// Tag under which record fields carry their selector alias
    pub tag_name: &'a str,
    /// Optional value transform applied after every step
    pub hook: Option<&'a ValueHook>,
}

impl fmt::Debug for ResolveOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveOptions")
            .field("tag_name", &self.tag_name)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

/// Failures while resolving a selector. Unlike absence, these abort the
/// evaluation.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("value hook failed at segment {segment} of '{selector}': {source}")]
    Hook {
        selector: String,
        segment: String,
        #[source]
        source: HookError,
    },

    #[error("cannot step through {kind} with segment {segment} of '{selector}'")]
    NotTraversable {
        selector: String,
        segment: String,
        kind: &'static str,
    },

    #[error("segment {segment} of '{selector}' is not valid on {kind}")]
    InvalidSegment {
        selector: String,
        segment: String,
        kind: &'static str,
    },

    #[error("{0}")]
    Custom(String),
}

/// Looks up selectors in a datum.
pub trait Resolver {
    type Datum: ?Sized;

    /// Returns the value at `selector`, or `None` if the path is absent.
    fn resolve<'d>(
        &self,
        datum: &'d Self::Datum,
        selector: &Selector,
        options: &ResolveOptions<'_>,
    ) -> Result<Option<Cow<'d, Value>>, ResolverError>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    type Datum = R::Datum;

    fn resolve<'d>(
        &self,
        datum: &'d Self::Datum,
        selector: &Selector,
        options: &ResolveOptions<'_>,
    ) -> Result<Option<Cow<'d, Value>>, ResolverError> {
        (**self).resolve(datum, selector, options)
    }
}

/// Resolver over [`Value`] trees.
///
/// - Objects: `Field`/`Quoted` segments look up keys; `Index` segments look
///   up the decimal key (`[0]` → `"0"`).
/// - Arrays: `Index` segments; out of range is absent.
/// - Records: fields by their visible name under the tag name.
/// - Null: anything below it is absent.
///
/// Stepping into other scalars, naming a field on an array, or indexing a
/// record is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathResolver;

impl Resolver for PathResolver {
    type Datum = Value;

    fn resolve<'d>(
        &self,
        datum: &'d Value,
        selector: &Selector,
        options: &ResolveOptions<'_>,
    ) -> Result<Option<Cow<'d, Value>>, ResolverError> {
        let mut current = Cow::Borrowed(datum);

        for segment in selector.segments() {
            let next = match current {
                Cow::Borrowed(value) => {
                    step(value, segment, selector, options.tag_name)?.map(Cow::Borrowed)
                }
                Cow::Owned(ref value) => step(value, segment, selector, options.tag_name)?
                    .cloned()
                    .map(Cow::Owned),
            };
            let Some(next) = next else {
                return Ok(None);
            };

            current = match options.hook {
                Some(transform) => match transform(segment, &next) {
                    Ok(Some(replaced)) => Cow::Owned(replaced),
                    Ok(None) => next,
                    Err(source) => {
                        return Err(ResolverError::Hook {
                            selector: format_selector(selector),
                            segment: segment.to_string(),
                            source,
                        });
                    }
                },
                None => next,
            };
        }

        Ok(Some(current))
    }
}

/// One navigation step. `Ok(None)` means absent.
fn step<'v>(
    value: &'v Value,
    segment: &PathSegment,
    selector: &Selector,
    tag_name: &str,
) -> Result<Option<&'v Value>, ResolverError> {
    match (value, segment) {
        (Value::Object(map), PathSegment::Field(key) | PathSegment::Quoted(key)) => {
            Ok(map.get(key))
        }
        (Value::Object(map), PathSegment::Index(index)) => Ok(map.get(&index.to_string())),
        (Value::Array(arr), PathSegment::Index(index)) => Ok(arr.get(*index)),
        (Value::Record(record), PathSegment::Field(key) | PathSegment::Quoted(key)) => {
            Ok(record.get(key, tag_name).map(|f| &f.value))
        }
        (Value::Null, _) => Ok(None),
        (Value::Array(_) | Value::Record(_), _) => Err(ResolverError::InvalidSegment {
            selector: format_selector(selector),
            segment: segment.to_string(),
            kind: value.type_name(),
        }),
        (v, _) => Err(ResolverError::NotTraversable {
            selector: format_selector(selector),
            segment: segment.to_string(),
            kind: v.type_name(),
        }),
    }
}

fn format_selector(selector: &Selector) -> String {
    crate::output::selector_to_string(selector)
}
