/// One step of a selector path.
///
/// # Examples
/// - `Meta` → `Field("Meta")`
/// - `Meta["app name"]` → `[Field("Meta"), Quoted("app name")]`
/// - `Tags[0]` → `[Field("Tags"), Index(0)]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Bare identifier, written after a dot or at the start of a selector
    Field(String),

    /// Quoted key in brackets, for keys containing reserved characters
    Quoted(String),

    /// Non-negative index in brackets
    Index(usize),
}

impl PathSegment {
    /// The key named by this segment, if it is a name rather than an index.
    pub fn key(&self) -> Option<&str> {
        match self {
            PathSegment::Field(name) | PathSegment::Quoted(name) => Some(name),
            PathSegment::Index(_) => None,
        }
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Field(name) => f.write_str(name),
            PathSegment::Quoted(name) => write!(f, "{:?}", name),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// An ordered, non-empty path into a datum.
///
/// Selectors are opaque to the parser beyond syntax; resolution happens at
/// evaluation time through a [`crate::resolver::Resolver`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    segments: Vec<PathSegment>,
}

impl Selector {
    /// Builds a selector from its segments.
    ///
    /// Returns `None` for an empty path.
    pub fn new(segments: Vec<PathSegment>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Selector { segments })
        }
    }

    /// Builds a selector of plain field names, e.g. `["Meta", "Tags"]`.
    pub fn fields<I, S>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selector::new(
            names
                .into_iter()
                .map(|n| PathSegment::Field(n.into()))
                .collect(),
        )
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
