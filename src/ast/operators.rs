/// Match operators applied by a leaf predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOperator {
    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,

    // Membership
    /// Value-first membership (`"prod" in Tags`)
    In,
    /// Negated value-first membership (`"prod" not in Tags`)
    NotIn,
    /// Selector-first membership (`Tags contains "prod"`)
    Contains,
    /// Negated selector-first membership (`Tags not contains "prod"`)
    NotContains,

    // Emptiness
    /// `is empty`
    IsEmpty,
    /// `is not empty`
    IsNotEmpty,

    // Regex
    /// `matches`
    Matches,
    /// `not matches`
    NotMatches,
}

impl MatchOperator {
    /// Whether the operator takes a literal operand.
    pub fn takes_value(self) -> bool {
        !matches!(self, MatchOperator::IsEmpty | MatchOperator::IsNotEmpty)
    }

    /// Whether the operator is the negated form of another one.
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            MatchOperator::NotEqual
                | MatchOperator::NotIn
                | MatchOperator::NotContains
                | MatchOperator::IsNotEmpty
                | MatchOperator::NotMatches
        )
    }

    /// Surface spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchOperator::Equal => "==",
            MatchOperator::NotEqual => "!=",
            MatchOperator::In => "in",
            MatchOperator::NotIn => "not in",
            MatchOperator::Contains => "contains",
            MatchOperator::NotContains => "not contains",
            MatchOperator::IsEmpty => "is empty",
            MatchOperator::IsNotEmpty => "is not empty",
            MatchOperator::Matches => "matches",
            MatchOperator::NotMatches => "not matches",
        }
    }
}

impl std::fmt::Display for MatchOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
