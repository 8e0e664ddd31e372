//! Priority levels and priority requirements.
//!
//! Priorities form an explicit, *non-transitive* partial order: a priority
//! is greater than exactly the priorities it directly lists as lower, and
//! nothing else. Declaring `b` lower than `a` and `c` lower than `b` does
//! not make `c` lower than `a` unless it is listed there too. This is what
//! lets an expression grammar state precedence relations exactly, without
//! accidental orderings leaking in through transitivity.

use compact_str::CompactString;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// A named priority level with an explicit set of directly-lower levels.
///
/// Identity is the name alone; the `lower` set participates only in
/// comparisons.
///
/// # Examples
///
/// ```
/// use parlay::grammar::Priority;
///
/// let sum = Priority::new("sum", []);
/// let product = Priority::new("product", [sum.clone()]);
/// assert!(product.greater_than(&sum));
/// assert!(sum.less_than(&product));
/// ```
#[derive(Debug, Clone)]
pub struct Priority {
    name: CompactString,
    lower: Arc<[Priority]>,
}

impl Priority {
    pub fn new(name: impl Into<CompactString>, lower: impl IntoIterator<Item = Priority>) -> Self {
        Self {
            name: name.into(),
            lower: lower.into_iter().collect(),
        }
    }

    /// The priority used when a rule or terminal does not declare one.
    /// It relates to nothing, so only `=`-style requirements can match it.
    pub fn default_priority() -> Self {
        static DEFAULT: OnceLock<Priority> = OnceLock::new();
        DEFAULT.get_or_init(|| Self::new("default_priority", [])).clone()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The priorities directly declared lower than this one.
    #[must_use]
    pub fn lower(&self) -> &[Priority] {
        &self.lower
    }

    /// True iff `other` is directly listed as lower than this priority.
    #[must_use]
    pub fn greater_than(&self, other: &Self) -> bool {
        self.lower.contains(other)
    }

    #[must_use]
    pub fn less_than(&self, other: &Self) -> bool {
        other.greater_than(self)
    }

    /// Defined as "not less than": holds whenever no direct ordering says
    /// otherwise, mirroring the partial-order reading of `>=`.
    #[must_use]
    pub fn greater_than_or_equal_to(&self, other: &Self) -> bool {
        !self.less_than(other)
    }

    #[must_use]
    pub fn less_than_or_equal_to(&self, other: &Self) -> bool {
        !self.greater_than(other)
    }

    /// Build a requirement that candidates must be less than this priority.
    #[must_use]
    pub fn require_less_than(&self) -> Requirement {
        Requirement::new(RequirementOp::Lt, self.clone())
    }

    #[must_use]
    pub fn require_less_than_or_equal_to(&self) -> Requirement {
        Requirement::new(RequirementOp::Le, self.clone())
    }

    #[must_use]
    pub fn require_greater_than(&self) -> Requirement {
        Requirement::new(RequirementOp::Gt, self.clone())
    }

    #[must_use]
    pub fn require_greater_than_or_equal_to(&self) -> Requirement {
        Requirement::new(RequirementOp::Ge, self.clone())
    }

    #[must_use]
    pub fn require_equal_to(&self) -> Requirement {
        Requirement::new(RequirementOp::Eq, self.clone())
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Priority {}

impl Hash for Priority {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    /// Orders a directly-higher priority first, so action sets iterate
    /// from highest precedence down; unrelated priorities fall back to
    /// name order for reproducibility.
    fn cmp(&self, other: &Self) -> Ordering {
        if self.lower.contains(other) {
            Ordering::Less
        } else if other.lower.contains(self) {
            Ordering::Greater
        } else if self.name == other.name {
            Ordering::Equal
        } else {
            self.name.cmp(&other.name)
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One of the five comparison operators a [`Requirement`] can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequirementOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl RequirementOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "=",
        }
    }
}

/// A priority bound: an operator applied against a fixed priority,
/// evaluated over candidate priorities.
///
/// Requirements gate which rules a derivation slot accepts, both while
/// the parse table is built and again when a reduction inspects the
/// priorities of already-matched nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    op: RequirementOp,
    priority: Priority,
}

impl Requirement {
    #[must_use]
    pub const fn new(op: RequirementOp, priority: Priority) -> Self {
        Self { op, priority }
    }

    #[must_use]
    pub const fn op(&self) -> RequirementOp {
        self.op
    }

    #[must_use]
    pub const fn priority(&self) -> &Priority {
        &self.priority
    }

    /// Evaluate the requirement against a candidate priority.
    #[must_use]
    pub fn check(&self, candidate: &Priority) -> bool {
        match self.op {
            RequirementOp::Lt => candidate.less_than(&self.priority),
            RequirementOp::Le => candidate.less_than_or_equal_to(&self.priority),
            RequirementOp::Gt => candidate.greater_than(&self.priority),
            RequirementOp::Ge => candidate.greater_than_or_equal_to(&self.priority),
            RequirementOp::Eq => candidate == &self.priority,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.symbol(), self.priority)
    }
}
