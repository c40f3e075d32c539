use std::fmt::{self, Formatter};

use crate::{
    matcher::{ArgMatcher, IntoArgMatchers},
    value::{Arg, IntoArgs},
};

/// The shape of a member access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Property,
    Indexer,
    Method,
}

/// Identity of an accessed member: its kind, name and arity.
///
/// A setup can only ever match a call whose `Member` is identical to
/// the one of its expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    kind: MemberKind,
    name: String,
    arity: usize,
}

/// Indexers have no name of their own.
const INDEXER_NAME: &str = "this";

impl Member {
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            MemberKind::Property => f.write_str(&self.name),
            MemberKind::Indexer => write!(f, "[{} args]", self.arity),
            MemberKind::Method => write!(f, "{}/{}", self.name, self.arity),
        }
    }
}

/// A single member access pattern, built once when a setup is
/// declared and compared structurally afterwards.
///
/// Two expressions are *equivalent* when they access the same
/// [`Member`] with pairwise-equal argument matchers. Equivalence is
/// what drives override bookkeeping and the reuse of fluent chain
/// prefixes.
///
/// ```
/// use standin::{matcher, Expression};
///
/// let a = Expression::method("send", (matcher::eq(3), matcher::any()));
/// let b = Expression::method("send", (matcher::eq(3), matcher::any()));
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "send(3, _)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Property { name: String },
    Indexer { args: Vec<ArgMatcher> },
    Method { name: String, args: Vec<ArgMatcher> },
}

impl Expression {
    pub fn property(name: impl Into<String>) -> Self {
        Expression::Property { name: name.into() }
    }

    pub fn indexer(args: impl IntoArgMatchers) -> Self {
        Expression::Indexer {
            args: args.into_arg_matchers(),
        }
    }

    pub fn method(name: impl Into<String>, args: impl IntoArgMatchers) -> Self {
        Expression::Method {
            name: name.into(),
            args: args.into_arg_matchers(),
        }
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            Expression::Property { .. } => MemberKind::Property,
            Expression::Indexer { .. } => MemberKind::Indexer,
            Expression::Method { .. } => MemberKind::Method,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Expression::Property { name } | Expression::Method { name, .. } => name,
            Expression::Indexer { .. } => INDEXER_NAME,
        }
    }

    pub fn args(&self) -> &[ArgMatcher] {
        match self {
            Expression::Property { .. } => &[],
            Expression::Indexer { args } | Expression::Method { args, .. } => args,
        }
    }

    pub fn member(&self) -> Member {
        Member {
            kind: self.kind(),
            name: self.name().to_owned(),
            arity: self.args().len(),
        }
    }

    pub(crate) fn accesses(&self, member: &Member) -> bool {
        self.kind() == member.kind
            && self.name() == member.name
            && self.args().len() == member.arity
    }
}

fn write_list<T>(
    f: &mut Formatter<'_>,
    items: &[T],
    item: fn(&T, &mut Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    let mut items = items.iter();
    if let Some(first) = items.next() {
        item(first, f)?;
    }
    items.try_for_each(|next| {
        f.write_str(", ")?;
        item(next, f)
    })
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Property { name } => f.write_str(name),
            Expression::Indexer { args } => {
                f.write_str("[")?;
                write_list(f, args, fmt::Display::fmt)?;
                f.write_str("]")
            }
            Expression::Method { name, args } => {
                write!(f, "{}(", name)?;
                write_list(f, args, fmt::Display::fmt)?;
                f.write_str(")")
            }
        }
    }
}

/// A live invocation on a substitute object, as handed over by the
/// call interception layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CallEvent {
    member: Member,
    args: Vec<Arg>,
}

impl CallEvent {
    pub fn property(name: impl Into<String>) -> Self {
        CallEvent {
            member: Member {
                kind: MemberKind::Property,
                name: name.into(),
                arity: 0,
            },
            args: vec![],
        }
    }

    pub fn indexer(args: impl IntoArgs) -> Self {
        let args = args.into_args();
        CallEvent {
            member: Member {
                kind: MemberKind::Indexer,
                name: INDEXER_NAME.to_owned(),
                arity: args.len(),
            },
            args,
        }
    }

    pub fn method(name: impl Into<String>, args: impl IntoArgs) -> Self {
        let args = args.into_args();
        CallEvent {
            member: Member {
                kind: MemberKind::Method,
                name: name.into(),
                arity: args.len(),
            },
            args,
        }
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }
}

impl fmt::Display for CallEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.member.kind {
            MemberKind::Property => f.write_str(&self.member.name),
            MemberKind::Indexer => {
                f.write_str("[")?;
                write_list(f, &self.args, fmt::Debug::fmt)?;
                f.write_str("]")
            }
            MemberKind::Method => {
                write!(f, "{}(", self.member.name)?;
                write_list(f, &self.args, fmt::Debug::fmt)?;
                f.write_str(")")
            }
        }
    }
}
