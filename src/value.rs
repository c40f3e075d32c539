use std::{
    any::{Any, TypeId},
    fmt::{self, Formatter},
    sync::Arc,
};

use paste::paste;

/// A value that can flow through the engine as an argument or as a
/// canned return value.
///
/// Implemented for every `'static` type that can be compared and
/// debug-printed, so users never implement it by hand.
pub trait ArgValue: Any + fmt::Debug + Send + Sync {
    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;

    #[doc(hidden)]
    fn dyn_eq(&self, other: &dyn ArgValue) -> bool;

    #[doc(hidden)]
    fn type_name(&self) -> &'static str;
}

impl<T: Any + fmt::Debug + PartialEq + Send + Sync> ArgValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn ArgValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Type-erased argument of a call event or payload of a response.
///
/// Cloning an `Arg` is cheap: the value itself is shared.
#[derive(Clone)]
pub struct Arg(Arc<dyn ArgValue>);

impl Arg {
    pub fn new<T: ArgValue>(value: T) -> Self {
        // never nest an `Arg` inside another one
        if let Some(arg) = (&value as &dyn Any).downcast_ref::<Arg>() {
            return arg.clone();
        }
        Arg(Arc::new(value))
    }

    /// Returns the wrapped value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value_type_id() == TypeId::of::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    pub(crate) fn value_type_id(&self) -> TypeId {
        self.0.as_any().type_id()
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(&*other.0)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Converts the concrete arguments of a call into [`Arg`]s.
///
/// Implemented for `()`, `Vec<Arg>` and tuples of up to ten values.
/// Single arguments must be wrapped in a one element tuple.
pub trait IntoArgs {
    fn into_args(self) -> Vec<Arg>;
}

impl IntoArgs for () {
    fn into_args(self) -> Vec<Arg> {
        vec![]
    }
}

impl IntoArgs for Vec<Arg> {
    fn into_args(self) -> Vec<Arg> {
        self
    }
}

// (a,b,c) => tuple!(b,c)
macro_rules! peel {
    ($idx:tt, $($other:tt,)*) => (tuple! { $($other,)* })
}

// implement IntoArgs for tuples of values
macro_rules! tuple {
    () => ();
    ($($idx:tt,)+) => (
        paste! {
            impl<$([<A $idx>]: ArgValue),+> IntoArgs for ($([<A $idx>],)+) {
                fn into_args(self) -> Vec<Arg> {
                    let ($([<a $idx>],)+) = self;
                    vec![$(Arg::new([<a $idx>])),+]
                }
            }
        }
        peel! { $($idx,)+ }
    )
}

tuple! { 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, }
