//! Callable adapters.
//!
//! Slots call everything through one shape: a function from the signal's
//! argument tuple to its return type. The traits here adapt closures, plain
//! function pointers and "method" pointers (`fn(&T, ..)` bound to an object)
//! to that shape for every arity from zero to eight arguments.
//!
//! Function and method pointers also carry an identity so a signal can
//! disconnect them structurally. Closures have no identity and can only be
//! disconnected through their [`Connection`](crate::signal::Connection).

use std::sync::Weak;

/// Structural identity of a connected callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctorId {
    /// A closure or other function object. Never equal to anything.
    Anonymous,

    /// A plain function pointer, by address.
    Function(usize),

    /// A method pointer bound to an object, by object and method address.
    Method { object: usize, method: usize },
}

impl FunctorId {
    /// Check whether two identities refer to the same callable.
    ///
    /// Anonymous identities never match, not even themselves.
    pub fn matches(&self, other: &FunctorId) -> bool {
        !matches!(self, FunctorId::Anonymous) && self == other
    }
}

/// A closure or function object callable with the argument tuple `Args`.
///
/// Implemented for every `Fn(A0, .., An) -> R + Send + Sync + 'static` with
/// up to eight arguments.
pub trait Handler<Args, R>: Send + Sync + 'static {
    /// Call with the unpacked arguments.
    fn call(&self, args: Args) -> R;
}

/// A plain function pointer such as `fn(i32, i32) -> i32`.
pub trait FnPtr<Args, R>: Copy + Send + Sync + 'static {
    /// Address used for identity comparison.
    fn addr(self) -> usize;

    /// Call with the unpacked arguments.
    fn invoke(self, args: Args) -> R;
}

/// A method pointer `fn(&T, A0, .., An) -> R`.
pub trait MethodPtr<T, Args, R>: Copy + Send + Sync + 'static {
    /// Address used for identity comparison.
    fn addr(self) -> usize;

    /// Call on `object` with the unpacked arguments.
    fn invoke(self, object: &T, args: Args) -> R;
}

macro_rules! impl_callables {
    ($($arg:ident $param:ident),*) => {
        impl<F, R, $($arg,)*> Handler<($($arg,)*), R> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
        {
            fn call(&self, ($($param,)*): ($($arg,)*)) -> R {
                (self)($($param),*)
            }
        }

        impl<R: 'static, $($arg: 'static,)*> FnPtr<($($arg,)*), R> for fn($($arg),*) -> R {
            fn addr(self) -> usize {
                self as usize
            }

            fn invoke(self, ($($param,)*): ($($arg,)*)) -> R {
                self($($param),*)
            }
        }

        impl<T: 'static, R: 'static, $($arg: 'static,)*> MethodPtr<T, ($($arg,)*), R>
            for fn(&T, $($arg),*) -> R
        {
            fn addr(self) -> usize {
                self as usize
            }

            fn invoke(self, object: &T, ($($param,)*): ($($arg,)*)) -> R {
                self(object, $($param),*)
            }
        }
    };
}

impl_callables!();
impl_callables!(A0 a0);
impl_callables!(A0 a0, A1 a1);
impl_callables!(A0 a0, A1 a1, A2 a2);
impl_callables!(A0 a0, A1 a1, A2 a2, A3 a3);
impl_callables!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4);
impl_callables!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_callables!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_callables!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);

/// Type-erased callable stored inside a slot.
///
/// `invoke` returns `None` when the callable's bound object is gone.
pub(crate) struct Functor<Args, R> {
    id: FunctorId,
    invoke: Box<dyn Fn(Args) -> Option<R> + Send + Sync>,
}

impl<Args: 'static, R: 'static> Functor<Args, R> {
    pub(crate) fn from_handler<H>(handler: H) -> Self
    where
        H: Handler<Args, R>,
    {
        Self {
            id: FunctorId::Anonymous,
            invoke: Box::new(move |args| Some(handler.call(args))),
        }
    }

    pub(crate) fn from_fn<P>(function: P) -> Self
    where
        P: FnPtr<Args, R>,
    {
        Self {
            id: FunctorId::Function(function.addr()),
            invoke: Box::new(move |args| Some(function.invoke(args))),
        }
    }

    /// Bind `method` to `object` without keeping the object alive.
    pub(crate) fn from_method<T, M>(object: Weak<T>, method: M) -> Self
    where
        T: Send + Sync + 'static,
        M: MethodPtr<T, Args, R>,
    {
        Self {
            id: method_id(&object, method),
            invoke: Box::new(move |args| {
                let target = object.upgrade()?;
                Some(method.invoke(&target, args))
            }),
        }
    }

    pub(crate) fn invoke(&self, args: Args) -> Option<R> {
        (self.invoke)(args)
    }
}

impl<Args, R> Functor<Args, R> {
    pub(crate) fn id(&self) -> FunctorId {
        self.id
    }
}

/// Identity of `method` bound to the allocation behind `object`.
pub(crate) fn method_id<T, Args, R, M>(object: &Weak<T>, method: M) -> FunctorId
where
    M: MethodPtr<T, Args, R>,
{
    FunctorId::Method {
        object: Weak::as_ptr(object) as *const () as usize,
        method: method.addr(),
    }
}

impl<Args, R> std::fmt::Debug for Functor<Args, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Functor").field("id", &self.id).finish()
    }
}
