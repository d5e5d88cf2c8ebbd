use crate::RequestContext;

/// Represents a handler function: a context followed by positional arguments
pub trait FnTrait<Args> {
    type Output;
    fn call(&self, ctx: &mut RequestContext<'_>, args: Args) -> Self::Output;
}

/// impl `Fn` for `FnTrait`, From 0 parameters to 8 parameters after the context
///
/// for example, it will impl Fn(&mut RequestContext, A, B) like this:
///```ignore
/// impl<Func, Out, A, B> FnTrait<(A, B)> for Func
///    where
///        Func: Fn(&mut RequestContext<'_>, A, B) -> Out,
/// {
///    type Output = Out;
///
///    #[inline]
///    #[allow(non_snake_case)]
///    fn call(&self, ctx: &mut RequestContext<'_>, (A, B): (A, B)) -> Self::Output {
///        (self)(ctx, A, B)
///    }
/// }
///```
macro_rules! impl_fn_trait_for_fn ({ $($param:ident)* } => {
    impl<Func, Out, $($param,)*> FnTrait<($($param,)*)> for Func
    where
        Func: Fn(&mut RequestContext<'_>, $($param),*) -> Out,
    {
        type Output = Out;

        #[inline]
        #[allow(non_snake_case)]
        fn call(&self, ctx: &mut RequestContext<'_>, ($($param,)*): ($($param,)*)) -> Self::Output {
            (self)(ctx, $($param,)*)
        }
    }
});

impl_fn_trait_for_fn! {}
impl_fn_trait_for_fn! { A }
impl_fn_trait_for_fn! { A B }
impl_fn_trait_for_fn! { A B C }
impl_fn_trait_for_fn! { A B C D }
impl_fn_trait_for_fn! { A B C D E }
impl_fn_trait_for_fn! { A B C D E F }
impl_fn_trait_for_fn! { A B C D E F G }
impl_fn_trait_for_fn! { A B C D E F G H }

#[cfg(test)]
mod tests {
    use crate::fn_trait::FnTrait;
    use crate::{Halt, RequestContext};

    fn assert_is_fn_trait<Args, F: FnTrait<Args>>(_f: F) {
        //noop
    }
    fn foo0(_ctx: &mut RequestContext) {}
    fn foo1(_ctx: &mut RequestContext, _a: String) -> String {
        String::new()
    }
    fn foo2(_ctx: &mut RequestContext, _a1: String, _a2: u32) -> Result<(), Halt> {
        Ok(())
    }
    fn foo3(_ctx: &mut RequestContext, _a1: String, _a2: String, _a3: i64) {}
    fn foo8(
        _ctx: &mut RequestContext,
        _a1: String,
        _a2: String,
        _a3: String,
        _a4: String,
        _a5: String,
        _a6: String,
        _a7: String,
        _a8: String,
    ) {
    }

    #[test]
    fn test_fn_is_fn_trait() {
        assert_is_fn_trait(foo0);
        assert_is_fn_trait(foo1);
        assert_is_fn_trait(foo2);
        assert_is_fn_trait(foo3);
        assert_is_fn_trait(foo8);
    }
}
