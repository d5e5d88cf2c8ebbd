//! Positional argument extraction.
//!
//! A matched route hands its captures to the handler in placeholder declaration
//! order. Each handler parameter after the context takes the next capture and
//! converts it with [`FromParam`].

use crate::halt::DispatchError;
use std::fmt::Display;
use std::str::FromStr;

/// Converts one captured value into a handler argument.
pub trait FromParam: Sized {
    fn from_param(value: &str) -> Result<Self, DispatchError>;
}

impl<T> FromParam for T
where
    T: FromStr,
    T::Err: Display,
{
    fn from_param(value: &str) -> Result<Self, DispatchError> {
        value.parse::<T>().map_err(|e| DispatchError::invalid_argument(value, e))
    }
}

/// Converts the ordered captures into a tuple of handler arguments.
///
/// Captures beyond the tuple's arity are ignored.
pub trait FromParams: Sized {
    fn from_params(params: &[String]) -> Result<Self, DispatchError>;
}

impl FromParams for () {
    #[inline]
    fn from_params(_params: &[String]) -> Result<Self, DispatchError> {
        Ok(())
    }
}

macro_rules! impl_from_params_for_tuple {
    ($($param:ident)*) => {
        impl<$($param,)*> FromParams for ($($param,)*)
        where
            $($param: FromParam,)*
        {
            #[allow(non_snake_case)]
            fn from_params(params: &[String]) -> Result<Self, DispatchError> {
                let [$($param,)* ..] = params else {
                    return Err(DispatchError::MissingArgument {
                        expected: [$(stringify!($param),)*].len(),
                        found: params.len(),
                    });
                };
                Ok(($(<$param as FromParam>::from_param($param)?,)*))
            }
        }
    }
}

impl_from_params_for_tuple! { A }
impl_from_params_for_tuple! { A B }
impl_from_params_for_tuple! { A B C }
impl_from_params_for_tuple! { A B C D }
impl_from_params_for_tuple! { A B C D E }
impl_from_params_for_tuple! { A B C D E F }
impl_from_params_for_tuple! { A B C D E F G }
impl_from_params_for_tuple! { A B C D E F G H }

#[cfg(test)]
mod tests {
    use super::*;

    fn params(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn test_positional_strings() {
        let (id, action) = <(String, String)>::from_params(&params(&["7", "edit"])).unwrap();
        assert_eq!(id, "7");
        assert_eq!(action, "edit");
    }

    #[test]
    fn test_typed_params() {
        let (id, flag) = <(u64, bool)>::from_params(&params(&["42", "true"])).unwrap();
        assert_eq!(id, 42);
        assert!(flag);
    }

    #[test]
    fn test_surplus_params_are_ignored() {
        let (id,) = <(String,)>::from_params(&params(&["1", "2", "3"])).unwrap();
        assert_eq!(id, "1");
        <()>::from_params(&params(&["1"])).unwrap();
    }

    #[test]
    fn test_missing_params() {
        let result = <(String, String, String)>::from_params(&params(&["1"]));
        assert!(matches!(result, Err(DispatchError::MissingArgument { expected: 3, found: 1 })));
    }

    #[test]
    fn test_invalid_param() {
        let result = <(u32,)>::from_params(&params(&["abc"]));
        assert!(matches!(result, Err(DispatchError::InvalidArgument { value, .. }) if value == "abc"));

        // an omitted optional capture is an empty string, not a number
        let result = <(u32,)>::from_params(&params(&[""]));
        assert!(matches!(result, Err(DispatchError::InvalidArgument { .. })));
    }
}
