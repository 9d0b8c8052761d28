//! The `EqualTo` capability: an explicit equivalence relation that is kept
//! separate from a type's native `PartialEq`.

use std::rc::Rc;
use std::sync::Arc;

/// Explicit equivalence used by [`EqualToMap`](crate::EqualToMap) to decide
/// whether a stored key matches a query.
///
/// `Rhs` defaults to `Self`; implementing it for other types lets a map be
/// probed with a different query type. The relation must agree with `Hash`:
/// if `a.equal_to(b)` then `a` and `b` must hash identically.
///
/// Implementations may be expensive or have observable side effects
/// (symbolic expression comparison, instrumentation). The map calls this
/// method for every candidate whose full hash matches the query and never
/// short-circuits on identity.
pub trait EqualTo<Rhs: ?Sized = Self> {
    fn equal_to(&self, other: &Rhs) -> bool;
}

impl<'a, 'b, A, B> EqualTo<&'b B> for &'a A
where
    A: ?Sized + EqualTo<B>,
    B: ?Sized,
{
    #[inline]
    fn equal_to(&self, other: &&'b B) -> bool {
        (**self).equal_to(*other)
    }
}

impl<A, B> EqualTo<Box<B>> for Box<A>
where
    A: ?Sized + EqualTo<B>,
    B: ?Sized,
{
    #[inline]
    fn equal_to(&self, other: &Box<B>) -> bool {
        (**self).equal_to(&**other)
    }
}

impl<A, B> EqualTo<Rc<B>> for Rc<A>
where
    A: ?Sized + EqualTo<B>,
    B: ?Sized,
{
    #[inline]
    fn equal_to(&self, other: &Rc<B>) -> bool {
        (**self).equal_to(&**other)
    }
}

impl<A, B> EqualTo<Arc<B>> for Arc<A>
where
    A: ?Sized + EqualTo<B>,
    B: ?Sized,
{
    #[inline]
    fn equal_to(&self, other: &Arc<B>) -> bool {
        (**self).equal_to(&**other)
    }
}

// Plain value types: the explicit relation is their native equality.
macro_rules! equal_to_via_eq {
    ($($t:ty),* $(,)?) => {
        $(
            impl EqualTo for $t {
                #[inline]
                fn equal_to(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

equal_to_via_eq!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char, str, String,
);

impl EqualTo<str> for String {
    #[inline]
    fn equal_to(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl EqualTo<String> for str {
    #[inline]
    fn equal_to(&self, other: &String) -> bool {
        self == other.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::EqualTo;
    use std::rc::Rc;
    use std::sync::Arc;

    #[test]
    fn std_types_delegate_to_native_equality() {
        assert!(3u32.equal_to(&3));
        assert!(!3u32.equal_to(&4));
        assert!("x".to_string().equal_to("x"));
        assert!("x".equal_to(&"x".to_string()));
        assert!(!'a'.equal_to(&'b'));
    }

    #[test]
    fn references_and_boxes_forward() {
        let a: &str = "k";
        let b: &str = "k";
        assert!(EqualTo::equal_to(&a, &b));
        let b: Box<str> = "k".into();
        assert!(b.equal_to(&Box::<str>::from("k")));
        let r = Rc::new(7u8);
        assert!(r.equal_to(&Rc::new(7u8)));
        assert!(!Arc::new(1u8).equal_to(&Arc::new(2u8)));
    }
}
