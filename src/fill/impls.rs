use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use rand::Rng;

use super::{Continue, Fill};
use crate::primitives::{Condition, ObjectMeta, TypeMeta};
use crate::types::{IntOrString, Time};

/// Implements [`Fill`] for a struct by filling each listed field in order.
///
/// ```
/// use conversion_fuzz::impl_fill;
///
/// #[derive(Default)]
/// struct Spec {
///     name: String,
///     replicas: Option<i32>,
/// }
///
/// impl_fill!(Spec { name, replicas });
/// ```
#[macro_export]
macro_rules! impl_fill {
    ($ty:ty { $($field:tt),* $(,)? }) => {
        impl $crate::fill::Fill for $ty {
            fn fill(&mut self, c: &mut $crate::fill::Continue<'_>) {
                let _ = &c;
                $( c.fill(&mut self.$field); )*
            }
        }
    };
}

macro_rules! fill_uniform {
    ($($t:ty),*) => {
        $(
            impl Fill for $t {
                fn fill(&mut self, c: &mut Continue<'_>) {
                    *self = c.rng().gen();
                }
            }
        )*
    };
}

fill_uniform!(bool, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl Fill for String {
    fn fill(&mut self, c: &mut Continue<'_>) {
        *self = c.string();
    }
}

impl<T: Fill + Default + 'static> Fill for Option<T> {
    fn fill(&mut self, c: &mut Continue<'_>) {
        if c.nil() {
            *self = None;
            return;
        }
        let mut value = T::default();
        c.fill(&mut value);
        *self = Some(value);
    }
}

impl<T: Fill + 'static> Fill for Box<T> {
    fn fill(&mut self, c: &mut Continue<'_>) {
        c.fill(&mut **self);
    }
}

impl<T: Fill + Default + 'static> Fill for Vec<T> {
    fn fill(&mut self, c: &mut Continue<'_>) {
        let n = c.element_count();
        *self = (0..n)
            .map(|_| {
                let mut item = T::default();
                c.fill(&mut item);
                item
            })
            .collect();
    }
}

impl<K, V> Fill for BTreeMap<K, V>
where
    K: Fill + Default + Ord + 'static,
    V: Fill + Default + 'static,
{
    fn fill(&mut self, c: &mut Continue<'_>) {
        let n = c.element_count();
        *self = (0..n).map(|_| fill_entry(c)).collect();
    }
}

impl<K, V> Fill for HashMap<K, V>
where
    K: Fill + Default + Eq + Hash + 'static,
    V: Fill + Default + 'static,
{
    fn fill(&mut self, c: &mut Continue<'_>) {
        let n = c.element_count();
        *self = (0..n).map(|_| fill_entry(c)).collect();
    }
}

fn fill_entry<K, V>(c: &mut Continue<'_>) -> (K, V)
where
    K: Fill + Default + 'static,
    V: Fill + Default + 'static,
{
    let (mut key, mut value) = (K::default(), V::default());
    c.fill(&mut key);
    c.fill(&mut value);
    (key, value)
}

// Full nanosecond precision; the built-in metadata rules truncate it.
impl Fill for Time {
    fn fill(&mut self, c: &mut Continue<'_>) {
        let sec = i64::from(c.u32());
        let nsec = c.u32() % 1_000_000_000;
        *self = Time::from_unix(sec, nsec).unwrap_or_default();
    }
}

impl Fill for IntOrString {
    fn fill(&mut self, c: &mut Continue<'_>) {
        *self = if c.bool() {
            IntOrString::Int(c.rng().gen())
        } else {
            IntOrString::String(c.string())
        };
    }
}

impl_fill!(TypeMeta { api_version, kind });
impl_fill!(ObjectMeta { name, namespace, uid, labels, annotations });
impl_fill!(Condition { type_, status, observed_generation, last_transition_time, reason, message });
