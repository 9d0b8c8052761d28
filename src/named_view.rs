//! Named views: field names laid over a flat buffer without copying it.
//!
//! A [`ViewType`] freezes an ordered list of field names into a
//! name-to-index table. [`ViewType::view`] wraps a buffer in a
//! [`NamedView`], whose named accessors read and write `buffer[index]`
//! directly. Wrapping `&mut [T]` borrows the caller's storage for the
//! lifetime of the view, so writes through the view land in that storage.

use crate::error::{format_names, NameStage, ViewError};
use crate::field_names::{ensure_unique, sanitize_field_name};
use core::fmt;
use core::ops::{Index, IndexMut, RangeFull};
use std::collections::HashMap;

/// Read access to fixed-length indexed storage.
pub trait Buffer {
    type Elem;
    fn as_slice(&self) -> &[Self::Elem];
}

/// Write access to fixed-length indexed storage.
pub trait BufferMut: Buffer {
    fn as_mut_slice(&mut self) -> &mut [Self::Elem];
}

impl<'a, T> Buffer for &'a [T] {
    type Elem = T;
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<'a, T> Buffer for &'a mut [T] {
    type Elem = T;
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<'a, T> BufferMut for &'a mut [T] {
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

impl<'a, T> Buffer for &'a mut Vec<T> {
    type Elem = T;
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<'a, T> BufferMut for &'a mut Vec<T> {
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

impl<'a, T, const N: usize> Buffer for &'a mut [T; N] {
    type Elem = T;
    fn as_slice(&self) -> &[T] {
        &self[..]
    }
}

impl<'a, T, const N: usize> BufferMut for &'a mut [T; N] {
    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self[..]
    }
}

impl<T> Buffer for Vec<T> {
    type Elem = T;
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<T> BufferMut for Vec<T> {
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

impl<T, const N: usize> Buffer for [T; N] {
    type Elem = T;
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<T, const N: usize> BufferMut for [T; N] {
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

/// Options for [`ViewType::define_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    /// Rewrite field names into identifiers (see
    /// [`sanitize_field_name`](crate::sanitize_field_name)). When off, names
    /// are used verbatim; uniqueness is still enforced.
    pub sanitize_field_names: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            sanitize_field_names: true,
        }
    }
}

/// A named layout: type name plus ordered, unique field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewType {
    name: String,
    fields: Vec<String>,
    index: HashMap<String, usize>,
}

impl ViewType {
    /// Defines a view type with sanitized field names.
    pub fn define<I, S>(type_name: impl Into<String>, field_names: I) -> Result<Self, ViewError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::define_with(type_name, field_names, ViewOptions::default())
    }

    /// Raw names must be unique, and so must the names after sanitization.
    /// No `ViewType` is produced if either check fails.
    pub fn define_with<I, S>(
        type_name: impl Into<String>,
        field_names: I,
        options: ViewOptions,
    ) -> Result<Self, ViewError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = type_name.into();
        let raw: Vec<String> = field_names
            .into_iter()
            .map(|s| s.as_ref().to_owned())
            .collect();
        ensure_unique(&raw, NameStage::Raw)?;

        let fields = if options.sanitize_field_names {
            let sanitized: Vec<String> = raw.iter().map(|n| sanitize_field_name(n)).collect();
            ensure_unique(&sanitized, NameStage::Sanitized)?;
            sanitized
        } else {
            raw.clone()
        };

        let index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.clone(), i))
            .collect();
        let renamed = fields != raw;
        tracing::debug!(
            type_name = %name,
            fields = fields.len(),
            renamed,
            "defined view type"
        );
        Ok(Self {
            name,
            fields,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field names in declared order, after sanitization.
    pub fn get_fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.index.get(field).copied()
    }

    /// Wraps `buffer` without copying it. Its length must equal the field
    /// count.
    pub fn view<B: Buffer>(&self, buffer: B) -> Result<NamedView<'_, B>, ViewError> {
        let actual = buffer.as_slice().len();
        if actual != self.fields.len() {
            return Err(ViewError::LengthMismatch {
                expected: self.fields.len(),
                actual,
            });
        }
        Ok(NamedView { ty: self, buffer })
    }

    /// A view over a freshly allocated buffer of `T::default()` values.
    pub fn zero<T: Default + Clone>(&self) -> NamedView<'_, Vec<T>> {
        NamedView {
            ty: self,
            buffer: vec![T::default(); self.fields.len()],
        }
    }

    fn resolve(&self, field: &str) -> Result<usize, ViewError> {
        self.field_index(field)
            .ok_or_else(|| ViewError::UndeclaredField {
                type_name: self.name.clone(),
                name: field.to_owned(),
                fields: self.fields.clone(),
            })
    }
}

/// Named accessors over a buffer laid out by a [`ViewType`].
pub struct NamedView<'t, B> {
    ty: &'t ViewType,
    buffer: B,
}

impl<'t, B: Buffer> NamedView<'t, B> {
    pub fn view_type(&self) -> &'t ViewType {
        self.ty
    }

    pub fn get_fields(&self) -> &'t [String] {
        self.ty.get_fields()
    }

    pub fn len(&self) -> usize {
        self.ty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ty.is_empty()
    }

    pub fn get(&self, field: &str) -> Result<&B::Elem, ViewError> {
        let i = self.ty.resolve(field)?;
        Ok(&self.buffer.as_slice()[i])
    }

    /// The whole underlying buffer; no copy is made.
    pub fn as_slice(&self) -> &[B::Elem] {
        self.buffer.as_slice()
    }

    /// `(field, value)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &B::Elem)> + '_ {
        self.ty
            .fields
            .iter()
            .map(String::as_str)
            .zip(self.buffer.as_slice())
    }

    pub fn into_inner(self) -> B {
        self.buffer
    }
}

impl<'t, B: BufferMut> NamedView<'t, B> {
    pub fn set(&mut self, field: &str, value: B::Elem) -> Result<(), ViewError> {
        *self.field_mut(field)? = value;
        Ok(())
    }

    pub fn field_mut(&mut self, field: &str) -> Result<&mut B::Elem, ViewError> {
        let i = self.ty.resolve(field)?;
        Ok(&mut self.buffer.as_mut_slice()[i])
    }

    pub fn as_mut_slice(&mut self) -> &mut [B::Elem] {
        self.buffer.as_mut_slice()
    }

    /// Writes `value` into every field.
    pub fn fill(&mut self, value: B::Elem)
    where
        B::Elem: Clone,
    {
        self.buffer.as_mut_slice().fill(value);
    }

    /// Copies `values` element-wise into the buffer.
    pub fn assign(&mut self, values: &[B::Elem]) -> Result<(), ViewError>
    where
        B::Elem: Clone,
    {
        let dst = self.buffer.as_mut_slice();
        if dst.len() != values.len() {
            return Err(ViewError::LengthMismatch {
                expected: dst.len(),
                actual: values.len(),
            });
        }
        dst.clone_from_slice(values);
        Ok(())
    }
}

impl<'t, 'n, B: Buffer> Index<&'n str> for NamedView<'t, B> {
    type Output = B::Elem;

    fn index(&self, field: &'n str) -> &B::Elem {
        match self.get(field) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<'t, 'n, B: BufferMut> IndexMut<&'n str> for NamedView<'t, B> {
    fn index_mut(&mut self, field: &'n str) -> &mut B::Elem {
        match self.field_mut(field) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<'t, B: Buffer> Index<usize> for NamedView<'t, B> {
    type Output = B::Elem;

    fn index(&self, i: usize) -> &B::Elem {
        &self.buffer.as_slice()[i]
    }
}

impl<'t, B: BufferMut> IndexMut<usize> for NamedView<'t, B> {
    fn index_mut(&mut self, i: usize) -> &mut B::Elem {
        &mut self.buffer.as_mut_slice()[i]
    }
}

impl<'t, B: Buffer> Index<RangeFull> for NamedView<'t, B> {
    type Output = [B::Elem];

    fn index(&self, _: RangeFull) -> &[B::Elem] {
        self.buffer.as_slice()
    }
}

impl<'t, B: BufferMut> IndexMut<RangeFull> for NamedView<'t, B> {
    fn index_mut(&mut self, _: RangeFull) -> &mut [B::Elem] {
        self.buffer.as_mut_slice()
    }
}

impl<'t, B> fmt::Display for NamedView<'t, B>
where
    B: Buffer,
    B::Elem: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.ty.name)?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

impl<'t, B> fmt::Debug for NamedView<'t, B>
where
    B: Buffer,
    B::Elem: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}(", self.ty.name)?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value:?}")?;
        }
        f.write_str(")>")
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, format_names(&self.fields))
    }
}
