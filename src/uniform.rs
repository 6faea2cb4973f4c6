// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `shader-program`.
//
// `shader-program` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `shader-program` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `shader-program`. If not, see <https://www.gnu.org/licenses/>.

//! Uniform values and the types that can be written into them.

use arrayvec::ArrayVec;

/// The largest number of components a uniform value can have.
pub const MAX_COMPONENTS: usize = 4;

/// The kind of driver call used to write a uniform.
///
/// Booleans have no driver type of their own and are written as integers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// Signed 32-bit integers.
    Int,

    /// 32-bit floating point numbers.
    Float,
}

/// A uniform value of one to four components.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// Integer components.
    Int(ArrayVec<i32, MAX_COMPONENTS>),

    /// Floating point components.
    Float(ArrayVec<f32, MAX_COMPONENTS>),
}

impl UniformValue {
    /// Create an integer value.
    ///
    /// Returns `None` unless there are between one and four components.
    pub fn from_ints(components: &[i32]) -> Option<Self> {
        if components.is_empty() {
            return None;
        }

        ArrayVec::try_from(components).ok().map(UniformValue::Int)
    }

    /// Create a floating point value.
    ///
    /// Returns `None` unless there are between one and four components.
    pub fn from_floats(components: &[f32]) -> Option<Self> {
        if components.is_empty() {
            return None;
        }

        ArrayVec::try_from(components).ok().map(UniformValue::Float)
    }

    /// The kind of driver call this value is written with.
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Float(_) => UniformKind::Float,
        }
    }

    /// The number of components in this value.
    pub fn arity(&self) -> usize {
        match self {
            UniformValue::Int(v) => v.len(),
            UniformValue::Float(v) => v.len(),
        }
    }

    /// The integer components, if this is an integer value.
    pub fn as_ints(&self) -> Option<&[i32]> {
        match self {
            UniformValue::Int(v) => Some(v),
            UniformValue::Float(_) => None,
        }
    }

    /// The floating point components, if this is a floating point value.
    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            UniformValue::Float(v) => Some(v),
            UniformValue::Int(_) => None,
        }
    }
}

/// A type that can be written into a uniform.
///
/// This is implemented for `bool`, `i32` and `f32`, and for arrays of one to four of them.
pub trait Uniform: Sized {
    /// The kind of driver call used for this type.
    const KIND: UniformKind;

    /// The number of components.
    const ARITY: usize;

    /// Convert to a value that can be handed to the driver.
    fn to_value(&self) -> UniformValue;

    /// Convert back from a value read from the driver.
    ///
    /// Returns `None` if the kind or arity do not match.
    fn from_value(value: &UniformValue) -> Option<Self>;
}

mod private {
    use super::{UniformKind, UniformValue, MAX_COMPONENTS};
    use arrayvec::ArrayVec;

    /// A single uniform component.
    pub trait Scalar: Copy + Default {
        const KIND: UniformKind;

        fn encode(values: &[Self]) -> UniformValue;

        fn decode(value: &UniformValue) -> Option<ArrayVec<Self, MAX_COMPONENTS>>;
    }

    impl Scalar for bool {
        const KIND: UniformKind = UniformKind::Int;

        fn encode(values: &[Self]) -> UniformValue {
            UniformValue::Int(values.iter().map(|&b| i32::from(b)).collect())
        }

        fn decode(value: &UniformValue) -> Option<ArrayVec<Self, MAX_COMPONENTS>> {
            value
                .as_ints()
                .map(|ints| ints.iter().map(|&i| i != 0).collect())
        }
    }

    impl Scalar for i32 {
        const KIND: UniformKind = UniformKind::Int;

        fn encode(values: &[Self]) -> UniformValue {
            UniformValue::Int(values.iter().copied().collect())
        }

        fn decode(value: &UniformValue) -> Option<ArrayVec<Self, MAX_COMPONENTS>> {
            value.as_ints().map(|ints| ints.iter().copied().collect())
        }
    }

    impl Scalar for f32 {
        const KIND: UniformKind = UniformKind::Float;

        fn encode(values: &[Self]) -> UniformValue {
            UniformValue::Float(values.iter().copied().collect())
        }

        fn decode(value: &UniformValue) -> Option<ArrayVec<Self, MAX_COMPONENTS>> {
            value.as_floats().map(|floats| floats.iter().copied().collect())
        }
    }
}

use private::Scalar;

macro_rules! impl_scalar_uniform {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Uniform for $ty {
                const KIND: UniformKind = <$ty as Scalar>::KIND;
                const ARITY: usize = 1;

                fn to_value(&self) -> UniformValue {
                    <$ty as Scalar>::encode(std::slice::from_ref(self))
                }

                fn from_value(value: &UniformValue) -> Option<Self> {
                    match <$ty as Scalar>::decode(value)?.as_slice() {
                        [x] => Some(*x),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_array_uniform {
    ($($n:literal),* $(,)?) => {
        $(
            impl<T: Scalar> Uniform for [T; $n] {
                const KIND: UniformKind = T::KIND;
                const ARITY: usize = $n;

                fn to_value(&self) -> UniformValue {
                    T::encode(self)
                }

                fn from_value(value: &UniformValue) -> Option<Self> {
                    let components = T::decode(value)?;
                    if components.len() != $n {
                        return None;
                    }

                    let mut out = [T::default(); $n];
                    out.copy_from_slice(&components);
                    Some(out)
                }
            }
        )*
    };
}

impl_scalar_uniform!(bool, i32, f32);
impl_array_uniform!(1, 2, 3, 4);
