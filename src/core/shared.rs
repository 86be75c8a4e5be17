use core::fmt;
use serde::Serialize;

/// Common interface for the configuration types of the crate.
pub trait ConfigType {
    fn default() -> Self;
}

// A translation touches four distinct index spaces: points of the compressed
// mesh, its triangular faces, the corners of those faces, and the value slots
// of each attribute. Newtypes keep them from crossing.

macro_rules! idx_impl {
    ($($t:ident),*) => {
        $(
            #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
            pub struct $t(usize);

            impl From<usize> for $t {
                #[inline]
                fn from(v: usize) -> Self {
                    Self(v)
                }
            }

            impl From<$t> for usize {
                #[inline]
                fn from(v: $t) -> usize {
                    v.0
                }
            }

            impl fmt::Debug for $t {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }
        )*
    };
}

idx_impl! {
    AttributeValueIdx,
    CornerIdx,
    FaceIdx,
    PointIdx
}

macro_rules! idx_vec_impl {
    ($($Idx:ident),*) => {
        $(
            paste::paste! {
                /// Vector wrapper that can only be indexed by [`$Idx`].
                #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
                pub struct [<Vec $Idx>]<T> {
                    inner: Vec<T>,
                }

                impl<T: Clone> [<Vec $Idx>]<T> {
                    #[allow(unused)]
                    pub fn new() -> Self {
                        Self { inner: Vec::new() }
                    }

                    #[allow(unused)]
                    pub fn push(&mut self, value: T) {
                        self.inner.push(value)
                    }

                    #[allow(unused)]
                    pub fn len(&self) -> usize {
                        self.inner.len()
                    }

                    #[allow(unused)]
                    pub fn is_empty(&self) -> bool {
                        self.inner.is_empty()
                    }

                    #[allow(unused)]
                    pub fn resize(&mut self, new_len: usize, value: T) {
                        self.inner.resize(new_len, value);
                    }

                    #[allow(unused)]
                    pub fn iter(&self) -> impl Iterator<Item = &T> {
                        self.inner.iter()
                    }
                }

                impl<T> ::std::ops::Index<$Idx> for [<Vec $Idx>]<T> {
                    type Output = T;

                    #[inline]
                    fn index(&self, idx: $Idx) -> &Self::Output {
                        &self.inner[idx.0]
                    }
                }

                impl<T> ::std::ops::IndexMut<$Idx> for [<Vec $Idx>]<T> {
                    #[inline]
                    fn index_mut(&mut self, idx: $Idx) -> &mut Self::Output {
                        &mut self.inner[idx.0]
                    }
                }

                impl<T> From<Vec<T>> for [<Vec $Idx>]<T> {
                    fn from(inner: Vec<T>) -> Self {
                        Self { inner }
                    }
                }
            }
        )*
    };
}

idx_vec_impl! {
    CornerIdx,
    FaceIdx,
    PointIdx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_conversions() {
        let p = PointIdx::from(7);
        assert_eq!(usize::from(p), 7);
        assert_eq!(p, PointIdx::from(7));
        assert!(PointIdx::from(3) < PointIdx::from(4));
    }

    #[test]
    fn test_typed_vec() {
        let mut flags = VecFaceIdx::from(vec![false; 3]);
        flags[FaceIdx::from(1)] = true;
        assert!(flags[FaceIdx::from(1)]);
        assert!(!flags[FaceIdx::from(2)]);
        assert_eq!(flags.len(), 3);
    }
}
