//! Iterates in parallel if the `rayon` feature is enabled, sequentially otherwise.
//! Both variants keep the order of the input when collecting.

#[cfg(feature = "rayon")]
mod inner {
    use rayon::prelude::*;

    pub use rayon::iter::ParallelIterator;

    pub trait MaybeParallelIterator<T: Send> {
        type Iter;

        fn into_maybe_par_iter(self) -> Self::Iter;
    }

    impl<T: Send> MaybeParallelIterator<T> for Vec<T> {
        type Iter = rayon::vec::IntoIter<T>;

        fn into_maybe_par_iter(self) -> Self::Iter {
            self.into_par_iter()
        }
    }

    pub trait MaybeParallelRefIterator<'a, T: Sync + 'a> {
        type Iter;

        fn maybe_par_iter(&'a self) -> Self::Iter;
    }

    impl<'a, T: Sync + 'a> MaybeParallelRefIterator<'a, T> for [T] {
        type Iter = rayon::slice::Iter<'a, T>;

        fn maybe_par_iter(&'a self) -> Self::Iter {
            self.par_iter()
        }
    }
}

#[cfg(not(feature = "rayon"))]
mod inner {
    pub trait MaybeParallelIterator<T: Send> {
        type Iter;

        fn into_maybe_par_iter(self) -> Self::Iter;
    }

    impl<T: Send> MaybeParallelIterator<T> for Vec<T> {
        type Iter = std::vec::IntoIter<T>;

        fn into_maybe_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }

    pub trait MaybeParallelRefIterator<'a, T: Sync + 'a> {
        type Iter;

        fn maybe_par_iter(&'a self) -> Self::Iter;
    }

    impl<'a, T: Sync + 'a> MaybeParallelRefIterator<'a, T> for [T] {
        type Iter = std::slice::Iter<'a, T>;

        fn maybe_par_iter(&'a self) -> Self::Iter {
            self.iter()
        }
    }
}

pub use inner::*;
