use std::fmt::Debug;

use zeroize::Zeroize;

// #######################################################
// #################### OPAQUE VALUE #####################
// #######################################################

/// This type is meant to be used to wrap secrets and hash payloads.
/// It will prevent accidental logging or displaying of the inner value,
/// and wipes the inner value from memory when dropped.
/// The inner value can still be accessed via the `unsafe_inner` method.
#[derive(Clone, PartialEq, Eq)]
pub struct Opaque<T>(T)
where
    T: Zeroize;

impl<T> Opaque<T>
where
    T: Zeroize,
{
    pub fn new(v: T) -> Self {
        Self(v)
    }

    /// Reference the inner value
    /// Use it with caution
    pub fn unsafe_inner(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for Opaque<T>
where
    T: Zeroize,
{
    fn from(v: T) -> Self {
        Self::new(v)
    }
}

impl<T> Drop for Opaque<T>
where
    T: Zeroize,
{
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<T> std::fmt::Display for Opaque<T>
where
    T: Zeroize,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "*********")
    }
}

impl<T> Debug for Opaque<T>
where
    T: Zeroize,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "*********")
    }
}
