//! Tolerant reads of host state.
//!
//! Hosts rename, drop or fail to report attributes across versions. A probe
//! turns every such case into [`Probe::Unknown`], which is distinct from a
//! known zero or empty value and never aborts the caller.

use crate::host::HostResult;

/// Outcome of a tolerant read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe<T> {
    Known(T),
    Unknown,
}

impl<T> Probe<T> {
    pub fn is_known(&self) -> bool {
        matches!(self, Probe::Known(_))
    }

    pub fn known(self) -> Option<T> {
        match self {
            Probe::Known(v) => Some(v),
            Probe::Unknown => None,
        }
    }

    /// Chain a second probe on the known value.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Probe<U>) -> Probe<U> {
        match self {
            Probe::Known(v) => f(v),
            Probe::Unknown => Probe::Unknown,
        }
    }

    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.known().unwrap_or_default()
    }
}

impl<T> From<HostResult<Option<T>>> for Probe<T> {
    fn from(result: HostResult<Option<T>>) -> Self {
        match result {
            Ok(Some(v)) => Probe::Known(v),
            Ok(None) => Probe::Unknown,
            Err(err) => {
                log::debug!("probe failed: {err}");
                Probe::Unknown
            }
        }
    }
}

/// Read `accessor` from `source`, degrading absence or failure to `Unknown`.
pub fn probe<S, T, F>(source: &S, accessor: F) -> Probe<T>
where
    S: ?Sized,
    F: FnOnce(&S) -> HostResult<Option<T>>,
{
    accessor(source).into()
}
