//! Seams between the numerical core and the outside world.

use crate::errors::Result;
use crate::models::QuantifiedRow;

/// Something that turns a list of acquisitions into one row of metabolite
/// concentrations.
///
/// The production implementation runs TARQUIN on the averaged spectra
/// ([`crate::data_sources::TarquinQuantifier`]); tests use scripted rows.
///
/// `window` holds 1-based acquisition indices in increasing order, as
/// returned by [`crate::models::plan`]. Each call is independent and a
/// failure is fatal for the run, implementations should not retry.
pub trait WindowQuantifier {
    fn quantify(&mut self, window: &[usize]) -> Result<QuantifiedRow>;
}

impl<T: WindowQuantifier + ?Sized> WindowQuantifier for &mut T {
    fn quantify(&mut self, window: &[usize]) -> Result<QuantifiedRow> {
        (**self).quantify(window)
    }
}

impl<T: WindowQuantifier + ?Sized> WindowQuantifier for Box<T> {
    fn quantify(&mut self, window: &[usize]) -> Result<QuantifiedRow> {
        (**self).quantify(window)
    }
}
