use std::error::Error;

use crate::traits::Fit;

/// A set of hyperparameters whose values have not been checked for validity. A reference to the
/// checked hyperparameters can only be obtained after checking has completed. If `Fit`
/// has been implemented on the checked hyperparameters, it will also be implemented on the
/// unchecked hyperparameters with the checking step done automatically.
///
/// The hyperparameter validation done in `check_ref()` and `check()` should be identical.
pub trait ParamGuard {
    /// The checked hyperparameters
    type Checked;
    /// Error type resulting from failed hyperparameter checking
    type Error: Error;

    /// Checks the hyperparameters and returns a reference to the checked hyperparameters if
    /// successful
    fn check_ref(&self) -> Result<&Self::Checked, Self::Error>;

    /// Checks the hyperparameters and returns the checked hyperparameters if successful
    fn check(self) -> Result<Self::Checked, Self::Error>;

    /// Calls `check()` and unwraps the result
    fn check_unwrap(self) -> Self::Checked
    where
        Self: Sized,
    {
        self.check().unwrap()
    }
}

impl<R, E, P: ParamGuard> Fit<R, E> for P
where
    P::Checked: Fit<R, E>,
    E: Error + From<P::Error>,
{
    type Object = <<P as ParamGuard>::Checked as Fit<R, E>>::Object;

    fn fit(&self, records: &R) -> Result<Self::Object, E> {
        let checked = self.check_ref()?;
        checked.fit(records)
    }
}
