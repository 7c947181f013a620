use super::{PageBase, PageObject};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};

/// Number of options in each control group
pub const CHOICE_COUNT: usize = 3;

/// Radio button and checkbox demo form.
///
/// Options are numbered from 1. Radio buttons share one group, so selecting
/// one clears the others without help from this page.
#[derive(Debug, Clone)]
pub struct FormPage<'d> {
    base: PageBase<'d>,
}

fn check_option(option: usize) -> ProbeResult<()> {
    if (1..=CHOICE_COUNT).contains(&option) {
        Ok(())
    } else {
        Err(ProbeError::invalid_argument(format!(
            "option must be between 1 and {CHOICE_COUNT}, got {option}"
        )))
    }
}

impl FormPage<'_> {
    /// Site path
    pub const PATH: &'static str = "/test/radio.html";

    /// Radio button `option` (1-based)
    pub fn single_choice(option: usize) -> ProbeResult<Locator> {
        check_option(option)?;
        Ok(Locator::id(format!("vfb-7-{option}")).described(format!("radio option {option}")))
    }

    /// Checkbox `option` (1-based; the page numbers them from 0)
    pub fn multi_choice(option: usize) -> ProbeResult<Locator> {
        check_option(option)?;
        Ok(Locator::id(format!("vfb-6-{}", option - 1)).described(format!("checkbox {option}")))
    }

    /// Select radio option `option`; no click when it is already selected
    pub fn select_single_choice(&self, option: usize) -> ProbeResult<()> {
        self.base
            .ui()
            .select_if_unselected(&Self::single_choice(option)?)
            .map(|_| ())
    }

    /// Bring checkbox `option` to `desired`
    pub fn set_multi_choice(&self, option: usize, desired: bool) -> ProbeResult<()> {
        self.base
            .ui()
            .set_checked(&Self::multi_choice(option)?, desired)
            .map(|_| ())
    }

    /// Whether radio option `option` is selected
    pub fn is_single_choice_selected(&self, option: usize) -> ProbeResult<bool> {
        self.base.ui().is_selected(&Self::single_choice(option)?)
    }

    /// Whether checkbox `option` is checked
    pub fn is_multi_choice_selected(&self, option: usize) -> ProbeResult<bool> {
        self.base.ui().is_selected(&Self::multi_choice(option)?)
    }
}

impl<'d> PageObject<'d> for FormPage<'d> {
    fn new(base: PageBase<'d>) -> Self {
        Self { base }
    }

    fn base(&self) -> &PageBase<'d> {
        &self.base
    }

    fn path(&self) -> &'static str {
        Self::PATH
    }

    fn name(&self) -> &'static str {
        "form"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::result::ErrorKind;

    #[test]
    fn test_locator_numbering() {
        assert_eq!(FormPage::single_choice(1).unwrap(), Locator::id("vfb-7-1").described("radio option 1"));
        assert_eq!(
            FormPage::multi_choice(1).unwrap().selector(),
            Locator::id("vfb-6-0").selector()
        );
        assert_eq!(
            FormPage::multi_choice(3).unwrap().selector(),
            Locator::id("vfb-6-2").selector()
        );
    }

    #[test]
    fn test_out_of_range_options_are_rejected() {
        for option in [0, 4, 99] {
            assert_eq!(FormPage::single_choice(option).unwrap_err().kind(), ErrorKind::Usage);
            assert_eq!(FormPage::multi_choice(option).unwrap_err().kind(), ErrorKind::Usage);
        }
    }
}
