use crate::catalog::schema::ChartCatalog;
use indexmap::IndexSet;

/// Recognized subject codes and axis tick labels.
///
/// Built once from a catalog (or from explicit lists in tests) and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    codes: IndexSet<String>,
    axis_ticks: IndexSet<String>,
}

impl CodeRegistry {
    pub fn new<C, T>(codes: C, axis_ticks: T) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        CodeRegistry {
            codes: codes.into_iter().map(Into::into).collect(),
            axis_ticks: axis_ticks.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_catalog(catalog: &ChartCatalog) -> Self {
        CodeRegistry::new(
            catalog.codes.iter().cloned(),
            catalog.axis_ticks.iter().cloned(),
        )
    }

    /// Exact, case-sensitive membership test.
    pub fn is_code(&self, text: &str) -> bool {
        self.codes.contains(text)
    }

    pub fn is_axis_tick(&self, text: &str) -> bool {
        self.axis_ticks.contains(text)
    }

    /// Known codes in configured order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}
