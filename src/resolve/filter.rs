use crate::fragment::ConfigFragment;

/// Selects which fragments take part in a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FragmentFilter {
    #[default]
    All,
    Id(String),
}

impl FragmentFilter {
    pub fn matches(&self, fragment: &ConfigFragment) -> bool {
        match self {
            FragmentFilter::All => true,
            FragmentFilter::Id(id) => fragment.id.as_deref() == Some(id.as_str()),
        }
    }
}

impl From<Option<&str>> for FragmentFilter {
    fn from(id: Option<&str>) -> Self {
        match id {
            Some(id) => FragmentFilter::Id(id.to_string()),
            None => FragmentFilter::All,
        }
    }
}
