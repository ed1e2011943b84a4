//! Class include/exclude filtering.

use std::collections::BTreeSet;

use crate::config::FilterConfig;
use crate::model::ElementClass;

/// Resolved class filter. Exclusion always wins over inclusion.
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    include: BTreeSet<ElementClass>,
    exclude: BTreeSet<ElementClass>,
}

impl ClassFilter {
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            include: include
                .into_iter()
                .map(|s| ElementClass::from_ifc_name(s.as_ref()))
                .collect(),
            exclude: exclude
                .into_iter()
                .map(|s| ElementClass::from_ifc_name(s.as_ref()))
                .collect(),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(&config.include, &config.exclude)
    }

    /// Whether an element of this class is offered to the section.
    pub fn accepts(&self, class: &ElementClass) -> bool {
        if self.exclude.contains(class) {
            return false;
        }
        if self.include.is_empty() {
            return class.is_structural();
        }
        self.include.contains(class)
    }

    /// Classes listed in both include and exclude.
    pub fn overlap(&self) -> Vec<&ElementClass> {
        self.include.intersection(&self.exclude).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_include_keeps_structural() {
        let filter = ClassFilter::default();
        assert!(filter.accepts(&ElementClass::Wall));
        assert!(filter.accepts(&ElementClass::Door));
        assert!(!filter.accepts(&ElementClass::Space));
        assert!(!filter.accepts(&ElementClass::Other("IfcProxy".into())));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = ClassFilter::new(["IfcWall", "IfcSlab"], ["IfcSlab"]);
        assert!(filter.accepts(&ElementClass::Wall));
        assert!(!filter.accepts(&ElementClass::Slab));
        assert_eq!(filter.overlap(), vec![&ElementClass::Slab]);
    }

    #[test]
    fn test_include_restricts() {
        let filter = ClassFilter::new(["IfcColumn"], Vec::<String>::new());
        assert!(filter.accepts(&ElementClass::Column));
        assert!(!filter.accepts(&ElementClass::Wall));
    }

    #[test]
    fn test_include_can_opt_into_non_structural() {
        let filter = ClassFilter::new(["IfcSpace"], Vec::<String>::new());
        assert!(filter.accepts(&ElementClass::Space));
    }

    #[test]
    fn test_exclude_only() {
        let filter = ClassFilter::new(Vec::<String>::new(), ["IfcWallStandardCase"]);
        assert!(!filter.accepts(&ElementClass::Wall));
        assert!(filter.accepts(&ElementClass::Slab));
    }
}
