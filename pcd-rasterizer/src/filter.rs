use serde::{Deserialize, Serialize};

/// Classes left out of ground surfaces: unassigned, low/medium/high
/// vegetation, building, low point (noise) and water.
pub const UNWANTED_GROUND_CLASSES: [u8; 7] = [1, 3, 4, 5, 6, 7, 9];

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "classes")]
pub enum ClassFilter {
    #[default]
    All,
    Only(Vec<u8>),
    Exclude(Vec<u8>),
}

impl ClassFilter {
    pub fn ground() -> Self {
        ClassFilter::Exclude(UNWANTED_GROUND_CLASSES.to_vec())
    }

    pub fn accepts(&self, classification: u8) -> bool {
        match self {
            ClassFilter::All => true,
            ClassFilter::Only(classes) => classes.contains(&classification),
            ClassFilter::Exclude(classes) => !classes.contains(&classification),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_filter_keeps_ground_and_unclassified_never_set() {
        let filter = ClassFilter::ground();
        assert!(filter.accepts(2));
        assert!(filter.accepts(0));
        assert!(filter.accepts(8));
        for class in UNWANTED_GROUND_CLASSES {
            assert!(!filter.accepts(class));
        }
    }

    #[test]
    fn only_and_all() {
        assert!(ClassFilter::All.accepts(5));
        let only = ClassFilter::Only(vec![2, 9]);
        assert!(only.accepts(9));
        assert!(!only.accepts(5));
    }
}
