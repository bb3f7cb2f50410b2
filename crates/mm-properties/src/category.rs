//! Material categories, stored as the `category` logistic field.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PropError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Undefined,
    Metal,
    Plastic,
    Fluid,
    Gas,
    Bingham,
    Pseudoplastic,
    Granular,
    Powder,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Undefined,
        Category::Metal,
        Category::Plastic,
        Category::Fluid,
        Category::Gas,
        Category::Bingham,
        Category::Pseudoplastic,
        Category::Granular,
        Category::Powder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Undefined => "undefined",
            Category::Metal => "metal",
            Category::Plastic => "plastic",
            Category::Fluid => "fluid",
            Category::Gas => "gas",
            Category::Bingham => "bingham",
            Category::Pseudoplastic => "pseudoplastic",
            Category::Granular => "granular",
            Category::Powder => "powder",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = PropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PropError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        for c in Category::ALL {
            assert_eq!(c.to_string().parse::<Category>().unwrap(), c);
        }
        assert_eq!("Metal".parse::<Category>().unwrap(), Category::Metal);
        assert!("liquid".parse::<Category>().is_err());
    }

    #[test]
    fn serde_uses_display_names() {
        let c: Category = serde_yaml::from_str("pseudoplastic").unwrap();
        assert_eq!(c, Category::Pseudoplastic);
    }
}
