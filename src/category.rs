use crate::Error;
use serde_derive::*;
use std::fmt;
use std::str::FromStr;

/// Fixed set of index categories an upload can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Broad,
    Sectoral,
    Thematic,
    Strategy,
    Custom,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Broad,
        Category::Sectoral,
        Category::Thematic,
        Category::Strategy,
        Category::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Broad => "broad",
            Category::Sectoral => "sectoral",
            Category::Thematic => "thematic",
            Category::Strategy => "strategy",
            Category::Custom => "custom",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// enable parse string to category, ignoring case and surrounding spaces
impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .find(|c| c.as_str() == lower)
            .copied()
            .ok_or_else(|| Error::InvalidCategory(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!(Category::Sectoral, "sectoral".parse().unwrap());
        assert_eq!(Category::Broad, " Broad ".parse().unwrap());
        assert_eq!(Category::Custom, "CUSTOM".parse().unwrap());
        assert_eq!(
            Err(Error::InvalidCategory("sector".to_owned())),
            "sector".parse::<Category>()
        );
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde() {
        for c in Category::ALL.iter() {
            let json = serde_json::to_string(c).unwrap();
            assert_eq!(format!("\"{}\"", c), json);
            assert_eq!(*c, serde_json::from_str::<Category>(&json).unwrap());
        }
    }
}
