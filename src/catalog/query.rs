// src/catalog/query.rs
//! Query planning: configuration in, immutable query descriptors out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter predicates understood by the catalog's assets endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter {
    #[serde(rename = "movies")]
    Movies,
    #[serde(rename = "seasons")]
    Seasons,
    #[serde(rename = "hasPackageContent")]
    HasPackageContent,
    #[serde(rename = "availableWithoutPackage")]
    AvailableWithoutPackage,
    #[serde(rename = "new")]
    New,
    #[serde(rename = "notUnlisted")]
    NotUnlisted,
}

impl Filter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::Movies => "movies",
            Filter::Seasons => "seasons",
            Filter::HasPackageContent => "hasPackageContent",
            Filter::AvailableWithoutPackage => "availableWithoutPackage",
            Filter::New => "new",
            Filter::NotUnlisted => "notUnlisted",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

pub const LICENSE_START_SORT_KEY: &str = "activeLicenseStart";

/// Supported content types. Each one becomes its own query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movies,
    Seasons,
}

impl ContentType {
    pub const ALL: [ContentType; 2] = [ContentType::Movies, ContentType::Seasons];

    pub fn filter(&self) -> Filter {
        match self {
            ContentType::Movies => Filter::Movies,
            ContentType::Seasons => Filter::Seasons,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSelection {
    #[default]
    All,
    Movies,
    Seasons,
    /// Every content type disabled; planning yields nothing.
    None,
}

impl ContentSelection {
    pub fn content_types(&self) -> Vec<ContentType> {
        match self {
            ContentSelection::All => ContentType::ALL.to_vec(),
            ContentSelection::Movies => vec![ContentType::Movies],
            ContentSelection::Seasons => vec![ContentType::Seasons],
            ContentSelection::None => Vec::new(),
        }
    }
}

impl std::str::FromStr for ContentSelection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ContentSelection::All),
            "movies" => Ok(ContentSelection::Movies),
            "seasons" => Ok(ContentSelection::Seasons),
            "none" => Ok(ContentSelection::None),
            other => anyhow::bail!("unknown content selection: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaSelection {
    #[default]
    All,
    /// Only assets included in a subscription package.
    Package,
    /// Only assets purchasable without a package.
    Store,
}

impl AreaSelection {
    pub fn filter(&self) -> Option<Filter> {
        match self {
            AreaSelection::All => None,
            AreaSelection::Package => Some(Filter::HasPackageContent),
            AreaSelection::Store => Some(Filter::AvailableWithoutPackage),
        }
    }
}

impl std::str::FromStr for AreaSelection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(AreaSelection::All),
            "package" => Ok(AreaSelection::Package),
            "store" => Ok(AreaSelection::Store),
            other => anyhow::bail!("unknown area selection: {other}"),
        }
    }
}

/// Declarative assets query. Built once per cycle and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDescriptor {
    filters: Vec<Filter>,
    sort: Option<SortSpec>,
}

impl QueryDescriptor {
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn has_filter(&self, filter: Filter) -> bool {
        self.filters.contains(&filter)
    }
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.filters.iter().map(Filter::as_str).collect();
        write!(f, "[{}]", names.join(","))?;
        if let Some(s) = &self.sort {
            write!(f, " sort={}:{}", s.key, s.direction.as_str())?;
        }
        Ok(())
    }
}

/// Owned builder consumed by `build`; there is no way to mutate a finished descriptor.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    filters: Vec<Filter>,
    sort: Option<SortSpec>,
}

impl QueryBuilder {
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort(mut self, key: &str, direction: SortDirection) -> Self {
        self.sort = Some(SortSpec {
            key: key.to_string(),
            direction,
        });
        self
    }

    pub fn build(self) -> QueryDescriptor {
        QueryDescriptor {
            filters: self.filters,
            sort: self.sort,
        }
    }
}

/// One descriptor per selected content type, each restricted to the area and
/// limited to new, listed assets sorted by license start (newest first).
pub fn plan_queries(content: ContentSelection, area: AreaSelection) -> Vec<QueryDescriptor> {
    content
        .content_types()
        .into_iter()
        .map(|ct| {
            let mut b = QueryDescriptor::builder().filter(ct.filter());
            if let Some(area_filter) = area.filter() {
                b = b.filter(area_filter);
            }
            b.filter(Filter::New)
                .filter(Filter::NotUnlisted)
                .sort(LICENSE_START_SORT_KEY, SortDirection::Desc)
                .build()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_content_in_store_area() {
        let qs = plan_queries(ContentSelection::All, AreaSelection::Store);
        assert_eq!(qs.len(), 2);
        assert_eq!(
            qs[0].filters(),
            &[
                Filter::Movies,
                Filter::AvailableWithoutPackage,
                Filter::New,
                Filter::NotUnlisted
            ]
        );
        assert!(qs[1].has_filter(Filter::Seasons));
        assert_eq!(
            qs[1].to_string(),
            "[seasons,availableWithoutPackage,new,notUnlisted] sort=activeLicenseStart:desc"
        );
    }

    #[test]
    fn none_plans_nothing() {
        assert!(plan_queries(ContentSelection::None, AreaSelection::Package).is_empty());
    }

    #[test]
    fn selections_parse_case_insensitively() {
        assert_eq!("Movies".parse::<ContentSelection>().unwrap(), ContentSelection::Movies);
        assert_eq!(" store ".parse::<AreaSelection>().unwrap(), AreaSelection::Store);
        assert!("everything".parse::<AreaSelection>().is_err());
    }
}
