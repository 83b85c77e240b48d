/// Listing filter: name search, pagination and sorting
///
/// Sort keys come from the query string and end up inside ORDER BY, so
/// only columns on the caller's allow-list are accepted.

use serde::Deserialize;

use crate::error::ValidationError;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Raw `?name=&sort=&page=&limit=` query
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub column: &'static str,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: String,
    pub page: i64,
    pub limit: i64,
    pub sort_by: Vec<SortKey>,
}

impl Filter {
    /// Parse a listing query
    ///
    /// `sort` is a comma list like `-name,length`; a leading `-` means
    /// descending.
    pub fn from_query(query: &ListQuery, sortable: &[&'static str]) -> Result<Self, ValidationError> {
        let page = parse_positive(query.page.as_deref(), "page", DEFAULT_PAGE)?;
        let limit = parse_positive(query.limit.as_deref(), "limit", DEFAULT_LIMIT)?;
        if limit > MAX_LIMIT {
            return Err(ValidationError::InvalidFormat(format!(
                "limit (maximum {})",
                MAX_LIMIT
            )));
        }
        // OFFSET must fit in a bigint
        if (page - 1).checked_mul(limit).is_none() {
            return Err(ValidationError::InvalidFormat("page".to_string()));
        }

        let mut sort_by = Vec::new();
        for criterion in query
            .sort
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            let (field, descending) = match criterion.strip_prefix('-') {
                Some(field) => (field, true),
                None => (criterion, false),
            };
            let column = sortable
                .iter()
                .copied()
                .find(|allowed| *allowed == field)
                .ok_or_else(|| ValidationError::InvalidFormat(format!("sort field '{}'", field)))?;
            sort_by.push(SortKey { column, descending });
        }

        Ok(Self {
            name: query.name.clone().unwrap_or_default().trim().to_string(),
            page,
            limit,
            sort_by,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit)
    }

    /// ORDER BY body; `id` is always the final tie-breaker so pages are stable
    pub fn order_by(&self) -> String {
        let mut parts: Vec<String> = self
            .sort_by
            .iter()
            .map(|key| format!("{} {}", key.column, if key.descending { "DESC" } else { "ASC" }))
            .collect();
        parts.push("id ASC".to_string());
        parts.join(", ")
    }
}

fn parse_positive(raw: Option<&str>, field: &str, default: i64) -> Result<i64, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(value) => match value.parse::<i64>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(ValidationError::InvalidFormat(field.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SORTABLE: &[&str] = &["name", "length"];

    fn query(sort: Option<&str>, page: Option<&str>, limit: Option<&str>) -> ListQuery {
        ListQuery {
            name: None,
            sort: sort.map(String::from),
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn test_defaults() {
        let filter = Filter::from_query(&ListQuery::default(), SORTABLE).unwrap();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 10);
        assert_eq!(filter.offset(), 0);
        assert_eq!(filter.order_by(), "id ASC");
    }

    #[test]
    fn test_offset() {
        let filter = Filter::from_query(&query(None, Some("3"), Some("20")), SORTABLE).unwrap();
        assert_eq!(filter.offset(), 40);
    }

    #[test]
    fn test_sort_directions() {
        let filter = Filter::from_query(&query(Some("-name, length"), None, None), SORTABLE).unwrap();
        assert_eq!(filter.order_by(), "name DESC, length ASC, id ASC");
    }

    #[test]
    fn test_unknown_sort_field_is_rejected() {
        let result = Filter::from_query(&query(Some("name;DROP TABLE tracks"), None, None), SORTABLE);
        assert!(result.is_err());

        let result = Filter::from_query(&query(Some("-password_hash"), None, None), SORTABLE);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_pagination_is_rejected() {
        assert!(Filter::from_query(&query(None, Some("two"), None), SORTABLE).is_err());
        assert!(Filter::from_query(&query(None, Some("0"), None), SORTABLE).is_err());
        assert!(Filter::from_query(&query(None, None, Some("-5")), SORTABLE).is_err());
        assert!(Filter::from_query(&query(None, None, Some("1000")), SORTABLE).is_err());
    }

    #[test]
    fn test_page_past_bigint_offset_is_rejected() {
        let result = Filter::from_query(&query(None, Some("9223372036854775807"), Some("100")), SORTABLE);
        assert_eq!(result, Err(ValidationError::InvalidFormat("page".to_string())));

        // limit 1 keeps the offset in range
        let filter = Filter::from_query(&query(None, Some("9223372036854775807"), Some("1")), SORTABLE).unwrap();
        assert_eq!(filter.offset(), i64::MAX - 1);
    }

    #[test]
    fn test_offset_saturates_for_hand_built_filter() {
        let filter = Filter {
            name: String::new(),
            page: i64::MAX,
            limit: 100,
            sort_by: Vec::new(),
        };
        assert_eq!(filter.offset(), i64::MAX);
    }
}
