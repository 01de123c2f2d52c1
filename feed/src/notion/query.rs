use super::property_names::{COMPTES, PUBLICATION_DATE};
use serde::Serialize;

/// Body of `POST /databases/{id}/query`.
#[derive(Debug, Serialize, PartialEq)]
pub struct QueryBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a Filter>,
    pub sorts: Vec<Sort>,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<&'a str>,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Sort {
    pub property: &'static str,
    pub direction: Direction,
}

impl Sort {
    /// Newest publications first.
    pub fn newest_first() -> Self {
        Sort {
            property: PUBLICATION_DATE,
            direction: Direction::Descending,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Filter {
    Or { or: Vec<Filter> },
    Property(PropertyFilter),
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PropertyFilter {
    pub property: &'static str,
    #[serde(flatten)]
    pub condition: Condition,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    MultiSelect { contains: String },
    Select { equals: String },
}

/// Builds the account filter for the `Comptes` column.
///
/// Every name gets a multi-select `contains` clause. Only the first name also gets
/// a select `equals` clause, for databases where `Comptes` is single-choice.
/// Existing front-ends rely on this exact shape.
pub fn account_filter(comptes: &[String]) -> Option<Filter> {
    let first = comptes.first()?;

    let mut clauses: Vec<Filter> = comptes
        .iter()
        .map(|name| {
            Filter::Property(PropertyFilter {
                property: COMPTES,
                condition: Condition::MultiSelect {
                    contains: name.clone(),
                },
            })
        })
        .collect();

    clauses.push(Filter::Property(PropertyFilter {
        property: COMPTES,
        condition: Condition::Select {
            equals: first.clone(),
        },
    }));

    Some(Filter::Or { or: clauses })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_filter_without_accounts() {
        assert_eq!(account_filter(&[]), None);

        let body = QueryBody {
            filter: None,
            sorts: vec![Sort::newest_first()],
            page_size: 100,
            start_cursor: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "sorts": [{"property": "Date de publication", "direction": "descending"}],
                "page_size": 100
            })
        );
    }

    #[test]
    fn test_select_fallback_covers_first_account_only() {
        let filter = account_filter(&["X".to_string(), "Y".to_string()]).unwrap();

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "or": [
                    {"property": "Comptes", "multi_select": {"contains": "X"}},
                    {"property": "Comptes", "multi_select": {"contains": "Y"}},
                    {"property": "Comptes", "select": {"equals": "X"}}
                ]
            })
        );
    }

    #[test]
    fn test_body_with_filter_and_cursor() {
        let filter = account_filter(&["Studio".to_string()]).unwrap();
        let body = QueryBody {
            filter: Some(&filter),
            sorts: vec![Sort::newest_first()],
            page_size: 100,
            start_cursor: Some("abc"),
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "filter": {
                    "or": [
                        {"property": "Comptes", "multi_select": {"contains": "Studio"}},
                        {"property": "Comptes", "select": {"equals": "Studio"}}
                    ]
                },
                "sorts": [{"property": "Date de publication", "direction": "descending"}],
                "page_size": 100,
                "start_cursor": "abc"
            })
        );
    }
}
