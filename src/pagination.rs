use serde::Deserialize;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

use crate::shared::AppError;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

/// Sort direction accepted by list endpoints as `orderBy=ASC|DESC`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    #[strum(serialize = "ASC")]
    Asc,
    #[strum(serialize = "DESC")]
    Desc,
}

impl SortOrder {
    /// Parses the raw `orderBy` query value, if one was given
    pub fn from_param(value: Option<&str>) -> Result<Option<Self>, AppError> {
        value
            .map(|raw| {
                SortOrder::from_str(raw.trim()).map_err(|_| {
                    AppError::field("orderBy", "The Order By must be either ASC or DESC.")
                })
            })
            .transpose()
    }
}

/// Validated offset/limit/order for a list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
    pub order: SortOrder,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
            order: SortOrder::Asc,
        }
    }
}

impl Page {
    pub fn from_parts(
        offset: Option<i64>,
        limit: Option<i64>,
        order: Option<SortOrder>,
    ) -> Result<Self, AppError> {
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::field(
                "offset",
                "The Offset must be zero or greater.",
            ));
        }

        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::field(
                "limit",
                format!("The Limit must be between 1 and {}.", MAX_LIMIT),
            ));
        }

        Ok(Self {
            offset,
            limit,
            order: order.unwrap_or_default(),
        })
    }

    /// Every row in ascending order, for internal aggregation
    pub fn unbounded() -> Self {
        Self {
            offset: 0,
            limit: i64::MAX,
            order: SortOrder::Asc,
        }
    }

    /// Applies the order and window to items already sorted ascending
    pub fn apply<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if self.order == SortOrder::Desc {
            items.reverse();
        }
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// Query string for plain paginated lists
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub order_by: Option<String>,
}

impl ListQuery {
    pub fn page(&self) -> Result<Page, AppError> {
        let order = SortOrder::from_param(self.order_by.as_deref())?;
        Page::from_parts(self.offset, self.limit, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let page = ListQuery::default().page().unwrap();
        assert_eq!(page, Page::default());
    }

    #[rstest]
    #[case(Some(-1), None, "offset")]
    #[case(None, Some(0), "limit")]
    #[case(None, Some(MAX_LIMIT + 1), "limit")]
    fn test_out_of_range(
        #[case] offset: Option<i64>,
        #[case] limit: Option<i64>,
        #[case] field: &str,
    ) {
        match Page::from_parts(offset, limit, None) {
            Err(AppError::Validation(errors)) => assert!(errors.contains_key(field)),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_apply_window_and_order() {
        let page = Page::from_parts(Some(1), Some(2), Some(SortOrder::Desc)).unwrap();
        assert_eq!(page.apply(vec![1, 2, 3, 4, 5]), vec![4, 3]);

        let page = Page::from_parts(Some(3), Some(10), None).unwrap();
        assert_eq!(page.apply(vec![1, 2, 3, 4, 5]), vec![4, 5]);
    }

    #[rstest]
    #[case("ASC", SortOrder::Asc)]
    #[case("aSc", SortOrder::Asc)]
    #[case("desc", SortOrder::Desc)]
    #[case(" DeSc ", SortOrder::Desc)]
    fn test_order_by_is_case_insensitive(#[case] raw: &str, #[case] expected: SortOrder) {
        let query = ListQuery {
            order_by: Some(raw.to_string()),
            ..Default::default()
        };
        assert_eq!(query.page().unwrap().order, expected);
    }

    #[test]
    fn test_unknown_order_by_is_keyed() {
        let query = ListQuery {
            order_by: Some("sideways".to_string()),
            ..Default::default()
        };
        match query.page() {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors["orderBy"], "The Order By must be either ASC or DESC.")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_sort_order_display() {
        assert_eq!(SortOrder::Asc.to_string(), "ASC");
        assert_eq!(SortOrder::Desc.to_string(), "DESC");
    }
}
