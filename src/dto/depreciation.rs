//! Depreciation items with their derived values.

use serde::Serialize;

use crate::domain::depreciation::{DepreciationEvent, DepreciationItem};
use crate::domain::types::Cents;

#[derive(Debug, Serialize)]
pub struct DepreciationItemView {
    #[serde(flatten)]
    pub item: DepreciationItem,
    pub current_value: Cents,
    pub recoverable: Cents,
}

impl From<DepreciationItem> for DepreciationItemView {
    fn from(item: DepreciationItem) -> Self {
        Self {
            current_value: item.current_value(),
            recoverable: item.recoverable(),
            item,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DepreciationSummary {
    pub items: Vec<DepreciationItemView>,
    pub total_original: Cents,
    pub total_current: Cents,
    pub total_recoverable: Cents,
}

impl DepreciationSummary {
    pub fn new(items: Vec<DepreciationItem>) -> Self {
        let items: Vec<DepreciationItemView> = items.into_iter().map(Into::into).collect();
        let sum = |f: fn(&DepreciationItemView) -> i64| -> Cents {
            Cents::new(items.iter().map(f).sum()).unwrap_or_default()
        };
        Self {
            total_original: sum(|v| v.item.original_value.get()),
            total_current: sum(|v| v.current_value.get()),
            total_recoverable: sum(|v| v.recoverable.get()),
            items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DepreciationHistory {
    pub item: DepreciationItemView,
    pub events: Vec<DepreciationEvent>,
}
