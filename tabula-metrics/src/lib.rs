//! Tabula Metrics - Dashboard Aggregation
//!
//! ```text
//! Record[] ──→ filters ──→ totals / status groups / recent / 12-month trend
//!                                        │
//!                                        └──→ DashboardMetrics
//! ```
//!
//! Layout state (widget order and sizes) lives in [`DashboardLayout`] and
//! moves in and out of storage only through a [`LayoutStore`].

mod aggregate;
mod filter;
mod layout;

pub use aggregate::{
    DashboardMetrics, MetricsAggregator, RecentItem, TrendPoint, NO_STATUS, TREND_MONTHS,
};
pub use filter::{MetricsQuery, LEGACY_STATUS_KEY};
pub use layout::{
    load_or_default, DashboardLayout, FileLayoutStore, LayoutError, LayoutStore,
    MemoryLayoutStore, WidgetLayout, WidgetSize, DEFAULT_WIDGETS,
};
