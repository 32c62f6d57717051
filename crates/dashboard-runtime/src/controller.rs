//! View controller.
//!
//! Owns the joined table and the monthly production series (both read-only
//! after load) and answers selector changes with freshly projected charts.
//! Each of the three year selectors is bound to one chart and one label
//! source; changing one never touches the others.

use std::sync::Arc;

use dashboard_core::models::{AggregatedSeries, FilteredView, JoinedTable, SeriesSource};
use dashboard_data::filter::select_year;
use dashboard_data::pipeline::PipelineOutput;
use tracing::debug;

use crate::charts::{self, ChartKind, ChartSpec, DisplayOptions, HeatmapSpec};

// ── FilterSlot ────────────────────────────────────────────────────────────────

/// One of the dashboard's year selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterSlot {
    /// Drives the monthly production bar chart.
    ProductionYear,
    /// Drives the temperature scatter plot.
    TemperatureYear,
    /// Drives the daylight scatter plot.
    DaylightYear,
}

impl FilterSlot {
    pub const ALL: [FilterSlot; 3] = [
        FilterSlot::ProductionYear,
        FilterSlot::TemperatureYear,
        FilterSlot::DaylightYear,
    ];

    /// Which label column this selector filters on.
    pub fn source(&self) -> SeriesSource {
        match self {
            FilterSlot::ProductionYear => SeriesSource::Production,
            FilterSlot::TemperatureYear => SeriesSource::Temperature,
            FilterSlot::DaylightYear => SeriesSource::Daylight,
        }
    }

    pub fn chart_kind(&self) -> ChartKind {
        match self {
            FilterSlot::ProductionYear => ChartKind::Bar,
            FilterSlot::TemperatureYear => ChartKind::TemperatureScatter,
            FilterSlot::DaylightYear => ChartKind::DaylightScatter,
        }
    }

    /// Short selector caption.
    pub fn label(&self) -> &'static str {
        match self {
            FilterSlot::ProductionYear => "Production year",
            FilterSlot::TemperatureYear => "Temperature year",
            FilterSlot::DaylightYear => "Daylight year",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            FilterSlot::ProductionYear => 0,
            FilterSlot::TemperatureYear => 1,
            FilterSlot::DaylightYear => 2,
        }
    }

    /// Next slot in `ALL`, wrapping around.
    pub fn next(&self) -> FilterSlot {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous slot in `ALL`, wrapping around.
    pub fn prev(&self) -> FilterSlot {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ── ViewController ────────────────────────────────────────────────────────────

/// Stateless projection front-end over the loaded data.
///
/// Cheap to clone; shares the underlying table and series. Every method
/// takes `&self`, so concurrent callers need no locking.
#[derive(Debug, Clone)]
pub struct ViewController {
    table: Arc<JoinedTable>,
    production: Arc<AggregatedSeries>,
}

impl ViewController {
    pub fn new(table: Arc<JoinedTable>, production: Arc<AggregatedSeries>) -> Self {
        Self { table, production }
    }

    /// Take ownership of a finished pipeline run.
    pub fn from_output(output: PipelineOutput) -> Self {
        Self::new(Arc::new(output.table), Arc::new(output.production))
    }

    pub fn table(&self) -> &JoinedTable {
        &self.table
    }

    /// Distinct years offered by `slot`, ascending.
    pub fn year_options(&self, slot: FilterSlot) -> Vec<i32> {
        self.table.years(slot.source())
    }

    /// Starting year for `slot`: the newest year of its label column.
    pub fn initial_year(&self, slot: FilterSlot) -> Option<i32> {
        self.table.max_year(slot.source())
    }

    pub fn filtered_view(&self, slot: FilterSlot, year: i32) -> FilteredView<'_> {
        select_year(&self.table, slot.source(), year)
    }

    /// Chart for `slot` at `year`. `None` projects an empty chart.
    pub fn chart_for(&self, slot: FilterSlot, year: Option<i32>) -> ChartSpec {
        let kind = slot.chart_kind();
        let options = DisplayOptions::for_kind(kind, year);
        let view = match year {
            Some(y) => self.filtered_view(slot, y),
            None => FilteredView {
                source: slot.source(),
                year: 0,
                rows: Vec::new(),
            },
        };
        debug!(slot = ?slot, year = ?year, rows = view.len(), "projecting chart");
        charts::project(&view, kind, &options)
    }

    /// Month × year production heatmap; independent of every selector.
    pub fn heatmap(&self) -> HeatmapSpec {
        charts::project_heatmap(&self.production, &DisplayOptions::heatmap())
    }
}

// ── DashboardState ────────────────────────────────────────────────────────────

/// Current selection of one selector and the chart it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotState {
    pub year: Option<i32>,
    pub options: Vec<i32>,
    pub chart: ChartSpec,
}

/// Live dashboard: three independent selectors plus the fixed heatmap.
#[derive(Debug, Clone)]
pub struct DashboardState {
    controller: ViewController,
    slots: [SlotState; 3],
    heatmap: HeatmapSpec,
}

impl DashboardState {
    /// Build the initial state; every selector starts at its newest year.
    pub fn new(controller: ViewController) -> Self {
        let slots = FilterSlot::ALL.map(|slot| {
            let year = controller.initial_year(slot);
            SlotState {
                year,
                options: controller.year_options(slot),
                chart: controller.chart_for(slot, year),
            }
        });
        let heatmap = controller.heatmap();
        Self {
            controller,
            slots,
            heatmap,
        }
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn slot(&self, slot: FilterSlot) -> &SlotState {
        &self.slots[slot.index()]
    }

    pub fn heatmap(&self) -> &HeatmapSpec {
        &self.heatmap
    }

    /// Set `slot` to `year` and re-project only that slot's chart.
    ///
    /// Years outside the slot's options are accepted and give an empty chart.
    pub fn select(&mut self, slot: FilterSlot, year: i32) {
        let chart = self.controller.chart_for(slot, Some(year));
        let state = &mut self.slots[slot.index()];
        state.year = Some(year);
        state.chart = chart;
    }

    /// Move `slot` by `delta` positions within its options, clamped at
    /// either end. A year outside the options snaps to the nearest one.
    /// Returns `true` when the selection changed.
    pub fn step(&mut self, slot: FilterSlot, delta: isize) -> bool {
        let state = self.slot(slot);
        let Some(&newest) = state.options.last() else {
            return false;
        };
        let current = state
            .year
            .and_then(|y| state.options.iter().position(|&o| o == y));
        let year = match (current, state.year) {
            (Some(idx), _) => {
                let target = idx.saturating_add_signed(delta).min(state.options.len() - 1);
                if target == idx {
                    return false;
                }
                state.options[target]
            }
            (None, Some(stray)) => nearest_year(&state.options, stray).unwrap_or(newest),
            (None, None) => newest,
        };
        self.select(slot, year);
        true
    }

    /// Jump `slot` to its oldest year.
    pub fn select_first(&mut self, slot: FilterSlot) -> bool {
        match self.slot(slot).options.first().copied() {
            Some(year) if self.slot(slot).year != Some(year) => {
                self.select(slot, year);
                true
            }
            _ => false,
        }
    }

    /// Jump `slot` to its newest year.
    pub fn select_last(&mut self, slot: FilterSlot) -> bool {
        match self.slot(slot).options.last().copied() {
            Some(year) if self.slot(slot).year != Some(year) => {
                self.select(slot, year);
                true
            }
            _ => false,
        }
    }
}

/// Option closest to `year`; ties go to the newer year.
fn nearest_year(options: &[i32], year: i32) -> Option<i32> {
    options
        .iter()
        .copied()
        .min_by_key(|&o| ((i64::from(o) - i64::from(year)).abs(), std::cmp::Reverse(o)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
