//! Dense monthly sales series per region
//!
//! Sales are bucketed by (group, option, month) and laid out as one matrix
//! per group: a row for every month from the group's first sale through the
//! `as_of` month, a column for every option the group sold.

use indexmap::IndexMap;
use nalgebra::DMatrix;
use shared::{Sale, YearMonth};

/// Monthly unit sales of one group, rows are months and columns options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesMatrix {
    group: String,
    start: YearMonth,
    options: Vec<String>,
    cells: DMatrix<u64>,
}

impl SalesMatrix {
    fn zeroed(group: String, start: YearMonth, options: Vec<String>, rows: usize) -> Self {
        let cells = DMatrix::zeros(rows, options.len());
        Self {
            group,
            start,
            options,
            cells,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Month of row 0
    pub fn start(&self) -> YearMonth {
        self.start
    }

    /// Month of the last row
    pub fn end(&self) -> YearMonth {
        self.start.add_months(self.rows() as i64 - 1)
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn columns(&self) -> usize {
        self.options.len()
    }

    /// Option ids in column order
    pub fn option_ids(&self) -> &[String] {
        &self.options
    }

    pub fn column_of(&self, option_id: &str) -> Option<usize> {
        self.options.iter().position(|id| id == option_id)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<u64> {
        self.cells.get((row, column)).copied()
    }

    pub fn row(&self, row: usize) -> Option<Vec<u64>> {
        (row < self.rows()).then(|| self.cells.row(row).iter().copied().collect())
    }

    /// Units sold in `month`, zero for months inside the range without sales
    pub fn month(&self, month: YearMonth) -> Option<Vec<u64>> {
        let offset = month.months_diff(&self.start);
        usize::try_from(offset).ok().and_then(|row| self.row(row))
    }

    fn add(&mut self, row: usize, column: usize, quantity: u64) {
        self.cells[(row, column)] += quantity;
    }

    /// Cells as floating point observations for a forecasting model
    pub fn observations(&self) -> DMatrix<f64> {
        self.cells.map(|units| units as f64)
    }
}

/// Per-group accumulation before the matrix is laid out
#[derive(Default)]
struct GroupBuckets {
    earliest: Option<YearMonth>,
    options: IndexMap<String, IndexMap<YearMonth, u64>>,
}

/// Sales series builder
#[derive(Debug, Clone, Copy)]
pub struct SalesSeriesBuilder {
    as_of: YearMonth,
}

impl SalesSeriesBuilder {
    /// Series end at `as_of`, inclusive
    pub fn new(as_of: YearMonth) -> Self {
        Self { as_of }
    }

    pub fn as_of(&self) -> YearMonth {
        self.as_of
    }

    /// Build one matrix per group; groups without sales get none.
    ///
    /// Sales dated after `as_of` fall outside every series and are skipped.
    pub fn build(&self, sales: &IndexMap<String, Vec<Sale>>) -> IndexMap<String, SalesMatrix> {
        let mut groups: IndexMap<&str, GroupBuckets> = IndexMap::new();

        for (option_id, option_sales) in sales {
            for sale in option_sales {
                let month = sale.year_month();
                if month > self.as_of {
                    tracing::warn!(
                        option_id = %option_id,
                        group = %sale.group,
                        %month,
                        as_of = %self.as_of,
                        "sale after the series end skipped"
                    );
                    continue;
                }

                let buckets = groups.entry(sale.group.as_str()).or_default();
                buckets.earliest = Some(buckets.earliest.map_or(month, |earliest| earliest.min(month)));
                *buckets
                    .options
                    .entry(option_id.clone())
                    .or_default()
                    .entry(month)
                    .or_insert(0) += u64::from(sale.quantity);
            }
        }

        groups
            .into_iter()
            .filter_map(|(group, buckets)| {
                let start = buckets.earliest?;
                let rows = usize::try_from(self.as_of.months_diff(&start) + 1).ok()?;
                let option_ids: Vec<String> = buckets.options.keys().cloned().collect();
                let mut matrix = SalesMatrix::zeroed(group.to_string(), start, option_ids, rows);

                for (column, months) in buckets.options.values().enumerate() {
                    for (month, quantity) in months {
                        // month lies in [start, as_of], so the offset is a valid row
                        let row = month.months_diff(&start) as usize;
                        matrix.add(row, column, *quantity);
                    }
                }

                tracing::debug!(group, rows, columns = matrix.columns(), "sales matrix built");
                Some((group.to_string(), matrix))
            })
            .collect()
    }
}
