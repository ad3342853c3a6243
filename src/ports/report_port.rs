//! Report generation port trait.

use crate::domain::correlation::CorrelationMatrix;
use crate::domain::error::IndexboardError;
use crate::domain::indicator_helpers::DecoratedSeries;
use std::path::Path;

/// Port for handing computed results to a presentation layer.
pub trait ReportPort {
    fn write_series(
        &self,
        series: &DecoratedSeries,
        output_path: &Path,
    ) -> Result<(), IndexboardError>;

    fn write_matrix(
        &self,
        matrix: &CorrelationMatrix,
        output_path: &Path,
    ) -> Result<(), IndexboardError>;
}
