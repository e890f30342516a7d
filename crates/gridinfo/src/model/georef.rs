//! In-place updates of the derived georeferencing fields.

use super::{AlbersInfo, GridInfo, SpecifiedInfo};
use crate::policy;
use crate::warning::ConsistencyWarning;
use dss_common::{GridError, GridFamily, GridResult};
use grid_geo::{
    coords_of_cell0_of_shg_grid, coords_of_cell0_of_specified_grid, lower_left_cell_from_min_xy,
    lower_left_cell_from_transform, lower_left_cell_of_specified_grid, GeoTransform,
};
use tracing::debug;

/// Result of an `update_*` call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Field recomputed; any advisory warnings ride along.
    Applied(Vec<ConsistencyWarning>),
    /// Inputs disagreed; the field was left as it was.
    Skipped(ConsistencyWarning),
    /// The family keeps this field fixed.
    Unchanged,
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn into_warnings(self) -> Vec<ConsistencyWarning> {
        match self {
            Self::Applied(w) => w,
            Self::Skipped(w) => vec![w],
            Self::Unchanged => Vec::new(),
        }
    }
}

fn missing(field: &str) -> GridError {
    GridError::MissingGeoreference(field.to_string())
}

impl AlbersInfo {
    pub fn update_lower_left_cell_from_min_xy(&mut self) -> GridResult<UpdateOutcome> {
        let min_xy = self.base.min_xy.ok_or_else(|| missing("lower_left_cell"))?;
        let (x0, y0) = self.coords_cell0;
        self.base.lower_left_cell = lower_left_cell_from_min_xy(min_xy, self.base.cell_size, x0, y0);
        Ok(UpdateOutcome::Applied(Vec::new()))
    }

    pub fn update_lower_left_cell_from_transform(
        &mut self,
        transform: &GeoTransform,
        tolerance: f64,
    ) -> GridResult<UpdateOutcome> {
        if let Some(w) = policy::check_cell_size(self.base.cell_size, transform, tolerance) {
            return Ok(UpdateOutcome::Skipped(w));
        }
        let mut warnings: Vec<_> = policy::check_shg_origin(self.coords_cell0).into_iter().collect();
        warnings.extend(policy::check_square_cells(transform));

        let (x0, y0) = self.coords_cell0;
        self.base.lower_left_cell = lower_left_cell_from_transform(transform, self.base.shape, x0, y0);
        Ok(UpdateOutcome::Applied(warnings))
    }

    pub fn update_coords_cell0(&mut self) -> UpdateOutcome {
        self.coords_cell0 = coords_of_cell0_of_shg_grid();
        UpdateOutcome::Applied(Vec::new())
    }
}

impl SpecifiedInfo {
    pub fn update_lower_left_cell(&mut self) -> UpdateOutcome {
        self.base.lower_left_cell = lower_left_cell_of_specified_grid();
        UpdateOutcome::Applied(Vec::new())
    }

    pub fn update_coords_cell0_from_min_xy(&mut self) -> GridResult<UpdateOutcome> {
        let min_xy = self.base.min_xy.ok_or_else(|| missing("coords_cell0"))?;
        self.coords_cell0 = Some(min_xy);
        Ok(UpdateOutcome::Applied(Vec::new()))
    }

    pub fn update_coords_cell0_from_transform(
        &mut self,
        transform: &GeoTransform,
        tolerance: f64,
    ) -> GridResult<UpdateOutcome> {
        if let Some(w) = policy::check_cell_size(self.base.cell_size, transform, tolerance) {
            return Ok(UpdateOutcome::Skipped(w));
        }
        let warnings = policy::check_square_cells(transform).into_iter().collect();
        self.coords_cell0 = Some(coords_of_cell0_of_specified_grid(transform, self.base.shape));
        Ok(UpdateOutcome::Applied(warnings))
    }
}

impl GridInfo {
    /// Recompute `lower_left_cell` under this family's convention.
    ///
    /// Albers grids derive it from `transform` when given, else from
    /// `min_xy`; with neither it is an error. Specified grids pin it to
    /// `(0, 0)`. Other families leave it alone.
    pub fn update_lower_left_cell(
        &mut self,
        transform: Option<&GeoTransform>,
        tolerance: f64,
    ) -> GridResult<UpdateOutcome> {
        match self {
            Self::Albers(a) => match transform {
                Some(t) => a.update_lower_left_cell_from_transform(t, tolerance),
                None => a.update_lower_left_cell_from_min_xy(),
            },
            Self::Specified(s) => Ok(s.update_lower_left_cell()),
            _ => Ok(UpdateOutcome::Unchanged),
        }
    }

    /// Recompute `coords_cell0` under this family's convention.
    pub fn update_coords_cell0(
        &mut self,
        transform: Option<&GeoTransform>,
        tolerance: f64,
    ) -> GridResult<UpdateOutcome> {
        match self {
            Self::Albers(a) => Ok(a.update_coords_cell0()),
            Self::Specified(s) => match transform {
                Some(t) => s.update_coords_cell0_from_transform(t, tolerance),
                None => s.update_coords_cell0_from_min_xy(),
            },
            _ => Ok(UpdateOutcome::Unchanged),
        }
    }

    /// Fill in both derived georeferencing fields.
    ///
    /// Albers keeps its cell-zero origin and derives the lower-left cell
    /// relative to it; specified grids derive cell zero and pin the
    /// lower-left cell.
    pub fn update_georeference(
        &mut self,
        transform: Option<&GeoTransform>,
        tolerance: f64,
    ) -> GridResult<Vec<ConsistencyWarning>> {
        let mut warnings = Vec::new();
        match self.family() {
            GridFamily::Albers => {
                warnings.extend(self.update_lower_left_cell(transform, tolerance)?.into_warnings());
            }
            GridFamily::Specified => {
                warnings.extend(self.update_coords_cell0(transform, tolerance)?.into_warnings());
                warnings.extend(self.update_lower_left_cell(transform, tolerance)?.into_warnings());
            }
            _ => {}
        }
        debug!(
            family = %self.family(),
            lower_left_cell = ?self.base().lower_left_cell,
            warnings = warnings.len(),
            "Updated georeference"
        );
        Ok(warnings)
    }
}
