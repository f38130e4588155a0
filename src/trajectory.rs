//! The decisions made for every facility, technology and period of a plan.
use crate::parameter_set::Dimensions;
use anyhow::{Result, ensure};

/// Production, investment and trading decisions for a set of facilities.
///
/// Facility-technology-period quantities are indexed `[facility][technology][period]` and
/// facility-period quantities `[facility][period]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTrajectory {
    dimensions: Dimensions,
    /// Quantity produced with each technology
    pub production: Vec<Vec<Vec<f64>>>,
    /// Units committed to start construction in each period
    pub build: Vec<Vec<Vec<u32>>>,
    /// Cumulative usable capacity
    pub capacity: Vec<Vec<Vec<f64>>>,
    /// Whether the facility operates in each period
    pub operating: Vec<Vec<bool>>,
    /// Allowances bought
    pub buy: Vec<Vec<f64>>,
    /// Allowances sold
    pub sell: Vec<Vec<f64>>,
    /// Allowance balance carried into the next period
    pub banked: Vec<Vec<f64>>,
    /// Demand which could not be met
    pub unmet: Vec<Vec<f64>>,
    /// Total emissions
    pub emissions: Vec<Vec<f64>>,
    /// Total production
    pub output: Vec<Vec<f64>>,
    /// Free allowances allocated
    pub allocations: Vec<Vec<f64>>,
}

fn zeros<T: Clone + Default>(rows: usize, len: usize) -> Vec<Vec<T>> {
    vec![vec![T::default(); len]; rows]
}

impl DecisionTrajectory {
    /// Create a trajectory in which every quantity is zero
    pub fn zeroed(dimensions: Dimensions) -> Self {
        let Dimensions {
            facilities,
            technologies,
            periods,
        } = dimensions;
        Self {
            dimensions,
            production: vec![zeros(technologies, periods); facilities],
            build: vec![zeros(technologies, periods); facilities],
            capacity: vec![zeros(technologies, periods); facilities],
            operating: zeros(facilities, periods),
            buy: zeros(facilities, periods),
            sell: zeros(facilities, periods),
            banked: zeros(facilities, periods),
            unmet: zeros(facilities, periods),
            emissions: zeros(facilities, periods),
            output: zeros(facilities, periods),
            allocations: zeros(facilities, periods),
        }
    }

    /// The size of the problem this trajectory covers
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Concatenate trajectories by facility, in the order given.
    ///
    /// All trajectories must have the same number of technologies and periods.
    pub fn merge<I>(trajectories: I) -> Result<Self>
    where
        I: IntoIterator<Item = DecisionTrajectory>,
    {
        let mut trajectories = trajectories.into_iter();
        let Some(mut merged) = trajectories.next() else {
            return Ok(Self::zeroed(Dimensions::new(0, 0, 0)));
        };

        for trajectory in trajectories {
            ensure!(
                trajectory.dimensions.technologies == merged.dimensions.technologies
                    && trajectory.dimensions.periods == merged.dimensions.periods,
                "Cannot merge trajectories of different sizes ({} and {})",
                merged.dimensions,
                trajectory.dimensions
            );

            merged.dimensions.facilities += trajectory.dimensions.facilities;
            merged.production.extend(trajectory.production);
            merged.build.extend(trajectory.build);
            merged.capacity.extend(trajectory.capacity);
            merged.operating.extend(trajectory.operating);
            merged.buy.extend(trajectory.buy);
            merged.sell.extend(trajectory.sell);
            merged.banked.extend(trajectory.banked);
            merged.unmet.extend(trajectory.unmet);
            merged.emissions.extend(trajectory.emissions);
            merged.output.extend(trajectory.output);
            merged.allocations.extend(trajectory.allocations);
        }

        Ok(merged)
    }

    /// Iterate over production as `(facility, technology, period, quantity)`
    pub fn iter_production(&self) -> impl Iterator<Item = (usize, usize, usize, f64)> + '_ {
        self.production.iter().enumerate().flat_map(|(f, rows)| {
            rows.iter().enumerate().flat_map(move |(k, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(t, &quantity)| (f, k, t, quantity))
            })
        })
    }

    /// Total emissions over all facilities and periods
    pub fn total_emissions(&self) -> f64 {
        total(&self.emissions)
    }

    /// Total unmet demand over all facilities and periods
    pub fn total_unmet(&self) -> f64 {
        total(&self.unmet)
    }

    /// Total free allocations over all facilities and periods
    pub fn total_allocations(&self) -> f64 {
        total(&self.allocations)
    }

    /// Total output over all facilities and periods
    pub fn total_output(&self) -> f64 {
        total(&self.output)
    }
}

fn total(values: &[Vec<f64>]) -> f64 {
    values.iter().flatten().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;

    #[test]
    fn zeroed_has_expected_shape() {
        let trajectory = DecisionTrajectory::zeroed(Dimensions::new(2, 3, 4));
        assert_eq!(trajectory.production.len(), 2);
        assert_eq!(trajectory.production[1].len(), 3);
        assert_eq!(trajectory.build[0][2].len(), 4);
        assert_eq!(trajectory.operating[1], [false; 4]);
        assert_eq!(trajectory.total_emissions(), 0.0);
    }

    #[test]
    fn merge_concatenates_facilities() {
        let mut first = DecisionTrajectory::zeroed(Dimensions::new(1, 2, 3));
        first.emissions[0][2] = 5.0;
        let mut second = DecisionTrajectory::zeroed(Dimensions::new(2, 2, 3));
        second.production[1][0][1] = 7.0;

        let merged = DecisionTrajectory::merge([first, second]).unwrap();
        assert_eq!(merged.dimensions(), Dimensions::new(3, 2, 3));
        assert_eq!(merged.emissions[0][2], 5.0);
        assert_eq!(merged.production[2][0][1], 7.0);
        assert_eq!(merged.total_emissions(), 5.0);
    }

    #[test]
    fn merge_different_sizes() {
        let first = DecisionTrajectory::zeroed(Dimensions::new(1, 2, 3));
        let second = DecisionTrajectory::zeroed(Dimensions::new(1, 2, 4));
        assert_error!(
            DecisionTrajectory::merge([first, second]),
            "Cannot merge trajectories of different sizes (1F x 2T x 3P and 1F x 2T x 4P)"
        );
    }

    #[test]
    fn iter_production_is_facility_major() {
        let mut trajectory = DecisionTrajectory::zeroed(Dimensions::new(2, 2, 2));
        trajectory.production[1][0][1] = 3.0;
        let entries: Vec<_> = trajectory.iter_production().collect();
        assert_eq!(entries.len(), 8);
        assert_eq!(entries[0], (0, 0, 0, 0.0));
        assert_eq!(entries[5], (1, 0, 1, 3.0));
    }
}
