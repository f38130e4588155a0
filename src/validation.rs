//! Checks on a parameter set before it is given to the engine.
//!
//! Every problem found is collected, rather than stopping at the first, so that users can fix a
//! model in one go.
use crate::parameter_set::{Dimensions, ParameterSet};
use anyhow::{Result, bail};
use itertools::Itertools;
use std::fmt;

/// A problem with one parameter value or table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The parameter at fault, e.g. `variable_cost[0][2]`
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The constraint on the sign of a value
#[derive(Debug, Clone, Copy)]
enum Sign {
    NonNegative,
    Positive,
}

impl Sign {
    fn check(self, value: f64) -> Option<String> {
        if !value.is_finite() {
            return Some(format!("must be finite, found {value}"));
        }

        match self {
            Self::NonNegative if value < 0.0 => Some(format!("must be non-negative, found {value}")),
            Self::Positive if value <= 0.0 => Some(format!("must be positive, found {value}")),
            _ => None,
        }
    }
}

struct Validator<'a> {
    dimensions: &'a Dimensions,
    errors: Vec<ValidationError>,
}

impl Validator<'_> {
    /// Check a table has the expected number of entries, recording an error if not
    fn check_len(&mut self, field: &str, len: usize, expected: usize) -> bool {
        if len == expected {
            return true;
        }

        self.errors.push(ValidationError::new(
            field,
            format!("expected {expected} values, found {len}"),
        ));
        false
    }

    fn check_value(&mut self, field: impl FnOnce() -> String, value: f64, sign: Sign) {
        if let Some(message) = sign.check(value) {
            self.errors.push(ValidationError::new(field(), message));
        }
    }

    /// The rows of a per-facility table which have the expected length, recording an error for
    /// each that does not
    fn check_rows<'b, T>(
        &mut self,
        name: &str,
        rows: &'b [Vec<T>],
        row_len: usize,
    ) -> Vec<(usize, &'b [T])> {
        if !self.check_len(name, rows.len(), self.dimensions.facilities) {
            return Vec::new();
        }

        rows.iter()
            .enumerate()
            .filter(|(f, row)| self.check_len(&format!("{name}[{f}]"), row.len(), row_len))
            .map(|(f, row)| (f, row.as_slice()))
            .collect()
    }

    fn per_facility(&mut self, name: &str, values: &[f64], sign: Sign) {
        if self.check_len(name, values.len(), self.dimensions.facilities) {
            for (f, &value) in values.iter().enumerate() {
                self.check_value(|| format!("{name}[{f}]"), value, sign);
            }
        }
    }

    fn per_facility_table(&mut self, name: &str, rows: &[Vec<f64>], row_len: usize, sign: Sign) {
        for (f, row) in self.check_rows(name, rows, row_len) {
            for (i, &value) in row.iter().enumerate() {
                self.check_value(|| format!("{name}[{f}][{i}]"), value, sign);
            }
        }
    }

    fn per_facility_technology(&mut self, name: &str, rows: &[Vec<f64>], sign: Sign) {
        self.per_facility_table(name, rows, self.dimensions.technologies, sign);
    }

    fn per_facility_period(&mut self, name: &str, rows: &[Vec<f64>], sign: Sign) {
        self.per_facility_table(name, rows, self.dimensions.periods, sign);
    }

    fn per_period(&mut self, name: &str, values: &[f64], sign: Sign) {
        if self.check_len(name, values.len(), self.dimensions.periods) {
            for (t, &value) in values.iter().enumerate() {
                self.check_value(|| format!("{name}[{t}]"), value, sign);
            }
        }
    }

    /// Check a per-facility-per-technology table of period counts lies within `[min, max]`
    fn period_counts(&mut self, name: &str, rows: &[Vec<u32>], min: u32, max: Option<u32>) {
        for (f, row) in self.check_rows(name, rows, self.dimensions.technologies) {
            for (k, &value) in row.iter().enumerate() {
                let message = match max {
                    Some(max) if !(min..=max).contains(&value) => {
                        format!("must be between {min} and {max}, found {value}")
                    }
                    None if value < min => format!("must be at least {min}, found {value}"),
                    _ => continue,
                };
                self.errors
                    .push(ValidationError::new(format!("{name}[{f}][{k}]"), message));
            }
        }
    }
}

/// Check every parameter against the problem dimensions and its permitted range.
///
/// # Returns
///
/// Every problem found, in parameter order. An empty vector means the parameters can be planned.
pub fn validate_parameters(
    parameters: &ParameterSet,
    dimensions: &Dimensions,
) -> Vec<ValidationError> {
    use Sign::{NonNegative, Positive};

    let mut validator = Validator {
        dimensions,
        errors: Vec::new(),
    };
    for (name, value) in [
        ("facilities", dimensions.facilities),
        ("technologies", dimensions.technologies),
        ("periods", dimensions.periods),
    ] {
        if value == 0 {
            validator
                .errors
                .push(ValidationError::new(name, "must be at least 1"));
        }
    }

    validator.per_facility(
        "fixed_operating_cost",
        &parameters.fixed_operating_cost,
        NonNegative,
    );
    validator.per_facility("investment_cap", &parameters.investment_cap, NonNegative);
    validator.per_facility(
        "baseline_intensity",
        &parameters.baseline_intensity,
        NonNegative,
    );
    validator.check_len(
        "strategic_orientation",
        parameters.strategic_orientation.len(),
        dimensions.facilities,
    );

    validator.per_facility_technology("variable_cost", &parameters.variable_cost, NonNegative);
    validator.per_facility_technology(
        "emissions_intensity",
        &parameters.emissions_intensity,
        NonNegative,
    );
    validator.per_facility_technology(
        "capacity_per_unit",
        &parameters.capacity_per_unit,
        Positive,
    );
    let max_gestation = u32::try_from(dimensions.periods).unwrap_or(u32::MAX);
    validator.period_counts("gestation", &parameters.gestation, 1, Some(max_gestation));
    validator.per_facility_technology("investment_cost", &parameters.investment_cost, NonNegative);
    validator.period_counts("earliest_build", &parameters.earliest_build, 1, None);
    validator.per_facility_technology("scrap_use", &parameters.scrap_use, NonNegative);
    validator.per_facility_technology("ccus_use", &parameters.ccus_use, NonNegative);

    validator.per_facility_period("demand", &parameters.demand, NonNegative);
    validator.per_facility_period("buy_cap", &parameters.buy_cap, NonNegative);
    validator.per_facility_period("sell_cap", &parameters.sell_cap, NonNegative);
    validator.per_facility_period(
        "operating_budget",
        &parameters.operating_budget,
        NonNegative,
    );
    validator.per_facility_period("carbon_price", &parameters.carbon_price, NonNegative);

    validator.per_period(
        "benchmark_intensity",
        &parameters.benchmark_intensity,
        Positive,
    );
    validator.per_period("holding_cost", &parameters.holding_cost, NonNegative);
    validator.per_period("target_intensity", &parameters.target_intensity, NonNegative);
    validator.per_period("scrap_capacity", &parameters.scrap_capacity, NonNegative);
    validator.per_period("ccus_capacity", &parameters.ccus_capacity, NonNegative);

    validator.check_value(
        || "unmet_demand_penalty".into(),
        parameters.unmet_demand_penalty,
        NonNegative,
    );
    validator.check_value(|| "big_m".into(), parameters.big_m, Positive);

    validator.errors
}

/// Validate parameters, returning an error listing every problem found
pub fn check_parameters(parameters: &ParameterSet, dimensions: &Dimensions) -> Result<()> {
    let errors = validate_parameters(parameters, dimensions);
    if !errors.is_empty() {
        bail!(
            "Found {} invalid parameter(s):\n  {}",
            errors.len(),
            errors.iter().join("\n  ")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, default_parameters, dimensions};
    use rstest::rstest;

    fn fields(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|error| error.field.as_str()).collect()
    }

    #[rstest]
    fn valid_parameters(dimensions: Dimensions, default_parameters: ParameterSet) {
        assert!(validate_parameters(&default_parameters, &dimensions).is_empty());
        check_parameters(&default_parameters, &dimensions).unwrap();
    }

    #[rstest]
    fn negative_variable_cost(dimensions: Dimensions, mut default_parameters: ParameterSet) {
        default_parameters.variable_cost[0][2] = -1.0;
        assert_eq!(
            validate_parameters(&default_parameters, &dimensions),
            [ValidationError::new(
                "variable_cost[0][2]",
                "must be non-negative, found -1"
            )]
        );
    }

    #[rstest]
    #[case(0.0)]
    #[case(-5.0)]
    fn capacity_per_unit_not_positive(
        dimensions: Dimensions,
        mut default_parameters: ParameterSet,
        #[case] value: f64,
    ) {
        default_parameters.capacity_per_unit[1][0] = value;
        let errors = validate_parameters(&default_parameters, &dimensions);
        assert_eq!(fields(&errors), ["capacity_per_unit[1][0]"]);
        assert_eq!(errors[0].message, format!("must be positive, found {value}"));
    }

    #[rstest]
    #[case(0, "must be between 1 and 4, found 0")]
    #[case(5, "must be between 1 and 4, found 5")]
    fn gestation_out_of_range(
        dimensions: Dimensions,
        mut default_parameters: ParameterSet,
        #[case] gestation: u32,
        #[case] message: &str,
    ) {
        default_parameters.gestation[1][2] = gestation;
        assert_eq!(
            validate_parameters(&default_parameters, &dimensions),
            [ValidationError::new("gestation[1][2]", message)]
        );
    }

    #[rstest]
    fn earliest_build_zero(dimensions: Dimensions, mut default_parameters: ParameterSet) {
        default_parameters.earliest_build[0][0] = 0;
        assert_eq!(
            validate_parameters(&default_parameters, &dimensions),
            [ValidationError::new(
                "earliest_build[0][0]",
                "must be at least 1, found 0"
            )]
        );
    }

    #[rstest]
    fn short_tables(dimensions: Dimensions, mut default_parameters: ParameterSet) {
        default_parameters.demand[1].pop();
        default_parameters.investment_cap.pop();
        default_parameters.holding_cost.push(1.0);
        default_parameters.strategic_orientation.clear();
        default_parameters.emissions_intensity.pop();

        let errors = validate_parameters(&default_parameters, &dimensions);
        assert_eq!(
            fields(&errors),
            [
                "investment_cap",
                "strategic_orientation",
                "emissions_intensity",
                "demand[1]",
                "holding_cost"
            ]
        );
        assert_eq!(errors[3].message, "expected 4 values, found 3");
    }

    #[rstest]
    fn sign_checks(dimensions: Dimensions, mut default_parameters: ParameterSet) {
        default_parameters.demand[0][3] = -1.0;
        default_parameters.carbon_price[1][0] = -30.0;
        default_parameters.benchmark_intensity[2] = 0.0;
        default_parameters.unmet_demand_penalty = -1.0;
        default_parameters.big_m = 0.0;

        let errors = validate_parameters(&default_parameters, &dimensions);
        assert_eq!(
            fields(&errors),
            [
                "demand[0][3]",
                "carbon_price[1][0]",
                "benchmark_intensity[2]",
                "unmet_demand_penalty",
                "big_m"
            ]
        );
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn non_finite_values(
        dimensions: Dimensions,
        mut default_parameters: ParameterSet,
        #[case] value: f64,
    ) {
        default_parameters.holding_cost[0] = value;
        let errors = validate_parameters(&default_parameters, &dimensions);
        assert_eq!(fields(&errors), ["holding_cost[0]"]);
        assert_eq!(errors[0].message, format!("must be finite, found {value}"));
    }

    #[test]
    fn zero_dimensions() {
        let dimensions = Dimensions::new(0, 1, 1);
        let parameters = ParameterSet {
            big_m: 1.0,
            ..ParameterSet::default()
        };
        let errors = validate_parameters(&parameters, &dimensions);
        assert_eq!(errors[0], ValidationError::new("facilities", "must be at least 1"));
    }

    #[rstest]
    fn check_parameters_lists_errors(dimensions: Dimensions, mut default_parameters: ParameterSet) {
        default_parameters.sell_cap[0][0] = -1.0;
        default_parameters.big_m = -1.0;
        assert_error!(
            check_parameters(&default_parameters, &dimensions),
            "Found 2 invalid parameter(s):\n  sell_cap[0][0]: must be non-negative, found -1\n  \
             big_m: must be positive, found -1"
        );
    }
}
