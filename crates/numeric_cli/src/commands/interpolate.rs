//! Interpolate command implementation
//!
//! Fits an interpolant through the given nodes and evaluates it.

use clap::Args;
use numeric_core::math::interpolation::{DomainPolicy, InterpolationOptions, SplineBoundary};
use tracing::info;

use super::{emit_result, engine, within_deadline};
use crate::config::CliConfig;
use crate::input::{parse_pair, parse_points, parse_vector};
use crate::Result;

/// Nodes and evaluation settings
#[derive(Debug, Clone, Args)]
pub struct InterpolationArgs {
    /// Nodes "x1,y1;x2,y2;..." (e.g. "0,1;1,2;2,5")
    #[arg(short, long, allow_hyphen_values = true)]
    pub points: String,

    /// Points to evaluate the interpolant at (e.g. "0.5,1.5")
    #[arg(long, allow_hyphen_values = true)]
    pub at: Option<String>,

    /// Handling of points outside the nodes: strict, clamp, extrapolate
    #[arg(long, default_value = "strict")]
    pub policy: String,

    /// Clamped cubic spline end slopes "s0,sn"; natural when absent
    #[arg(long, allow_hyphen_values = true)]
    pub clamped: Option<String>,
}

impl InterpolationArgs {
    pub(crate) fn points(&self) -> Result<Vec<(f64, f64)>> {
        parse_points(&self.points)
    }

    pub(crate) fn options(&self, config: &CliConfig) -> Result<InterpolationOptions> {
        let mut options = InterpolationOptions::default()
            .with_limits(config.limits())
            .with_policy(self.policy.parse::<DomainPolicy>()?);
        if let Some(text) = &self.at {
            options = options.with_evaluation_points(parse_vector(text)?);
        }
        if let Some(text) = &self.clamped {
            let (start_slope, end_slope) = parse_pair(text, "clamped")?;
            options = options.with_boundary(SplineBoundary::Clamped {
                start_slope,
                end_slope,
            });
        }
        Ok(options)
    }
}

/// Run the interpolate command
pub fn run(config: &CliConfig, method: &str, args: &InterpolationArgs) -> Result<()> {
    let points = args.points()?;
    let options = args.options(config)?;
    info!("Interpolating {} nodes with {}", points.len(), method);

    let engine = engine(config);
    let method = method.to_string();
    let result = within_deadline(config, move || engine.interpolate(&method, points, &options))?;
    emit_result(config, &result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> InterpolationArgs {
        InterpolationArgs {
            points: "0,1;1,3;2,7".to_string(),
            at: Some("0.5,1.5".to_string()),
            policy: "clamp".to_string(),
            clamped: Some("0,-1".to_string()),
        }
    }

    #[test]
    fn test_options() {
        let options = args().options(&CliConfig::default()).unwrap();
        assert_eq!(options.evaluation_points, vec![0.5, 1.5]);
        assert_eq!(options.policy, DomainPolicy::Clamp);
        assert_eq!(
            options.boundary,
            SplineBoundary::Clamped {
                start_slope: 0.0,
                end_slope: -1.0
            }
        );
        assert_eq!(options.limits.max_points, 8);
    }

    #[test]
    fn test_unknown_policy() {
        let mut a = args();
        a.policy = "wrap".to_string();
        assert!(a.options(&CliConfig::default()).is_err());
    }

    #[test]
    fn test_run_newton() {
        assert!(run(&CliConfig::default(), "newton", &args()).is_ok());
    }

    #[test]
    fn test_run_duplicate_node_fails() {
        let mut a = args();
        a.points = "0,1;1,3;1,7".to_string();
        assert!(run(&CliConfig::default(), "vandermonde", &a).is_err());
    }
}
