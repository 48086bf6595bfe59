//! Root command implementation
//!
//! Runs one root-finding method on a function of `x`.

use clap::Args;
use numeric_core::api::RootInputs;
use tracing::info;

use super::{emit_result, engine, within_deadline};
use crate::config::CliConfig;
use crate::input::parse_pair;
use crate::Result;

/// Function and starting data of a root search
#[derive(Debug, Clone, Args)]
pub struct RootArgs {
    /// Function of x (e.g. "x^2 - 2")
    #[arg(short, long, allow_hyphen_values = true)]
    pub function: String,

    /// Sign-change bracket "a,b" (e.g. "0,2")
    #[arg(short, long, allow_hyphen_values = true)]
    pub bracket: Option<String>,

    /// Initial guess
    #[arg(long, allow_hyphen_values = true)]
    pub x0: Option<f64>,

    /// Second initial guess (secant)
    #[arg(long, allow_hyphen_values = true)]
    pub x1: Option<f64>,

    /// Explicit f'(x); derived symbolically when absent
    #[arg(long, allow_hyphen_values = true)]
    pub derivative: Option<String>,

    /// Explicit f''(x)
    #[arg(long, allow_hyphen_values = true)]
    pub second_derivative: Option<String>,

    /// Fixed-point function g(x)
    #[arg(short = 'g', long, allow_hyphen_values = true)]
    pub iteration_function: Option<String>,

    /// Known root multiplicity
    #[arg(short, long)]
    pub multiplicity: Option<u32>,
}

impl RootArgs {
    /// Engine inputs from the flags
    pub fn inputs(&self) -> Result<RootInputs> {
        let mut inputs = RootInputs::default();
        if let Some(text) = &self.bracket {
            let (a, b) = parse_pair(text, "bracket")?;
            inputs = RootInputs::bracket(a, b);
        }
        if let Some(x0) = self.x0 {
            inputs = inputs.with_guess(x0);
        }
        if let Some(x1) = self.x1 {
            inputs = inputs.with_second_guess(x1);
        }
        if let Some(text) = &self.derivative {
            inputs = inputs.with_derivative(text.as_str());
        }
        if let Some(text) = &self.second_derivative {
            inputs = inputs.with_second_derivative(text.as_str());
        }
        if let Some(text) = &self.iteration_function {
            inputs = inputs.with_iteration_function(text.as_str());
        }
        if let Some(m) = self.multiplicity {
            inputs = inputs.with_multiplicity(m);
        }
        Ok(inputs)
    }
}

/// Run the root command
pub fn run(config: &CliConfig, method: &str, args: &RootArgs) -> Result<()> {
    info!("Finding root of f(x) = {} with {}", args.function, method);

    let inputs = args.inputs()?;
    let convergence = config.convergence()?;
    let engine = engine(config);
    let method = method.to_string();
    let function = args.function.clone();

    let result = within_deadline(config, move || {
        engine.solve_root(&method, &function, &inputs, &convergence)
    })?;
    emit_result(config, &result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(bracket: Option<&str>) -> RootArgs {
        RootArgs {
            function: "x^2 - 2".to_string(),
            bracket: bracket.map(str::to_string),
            x0: None,
            x1: None,
            derivative: None,
            second_derivative: None,
            iteration_function: None,
            multiplicity: None,
        }
    }

    #[test]
    fn test_inputs_from_bracket() {
        let inputs = args(Some("-1,2")).inputs().unwrap();
        assert_eq!(inputs.bracket, Some((-1.0, 2.0)));
        assert_eq!(inputs.x0, None);
    }

    #[test]
    fn test_inputs_with_extras() {
        let mut a = args(None);
        a.x0 = Some(1.0);
        a.x1 = Some(2.0);
        a.iteration_function = Some("(x + 2/x)/2".to_string());
        a.multiplicity = Some(2);
        let inputs = a.inputs().unwrap();
        assert_eq!(inputs.x0, Some(1.0));
        assert_eq!(inputs.x1, Some(2.0));
        assert_eq!(inputs.iteration_function.as_deref(), Some("(x + 2/x)/2"));
        assert_eq!(inputs.multiplicity, Some(2));
    }

    #[test]
    fn test_bad_bracket() {
        assert!(args(Some("0")).inputs().is_err());
    }

    #[test]
    fn test_run_converges() {
        let config = CliConfig::default();
        assert!(run(&config, "bisection", &args(Some("0,2"))).is_ok());
    }

    #[test]
    fn test_run_reports_failure() {
        let config = CliConfig::default();
        let err = run(&config, "bisection", &args(Some("2,3"))).unwrap_err();
        assert!(err.to_string().contains("bisection did not succeed"));
    }
}
