//! Linear command implementation
//!
//! Runs Jacobi, Gauss-Seidel or SOR on `A·x = b`.

use clap::Args;
use tracing::info;

use super::{emit_result, engine, within_deadline};
use crate::config::CliConfig;
use crate::input::{parse_matrix, parse_vector};
use crate::Result;

/// A linear system in the text formats of [`crate::input`]
#[derive(Debug, Clone, Args)]
pub struct LinearArgs {
    /// Coefficient matrix, rows separated by ';' (e.g. "10,1,1;2,10,1;2,2,10")
    #[arg(short = 'a', long, allow_hyphen_values = true)]
    pub matrix: String,

    /// Right-hand side (e.g. "12,13,14")
    #[arg(short = 'b', long, allow_hyphen_values = true)]
    pub vector: String,

    /// SOR relaxation factor w, 0 < w < 2
    #[arg(short = 'w', long)]
    pub relaxation: Option<f64>,

    /// Starting vector; zeros when absent
    #[arg(long, allow_hyphen_values = true)]
    pub x0: Option<String>,
}

/// Parsed system
pub(crate) struct LinearInputs {
    pub matrix: Vec<Vec<f64>>,
    pub vector: Vec<f64>,
    pub relaxation: Option<f64>,
    pub initial_guess: Option<Vec<f64>>,
}

impl LinearArgs {
    pub(crate) fn inputs(&self) -> Result<LinearInputs> {
        Ok(LinearInputs {
            matrix: parse_matrix(&self.matrix)?,
            vector: parse_vector(&self.vector)?,
            relaxation: self.relaxation,
            initial_guess: self.x0.as_deref().map(parse_vector).transpose()?,
        })
    }
}

/// Run the linear command
pub fn run(config: &CliConfig, method: &str, args: &LinearArgs) -> Result<()> {
    let inputs = args.inputs()?;
    info!("Solving {}x{} system with {}", inputs.vector.len(), inputs.vector.len(), method);

    let convergence = config.convergence()?;
    let engine = engine(config);
    let method = method.to_string();

    let result = within_deadline(config, move || {
        engine.solve_linear_system(
            &method,
            inputs.matrix,
            inputs.vector,
            inputs.relaxation,
            inputs.initial_guess,
            &convergence,
        )
    })?;
    emit_result(config, &result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CliError;

    fn args(relaxation: Option<f64>) -> LinearArgs {
        LinearArgs {
            matrix: "10,1,1;2,10,1;2,2,10".to_string(),
            vector: "12,13,14".to_string(),
            relaxation,
            x0: None,
        }
    }

    #[test]
    fn test_inputs() {
        let mut a = args(Some(1.2));
        a.x0 = Some("1,1,1".to_string());
        let inputs = a.inputs().unwrap();
        assert_eq!(inputs.matrix.len(), 3);
        assert_eq!(inputs.vector, vec![12.0, 13.0, 14.0]);
        assert_eq!(inputs.initial_guess, Some(vec![1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_run_jacobi() {
        assert!(run(&CliConfig::default(), "jacobi", &args(None)).is_ok());
    }

    #[test]
    fn test_run_sor_rejects_factor() {
        let err = run(&CliConfig::default(), "sor", &args(Some(2.0))).unwrap_err();
        assert!(matches!(err, CliError::MethodFailed { .. }));
        assert!(err.to_string().contains("0 < w < 2"));
    }
}
