//! Seam for an external optimization solver.
//!
//! Only the calling contract lives here: a solver takes a program and
//! returns a success flag, a solution vector, and solver-specific details.

use crate::error::{SolverError, ViewError};
use crate::named_view::{NamedView, ViewType};
use core::fmt;

/// Identifies a solver implementation by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SolverId {
    name: String,
}

impl SolverId {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for SolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Outcome of a solve. `details` carries whatever status the backend
/// reports (return codes, iteration counts).
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult<D> {
    success: bool,
    solution: Vec<f64>,
    details: D,
}

impl<D> SolveResult<D> {
    pub fn new(success: bool, solution: Vec<f64>, details: D) -> Self {
        Self {
            success,
            solution,
            details,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn solution(&self) -> &[f64] {
        &self.solution
    }

    pub fn details(&self) -> &D {
        &self.details
    }

    /// Named, read-only access to the solution using the fields of `ty`.
    pub fn solution_view<'a>(
        &'a self,
        ty: &'a ViewType,
    ) -> Result<NamedView<'a, &'a [f64]>, ViewError> {
        ty.view(self.solution.as_slice())
    }
}

/// A backend that solves programs of type `Program`.
pub trait Solver {
    type Program;
    type Details;

    fn solver_id(&self) -> SolverId;

    fn available(&self) -> bool;

    fn solve(&self, program: &Self::Program) -> Result<SolveResult<Self::Details>, SolverError>;

    /// Fails with [`SolverError::Unavailable`] instead of calling `solve` on
    /// a backend that is not available.
    fn solve_checked(
        &self,
        program: &Self::Program,
    ) -> Result<SolveResult<Self::Details>, SolverError> {
        if !self.available() {
            tracing::debug!(solver = %self.solver_id(), "solver unavailable");
            return Err(SolverError::Unavailable(self.solver_id()));
        }
        self.solve(program)
    }
}
