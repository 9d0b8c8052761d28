// Solver seam tests with an in-test backend.
//
// The backend only handles `min ½‖x‖² s.t. x ≥ lower`, whose minimizer is
// the componentwise projection `max(lower, 0)`; it stands in for an
// external library so the calling contract can be checked.
use equal_to_containers::{SolveResult, Solver, SolverError, SolverId, ViewType};

struct BoundedLeastNorm {
    lower: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
struct ProjectionDetails {
    status: i32,
}

struct ProjectionSolver {
    available: bool,
}

impl Solver for ProjectionSolver {
    type Program = BoundedLeastNorm;
    type Details = ProjectionDetails;

    fn solver_id(&self) -> SolverId {
        SolverId::new("Projection")
    }

    fn available(&self) -> bool {
        self.available
    }

    fn solve(&self, program: &BoundedLeastNorm) -> Result<SolveResult<ProjectionDetails>, SolverError> {
        let x = program.lower.iter().map(|l| l.max(0.0)).collect();
        Ok(SolveResult::new(true, x, ProjectionDetails { status: 4 }))
    }
}

#[test]
fn solves_small_program_and_reports_details() {
    let solver = ProjectionSolver { available: true };
    assert_eq!(solver.solver_id(), SolverId::new("Projection"));
    assert_eq!(solver.solver_id().name(), "Projection");
    assert!(solver.available());

    let program = BoundedLeastNorm {
        lower: vec![1.0, 1.0],
    };
    let result = solver.solve_checked(&program).unwrap();
    assert!(result.is_success());
    for (got, want) in result.solution().iter().zip([1.0, 1.0]) {
        assert!((got - want).abs() <= 1e-7);
    }
    assert_eq!(result.details().status, 4);
}

#[test]
fn unavailable_solver_is_not_called() {
    let solver = ProjectionSolver { available: false };
    let program = BoundedLeastNorm { lower: vec![0.0] };
    let err = solver.solve_checked(&program).unwrap_err();
    assert_eq!(err, SolverError::Unavailable(SolverId::new("Projection")));
    assert_eq!(err.to_string(), "solver Projection is not available");
}

#[test]
fn solution_reads_through_named_view() {
    let solver = ProjectionSolver { available: true };
    let program = BoundedLeastNorm {
        lower: vec![2.0, -3.0],
    };
    let result = solver.solve(&program).unwrap();
    let ty = ViewType::define("Decision", ["x[0]", "x[1]"]).unwrap();
    assert_eq!(ty.get_fields(), ["x_0_", "x_1_"]);

    let view = result.solution_view(&ty).unwrap();
    assert_eq!(view["x_0_"], 2.0);
    assert_eq!(view["x_1_"], 0.0);
    assert_eq!(view.as_slice().as_ptr(), result.solution().as_ptr());

    let wrong = ViewType::define("Scalar", ["x"]).unwrap();
    assert!(result.solution_view(&wrong).is_err());
}
