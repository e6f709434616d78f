#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::num::NonZero;
    use std::path::{Path, PathBuf};

    use itertools::Itertools;
    use proptest::prelude::*;

    use crate::board::Board;
    use crate::builder::BoardBuilder;
    use crate::codec::{CodecError, DecodeError, EncodeError, VarCodec};
    use crate::compile::Compiler;
    use crate::dimacs;
    use crate::grid::decode_model;
    use crate::location::Location;
    use crate::logic::{exactly_k, Clause, Formula, Var};
    use crate::solver::{
        ExternalSolver, SolveError, SolverBackend, SolverFailure, SolverOutput, SolverVerdict,
    };

    fn dims(w: usize, h: usize) -> (crate::Dimension, crate::Dimension) {
        (NonZero::new(w).unwrap(), NonZero::new(h).unwrap())
    }

    fn board(w: usize, h: usize, numbers: &[((usize, usize), usize)]) -> Board {
        let mut builder = BoardBuilder::with_dims(dims(w, h));
        for &((x, y), label) in numbers {
            builder.number(Location(x, y), label);
        }
        builder.build().unwrap()
    }

    fn formula_path(test: &str) -> PathBuf {
        std::env::temp_dir().join(format!("numbersat-test-{}.cnf", test))
    }

    /// Ground-truth oracle: hand a compiled formula to varisat in-process.
    fn varisat_satisfiable(formula: &Formula) -> bool {
        let clauses = formula.iter()
            .map(|clause| {
                clause.lits().iter()
                    .map(|lit| varisat::Lit::from_dimacs(lit.to_dimacs() as isize))
                    .collect_vec()
            })
            .collect_vec();

        let mut solver = varisat::Solver::new();
        solver.add_formula(&varisat::CnfFormula::from(clauses));
        solver.solve().unwrap()
    }

    /// A backend with canned output; no process is ever spawned in these tests.
    struct StubSolver {
        verdict: SolverVerdict,
        stdout: &'static str,
    }

    impl SolverBackend for StubSolver {
        fn run(&self, _formula_path: &Path) -> Result<SolverOutput, SolverFailure> {
            Ok(SolverOutput { verdict: self.verdict, stdout: self.stdout.to_owned() })
        }
    }

    /// A backend which reads the serialized formula file back and actually solves it, printing
    /// its model the way an external engine would.
    struct VarisatBackend;

    impl SolverBackend for VarisatBackend {
        fn run(&self, formula_path: &Path) -> Result<SolverOutput, SolverFailure> {
            let text = std::fs::read_to_string(formula_path).map_err(SolverFailure::Io)?;
            let clauses = text.lines()
                .filter(|line| !line.starts_with('p'))
                .map(|line| {
                    line.split_whitespace()
                        .map(|token| token.parse::<isize>().unwrap())
                        .filter(|&literal| literal != 0)
                        .map(varisat::Lit::from_dimacs)
                        .collect_vec()
                })
                .filter(|clause: &Vec<_>| !clause.is_empty())
                .collect_vec();

            let mut solver = varisat::Solver::new();
            solver.add_formula(&varisat::CnfFormula::from(clauses));

            if solver.solve().unwrap() {
                let positives = solver.model().unwrap().iter()
                    .filter(|lit| lit.is_positive())
                    .map(|lit| lit.to_dimacs())
                    .join(" ");
                Ok(SolverOutput {
                    verdict: SolverVerdict::Satisfiable,
                    stdout: format!("s SATISFIABLE\nv {} 0\n", positives),
                })
            } else {
                Ok(SolverOutput {
                    verdict: SolverVerdict::Unsatisfiable,
                    stdout: "s UNSATISFIABLE\n".to_owned(),
                })
            }
        }
    }

    #[test]
    fn codec_round_trip_exhaustive() {
        let board = board(7, 5, &[((0, 0), 2)]);
        let codec = VarCodec::for_board(&board).unwrap();

        for x in 0..7 {
            for y in 0..5 {
                for label in 0..3 {
                    let var = codec.encode(Location(x, y), label).unwrap();
                    assert_eq!(codec.decode(var).unwrap(), (Location(x, y), label));

                    // polarity flips the sign only, never the magnitude
                    assert_eq!(var.positive().to_dimacs(), -var.negative().to_dimacs());
                    assert!(var.positive().to_dimacs() > 0);
                }
            }
        }
    }

    #[test]
    fn encode_matches_decimal_field_layout() {
        // "1" + "03" + "07" + "4", per the two-digit column/row fields of a 12x12 board
        let codec = VarCodec::new(dims(12, 12), 5, (2, 2, 1)).unwrap();
        let var = codec.encode(Location(3, 7), 4).unwrap();
        assert_eq!(var.magnitude(), 103074);
    }

    #[test]
    fn codec_construction_validates_widths() {
        // column values reach 10, which does not fit one digit
        assert!(matches!(
            VarCodec::new(dims(11, 5), 3, (1, 1, 1)),
            Err(CodecError::FieldTooNarrow { field: "column", width: 1, max_value: 10 })
        ));
        assert!(matches!(
            VarCodec::new(dims(5, 5), 3, (1, 0, 1)),
            Err(CodecError::FieldTooNarrow { field: "row", .. })
        ));
        assert!(matches!(
            VarCodec::new(dims(5, 5), 3, (9, 9, 9)),
            Err(CodecError::WidthOverflow { total: 28 })
        ));
    }

    #[test]
    fn codec_rejects_out_of_domain_encodes() {
        let board = board(7, 5, &[((0, 0), 2)]);
        let codec = VarCodec::for_board(&board).unwrap();

        assert_eq!(
            codec.encode(Location(7, 0), 0),
            Err(EncodeError::OutOfBounds(Location(7, 0)))
        );
        assert_eq!(
            codec.encode(Location(0, 0), 3),
            Err(EncodeError::LabelOutOfRange { label: 3, label_count: 3 })
        );
    }

    #[test]
    fn codec_rejects_foreign_and_out_of_range_magnitudes() {
        let board = board(3, 3, &[((0, 0), 1)]);
        let codec = VarCodec::for_board(&board).unwrap();

        // wrong digit count
        assert_eq!(codec.decode(Var::new(42)), Err(DecodeError::ForeignMagnitude(42)));
        // wrong leading digit
        assert_eq!(codec.decode(Var::new(2000)), Err(DecodeError::ForeignMagnitude(2000)));
        // shaped like ours, but column 5 is off this board
        assert_eq!(
            codec.decode(Var::new(1500)),
            Err(DecodeError::OutOfRange { location: Location(5, 0), label: 0 })
        );
        // label 9 is outside the label space {0, 1}
        assert_eq!(
            codec.decode(Var::new(1009)),
            Err(DecodeError::OutOfRange { location: Location(0, 0), label: 9 })
        );
    }

    #[test]
    fn exactly_k_blocks_exactly_the_wrong_counts() {
        for n in 1..=4usize {
            let vars = (1..=n as u64).map(Var::new).collect_vec();

            for k in 0..=n {
                let clauses = exactly_k(&vars, k);

                // every one of the 2^n truth patterns over the set
                for pattern in 0..(1u32 << n) {
                    let true_vars: HashSet<Var> = vars.iter()
                        .enumerate()
                        .filter(|(i, _)| pattern & (1 << i) != 0)
                        .map(|(_, &v)| v)
                        .collect();

                    let satisfied = clauses.iter().all(|clause| {
                        clause.iter().any(|lit| lit.is_positive() == true_vars.contains(&lit.var()))
                    });

                    assert_eq!(
                        satisfied,
                        true_vars.len() == k,
                        "n={} k={} pattern={:b}", n, k, pattern,
                    );
                }
            }
        }
    }

    #[test]
    fn exclusivity_forbids_holding_two_labels() {
        let board = board(2, 2, &[((0, 0), 0), ((1, 1), 1)]);
        let codec = VarCodec::for_board(&board).unwrap();
        let formula = Compiler::new(&board, &codec).compile().unwrap();

        for location in board.all_positions() {
            let expected = Clause::new([
                codec.encode(location, 0).unwrap().negative(),
                codec.encode(location, 1).unwrap().negative(),
            ]);
            assert!(formula.iter().any(|clause| *clause == expected));
        }
    }

    #[test]
    fn assembly_deduplicates_stably() {
        let board = board(3, 3, &[((0, 0), 0), ((2, 2), 0)]);
        let codec = VarCodec::for_board(&board).unwrap();
        let compiler = Compiler::new(&board, &codec);

        let once = compiler.compile().unwrap();
        let mut twice = once.clone();
        twice.extend(once.iter().cloned());

        assert_eq!(once.len(), twice.len());
        assert_eq!(once, twice);
    }

    #[test]
    fn dimacs_header_round_trips_the_declared_counts() {
        let board = board(3, 3, &[((0, 0), 0), ((2, 2), 1)]);
        let codec = VarCodec::for_board(&board).unwrap();
        let formula = Compiler::new(&board, &codec).compile().unwrap();

        let text = dimacs::render(&formula);
        assert_eq!(
            dimacs::parse_header(&text).unwrap(),
            (formula.max_var().unwrap().magnitude(), formula.len())
        );

        // one line per clause, each closed by the 0 sentinel
        let clause_lines = text.lines().filter(|line| !line.starts_with("p")).collect_vec();
        assert_eq!(clause_lines.len(), formula.len());
        assert!(clause_lines.iter().all(|line| line.ends_with(" 0")));
    }

    #[test]
    fn model_parsing_accumulates_value_lines() {
        let output = "c comment\ns SATISFIABLE\nv 1001 -1002\nv 1003 0\n";
        assert_eq!(dimacs::parse_model(output), vec![Var::new(1001), Var::new(1003)]);

        // no marker lines at all is an empty model, not an error
        assert_eq!(dimacs::parse_model("s UNSATISFIABLE\n"), vec![]);
    }

    #[test]
    fn one_cell_board_compiles_to_its_single_fact() {
        // a 1x1 board has no neighbors, so no cardinality clauses; the fact and the
        // coverage clause collapse to the same unit
        let board = board(1, 1, &[((0, 0), 0)]);
        let codec = VarCodec::for_board(&board).unwrap();
        let formula = Compiler::new(&board, &codec).compile().unwrap();

        let fact = codec.encode(Location(0, 0), 0).unwrap();
        assert_eq!(formula.len(), 1);
        assert!(formula.iter().any(|clause| *clause == Clause::unit(fact.positive())));
        assert!(varisat_satisfiable(&formula));

        // a model holding just that fact reproduces the original board
        let grid = decode_model(&[fact], &board, &codec).unwrap();
        assert_eq!(format!("{}", grid), format!("{}", board));
    }

    #[test]
    fn starved_free_cell_makes_the_instance_unsatisfiable() {
        // the free right cell needs 2 identically numbered neighbors but only has 1;
        // this must surface as unsatisfiability, not a crash or a fabricated grid
        let board = board(2, 1, &[((0, 0), 0)]);
        let codec = VarCodec::for_board(&board).unwrap();
        let formula = Compiler::new(&board, &codec).compile().unwrap();
        assert!(!varisat_satisfiable(&formula));

        let stub = StubSolver { verdict: SolverVerdict::Unsatisfiable, stdout: "s UNSATISFIABLE\n" };
        let result = board.solve_with(&stub, &formula_path("starved-free-cell"));
        assert!(matches!(result, Err(SolveError::Unsatisfiable)));
    }

    #[test]
    fn stub_model_decodes_to_the_expected_placement() {
        // L-shaped pair of 1s from (0,0) to (1,1); the stray variable 7 must be skipped
        let board = board(2, 2, &[((0, 0), 1), ((1, 1), 1)]);
        let stub = StubSolver {
            verdict: SolverVerdict::Satisfiable,
            stdout: "s SATISFIABLE\nv 7 1001 1101\nv 1111 1010 0\n",
        };

        let grid = board.solve_with(&stub, &formula_path("stub-model")).unwrap();
        assert_eq!(format!("{}", grid), "1 1\n0 1\n");
        assert_eq!(grid.get(Location(1, 0)), Some(1));
        assert_eq!(grid.get(Location(0, 1)), Some(0));
    }

    #[test]
    fn solves_a_straight_path_end_to_end() {
        let board = board(3, 1, &[((0, 0), 0), ((2, 0), 0)]);
        let grid = board.solve_with(&VarisatBackend, &formula_path("straight-path")).unwrap();
        assert_eq!(format!("{}", grid), "0 0 0\n");
    }

    #[test]
    fn solves_two_parallel_paths_end_to_end() {
        let board = board(3, 2, &[
            ((0, 0), 0), ((2, 0), 0),
            ((0, 1), 1), ((2, 1), 1),
        ]);
        assert_eq!(format!("{}", board), "0 . 0\n1 . 1\n");

        let grid = board.solve_with(&VarisatBackend, &formula_path("parallel-paths")).unwrap();
        assert_eq!(format!("{}", grid), "0 0 0\n1 1 1\n");
    }

    #[test]
    fn free_cell_may_stay_unlabeled_without_the_coverage_family() {
        // exclusivity is only "at most one", and the guard literal vacuously satisfies every
        // cardinality clause of an unlabeled cell, so facts + exclusivity + cardinality alone
        // admit a model leaving the center empty; coverage closes the gap
        let board = board(3, 3, &[((0, 0), 0), ((2, 0), 0), ((0, 2), 1), ((2, 2), 1)]);
        let codec = VarCodec::for_board(&board).unwrap();
        let compiler = Compiler::new(&board, &codec);

        let mut partial = Formula::new();
        partial.extend(compiler.fixed_facts().unwrap());
        partial.extend(compiler.exclusivity().unwrap());
        partial.extend(compiler.neighbor_cardinality().unwrap());

        let center_empty = [
            Clause::unit(codec.encode(Location(1, 1), 0).unwrap().negative()),
            Clause::unit(codec.encode(Location(1, 1), 1).unwrap().negative()),
        ];

        let mut without_coverage = partial.clone();
        without_coverage.extend(center_empty.iter().cloned());
        assert!(varisat_satisfiable(&without_coverage));

        let mut with_coverage = partial;
        with_coverage.extend(compiler.coverage().unwrap());
        with_coverage.extend(center_empty);
        assert!(!varisat_satisfiable(&with_coverage));
    }

    #[test]
    fn audit_reports_the_clauses_a_bad_solution_violates() {
        let board = board(3, 1, &[((0, 0), 0), ((2, 0), 0)]);
        let codec = VarCodec::for_board(&board).unwrap();
        let formula = Compiler::new(&board, &codec).compile().unwrap();

        let cells = (0..3)
            .map(|x| codec.encode(Location(x, 0), 0).unwrap())
            .collect_vec();

        let correct: HashSet<Var> = cells.iter().copied().collect();
        assert!(formula.violations(&correct).is_empty());

        let grid = decode_model(&cells, &board, &codec).unwrap();
        assert_eq!(grid.true_vars(&codec).unwrap(), correct);

        // drop the middle cell: its coverage unit must show up among the violations
        let corrupted: HashSet<Var> = [cells[0], cells[2]].into_iter().collect();
        let violations = formula.violations(&corrupted);
        assert!(!violations.is_empty());
        assert!(violations.iter().any(|clause| **clause == Clause::unit(cells[1].positive())));
    }

    #[test]
    fn incomplete_model_is_surfaced_loudly() {
        let board = board(3, 1, &[((0, 0), 0), ((2, 0), 0)]);
        let stub = StubSolver {
            verdict: SolverVerdict::Satisfiable,
            stdout: "s SATISFIABLE\nv 1000 1200 0\n",
        };

        match board.solve_with(&stub, &formula_path("incomplete-model")) {
            Err(SolveError::IncompleteModel { missing }) => {
                assert_eq!(missing, vec![Location(1, 0)]);
            }
            other => panic!("expected IncompleteModel, got {:?}", other.map(|g| g.to_string())),
        }
    }

    #[test]
    fn conflicting_model_is_rejected() {
        let board = board(1, 2, &[((0, 0), 1)]);
        let codec = VarCodec::for_board(&board).unwrap();

        let both_labels = [
            codec.encode(Location(0, 0), 0).unwrap(),
            codec.encode(Location(0, 0), 1).unwrap(),
        ];
        assert!(matches!(
            decode_model(&both_labels, &board, &codec),
            Err(SolveError::ModelConflict { location: Location(0, 0) })
        ));
    }

    #[test]
    fn neighbor_order_is_left_right_down_up() {
        let board = board(3, 3, &[((0, 0), 0)]);

        assert_eq!(
            board.neighbors_of(Location(1, 1)),
            vec![Location(0, 1), Location(2, 1), Location(1, 2), Location(1, 0)]
        );
        // corners and edges clip
        assert_eq!(board.neighbors_of(Location(0, 0)), vec![Location(1, 0), Location(0, 1)]);
        assert_eq!(
            board.neighbors_of(Location(1, 2)),
            vec![Location(0, 2), Location(2, 2), Location(1, 1)]
        );
    }

    #[test]
    #[should_panic(expected = "out-of-bounds")]
    fn neighbor_query_rejects_out_of_bounds_cells() {
        board(3, 3, &[]).neighbors_of(Location(3, 0));
    }

    #[test]
    fn topology_queries() {
        let board = board(3, 2, &[((0, 0), 0), ((2, 1), 4)]);

        assert_eq!(board.all_positions().len(), 6);
        assert_eq!(board.all_positions()[..2], [Location(0, 0), Location(1, 0)]);
        assert_eq!(board.fixed_positions().len(), 2);
        assert_eq!(board.free_positions().len(), 4);
        assert!(board.free_positions().contains(&Location(1, 1)));
        assert_eq!(board.highest_label(), Some(4));
        assert_eq!(board.label_count(), 5);

        let empty = self::board(2, 2, &[]);
        assert_eq!(empty.highest_label(), None);
        assert_eq!(empty.label_count(), 0);
    }

    #[test]
    fn builder_rejects_out_of_bounds_numbers() {
        let mut builder = BoardBuilder::with_dims(dims(5, 5));
        builder.number(Location(5, 0), 0);

        assert!(builder.is_valid().is_some());
        assert!(builder.build().is_err());
    }

    #[test]
    fn missing_solver_binary_is_an_io_failure() {
        let solver = ExternalSolver::new("/definitely/not/a/real/solver").verbosity(1);
        assert!(matches!(
            solver.run(&formula_path("missing-binary")),
            Err(SolverFailure::Io(_))
        ));
    }

    fn round_trip_inputs() -> impl Strategy<Value = (usize, usize, usize, usize, usize, usize)> {
        (1..40usize, 1..40usize, 1..15usize)
            .prop_flat_map(|(w, h, label_count)| {
                (Just(w), Just(h), Just(label_count), 0..w, 0..h, 0..label_count)
            })
    }

    fn width_for(max_value: usize) -> u32 {
        max_value.to_string().len() as u32
    }

    proptest! {
        #[test]
        fn codec_round_trips_any_valid_fact((w, h, label_count, x, y, label) in round_trip_inputs()) {
            let codec = VarCodec::new(
                dims(w, h),
                label_count,
                (width_for(w - 1), width_for(h - 1), width_for(label_count - 1)),
            ).unwrap();

            let var = codec.encode(Location(x, y), label).unwrap();
            prop_assert_eq!(codec.decode(var).unwrap(), (Location(x, y), label));
            prop_assert_eq!(var.positive().to_dimacs(), -var.negative().to_dimacs());
        }
    }
}
