/*****************************************************************************************[interface.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use crate::clause::{lbool, Lit, Var};

/// Main interface for a solver: it makes it possible to add clauses and
/// reified cardinality constraints, allocate variables, and check for
/// satisfiability.
///
/// Clauses and constraints can only be added at decision level 0, i.e.
/// outside of `solve_limited`; between two solve calls the solver is back
/// at level 0 and more constraints may be added.
pub trait SolverInterface {
    fn num_vars(&self) -> u32;
    fn num_clauses(&self) -> u64;
    fn num_conflicts(&self) -> u64;
    fn num_propagations(&self) -> u64;
    fn num_decisions(&self) -> u64;
    fn num_restarts(&self) -> u64;

    /// Is the solver still consistent at level 0?
    ///
    /// Once this returns `false` it stays false: every subsequent `add_*`
    /// and solve call reports unsatisfiability immediately.
    fn is_ok(&self) -> bool;

    /// Print some current statistics to standard output.
    fn print_stats(&self);

    /// Creates a new SAT variable in the solver. If 'decision' is cleared, variable will not be
    /// used as a decision variable (NOTE! This has effects on the meaning of a SATISFIABLE result).
    fn new_var(&mut self, upol: lbool, dvar: bool) -> Var;

    /// Create a new variable with the default polarity
    fn new_var_default(&mut self) -> Var;

    /// Obtain the variable with the given index, creating missing
    /// variables up to it if needed.
    fn var_of_int(&mut self, v_idx: u32) -> Var;

    /// Set the secondary decision-order key of `v`.
    ///
    /// Variables with a smaller preference are picked first among equal
    /// activities; the default is 0 for every variable.
    fn set_var_preference(&mut self, v: Var, pref: i32);

    /// Add a clause to the solver. Returns `false` if the solver is in
    /// an `UNSAT` state.
    ///
    /// The clause vector is modified in place (sorted, deduplicated).
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool;

    /// Add the reified cardinality constraint `(Σ lits ≤ bound) ↔ dst`.
    ///
    /// The literal vector is canonicalized in place. Returns `false` if
    /// the solver is in an `UNSAT` state.
    ///
    /// # Panics
    ///
    /// Panics if the canonicalized constraint still has `(1 << 14) - 10`
    /// literals or more: the counters of the constraint's status block are
    /// 14 bits wide.
    fn add_leq_assign_reuse(&mut self, lits: &mut Vec<Lit>, bound: i32, dst: Lit) -> bool;

    /// Add the reified cardinality constraint `(Σ lits ≥ bound) ↔ dst`,
    /// expressed as `(Σ ¬lits ≤ n − bound) ↔ dst`.
    ///
    /// # Panics
    ///
    /// Same capacity limit as [`SolverInterface::add_leq_assign_reuse`].
    fn add_geq_assign_reuse(&mut self, lits: &mut Vec<Lit>, bound: i32, dst: Lit) -> bool;

    /// Simplify the clause database according to the current top-level assigment. Currently, the only
    /// thing done here is the removal of satisfied clauses, but more things can be put here.
    fn simplify(&mut self) -> bool;

    /// Search for a model that respects a given set of assumptions (with resource constraints).
    ///
    /// Returns `lbool::TRUE` if the instance is satisfiable under the
    /// assumptions, `lbool::FALSE` if it is not, and `lbool::UNDEF` if a
    /// budget was exhausted or the solver was interrupted.
    fn solve_limited(&mut self, assumps: &[Lit]) -> lbool;

    /// Bound the number of conflicts spent by the next solve calls
    /// (`n <= 0` means no limit).
    fn set_conflict_budget(&mut self, n: i64);

    /// Bound the number of propagations spent by the next solve calls
    /// (`n <= 0` means no limit).
    fn set_propagation_budget(&mut self, n: i64);

    /// Lift both budgets.
    fn budget_off(&mut self);

    /// Obtain the slice of literals that are proved at level 0.
    ///
    /// These literals will keep this value from now on.
    fn proved_at_lvl_0(&self) -> &[Lit];

    /// Query whole model
    ///
    /// Precondition: last result was `Sat` (ie `lbool::TRUE`)
    fn get_model(&self) -> &[lbool];

    /// Query model for var
    ///
    /// Precondition: last result was `Sat` (ie `lbool::TRUE`)
    fn value_var(&self, v: Var) -> lbool;

    /// Query model for lit
    fn value_lit(&self, l: Lit) -> lbool;

    /// Value of this literal if it's assigned at level 0, or `UNDEF` otherwise
    fn value_lvl_0(&self, l: Lit) -> lbool;

    /// Return unsat core (as a subset of negated assumptions).
    ///
    /// Precondition: last result was `Unsat`
    fn unsat_core(&self) -> &[Lit];

    /// Does this literal occur in the unsat-core?
    ///
    /// Precondition: last result was `Unsat`
    fn unsat_core_contains_lit(&self, lit: Lit) -> bool;

    /// Does this variable occur in the unsat-core?
    ///
    /// Precondition: last result was `Unsat`
    fn unsat_core_contains_var(&self, v: Var) -> bool;
}
