/*****************************************************************************************[core.rs]
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

use {
    crate::callbacks::{Callbacks, ProgressStatus},
    crate::clause::{
        self, lbool, CRef, ClauseAllocator, ClauseRef, DeletePred, LSet, LeqStatus, Lit, OccLists,
        OccListsData, VMap, Var,
    },
    crate::heap::{Comparator, Heap, HeapData},
    crate::interface::SolverInterface,
    std::{
        cmp, fmt, io, mem,
        sync::atomic::{AtomicBool, Ordering},
    },
};

/// The main solver structure.
///
/// A `Solver` object contains the whole state of the SAT solver, including
/// the clause arena, watch lists, trail, and statistics.
///
/// It is parametrized by `Callbacks`.
pub struct Solver<Cb: Callbacks> {
    // Extra results: (read-only member variable)
    /// If problem is satisfiable, this vector contains the model (if any).
    model: Vec<lbool>,
    /// If problem is unsatisfiable (possibly under assumptions),
    /// this vector represent the final conflict clause expressed in the assumptions.
    conflict: LSet,

    cb: Cb, // the callbacks
    asynch_interrupt: AtomicBool,

    /// List of problem clauses (both disjunctions and LEQ constraints).
    clauses: Vec<CRef>,
    /// List of learnt clauses (always disjunctions).
    learnts: Vec<CRef>,

    v: SolverV,
}

/// The current assignments.
struct VarState {
    /// A heuristic measurement of the activity of a variable.
    activity: VMap<f64>,
    /// Secondary decision-order key, breaking activity ties.
    var_preference: VMap<i32>,
    /// Current assignment for each variable.
    ass: VMap<lbool>,
    /// Stores reason and level for each variable.
    vardata: VMap<VarData>,
    /// Amount to bump next variable with.
    var_inc: f64,
    var_decay: f64,

    /// Assignment stack; stores all assigments made in the order they were made.
    trail: Vec<Lit>,
    /// Separator indices for different decision levels in `trail` and in
    /// the LEQ status journal.
    trail_lim: Vec<TrailSep>,
}

struct SolverV {
    vars: VarState,

    learntsize_adjust_start_confl: i32,
    learntsize_adjust_inc: f64,
    max_learnts: f64,
    learntsize_adjust_confl: f64,
    learntsize_adjust_cnt: i32,

    remove_satisfied: bool,

    // Statistics: (read-only member variable)
    solves: u64,
    starts: u64,
    decisions: u64,
    rnd_decisions: u64,
    propagations: u64,
    conflicts: u64,
    dec_vars: u64,
    max_literals: u64,
    tot_literals: u64,

    num_clauses: u64,
    num_learnts: u64,
    clauses_literals: u64,
    learnts_literals: u64,

    // Mode of operation:
    clause_decay: f64,
    random_var_freq: f64,
    random_seed: f64,
    luby_restart: bool,
    /// Controls conflict clause minimization (0=none, 1=basic, 2=deep).
    ccmin_mode: i32,
    /// Controls the level of phase saving (0=none, 1=limited, 2=full).
    phase_saving: i32,
    /// Use random polarities for branching heuristics.
    rnd_pol: bool,
    /// Initialize variable activities with a small random value.
    rnd_init_act: bool,
    /// The fraction of wasted memory allowed before a garbage collection is triggered.
    garbage_frac: f64,
    /// Minimum number to set the learnts limit to.
    min_learnts_lim: i32,

    /// The initial restart limit. (default 100)
    restart_first: i32,
    /// The factor with which the restart limit is multiplied in each restart. (default 2.0)
    restart_inc: f64,
    /// The intitial limit for learnt clauses is a factor of the original clauses. (default 1 / 3)
    learntsize_factor: f64,
    /// The limit for learnt clauses is multiplied with this factor each restart. (default 1.1)
    learntsize_inc: f64,

    /// The preferred polarity of each variable.
    polarity: VMap<bool>,
    /// The users preferred polarity of each variable.
    user_pol: VMap<lbool>,
    /// Declares if a variable is eligible for selection in the decision heuristic.
    decision: VMap<bool>,
    /// `watches[lit]` is a list of constraints watching 'lit' (will go there if literal becomes true).
    watches_data: OccListsData<Lit, Watcher>,
    /// `leq_watches[var]` is a list of LEQ constraints containing 'var'.
    leq_watches_data: OccListsData<Var, LeqWatcher>,
    /// Journal of every increment made to a LEQ status block, so that
    /// `cancel_until` can rewind them.
    trail_leq_stat: Vec<LeqStatusModLog>,
    /// A priority queue of variables ordered with respect to the variable activity.
    order_heap_data: HeapData<Var>,
    /// If `false`, the constraints are already unsatisfiable. No part of the solver state may be used!
    ok: bool,
    /// Amount to bump next clause with.
    cla_inc: f64,
    /// Head of queue (as index into the trail -- no more explicit propagation queue in MiniSat).
    qhead: i32,
    /// Number of top-level assignments since last execution of 'simplify()'.
    simp_db_assigns: i32,
    /// Remaining number of propagations that must be made before next execution of 'simplify()'.
    simp_db_props: i64,
    /// Set by `search()`.
    progress_estimate: f64,

    /// Next variable to be created.
    next_var: Var,
    ca: ClauseAllocator,

    /// Current set of assumptions provided to solve by the user.
    assumptions: Vec<Lit>,

    // Temporaries (to reduce allocation overhead). Each variable is prefixed by the method in which it is
    // used, except `seen` wich is used in several places.
    seen: VMap<Seen>,
    minimize_stack: Vec<Lit>,
    analyze_toclear: Vec<Lit>,

    // Resource contraints:
    conflict_budget: i64,
    propagation_budget: i64,
}

/// Print the model as DIMACS.
pub struct SolverPrintDimacs<'a, Cb: Callbacks + 'a> {
    s: &'a Solver<Cb>,
}

mod dimacs_output {
    use super::*;

    impl<'a, Cb: Callbacks> fmt::Display for SolverPrintDimacs<'a, Cb> {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            write!(out, "v ")?;
            for (i, &val) in self.s.model.iter().enumerate() {
                if val == lbool::TRUE {
                    write!(out, "{} ", i + 1)?
                } else if val == lbool::FALSE {
                    write!(out, "-{} ", i + 1)?
                }
            }
            writeln!(out, "0")
        }
    }
}

// public API
impl<Cb: Callbacks> SolverInterface for Solver<Cb> {
    fn new_var(&mut self, upol: lbool, dvar: bool) -> Var {
        self.v.new_var(upol, dvar)
    }

    fn new_var_default(&mut self) -> Var {
        self.new_var(lbool::UNDEF, true)
    }

    fn var_of_int(&mut self, v_idx: u32) -> Var {
        while v_idx >= self.num_vars() {
            self.new_var_default();
        }
        let var = Var::from_idx(v_idx);
        debug_assert_eq!(var.idx(), v_idx);
        var
    }

    fn set_var_preference(&mut self, v: Var, pref: i32) {
        self.v.vars.var_preference[v] = pref;
        if self.v.order_heap_data.in_heap(v) {
            self.v.order_heap().update(v);
        }
    }

    // in the API, we can only add clauses at level 0
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool {
        debug!("add toplevel clause {:?}", clause);
        debug_assert_eq!(
            self.v.decision_level(),
            0,
            "add clause at non-zero decision level"
        );
        self.add_clause_(clause)
    }

    fn add_leq_assign_reuse(&mut self, lits: &mut Vec<Lit>, bound: i32, dst: Lit) -> bool {
        debug!("add toplevel LEQ {:?} <= {} <-> {:?}", lits, bound, dst);
        debug_assert_eq!(
            self.v.decision_level(),
            0,
            "add LEQ at non-zero decision level"
        );
        self.add_leq_assign_(lits, bound, dst)
    }

    fn add_geq_assign_reuse(&mut self, lits: &mut Vec<Lit>, bound: i32, dst: Lit) -> bool {
        // (Σ lits ≥ k) ↔ d is (Σ ¬lits ≤ n−k) ↔ d
        for l in lits.iter_mut() {
            *l = !*l;
        }
        let bound = lits.len() as i32 - bound;
        self.add_leq_assign_reuse(lits, bound, dst)
    }

    fn solve_limited(&mut self, assumps: &[Lit]) -> lbool {
        self.asynch_interrupt.store(false, Ordering::SeqCst);
        self.v.assumptions.clear();
        self.v.assumptions.extend_from_slice(assumps);
        self.solve_internal()
    }

    #[inline(always)]
    fn simplify(&mut self) -> bool {
        self.simplify_internal()
    }

    fn set_conflict_budget(&mut self, n: i64) {
        self.v.conflict_budget = if n <= 0 { -1 } else { self.v.conflicts as i64 + n };
    }
    fn set_propagation_budget(&mut self, n: i64) {
        self.v.propagation_budget = if n <= 0 {
            -1
        } else {
            self.v.propagations as i64 + n
        };
    }
    fn budget_off(&mut self) {
        self.v.conflict_budget = -1;
        self.v.propagation_budget = -1;
    }

    fn value_var(&self, v: Var) -> lbool {
        self.model
            .get(v.idx() as usize)
            .map_or(lbool::UNDEF, |&v| v)
    }
    fn value_lit(&self, v: Lit) -> lbool {
        self.value_var(v.var()) ^ !v.sign()
    }
    fn get_model(&self) -> &[lbool] {
        &self.model
    }
    fn is_ok(&self) -> bool {
        self.v.ok
    }

    fn num_vars(&self) -> u32 {
        self.v.num_vars()
    }
    fn num_clauses(&self) -> u64 {
        self.v.num_clauses
    }
    fn num_conflicts(&self) -> u64 {
        self.v.conflicts
    }
    fn num_propagations(&self) -> u64 {
        self.v.propagations
    }
    fn num_decisions(&self) -> u64 {
        self.v.decisions
    }
    fn num_restarts(&self) -> u64 {
        self.v.starts
    }

    fn value_lvl_0(&self, lit: Lit) -> lbool {
        let mut res = self.v.value_lit(lit);
        if self.v.level(lit.var()) != 0 {
            res = lbool::UNDEF;
        }
        res
    }

    fn print_stats(&self) {
        println!("c restarts              : {}", self.v.starts);
        println!("c conflicts             : {:<12}", self.v.conflicts);
        println!(
            "c decisions             : {:<12}   ({:4.2} % random)",
            self.v.decisions,
            self.v.rnd_decisions as f32 * 100.0 / self.v.decisions as f32
        );
        println!("c propagations          : {:<12}", self.v.propagations);
        println!(
            "c conflict literals     : {:<12}   ({:4.2} % deleted)",
            self.v.tot_literals,
            (self.v.max_literals - self.v.tot_literals) as f64 * 100.0 / self.v.max_literals as f64
        );
    }

    fn unsat_core(&self) -> &[Lit] {
        self.conflict.as_slice()
    }

    fn unsat_core_contains_lit(&self, lit: Lit) -> bool {
        self.conflict.has(lit)
    }

    fn unsat_core_contains_var(&self, v: Var) -> bool {
        let lit = Lit::new(v, true);
        self.unsat_core_contains_lit(lit) || self.unsat_core_contains_lit(!lit)
    }

    fn proved_at_lvl_0(&self) -> &[Lit] {
        self.v.vars.proved_at_lvl_0()
    }
}

impl<Cb: Callbacks + Default> Default for Solver<Cb> {
    fn default() -> Self {
        Solver::new(SolverOpts::default(), Default::default())
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Create a new solver with the given options and callbacks.
    pub fn new(opts: SolverOpts, cb: Cb) -> Self {
        assert!(opts.check());
        Self {
            model: vec![],
            conflict: LSet::new(),
            cb,
            clauses: vec![],
            learnts: vec![],
            asynch_interrupt: AtomicBool::new(false),
            v: SolverV::new(&opts),
        }
    }

    /// Temporary access to the callbacks
    pub fn cb_mut(&mut self) -> &mut Cb {
        &mut self.cb
    }

    /// Temporary access to the callbacks
    pub fn cb(&self) -> &Cb {
        &self.cb
    }

    pub fn dimacs_model(&self) -> SolverPrintDimacs<Cb> {
        SolverPrintDimacs { s: self }
    }

    /// Interrupt search asynchronously.
    ///
    /// The current `solve_limited` call (possibly running in another
    /// thread) returns `lbool::UNDEF` as soon as it notices the flag; the
    /// solver stays usable.
    pub fn interrupt_async(&self) {
        self.asynch_interrupt.store(true, Ordering::Relaxed);
    }

    fn has_been_interrupted(&self) -> bool {
        self.asynch_interrupt.load(Ordering::Relaxed)
    }

    fn within_budget(&self) -> bool {
        !self.has_been_interrupted()
            && (self.v.conflict_budget < 0 || self.v.conflicts < self.v.conflict_budget as u64)
            && (self.v.propagation_budget < 0
                || self.v.propagations < self.v.propagation_budget as u64)
            && !self.cb.stop()
    }

    /// Add clause; sorts and simplifies it first.
    fn add_clause_(&mut self, clause: &mut Vec<Lit>) -> bool {
        debug_assert_eq!(self.v.decision_level(), 0);
        if !self.v.ok {
            return false;
        }

        // Check if clause is satisfied and remove false/duplicate literals:
        clause.sort_unstable();
        let mut last_lit = Lit::UNDEF;
        let mut j = 0;
        for i in 0..clause.len() {
            let lit_i = clause[i];
            let value = self.v.value_lit(lit_i);
            if value == lbool::TRUE || lit_i == !last_lit {
                return true; // tauto or satisfied already
            } else if value != lbool::FALSE && lit_i != last_lit {
                // not a duplicate
                last_lit = lit_i;
                clause[j] = lit_i;
                j += 1;
            }
        }
        clause.truncate(j);

        if clause.len() == 0 {
            self.v.ok = false;
            return false;
        } else if clause.len() == 1 {
            self.v.vars.unchecked_enqueue(clause[0], CRef::UNDEF);
            let ok = self.v.propagate().is_none();
            self.v.ok = ok;
            return ok;
        } else {
            let cr = self.v.ca.alloc_with_learnt(&clause, false);
            self.clauses.push(cr);
            self.v.attach_clause(cr);
        }

        true
    }

    /// Add the reified constraint `(Σ lits ≤ bound) ↔ dst`.
    ///
    /// Degenerate bounds reduce to plain clauses over `dst`; otherwise one
    /// counter watcher per literal occurrence is registered.
    fn add_leq_assign_(&mut self, ps: &mut Vec<Lit>, mut bound: i32, dst: Lit) -> bool {
        debug_assert_eq!(self.v.decision_level(), 0);
        if !self.v.ok {
            return false;
        }

        self.v.canonize_leq_clause(ps, &mut bound);

        if let Some(r) = self.try_leq_clause_const_prop(ps, dst, bound) {
            return r;
        }
        if bound == 0 {
            // We do not add watchers on dst, so we handle the case when bound is
            // zero because dst = 1 can imply all lits in this case
            let tmp: Vec<Lit> = ps.clone();
            ps.push(dst);
            if !self.add_clause_(ps) {
                return false;
            }
            for &l in &tmp {
                if !self.add_clause_(&mut vec![!l, !dst]) {
                    return false;
                }
            }
            return true;
        }
        debug_assert!(1 <= bound && bound < ps.len() as i32);

        if ps.len() == 1 {
            let a = dst;
            let b = !ps[0];
            // now the constraint is a == b
            return self.add_clause_(&mut vec![!a, b]) && self.add_clause_(&mut vec![!b, a]);
        }

        self.add_leq_and_setup_watchers(ps, dst, bound);
        true
    }

    /// Constant-propagate a LEQ whose bound makes it trivially true or
    /// false: the constraint reduces to a value for `dst`.
    fn try_leq_clause_const_prop(&mut self, ps: &[Lit], dst: Lit, bound: i32) -> Option<bool> {
        let val = if ps.len() as i32 <= bound {
            lbool::TRUE
        } else if bound < 0 {
            lbool::FALSE
        } else {
            return None;
        };
        let dst_val = self.v.value_lit(dst);
        if dst_val == lbool::UNDEF {
            // setup the value for dst
            self.v
                .vars
                .unchecked_enqueue(if val == lbool::TRUE { dst } else { !dst }, CRef::UNDEF);
            let ok = self.v.propagate().is_none();
            self.v.ok = ok;
            return Some(ok);
        }
        if dst_val == val {
            return Some(true);
        }
        self.v.ok = false;
        Some(false)
    }

    /// Allocate the LEQ clause and register one counter watcher per
    /// literal occurrence.
    ///
    /// # Panics
    ///
    /// Panics if the constraint has `(1 << 14) - 10` literals or more.
    fn add_leq_and_setup_watchers(&mut self, ps: &[Lit], dst: Lit, bound: i32) {
        if ps.len() >= (1 << 14) - 10 {
            panic!("LEQ too large");
        }
        let cr = self.v.ca.alloc_leq(ps, dst, bound as u32);
        self.clauses.push(cr);
        debug_assert_eq!(
            self.v.ca.get_ref(cr).status_ref(),
            cr + ps.len() as u32 + LeqStatus::OFFSET_IN_CLAUSE
        );

        // note that duplicated lits are naturally handled by adding multiple
        // watchers
        for &p in ps {
            let watcher = LeqWatcher::new(bound as u32, p.sign(), ps.len() as u32, cr);
            self.v.leq_watches_data[p.var()].push(watcher);
        }

        self.v.num_clauses += 1;
        self.v.clauses_literals += ps.len() as u64 + 1;
    }

    /// Main solve method (assumptions given in `self.v.assumptions`).
    fn solve_internal(&mut self) -> lbool {
        debug_assert_eq!(self.v.decision_level(), 0);
        self.model.clear();
        self.conflict.clear();
        if !self.v.ok {
            return lbool::FALSE;
        }

        // first try simplify() for top-level unit propagation
        if !self.simplify_internal() {
            return lbool::FALSE;
        }

        self.v.solves += 1;
        let mut tmp_learnt: Vec<Lit> = vec![];

        self.v.max_learnts = self.v.num_clauses as f64 * self.v.learntsize_factor;
        if self.v.max_learnts < self.v.min_learnts_lim as f64 {
            self.v.max_learnts = self.v.min_learnts_lim as f64;
        }

        self.v.learntsize_adjust_confl = self.v.learntsize_adjust_start_confl as f64;
        self.v.learntsize_adjust_cnt = self.v.learntsize_adjust_confl as i32;
        let mut status;

        info!("search.start");
        self.cb.on_start();

        // Search:
        let mut curr_restarts: i32 = 0;
        loop {
            let rest_base = if self.v.luby_restart {
                utils::luby(self.v.restart_inc, curr_restarts)
            } else {
                f64::powi(self.v.restart_inc, curr_restarts)
            };
            let nof_conflicts = (rest_base * self.v.restart_first as f64) as i32;
            status = self.search(nof_conflicts, &mut tmp_learnt);
            if !self.within_budget() {
                break;
            }

            if status != lbool::UNDEF {
                break;
            } else {
                info!("search.restart({})", curr_restarts);
                curr_restarts += 1;
                self.cb.on_restart();
            }
        }

        self.cb.on_result(status);

        if status == lbool::TRUE {
            // Extend & copy model:
            let num_vars = self.num_vars();
            self.model.resize(num_vars as usize, lbool::UNDEF);
            for i in 0..num_vars {
                self.model[i as usize] = self.v.value(Var::from_idx(i));
            }
        } else if status == lbool::FALSE && self.conflict.len() == 0 {
            // NOTE: we may return `false` without an empty conflict in case we had assumptions. In
            // this case `self.conflict` contains the unsat-core but adding new clauses might
            // succeed in the absence of these assumptions.
            self.v.ok = false;
        }

        self.cancel_until(0);
        debug!("res: {:?}", status);
        status
    }

    /// Search for a model the specified number of conflicts.
    ///
    /// Use negative value for `nof_conflicts` indicate infinity.
    ///
    /// # Output:
    ///
    /// - `lbool::TRUE` if a partial assigment that is consistent with respect to the clauseset is found. If
    ///    all variables are decision variables, this means that the clause set is satisfiable.
    /// - `lbool::FALSE` if the clause set is unsatisfiable.
    /// - `lbool::UNDEF` if the bound on number of conflicts is reached.
    fn search(&mut self, nof_conflicts: i32, tmp_learnt: &mut Vec<Lit>) -> lbool {
        debug_assert!(self.v.ok);
        let mut conflict_c = 0;
        self.v.starts += 1;

        loop {
            let confl = self.v.propagate();

            if let Some(confl) = confl {
                // CONFLICT
                self.v.conflicts += 1;
                conflict_c += 1;
                if self.v.decision_level() == 0 {
                    return lbool::FALSE;
                }

                tmp_learnt.clear();
                let backtrack_level = self.v.analyze(confl, &self.learnts, tmp_learnt);
                self.cb.on_new_clause(tmp_learnt, clause::Kind::Learnt);
                self.cancel_until(backtrack_level as u32);

                if tmp_learnt.len() == 1 {
                    self.v.vars.unchecked_enqueue(tmp_learnt[0], CRef::UNDEF);
                } else {
                    let cr = self.v.ca.alloc_with_learnt(tmp_learnt, true);
                    self.learnts.push(cr);
                    self.v.attach_clause(cr);
                    self.v.cla_bump_activity(&self.learnts, cr);
                    self.v.vars.unchecked_enqueue(tmp_learnt[0], cr);
                }

                self.v.vars.var_decay_activity();
                self.v.cla_decay_activity();

                self.v.learntsize_adjust_cnt -= 1;
                if self.v.learntsize_adjust_cnt == 0 {
                    self.v.learntsize_adjust_confl *= self.v.learntsize_adjust_inc;
                    self.v.learntsize_adjust_cnt = self.v.learntsize_adjust_confl as i32;
                    self.v.max_learnts *= self.v.learntsize_inc;

                    let trail_lim_head = self
                        .v
                        .vars
                        .trail_lim
                        .first()
                        .map(|s| s.lit)
                        .unwrap_or(self.v.vars.trail.len() as i32);
                    let v = &self.v;
                    self.cb.on_progress(|| ProgressStatus {
                        conflicts: v.conflicts as i32,
                        dec_vars: v.dec_vars as i32 - trail_lim_head,
                        n_clauses: v.num_clauses,
                        n_clause_lits: v.clauses_literals as i32,
                        max_learnt: v.max_learnts as i32,
                        n_learnt: v.num_learnts,
                        n_learnt_lits: v.learnts_literals as f64 / v.num_learnts as f64,
                        progress_estimate: v.progress_estimate() * 100.0,
                    });
                }
            } else {
                // NO CONFLICT
                if (nof_conflicts >= 0 && conflict_c >= nof_conflicts) || !self.within_budget() {
                    // Reached bound on number of conflicts:
                    self.v.progress_estimate = self.v.progress_estimate();
                    self.cancel_until(0);
                    return lbool::UNDEF;
                }

                // Simplify the set of problem clauses:
                if self.v.decision_level() == 0 && !self.simplify_internal() {
                    return lbool::FALSE;
                }

                if self.learnts.len() as f64 - self.v.num_assigns() as f64 >= self.v.max_learnts {
                    // Reduce the set of learnt clauses:
                    self.reduce_db();
                }

                // select the next decision (using assumptions, or the variable heap)
                let mut next = Lit::UNDEF;
                while (self.v.decision_level() as usize) < self.v.assumptions.len() {
                    // Perform user provided assumption:
                    let p = self.v.assumptions[self.v.decision_level() as usize];
                    if self.v.value_lit(p) == lbool::TRUE {
                        // Dummy decision level, since `p` is true already:
                        self.v.new_decision_level();
                    } else if self.v.value_lit(p) == lbool::FALSE {
                        let mut conflict = mem::replace(&mut self.conflict, LSet::new());
                        self.v.analyze_final(!p, &mut conflict);
                        self.conflict = conflict;
                        return lbool::FALSE;
                    } else {
                        next = p;
                        break;
                    }
                }

                if next == Lit::UNDEF {
                    // New variable decision:
                    next = self.v.pick_branch_lit();

                    if next == Lit::UNDEF {
                        // Model found:
                        return lbool::TRUE;
                    }
                    self.v.decisions += 1;
                }

                // Increase decision level and enqueue `next`
                // with no justification since it's a decision
                debug!("pick-next {:?}", next);
                self.v.new_decision_level();
                self.v.vars.unchecked_enqueue(next, CRef::UNDEF);
            }
        }
    }

    /// Remove half of the learnt clauses, minus the clauses locked by the current assignment. Locked
    /// clauses are clauses that are reason to some assignment. Binary clauses are never removed.
    fn reduce_db(&mut self) {
        let extra_lim = self.v.cla_inc / self.learnts.len() as f64; // Remove any clause below this activity

        debug!("reduce_db.start");

        {
            let ca = &self.v.ca;
            self.learnts.sort_unstable_by(|&x, &y| {
                let x = ca.get_ref(x);
                let y = ca.get_ref(y);
                debug_assert!(x.learnt());
                debug_assert!(y.learnt());
                Ord::cmp(&(x.size() <= 2), &(y.size() <= 2)).then(
                    PartialOrd::partial_cmp(&x.activity(), &y.activity()).expect("NaN activity"),
                )
            });
        }
        // Don't delete binary or locked clauses. From the rest, delete clauses from the first half
        // and clauses with activity smaller than `extra_lim`:
        let mut j = 0;
        for i in 0..self.learnts.len() {
            let cr = self.learnts[i];
            let cond = {
                let c = self.v.ca.get_ref(cr);
                c.size() > 2
                    && !self.v.locked(c)
                    && (i < self.learnts.len() / 2 || (c.activity() as f64) < extra_lim)
            };
            if cond {
                self.v.remove_clause(cr);
                self.cb.on_delete_clause(self.v.ca.get_ref(cr).lits());
            } else {
                self.learnts[j] = cr;
                j += 1;
            }
        }

        let _deleted = self.learnts.len() - j;
        self.learnts.truncate(j);
        debug!("reduce_db.done (deleted {})", _deleted);

        self.check_garbage();
    }

    /// Shrink the given set to contain only non-satisfied clauses.
    fn remove_satisfied(&mut self, which: ClauseSetSelect) {
        debug_assert_eq!(self.v.decision_level(), 0);
        let cs: &mut Vec<CRef> = match which {
            ClauseSetSelect::Learnt => &mut self.learnts,
            ClauseSetSelect::Original => &mut self.clauses,
        };
        let self_v = &mut self.v;
        let cb = &mut self.cb;
        cs.retain(|&cr| {
            let satisfied = self_v.satisfied(self_v.ca.get_ref(cr));
            if satisfied {
                self_v.remove_clause(cr);
                cb.on_delete_clause(self_v.ca.get_ref(cr).lits());
            }
            !satisfied
        });
    }

    /// Simplify the clause database according to the current top-level
    /// assigment, removing satisfied clauses.
    ///
    /// Only called at decision level 0. Returns `false` on a top-level
    /// conflict.
    fn simplify_internal(&mut self) -> bool {
        debug_assert_eq!(self.v.decision_level(), 0);

        if !self.v.ok || self.v.propagate().is_some() {
            self.v.ok = false;
            return false;
        }

        if self.v.num_assigns() as i32 == self.v.simp_db_assigns || self.v.simp_db_props > 0 {
            return true;
        }

        self.remove_satisfied(ClauseSetSelect::Learnt); // Remove satisfied learnt clauses
        if self.v.remove_satisfied {
            self.remove_satisfied(ClauseSetSelect::Original); // remove satisfied normal clauses

            // we will never need to backtrack below 0, so the LEQ journal can
            // be dropped; this is also necessary because entries for removed
            // constraints would dangle after garbage collection
            self.v.trail_leq_stat.clear();
            // remove watchers on removed constraints
            self.v.leq_watches().clean_all();
        }
        self.check_garbage();
        self.v.rebuild_order_heap();

        self.v.simp_db_assigns = self.v.num_assigns() as i32;
        // (shouldn't depend on stats really, but it will do for now)
        self.v.simp_db_props = (self.v.clauses_literals + self.v.learnts_literals) as i64;

        true
    }

    /// Revert to the state at given level (keeping all assignment at `level` but not beyond).
    fn cancel_until(&mut self, level: u32) {
        self.v.cancel_until(level);
    }

    /// Garbage collect the clause allocator by moving alive clauses into
    /// another allocator.
    fn garbage_collect(&mut self) {
        // Initialize the next region to a size corresponding to the estimated utilization degree. This
        // is not precise but should avoid some unnecessary reallocations for the new region:
        let mut to = ClauseAllocator::with_start_cap(self.v.ca.len() - self.v.ca.wasted());

        self.reloc_all(&mut to);

        self.cb.on_gc(
            (self.v.ca.len() * ClauseAllocator::UNIT_SIZE) as usize,
            (to.len() * ClauseAllocator::UNIT_SIZE) as usize,
        );
        self.v.ca = to;
    }

    /// Check whether the space wasted by dead clauses in the clause allocator exceeds
    /// the threshold
    fn check_garbage(&mut self) {
        if self.v.ca.wasted() as f64 > self.v.ca.len() as f64 * self.v.garbage_frac {
            self.garbage_collect();
        }
    }

    /// Move all clauses to the allocator `to`, rewriting every reference
    /// (clause lists, journal, watches, reasons).
    fn reloc_all(&mut self, to: &mut ClauseAllocator) {
        // Remove watchers on deleted clauses:
        self.v.watches().clean_all();
        self.v.leq_watches().clean_all();

        // All original:
        // note that we move original clauses first so LEQ clauses are placed
        // near the beginning of the new arena
        for cr in self.clauses.iter_mut() {
            self.v.ca.reloc(cr, to);
        }

        // All refs to status blocks in the journal. Relocating an LEQ clause
        // left its new CRef in the old status cell:
        for log in self.v.trail_leq_stat.iter_mut() {
            let new_cr = self.v.ca.leq_status(log.status_ref()).cref_after_reloc();
            let c = to.get_ref(new_cr);
            debug_assert!(c.is_leq());
            log.set_status_ref(c.status_ref());
        }

        // All watcher refs:
        for v in (0..self.v.num_vars()).map(Var::from_idx) {
            for s in 0..2 {
                let p = Lit::new(v, s != 0);
                for watch in &mut self.v.watches_data[p] {
                    self.v.ca.reloc(&mut watch.cref, to);
                }
            }
            for watch in &mut self.v.leq_watches_data[v] {
                self.v.ca.reloc(&mut watch.cref, to);
            }
        }

        // All reasons:
        // note: reasons are only meaningful for vars in the trail
        for i in 0..self.v.vars.trail.len() {
            let v = self.v.vars.trail[i].var();
            if self.v.vars.vardata[v].reason != CRef::UNDEF {
                self.v.ca.reloc(&mut self.v.vars.vardata[v].reason, to);
            }
        }

        // All learnt:
        for cr in self.learnts.iter_mut() {
            self.v.ca.reloc(cr, to);
        }
    }

    /// Write the current set of unsatisfied original clauses (and the given
    /// assumptions, as unit clauses) in DIMACS, with a compacted variable
    /// renumbering. LEQ constraints are written in the cardinality line
    /// syntax accepted by the parser.
    pub fn to_dimacs<W: io::Write>(&self, out: &mut W, assumps: &[Lit]) -> io::Result<()> {
        // Handle case when solver is in contradictory state:
        if !self.v.ok {
            return write!(out, "p cnf 1 2\n1 0\n-1 0\n");
        }

        let mut map: VMap<i32> = VMap::new();
        let mut max: i32 = 0;

        fn map_var(map: &mut VMap<i32>, max: &mut i32, x: Var) -> i32 {
            map.reserve(x, -1);
            if map[x] == -1 {
                map[x] = *max;
                *max += 1;
            }
            map[x]
        }

        let mut cnt = 0;
        for &cr in &self.clauses {
            let c = self.v.ca.get_ref(cr);
            if self.v.satisfied(c) {
                continue;
            }
            cnt += 1;
            if c.is_leq() {
                for &l in c.lits() {
                    map_var(&mut map, &mut max, l.var());
                }
                map_var(&mut map, &mut max, c.leq_dst().var());
            } else {
                for &l in c.lits() {
                    if self.v.value_lit(l) != lbool::FALSE {
                        map_var(&mut map, &mut max, l.var());
                    }
                }
            }
        }

        // Assumptions are added as unit clauses:
        cnt += assumps.len();
        for &a in assumps {
            map_var(&mut map, &mut max, a.var());
        }

        writeln!(out, "p cnf {} {}", max, cnt)?;

        for &a in assumps {
            debug_assert!(self.v.value_lit(a) != lbool::FALSE);
            writeln!(
                out,
                "{}{} 0",
                if a.sign() { "" } else { "-" },
                map_var(&mut map, &mut max, a.var()) + 1
            )?;
        }

        for &cr in &self.clauses {
            let c = self.v.ca.get_ref(cr);
            if self.v.satisfied(c) {
                continue;
            }
            if c.is_leq() {
                for &l in c.lits() {
                    write!(
                        out,
                        "{}{} ",
                        if l.sign() { "" } else { "-" },
                        map_var(&mut map, &mut max, l.var()) + 1
                    )?;
                }
                let d = c.leq_dst();
                writeln!(
                    out,
                    "<= {} # {}{}",
                    c.leq_bound(),
                    if d.sign() { "" } else { "-" },
                    map_var(&mut map, &mut max, d.var()) + 1
                )?;
            } else {
                for &l in c.lits() {
                    if self.v.value_lit(l) != lbool::FALSE {
                        write!(
                            out,
                            "{}{} ",
                            if l.sign() { "" } else { "-" },
                            map_var(&mut map, &mut max, l.var()) + 1
                        )?;
                    }
                }
                writeln!(out, "0")?;
            }
        }
        Ok(())
    }
}

impl SolverV {
    #[inline(always)]
    pub fn num_assigns(&self) -> u32 {
        self.vars.num_assigns()
    }

    #[inline(always)]
    fn num_vars(&self) -> u32 {
        self.next_var.idx()
    }

    #[inline(always)]
    pub fn level(&self, x: Var) -> i32 {
        self.vars.level(x)
    }

    #[inline(always)]
    pub fn value(&self, x: Var) -> lbool {
        self.vars.value(x)
    }

    #[inline(always)]
    pub fn value_lit(&self, x: Lit) -> lbool {
        self.vars.value_lit(x)
    }

    #[inline(always)]
    pub fn decision_level(&self) -> u32 {
        self.vars.decision_level()
    }

    #[inline(always)]
    fn reason(&self, x: Var) -> CRef {
        self.vars.reason(x)
    }

    fn order_heap(&mut self) -> Heap<Var, VarOrder> {
        self.order_heap_data.promote(VarOrder {
            activity: &self.vars.activity,
            var_preference: &self.vars.var_preference,
        })
    }

    fn set_decision_var(&mut self, v: Var, b: bool) {
        if b && !self.decision[v] {
            self.dec_vars += 1;
        } else if !b && self.decision[v] {
            self.dec_vars -= 1;
        }
        self.decision[v] = b;
        self.insert_var_order(v);
    }

    fn insert_var_order(&mut self, x: Var) {
        if !self.order_heap_data.in_heap(x) && self.decision[x] {
            self.order_heap().insert(x);
        }
    }

    fn cla_decay_activity(&mut self) {
        self.cla_inc *= 1.0 / self.clause_decay;
    }

    fn cla_bump_activity(&mut self, learnts: &[CRef], cr: CRef) {
        let new_activity = {
            let mut c = self.ca.get_mut(cr);
            let r = c.activity() + self.cla_inc as f32;
            c.set_activity(r);
            r
        };
        if new_activity > 1e20 {
            // Rescale:
            for &learnt in learnts.iter() {
                let mut c = self.ca.get_mut(learnt);
                let r = c.activity() * 1e-20;
                c.set_activity(r);
            }
            self.cla_inc *= 1e-20;
        }
    }

    /// Pick a literal to make a decision with
    fn pick_branch_lit(&mut self) -> Lit {
        let mut next = Var::UNDEF;

        // Random decision:
        if utils::drand(&mut self.random_seed) < self.random_var_freq
            && !self.order_heap_data.is_empty()
        {
            let idx_tmp =
                utils::irand(&mut self.random_seed, self.order_heap_data.len() as i32) as usize;
            next = self.order_heap_data[idx_tmp];
            if self.value(next) == lbool::UNDEF && self.decision[next] {
                self.rnd_decisions += 1;
            }
        }

        // Activity based decision:
        while next == Var::UNDEF || self.value(next) != lbool::UNDEF || !self.decision[next] {
            let mut order_heap = self.order_heap();
            if order_heap.is_empty() {
                next = Var::UNDEF;
                break;
            } else {
                next = order_heap.remove_min();
            }
        }

        // Choose polarity based on different polarity modes (global or per-variable):
        if next == Var::UNDEF {
            Lit::UNDEF
        } else if self.user_pol[next] != lbool::UNDEF {
            Lit::new(next, self.user_pol[next] == lbool::TRUE)
        } else if self.rnd_pol {
            Lit::new(next, utils::drand(&mut self.random_seed) < 0.5)
        } else {
            Lit::new(next, self.polarity[next])
        }
    }

    fn watches(&mut self) -> OccLists<Lit, Watcher, WatcherDeleted> {
        self.watches_data.promote(WatcherDeleted { ca: &self.ca })
    }

    fn leq_watches(&mut self) -> OccLists<Var, LeqWatcher, LeqWatcherDeleted> {
        self.leq_watches_data
            .promote(LeqWatcherDeleted { ca: &self.ca })
    }

    fn new_var(&mut self, upol: lbool, dvar: bool) -> Var {
        let v = self.next_var;
        self.next_var = Var::from_idx(self.next_var.idx() + 1);
        self.watches().init(Lit::new(v, false));
        self.watches().init(Lit::new(v, true));
        self.leq_watches().init(v);
        self.vars.ass.insert_default(v, lbool::UNDEF);
        self.vars
            .vardata
            .insert_default(v, VarData::new(CRef::UNDEF, 0));
        if self.rnd_init_act {
            self.vars
                .activity
                .insert_default(v, utils::drand(&mut self.random_seed) * 0.00001);
        } else {
            self.vars.activity.insert_default(v, 0.0);
        }
        self.vars.var_preference.insert_default(v, 0);
        self.seen.insert_default(v, Seen::UNDEF);
        self.polarity.insert_default(v, false);
        self.user_pol.insert_default(v, upol);
        self.decision.reserve_default(v);
        let len = self.vars.trail.len();
        if v.idx() as usize > len {
            self.vars.trail.reserve(v.idx() as usize + 1 - len);
        }
        self.set_decision_var(v, dvar);
        v
    }

    /// Begins a new decision level, recording both the trail position and
    /// the LEQ journal position.
    fn new_decision_level(&mut self) {
        trace!("new decision level {}", 1 + self.decision_level());
        let sep = TrailSep {
            lit: self.vars.trail.len() as i32,
            leq: self.trail_leq_stat.len() as i32,
        };
        self.vars.trail_lim.push(sep);
    }

    /// Sort, drop assigned literals, and cancel complementary pairs of a
    /// LEQ literal vector, adjusting the bound along the way.
    fn canonize_leq_clause(&self, ps: &mut Vec<Lit>, bound: &mut i32) {
        ps.sort_unstable();
        let mut p = Lit::UNDEF;
        let mut j = 0usize;
        for i in 0..ps.len() {
            let l = ps[i];
            if self.value_lit(l) == lbool::TRUE {
                *bound -= 1;
                continue;
            }
            if self.value_lit(l) == lbool::FALSE {
                continue;
            }
            if l == !p {
                // remove previous literal; the pair contributes exactly one
                // true literal whatever the assignment
                j -= 1;
                *bound -= 1;
                p = if j > 0 { ps[j - 1] } else { Lit::UNDEF };
                continue;
            }
            ps[j] = l;
            p = l;
            j += 1;
        }
        ps.truncate(j);
    }

    /// Analyze conflict and produce a reason clause.
    ///
    /// # Pre-conditions:
    ///
    /// - `out_learnt` is cleared by this function.
    /// - current decision level must be greater than root level.
    ///
    /// # Post-conditions:
    ///
    /// - the backtrack level is returned.
    /// - `out_learnt[0]` is the asserting literal at the returned level.
    /// - if `out_learnt.len() > 1` then `out_learnt[1]` has the greatest decision level of the
    ///   rest of literals. There may be others from the same level though.
    fn analyze(&mut self, orig: CRef, learnts: &[CRef], out_learnt: &mut Vec<Lit>) -> i32 {
        out_learnt.clear();
        out_learnt.push(Lit::UNDEF); // (leave room for the asserting literal)

        debug!("analyze.start {:?}", orig);
        let conflict_level = self.decision_level() as i32;
        debug_assert!(conflict_level > 0);

        let mut confl = orig;
        let mut path_c: i32 = 0;
        let mut p = Lit::UNDEF;
        let mut index = self.vars.trail.len();

        loop {
            debug_assert_ne!(confl, CRef::UNDEF); // (otherwise should be UIP)

            if self.ca.get_ref(confl).is_leq() {
                // the antecedents of a fired LEQ are the known literals its
                // status partitioned to the front, plus the destination
                // unless the destination itself was the implied literal.
                // note: this code has a twin in `lit_redundant`
                let c = self.ca.get_ref(confl);
                let stat = c.leq_status();
                debug_assert_ne!(stat.imply_type(), LeqStatus::IMPLY_NONE);
                let is_true = stat.precond_is_true();
                let size = if is_true {
                    stat.nr_true()
                } else {
                    stat.nr_false()
                } as usize;
                for k in 0..=size {
                    let q = if k < size {
                        c.lits()[k] ^ is_true
                    } else {
                        if stat.imply_type() == LeqStatus::IMPLY_DST {
                            break;
                        }
                        c.leq_dst() ^ is_true
                    };
                    add_antecedent(
                        &mut self.vars,
                        &mut self.order_heap_data,
                        &mut self.seen,
                        out_learnt,
                        &mut path_c,
                        conflict_level,
                        q,
                    );
                }
            } else {
                if self.ca.get_ref(confl).learnt() {
                    self.cla_bump_activity(learnts, confl);
                }
                let c = self.ca.get_ref(confl);
                // note: c[0] is the propagated literal except on the first
                // iteration (see propagate())
                let start = if p == Lit::UNDEF { 0 } else { 1 };
                for &q in &c.lits()[start..] {
                    add_antecedent(
                        &mut self.vars,
                        &mut self.order_heap_data,
                        &mut self.seen,
                        out_learnt,
                        &mut path_c,
                        conflict_level,
                        q,
                    );
                }
            }

            // Select next clause to look at:
            while !self.seen[self.vars.trail[index - 1].var()].is_seen() {
                index -= 1;
            }
            p = self.vars.trail[index - 1];
            index -= 1;
            confl = self.vars.reason(p.var());
            self.seen[p.var()] = Seen::REMOVABLE;
            path_c -= 1;

            if path_c <= 0 {
                break;
            }
        }

        // cleanup literals flagged `REMOVABLE`
        index = self.vars.trail.len() - 1;
        loop {
            let q = self.vars.trail[index];
            if self.seen[q.var()] == Seen::REMOVABLE {
                self.seen[q.var()] = Seen::UNDEF;
            }
            if q == p {
                break;
            }
            index -= 1;
        }

        debug_assert!(self.value_lit(p) == lbool::TRUE);
        out_learnt[0] = !p;

        self.max_literals += out_learnt.len() as u64;
        self.minimize_conflict(out_learnt);

        // Find correct backtrack level:
        let btlevel = if out_learnt.len() == 1 {
            0
        } else {
            let mut max_i = 1;
            let mut max_level = self.level(out_learnt[max_i].var());
            // Find the first literal assigned at the next-highest level:
            for i in 2..out_learnt.len() {
                let level = self.level(out_learnt[i].var());
                if level > max_level {
                    max_i = i;
                    max_level = level;
                }
            }
            // Swap-in this literal at index 1:
            out_learnt.swap(max_i, 1);
            max_level
        };

        for &lit in &self.analyze_toclear {
            self.seen[lit.var()] = Seen::UNDEF; // (`seen[]` is now cleared)
        }
        debug_assert!(out_learnt
            .iter()
            .all(|&l| self.value_lit(l) == lbool::FALSE));

        btlevel
    }

    /// An abstraction of the level of a variable
    #[inline]
    fn abstract_level(&self, v: Var) -> u32 {
        abstract_level(&self.vars, v)
    }

    /// Conflict-clause minimization, controlled by `ccmin_mode`.
    ///
    /// # Panics
    ///
    /// With `ccmin_mode == 1`, panics when a literal of the learnt clause
    /// was implied by a LEQ constraint (unimplemented combination).
    fn minimize_conflict(&mut self, out_learnt: &mut Vec<Lit>) {
        // Simplify conflict clause:
        self.analyze_toclear.clear();
        self.analyze_toclear.extend_from_slice(&out_learnt);
        let new_size = if self.ccmin_mode == 2 {
            let mut abstract_levels = 0;
            for a in out_learnt[1..].iter() {
                abstract_levels |= self.abstract_level(a.var())
            }

            let mut j = 1;
            for i in 1..out_learnt.len() {
                let lit = out_learnt[i];
                // can eliminate `lit` only if it's redundant *and* not a decision
                if self.reason(lit.var()) == CRef::UNDEF
                    || !self.lit_redundant(lit, abstract_levels)
                {
                    out_learnt[j] = lit;
                    j += 1;
                }
            }
            j
        } else if self.ccmin_mode == 1 {
            let mut j = 1;
            for i in 1..out_learnt.len() {
                let lit = out_learnt[i];
                let x = lit.var();
                let reason = self.reason(x);

                if reason == CRef::UNDEF {
                    out_learnt[j] = lit;
                    j += 1;
                } else {
                    let c = self.ca.get_ref(reason);
                    if c.is_leq() {
                        panic!("ccmin=1 for LEQ clause unimplemented");
                    }
                    for k in 1..c.size() {
                        let v = c[k].var();
                        if !self.seen[v].is_seen() && self.vars.level(v) > 0 {
                            out_learnt[j] = lit;
                            j += 1;
                            break;
                        }
                    }
                }
            }
            j
        } else {
            out_learnt.len()
        };

        self.tot_literals += new_size as u64;
        debug_assert!(new_size <= out_learnt.len());
        out_learnt.truncate(new_size);
    }

    /// Check if `p` can be removed from a conflict clause `C`.
    ///
    /// It can be removed from `C` if it is propagation-implied
    /// by literals of level 0 exclusively or if `C x p.reason` subsumes `C`.
    fn lit_redundant(&mut self, p: Lit, abstract_levels: u32) -> bool {
        self.minimize_stack.clear();
        self.minimize_stack.push(p);

        let top = self.analyze_toclear.len();

        while self.minimize_stack.len() > 0 {
            let q = *self.minimize_stack.last().unwrap();
            let cr = self.reason(q.var());
            debug_assert_ne!(cr, CRef::UNDEF);
            self.minimize_stack.pop();

            let c = self.ca.get_ref(cr);
            if c.is_leq() {
                // twin of the LEQ antecedent enumeration in `analyze`
                let stat = c.leq_status();
                debug_assert_ne!(stat.imply_type(), LeqStatus::IMPLY_NONE);
                let is_true = stat.precond_is_true();
                let size = if is_true {
                    stat.nr_true()
                } else {
                    stat.nr_false()
                } as usize;
                for k in 0..=size {
                    let l = if k < size {
                        c.lits()[k] ^ is_true
                    } else {
                        if stat.imply_type() == LeqStatus::IMPLY_DST {
                            break;
                        }
                        c.leq_dst() ^ is_true
                    };
                    if !add_redundant_antecedent(
                        &self.vars,
                        &mut self.seen,
                        &mut self.minimize_stack,
                        &mut self.analyze_toclear,
                        abstract_levels,
                        top,
                        l,
                    ) {
                        return false;
                    }
                }
            } else {
                for &l in c.lits()[1..].iter() {
                    if !add_redundant_antecedent(
                        &self.vars,
                        &mut self.seen,
                        &mut self.minimize_stack,
                        &mut self.analyze_toclear,
                        abstract_levels,
                        top,
                        l,
                    ) {
                        return false;
                    }
                }
            }
        }

        // note that we do not clear seen[] here because all visited lits are
        // redundant and can be used to block other lits

        true
    }

    /// Specialized analysis procedure to express the final conflict in terms of assumptions.
    /// Calculates the (possibly empty) set of assumptions that led to the assignment of `p`, and
    /// stores the result in `out_conflict`.
    ///
    /// # Panics
    ///
    /// Panics when a LEQ constraint appears as a reason in the derivation
    /// (unimplemented combination).
    fn analyze_final(&mut self, p: Lit, out_conflict: &mut LSet) {
        out_conflict.clear();
        out_conflict.insert(p);
        debug!("analyze_final lit={:?}", p);

        if self.decision_level() == 0 {
            return; // no assumptions
        }

        self.seen[p.var()] = Seen::SOURCE;

        let start = self.vars.trail_lim[0].lit as usize;
        for i in (start..self.vars.trail.len()).rev() {
            let lit = self.vars.trail[i];
            let x = lit.var();
            if self.seen[x].is_seen() {
                let reason = self.reason(x);
                if reason == CRef::UNDEF {
                    debug_assert!(self.vars.level(x) > 0);
                    out_conflict.insert(!lit);
                } else {
                    let c = self.ca.get_ref(reason);
                    if c.is_leq() {
                        panic!("assumptions with LEQ clause not implemented");
                    }
                    for j in 1..c.size() {
                        if self.vars.level(c[j].var()) > 0 {
                            self.seen[c[j].var()] = Seen::SOURCE;
                        }
                    }
                }
                self.seen[x] = Seen::UNDEF;
            }
        }

        self.seen[p.var()] = Seen::UNDEF;
        debug_assert!(self.seen.iter().all(|(_, &s)| s == Seen::UNDEF));
    }

    /// Propagates all enqueued facts over both disjunction watches and LEQ
    /// counter watches.
    ///
    /// If a conflict arises, the conflicting clause is returned,
    /// otherwise `None`.
    ///
    /// # Post-conditions:
    ///
    /// - the propagation queue is empty, even if there was a conflict.
    fn propagate(&mut self) -> Option<CRef> {
        let mut confl = None;
        let mut num_props: u32 = 0;

        while (self.qhead as usize) < self.vars.trail.len() {
            // `p` is the next enqueued fact to propagate.
            let p = self.vars.trail[self.qhead as usize];
            self.qhead += 1;
            let watches_data_ptr: *mut OccListsData<_, _> = &mut self.watches_data;
            let ws = self
                .watches_data
                .lookup_mut_pred(p, &WatcherDeleted { ca: &self.ca });
            let mut i: usize = 0;
            let mut j: usize = 0;
            let end: usize = ws.len();
            num_props += 1;
            'clauses: while i < end {
                // Try to avoid inspecting the clause:
                let blocker = ws[i].blocker;
                if self.vars.value_lit(blocker) == lbool::TRUE {
                    ws[j] = ws[i];
                    j += 1;
                    i += 1;
                    continue;
                }

                // Make sure the false literal is data[1]:
                let cr = ws[i].cref;
                let mut c = self.ca.get_mut(cr);
                let false_lit = !p;
                if c[0] == false_lit {
                    c[0] = c[1];
                    c[1] = false_lit;
                }
                debug_assert_eq!(c[1], false_lit);
                i += 1;

                // If 0th watch is true, then clause is already satisfied.
                let first = c[0];
                let w = Watcher::new(cr, first);
                if first != blocker && self.vars.value_lit(first) == lbool::TRUE {
                    ws[j] = w;
                    j += 1;
                    continue;
                }

                // Look for new watch:
                for k in 2..c.size() {
                    if self.vars.value_lit(c[k]) != lbool::FALSE {
                        c[1] = c[k];
                        c[k] = false_lit;

                        // safe because `!c[1] != p`, so watches are not aliased
                        debug_assert_ne!(!c[1], p);
                        unsafe { &mut (&mut (*watches_data_ptr))[!c[1]] }.push(w);
                        continue 'clauses;
                    }
                }

                // Did not find watch -- clause is unit under assignment:
                ws[j] = w;
                j += 1;
                if self.vars.value_lit(first) == lbool::FALSE {
                    confl = Some(cr);
                    self.qhead = self.vars.trail.len() as i32;
                    // Copy the remaining watches:
                    while i < end {
                        ws[j] = ws[i];
                        j += 1;
                        i += 1;
                    }
                } else {
                    self.vars.unchecked_enqueue(first, cr);
                }
            }
            let dummy = Watcher::DUMMY;
            ws.resize(j, dummy);

            if confl.is_none() {
                confl = self.propagate_leq(p);
            }
        }
        self.propagations += num_props as u64;
        self.simp_db_props -= num_props as i64;

        confl
    }

    /// Counter-based propagation of the LEQ constraints containing the
    /// variable of the newly assigned `new_fact`.
    ///
    /// Every counter update is journaled so `cancel_until` can rewind it;
    /// a constraint that already fired (`imply_type` set) is skipped until
    /// backtracking clears it.
    ///
    /// # Panics
    ///
    /// Panics if a status cell lives above the 2^30 arena boundary (the
    /// journal packs status refs in 30 bits).
    fn propagate_leq(&mut self, new_fact: Lit) -> Option<CRef> {
        let fact_sign = new_fact.sign();
        let v = new_fact.var();

        let watcher_size = self.leq_watches_data[v].len();
        for watcher_idx in 0..watcher_size {
            let watch = self.leq_watches_data[v][watcher_idx];
            let sref = watch.status_ref();
            let mut stat = self.ca.leq_status(sref);
            if stat.imply_type() != LeqStatus::IMPLY_NONE {
                // already used for implication, skip this clause
                continue;
            }

            if sref.idx() >= (1 << 30) {
                panic!("status ref addr too large");
            }

            // whether this assignment makes the clause literal true
            let is_true = fact_sign == watch.sign();
            let mut mod_log = LeqStatusModLog::new(is_true, false, sref);

            stat.incr(is_true);
            self.ca.set_leq_status(sref, stat);

            let nr_true = stat.nr_true() as i32;
            let nr_false = stat.nr_decided() as i32 - nr_true;
            let bound_true = watch.bound_true();
            let bound_false = watch.bound_false();

            if nr_true < bound_true - 1 && nr_false < bound_false - 1 {
                // nothing can be implied in this case
                self.trail_leq_stat.push(mod_log);
                continue;
            }

            let cref = watch.cref;
            debug_assert!(self.ca.get_ref(cref).is_leq());
            let dst = self.ca.get_ref(cref).leq_dst();
            let dst_val = self.vars.value_lit(dst);
            if dst_val != lbool::UNDEF {
                // truth value of the LEQ is known, and we can try to imply lits
                if dst_val == lbool::TRUE {
                    if nr_true >= bound_true {
                        // LEQ is false but dst is true
                        self.select_known_lits(cref, true, nr_true);
                        return Some(self.leq_conflict(cref, sref, true, mod_log));
                    } else if nr_true == bound_true - 1 {
                        // all unknown vars must be false
                        if self.select_known_and_imply_unknown(cref, true, nr_true) {
                            self.setup_imply(sref, true, LeqStatus::IMPLY_LITS, &mut mod_log);
                        } else {
                            // push the log of the newly found var (which must
                            // be an unprocessed var in the queue)
                            let mut s = self.ca.leq_status(sref);
                            s.incr(true);
                            self.ca.set_leq_status(sref, s);
                            self.trail_leq_stat
                                .push(LeqStatusModLog::new(true, false, sref));
                            return Some(self.leq_conflict(cref, sref, true, mod_log));
                        }
                    }
                } else {
                    debug_assert_eq!(dst_val, lbool::FALSE);
                    if nr_false >= bound_false {
                        // LEQ is true but dst is false
                        self.select_known_lits(cref, false, nr_false);
                        return Some(self.leq_conflict(cref, sref, false, mod_log));
                    } else if nr_false == bound_false - 1 {
                        // all unknown vars must be true
                        if self.select_known_and_imply_unknown(cref, false, nr_false) {
                            self.setup_imply(sref, false, LeqStatus::IMPLY_LITS, &mut mod_log);
                        } else {
                            let mut s = self.ca.leq_status(sref);
                            s.incr(false);
                            self.ca.set_leq_status(sref, s);
                            self.trail_leq_stat
                                .push(LeqStatusModLog::new(false, false, sref));
                            return Some(self.leq_conflict(cref, sref, false, mod_log));
                        }
                    }
                }
            } else {
                // dst val is unknown, try to imply it
                if nr_true >= bound_true {
                    self.select_known_lits(cref, true, nr_true);
                    self.vars.unchecked_enqueue(!dst, cref);
                    self.setup_imply(sref, true, LeqStatus::IMPLY_DST, &mut mod_log);
                } else if nr_false >= bound_false {
                    self.select_known_lits(cref, false, nr_false);
                    self.vars.unchecked_enqueue(dst, cref);
                    self.setup_imply(sref, false, LeqStatus::IMPLY_DST, &mut mod_log);
                }
            }

            self.trail_leq_stat.push(mod_log);
        }
        None
    }

    /// Record what a LEQ constraint implied, both in its status block and
    /// in the pending journal record.
    fn setup_imply(
        &mut self,
        sref: CRef,
        precond_is_true: bool,
        imply_type: u32,
        mod_log: &mut LeqStatusModLog,
    ) {
        let mut s = self.ca.leq_status(sref);
        s.set_imply(precond_is_true, imply_type);
        self.ca.set_leq_status(sref, s);
        mod_log.set_imply_type_clear(true);
    }

    /// Finish a LEQ conflict: record `IMPLY_CONFL`, push the journal
    /// record, and drain the propagation queue.
    fn leq_conflict(
        &mut self,
        cref: CRef,
        sref: CRef,
        precond_is_true: bool,
        mut mod_log: LeqStatusModLog,
    ) -> CRef {
        self.setup_imply(sref, precond_is_true, LeqStatus::IMPLY_CONFL, &mut mod_log);
        self.trail_leq_stat.push(mod_log);
        self.qhead = self.vars.trail.len() as i32;
        cref
    }

    /// Partition the first `num` literal slots of `c` to hold exactly the
    /// literals currently assigned `sel_true`. Conflict analysis consumes
    /// this ordering to enumerate the constraint's antecedents.
    fn select_known_lits(&mut self, cref: CRef, sel_true: bool, num: i32) {
        let want = lbool::new(sel_true);
        let avoid = lbool::new(!sel_true);
        let vars = &self.vars;
        let mut c = self.ca.get_mut(cref);
        let mut i: i32 = 0;
        let mut j: i32 = c.size() as i32 - 1;
        while i < num {
            if vars.value_lit(c[i as u32]) == want {
                i += 1;
            } else {
                while vars.value_lit(c[j as u32]) == avoid {
                    j -= 1;
                    debug_assert!(j > i);
                }
                let tmp = c[i as u32];
                c[i as u32] = c[j as u32];
                c[j as u32] = tmp;
                j -= 1;
            }
        }
    }

    /// Partition the known (`sel_true`-valued) literals of `c` to the
    /// front and enqueue the complement of every unassigned literal, with
    /// `cr` as the reason.
    ///
    /// Returns `false` when the scan runs into one more known literal than
    /// the status block accounts for (an assignment still waiting in the
    /// propagation queue); the enqueues made so far are rolled back and
    /// the caller must treat the constraint as conflicting.
    fn select_known_and_imply_unknown(&mut self, cr: CRef, sel_true: bool, nr_known: i32) -> bool {
        let orig_top = self.vars.trail.len();
        let want = lbool::new(sel_true);
        {
            let vars = &mut self.vars;
            let mut c = self.ca.get_mut(cr);
            let mut i: i32 = 0;
            let mut j: i32 = c.size() as i32 - 1;
            // c[0..i] hold `sel_true` literals, c[j+1..] the rest
            while i <= j && i <= nr_known {
                let q = c[i as u32];
                let v = vars.value_lit(q);
                if v != lbool::UNDEF {
                    if v == want {
                        i += 1;
                        continue;
                    }
                    // q has the opposite value
                } else {
                    // q is unknown, and can be inferred
                    vars.unchecked_enqueue(q ^ sel_true, cr);
                }
                // put all opposite-valued and inferred literals at the end
                let tmp = c[i as u32];
                c[i as u32] = c[j as u32];
                c[j as u32] = tmp;
                j -= 1;
            }
            if i > nr_known {
                debug_assert_eq!(i, nr_known + 1);
                vars.dequeue_until(orig_top);
                return false;
            }
            debug_assert!(i == j + 1 && i == nr_known);
        }
        true
    }

    fn rebuild_order_heap(&mut self) {
        let mut vs = vec![];
        for v in (0..self.num_vars()).map(Var::from_idx) {
            if self.decision[v] && self.value(v) == lbool::UNDEF {
                vs.push(v);
            }
        }
        self.order_heap().build(&vs);
    }

    /// Attach a clause to watcher lists
    fn attach_clause(&mut self, cr: CRef) {
        let (c0, c1, learnt, size) = {
            let c = self.ca.get_ref(cr);
            debug_assert!(c.size() > 1);
            debug_assert!(!c.is_leq());
            (c[0], c[1], c.learnt(), c.size())
        };
        self.watches_data[!c0].push(Watcher::new(cr, c1));
        self.watches_data[!c1].push(Watcher::new(cr, c0));
        if learnt {
            self.num_learnts += 1;
            self.learnts_literals += size as u64;
        } else {
            self.num_clauses += 1;
            self.clauses_literals += size as u64;
        }
    }

    /// Detach a clause from watcher lists.
    ///
    /// param `strict` means we remove the clause from watchers eagerly, instead
    /// of just marking the watchlist as "dirty"
    fn detach_clause(&mut self, cr: CRef, strict: bool) {
        let (c0, c1, csize, clearnt) = {
            let c = self.ca.get_ref(cr);
            debug_assert!(!c.is_leq());
            (c[0], c[1], c.size(), c.learnt())
        };
        debug_assert!(csize > 1);

        let mut watches = self.watches_data.promote(WatcherDeleted { ca: &self.ca });

        // Strict or lazy detaching:
        if strict {
            let pos = watches[!c0]
                .iter()
                .position(|x| x == &Watcher::new(cr, c1))
                .expect("Watcher not found");
            watches[!c0].remove(pos);
            let pos = watches[!c1]
                .iter()
                .position(|x| x == &Watcher::new(cr, c0))
                .expect("Watcher not found");
            watches[!c1].remove(pos);
        } else {
            watches.smudge(!c0);
            watches.smudge(!c1);
        }

        if clearnt {
            self.num_learnts -= 1;
            self.learnts_literals -= csize as u64;
        } else {
            self.num_clauses -= 1;
            self.clauses_literals -= csize as u64;
        }
    }

    /// Detach and free a clause.
    ///
    /// For a LEQ constraint the watch list of every member variable is
    /// smudged and any reason pointing at the constraint is dropped.
    fn remove_clause(&mut self, cr: CRef) {
        if self.ca.get_ref(cr).is_leq() {
            let size = self.ca.get_ref(cr).size();
            for i in 0..size {
                let v = self.ca.get_ref(cr)[i].var();
                self.leq_watches().smudge(v);
                if self.vars.vardata[v].reason == cr {
                    self.vars.vardata[v].reason = CRef::UNDEF;
                }
            }
            let dv = self.ca.get_ref(cr).leq_dst().var();
            if self.vars.vardata[dv].reason == cr {
                self.vars.vardata[dv].reason = CRef::UNDEF;
            }
            self.num_clauses -= 1;
            self.clauses_literals -= size as u64 + 1;
        } else {
            self.detach_clause(cr, false);
            let c = self.ca.get_ref(cr);
            // Don't leave pointers to free'd memory!
            if self.locked(c) {
                self.vars.vardata[c[0].var()].reason = CRef::UNDEF;
            }
        }
        self.ca.get_mut(cr).set_mark(1); // used by the lazy watch cleanup and reloc
        self.ca.free(cr);
    }

    /// Is this clause satisfied under the current assignment?
    ///
    /// A LEQ constraint is satisfied once its truth value is forced by the
    /// counters and matches the assigned destination.
    pub fn satisfied(&self, c: ClauseRef) -> bool {
        if c.is_leq() {
            let vdst = self.value_lit(c.leq_dst());
            if vdst != lbool::UNDEF {
                let s = c.leq_status();
                let bound = c.leq_bound() as i32;
                let vleq = if s.nr_true() as i32 >= bound + 1 {
                    false
                } else if s.nr_false() as i32 >= c.size() as i32 - bound {
                    true
                } else {
                    return false;
                };
                return vdst == lbool::new(vleq);
            }
            return false;
        }
        c.iter().any(|&lit| self.value_lit(lit) == lbool::TRUE)
    }

    /// Returns `true` if a clause is a reason for some implication in the current state.
    fn locked(&self, c: ClauseRef) -> bool {
        let reason = self.reason(c[0].var());
        self.value_lit(c[0]) == lbool::TRUE
            && reason != CRef::UNDEF
            && self.ca.get_ref(reason) == c
    }

    /// Revert to the state at given level (keeping all assignment at `level` but not beyond),
    /// rewinding the LEQ status journal along the way.
    fn cancel_until(&mut self, level: u32) {
        if self.decision_level() > level {
            let sep = self.vars.trail_lim[level as usize];
            let trail_lim_last = self
                .vars
                .trail_lim
                .last()
                .expect("trail_lim is empty")
                .lit as usize;

            for c in (sep.lit as usize..self.vars.trail.len()).rev() {
                let x = self.vars.trail[c].var();
                self.vars.ass[x] = lbool::UNDEF;
                if self.phase_saving > 1 || (self.phase_saving == 1 && c > trail_lim_last) {
                    self.polarity[x] = self.vars.trail[c].sign();
                }
                self.insert_var_order(x);
            }

            for i in (sep.leq as usize..self.trail_leq_stat.len()).rev() {
                let log = self.trail_leq_stat[i];
                let mut s = self.ca.leq_status(log.status_ref());
                s.decr(log.is_true());
                s.clear_imply_type_with(log.imply_type_clear());
                self.ca.set_leq_status(log.status_ref(), s);
            }

            self.qhead = sep.lit;
            self.vars.trail.truncate(sep.lit as usize);
            self.trail_leq_stat.truncate(sep.leq as usize);
            self.vars.trail_lim.truncate(level as usize);
        }
    }

    fn progress_estimate(&self) -> f64 {
        let mut progress = 0.0;
        let f = 1.0 / self.num_vars() as f64;

        for i in 0..self.decision_level() + 1 {
            let beg: i32 = if i == 0 {
                0
            } else {
                self.vars.trail_lim[i as usize - 1].lit
            };
            let end: i32 = if i == self.decision_level() {
                self.vars.trail.len() as i32
            } else {
                self.vars.trail_lim[i as usize].lit
            };
            progress += f64::powi(f, i as i32) * (end - beg) as f64;
        }

        progress / self.num_vars() as f64
    }

    fn new(opts: &SolverOpts) -> Self {
        Self {
            vars: VarState::new(opts),
            num_clauses: 0,
            num_learnts: 0,
            clauses_literals: 0,
            learnts_literals: 0,

            clause_decay: opts.clause_decay,
            random_var_freq: opts.random_var_freq,
            random_seed: opts.random_seed,
            luby_restart: opts.luby_restart,
            ccmin_mode: opts.ccmin_mode,
            phase_saving: opts.phase_saving,
            rnd_pol: opts.rnd_pol,
            rnd_init_act: opts.rnd_init_act,
            garbage_frac: opts.garbage_frac,
            min_learnts_lim: opts.min_learnts_lim,
            restart_first: opts.restart_first,
            restart_inc: opts.restart_inc,

            // Parameters (experimental):
            learntsize_adjust_start_confl: 100,
            learntsize_adjust_inc: 1.5,

            // Statistics: (formerly in 'SolverStats')
            solves: 0,
            starts: 0,
            decisions: 0,
            rnd_decisions: 0,
            propagations: 0,
            conflicts: 0,
            dec_vars: 0,
            max_literals: 0,
            tot_literals: 0,

            // Parameters (the rest):
            learntsize_factor: 1.0 / 3.0,
            learntsize_inc: 1.1,

            polarity: VMap::new(),
            user_pol: VMap::new(),
            decision: VMap::new(),
            watches_data: OccListsData::new(),
            leq_watches_data: OccListsData::new(),
            trail_leq_stat: vec![],
            order_heap_data: HeapData::new(),
            ok: true,
            cla_inc: 1.0,
            qhead: 0,
            simp_db_assigns: -1,
            simp_db_props: 0,
            progress_estimate: 0.0,
            remove_satisfied: opts.remove_satisfied,
            next_var: Var::from_idx(0),

            ca: ClauseAllocator::new(),
            assumptions: vec![],

            seen: VMap::new(),
            minimize_stack: vec![],
            analyze_toclear: vec![],
            max_learnts: 0.0,
            learntsize_adjust_confl: 0.0,
            learntsize_adjust_cnt: 0,

            // Resource constraints:
            conflict_budget: -1,
            propagation_budget: -1,
        }
    }
}

/// Resolve antecedent `q` into the learnt clause under construction: mark
/// its variable seen and bump it; a literal at the conflict level is
/// counted for further resolution, one at a lower level joins the clause.
fn add_antecedent(
    vars: &mut VarState,
    order_heap_data: &mut HeapData<Var>,
    seen: &mut VMap<Seen>,
    out_learnt: &mut Vec<Lit>,
    path_c: &mut i32,
    conflict_level: i32,
    q: Lit,
) {
    let lvl = vars.level(q.var());
    debug_assert!(lvl <= conflict_level);
    if !seen[q.var()].is_seen() && lvl > 0 {
        vars.var_bump_activity(order_heap_data, q.var());
        seen[q.var()] = Seen::SOURCE;
        if lvl >= conflict_level {
            // Only vars at the conflict level are resolved further; we keep
            // a counter instead of pushing them, they are processed later.
            *path_c += 1;
        } else {
            out_learnt.push(q);
        }
    }
}

fn abstract_level(vars: &VarState, v: Var) -> u32 {
    1 << (vars.level(v) & 31)
}

/// One step of the `lit_redundant` DFS: try to extend the resolution with
/// antecedent `l`. On failure every `seen` mark pushed by this DFS (those
/// above `top` in `analyze_toclear`) is rolled back.
fn add_redundant_antecedent(
    vars: &VarState,
    seen: &mut VMap<Seen>,
    minimize_stack: &mut Vec<Lit>,
    analyze_toclear: &mut Vec<Lit>,
    abstract_levels: u32,
    top: usize,
    l: Lit,
) -> bool {
    // Variable at level 0 or previously marked: just skip
    if vars.level(l.var()) == 0 || seen[l.var()] == Seen::SOURCE {
        return true;
    }
    if vars.reason(l.var()) != CRef::UNDEF && (abstract_level(vars, l.var()) & abstract_levels) != 0
    {
        // keep this literal.
        // NOTE: if the level of `l` isn't in `abstract_levels`, it comes from
        // propagations at a decision level unrelated to the learnt clause, so
        // there is no chance to eliminate `l` via resolutions from it.
        seen[l.var()] = Seen::SOURCE;
        minimize_stack.push(l);
        analyze_toclear.push(l);
        true
    } else {
        // cannot remove `l`, cancel
        for a in analyze_toclear[top..].iter() {
            seen[a.var()] = Seen::UNDEF;
        }
        analyze_toclear.truncate(top);
        false
    }
}

impl VarState {
    fn new(opts: &SolverOpts) -> Self {
        Self {
            ass: VMap::new(),
            vardata: VMap::new(),
            activity: VMap::new(),
            var_preference: VMap::new(),
            var_inc: 1.0,
            var_decay: opts.var_decay,
            trail: vec![],
            trail_lim: vec![],
        }
    }

    #[inline(always)]
    pub fn num_assigns(&self) -> u32 {
        self.trail.len() as u32
    }

    fn proved_at_lvl_0(&self) -> &[Lit] {
        // find where the end of the level-0 part of the trail is
        let end = self
            .trail_lim
            .get(0)
            .map_or(self.trail.len(), |&x| x.lit as usize);
        &self.trail[..end]
    }

    #[inline(always)]
    pub fn value(&self, x: Var) -> lbool {
        self.ass[x]
    }

    #[inline(always)]
    fn value_lit(&self, x: Lit) -> lbool {
        self.ass[x.var()] ^ !x.sign()
    }

    #[inline(always)]
    fn level(&self, x: Var) -> i32 {
        self.vardata[x].level
    }

    #[inline(always)]
    fn reason(&self, x: Var) -> CRef {
        self.vardata[x].reason
    }

    fn var_decay_activity(&mut self) {
        self.var_inc *= 1.0 / self.var_decay;
    }

    #[inline(always)]
    pub fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    fn unchecked_enqueue(&mut self, p: Lit, from: CRef) {
        debug_assert_eq!(
            self.value_lit(p),
            lbool::UNDEF,
            "lit {:?} should be undef",
            p
        );
        self.ass[p.var()] = lbool::new(p.sign());
        self.vardata[p.var()] = VarData::new(from, self.decision_level() as i32);
        self.trail.push(p);
    }

    /// Unassign the literals enqueued beyond `target_size`, dropping them
    /// from the trail. Used to roll back tentative LEQ implications.
    fn dequeue_until(&mut self, target_size: usize) {
        for i in target_size..self.trail.len() {
            self.ass[self.trail[i].var()] = lbool::UNDEF;
        }
        self.trail.truncate(target_size);
    }

    /// Increase a variable with the current 'bump' value.
    fn var_bump_activity(&mut self, order_heap_data: &mut HeapData<Var>, v: Var) {
        self.activity[v] += self.var_inc;
        if self.activity[v] > 1e100 {
            // Rescale:
            for (_, x) in self.activity.iter_mut() {
                *x *= 1e-100;
            }
            self.var_inc *= 1e-100;
        }

        // Update order_heap with respect to new activity:
        let mut order_heap = order_heap_data.promote(VarOrder {
            activity: &self.activity,
            var_preference: &self.var_preference,
        });
        if order_heap.in_heap(v) {
            order_heap.decrease(v);
        }
    }
}

#[derive(Debug)]
enum ClauseSetSelect {
    Original,
    Learnt,
}

#[derive(Debug, Clone, Copy)]
struct VarData {
    reason: CRef,
    level: i32,
}

impl Default for VarData {
    fn default() -> Self {
        Self {
            reason: CRef::UNDEF,
            level: 0,
        }
    }
}

impl VarData {
    #[inline(always)]
    fn new(reason: CRef, level: i32) -> Self {
        Self { reason, level }
    }
}

/// Per-decision-level separator: offsets into the literal trail and into
/// the LEQ status journal.
#[derive(Debug, Clone, Copy)]
struct TrailSep {
    lit: i32,
    leq: i32,
}

#[derive(Debug, Clone, Copy)]
struct Watcher {
    cref: CRef,
    blocker: Lit,
}

impl PartialEq for Watcher {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.cref == rhs.cref
    }
}
impl Eq for Watcher {}

impl Watcher {
    const DUMMY: Watcher = Watcher {
        cref: CRef::UNDEF,
        blocker: Lit::UNDEF,
    };
    fn new(cref: CRef, blocker: Lit) -> Self {
        Self { cref, blocker }
    }
}

/// Watcher for LEQ constraints, registered per member variable.
///
/// Packs `bound:15 | sign:1 | size:16` next to the CRef, 64 bits in all;
/// the packed widths are why LEQ constraints are capped below `1 << 14`
/// literals.
#[derive(Debug, Clone, Copy)]
struct LeqWatcher {
    data: u32,
    cref: CRef,
}

impl LeqWatcher {
    fn new(bound: u32, sign: bool, size: u32, cref: CRef) -> Self {
        debug_assert!(bound < (1 << 15));
        debug_assert!(size < (1 << 16));
        LeqWatcher {
            data: bound | ((sign as u32) << 15) | (size << 16),
            cref,
        }
    }

    /// bound of the LEQ
    #[inline(always)]
    fn bound(&self) -> u32 {
        self.data & ((1 << 15) - 1)
    }
    /// sign of this var's literal in the LEQ
    #[inline(always)]
    fn sign(&self) -> bool {
        (self.data & (1 << 15)) != 0
    }
    /// number of lits in the LEQ
    #[inline(always)]
    fn size(&self) -> u32 {
        self.data >> 16
    }

    /// LEQ = 0 <=> (nr_true >= bound_true)
    #[inline(always)]
    fn bound_true(&self) -> i32 {
        self.bound() as i32 + 1
    }
    /// LEQ = 1 <=> (nr_false >= bound_false)
    #[inline(always)]
    fn bound_false(&self) -> i32 {
        (self.size() - self.bound()) as i32
    }

    /// offset of the corresponding status cell in the clause allocator
    #[inline(always)]
    fn status_ref(&self) -> CRef {
        self.cref + self.size() + LeqStatus::OFFSET_IN_CLAUSE
    }
}

/// Journal record of one increment to a LEQ status block.
///
/// Packs `is_true:1 | imply_type_clear:1 | status_ref:30` in 32 bits.
#[derive(Debug, Clone, Copy)]
struct LeqStatusModLog(u32);

impl LeqStatusModLog {
    fn new(is_true: bool, imply_type_clear: bool, status_ref: CRef) -> Self {
        debug_assert!(status_ref.idx() < (1 << 30));
        LeqStatusModLog(
            (is_true as u32) | ((imply_type_clear as u32) << 1) | (status_ref.idx() << 2),
        )
    }

    /// whether `nr_true` (as opposed to only `nr_decided`) was incremented
    #[inline(always)]
    fn is_true(&self) -> bool {
        (self.0 & 1) != 0
    }
    /// if set, `imply_type` must be cleared during unwinding
    #[inline(always)]
    fn imply_type_clear(&self) -> bool {
        (self.0 & 2) != 0
    }
    #[inline(always)]
    fn status_ref(&self) -> CRef {
        CRef::from_idx(self.0 >> 2)
    }

    fn set_imply_type_clear(&mut self, b: bool) {
        self.0 = (self.0 & !2) | ((b as u32) << 1);
    }

    fn set_status_ref(&mut self, sref: CRef) {
        debug_assert!(sref.idx() < (1 << 30));
        self.0 = (self.0 & 3) | (sref.idx() << 2);
    }
}

/// Decision order: activity (decreasing), then `var_preference`, then
/// variable index.
struct VarOrder<'a> {
    activity: &'a VMap<f64>,
    var_preference: &'a VMap<i32>,
}

impl<'a> Comparator<Var> for VarOrder<'a> {
    fn cmp(&self, lhs: &Var, rhs: &Var) -> cmp::Ordering {
        PartialOrd::partial_cmp(&self.activity[*rhs], &self.activity[*lhs])
            .expect("NaN activity")
            .then_with(|| self.var_preference[*lhs].cmp(&self.var_preference[*rhs]))
            .then_with(|| lhs.idx().cmp(&rhs.idx()))
    }
}

/// Predicate to test whether a clause has been removed from some lit's watchlist
struct WatcherDeleted<'a> {
    ca: &'a ClauseAllocator,
}

impl<'a> DeletePred<Watcher> for WatcherDeleted<'a> {
    #[inline]
    fn deleted(&self, w: &Watcher) -> bool {
        self.ca.get_ref(w.cref).mark() == 1
    }
}

/// Same, for the per-variable LEQ watch lists
struct LeqWatcherDeleted<'a> {
    ca: &'a ClauseAllocator,
}

impl<'a> DeletePred<LeqWatcher> for LeqWatcherDeleted<'a> {
    #[inline]
    fn deleted(&self, w: &LeqWatcher) -> bool {
        self.ca.get_ref(w.cref).mark() == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
enum Seen {
    UNDEF,
    SOURCE,
    REMOVABLE,
}

impl Default for Seen {
    #[inline]
    fn default() -> Self {
        Seen::UNDEF
    }
}

impl Seen {
    #[inline(always)]
    fn is_seen(&self) -> bool {
        *self != Seen::UNDEF
    }
}

mod utils {
    /// Finite subsequences of the Luby-sequence:
    ///
    /// > 0: 1
    /// > 1: 1 1 2
    /// > 2: 1 1 2 1 1 2 4
    /// > 3: 1 1 2 1 1 2 4 1 1 2 1 1 2 4 8
    /// ...
    pub(super) fn luby(y: f64, mut x: i32) -> f64 {
        // Find the finite subsequence that contains index 'x', and the
        // size of that subsequence:
        let mut size = 1;
        let mut seq = 0;
        while size < x + 1 {
            seq += 1;
            size = 2 * size + 1;
        }

        while size - 1 != x {
            size = (size - 1) >> 1;
            seq -= 1;
            x = x % size;
        }

        f64::powi(y, seq)
    }

    /// Generate a random double:
    pub(super) fn drand(seed: &mut f64) -> f64 {
        *seed *= 1389796.0;
        let q = (*seed / 2147483647.0) as i32;
        *seed -= q as f64 * 2147483647.0;
        *seed / 2147483647.0
    }

    /// Generate a random integer:
    pub(super) fn irand(seed: &mut f64, size: i32) -> i32 {
        (drand(seed) * size as f64) as i32
    }

    #[test]
    fn test_luby() {
        let expected = [1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8];
        for (x, &e) in expected.iter().enumerate() {
            assert_eq!(luby(2.0, x as i32), e as f64);
        }
    }
}

/// Configuration of the solver, with the usual MiniSat defaults.
pub struct SolverOpts {
    pub var_decay: f64,
    pub clause_decay: f64,
    pub random_var_freq: f64,
    pub random_seed: f64,
    pub ccmin_mode: i32,
    pub phase_saving: i32,
    pub rnd_pol: bool,
    pub rnd_init_act: bool,
    pub luby_restart: bool,
    pub restart_first: i32,
    pub restart_inc: f64,
    pub garbage_frac: f64,
    pub min_learnts_lim: i32,
    pub remove_satisfied: bool,
}

impl Default for SolverOpts {
    fn default() -> SolverOpts {
        Self {
            var_decay: 0.95,
            clause_decay: 0.999,
            random_var_freq: 0.0,
            random_seed: 92702102.0,
            ccmin_mode: 2,
            phase_saving: 2,
            rnd_pol: false,
            rnd_init_act: false,
            luby_restart: true,
            restart_first: 100,
            restart_inc: 2.0,
            garbage_frac: 0.20,
            min_learnts_lim: 0,
            remove_satisfied: true,
        }
    }
}

impl SolverOpts {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        (0.0 < self.var_decay && self.var_decay < 1.0)
            && (0.0 < self.clause_decay && self.clause_decay < 1.0)
            && (0.0 <= self.random_var_freq && self.random_var_freq <= 1.0)
            && (0.0 < self.random_seed && self.random_seed < f64::INFINITY)
            && (0 <= self.ccmin_mode && self.ccmin_mode <= 2)
            && (0 <= self.phase_saving && self.phase_saving <= 2)
            && 1 <= self.restart_first
            && (1.0 < self.restart_inc && self.restart_inc < f64::INFINITY)
            && (0.0 < self.garbage_frac && self.garbage_frac < f64::INFINITY)
            && 0 <= self.min_learnts_lim
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::BasicSolver;

    /// Literal from a nonzero DIMACS-style integer, creating variables on demand.
    fn lit(s: &mut BasicSolver, x: i32) -> Lit {
        debug_assert_ne!(x, 0);
        Lit::new(s.var_of_int((x.abs() - 1) as u32), x > 0)
    }

    /// Same, for a solver whose variables already exist.
    fn lit_of(x: i32) -> Lit {
        Lit::new(Var::from_idx((x.abs() - 1) as u32), x > 0)
    }

    fn add(s: &mut BasicSolver, xs: &[i32]) -> bool {
        let mut c: Vec<Lit> = xs.iter().map(|&x| lit(s, x)).collect();
        s.add_clause_reuse(&mut c)
    }

    fn add_leq(s: &mut BasicSolver, xs: &[i32], bound: i32, dst: i32) -> bool {
        let d = lit(s, dst);
        let mut c: Vec<Lit> = xs.iter().map(|&x| lit(s, x)).collect();
        s.add_leq_assign_reuse(&mut c, bound, d)
    }

    fn add_geq(s: &mut BasicSolver, xs: &[i32], bound: i32, dst: i32) -> bool {
        let d = lit(s, dst);
        let mut c: Vec<Lit> = xs.iter().map(|&x| lit(s, x)).collect();
        s.add_geq_assign_reuse(&mut c, bound, d)
    }

    /// Value of a DIMACS-style integer in the last model.
    fn val(s: &BasicSolver, x: i32) -> lbool {
        s.value_lit(lit_of(x))
    }

    /// Check that the last model satisfies every remaining original
    /// clause, and that every LEQ destination agrees with its counted
    /// truth value.
    fn check_model(s: &BasicSolver) {
        for &cr in &s.clauses {
            let c = s.v.ca.get_ref(cr);
            if c.is_leq() {
                let n_true = c
                    .lits()
                    .iter()
                    .filter(|&&l| s.value_lit(l) == lbool::TRUE)
                    .count() as i32;
                let holds = n_true <= c.leq_bound() as i32;
                assert_eq!(
                    s.value_lit(c.leq_dst()),
                    lbool::new(holds),
                    "LEQ destination disagrees with model: {} true vs bound {}",
                    n_true,
                    c.leq_bound()
                );
            } else {
                assert!(
                    c.lits().iter().any(|&l| s.value_lit(l) == lbool::TRUE),
                    "unsatisfied clause {:?}",
                    c.lits()
                );
            }
        }
    }

    /// Level-0 status counters of quiescent constraints must agree with
    /// the assignment.
    fn check_leq_status(s: &BasicSolver) {
        for &cr in &s.clauses {
            let c = s.v.ca.get_ref(cr);
            if !c.is_leq() {
                continue;
            }
            let stat = c.leq_status();
            if stat.imply_type() != LeqStatus::IMPLY_NONE {
                continue; // fired constraints stop counting until rewind
            }
            let mut nr_true = 0;
            let mut nr_dec = 0;
            for &l in c.lits() {
                if s.v.value_lit(l) != lbool::UNDEF {
                    nr_dec += 1;
                    if s.v.value_lit(l) == lbool::TRUE {
                        nr_true += 1;
                    }
                }
            }
            assert_eq!(stat.nr_decided(), nr_dec);
            assert_eq!(stat.nr_true(), nr_true);
        }
    }

    #[test]
    fn test_trivial_sat() {
        let mut s = BasicSolver::default();
        add(&mut s, &[1, 2]);
        add(&mut s, &[-1, 2]);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        assert_eq!(val(&s, 2), lbool::TRUE);
        check_model(&s);
    }

    #[test]
    fn test_unit_chain_propagates_without_decisions() {
        let mut s = BasicSolver::default();
        add(&mut s, &[1]);
        add(&mut s, &[-1, 2]);
        add(&mut s, &[-2, 3]);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        assert_eq!(val(&s, 1), lbool::TRUE);
        assert_eq!(val(&s, 2), lbool::TRUE);
        assert_eq!(val(&s, 3), lbool::TRUE);
        assert_eq!(s.num_decisions(), 0);
        assert_eq!(s.proved_at_lvl_0().len(), 3);
    }

    #[test]
    fn test_units_unsat() {
        let mut s = BasicSolver::default();
        add(&mut s, &[1]);
        add(&mut s, &[2]);
        add(&mut s, &[3]);
        add(&mut s, &[-1, -2, -3]);
        assert_eq!(s.solve_limited(&[]), lbool::FALSE);
        assert!(!s.is_ok());
        // the UNSAT state is sticky
        assert!(!add(&mut s, &[1, 2]));
        assert_eq!(s.solve_limited(&[]), lbool::FALSE);
    }

    #[test]
    fn test_leq_exactly_one_has_three_models() {
        let mut s = BasicSolver::default();
        add_leq(&mut s, &[1, 2, 3], 1, 4);
        add(&mut s, &[4]);
        add(&mut s, &[1, 2, 3]);

        let mut n_models = 0;
        while s.solve_limited(&[]) == lbool::TRUE {
            check_model(&s);
            check_leq_status(&s);
            let n_true = (1..=3).filter(|&x| val(&s, x) == lbool::TRUE).count();
            assert_eq!(n_true, 1);
            n_models += 1;
            assert!(n_models <= 3, "more models than expected");
            // block this assignment of x1..x3
            let block: Vec<i32> = (1..=3)
                .map(|x| if val(&s, x) == lbool::TRUE { -x } else { x })
                .collect();
            add(&mut s, &block);
        }
        assert_eq!(n_models, 3);
    }

    #[test]
    fn test_leq_forces_conflict_at_root() {
        let mut s = BasicSolver::default();
        add_leq(&mut s, &[1, 2, 3], 1, 4);
        add(&mut s, &[4]);
        add(&mut s, &[1]);
        add(&mut s, &[2]);
        assert_eq!(s.solve_limited(&[]), lbool::FALSE);
        assert!(!s.is_ok());
    }

    #[test]
    fn test_assumption_core() {
        let mut s = BasicSolver::default();
        add(&mut s, &[1, 2]);
        assert_eq!(s.solve_limited(&[lit_of(-1), lit_of(-2)]), lbool::FALSE);
        // conflict clause over the negated assumptions
        assert!(s.is_ok());
        assert!(s.unsat_core().len() <= 2);
        assert!(s
            .unsat_core()
            .iter()
            .all(|&l| l == lit_of(1) || l == lit_of(2)));
        assert!(s.unsat_core_contains_var(Var::from_idx(0)) || s.unsat_core_contains_var(Var::from_idx(1)));
        // without the assumptions the instance is satisfiable
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
    }

    #[test]
    fn test_leq_implies_dst_false_at_root() {
        let mut s = BasicSolver::default();
        add_leq(&mut s, &[1, 2], 1, 3);
        add(&mut s, &[1]);
        add(&mut s, &[2]);
        // two true members exceed the bound, so the reification is forced off
        assert_eq!(s.value_lvl_0(lit_of(3)), lbool::FALSE);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        check_model(&s);
    }

    #[test]
    fn test_leq_implies_dst_true_at_root() {
        let mut s = BasicSolver::default();
        add_leq(&mut s, &[1, 2, 3], 1, 4);
        add(&mut s, &[-1]);
        add(&mut s, &[-2]);
        // only one member can still be true, so the bound holds for sure
        assert_eq!(s.value_lvl_0(lit_of(4)), lbool::TRUE);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        check_model(&s);
    }

    #[test]
    fn test_leq_implies_lits() {
        let mut s = BasicSolver::default();
        add_leq(&mut s, &[1, 2, 3], 1, 4);
        add(&mut s, &[4]);
        add(&mut s, &[1]);
        // one member is true and the bound is tight: the others are forced off
        assert_eq!(s.value_lvl_0(lit_of(2)), lbool::FALSE);
        assert_eq!(s.value_lvl_0(lit_of(3)), lbool::FALSE);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        check_model(&s);
    }

    #[test]
    fn test_geq_forces_all() {
        let mut s = BasicSolver::default();
        add_geq(&mut s, &[1, 2], 2, 3);
        add(&mut s, &[3]);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        assert_eq!(val(&s, 1), lbool::TRUE);
        assert_eq!(val(&s, 2), lbool::TRUE);
    }

    #[test]
    fn test_leq_degenerate_bounds() {
        // bound >= n: the constraint is a tautology
        let mut s = BasicSolver::default();
        add_leq(&mut s, &[1, 2], 5, 3);
        assert_eq!(s.value_lvl_0(lit_of(3)), lbool::TRUE);

        // bound < 0: unsatisfiable side
        let mut s = BasicSolver::default();
        add_leq(&mut s, &[1, 2], -1, 3);
        assert_eq!(s.value_lvl_0(lit_of(3)), lbool::FALSE);
    }

    #[test]
    fn test_leq_zero_bound_expansion() {
        // (x1 + x2 <= 0) <-> x3 turns into clauses
        let mut s = BasicSolver::default();
        add_leq(&mut s, &[1, 2], 0, 3);
        assert_eq!(s.solve_limited(&[lit_of(3)]), lbool::TRUE);
        assert_eq!(val(&s, 1), lbool::FALSE);
        assert_eq!(val(&s, 2), lbool::FALSE);
        assert_eq!(s.solve_limited(&[lit_of(3), lit_of(1)]), lbool::FALSE);
        assert_eq!(s.solve_limited(&[lit_of(-3)]), lbool::TRUE);
        assert!(val(&s, 1) == lbool::TRUE || val(&s, 2) == lbool::TRUE);
    }

    #[test]
    fn test_leq_canonicalization_to_equivalence() {
        // with x2 already true, (x1 + x2 <= 1) <-> x3 reduces to x3 <-> -x1
        let mut s = BasicSolver::default();
        add(&mut s, &[2]);
        add_leq(&mut s, &[1, 2], 1, 3);
        assert_eq!(s.solve_limited(&[lit_of(1)]), lbool::TRUE);
        assert_eq!(val(&s, 3), lbool::FALSE);
        assert_eq!(s.solve_limited(&[lit_of(-1)]), lbool::TRUE);
        assert_eq!(val(&s, 3), lbool::TRUE);
    }

    #[test]
    fn test_leq_complementary_pair_cancels() {
        // x2 and -x2 always contribute exactly one true literal:
        // (x1 + x2 + -x2 + x3 <= 2) <-> d is (x1 + x3 <= 1) <-> d
        let mut s = BasicSolver::default();
        let d = lit(&mut s, 4);
        let mut c = vec![lit_of(1), lit_of(2), lit_of(-2), lit_of(3)];
        s.add_leq_assign_reuse(&mut c, 2, d);
        add(&mut s, &[4]);
        add(&mut s, &[1]);
        assert_eq!(s.value_lvl_0(lit_of(3)), lbool::FALSE);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        check_model(&s);
    }

    #[test]
    fn test_leq_queue_race_conflict() {
        // x5 forces x1 and x2 in one propagation wave; the at-most-one
        // constraint sees the second truth while it is still queued
        let mut s = BasicSolver::default();
        add_leq(&mut s, &[1, 2, 3], 1, 4);
        add(&mut s, &[4]);
        add(&mut s, &[-5, 1]);
        add(&mut s, &[-5, 2]);
        add(&mut s, &[5]);
        assert_eq!(s.solve_limited(&[]), lbool::FALSE);
    }

    #[test]
    fn test_leq_conflict_under_assumption() {
        let mut s = BasicSolver::default();
        add_leq(&mut s, &[1, 2, 3], 1, 4);
        add(&mut s, &[4]);
        add(&mut s, &[-5, 1]);
        add(&mut s, &[-5, 2]);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        check_model(&s);
        // assuming x5 violates the at-most-one constraint; the learnt
        // clause comes out of LEQ conflict analysis
        assert_eq!(s.solve_limited(&[lit_of(5)]), lbool::FALSE);
        assert!(s.unsat_core().iter().any(|&l| l == lit_of(-5)));
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
    }

    #[test]
    #[should_panic(expected = "assumptions with LEQ")]
    fn test_analyze_final_with_leq_reason_panics() {
        let mut s = BasicSolver::default();
        add_leq(&mut s, &[1, 2, 3], 1, 4);
        add(&mut s, &[4]);
        // assuming x1 makes the constraint imply -x2; the second assumption
        // then fails with a LEQ reason in its derivation
        s.solve_limited(&[lit_of(1), lit_of(2)]);
    }

    #[test]
    #[should_panic(expected = "ccmin=1 for LEQ")]
    fn test_ccmin_basic_with_leq_reason_panics() {
        let mut opts = SolverOpts::default();
        opts.ccmin_mode = 1;
        let mut s: BasicSolver = Solver::new(opts, Default::default());
        add_leq(&mut s, &[1, 2, 3], 1, 4);
        add(&mut s, &[4]);
        add(&mut s, &[2, -5, 6]);
        add(&mut s, &[2, -5, -6]);
        s.solve_limited(&[lit_of(1), lit_of(5)]);
    }

    #[test]
    fn test_ccmin_deep_handles_leq_reasons() {
        // Default polarities walk the solver into a conflict whose learnt
        // clause holds a literal implied by the LEQ, so minimization (ccmin=2)
        // has to resolve through a LEQ reason.
        let mut s = BasicSolver::default();
        add_leq(&mut s, &[-1, 2, 3], 1, 4);
        add(&mut s, &[4]);
        add(&mut s, &[2, 5, 6]);
        add(&mut s, &[2, 5, -6]);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        assert!(s.num_conflicts() >= 1);
        check_model(&s);
    }

    /// Pigeonhole instance: `pigeons` pigeons into `holes` holes, with the
    /// per-hole at-most-one capacity expressed as a reified LEQ forced on.
    fn pigeonhole_leq(s: &mut BasicSolver, pigeons: i32, holes: i32) {
        let p = |i: i32, j: i32| i * holes + j + 1;
        let d = |j: i32| pigeons * holes + j + 1;
        for i in 0..pigeons {
            let c: Vec<i32> = (0..holes).map(|j| p(i, j)).collect();
            add(s, &c);
        }
        for j in 0..holes {
            let col: Vec<i32> = (0..pigeons).map(|i| p(i, j)).collect();
            add_leq(s, &col, 1, d(j));
            add(s, &[d(j)]);
        }
    }

    #[test]
    fn test_pigeonhole_leq_unsat() {
        let mut s = BasicSolver::default();
        pigeonhole_leq(&mut s, 5, 4);
        assert_eq!(s.solve_limited(&[]), lbool::FALSE);
        assert!(s.num_conflicts() > 0);
    }

    #[test]
    fn test_pigeonhole_leq_sat() {
        let mut s = BasicSolver::default();
        pigeonhole_leq(&mut s, 4, 4);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        check_model(&s);
        let p = |i: i32, j: i32| i * 4 + j + 1;
        for j in 0..4 {
            let n_true = (0..4).filter(|&i| val(&s, p(i, j)) == lbool::TRUE).count();
            assert!(n_true <= 1, "hole {} over capacity", j);
        }
        for i in 0..4 {
            assert!((0..4).any(|j| val(&s, p(i, j)) == lbool::TRUE));
        }
    }

    #[test]
    fn test_pigeonhole_leq_unsat_with_gc_pressure() {
        // tight GC threshold and fast restarts to exercise relocation and
        // the learnt-DB reduction mid-search
        let mut opts = SolverOpts::default();
        opts.garbage_frac = 0.01;
        opts.restart_first = 10;
        let mut s: BasicSolver = Solver::new(opts, Default::default());
        pigeonhole_leq(&mut s, 5, 4);
        assert_eq!(s.solve_limited(&[]), lbool::FALSE);
    }

    #[test]
    fn test_pigeonhole_geometric_restarts() {
        let mut opts = SolverOpts::default();
        opts.luby_restart = false;
        opts.restart_first = 10;
        opts.restart_inc = 1.5;
        let mut s: BasicSolver = Solver::new(opts, Default::default());
        pigeonhole_leq(&mut s, 5, 4);
        assert_eq!(s.solve_limited(&[]), lbool::FALSE);
    }

    #[test]
    fn test_conflict_budget_interrupts_search() {
        let mut s = BasicSolver::default();
        pigeonhole_leq(&mut s, 5, 4);
        s.set_conflict_budget(1);
        assert_eq!(s.solve_limited(&[]), lbool::UNDEF);
        // the solver stays usable once the budget is lifted
        s.budget_off();
        assert_eq!(s.solve_limited(&[]), lbool::FALSE);
    }

    #[test]
    fn test_stop_callback_interrupts_search() {
        let mut s = BasicSolver::default();
        pigeonhole_leq(&mut s, 5, 4);
        s.cb_mut().set_stop(|| true);
        assert_eq!(s.solve_limited(&[]), lbool::UNDEF);
    }

    #[test]
    fn test_to_dimacs_roundtrip() {
        let mut a = BasicSolver::default();
        add_leq(&mut a, &[1, 2, 3], 1, 4);
        add(&mut a, &[1, 2, 3]);
        add(&mut a, &[4]);

        let mut buf = Vec::new();
        a.to_dimacs(&mut buf, &[lit_of(4)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("<= 1 #"));

        let mut b = BasicSolver::default();
        crate::dimacs::parse(&mut text.as_bytes(), &mut b, false, false).unwrap();
        assert_eq!(b.solve_limited(&[]), lbool::TRUE);
        let n_true = (0..3)
            .filter(|&i| b.value_var(Var::from_idx(i)) == lbool::TRUE)
            .count();
        assert_eq!(n_true, 1);
    }

    #[test]
    fn test_to_dimacs_contradictory_state() {
        let mut s = BasicSolver::default();
        add(&mut s, &[1]);
        add(&mut s, &[-1]);
        assert!(!s.is_ok());
        let mut buf = Vec::new();
        s.to_dimacs(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "p cnf 1 2\n1 0\n-1 0\n");
    }

    #[test]
    #[should_panic(expected = "LEQ too large")]
    fn test_leq_capacity_limit_panics() {
        let mut s = BasicSolver::default();
        let n = (1 << 14) - 10;
        let mut c: Vec<Lit> = (0..n).map(|i| lit(&mut s, i + 1)).collect();
        let d = lit(&mut s, n + 1);
        s.add_leq_assign_reuse(&mut c, 1, d);
    }

    #[test]
    fn test_incremental_solving_with_added_clauses() {
        let mut s = BasicSolver::default();
        add(&mut s, &[1, 2]);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        add(&mut s, &[-1]);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        assert_eq!(val(&s, 2), lbool::TRUE);
        add(&mut s, &[-2]);
        assert_eq!(s.solve_limited(&[]), lbool::FALSE);
    }

    #[test]
    fn test_var_preference_breaks_ties() {
        let mut s = BasicSolver::default();
        // two symmetric fresh variables, no activity yet: the preferred one
        // is decided first, and phase saving defaults to negative polarity
        add(&mut s, &[1, 2]);
        s.set_var_preference(Var::from_idx(1), -1);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        check_model(&s);
        // var 2 was decided first with default (false) polarity, forcing 1
        assert_eq!(val(&s, 2), lbool::FALSE);
        assert_eq!(val(&s, 1), lbool::TRUE);
    }
}
